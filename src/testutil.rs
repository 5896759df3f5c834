//! Shared test helpers for comix-back router tests.

use std::sync::Arc;

use crate::auth::SharedSecret;
use crate::config::{Config, ServerConfig, StorageConfig};
use crate::photo_store::LocalPhotoStore;
use crate::storage::Database;
use crate::AppState;

pub const TEST_PASSWORD: &str = "test-password";

/// Create a test AppState with a temporary database and photo directory.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    test_state_with(temp_dir, |_| {})
}

/// Like `test_state`, with a hook to adjust the config before anything opens.
pub fn test_state_with(
    temp_dir: &tempfile::TempDir,
    configure: impl FnOnce(&mut Config),
) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let photos_dir = temp_dir.path().join("photos");

    let mut config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            request_timeout_secs: 10,
        },
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().to_string(),
            photos_dir: photos_dir.to_string_lossy().to_string(),
        },
        admin_password: TEST_PASSWORD.to_string(),
        max_upload_size: 10 * 1024 * 1024, // 10MB for tests
    };
    configure(&mut config);

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let photos = LocalPhotoStore::new(&photos_dir).expect("Failed to create test photo store");

    Arc::new(AppState {
        secret: SharedSecret::new(&config.admin_password),
        config,
        db,
        photos: Arc::new(photos),
    })
}
