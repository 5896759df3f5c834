use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Shared password required by every write endpoint
    pub admin_password: String,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Upper bound on a single request, replaces a read/write socket timeout
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the redb catalog file
    pub data_dir: String,
    /// Root of the `<tag>/<comic>/<n>.jpg` tree
    pub photos_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            photos_dir: "./photos".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let server_defaults = ServerConfig::default();
        let storage_defaults = StorageConfig::default();

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or(server_defaults.bind_address);

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(server_defaults.request_timeout_secs);

        let data_dir = std::env::var("DATA_DIR").unwrap_or(storage_defaults.data_dir);
        let photos_dir = std::env::var("PHOTOS_DIR").unwrap_or(storage_defaults.photos_dir);

        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_default();

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024); // 50MB

        let config = Config {
            server: ServerConfig {
                bind_address,
                request_timeout_secs,
            },
            storage: StorageConfig {
                data_dir,
                photos_dir,
            },
            admin_password,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_password.is_empty() {
            return Err(ConfigError::ValidationError(
                "ADMIN_PASSWORD must be set".to_string(),
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.storage.data_dir == self.storage.photos_dir {
            return Err(ConfigError::ValidationError(
                "DATA_DIR and PHOTOS_DIR must point to different directories".to_string(),
            ));
        }

        if self.max_upload_size < 1024 {
            tracing::warn!(
                max_upload_size = self.max_upload_size,
                "MAX_UPLOAD_SIZE is below 1KB, most photo uploads will be rejected"
            );
        }

        Ok(())
    }
}
