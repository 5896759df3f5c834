//! comix-back - Catalog backend for a tagged comic library
//!
//! This crate provides the storage and HTTP layers of a comic catalog:
//! - Tags and comics kept in a redb embedded database (ACID, one write
//!   transaction per logical operation)
//! - Photos stored on disk as `<tag>/<comic>/<n>.jpg`
//! - JSON API where every write is guarded by a single shared password

pub mod api;
pub mod auth;
pub mod config;
pub mod photo_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use auth::SharedSecret;
use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub photos: Arc<dyn photo_store::PhotoStore>,
    pub secret: SharedSecret,
}
