use redb::{Database as RedbDatabase, ReadTransaction, ReadableTable, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::models::InvalidName;
use super::tables::*;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),

    #[error("Tag '{0}' does not exist")]
    TagNotFound(String),
    #[error("Tag '{0}' already exists")]
    TagExists(String),
    #[error("Comic '{name}' not found in tag '{tag}'")]
    ComicNotFound { tag: String, name: String },
    #[error("Comic '{name}' already exists in tag '{tag}'")]
    ComicExists { tag: String, name: String },
    #[error(transparent)]
    InvalidName(#[from] InvalidName),
}

impl From<redb::CommitError> for DatabaseError {
    fn from(e: redb::CommitError) -> Self {
        DatabaseError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for DatabaseError {
    fn from(e: redb::DatabaseError) -> Self {
        DatabaseError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::StorageError> for DatabaseError {
    fn from(e: redb::StorageError) -> Self {
        DatabaseError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for DatabaseError {
    fn from(e: redb::TableError) -> Self {
        DatabaseError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for DatabaseError {
    fn from(e: redb::TransactionError) -> Self {
        DatabaseError::Transaction(Box::new(e))
    }
}

pub struct Database {
    db: Arc<RedbDatabase>,
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("comix.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        // Initialize application tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(COMICS)?;
            let _ = write_txn.open_table(COMIC_KEYS)?;
            let _ = write_txn.open_table(TAG_COMICS)?;
            let _ = write_txn.open_table(TAGS)?;
            let _ = write_txn.open_table(TAG_NAMES)?;
            let _ = write_txn.open_table(TAG_DESCRIPTIONS)?;
            let _ = write_txn.open_table(META)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read transaction
    pub fn begin_read(&self) -> Result<ReadTransaction, DatabaseError> {
        Ok(self.db.begin_read()?)
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> Result<WriteTransaction, DatabaseError> {
        Ok(self.db.begin_write()?)
    }

    /// Hand out the next comic id. Must run inside the write transaction that
    /// stores the record, so an aborted insert does not burn the id.
    pub(super) fn next_comic_id(txn: &WriteTransaction) -> Result<u64, DatabaseError> {
        let mut meta = txn.open_table(META)?;
        let next = meta.get(NEXT_COMIC_ID)?.map(|v| v.value()).unwrap_or(1);
        meta.insert(NEXT_COMIC_ID, next + 1)?;
        Ok(next)
    }
}
