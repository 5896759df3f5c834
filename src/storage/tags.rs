use chrono::Utc;
use redb::{ReadableTable, WriteTransaction};

use super::db::{Database, DatabaseError};
use super::models::normalize_tag;
use super::tables::*;

impl Database {
    // ========================================================================
    // Tag directory
    // ========================================================================

    /// Check whether a tag has been created. The name is normalized first.
    pub fn tag_exists(&self, tag: &str) -> Result<bool, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TAGS)?;
        Ok(table.get(tag.as_str())?.is_some())
    }

    /// Create a tag. Idempotent: creating an existing tag is a no-op.
    pub fn create_tag(&self, tag: &str) -> Result<(), DatabaseError> {
        let tag = normalize_tag(tag)?;
        let write_txn = self.begin_write()?;
        insert_tag(&write_txn, &tag)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Add a tag to the public tag list.
    pub fn register_tag_name(&self, tag: &str) -> Result<(), DatabaseError> {
        let tag = normalize_tag(tag)?;
        let write_txn = self.begin_write()?;
        {
            let mut names = write_txn.open_table(TAG_NAMES)?;
            names.insert(tag.as_str(), ())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Store (or replace) the description of a tag.
    pub fn set_tag_description(&self, tag: &str, description: &str) -> Result<(), DatabaseError> {
        let tag = normalize_tag(tag)?;
        let write_txn = self.begin_write()?;
        {
            let mut descriptions = write_txn.open_table(TAG_DESCRIPTIONS)?;
            descriptions.insert(tag.as_str(), description)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_tag_description(&self, tag: &str) -> Result<Option<String>, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TAG_DESCRIPTIONS)?;
        Ok(table.get(tag.as_str())?.map(|v| v.value().to_string()))
    }

    /// All registered tag names.
    pub fn list_tags(&self) -> Result<Vec<String>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TAG_NAMES)?;

        let mut tags = Vec::new();
        for result in table.iter()? {
            let (key, _) = result?;
            tags.push(key.value().to_string());
        }
        Ok(tags)
    }

    /// Create, register and describe a new tag in one transaction.
    /// Returns the normalized tag name; fails with `TagExists` on duplicates.
    pub fn add_tag(&self, tag: &str, description: &str) -> Result<String, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let write_txn = self.begin_write()?;
        {
            let tags = write_txn.open_table(TAGS)?;
            if tags.get(tag.as_str())?.is_some() {
                return Err(DatabaseError::TagExists(tag));
            }
        }

        insert_tag(&write_txn, &tag)?;
        {
            let mut names = write_txn.open_table(TAG_NAMES)?;
            names.insert(tag.as_str(), ())?;

            let mut descriptions = write_txn.open_table(TAG_DESCRIPTIONS)?;
            descriptions.insert(tag.as_str(), description)?;
        }
        write_txn.commit()?;
        Ok(tag)
    }

    /// Undo `add_tag`. Only used when the tag folder could not be created, so
    /// the tag is known to hold no comics.
    pub fn remove_tag(&self, tag: &str) -> Result<(), DatabaseError> {
        let tag = normalize_tag(tag)?;
        let write_txn = self.begin_write()?;
        {
            let mut tags = write_txn.open_table(TAGS)?;
            tags.remove(tag.as_str())?;

            let mut names = write_txn.open_table(TAG_NAMES)?;
            names.remove(tag.as_str())?;

            let mut descriptions = write_txn.open_table(TAG_DESCRIPTIONS)?;
            descriptions.remove(tag.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

fn insert_tag(txn: &WriteTransaction, tag: &str) -> Result<(), DatabaseError> {
    let mut tags = txn.open_table(TAGS)?;
    if tags.get(tag)?.is_none() {
        tags.insert(tag, Utc::now().timestamp())?;
    }
    Ok(())
}
