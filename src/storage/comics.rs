use chrono::NaiveDate;
use redb::{ReadableTable, ReadableTableMetadata, Table};

use super::db::{Database, DatabaseError};
use super::models::{
    normalize_tag, page_offset, validate_comic_name, ComicRecord, EditableField, PAGE_SIZE,
};
use super::tables::*;

impl Database {
    // ========================================================================
    // Comic operations
    // ========================================================================

    /// Insert a comic into `tag`. The tag must exist and must not already hold
    /// a comic with this name; both checks and the insert share one
    /// transaction. New comics start with one view.
    pub fn add_comic(
        &self,
        tag: &str,
        name: &str,
        description: &str,
        upload_date: NaiveDate,
    ) -> Result<ComicRecord, DatabaseError> {
        let tag = normalize_tag(tag)?;
        validate_comic_name(name)?;

        let write_txn = self.begin_write()?;
        {
            let tags = write_txn.open_table(TAGS)?;
            if tags.get(tag.as_str())?.is_none() {
                return Err(DatabaseError::TagNotFound(tag));
            }
        }

        let id = Database::next_comic_id(&write_txn)?;
        let record = ComicRecord {
            id,
            tag,
            name: name.to_string(),
            description: description.to_string(),
            upload_date,
            views: 1,
        };

        {
            let mut keys = write_txn.open_table(COMIC_KEYS)?;
            if keys.get((record.tag.as_str(), name))?.is_some() {
                return Err(DatabaseError::ComicExists {
                    tag: record.tag,
                    name: record.name,
                });
            }
            keys.insert((record.tag.as_str(), name), id)?;

            let mut tag_comics = write_txn.open_table(TAG_COMICS)?;
            tag_comics.insert((record.tag.as_str(), id), ())?;

            let mut comics = write_txn.open_table(COMICS)?;
            store_comic(&mut comics, &record)?;
        }
        write_txn.commit()?;
        Ok(record)
    }

    pub fn comic_exists(&self, tag: &str, name: &str) -> Result<bool, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let read_txn = self.begin_read()?;
        let keys = read_txn.open_table(COMIC_KEYS)?;
        Ok(keys.get((tag.as_str(), name))?.is_some())
    }

    /// Get a comic by tag and name
    pub fn get_comic(&self, tag: &str, name: &str) -> Result<Option<ComicRecord>, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let read_txn = self.begin_read()?;
        let keys = read_txn.open_table(COMIC_KEYS)?;

        let id = match keys.get((tag.as_str(), name))? {
            Some(id) => id.value(),
            None => return Ok(None),
        };

        let comics = read_txn.open_table(COMICS)?;
        load_comic(&comics, id)
    }

    // ========================================================================
    // Listings (newest first, PAGE_SIZE per 1-based page)
    // ========================================================================

    pub fn list_global(&self, page: u32) -> Result<Vec<ComicRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let comics = read_txn.open_table(COMICS)?;

        let mut records = Vec::new();
        for result in comics.iter()?.rev().skip(page_offset(page)).take(PAGE_SIZE) {
            let (_, data) = result?;
            records.push(rmp_serde::from_slice(data.value())?);
        }
        Ok(records)
    }

    pub fn list_by_tag(&self, tag: &str, page: u32) -> Result<Vec<ComicRecord>, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let read_txn = self.begin_read()?;
        let tag_comics = read_txn.open_table(TAG_COMICS)?;
        let comics = read_txn.open_table(COMICS)?;

        let mut records = Vec::new();
        for result in tag_comics
            .range((tag.as_str(), 0u64)..=(tag.as_str(), u64::MAX))?
            .rev()
            .skip(page_offset(page))
            .take(PAGE_SIZE)
        {
            let (key, _) = result?;
            let (_, id) = key.value();
            if let Some(record) = load_comic(&comics, id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Comics whose name contains `needle` (case-sensitive, literal match).
    pub fn search(&self, needle: &str, page: u32) -> Result<Vec<ComicRecord>, DatabaseError> {
        let matches = self.scan_by_name(|name| name.contains(needle))?;
        Ok(matches
            .into_iter()
            .skip(page_offset(page))
            .take(PAGE_SIZE)
            .collect())
    }

    pub fn count(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.begin_read()?;
        let comics = read_txn.open_table(COMICS)?;
        Ok(comics.len()?)
    }

    pub fn count_by_tag(&self, tag: &str) -> Result<u64, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let read_txn = self.begin_read()?;
        let tag_comics = read_txn.open_table(TAG_COMICS)?;

        let mut count = 0;
        for result in tag_comics.range((tag.as_str(), 0u64)..=(tag.as_str(), u64::MAX))? {
            result?;
            count += 1;
        }
        Ok(count)
    }

    pub fn count_by_search(&self, needle: &str) -> Result<u64, DatabaseError> {
        Ok(self.scan_by_name(|name| name.contains(needle))?.len() as u64)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Rewrite `field` on every comic called `name`, across all tags.
    /// Returns how many comics were updated. A rename that would collide in
    /// any tag aborts the whole edit.
    pub fn edit_field(
        &self,
        name: &str,
        field: EditableField,
        new_value: &str,
    ) -> Result<u64, DatabaseError> {
        let ids: Vec<u64> = self
            .scan_by_name(|candidate| candidate == name)?
            .into_iter()
            .map(|record| record.id)
            .collect();

        let write_txn = self.begin_write()?;
        {
            let mut comics = write_txn.open_table(COMICS)?;
            let mut keys = write_txn.open_table(COMIC_KEYS)?;
            for &id in &ids {
                let record = load_comic(&comics, id)?.ok_or_else(|| {
                    DatabaseError::ComicNotFound {
                        tag: String::new(),
                        name: name.to_string(),
                    }
                })?;
                let updated = apply_edit(&mut keys, record, field, new_value)?;
                store_comic(&mut comics, &updated)?;
            }
        }
        write_txn.commit()?;
        Ok(ids.len() as u64)
    }

    /// Rewrite `field` on the comic `name` in `tag`.
    pub fn edit_field_in_tag(
        &self,
        tag: &str,
        name: &str,
        field: EditableField,
        new_value: &str,
    ) -> Result<ComicRecord, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let write_txn = self.begin_write()?;
        let updated = {
            let mut comics = write_txn.open_table(COMICS)?;
            let mut keys = write_txn.open_table(COMIC_KEYS)?;

            let record = find_comic(&keys, &comics, &tag, name)?;
            let updated = apply_edit(&mut keys, record, field, new_value)?;
            store_comic(&mut comics, &updated)?;
            updated
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Move the comic `name` from `old_tag` to `new_tag`. Upload date, id and
    /// view count are kept. Moving to the current tag is a no-op.
    pub fn rename_tag(
        &self,
        old_tag: &str,
        new_tag: &str,
        name: &str,
    ) -> Result<ComicRecord, DatabaseError> {
        let old_tag = normalize_tag(old_tag)?;
        let new_tag = normalize_tag(new_tag)?;

        let write_txn = self.begin_write()?;
        let moved = {
            let tags = write_txn.open_table(TAGS)?;
            if tags.get(new_tag.as_str())?.is_none() {
                return Err(DatabaseError::TagNotFound(new_tag));
            }

            let mut comics = write_txn.open_table(COMICS)?;
            let mut keys = write_txn.open_table(COMIC_KEYS)?;
            let mut tag_comics = write_txn.open_table(TAG_COMICS)?;

            let mut record = find_comic(&keys, &comics, &old_tag, name)?;
            if old_tag == new_tag {
                return Ok(record);
            }
            if keys.get((new_tag.as_str(), name))?.is_some() {
                return Err(DatabaseError::ComicExists {
                    tag: new_tag,
                    name: name.to_string(),
                });
            }

            keys.remove((old_tag.as_str(), name))?;
            keys.insert((new_tag.as_str(), name), record.id)?;
            tag_comics.remove((old_tag.as_str(), record.id))?;
            tag_comics.insert((new_tag.as_str(), record.id), ())?;

            record.tag = new_tag;
            store_comic(&mut comics, &record)?;
            record
        };
        write_txn.commit()?;
        Ok(moved)
    }

    /// Delete a comic and its index entries. Returns false if it did not exist.
    pub fn delete_comic(&self, tag: &str, name: &str) -> Result<bool, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut keys = write_txn.open_table(COMIC_KEYS)?;
            let id = keys.remove((tag.as_str(), name))?.map(|v| v.value());

            match id {
                Some(id) => {
                    let mut tag_comics = write_txn.open_table(TAG_COMICS)?;
                    tag_comics.remove((tag.as_str(), id))?;

                    let mut comics = write_txn.open_table(COMICS)?;
                    comics.remove(id)?;
                    true
                }
                None => false,
            }
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    /// Add one view. Returns false, without error, if the comic is absent.
    pub fn increment_views(&self, tag: &str, name: &str) -> Result<bool, DatabaseError> {
        let tag = normalize_tag(tag)?;
        let write_txn = self.begin_write()?;
        let incremented = {
            let keys = write_txn.open_table(COMIC_KEYS)?;
            let mut comics = write_txn.open_table(COMICS)?;

            let id = keys.get((tag.as_str(), name))?.map(|v| v.value());
            match id {
                Some(id) => match load_comic(&comics, id)? {
                    Some(mut record) => {
                        record.views += 1;
                        store_comic(&mut comics, &record)?;
                        true
                    }
                    None => false,
                },
                None => false,
            }
        };
        write_txn.commit()?;
        Ok(incremented)
    }

    /// Full scan, newest first, keeping records whose name passes `filter`.
    fn scan_by_name<F>(&self, filter: F) -> Result<Vec<ComicRecord>, DatabaseError>
    where
        F: Fn(&str) -> bool,
    {
        let read_txn = self.begin_read()?;
        let comics = read_txn.open_table(COMICS)?;

        let mut records = Vec::new();
        for result in comics.iter()?.rev() {
            let (_, data) = result?;
            let record: ComicRecord = rmp_serde::from_slice(data.value())?;
            if filter(&record.name) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn load_comic<T>(comics: &T, id: u64) -> Result<Option<ComicRecord>, DatabaseError>
where
    T: ReadableTable<u64, &'static [u8]>,
{
    match comics.get(id)? {
        Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
        None => Ok(None),
    }
}

fn store_comic(
    comics: &mut Table<u64, &'static [u8]>,
    record: &ComicRecord,
) -> Result<(), DatabaseError> {
    let data = rmp_serde::to_vec_named(record)?;
    comics.insert(record.id, data.as_slice())?;
    Ok(())
}

fn find_comic<K, C>(
    keys: &K,
    comics: &C,
    tag: &str,
    name: &str,
) -> Result<ComicRecord, DatabaseError>
where
    K: ReadableTable<(&'static str, &'static str), u64>,
    C: ReadableTable<u64, &'static [u8]>,
{
    let not_found = || DatabaseError::ComicNotFound {
        tag: tag.to_string(),
        name: name.to_string(),
    };
    let id = keys.get((tag, name))?.map(|v| v.value()).ok_or_else(not_found)?;
    load_comic(comics, id)?.ok_or_else(not_found)
}

/// Apply one field edit to `record`, re-keying the name index on renames.
fn apply_edit(
    keys: &mut Table<(&'static str, &'static str), u64>,
    mut record: ComicRecord,
    field: EditableField,
    new_value: &str,
) -> Result<ComicRecord, DatabaseError> {
    match field {
        EditableField::Description => {
            record.description = new_value.to_string();
        }
        EditableField::Name => {
            validate_comic_name(new_value)?;
            if record.name == new_value {
                return Ok(record);
            }
            if keys.get((record.tag.as_str(), new_value))?.is_some() {
                return Err(DatabaseError::ComicExists {
                    tag: record.tag,
                    name: new_value.to_string(),
                });
            }
            keys.remove((record.tag.as_str(), record.name.as_str()))?;
            keys.insert((record.tag.as_str(), new_value), record.id)?;
            record.name = new_value.to_string();
        }
    }
    Ok(record)
}
