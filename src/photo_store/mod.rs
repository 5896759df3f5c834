mod local;

pub use local::LocalPhotoStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::storage::models::InvalidName;

#[derive(Debug, Error)]
pub enum PhotoStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Directory does not exist: {0}")]
    FolderMissing(String),
    #[error("Tag folder does not exist: {0}")]
    TagFolderMissing(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    InvalidPath(#[from] InvalidName),
}

/// Photo storage laid out as `<tag>/<comic>/<n>.jpg`.
///
/// The tag folder has to exist before a comic folder can be created in it,
/// and the comic folder has to exist before photos are saved into it.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn ensure_tag_folder(&self, tag: &str) -> Result<(), PhotoStoreError>;
    async fn ensure_folder(&self, tag: &str, name: &str) -> Result<(), PhotoStoreError>;
    async fn folder_exists(&self, tag: &str, name: &str) -> Result<bool, PhotoStoreError>;

    /// Write `data` as `<index>.jpg`, replacing any previous photo at that index.
    async fn save_photo(
        &self,
        tag: &str,
        name: &str,
        index: usize,
        data: Bytes,
    ) -> Result<(), PhotoStoreError>;

    /// All `.jpg` photos of a comic in page order.
    async fn list_photos(&self, tag: &str, name: &str) -> Result<Vec<Bytes>, PhotoStoreError>;

    /// Read a single file. `file` may omit the `.jpg` extension.
    async fn read_photo(&self, tag: &str, name: &str, file: &str)
        -> Result<Bytes, PhotoStoreError>;

    /// Move a comic folder to a new (tag, name) location. The destination
    /// appears all at once; the source is removed afterwards.
    async fn move_folder(
        &self,
        old_tag: &str,
        old_name: &str,
        new_tag: &str,
        new_name: &str,
    ) -> Result<(), PhotoStoreError>;

    async fn remove_folder(&self, tag: &str, name: &str) -> Result<(), PhotoStoreError>;

    async fn rename_tag_folder(
        &self,
        old_tag: &str,
        new_tag: &str,
        name: &str,
    ) -> Result<(), PhotoStoreError> {
        self.move_folder(old_tag, name, new_tag, name).await
    }
}

/// Order photo file names for display. When every stem is an integer the
/// names sort numerically (`2.jpg` before `10.jpg`); otherwise the whole set
/// sorts lexically by stem.
pub fn sort_photo_names(names: &mut [String]) {
    fn stem(name: &str) -> &str {
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }

    let all_numeric = names.iter().all(|n| stem(n).parse::<i64>().is_ok());
    if all_numeric {
        names.sort_by_cached_key(|n| stem(n).parse::<i64>().unwrap_or_default());
    } else {
        names.sort_by(|a, b| stem(a).cmp(stem(b)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sort_numeric() {
        let mut files = names(&["10.jpg", "2.jpg", "1.jpg", "3.jpg"]);
        sort_photo_names(&mut files);
        assert_eq!(files, names(&["1.jpg", "2.jpg", "3.jpg", "10.jpg"]));
    }

    #[test]
    fn test_sort_mixed_falls_back_to_lexical() {
        let mut files = names(&["9.jpg", "10.jpg", "cover.jpg", "1a.jpg"]);
        sort_photo_names(&mut files);
        assert_eq!(files, names(&["10.jpg", "1a.jpg", "9.jpg", "cover.jpg"]));
    }

    #[test]
    fn test_sort_empty() {
        let mut files: Vec<String> = Vec::new();
        sort_photo_names(&mut files);
        assert!(files.is_empty());
    }
}
