use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{sort_photo_names, PhotoStore, PhotoStoreError};
use crate::storage::models::{normalize_tag, validate_comic_name};

/// Photo store on the local filesystem.
pub struct LocalPhotoStore {
    base_path: PathBuf,
}

impl LocalPhotoStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn tag_path(&self, tag: &str) -> Result<PathBuf, PhotoStoreError> {
        Ok(self.base_path.join(normalize_tag(tag)?))
    }

    fn folder_path(&self, tag: &str, name: &str) -> Result<PathBuf, PhotoStoreError> {
        validate_comic_name(name)?;
        Ok(self.tag_path(tag)?.join(name))
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn ensure_tag_folder(&self, tag: &str) -> Result<(), PhotoStoreError> {
        let path = self.tag_path(tag)?;
        tokio::fs::create_dir_all(&path).await?;
        set_folder_mode(&path).await?;
        Ok(())
    }

    async fn ensure_folder(&self, tag: &str, name: &str) -> Result<(), PhotoStoreError> {
        let tag_path = self.tag_path(tag)?;
        if !tokio::fs::try_exists(&tag_path).await? {
            return Err(PhotoStoreError::TagFolderMissing(display(&tag_path)));
        }

        let path = self.folder_path(tag, name)?;
        match tokio::fs::create_dir(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        set_folder_mode(&path).await?;
        Ok(())
    }

    async fn folder_exists(&self, tag: &str, name: &str) -> Result<bool, PhotoStoreError> {
        let path = self.folder_path(tag, name)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn save_photo(
        &self,
        tag: &str,
        name: &str,
        index: usize,
        data: Bytes,
    ) -> Result<(), PhotoStoreError> {
        let path = self.folder_path(tag, name)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(PhotoStoreError::FolderMissing(display(&path)));
        }
        tokio::fs::write(path.join(format!("{index}.jpg")), &data).await?;
        Ok(())
    }

    async fn list_photos(&self, tag: &str, name: &str) -> Result<Vec<Bytes>, PhotoStoreError> {
        let path = self.folder_path(tag, name)?;
        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PhotoStoreError::NotFound(display(&path)));
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.ends_with(".jpg") {
                names.push(file_name);
            }
        }
        sort_photo_names(&mut names);

        let mut photos = Vec::with_capacity(names.len());
        for file_name in names {
            let data = tokio::fs::read(path.join(&file_name)).await?;
            photos.push(Bytes::from(data));
        }
        Ok(photos)
    }

    async fn read_photo(
        &self,
        tag: &str,
        name: &str,
        file: &str,
    ) -> Result<Bytes, PhotoStoreError> {
        validate_comic_name(file)?;
        let file_name = if Path::new(file).extension().is_some() {
            file.to_string()
        } else {
            format!("{file}.jpg")
        };

        let path = self.folder_path(tag, name)?.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PhotoStoreError::NotFound(display(&path)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn move_folder(
        &self,
        old_tag: &str,
        old_name: &str,
        new_tag: &str,
        new_name: &str,
    ) -> Result<(), PhotoStoreError> {
        let source = self.folder_path(old_tag, old_name)?;
        let dest = self.folder_path(new_tag, new_name)?;
        if source == dest {
            return Ok(());
        }

        if !tokio::fs::try_exists(&source).await? {
            return Err(PhotoStoreError::NotFound(display(&source)));
        }
        let dest_tag = self.tag_path(new_tag)?;
        if !tokio::fs::try_exists(&dest_tag).await? {
            return Err(PhotoStoreError::TagFolderMissing(display(&dest_tag)));
        }
        if tokio::fs::try_exists(&dest).await? {
            return Err(PhotoStoreError::AlreadyExists(display(&dest)));
        }

        // Stage next to the destination so the final rename stays on one filesystem.
        let staging = dest_tag.join(format!(".staging-{}", uuid::Uuid::new_v4()));
        if let Err(e) = copy_files(&source, &staging).await {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&staging).await {
                tracing::warn!(path = %staging.display(), error = %cleanup, "Failed to remove staging folder");
            }
            return Err(e);
        }
        commit_staged(&staging, &dest, &source).await?;

        tracing::debug!(from = %source.display(), to = %dest.display(), "Moved photo folder");
        Ok(())
    }

    async fn remove_folder(&self, tag: &str, name: &str) -> Result<(), PhotoStoreError> {
        let path = self.folder_path(tag, name)?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Rename the staged copy into place, then drop the source. Once the rename
/// has succeeded the move is complete; a leftover source is only logged.
async fn commit_staged(
    staging: &Path,
    dest: &Path,
    source: &Path,
) -> Result<(), PhotoStoreError> {
    tokio::fs::rename(staging, dest).await?;
    if let Err(e) = tokio::fs::remove_dir_all(source).await {
        tracing::warn!(path = %source.display(), error = %e, "Failed to remove moved photo folder");
    }
    Ok(())
}

/// Copy every regular file of `source` into a freshly created `dest`.
async fn copy_files(source: &Path, dest: &Path) -> Result<(), PhotoStoreError> {
    tokio::fs::create_dir(dest).await?;
    set_folder_mode(dest).await?;

    let mut entries = tokio::fs::read_dir(source).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::copy(entry.path(), dest.join(entry.file_name())).await?;
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn set_folder_mode(path: &Path) -> Result<(), std::io::Error> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn set_folder_mode(_path: &Path) -> Result<(), std::io::Error> {
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_staged_survives_source_cleanup_failure() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join(".staging-test");
        let dest = dir.path().join("dest");
        let source = dir.path().join("already-gone");

        tokio::fs::create_dir(&staging).await.unwrap();
        tokio::fs::write(staging.join("1.jpg"), b"page").await.unwrap();

        commit_staged(&staging, &dest, &source).await.unwrap();

        assert!(!staging.exists());
        assert_eq!(tokio::fs::read(dest.join("1.jpg")).await.unwrap(), b"page");
    }

    #[tokio::test]
    async fn test_commit_staged_rename_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        tokio::fs::create_dir(&source).await.unwrap();

        let result = commit_staged(
            &dir.path().join(".staging-missing"),
            &dir.path().join("dest"),
            &source,
        )
        .await;
        assert!(matches!(result, Err(PhotoStoreError::Io(_))));
        assert!(source.exists());
    }
}
