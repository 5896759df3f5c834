use bytes::Bytes;
use comix_back::photo_store::{LocalPhotoStore, PhotoStore, PhotoStoreError};

fn test_store() -> (tempfile::TempDir, LocalPhotoStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalPhotoStore::new(dir.path().join("photos")).unwrap();
    (dir, store)
}

async fn store_with_comic(tag: &str, name: &str) -> (tempfile::TempDir, LocalPhotoStore) {
    let (dir, store) = test_store();
    store.ensure_tag_folder(tag).await.unwrap();
    store.ensure_folder(tag, name).await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn test_ensure_folder_requires_tag_folder() {
    let (_dir, store) = test_store();
    let result = store.ensure_folder("horror", "Night").await;
    assert!(matches!(result, Err(PhotoStoreError::TagFolderMissing(_))));

    store.ensure_tag_folder("horror").await.unwrap();
    store.ensure_folder("horror", "Night").await.unwrap();
    // Second call is a no-op
    store.ensure_folder("horror", "Night").await.unwrap();
    assert!(store.folder_exists("horror", "Night").await.unwrap());
}

#[tokio::test]
async fn test_paths_are_validated() {
    let (_dir, store) = test_store();
    assert!(matches!(
        store.ensure_tag_folder("../escape").await,
        Err(PhotoStoreError::InvalidPath(_))
    ));

    store.ensure_tag_folder("horror").await.unwrap();
    assert!(matches!(
        store.ensure_folder("horror", "../../etc").await,
        Err(PhotoStoreError::InvalidPath(_))
    ));
}

#[tokio::test]
async fn test_save_photo_requires_folder() {
    let (_dir, store) = test_store();
    store.ensure_tag_folder("horror").await.unwrap();

    let result = store
        .save_photo("horror", "Missing", 1, Bytes::from_static(b"x"))
        .await;
    assert!(matches!(result, Err(PhotoStoreError::FolderMissing(_))));
}

#[tokio::test]
async fn test_list_photos_numeric_order() {
    let (_dir, store) = store_with_comic("horror", "Night").await;

    // Write out of order so directory order can't hide a sorting bug
    for i in [10usize, 2, 7, 1, 5, 3, 9, 4, 8, 6] {
        store
            .save_photo("horror", "Night", i, Bytes::from(format!("page {i}")))
            .await
            .unwrap();
    }

    let photos = store.list_photos("horror", "Night").await.unwrap();
    let pages: Vec<String> = photos
        .iter()
        .map(|p| String::from_utf8(p.to_vec()).unwrap())
        .collect();
    let expected: Vec<String> = (1..=10).map(|i| format!("page {i}")).collect();
    assert_eq!(pages, expected);
}

#[tokio::test]
async fn test_save_photo_overwrites_index() {
    let (_dir, store) = store_with_comic("horror", "Night").await;
    store
        .save_photo("horror", "Night", 1, Bytes::from_static(b"old"))
        .await
        .unwrap();
    store
        .save_photo("horror", "Night", 1, Bytes::from_static(b"new"))
        .await
        .unwrap();

    let photos = store.list_photos("horror", "Night").await.unwrap();
    assert_eq!(photos, vec![Bytes::from_static(b"new")]);
}

#[tokio::test]
async fn test_list_photos_missing_folder() {
    let (_dir, store) = test_store();
    let result = store.list_photos("horror", "Nothing").await;
    assert!(matches!(result, Err(PhotoStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_list_photos_empty_folder() {
    let (_dir, store) = store_with_comic("horror", "Blank").await;
    assert!(store.list_photos("horror", "Blank").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_read_photo() {
    let (_dir, store) = store_with_comic("horror", "Night").await;
    store
        .save_photo("horror", "Night", 3, Bytes::from_static(b"third"))
        .await
        .unwrap();

    let with_ext = store.read_photo("horror", "Night", "3.jpg").await.unwrap();
    assert_eq!(with_ext, Bytes::from_static(b"third"));

    let without_ext = store.read_photo("horror", "Night", "3").await.unwrap();
    assert_eq!(without_ext, Bytes::from_static(b"third"));

    let missing = store.read_photo("horror", "Night", "4").await;
    assert!(matches!(missing, Err(PhotoStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_rename_tag_folder_moves_everything() {
    let (_dir, store) = store_with_comic("horror", "Mover").await;
    store.ensure_tag_folder("comedy").await.unwrap();
    for i in 1..=3 {
        store
            .save_photo("horror", "Mover", i, Bytes::from(vec![i as u8; 4]))
            .await
            .unwrap();
    }

    store
        .rename_tag_folder("horror", "comedy", "Mover")
        .await
        .unwrap();

    assert!(!store.folder_exists("horror", "Mover").await.unwrap());
    let photos = store.list_photos("comedy", "Mover").await.unwrap();
    assert_eq!(photos.len(), 3);
    assert_eq!(photos[2], Bytes::from(vec![3u8; 4]));
}

#[tokio::test]
async fn test_move_folder_renames_comic() {
    let (_dir, store) = store_with_comic("horror", "Old").await;
    store
        .save_photo("horror", "Old", 1, Bytes::from_static(b"p1"))
        .await
        .unwrap();

    store
        .move_folder("horror", "Old", "horror", "New")
        .await
        .unwrap();

    assert!(!store.folder_exists("horror", "Old").await.unwrap());
    assert_eq!(
        store.list_photos("horror", "New").await.unwrap(),
        vec![Bytes::from_static(b"p1")]
    );
}

#[tokio::test]
async fn test_move_folder_destination_exists() {
    let (_dir, store) = store_with_comic("horror", "Dup").await;
    store.ensure_tag_folder("comedy").await.unwrap();
    store.ensure_folder("comedy", "Dup").await.unwrap();
    store
        .save_photo("horror", "Dup", 1, Bytes::from_static(b"keep"))
        .await
        .unwrap();

    let result = store.rename_tag_folder("horror", "comedy", "Dup").await;
    assert!(matches!(result, Err(PhotoStoreError::AlreadyExists(_))));

    // Source untouched
    assert_eq!(
        store.list_photos("horror", "Dup").await.unwrap(),
        vec![Bytes::from_static(b"keep")]
    );
}

#[tokio::test]
async fn test_move_folder_requires_destination_tag() {
    let (_dir, store) = store_with_comic("horror", "Stay").await;
    let result = store.rename_tag_folder("horror", "nowhere", "Stay").await;
    assert!(matches!(result, Err(PhotoStoreError::TagFolderMissing(_))));
    assert!(store.folder_exists("horror", "Stay").await.unwrap());
}

#[tokio::test]
async fn test_move_folder_missing_source() {
    let (_dir, store) = test_store();
    store.ensure_tag_folder("horror").await.unwrap();
    store.ensure_tag_folder("comedy").await.unwrap();

    let result = store.rename_tag_folder("horror", "comedy", "Ghost").await;
    assert!(matches!(result, Err(PhotoStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_remove_folder() {
    let (_dir, store) = store_with_comic("horror", "Gone").await;
    store
        .save_photo("horror", "Gone", 1, Bytes::from_static(b"x"))
        .await
        .unwrap();

    store.remove_folder("horror", "Gone").await.unwrap();
    assert!(!store.folder_exists("horror", "Gone").await.unwrap());

    // Removing again is fine
    store.remove_folder("horror", "Gone").await.unwrap();
}
