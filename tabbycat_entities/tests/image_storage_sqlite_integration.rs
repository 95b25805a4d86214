mod common;

use assert_matches::assert_matches;
use tabbycat_entities::images::{BlobAttachment, DatabaseFileStorage, StorageError, UPLOAD_TO};


#[tokio::test]
async fn test_save_and_open() -> Result<(), anyhow::Error> {
    let db = common::set_up_db().await?;
    let storage = DatabaseFileStorage::new(UPLOAD_TO)?;

    let name = storage.save(&db, "logo.png", b"not really a png", "image/png").await?;
    assert_eq!(name, "logo.png");
    assert!(storage.exists(&db, "logo.png").await?);

    let file = storage.open(&db, "logo.png").await?;
    assert_eq!(file.content, b"not really a png");
    assert_eq!(file.mimetype, "image/png");
    assert_eq!(storage.size(&db, "logo.png").await?, 16);
    assert_eq!(storage.url("logo.png"), "/images/file/logo.png");
    Ok(())
}

#[tokio::test]
async fn test_taken_names_get_a_suffix() -> Result<(), anyhow::Error> {
    let db = common::set_up_db().await?;
    let storage = DatabaseFileStorage::default();

    storage.save(&db, "logo.png", b"first", "image/png").await?;
    let second = storage.save(&db, "logo.png", b"second", "image/png").await?;

    assert_ne!(second, "logo.png");
    assert!(second.starts_with("logo_"));
    assert!(second.ends_with(".png"));
    assert_eq!(second.len(), "logo_.png".len() + 7);
    assert_eq!(storage.open(&db, "logo.png").await?.content, b"first");
    assert_eq!(storage.open(&db, &second).await?.content, b"second");
    Ok(())
}

#[tokio::test]
async fn test_open_missing_file() -> Result<(), anyhow::Error> {
    let db = common::set_up_db().await?;
    let storage = DatabaseFileStorage::default();

    assert_matches!(storage.open(&db, "missing.png").await, Err(StorageError::NotFound(_)));
    assert!(!storage.exists(&db, "missing.png").await?);
    Ok(())
}

#[tokio::test]
async fn test_deleting_attachment_deletes_file() -> Result<(), anyhow::Error> {
    let db = common::set_up_db().await?;
    let storage = DatabaseFileStorage::default();

    let attachment = BlobAttachment::create(&db, &storage, Some("Logo".into()), "logo.png", b"content", "image/png").await?;
    assert_eq!(attachment.file, "logo.png");
    assert!(storage.exists(&db, &attachment.file).await?);

    let uuid = attachment.uuid;
    let file = attachment.file.clone();
    attachment.delete(&db, &storage).await?;

    assert!(BlobAttachment::get(&db, uuid).await?.is_none());
    assert!(!storage.exists(&db, &file).await?);
    Ok(())
}

#[tokio::test]
async fn test_invalid_descriptor_is_rejected() {
    assert_matches!(DatabaseFileStorage::new("images.Other/bytes/filename/mimetype"), Err(StorageError::InvalidDescriptor(_)));
    assert_matches!(DatabaseFileStorage::new("images.UploadedImage/data/filename/mimetype"), Err(StorageError::InvalidDescriptor(_)));
}
