use festival_coordination_backend::gallery::{list_images, GalleryError};

#[tokio::test]
async fn lists_images_one_level_deep() {
    let root = tempfile::tempdir().unwrap();
    let folder = root.path().join("images").join("ganpati");
    let deeper = folder.join("sub").join("deeper");
    tokio::fs::create_dir_all(&deeper).await.unwrap();
    tokio::fs::write(folder.join("a.jpg"), b"jpg").await.unwrap();
    tokio::fs::write(folder.join("b.txt"), b"txt").await.unwrap();
    tokio::fs::write(folder.join("sub").join("c.png"), b"png").await.unwrap();
    tokio::fs::write(deeper.join("d.png"), b"png").await.unwrap();

    let images = list_images(root.path(), Some("/images/ganpati")).await.unwrap();
    assert_eq!(images, ["/images/ganpati/a.jpg", "/images/ganpati/sub/c.png"]);

    let with_slash = list_images(root.path(), Some("/images/ganpati/")).await.unwrap();
    assert_eq!(images, with_slash);
}

#[tokio::test]
async fn rejects_bad_folders() {
    let root = tempfile::tempdir().unwrap();
    assert!(matches!(
        list_images(root.path(), None).await,
        Err(GalleryError::MissingFolder)
    ));
    assert!(matches!(
        list_images(root.path(), Some("images/../../secrets")).await,
        Err(GalleryError::InvalidFolder(_))
    ));
    assert!(matches!(
        list_images(root.path(), Some("/images/missing/")).await,
        Err(GalleryError::NotFound(_))
    ));
}
