//! Tests for the filesystem artifact store

use bytes::Bytes;
use std::collections::HashSet;
use tempfile::TempDir;
use watchtower_spk::store::{ArtifactStore, FileArtifactStore};

#[tokio::test]
async fn test_store_writes_uuid_named_file() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifactStore::new(dir.path(), "/static");

    let url = store.store(Bytes::from_static(b"ID3fake")).await.unwrap();
    let file_name = url.strip_prefix("/static/").unwrap();
    let stem = file_name.strip_suffix(".mp3").unwrap();
    assert!(uuid::Uuid::parse_str(stem).is_ok());

    let written = std::fs::read(dir.path().join(file_name)).unwrap();
    assert_eq!(written, b"ID3fake");
}

#[tokio::test]
async fn test_store_never_reuses_names() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifactStore::new(dir.path(), "/static/");

    let mut urls = HashSet::new();
    for i in 0..10 {
        let url = store.store(Bytes::from(format!("audio {}", i))).await.unwrap();
        assert!(url.starts_with("/static/"));
        assert!(!url.starts_with("/static//"));
        urls.insert(url);
    }
    assert_eq!(urls.len(), 10);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 10);
}

#[tokio::test]
async fn test_store_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("audio").join("out");
    let store = FileArtifactStore::new(&nested, "/static");

    store.store(Bytes::from_static(b"x")).await.unwrap();
    assert!(nested.is_dir());
}

#[tokio::test]
async fn test_store_rejects_empty_audio() {
    let dir = TempDir::new().unwrap();
    let store = FileArtifactStore::new(dir.path(), "/static");
    assert!(store.store(Bytes::new()).await.is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
