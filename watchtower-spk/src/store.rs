//! Write-once storage for synthesized audio

use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

pub const AUDIO_EXTENSION: &str = "mp3";

/// Persists audio and returns the URL it will be served from.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn store(&self, audio: Bytes) -> Result<String, SpeechError>;
}

/// Stores each artifact as `<uuid>.mp3` in a directory.
///
/// Files are opened with `create_new`, so an existing artifact is never
/// overwritten.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
    url_prefix: String,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix, file_name)
    }

    fn new_file_name() -> String {
        format!("{}.{}", Uuid::new_v4(), AUDIO_EXTENSION)
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn store(&self, audio: Bytes) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::Store("Refusing to store empty audio".to_string()));
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            SpeechError::Store(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;

        let file_name = Self::new_file_name();
        let path = self.dir.join(&file_name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| SpeechError::Store(format!("Failed to create {}: {}", path.display(), e)))?;

        write_or_remove(&mut file, &path, &audio).await?;

        debug!("Stored {} bytes of audio at {}", audio.len(), path.display());
        Ok(self.url_for(&file_name))
    }
}

/// Write `audio` to `out`; on failure the partial file at `path` is removed.
async fn write_or_remove<W>(out: &mut W, path: &Path, audio: &[u8]) -> Result<(), SpeechError>
where
    W: AsyncWrite + Unpin,
{
    let written = match out.write_all(audio).await {
        Ok(()) => out.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!("Failed to remove partial artifact {}: {}", path.display(), remove_err);
        }
        return Err(SpeechError::Store(format!("Failed to write {}: {}", path.display(), e)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    struct DiskFull;

    impl AsyncWrite for DiskFull {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "No space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.mp3");
        std::fs::write(&path, b"ID3").unwrap();

        let result = write_or_remove(&mut DiskFull, &path, b"ID3 and the rest").await;
        assert!(matches!(result, Err(SpeechError::Store(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_successful_write_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whole.mp3");
        let mut file = tokio::fs::File::create(&path).await.unwrap();

        write_or_remove(&mut file, &path, b"ID3audio").await.unwrap();
        drop(file);
        assert_eq!(std::fs::read(&path).unwrap(), b"ID3audio");
    }
}
