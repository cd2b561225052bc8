//! Frame source backed by a directory of still images.
//!
//! Stands in for a webcam: each grab returns the next image (sorted by name,
//! wrapping around) as a `data:image/<fmt>;base64,` URL, the same shape a
//! browser screenshot produces. The directory is rescanned on every grab so
//! frames dropped in while the client runs are picked up.

use crate::domain::DomainError;
use crate::ports::FrameSource;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;
use tracing::debug;

pub struct DirectoryFrameSource {
    dir: PathBuf,
    cursor: AtomicUsize,
}

impl DirectoryFrameSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            cursor: AtomicUsize::new(0),
        }
    }

    async fn list_images(&self) -> Result<Vec<PathBuf>, DomainError> {
        let mut entries = fs::read_dir(&self.dir).await.map_err(|e| {
            DomainError::Camera(format!("frame directory {}: {}", self.dir.display(), e))
        })?;

        let mut images = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DomainError::Camera(format!("read frame directory: {}", e)))?
        {
            let path = entry.path();
            if mime_for(&path).is_some() {
                images.push(path);
            }
        }
        images.sort();
        Ok(images)
    }
}

/// Image MIME type by extension; None for files that are not frames.
fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[async_trait::async_trait]
impl FrameSource for DirectoryFrameSource {
    async fn grab_frame(&self) -> Result<String, DomainError> {
        let images = self.list_images().await?;
        if images.is_empty() {
            return Err(DomainError::Camera(format!(
                "no frames available in {}",
                self.dir.display()
            )));
        }

        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % images.len();
        let path = &images[idx];
        let bytes = fs::read(path)
            .await
            .map_err(|e| DomainError::Camera(format!("read {}: {}", path.display(), e)))?;
        let mime = mime_for(path).unwrap_or("image/jpeg");
        debug!(path = %path.display(), bytes = bytes.len(), "frame grabbed");

        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)))
    }
}
