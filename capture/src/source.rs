use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::image::ImageData;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("not an image: {0}")]
    Unsupported(String),
    #[error("image too small ({0} bytes)")]
    TooSmall(usize),
}

/// A device-independent way to obtain one photo.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn acquire(&self) -> Result<ImageData, CaptureError>;
}

/// Reads a photo from a path the user picked.
pub struct FilePicker {
    path: PathBuf,
}

impl FilePicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImageSource for FilePicker {
    async fn acquire(&self) -> Result<ImageData, CaptureError> {
        let mime = mime_guess::from_path(&self.path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(CaptureError::Unsupported(mime.to_string()));
        }
        let bytes = tokio::fs::read(&self.path).await?;
        debug!(path = %self.path.display(), len = bytes.len(), "picked image file");
        ImageData::new(mime.to_string(), bytes)
    }
}

/// A fixed in-memory image, useful for demos and tests.
pub struct StaticImage {
    image: ImageData,
}

impl StaticImage {
    pub fn new(image: ImageData) -> Self {
        Self { image }
    }
}

#[async_trait]
impl ImageSource for StaticImage {
    async fn acquire(&self) -> Result<ImageData, CaptureError> {
        Ok(self.image.clone())
    }
}
