//! Upload captured photos to the external object store.
//!
//! The store is Cloudinary-shaped: an unsigned multipart POST with an
//! upload preset, answered by a JSON document whose `secure_url` points at
//! the hosted image. Analysis never starts until this adapter has returned
//! a URL, so misconfiguration surfaces as its own error before any stream
//! is opened.

use capture::ImageData;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("object store is not configured: {0}")]
    Misconfigured(&'static str),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("object store rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("object store response carried no secure_url")]
    MissingUrl,
}

/// Success and error shapes of the store's JSON responses.
#[derive(Debug, Default, Deserialize)]
struct UploadReceipt {
    secure_url: Option<String>,
    message: Option<String>,
    error: Option<ReceiptError>,
}

#[derive(Debug, Deserialize)]
struct ReceiptError {
    message: Option<String>,
}

pub struct ObjectStore {
    endpoint: String,
    preset: String,
    client: reqwest::Client,
}

impl ObjectStore {
    pub fn new(endpoint: impl Into<String>, preset: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            preset: preset.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Read `MUSECAM_UPLOAD_URL` and `MUSECAM_UPLOAD_PRESET`.
    pub fn from_env() -> Result<Self, UploadError> {
        let endpoint = std::env::var("MUSECAM_UPLOAD_URL")
            .map_err(|_| UploadError::Misconfigured("MUSECAM_UPLOAD_URL is unset"))?;
        let preset = std::env::var("MUSECAM_UPLOAD_PRESET")
            .map_err(|_| UploadError::Misconfigured("MUSECAM_UPLOAD_PRESET is unset"))?;
        Ok(Self::new(endpoint, preset))
    }

    /// Push one image; returns its publicly fetchable URL.
    pub async fn upload(&self, image: &ImageData) -> Result<String, UploadError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name("capture")
            .mime_str(&image.mime)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.preset.clone());
        debug!(endpoint = %self.endpoint, len = image.len(), "uploading image");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let receipt: UploadReceipt = serde_json::from_str(&body).unwrap_or_default();

        if !status.is_success() {
            let message = receipt
                .message
                .or_else(|| receipt.error.and_then(|e| e.message))
                .unwrap_or_else(|| "upload failed".to_string());
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        let url = receipt.secure_url.ok_or(UploadError::MissingUrl)?;
        info!(%url, "image uploaded");
        Ok(url)
    }
}

/// Width-capped, auto-quality delivery variant of an uploaded image URL.
pub fn scaled_delivery_url(url: &str) -> String {
    url.replacen("/upload/", "/upload/w_800,q_auto/", 1)
}
