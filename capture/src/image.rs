use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::source::CaptureError;

/// Smallest payload accepted as a real photo. Anything shorter is assumed
/// to be a truncated or placeholder capture.
pub const MIN_IMAGE_BYTES: usize = 100;

/// One captured photo, ready for upload or display.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageData {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Wrap raw bytes, rejecting payloads too small to be a photo.
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CaptureError> {
        if bytes.len() < MIN_IMAGE_BYTES {
            return Err(CaptureError::TooSmall(bytes.len()));
        }
        Ok(Self {
            mime: mime.into(),
            bytes,
        })
    }

    /// Encode as a `data:` URL suitable for direct display.
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, encoded)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
