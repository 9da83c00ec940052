//! Image acquisition for MuseCam.
//!
//! A capture source produces a single [`ImageData`] blob no matter whether
//! the bytes came from a live camera or a file picker. The rest of the
//! application only ever sees the blob.

pub mod image;
pub mod source;

pub use image::{ImageData, MIN_IMAGE_BYTES};
pub use source::{CaptureError, FilePicker, ImageSource, StaticImage};
