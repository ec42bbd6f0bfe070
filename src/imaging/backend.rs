//! Image backend trait and shared types.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use
//! [`tests::MockBackend`], which hands out canned dimensions and records
//! every path it was asked about.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported path: {0}")]
    UnsupportedPath(String),
    #[error("Decoding failed: {0}")]
    DecodeFailed(String),
}

/// Natural pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Reads image properties without decoding pixel data.
pub trait ImageBackend {
    /// Get the natural dimensions of the image at `path`.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;
}
