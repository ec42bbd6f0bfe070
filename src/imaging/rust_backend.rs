//! Pure Rust backend built on the `image` crate ecosystem.
//!
//! Only headers are read: `image::image_dimensions` stops after the format
//! header, and AVIF sizes come from the container's `ispe` box via
//! `avif-parse`, so no pixel data is ever decoded.

use super::backend::{BackendError, Dimensions, ImageBackend};
use std::path::Path;

pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

/// Reject paths that cannot name a local file: non-UTF-8, NUL bytes, URLs.
fn check_local_path(path: &Path) -> Result<(), BackendError> {
    let Some(s) = path.to_str() else {
        return Err(BackendError::UnsupportedPath(
            path.to_string_lossy().to_string(),
        ));
    };
    if s.contains('\0') || s.contains("://") {
        return Err(BackendError::UnsupportedPath(s.to_string()));
    }
    Ok(())
}

/// Extract dimensions from an AVIF file's container metadata.
fn identify_avif(path: &Path) -> Result<Dimensions, BackendError> {
    let file_data = std::fs::read(path)?;
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&file_data)).map_err(|e| {
        BackendError::DecodeFailed(format!("Failed to parse AVIF {}: {e:?}", path.display()))
    })?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        BackendError::DecodeFailed(format!(
            "Failed to read AVIF metadata {}: {e:?}",
            path.display()
        ))
    })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        check_local_path(path)?;
        if is_avif(path) {
            return identify_avif(path);
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| match e {
            image::ImageError::IoError(io) => BackendError::Io(io),
            other => BackendError::DecodeFailed(format!(
                "Failed to read dimensions of {}: {other}",
                path.display()
            )),
        })?;
        Ok(Dimensions { width, height })
    }
}
