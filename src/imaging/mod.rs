//! Natural-size lookup for referenced images.
//!
//! | Format | Crate / function |
//! |---|---|
//! | JPEG, PNG, TIFF, WebP, GIF | `image::image_dimensions` (header only) |
//! | AVIF | `avif-parse` container metadata |
//!
//! The writer only ever asks one question of an image file: how big is it?
//! That question sits behind the [`ImageBackend`] trait so translation can
//! run with no backend at all (introspection disabled) or with a mock in
//! tests.

pub mod backend;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use rust_backend::RustBackend;
