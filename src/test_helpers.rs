//! Shared test utilities for the htmlnav test suite.
//!
//! Document builders and filesystem fixtures used across module tests.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let doc = doc_of(vec![Node::meta("navigation.order", "2")]);
//! let tmp = TempDir::new().unwrap();
//! let source = write_file(tmp.path(), "guide/intro.md", "# Intro\n");
//! write_png(&tmp.path().join("photo.png"), 40, 20);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{Document, Node};

// =========================================================================
// Document builders
// =========================================================================

/// An untitled document with the given top-level children.
pub fn doc_of(children: Vec<Node>) -> Document {
    Document {
        title: None,
        children,
    }
}

// =========================================================================
// Filesystem fixtures
// =========================================================================

/// Write `content` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Write a solid-color PNG of the given size.
pub fn write_png(path: &Path, width: u32, height: u32) {
    image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]))
        .save(path)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
}
