//! Single-file and directory-tree translation.
//!
//! [`translate_file`] reads one source document, translates it, and writes
//! the page plus its sidecar. [`build_tree`] does the same for every source
//! file under a directory, mirroring the directory layout into the output
//! directory:
//!
//! ```text
//! docs/index.md          →  site/index.html   + site/index.nav
//! docs/guide/intro.md    →  site/guide/intro.html + site/guide/intro.nav
//! docs/api.json          →  site/api.html     + site/api.nav
//! ```
//!
//! Image paths in documents are probed as written, relative to the working
//! directory.

use crate::config::WriterConfig;
use crate::html::{self, Settings, TranslateError};
use crate::imaging::{ImageBackend, RustBackend};
use crate::navigation::NavigationRecord;
use crate::reader::{self, ReadError};
use log::debug;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{path}: {source}")]
    Read { path: PathBuf, source: ReadError },
    #[error("{path}: {source}")]
    Translate {
        path: PathBuf,
        source: TranslateError,
    },
}

/// What was written for one source document.
#[derive(Debug, Clone)]
pub struct PageResult {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub sidecar: PathBuf,
    pub title: String,
    pub record: NavigationRecord,
    pub images: usize,
}

fn backend_for(config: &WriterConfig) -> Option<RustBackend> {
    config.images.introspect.then(RustBackend::new)
}

/// Translate `source` and write the page to `destination`.
pub fn translate_file(
    source: &Path,
    destination: &Path,
    config: &WriterConfig,
) -> Result<PageResult, BuildError> {
    let backend = backend_for(config);
    translate_with(source, destination, config, backend.as_ref().map(|b| b as &dyn ImageBackend))
}

fn translate_with(
    source: &Path,
    destination: &Path,
    config: &WriterConfig,
    backend: Option<&dyn ImageBackend>,
) -> Result<PageResult, BuildError> {
    let document = reader::read_document(source).map_err(|e| BuildError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let settings = Settings::new(destination, config);
    let translate_err = |e| BuildError::Translate {
        path: source.to_path_buf(),
        source: e,
    };
    let translation = html::translate(&document, &settings, backend).map_err(translate_err)?;
    let sidecar = translation.write().map_err(translate_err)?;

    Ok(PageResult {
        source: source.to_path_buf(),
        destination: translation.destination,
        sidecar,
        title: translation.title,
        record: translation.record,
        images: translation.images,
    })
}

/// Output path of `source` when `source_dir` is mirrored into `output_dir`.
pub fn destination_for(source_dir: &Path, output_dir: &Path, source: &Path) -> PathBuf {
    let relative = source.strip_prefix(source_dir).unwrap_or(source);
    output_dir.join(relative).with_extension("html")
}

/// Source documents under `source_dir`, sorted, skipping `output_dir`.
pub fn collect_sources(source_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(source_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != output_dir);
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && reader::is_source_file(entry.path()) {
            sources.push(entry.into_path());
        } else {
            debug!("skipping {}", entry.path().display());
        }
    }
    Ok(sources)
}

/// Translate every source document under `source_dir` into `output_dir`.
///
/// Stops at the first failing document.
pub fn build_tree(
    source_dir: &Path,
    output_dir: &Path,
    config: &WriterConfig,
) -> Result<Vec<PageResult>, BuildError> {
    let backend = backend_for(config);
    let backend = backend.as_ref().map(|b| b as &dyn ImageBackend);

    collect_sources(source_dir, output_dir)?
        .iter()
        .map(|source| {
            let destination = destination_for(source_dir, output_dir, source);
            translate_with(source, &destination, config, backend)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::NAV_PLACEHOLDER;
    use crate::navigation;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn destination_mirrors_source_layout() {
        assert_eq!(
            destination_for(Path::new("docs"), Path::new("site"), Path::new("docs/guide/intro.md")),
            PathBuf::from("site/guide/intro.html")
        );
    }

    #[test]
    fn collect_sources_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path();
        write_file(src, "b.md", "# B");
        write_file(src, "a.json", r#"{"children": []}"#);
        write_file(src, "notes.txt", "ignored");
        write_file(src, "sub/c.markdown", "# C");

        let sources = collect_sources(src, &src.join("out")).unwrap();
        let names: Vec<_> = sources
            .iter()
            .map(|p| p.strip_prefix(src).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.json", "b.md", "sub/c.markdown"]);
    }

    #[test]
    fn collect_sources_skips_output_dir_inside_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path();
        write_file(src, "page.md", "# Page");
        write_file(src, "out/stale.md", "# Stale");

        let sources = collect_sources(src, &src.join("out")).unwrap();
        assert_eq!(sources, vec![src.join("page.md")]);
    }

    #[test]
    fn translate_file_writes_page_and_sidecar() {
        let tmp = TempDir::new().unwrap();
        let source = write_file(
            tmp.path(),
            "about.md",
            "<meta name=\"navigation.order\" content=\"4\">\n\n# About us\n\nHello.\n",
        );
        let destination = tmp.path().join("out/about.html");

        let result = translate_file(&source, &destination, &WriterConfig::default()).unwrap();

        assert_eq!(result.title, "About us");
        assert_eq!(result.record.name, "About");
        assert_eq!(result.record.order, Some(4));
        assert_eq!(result.sidecar, tmp.path().join("out/about.nav"));
        let page = fs::read_to_string(&destination).unwrap();
        assert!(page.contains(NAV_PLACEHOLDER));
        assert!(page.contains("<p>Hello.</p>"));
    }

    #[test]
    fn translate_file_probes_real_image() {
        let tmp = TempDir::new().unwrap();
        let image_path = tmp.path().join("photo.png");
        write_png(&image_path, 40, 20);
        let source = write_file(
            tmp.path(),
            "gallery.md",
            &format!("![photo]({}){{scale=50}}\n", image_path.display()),
        );

        let result =
            translate_file(&source, &tmp.path().join("gallery.html"), &WriterConfig::default())
                .unwrap();

        assert_eq!(result.images, 1);
        let page = fs::read_to_string(tmp.path().join("gallery.html")).unwrap();
        assert!(page.contains("style=\"width: 20.0px; height: 10.0px;\""));
    }

    #[test]
    fn translate_file_without_introspection_skips_probe() {
        let tmp = TempDir::new().unwrap();
        let image_path = tmp.path().join("photo.png");
        write_png(&image_path, 40, 20);
        let source = write_file(
            tmp.path(),
            "gallery.md",
            &format!("![photo]({}){{scale=50}}\n", image_path.display()),
        );
        let mut config = WriterConfig::default();
        config.images.introspect = false;

        translate_file(&source, &tmp.path().join("gallery.html"), &config).unwrap();

        let page = fs::read_to_string(tmp.path().join("gallery.html")).unwrap();
        assert!(!page.contains("style="));
    }

    #[test]
    fn translate_file_reports_failing_source() {
        let tmp = TempDir::new().unwrap();
        let source = write_file(
            tmp.path(),
            "bad.md",
            "<meta name=\"navigation.order\" content=\"first\">\n",
        );

        let err = translate_file(&source, &tmp.path().join("bad.html"), &WriterConfig::default())
            .unwrap_err();

        assert!(matches!(err, BuildError::Translate { .. }));
        assert!(err.to_string().contains("bad.md"));
        assert!(!tmp.path().join("bad.html").exists());
    }

    #[test]
    fn build_tree_translates_every_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("docs");
        let out = tmp.path().join("site");
        write_file(&src, "index.md", "# Home\n");
        write_file(
            &src,
            "guide/intro.md",
            "<meta name=\"navigation.visible\" content=\"false\">\n\n# Intro\n",
        );

        let results = build_tree(&src, &out, &WriterConfig::default()).unwrap();

        assert_eq!(results.len(), 2);
        assert!(out.join("index.html").exists());
        let intro = navigation::read_sidecar(&out.join("guide/intro.nav")).unwrap();
        assert_eq!(intro.name, "Intro");
        assert!(!intro.visible);
    }
}
