//! Filename and path conventions shared by the writer.
//!
//! Every generated page has two siblings derived from its destination path:
//!
//! - the **navigation name** default: the file stem, capitalized
//!   (`out/getting-started.html` → "Getting-started")
//! - the **sidecar file**: the destination with its extension swapped for
//!   `.nav` (`out/getting-started.html` → `out/getting-started.nav`)
//!
//! Asset links (favicon, navigation stylesheet) live next to the configured
//! stylesheet and are referenced from the page by a path relative to the
//! page's own location, computed lexically by [`relative_path`].

use std::io;
use std::path::{Component, Path, PathBuf};

/// Extension of the navigation sidecar file.
pub const SIDECAR_EXTENSION: &str = "nav";

/// Uppercase the first character and lowercase the rest.
///
/// `"getting-Started"` → `"Getting-started"`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Default navigation name for a page: its capitalized file stem.
pub fn default_nav_name(destination: &Path) -> String {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    capitalize(&stem)
}

/// Path of the navigation sidecar written next to `destination`.
pub fn sidecar_path(destination: &Path) -> PathBuf {
    destination.with_extension(SIDECAR_EXTENSION)
}

/// A file named `name` in the same directory as the stylesheet.
pub fn sibling_asset(stylesheet_path: &Path, name: &str) -> PathBuf {
    match stylesheet_path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Make `path` absolute against the current directory and resolve `.`/`..`
/// lexically (symlinks are not followed).
fn lexical_absolute(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

fn parts(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Prefix(p) => Some(p.as_os_str().to_string_lossy().to_string()),
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}

/// URL path from the file `source` to `target`, `/`-separated.
///
/// Both paths are made absolute first. When they do not even share their
/// top-level directory the absolute target is returned instead.
///
/// ```text
/// relative_path("/site/out/guide.html", "/site/style/favicon.png") == "../style/favicon.png"
/// ```
pub fn relative_path(source: &Path, target: &Path) -> io::Result<String> {
    let source = parts(&lexical_absolute(source)?);
    let target = parts(&lexical_absolute(target)?);

    if source.first() != target.first() {
        return Ok(format!("/{}", target.join("/")));
    }

    let common = source
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();
    // The last source component is the file itself, not a directory to climb out of.
    let ups = (source.len() - common).saturating_sub(1);

    let mut segments: Vec<&str> = std::iter::repeat_n("..", ups).collect();
    segments.extend(target[common..].iter().map(String::as_str));
    Ok(segments.join("/"))
}
