//! Navigation metadata: what a page says about its own place in the site nav.
//!
//! Pages declare navigation data through meta annotations named
//! `navigation.<key>`:
//!
//! | Meta name | Effect |
//! |---|---|
//! | `navigation.name` | Label shown in the nav (default: capitalized file stem) |
//! | `navigation.order` | Sort position, integer (default: last) |
//! | `navigation.visible` | `0`/`false` (any case) hides the page; anything else shows it |
//!
//! Unknown keys are reported with `log::warn!` and skipped.
//!
//! The collected [`NavigationRecord`] is written next to the page as a
//! `.nav` sidecar that the navigation renderer picks up later:
//!
//! ```text
//! # generated by htmlnav.py, do not edit
//! name = 'Getting started'
//! level = 0
//! visible = True
//! order = 3
//! ```
//!
//! The header line and the `True`/`False` spelling are what existing
//! sidecar consumers look for; keep them byte-for-byte.

use crate::document::Document;
use crate::naming;
use log::warn;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix that marks a meta annotation as navigation data.
pub const NAV_PREFIX: &str = "navigation.";

/// First line of every sidecar file.
pub const SIDECAR_HEADER: &str = "# generated by htmlnav.py, do not edit";

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("navigation.order must be an integer, got {0:?}")]
    InvalidOrder(String),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

fn parse_error(line: usize, message: impl Into<String>) -> NavigationError {
    NavigationError::Parse {
        line,
        message: message.into(),
    }
}

/// Navigation data for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRecord {
    pub name: String,
    /// Nesting depth in the nav tree.
    pub level: u32,
    pub visible: bool,
    /// `None` sorts after every explicit order.
    pub order: Option<i64>,
}

impl NavigationRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 0,
            visible: true,
            order: None,
        }
    }

    /// Default record for the page written to `destination`.
    pub fn for_destination(destination: &Path) -> Self {
        Self::new(naming::default_nav_name(destination))
    }

    /// Order as written to the sidecar; unset maps to `i64::MAX`.
    pub fn effective_order(&self) -> i64 {
        self.order.unwrap_or(i64::MAX)
    }

    /// Apply one `navigation.<key>` annotation.
    pub fn apply(mut self, key: &str, value: &str) -> Result<Self, NavigationError> {
        match key {
            "order" => {
                let order: i64 = value
                    .trim()
                    .parse()
                    .map_err(|_| NavigationError::InvalidOrder(value.to_string()))?;
                // i64::MAX is the unset sentinel in the sidecar.
                self.order = (order != i64::MAX).then_some(order);
            }
            "name" => self.name = value.to_string(),
            "visible" => self.visible = is_truthy(value),
            other => warn!("unknown navigation attribute {other:?}"),
        }
        Ok(self)
    }

    /// The `key = value` block written to the sidecar, without the header
    /// and without a trailing newline.
    pub fn export(&self) -> String {
        [
            format!("name = {}", quote(&self.name)),
            format!("level = {}", self.level),
            format!("visible = {}", if self.visible { "True" } else { "False" }),
            format!("order = {}", self.effective_order()),
        ]
        .join("\n")
    }

    /// Parse sidecar text back into a record.
    ///
    /// Comments and blank lines are skipped. `name` is required; the other
    /// keys fall back to their defaults. `order = i64::MAX` reads as unset.
    pub fn parse(text: &str) -> Result<Self, NavigationError> {
        let mut name = None;
        let mut record = Self::new("");
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| parse_error(line_no, format!("expected key = value, got {line:?}")))?;
            let value = value.trim();
            match key.trim() {
                "name" => name = Some(unquote(value).map_err(|m| parse_error(line_no, m))?),
                "level" => {
                    record.level = value
                        .parse()
                        .map_err(|_| parse_error(line_no, format!("bad level {value:?}")))?;
                }
                "visible" => {
                    record.visible = match value {
                        "True" => true,
                        "False" => false,
                        _ => return Err(parse_error(line_no, format!("bad visible {value:?}"))),
                    };
                }
                "order" => {
                    let order: i64 = value
                        .parse()
                        .map_err(|_| parse_error(line_no, format!("bad order {value:?}")))?;
                    record.order = (order != i64::MAX).then_some(order);
                }
                other => warn!("ignoring unknown sidecar key {other:?} on line {line_no}"),
            }
        }
        record.name = name.ok_or_else(|| parse_error(0, "missing name"))?;
        Ok(record)
    }
}

impl fmt::Display for NavigationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]{} {} order={}",
            self.level,
            quote(&self.name),
            if self.visible { "visible" } else { "" },
            self.effective_order()
        )
    }
}

/// `0` and `false` (any case) are false; everything else is true.
fn is_truthy(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower != "0" && lower != "false"
}

/// Quote a string as a single-line literal: single quotes unless the text
/// contains a single quote and no double quote; backslash escapes for the
/// quote, backslashes, and control characters.
fn quote(s: &str) -> String {
    let q = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(q);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == q => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{code:02x}"));
                } else {
                    out.push_str(&format!("\\u{code:04x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push(q);
    out
}

/// Inverse of [`quote`].
fn unquote(s: &str) -> Result<String, String> {
    let mut chars = s.chars();
    let q = match chars.next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(format!("expected quoted string, got {s:?}")),
    };
    if s.len() < 2 || !s.ends_with(q) {
        return Err(format!("unterminated string {s:?}"));
    }
    let inner = &s[1..s.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(kind @ ('x' | 'u' | 'U')) => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex: String = chars.by_ref().take(width).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == width)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("bad escape \\{kind}{hex} in {s:?}"))?;
                out.push(decoded);
            }
            Some(other) => return Err(format!("unknown escape \\{other} in {s:?}")),
            None => return Err(format!("dangling backslash in {s:?}")),
        }
    }
    Ok(out)
}

/// Fold the document's direct `navigation.*` metas into `record`.
pub fn scan_meta(
    document: &Document,
    record: NavigationRecord,
) -> Result<NavigationRecord, NavigationError> {
    document
        .metas()
        .filter_map(|meta| {
            meta.name
                .strip_prefix(NAV_PREFIX)
                .map(|key| (key, meta.content.as_str()))
        })
        .try_fold(record, |record, (key, value)| record.apply(key, value))
}

/// Write the sidecar for the page at `destination`, replacing any existing
/// file. Returns the sidecar path.
pub fn write_sidecar(
    destination: &Path,
    record: &NavigationRecord,
) -> Result<PathBuf, NavigationError> {
    let path = naming::sidecar_path(destination);
    fs::write(&path, format!("{SIDECAR_HEADER}\n{}\n", record.export()))?;
    Ok(path)
}

/// Read a sidecar file written by [`write_sidecar`].
pub fn read_sidecar(path: &Path) -> Result<NavigationRecord, NavigationError> {
    let text = fs::read_to_string(path)?;
    NavigationRecord::parse(&text)
}
