//! CLI output formatting.
//!
//! Output leads with what a page *is* (its navigation entry) and shows
//! filesystem paths as secondary context on indented lines.
//!
//! # Output Format
//!
//! ## Translate / Build
//!
//! ```text
//! 001 About us → out/about.html
//!     Source: docs/about.md
//!     Navigation: [0]'About' visible order=4
//!     Images: 2
//!
//! Translated 1 page, 2 images
//! ```
//!
//! ## Show
//!
//! ```text
//! Name: About
//! Level: 0
//! Visible: yes
//! Order: 4
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::navigation::NavigationRecord;
use crate::site::PageResult;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Lines for one written page.
///
/// ```text
/// 001 About us → out/about.html
///     Source: docs/about.md
///     Navigation: [0]'About' visible order=4
/// ```
pub fn format_page(index: usize, page: &PageResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} {} \u{2192} {}",
            format_index(index),
            page.title,
            page.destination.display()
        ),
        format!("    Source: {}", page.source.display()),
        format!("    Navigation: {}", page.record),
    ];
    if page.images > 0 {
        lines.push(format!("    Images: {}", page.images));
    }
    lines
}

/// Lines for a batch of written pages, followed by a summary.
pub fn format_build(pages: &[PageResult]) -> Vec<String> {
    let mut lines: Vec<String> = pages
        .iter()
        .enumerate()
        .flat_map(|(i, page)| format_page(i + 1, page))
        .collect();
    let images: usize = pages.iter().map(|p| p.images).sum();
    if !pages.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Translated {}, {}",
        plural(pages.len(), "page"),
        plural(images, "image")
    ));
    lines
}

/// Lines describing a navigation record read from a sidecar.
pub fn format_record(record: &NavigationRecord) -> Vec<String> {
    vec![
        format!("Name: {}", record.name),
        format!("Level: {}", record.level),
        format!("Visible: {}", if record.visible { "yes" } else { "no" }),
        match record.order {
            Some(order) => format!("Order: {order}"),
            None => "Order: (unordered)".to_string(),
        },
    ]
}

/// Print build output to stdout.
pub fn print_build(pages: &[PageResult]) {
    for line in format_build(pages) {
        println!("{}", line);
    }
}

/// Print a navigation record to stdout.
pub fn print_record(record: &NavigationRecord) {
    for line in format_record(record) {
        println!("{}", line);
    }
}
