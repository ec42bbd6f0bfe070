//! # htmlnav
//!
//! An HTML writer that turns documents into pages carrying navigation
//! metadata. Each page gets a `.nav` sidecar describing its entry in the
//! site navigation, and a placeholder block that a later navigation pass
//! replaces with the rendered menu.
//!
//! # Architecture: One Translation, Three Phases
//!
//! ```text
//! 1. Construct   destination  →  NavigationRecord  (defaults from the file name)
//! 2. Scan        document     →  NavigationRecord  (navigation.* meta values)
//! 3. Finalize    record       →  page.nav          (written once the body exists)
//! ```
//!
//! The body is produced in between by a visitor over the document tree. Image
//! markup goes through a pure normalizer that handles scale, units, and
//! alignment, optionally asking an image backend for natural dimensions.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`document`] | Document tree, node kinds, and the `Visitor`/`walk` traversal |
//! | [`reader`] | Markdown (pulldown-cmark) and JSON front ends producing a `Document` |
//! | [`image`] | Image attribute normalization: scale, units, inline/block alignment |
//! | [`navigation`] | `NavigationRecord`, meta scanning, sidecar export and parsing |
//! | [`html`] | The HTML translator, page assembly with Maud, writing page + sidecar |
//! | [`site`] | Single-file and directory-tree translation |
//! | [`config`] | `htmlnav.toml` loading, validation, and merging over stock defaults |
//! | [`naming`] | Navigation name, sidecar path, and relative link conventions |
//! | [`imaging`] | Image dimension probing behind the `ImageBackend` trait |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Record Threaded by Value
//!
//! The navigation record is built by folding meta annotations into it and is
//! handed to the sidecar writer when translation finishes. Nothing holds a
//! mutable record across the body walk.
//!
//! ## Unset Order Sorts Last
//!
//! A page without `navigation.order` keeps `order: None`. The sidecar writes
//! it as the largest 64-bit integer so any consumer sorting numerically puts
//! unordered pages after ordered ones.
//!
//! ## Maud for the Page Skeleton
//!
//! The page head and body wrapper are rendered with
//! [Maud](https://maud.lambda.xyz/), so every interpolated value is escaped.
//! The body, boilerplate, and placeholder are inserted pre-escaped.

pub mod config;
pub mod document;
pub mod html;
pub mod image;
pub mod imaging;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod reader;
pub mod site;

#[cfg(test)]
pub(crate) mod test_helpers;
