//! Image attribute normalization.
//!
//! Turns one authored [`ImageNode`] into the attributes of the `<img>` tag
//! the writer emits. The rules, in order:
//!
//! 1. `src` is the node's URI; explicit `width`/`height` are copied.
//! 2. With a `scale` and a missing dimension, the natural size is read from
//!    the file at `src` when a backend is available. Lookup failures are
//!    ignored and the dimension stays unset.
//! 3. With a `scale`, each dimension becomes `value * scale / 100`, keeping
//!    its unit (`"10em"` at 50% → `"5.0em"`).
//! 4. Unitless dimensions get `px` and move into an inline `style`
//!    (`width: 50.0px; height: 20px;`); no bare `width`/`height` attributes
//!    are emitted.
//! 5. `alt` falls back to `src`.
//! 6. Inline images (inside running text, or inside a link that is not
//!    itself inside running text) get no trailing newline; block images do.
//! 7. `align=center` wraps a block image in
//!    `<div align="center" class="align-center">`, and becomes
//!    `align="middle"` on an inline image. Other tokens are used as-is.
//!    Any alignment also adds `class="align-<token>"`.
//!
//! [`normalize`] is pure apart from the optional size lookup; the HTML
//! translator renders the returned [`ImageMarkup`].

use crate::document::{Align, ImageNode, NodeKind};
use crate::imaging::ImageBackend;
use log::debug;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9.]+)(\S*)$").expect("length pattern is valid"));
static UNITLESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9.]+$").expect("unitless pattern is valid"));

/// A dimension that could not be scaled because it is not `<number><unit>`.
#[derive(Error, Debug, PartialEq)]
#[error("malformed {attribute} {value:?} on image {uri}")]
pub struct MalformedLength {
    pub attribute: &'static str,
    pub value: String,
    pub uri: String,
}

/// Where an image sits relative to running text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inline,
    Block,
}

impl Placement {
    /// Classify an image from the kinds of its ancestors (outermost first).
    pub fn of(parents: &[NodeKind]) -> Self {
        let mut up = parents.iter().rev();
        let parent = up.next().copied();
        let grandparent = up.next().copied();
        match parent {
            Some(p) if p.is_text_element() => Placement::Inline,
            Some(NodeKind::Reference) if !grandparent.is_some_and(NodeKind::is_text_element) => {
                Placement::Inline
            }
            _ => Placement::Block,
        }
    }
}

/// Final attributes of the `<img>` tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttributes {
    pub src: String,
    pub alt: String,
    pub style: Option<String>,
    pub align: Option<&'static str>,
    pub class: Option<String>,
}

impl ImageAttributes {
    /// Attribute pairs sorted by name, the order they are emitted in.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("alt", self.alt.as_str()), ("src", self.src.as_str())];
        if let Some(align) = self.align {
            pairs.push(("align", align));
        }
        if let Some(class) = &self.class {
            pairs.push(("class", class.as_str()));
        }
        if let Some(style) = &self.style {
            pairs.push(("style", style.as_str()));
        }
        pairs.sort_by_key(|(name, _)| *name);
        pairs
    }
}

/// Everything needed to emit one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMarkup {
    pub attributes: ImageAttributes,
    /// Wrap the tag in a centered `<div>`.
    pub centered_block: bool,
    /// Appended right after the tag.
    pub suffix: &'static str,
}

impl ImageMarkup {
    pub const CENTER_OPEN: &'static str = r#"<div align="center" class="align-center">"#;
    pub const CENTER_CLOSE: &'static str = "</div>\n";

    /// Markup emitted once the image's children (none) are done.
    pub fn closing(&self) -> &'static str {
        if self.centered_block {
            Self::CENTER_CLOSE
        } else {
            ""
        }
    }
}

/// Format a computed length with 12 significant digits, always keeping a
/// decimal point or exponent (`50.0`, `12.5`, `0.3`, `1e+16`).
fn format_scaled(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    // Round to 12 significant digits first; the exponent comes out of that.
    let sci = format!("{value:.11e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..12).contains(&exponent) {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }

    let precision = (11 - exponent) as usize;
    let fixed = format!("{value:.precision$}");
    let mut out = trim_fraction(&fixed).to_string();
    if !out.contains('.') {
        out.push_str(".0");
    }
    out
}

/// Drop trailing zeros after a decimal point, and the point if nothing is left.
fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn scale_length(
    attribute: &'static str,
    value: &str,
    scale: u32,
    uri: &str,
) -> Result<String, MalformedLength> {
    let malformed = || MalformedLength {
        attribute,
        value: value.to_string(),
        uri: uri.to_string(),
    };
    let caps = LENGTH.captures(value).ok_or_else(malformed)?;
    let number: f64 = caps[1].parse().map_err(|_| malformed())?;
    let scaled = number * (f64::from(scale) / 100.0);
    Ok(format!("{}{}", format_scaled(scaled), &caps[2]))
}

/// Fill missing dimensions from the image file. Failures leave them unset.
fn natural_size(
    backend: &dyn ImageBackend,
    src: &str,
    width: &mut Option<String>,
    height: &mut Option<String>,
) {
    match backend.identify(Path::new(src)) {
        Ok(dims) => {
            width.get_or_insert_with(|| dims.width.to_string());
            height.get_or_insert_with(|| dims.height.to_string());
        }
        Err(e) => debug!("no natural size for {src}: {e}"),
    }
}

/// Compute the markup for one image node.
pub fn normalize(
    image: &ImageNode,
    placement: Placement,
    backend: Option<&dyn ImageBackend>,
) -> Result<ImageMarkup, MalformedLength> {
    let src = image.uri.clone();
    let mut width = image.width.clone();
    let mut height = image.height.clone();

    if let Some(scale) = image.scale {
        if let Some(backend) = backend {
            if width.is_none() || height.is_none() {
                natural_size(backend, &src, &mut width, &mut height);
            }
        }
        if let Some(w) = &width {
            width = Some(scale_length("width", w, scale, &src)?);
        }
        if let Some(h) = &height {
            height = Some(scale_length("height", h, scale, &src)?);
        }
    }

    let style: Vec<String> = [("width", width), ("height", height)]
        .into_iter()
        .filter_map(|(property, value)| {
            value.map(|mut v| {
                if UNITLESS.is_match(&v) {
                    v.push_str("px");
                }
                format!("{property}: {v};")
            })
        })
        .collect();

    let alt = image.alt.clone().unwrap_or_else(|| src.clone());

    let mut suffix = match placement {
        Placement::Inline => "",
        Placement::Block => "\n",
    };
    let mut centered_block = false;
    let align = match image.align {
        Some(Align::Center) if placement == Placement::Block => {
            centered_block = true;
            suffix = "";
            None
        }
        Some(Align::Center) => Some(Align::Middle.as_str()),
        Some(other) => Some(other.as_str()),
        None => None,
    };
    let class = image.align.map(|a| format!("align-{}", a.as_str()));

    Ok(ImageMarkup {
        attributes: ImageAttributes {
            src,
            alt,
            style: (!style.is_empty()).then(|| style.join(" ")),
            align,
            class,
        },
        centered_block,
        suffix,
    })
}
