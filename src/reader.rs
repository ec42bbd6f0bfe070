//! Source readers: Markdown and JSON into a [`Document`].
//!
//! ## Markdown
//!
//! Parsed with `pulldown-cmark` and mapped onto the document model:
//!
//! | Markdown | Node |
//! |---|---|
//! | `# Heading` | `Title { level }` (first level-1 heading is also the document title) |
//! | paragraph, `*em*`, `**strong**`, `` `code` `` | `Paragraph`, `Emphasis`, `Strong`, `Literal` |
//! | `[text](url)` | `Reference` |
//! | `![alt](src){width=200 scale=50 align=center}` | `Image` |
//! | lists, block quotes, fenced code, `---` | `BulletList`/`EnumeratedList`, `BlockQuote`, `LiteralBlock`, `Transition` |
//! | `<meta name="…" content="…">` in an HTML block | `Meta` |
//! | any other HTML | `Raw` |
//!
//! Navigation metadata goes in an HTML block of its own, usually at the top:
//!
//! ```markdown
//! <meta name="navigation.order" content="3">
//! <meta name="navigation.name" content="Getting started">
//!
//! # Getting started
//! ```
//!
//! The attribute list after an image accepts `width`, `height`, `scale`
//! (integer percent), `align` (`top|middle|bottom|left|center|right`) and
//! `alt`. Values may be double-quoted.
//!
//! ## JSON
//!
//! A serialized [`Document`] (see [`crate::document`]).

use crate::document::{Align, Document, ImageNode, Node};
use log::warn;
use pulldown_cmark::{Event, Options, Parser, Tag, TextMergeStream};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

static META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+name\s*=\s*"([^"]*)"\s+content\s*=\s*"([^"]*)"\s*/?>"#)
        .expect("meta pattern is valid")
});

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid image attribute {attribute}={value:?}")]
    InvalidAttribute { attribute: String, value: String },
}

/// Read a document, choosing the reader from the file extension:
/// `.json` is a serialized tree, anything else is Markdown.
pub fn read_document(path: &Path) -> Result<Document, ReadError> {
    let text = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&text)?)
    } else {
        parse_markdown(&text)
    }
}

/// Whether `path` has an extension one of the readers handles.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ["md", "markdown", "json"].iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Parse Markdown into a document.
pub fn parse_markdown(text: &str) -> Result<Document, ReadError> {
    let mut builder = TreeBuilder::new();
    for event in TextMergeStream::new(Parser::new_ext(text, Options::empty())) {
        builder.event(event)?;
    }
    Ok(builder.finish())
}

/// Container currently being filled.
enum Frame {
    Paragraph,
    Heading(u8),
    Emphasis,
    Strong,
    Link(String),
    Image(ImageNode),
    BulletList,
    EnumeratedList,
    Item,
    BlockQuote,
    CodeBlock,
    HtmlBlock,
    /// Constructs with no node of their own; children go to the parent.
    Transparent,
}

struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<(Frame, Vec<Node>)>,
    /// Raw text for code and HTML blocks.
    verbatim: String,
    /// An image just closed, so a `{…}` attribute list may follow.
    after_image: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
            verbatim: String::new(),
            after_image: false,
        }
    }

    fn children(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn push(&mut self, node: Node) {
        self.children().push(node);
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ReadError> {
        let after_image = std::mem::take(&mut self.after_image);
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text, after_image)?,
            Event::Code(code) => self.push(Node::Literal {
                text: code.to_string(),
            }),
            Event::Html(html) => self.verbatim.push_str(&html),
            Event::InlineHtml(html) => self.push(Node::Raw {
                html: html.to_string(),
            }),
            Event::SoftBreak => self.text("\n", false)?,
            Event::HardBreak => self.push(Node::Raw {
                html: "<br />\n".to_string(),
            }),
            Event::Rule => self.push(Node::Transition),
            _ => {}
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => Frame::Heading(level as u8),
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Link { dest_url, .. } => Frame::Link(dest_url.to_string()),
            Tag::Image { dest_url, .. } => Frame::Image(ImageNode::new(dest_url.to_string())),
            Tag::List(None) => Frame::BulletList,
            Tag::List(Some(_)) => Frame::EnumeratedList,
            Tag::Item => Frame::Item,
            Tag::BlockQuote(_) => Frame::BlockQuote,
            Tag::CodeBlock(_) => Frame::CodeBlock,
            Tag::HtmlBlock => Frame::HtmlBlock,
            _ => Frame::Transparent,
        };
        if matches!(frame, Frame::CodeBlock | Frame::HtmlBlock) {
            self.verbatim.clear();
        }
        self.stack.push((frame, Vec::new()));
    }

    fn end(&mut self) {
        let Some((frame, children)) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Paragraph => self.push(Node::Paragraph { children }),
            Frame::Heading(level) => self.push(Node::Title { level, children }),
            Frame::Emphasis => self.push(Node::Emphasis { children }),
            Frame::Strong => self.push(Node::Strong { children }),
            Frame::Link(refuri) => self.push(Node::Reference { refuri, children }),
            Frame::Image(mut image) => {
                let alt: String = children.iter().map(Node::plain_text).collect();
                image.alt = (!alt.is_empty()).then_some(alt);
                self.push(Node::Image(image));
                self.after_image = true;
            }
            Frame::BulletList => self.push(Node::BulletList { children }),
            Frame::EnumeratedList => self.push(Node::EnumeratedList { children }),
            Frame::Item => self.push(Node::ListItem {
                children: wrap_inline_runs(children),
            }),
            Frame::BlockQuote => self.push(Node::BlockQuote { children }),
            Frame::CodeBlock => {
                let text = std::mem::take(&mut self.verbatim);
                self.push(Node::LiteralBlock { text });
            }
            Frame::HtmlBlock => {
                let html = std::mem::take(&mut self.verbatim);
                self.html_block(&html);
            }
            Frame::Transparent => self.children().extend(children),
        }
    }

    fn text(&mut self, text: &str, after_image: bool) -> Result<(), ReadError> {
        if matches!(
            self.stack.last(),
            Some((Frame::CodeBlock | Frame::HtmlBlock, _))
        ) {
            self.verbatim.push_str(text);
            return Ok(());
        }
        let mut text = text;
        if after_image && text.starts_with('{') {
            if let Some(close) = text.find('}') {
                let attributes = &text[1..close];
                if let Some(Node::Image(image)) = self.children().last_mut() {
                    apply_image_attributes(image, attributes)?;
                }
                text = &text[close + 1..];
            }
        }
        if !text.is_empty() {
            self.push(Node::text(text));
        }
        Ok(())
    }

    /// Split an HTML block into `Meta` nodes and whatever raw HTML remains.
    fn html_block(&mut self, html: &str) {
        let metas: Vec<Node> = META_TAG
            .captures_iter(html)
            .map(|caps| Node::meta(&caps[1], &caps[2]))
            .collect();
        let rest = META_TAG.replace_all(html, "");
        self.children().extend(metas);
        if !rest.trim().is_empty() {
            self.push(Node::Raw {
                html: html_without_blank_lines(&rest),
            });
        }
    }

    fn finish(mut self) -> Document {
        while !self.stack.is_empty() {
            self.end();
        }
        let children = self.root;
        let title = children.iter().find_map(|node| match node {
            Node::Title { level: 1, .. } => Some(node.plain_text()),
            _ => None,
        });
        Document { title, children }
    }
}

/// Tight list items carry their text directly; give each run of inline
/// nodes a paragraph so it counts as running text.
fn wrap_inline_runs(children: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::new();
    let mut run = Vec::new();
    for child in children {
        if is_inline(&child) {
            run.push(child);
            continue;
        }
        if !run.is_empty() {
            out.push(Node::paragraph(std::mem::take(&mut run)));
        }
        out.push(child);
    }
    if !run.is_empty() {
        out.push(Node::paragraph(run));
    }
    out
}

fn is_inline(node: &Node) -> bool {
    matches!(
        node,
        Node::Text { .. }
            | Node::Emphasis { .. }
            | Node::Strong { .. }
            | Node::Literal { .. }
            | Node::Reference { .. }
            | Node::Image(_)
            | Node::Raw { .. }
    )
}

fn html_without_blank_lines(html: &str) -> String {
    let mut out: String = html
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}

fn unquote_value(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Apply a `{key=value …}` list to an image.
fn apply_image_attributes(image: &mut ImageNode, attributes: &str) -> Result<(), ReadError> {
    let invalid = |attribute: &str, value: &str| ReadError::InvalidAttribute {
        attribute: attribute.to_string(),
        value: value.to_string(),
    };
    for token in split_attributes(attributes) {
        let Some((key, value)) = token.split_once('=') else {
            warn!("ignoring image attribute without value: {token:?}");
            continue;
        };
        let value = unquote_value(value);
        match key {
            "width" => image.width = Some(value.to_string()),
            "height" => image.height = Some(value.to_string()),
            "alt" => image.alt = Some(value.to_string()),
            "scale" => {
                let scale = value
                    .trim_end_matches('%')
                    .parse()
                    .map_err(|_| invalid(key, value))?;
                image.scale = Some(scale);
            }
            "align" => image.align = Some(Align::parse(value).ok_or_else(|| invalid(key, value))?),
            other => warn!("unknown image attribute {other:?} on {}", image.uri),
        }
    }
    Ok(())
}

/// Whitespace-separated tokens; double quotes group spaces.
fn split_attributes(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                start.get_or_insert(i);
            }
            c if c.is_whitespace() && !in_quotes => {
                if let Some(st) = start.take() {
                    tokens.push(&s[st..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(st) = start {
        tokens.push(&s[st..]);
    }
    tokens
}
