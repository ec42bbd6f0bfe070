//! HTML translation.
//!
//! [`HtmlTranslator`] is a [`Visitor`] that appends markup to a body buffer
//! as [`walk`] drives it through the document. Every `visit` pushes the
//! matching close onto a context stack and every `depart` pops it, so
//! nodes never need to remember how they were opened.
//!
//! [`translate`] runs one document end to end:
//!
//! ```text
//! 1. construct   NavigationRecord from the destination file name
//! 2. scan        direct navigation.* metas into the record
//! 3. walk        document body through the translator
//! 4. assemble    head + boilerplate + placeholder + body
//! ```
//!
//! and [`Translation::write`] puts the page and its `.nav` sidecar on disk.
//!
//! ## Page Boilerplate
//!
//! Between the document head and the body every page carries:
//!
//! - a favicon link to `favicon.png` next to the stylesheet
//! - a stylesheet link to `navigation.css` next to the stylesheet
//! - a script that breaks the page out of any enclosing frame
//! - the navigation placeholder, replaced later by the navigation renderer
//!
//! Asset links are relative to the page's own location.

use crate::config::WriterConfig;
use crate::document::{Document, ImageNode, MetaNode, Node, NodeKind, Visitor, walk};
use crate::image::{self, ImageMarkup, MalformedLength, Placement};
use crate::imaging::ImageBackend;
use crate::naming;
use crate::navigation::{self, NavigationError, NavigationRecord};
use log::info;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Marker block the navigation renderer searches for and replaces.
pub const NAV_PLACEHOLDER: &str = "<!-- bfknav -->\nImagine a navigation\n<!-- /bfknav -->\n";

const TOPFRAME_SCRIPT: &str = "
<!--
window.onload = function() {
  if (top.location != location) {
    top.location.href = document.location.href;
  }
}
// -->
";

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),
    #[error("Image error: {0}")]
    Image(#[from] MalformedLength),
}

/// Per-page settings: where the page goes and where the shared assets live.
#[derive(Debug, Clone)]
pub struct Settings {
    pub destination: PathBuf,
    pub stylesheet_path: PathBuf,
    pub lang: String,
}

impl Settings {
    pub fn new(destination: impl Into<PathBuf>, config: &WriterConfig) -> Self {
        Self {
            destination: destination.into(),
            stylesheet_path: PathBuf::from(&config.stylesheet_path),
            lang: config.lang.clone(),
        }
    }

    /// Link target for a stylesheet-relative asset, relative to the page.
    fn asset_href(&self, name: &str) -> std::io::Result<String> {
        let asset = naming::sibling_asset(&self.stylesheet_path, name);
        naming::relative_path(&self.destination, &asset)
    }
}

/// Escape text for use in element content or attribute values.
pub fn encode(text: &str) -> String {
    html! { (text) }.into_string()
}

/// A self-closing tag with attributes in the given order, plus `suffix`.
pub fn empty_tag(name: &str, attributes: &[(&str, &str)], suffix: &str) -> String {
    let mut tag = format!("<{name}");
    for (attr, value) in attributes {
        tag.push_str(&format!(" {attr}=\"{}\"", encode(value)));
    }
    tag.push_str(" />");
    tag.push_str(suffix);
    tag
}

/// Visitor that renders the document body.
pub struct HtmlTranslator<'a> {
    backend: Option<&'a dyn ImageBackend>,
    body: Vec<String>,
    context: Vec<String>,
    images: usize,
}

impl<'a> HtmlTranslator<'a> {
    pub fn new(backend: Option<&'a dyn ImageBackend>) -> Self {
        Self {
            backend,
            body: Vec::new(),
            context: Vec::new(),
            images: 0,
        }
    }

    pub fn body(&self) -> String {
        self.body.concat()
    }

    /// Number of images emitted so far.
    pub fn images(&self) -> usize {
        self.images
    }

    fn open(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.body.push(start.into());
        self.context.push(end.into());
    }

    fn visit_image(&mut self, node: &ImageNode, parents: &[NodeKind]) -> Result<(), MalformedLength> {
        let markup = image::normalize(node, Placement::of(parents), self.backend)?;
        if markup.centered_block {
            self.body.push(ImageMarkup::CENTER_OPEN.to_string());
        }
        let pairs = markup.attributes.pairs();
        let tag = empty_tag("img", &pairs, markup.suffix);
        self.open(tag, markup.closing());
        self.images += 1;
        Ok(())
    }
}

impl Visitor for HtmlTranslator<'_> {
    type Error = TranslateError;

    fn visit(&mut self, node: &Node, parents: &[NodeKind]) -> Result<(), TranslateError> {
        match node {
            Node::Section { .. } => self.open("<div class=\"section\">\n", "</div>\n"),
            Node::Title { level, .. } => {
                let level = (*level).clamp(1, 6);
                self.open(format!("<h{level}>"), format!("</h{level}>\n"));
            }
            Node::Paragraph { .. } => self.open("<p>", "</p>\n"),
            Node::Emphasis { .. } => self.open("<em>", "</em>"),
            Node::Strong { .. } => self.open("<strong>", "</strong>"),
            Node::Literal { text } => self.open(
                format!("<code class=\"literal\">{}", encode(text)),
                "</code>",
            ),
            Node::Text { text } => self.open(encode(text), ""),
            Node::Reference { refuri, .. } => self.open(
                format!("<a class=\"reference\" href=\"{}\">", encode(refuri)),
                "</a>",
            ),
            Node::Image(img) => self.visit_image(img, parents)?,
            // Rendered into the head by `render_page`.
            Node::Meta(_) => self.open("", ""),
            Node::BulletList { .. } => self.open("<ul>\n", "</ul>\n"),
            Node::EnumeratedList { .. } => self.open("<ol>\n", "</ol>\n"),
            Node::ListItem { .. } => self.open("<li>", "</li>\n"),
            Node::LiteralBlock { text } => self.open(
                format!("<pre class=\"literal-block\">\n{}", encode(text)),
                "</pre>\n",
            ),
            Node::BlockQuote { .. } => self.open("<blockquote>\n", "</blockquote>\n"),
            Node::Transition => self.open("<hr />\n", ""),
            Node::Raw { html } => self.open(html.clone(), ""),
        }
        Ok(())
    }

    fn depart(&mut self, _node: &Node, _parents: &[NodeKind]) -> Result<(), TranslateError> {
        if let Some(end) = self.context.pop() {
            self.body.push(end);
        }
        Ok(())
    }
}

/// Result of translating one document.
#[derive(Debug, Clone)]
pub struct Translation {
    pub destination: PathBuf,
    pub title: String,
    pub html: String,
    pub record: NavigationRecord,
    pub images: usize,
}

impl Translation {
    /// Write the page and its navigation sidecar, creating the destination
    /// directory if needed. Returns the sidecar path.
    pub fn write(&self) -> Result<PathBuf, TranslateError> {
        if let Some(dir) = self.destination.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.destination, &self.html)?;
        info!("wrote {}", self.destination.display());
        let sidecar = navigation::write_sidecar(&self.destination, &self.record)?;
        info!("wrote {}", sidecar.display());
        Ok(sidecar)
    }
}

/// Translate a document to a complete HTML page.
pub fn translate(
    document: &Document,
    settings: &Settings,
    backend: Option<&dyn ImageBackend>,
) -> Result<Translation, TranslateError> {
    let record = NavigationRecord::for_destination(&settings.destination);
    let record = navigation::scan_meta(document, record)?;

    let mut translator = HtmlTranslator::new(backend);
    walk(document, &mut translator)?;

    let title = document
        .title
        .clone()
        .unwrap_or_else(|| record.name.clone());
    let metas: Vec<&MetaNode> = document.metas().collect();
    let html = render_page(&title, &metas, settings, &translator.body())?.into_string();

    Ok(Translation {
        destination: settings.destination.clone(),
        title,
        html,
        record,
        images: translator.images(),
    })
}

fn render_page(
    title: &str,
    metas: &[&MetaNode],
    settings: &Settings,
    body: &str,
) -> std::io::Result<Markup> {
    let stylesheet = naming::relative_path(&settings.destination, &settings.stylesheet_path)?;
    let favicon = settings.asset_href("favicon.png")?;
    let nav_css = settings.asset_href("navigation.css")?;

    Ok(html! {
        (DOCTYPE)
        html lang=(settings.lang) {
            head {
                meta charset="utf-8";
                @for m in metas {
                    meta name=(m.name) content=(m.content);
                }
                title { (title) }
                link rel="stylesheet" href=(stylesheet) type="text/css";
                link rel="shortcut icon" type="image/x-icon" href=(favicon);
                link rel="stylesheet" href=(nav_css) type="text/css";
                script type="text/javascript" { (PreEscaped(TOPFRAME_SCRIPT)) }
            }
            "\n"
            body {
                "\n"
                (PreEscaped(NAV_PLACEHOLDER))
                (PreEscaped(body))
            }
            "\n"
        }
        "\n"
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Align;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn body_of(document: &Document) -> String {
        let mut translator = HtmlTranslator::new(None);
        walk(document, &mut translator).unwrap();
        translator.body()
    }

    fn settings() -> Settings {
        Settings {
            destination: PathBuf::from("/site/out/guide.html"),
            stylesheet_path: PathBuf::from("/site/style/default.css"),
            lang: "en".into(),
        }
    }

    // =========================================================================
    // Emission primitives
    // =========================================================================

    #[test]
    fn encode_escapes_markup() {
        assert_eq!(encode(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn empty_tag_renders_attributes_in_order() {
        assert_eq!(
            empty_tag("img", &[("alt", "a \"b\""), ("src", "x.png")], "\n"),
            "<img alt=\"a &quot;b&quot;\" src=\"x.png\" />\n"
        );
    }

    // =========================================================================
    // Body translation
    // =========================================================================

    #[test]
    fn paragraph_with_inline_markup() {
        let doc = doc_of(vec![Node::paragraph(vec![
            Node::text("a < b "),
            Node::Strong {
                children: vec![Node::text("bold")],
            },
            Node::Literal {
                text: "x&y".into(),
            },
        ])]);
        assert_eq!(
            body_of(&doc),
            "<p>a &lt; b <strong>bold</strong><code class=\"literal\">x&amp;y</code></p>\n"
        );
    }

    #[test]
    fn lists_and_titles() {
        let doc = doc_of(vec![
            Node::Title {
                level: 2,
                children: vec![Node::text("Intro")],
            },
            Node::BulletList {
                children: vec![Node::ListItem {
                    children: vec![Node::text("one")],
                }],
            },
            Node::Transition,
        ]);
        assert_eq!(
            body_of(&doc),
            "<h2>Intro</h2>\n<ul>\n<li>one</li>\n</ul>\n<hr />\n"
        );
    }

    #[test]
    fn reference_href_is_escaped() {
        let doc = doc_of(vec![Node::paragraph(vec![Node::reference(
            "/a?b=1&c=2",
            vec![Node::text("link")],
        )])]);
        assert_eq!(
            body_of(&doc),
            "<p><a class=\"reference\" href=\"/a?b=1&amp;c=2\">link</a></p>\n"
        );
    }

    #[test]
    fn metas_produce_no_body_markup() {
        let doc = doc_of(vec![Node::meta("navigation.order", "1")]);
        assert_eq!(body_of(&doc), "");
    }

    #[test]
    fn raw_html_passes_through() {
        let doc = doc_of(vec![Node::Raw {
            html: "<div>x</div>\n".into(),
        }]);
        assert_eq!(body_of(&doc), "<div>x</div>\n");
    }

    // =========================================================================
    // Images
    // =========================================================================

    #[test]
    fn block_image_gets_newline() {
        let doc = doc_of(vec![Node::Image(ImageNode::new("a.png"))]);
        assert_eq!(body_of(&doc), "<img alt=\"a.png\" src=\"a.png\" />\n");
    }

    #[test]
    fn scaled_image_without_introspection_has_no_dimensions() {
        let doc = doc_of(vec![Node::Image(ImageNode {
            scale: Some(50),
            ..ImageNode::new("a.png")
        })]);
        let body = body_of(&doc);
        assert_eq!(body, "<img alt=\"a.png\" src=\"a.png\" />\n");
        assert!(!body.contains("width") && !body.contains("style"));
    }

    #[test]
    fn scaled_width_is_folded_into_style() {
        let doc = doc_of(vec![Node::Image(ImageNode {
            width: Some("100".into()),
            scale: Some(50),
            ..ImageNode::new("a.png")
        })]);
        let body = body_of(&doc);
        assert_eq!(
            body,
            "<img alt=\"a.png\" src=\"a.png\" style=\"width: 50.0px;\" />\n"
        );
        assert!(!body.contains(" width="));
    }

    #[test]
    fn inline_centered_image_is_middle_aligned() {
        let doc = doc_of(vec![Node::paragraph(vec![
            Node::text("see "),
            Node::Image(ImageNode {
                align: Some(Align::Center),
                ..ImageNode::new("a.png")
            }),
        ])]);
        assert_eq!(
            body_of(&doc),
            "<p>see <img align=\"middle\" alt=\"a.png\" class=\"align-center\" src=\"a.png\" /></p>\n"
        );
    }

    #[test]
    fn block_centered_image_is_wrapped() {
        let doc = doc_of(vec![Node::Image(ImageNode {
            align: Some(Align::Center),
            ..ImageNode::new("a.png")
        })]);
        assert_eq!(
            body_of(&doc),
            "<div align=\"center\" class=\"align-center\">\
             <img alt=\"a.png\" class=\"align-center\" src=\"a.png\" /></div>\n"
        );
    }

    #[test]
    fn image_in_tight_list_item_is_inline() {
        let doc = crate::reader::parse_markdown("- see ![x](a.png){align=center} here\n").unwrap();
        assert_eq!(
            body_of(&doc),
            "<ul>\n<li><p>see <img align=\"middle\" alt=\"x\" class=\"align-center\" src=\"a.png\" /> here</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn image_in_top_level_link_is_inline() {
        let doc = doc_of(vec![Node::reference(
            "big.png",
            vec![Node::Image(ImageNode::new("small.png"))],
        )]);
        assert_eq!(
            body_of(&doc),
            "<a class=\"reference\" href=\"big.png\"><img alt=\"small.png\" src=\"small.png\" /></a>"
        );
    }

    #[test]
    fn image_uses_backend_for_natural_size() {
        let backend = MockBackend::new().with_image("photo.png", 300, 200);
        let doc = doc_of(vec![Node::Image(ImageNode {
            scale: Some(50),
            ..ImageNode::new("photo.png")
        })]);
        let mut translator = HtmlTranslator::new(Some(&backend));
        walk(&doc, &mut translator).unwrap();
        assert_eq!(
            translator.body(),
            "<img alt=\"photo.png\" src=\"photo.png\" style=\"width: 150.0px; height: 100.0px;\" />\n"
        );
        assert_eq!(translator.images(), 1);
    }

    #[test]
    fn malformed_scaled_length_aborts_translation() {
        let doc = doc_of(vec![Node::Image(ImageNode {
            width: Some("big".into()),
            scale: Some(50),
            ..ImageNode::new("a.png")
        })]);
        let result = translate(&doc, &settings(), None);
        assert!(matches!(result, Err(TranslateError::Image(_))));
    }

    // =========================================================================
    // Full pages
    // =========================================================================

    #[test]
    fn page_contains_boilerplate_in_order() {
        let doc = doc_of(vec![Node::paragraph(vec![Node::text("Hello")])]);
        let html = translate(&doc, &settings(), None).unwrap().html;

        let favicon = html
            .find(r#"<link rel="shortcut icon" type="image/x-icon" href="../style/favicon.png">"#)
            .expect("favicon link");
        let nav_css = html
            .find(r#"href="../style/navigation.css""#)
            .expect("navigation stylesheet");
        let script = html.find("top.location.href").expect("frame script");
        let body = html.find("<body>").expect("body");
        let placeholder = html.find(NAV_PLACEHOLDER).expect("placeholder");
        let content = html.find("<p>Hello</p>").expect("content");

        assert!(favicon < nav_css && nav_css < script && script < body);
        assert!(body < placeholder && placeholder < content);
        assert!(html.contains("</head>\n<body>\n<!-- bfknav -->"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn page_links_stylesheet_relative_to_destination() {
        let doc = doc_of(vec![]);
        let html = translate(&doc, &settings(), None).unwrap().html;
        assert!(html.contains(r#"href="../style/default.css""#));
    }

    #[test]
    fn page_title_falls_back_to_navigation_name() {
        let doc = doc_of(vec![Node::meta("navigation.name", "Start Here")]);
        let translation = translate(&doc, &settings(), None).unwrap();
        assert_eq!(translation.title, "Start Here");
        assert!(translation.html.contains("<title>Start Here</title>"));
        assert!(
            translation
                .html
                .contains(r#"<meta name="navigation.name" content="Start Here">"#)
        );
    }

    #[test]
    fn document_title_wins_over_navigation_name() {
        let mut doc = doc_of(vec![]);
        doc.title = Some("A & B".into());
        let translation = translate(&doc, &settings(), None).unwrap();
        assert!(translation.html.contains("<title>A &amp; B</title>"));
    }

    #[test]
    fn translation_carries_navigation_record() {
        let doc = doc_of(vec![
            Node::meta("navigation.name", "Foo"),
            Node::meta("navigation.order", "3"),
            Node::meta("navigation.visible", "false"),
        ]);
        let record = translate(&doc, &settings(), None).unwrap().record;
        assert_eq!(
            record,
            NavigationRecord {
                name: "Foo".into(),
                level: 0,
                visible: false,
                order: Some(3),
            }
        );
    }

    #[test]
    fn translation_default_record() {
        let record = translate(&doc_of(vec![]), &settings(), None).unwrap().record;
        assert_eq!(record, NavigationRecord::new("Guide"));
    }

    #[test]
    fn invalid_order_aborts_translation() {
        let doc = doc_of(vec![Node::meta("navigation.order", "soon")]);
        let result = translate(&doc, &settings(), None);
        assert!(matches!(
            result,
            Err(TranslateError::Navigation(NavigationError::InvalidOrder(_)))
        ));
    }

    #[test]
    fn write_creates_page_and_sidecar() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings {
            destination: tmp.path().join("out/about.html"),
            stylesheet_path: tmp.path().join("style/default.css"),
            lang: "en".into(),
        };
        let doc = doc_of(vec![Node::meta("navigation.order", "2")]);
        let translation = translate(&doc, &settings, None).unwrap();

        let sidecar = translation.write().unwrap();

        assert_eq!(sidecar, tmp.path().join("out/about.nav"));
        let page = fs::read_to_string(tmp.path().join("out/about.html")).unwrap();
        assert!(page.contains(NAV_PLACEHOLDER));
        let nav = navigation::read_sidecar(&sidecar).unwrap();
        assert_eq!(nav.name, "About");
        assert_eq!(nav.order, Some(2));
    }
}
