//! Document tree consumed by the HTML writer.
//!
//! A [`Document`] is a flat list of top-level [`Node`]s. Nodes are a tagged
//! enum rather than a class hierarchy, so the writer matches on variants
//! instead of downcasting. Traversal is driven from outside the writer by
//! [`walk`], which calls [`Visitor::visit`] on the way down and
//! [`Visitor::depart`] on the way back up, handing each call the kinds of
//! the node's ancestors.
//!
//! The whole tree derives serde, so a document can be fed to the CLI as JSON:
//!
//! ```json
//! {
//!   "title": "Guide",
//!   "children": [
//!     { "type": "meta", "name": "navigation.order", "content": "3" },
//!     { "type": "paragraph", "children": [
//!         { "type": "text", "text": "See " },
//!         { "type": "image", "uri": "logo.png", "scale": 50, "align": "center" }
//!     ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// A parsed document: optional title plus top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    /// Meta annotations that are direct children of the document, in order.
    ///
    /// Nested metas are not navigation metadata and are skipped.
    pub fn metas(&self) -> impl Iterator<Item = &MetaNode> {
        self.children.iter().filter_map(|node| match node {
            Node::Meta(meta) => Some(meta),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Section {
        #[serde(default)]
        children: Vec<Node>,
    },
    Title {
        #[serde(default = "default_title_level")]
        level: u8,
        #[serde(default)]
        children: Vec<Node>,
    },
    Paragraph {
        #[serde(default)]
        children: Vec<Node>,
    },
    Emphasis {
        #[serde(default)]
        children: Vec<Node>,
    },
    Strong {
        #[serde(default)]
        children: Vec<Node>,
    },
    Literal {
        text: String,
    },
    Text {
        text: String,
    },
    Reference {
        refuri: String,
        #[serde(default)]
        children: Vec<Node>,
    },
    Image(ImageNode),
    Meta(MetaNode),
    BulletList {
        #[serde(default)]
        children: Vec<Node>,
    },
    EnumeratedList {
        #[serde(default)]
        children: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        children: Vec<Node>,
    },
    LiteralBlock {
        text: String,
    },
    BlockQuote {
        #[serde(default)]
        children: Vec<Node>,
    },
    Transition,
    /// Pre-rendered HTML passed through untouched.
    Raw {
        html: String,
    },
}

fn default_title_level() -> u8 {
    1
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    pub fn reference(refuri: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Reference {
            refuri: refuri.into(),
            children,
        }
    }

    pub fn meta(name: impl Into<String>, content: impl Into<String>) -> Self {
        Node::Meta(MetaNode {
            name: name.into(),
            content: content.into(),
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Section { .. } => NodeKind::Section,
            Node::Title { .. } => NodeKind::Title,
            Node::Paragraph { .. } => NodeKind::Paragraph,
            Node::Emphasis { .. } => NodeKind::Emphasis,
            Node::Strong { .. } => NodeKind::Strong,
            Node::Literal { .. } => NodeKind::Literal,
            Node::Text { .. } => NodeKind::Text,
            Node::Reference { .. } => NodeKind::Reference,
            Node::Image(_) => NodeKind::Image,
            Node::Meta(_) => NodeKind::Meta,
            Node::BulletList { .. } => NodeKind::BulletList,
            Node::EnumeratedList { .. } => NodeKind::EnumeratedList,
            Node::ListItem { .. } => NodeKind::ListItem,
            Node::LiteralBlock { .. } => NodeKind::LiteralBlock,
            Node::BlockQuote { .. } => NodeKind::BlockQuote,
            Node::Transition => NodeKind::Transition,
            Node::Raw { .. } => NodeKind::Raw,
        }
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Section { children }
            | Node::Title { children, .. }
            | Node::Paragraph { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Reference { children, .. }
            | Node::BulletList { children }
            | Node::EnumeratedList { children }
            | Node::ListItem { children }
            | Node::BlockQuote { children } => children,
            _ => &[],
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn plain_text(&self) -> String {
        match self {
            Node::Text { text } | Node::Literal { text } | Node::LiteralBlock { text } => {
                text.clone()
            }
            _ => self.children().iter().map(Node::plain_text).collect(),
        }
    }
}

/// Discriminant of a [`Node`], used to describe a node's ancestry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Section,
    Title,
    Paragraph,
    Emphasis,
    Strong,
    Literal,
    Text,
    Reference,
    Image,
    Meta,
    BulletList,
    EnumeratedList,
    ListItem,
    LiteralBlock,
    BlockQuote,
    Transition,
    Raw,
}

impl NodeKind {
    /// Inline text containers: elements whose content flows as running text.
    pub fn is_text_element(self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph | NodeKind::Title | NodeKind::Emphasis | NodeKind::Strong
        )
    }
}

/// A name/content pair carried out of band in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaNode {
    pub name: String,
    pub content: String,
}

/// An image reference as authored, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Length with optional unit, e.g. `"200"` or `"12em"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    /// Percentage applied to the width and height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl ImageNode {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Top,
    Middle,
    Bottom,
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Top => "top",
            Align::Middle => "middle",
            Align::Bottom => "bottom",
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }

    /// Parse an alignment token; `None` for anything unrecognized.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "top" => Some(Align::Top),
            "middle" => Some(Align::Middle),
            "bottom" => Some(Align::Bottom),
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            _ => None,
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Callbacks invoked by [`walk`] for every node, in document order.
///
/// `parents` lists the kinds of the node's ancestors, outermost first,
/// starting with [`NodeKind::Document`].
pub trait Visitor {
    type Error;

    fn visit(&mut self, node: &Node, parents: &[NodeKind]) -> Result<(), Self::Error>;

    fn depart(&mut self, node: &Node, parents: &[NodeKind]) -> Result<(), Self::Error>;
}

/// Depth-first traversal of a document, stopping at the first error.
pub fn walk<V: Visitor>(document: &Document, visitor: &mut V) -> Result<(), V::Error> {
    let mut parents = vec![NodeKind::Document];
    walk_nodes(&document.children, &mut parents, visitor)
}

fn walk_nodes<V: Visitor>(
    nodes: &[Node],
    parents: &mut Vec<NodeKind>,
    visitor: &mut V,
) -> Result<(), V::Error> {
    for node in nodes {
        visitor.visit(node, parents)?;
        parents.push(node.kind());
        walk_nodes(node.children(), parents, visitor)?;
        parents.pop();
        visitor.depart(node, parents)?;
    }
    Ok(())
}
