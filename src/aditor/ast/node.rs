//! Node and document types

use std::collections::BTreeMap;
use std::fmt;

/// CSS-like style properties of a node, e.g. `font-weight: bold`.
pub type Style = BTreeMap<String, String>;

/// Whether a node owns children. Serialized as the node's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Owns children ("child" in the editor's format)
    Container,
    Leaf,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Container => "child",
            NodeType::Leaf => "leaf",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Paragraph {
        children: Vec<Node>,
    },
    /// Heading; holds a single text child
    Title {
        level: usize,
        children: Vec<Node>,
    },
    Quote {
        children: Vec<Node>,
    },
    Text {
        text: String,
        style: Style,
    },
    Link {
        text: String,
        href: String,
    },
    Image {
        src: String,
    },
    Code {
        code: String,
        language: String,
    },
    /// KaTeX source, rendered as a block when `display_mode` is set
    Formula {
        katex: String,
        display_mode: bool,
    },
}

impl Node {
    /// The editor's name for this node kind.
    pub fn name(&self) -> &'static str {
        match self {
            Node::Paragraph { .. } => "aditorParagraph",
            Node::Title { .. } => "aditorTitleParagraph",
            Node::Quote { .. } => "aditorQuote",
            Node::Text { .. } => "aditorText",
            Node::Link { .. } => "aditorLink",
            Node::Image { .. } => "aditorImage",
            Node::Code { .. } => "aditorCode",
            Node::Formula { .. } => "aditorKatex",
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Paragraph { .. } | Node::Title { .. } | Node::Quote { .. } => {
                NodeType::Container
            }
            Node::Text { .. }
            | Node::Link { .. }
            | Node::Image { .. }
            | Node::Code { .. }
            | Node::Formula { .. } => NodeType::Leaf,
        }
    }

    pub fn is_container(&self) -> bool {
        self.node_type() == NodeType::Container
    }

    /// Whether inline content may be appended to this node after it was emitted.
    ///
    /// Titles are containers too, but they are complete once built.
    pub fn accepts_inline(&self) -> bool {
        matches!(self, Node::Paragraph { .. } | Node::Quote { .. })
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { children }
            | Node::Title { children, .. }
            | Node::Quote { children } => children,
            _ => &[],
        }
    }

    /// Append a child. Leaves have no children; the node is handed back in that case.
    pub fn push_child(&mut self, child: Node) -> Result<(), Node> {
        match self {
            Node::Paragraph { children }
            | Node::Title { children, .. }
            | Node::Quote { children } => {
                children.push(child);
                Ok(())
            }
            _ => Err(child),
        }
    }

    /// Inline text of a leaf, if it has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Text { text, .. } | Node::Link { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match self {
            Node::Text { style, .. } => Some(style),
            _ => None,
        }
    }
}

/// The document root.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// aditor format version
    pub version: String,
    pub egbenz_version: String,
    pub children: Vec<Node>,
}

impl Document {
    pub const NAME: &'static str = "aditor";

    pub fn new(
        version: impl Into<String>,
        egbenz_version: impl Into<String>,
        children: Vec<Node>,
    ) -> Self {
        Self {
            version: version.into(),
            egbenz_version: egbenz_version.into(),
            children,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves_reject_children() {
        let mut image = Node::Image {
            src: "a.png".to_string(),
        };
        let child = Node::Text {
            text: "x".to_string(),
            style: Style::new(),
        };
        assert_eq!(image.push_child(child.clone()), Err(child));
        assert!(image.children().is_empty());
    }

    #[test]
    fn test_title_is_container_but_closed() {
        let title = Node::Title {
            level: 1,
            children: vec![],
        };
        assert!(title.is_container());
        assert!(!title.accepts_inline());
        assert!(Node::Quote { children: vec![] }.accepts_inline());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(NodeType::Container.to_string(), "child");
        assert_eq!(NodeType::Leaf.to_string(), "leaf");
    }
}
