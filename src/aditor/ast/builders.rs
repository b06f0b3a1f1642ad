//! Node builders
//!
//! Factory functions for every node shape the parser emits. Builders never fail.
//!
//! Plain-text leaves built with [text] or [styled_text] go through [unescape]; titles and link
//! labels keep their text verbatim.

use super::node::{Node, Style};

/// Escape sequences undone in plain text, applied in order.
const ESCAPES: &[(&str, &str)] = &[("\\<", "<"), ("\\>", ">"), ("\\(", "("), ("\\)", ")")];

/// Undo the `\<`, `\>`, `\(` and `\)` escapes. Other backslashes are kept.
pub fn unescape(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

pub fn paragraph() -> Node {
    Node::Paragraph {
        children: Vec::new(),
    }
}

/// A paragraph holding a single node.
pub fn paragraph_with(child: Node) -> Node {
    Node::Paragraph {
        children: vec![child],
    }
}

pub fn title(text: &str, level: usize) -> Node {
    Node::Title {
        level,
        children: vec![Node::Text {
            text: text.to_string(),
            style: Style::new(),
        }],
    }
}

pub fn text(text: &str) -> Node {
    styled_text(text, Style::new())
}

pub fn styled_text(text: &str, style: Style) -> Node {
    Node::Text {
        text: unescape(text),
        style,
    }
}

pub fn link(text: &str, href: &str) -> Node {
    Node::Link {
        text: text.to_string(),
        href: href.to_string(),
    }
}

pub fn image(src: impl Into<String>) -> Node {
    Node::Image { src: src.into() }
}

pub fn code(code: &str, language: &str) -> Node {
    Node::Code {
        code: code.to_string(),
        language: language.to_string(),
    }
}

pub fn formula(katex: &str, display_mode: bool) -> Node {
    Node::Formula {
        katex: katex.to_string(),
        display_mode,
    }
}

/// A quote holding a single node.
pub fn quote_with(child: Node) -> Node {
    Node::Quote {
        children: vec![child],
    }
}

pub fn bold_style() -> Style {
    single_style("font-weight", "bold")
}

pub fn italic_style() -> Style {
    single_style("font-style", "italic")
}

fn single_style(key: &str, value: &str) -> Style {
    let mut style = Style::new();
    style.insert(key.to_string(), value.to_string());
    style
}
