//! JSON serialization in the aditor editor's layout
//!
//!     Every node is written as an object with `name`, `type`, `style` and `data`, followed by
//!     `text` and/or `children` depending on the node kind. The editor reads these field names
//!     as-is, and some kinds deliberately omit fields:
//!
//!         - paragraph: text (always "") and children
//!         - title, quote: children only
//!         - text, link, image: text only
//!         - code, formula: neither
//!
//!     The `.ai` files are written with 4-space indentation and non-ASCII text kept unescaped.

use super::node::{Document, Node, Style};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;

/// Empty `{}` for nodes without style or data entries.
struct Empty;

impl Serialize for Empty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

/// `data` object: ordered (key, value) pairs.
struct Data<'a>(&'a [(&'static str, DataValue<'a>)]);

enum DataValue<'a> {
    Str(&'a str),
    Bool(bool),
    Number(usize),
}

impl Serialize for DataValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataValue::Str(s) => serializer.serialize_str(s),
            DataValue::Bool(b) => serializer.serialize_bool(*b),
            DataValue::Number(n) => serializer.serialize_u64(*n as u64),
        }
    }
}

impl Serialize for Data<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", self.name())?;
        map.serialize_entry("type", self.node_type().as_str())?;

        let no_style = Style::new();
        map.serialize_entry("style", self.style().unwrap_or(&no_style))?;

        match self {
            Node::Paragraph { children } => {
                map.serialize_entry("data", &Empty)?;
                map.serialize_entry("text", "")?;
                map.serialize_entry("children", children)?;
            }
            Node::Title { level, children } => {
                map.serialize_entry("data", &Data(&[("level", DataValue::Number(*level))]))?;
                map.serialize_entry("children", children)?;
            }
            Node::Quote { children } => {
                map.serialize_entry("data", &Empty)?;
                map.serialize_entry("children", children)?;
            }
            Node::Text { text, .. } => {
                map.serialize_entry("data", &Empty)?;
                map.serialize_entry("text", text)?;
            }
            Node::Link { text, href } => {
                map.serialize_entry("data", &Data(&[("href", DataValue::Str(href))]))?;
                map.serialize_entry("text", text)?;
            }
            Node::Image { src } => {
                map.serialize_entry("data", &Data(&[("src", DataValue::Str(src))]))?;
                map.serialize_entry("text", "")?;
            }
            Node::Code { code, language } => {
                map.serialize_entry(
                    "data",
                    &Data(&[
                        ("code", DataValue::Str(code)),
                        ("language", DataValue::Str(language)),
                    ]),
                )?;
            }
            Node::Formula {
                katex,
                display_mode,
            } => {
                map.serialize_entry(
                    "data",
                    &Data(&[
                        ("katex", DataValue::Str(katex)),
                        ("displayMode", DataValue::Bool(*display_mode)),
                    ]),
                )?;
            }
        }
        map.end()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("name", Document::NAME)?;
        map.serialize_entry("type", "child")?;
        map.serialize_entry("style", &Empty)?;
        map.serialize_entry(
            "data",
            &Data(&[
                ("version", DataValue::Str(&self.version)),
                ("egbenzVersion", DataValue::Str(&self.egbenz_version)),
            ]),
        )?;
        map.serialize_entry("children", &self.children)?;
        map.end()
    }
}

/// Pretty-print a value with `indent` spaces per level.
pub fn to_json_string<T: Serialize>(value: &T, indent: usize) -> Result<String, serde_json::Error> {
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}
