//! Document tree for the aditor editor
//!
//!     The tree mirrors the editor's own node model. Container nodes (document root, paragraph,
//!     title, quote) own an ordered list of children; leaf nodes (text, link, image, code,
//!     formula) carry text and data only. There are no parent links: the tree is a plain
//!     ownership hierarchy.
//!
//!     Nodes are a closed enum so that every stage matches on all node kinds. The editor's JSON
//!     field layout lives entirely in [serialize].

pub mod builders;
pub mod node;
pub mod serialize;

pub use node::{Document, Node, NodeType, Style};
pub use serialize::to_json_string;
