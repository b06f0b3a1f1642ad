//! # md2aditor
//!
//! Converts markdown notes into the document tree consumed by the aditor editor.
//!
//! The conversion runs in three stages:
//!
//!     tokenize -> parse -> serialize
//!
//! The tokenizer walks the source with an ordered table of regex rules (first match wins),
//! the parser folds the flat token stream into paragraph/title/quote blocks, and the
//! serializer writes the tree in the exact JSON shape the editor reads back.
//!
//! Image references are resolved while parsing, see [assets](aditor::assets).
//!
//! ```rust,ignore
//! use md2aditor::markdown_to_tree;
//!
//! let doc = markdown_to_tree("# Notes\nHello **world**", "/", "static", "0.0.15", "0.0.7");
//! assert_eq!(doc.children.len(), 2);
//! ```

pub mod aditor;

pub use aditor::ast::{Document, Node};
pub use aditor::lexing::tokenize;
pub use aditor::loader::{convert_file, markdown_to_tree, Converter, DocumentLoader, LoaderError};
pub use aditor::parsing::parse;
pub use aditor::token::{Token, TokenKind};
