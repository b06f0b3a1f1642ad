//! Token types shared by the tokenizer, the parser and the token dump formats.
//!
//!     A token is a span of the source tagged with the grammar category that claimed it. Spans
//!     that no rule claims are gathered into `Text` tokens, so the token stream always covers the
//!     whole source: joining the token texts in order gives back the input byte for byte (see
//!     [detokenize]).
//!
//!     Block vs inline:
//!
//!         Inline kinds (text, bold, italic, link, inline formula) extend an open paragraph or
//!         quote. Every other kind either emits a block of its own or closes the open one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Grammar category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Title,
    Bold,
    Italic,
    Link,
    Image,
    Code,
    List,
    Table,
    Hr,
    Br,
    Formula,
    InlineFormula,
    Quote,
    /// Source no rule matched
    Text,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Title => "title",
            TokenKind::Bold => "bold",
            TokenKind::Italic => "italic",
            TokenKind::Link => "link",
            TokenKind::Image => "image",
            TokenKind::Code => "code",
            TokenKind::List => "list",
            TokenKind::Table => "table",
            TokenKind::Hr => "hr",
            TokenKind::Br => "br",
            TokenKind::Formula => "formula",
            TokenKind::InlineFormula => "inline_formula",
            TokenKind::Quote => "quote",
            TokenKind::Text => "text",
        }
    }

    /// Whether this kind extends an open paragraph or quote instead of starting a block.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            TokenKind::Text
                | TokenKind::Bold
                | TokenKind::Italic
                | TokenKind::Link
                | TokenKind::InlineFormula
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A matched span of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range of `text` in the source
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.kind, self.text)
    }
}

/// Rebuild the source text from a token stream.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}
