//! Parser: token stream to document blocks
//!
//!     The parser is a single left-to-right pass with one piece of state: the block that inline
//!     content is currently flowing into. Inline tokens (text, bold, italic, link, inline
//!     formula) are appended to that block when there is one, and open a fresh paragraph when
//!     there is not.
//!
//!     Everything else ends the flow:
//!
//!     | token             | emits                          | open block afterwards |
//!     |-------------------|--------------------------------|-----------------------|
//!     | title             | title                          | none                  |
//!     | image, code       | paragraph wrapping the leaf    | none (the leaf)       |
//!     | list, table       | paragraph wrapping plain text  | none (the leaf)       |
//!     | formula           | paragraph wrapping the formula | none (the leaf)       |
//!     | quote             | quote with one text child      | the quote             |
//!     | hr, br            | nothing                        | none                  |
//!
//!     Lists and tables have no node of their own in the editor yet, so their source is kept as
//!     plain text.

use crate::aditor::assets::AssetResolver;
use crate::aditor::ast::builders;
use crate::aditor::ast::Node;
use crate::aditor::token::{Token, TokenKind};

/// Where the next inline node goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenBlock {
    /// Nothing open; the next inline node starts a paragraph
    Closed,
    /// Index of an open paragraph or quote in the output
    Flowing(usize),
    /// The last block ends in a leaf (image, code, ...), which takes no inline content
    Leaf,
}

#[derive(Debug)]
struct ParseState {
    blocks: Vec<Node>,
    open: OpenBlock,
}

impl ParseState {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            open: OpenBlock::Closed,
        }
    }

    fn flowing_block(&mut self) -> Option<&mut Node> {
        match self.open {
            OpenBlock::Flowing(index) => self
                .blocks
                .get_mut(index)
                .filter(|block| block.accepts_inline()),
            OpenBlock::Closed | OpenBlock::Leaf => None,
        }
    }

    fn push_inline(&mut self, node: Node) {
        let node = match self.flowing_block() {
            Some(block) => match block.push_child(node) {
                Ok(()) => return,
                Err(node) => node,
            },
            None => node,
        };
        self.open_block(builders::paragraph_with(node));
    }

    /// Emit a block that takes further inline content.
    fn open_block(&mut self, block: Node) {
        self.blocks.push(block);
        self.open = OpenBlock::Flowing(self.blocks.len() - 1);
    }

    /// Emit a block that is complete as built.
    fn push_closed(&mut self, block: Node) {
        self.blocks.push(block);
        self.open = OpenBlock::Closed;
    }

    /// Emit `leaf` in a paragraph of its own.
    fn push_leaf(&mut self, leaf: Node) {
        self.blocks.push(builders::paragraph_with(leaf));
        self.open = OpenBlock::Leaf;
    }

    fn close(&mut self) {
        self.open = OpenBlock::Closed;
    }
}

/// Builds document blocks from tokens, resolving image references on the way.
#[derive(Debug)]
pub struct Parser<'r> {
    resolver: &'r AssetResolver,
}

impl<'r> Parser<'r> {
    pub fn new(resolver: &'r AssetResolver) -> Self {
        Self { resolver }
    }

    pub fn parse(&self, tokens: &[Token]) -> Vec<Node> {
        let mut state = ParseState::new();
        for token in tokens {
            self.step(&mut state, token);
        }
        state.blocks
    }

    fn step(&self, state: &mut ParseState, token: &Token) {
        let raw = token.text.as_str();
        match token.kind {
            TokenKind::Text => state.push_inline(builders::text(raw)),
            TokenKind::Bold => {
                state.push_inline(builders::styled_text(raw.trim_matches('*'), builders::bold_style()))
            }
            TokenKind::Italic => state.push_inline(builders::styled_text(
                raw.trim_matches('*'),
                builders::italic_style(),
            )),
            TokenKind::Link => {
                let (text, href) = split_link(raw);
                state.push_inline(builders::link(text, href));
            }
            TokenKind::InlineFormula => {
                state.push_inline(builders::formula(raw.trim_matches('$'), false))
            }
            TokenKind::Title => {
                let level = raw.chars().take_while(|&ch| ch == '#').count();
                let text = raw.trim_start_matches('#').trim_start();
                state.push_closed(builders::title(text, level));
            }
            TokenKind::Image => {
                let (_, src) = split_link(raw);
                state.push_leaf(builders::image(self.resolver.resolve(src)));
            }
            TokenKind::Code => {
                let (body, language) = split_code_block(raw);
                state.push_leaf(builders::code(&body, language));
            }
            TokenKind::List | TokenKind::Table => state.push_leaf(builders::text(raw)),
            TokenKind::Hr | TokenKind::Br => state.close(),
            TokenKind::Formula => state.push_leaf(builders::formula(raw.trim_matches('$'), true)),
            TokenKind::Quote => {
                let body = builders::text(raw.trim_start_matches('>'));
                state.open_block(builders::quote_with(body));
            }
        }
    }
}

/// Parse tokens with the default resolver (base path `/`, intercept `static`).
pub fn parse(tokens: &[Token]) -> Vec<Node> {
    let resolver = AssetResolver::default();
    Parser::new(&resolver).parse(tokens)
}

/// Split `[label](target)` (or `![label](target)`) into label and target.
///
/// The label is everything before the first `]` without leading `[`; the target runs from the
/// first `](` to the next one, without trailing `)`.
fn split_link(raw: &str) -> (&str, &str) {
    let label = raw
        .split(']')
        .next()
        .unwrap_or_default()
        .trim_start_matches('[');
    let target = raw
        .split("](")
        .nth(1)
        .unwrap_or_default()
        .trim_end_matches(')');
    (label, target)
}

/// Split a fenced block into (body, language).
///
/// The language is the rest of the opening line; the body is every line strictly between the
/// first and the last.
fn split_code_block(raw: &str) -> (String, &str) {
    let lines: Vec<&str> = raw.split('\n').collect();
    let language = lines.first().copied().unwrap_or_default().trim_start_matches('`');
    let body = if lines.len() > 2 {
        lines[1..lines.len() - 1].join("\n")
    } else {
        String::new()
    };
    (body, language)
}
