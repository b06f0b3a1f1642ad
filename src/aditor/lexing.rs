//! Tokenizer for markdown notes
//!
//!     Tokenization is driven by an ordered table of regex rules. At every position the rules are
//!     tried top to bottom against the rest of the source and the first one that matches at the
//!     cursor wins. There is no longest-match or specificity tie-breaking: the table order is the
//!     whole disambiguation strategy, so reordering [GRAMMAR_PATTERNS] changes the output.
//!
//!     Characters no rule claims are collected into a pending text run, which is flushed as a
//!     `Text` token right before the next matched token (or at the end of input).
//!
//! Line-start rules
//!
//!     Title, list and quote only make sense at the start of a block. They are marked as
//!     line-start rules and are skipped while a text run is pending, so `x # y` never produces a
//!     title. A `Br` token flushes the pending run, which re-enables them on the next line.
//!
//!     The tokenizer is total: every input yields a token stream whose texts concatenate back to
//!     the input.

use crate::aditor::token::{Token, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Grammar rules in priority order: (kind, pattern, only at line start).
///
/// Patterns are anchored at the cursor when compiled. `.` never crosses a newline, so most
/// rules stop at the end of the line; only `code` spans lines.
pub const GRAMMAR_PATTERNS: &[(TokenKind, &str, bool)] = &[
    (TokenKind::Title, r"#{1,6} .*", true),
    (TokenKind::Bold, r"\*\*.*\*\*", false),
    (TokenKind::Italic, r"\*.*\*", false),
    (TokenKind::Link, r"\[.*?\]\(.*?\)", false),
    (TokenKind::Image, r"!\[.*?\]\(.*?\)", false),
    (TokenKind::Code, r"```[\s\S]*?```", false),
    (TokenKind::List, r"\d\..*", true),
    (TokenKind::Table, r"\|.*\|", false),
    (TokenKind::Hr, r"---", false),
    (TokenKind::Br, r"\n", false),
    (TokenKind::Formula, r"\$\$.*\$\$", false),
    (TokenKind::InlineFormula, r"\$.*?\$", false),
    (TokenKind::Quote, r">.*", true),
];

/// A compiled grammar rule.
#[derive(Debug)]
pub struct GrammarRule {
    pub kind: TokenKind,
    pub line_start: bool,
    regex: Regex,
}

impl GrammarRule {
    fn new(kind: TokenKind, pattern: &str, line_start: bool) -> Self {
        let regex = Regex::new(&format!("^(?:{})", pattern)).unwrap();
        Self {
            kind,
            line_start,
            regex,
        }
    }

    /// Length in bytes of the match at the start of `rest`, if any.
    pub fn match_len(&self, rest: &str) -> Option<usize> {
        self.regex
            .find(rest)
            .map(|m| m.end())
            .filter(|&len| len > 0)
    }
}

static GRAMMAR: Lazy<Vec<GrammarRule>> = Lazy::new(|| {
    GRAMMAR_PATTERNS
        .iter()
        .map(|&(kind, pattern, line_start)| GrammarRule::new(kind, pattern, line_start))
        .collect()
});

/// The compiled rule table, in priority order.
pub fn grammar() -> &'static [GrammarRule] {
    &GRAMMAR
}

/// Split markdown source into tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    // Start of the pending text run
    let mut pending: Option<usize> = None;
    let mut i = 0;

    'scan: while i < source.len() {
        let rest = &source[i..];
        for rule in grammar() {
            if rule.line_start && pending.is_some() {
                continue;
            }
            if let Some(len) = rule.match_len(rest) {
                if let Some(start) = pending.take() {
                    tokens.push(Token::new(TokenKind::Text, &source[start..i], start..i));
                }
                tokens.push(Token::new(rule.kind, &rest[..len], i..i + len));
                i += len;
                continue 'scan;
            }
        }

        pending.get_or_insert(i);
        i += rest.chars().next().map_or(1, char::len_utf8);
    }

    if let Some(start) = pending {
        tokens.push(Token::new(TokenKind::Text, &source[start..], start..source.len()));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aditor::token::detokenize;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize(""), vec![]);
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let order: Vec<TokenKind> = grammar().iter().map(|rule| rule.kind).collect();
        assert_eq!(
            order,
            vec![
                TokenKind::Title,
                TokenKind::Bold,
                TokenKind::Italic,
                TokenKind::Link,
                TokenKind::Image,
                TokenKind::Code,
                TokenKind::List,
                TokenKind::Table,
                TokenKind::Hr,
                TokenKind::Br,
                TokenKind::Formula,
                TokenKind::InlineFormula,
                TokenKind::Quote,
            ]
        );
    }

    #[test]
    fn test_title() {
        let tokens = tokenize("### Title");
        assert_eq!(tokens, vec![Token::new(TokenKind::Title, "### Title", 0..9)]);
    }

    #[test]
    fn test_text_then_bold() {
        let tokens = tokenize("Hello **world**");
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Text, "Hello ", 0..6),
                Token::new(TokenKind::Bold, "**world**", 6..15),
            ]
        );
    }

    #[test]
    fn test_line_start_rules_wait_for_flush() {
        assert_eq!(kinds("x # y"), vec![TokenKind::Text]);
        assert_eq!(kinds("x > y"), vec![TokenKind::Text]);
        assert_eq!(
            kinds("a\n# b"),
            vec![TokenKind::Text, TokenKind::Br, TokenKind::Title]
        );
    }

    #[test]
    fn test_line_start_rule_after_inline_token() {
        // The bold token flushes the pending run, so a quote can start right after it.
        assert_eq!(kinds("**a**>b"), vec![TokenKind::Bold, TokenKind::Quote]);
    }

    #[test]
    fn test_code_spans_lines() {
        let source = "```python\ncode body\n```";
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Code);
        assert_eq!(tokens[0].text, source);
    }

    #[test]
    fn test_formula_beats_inline_formula() {
        assert_eq!(kinds("$$x^2$$"), vec![TokenKind::Formula]);
        assert_eq!(kinds("$x$"), vec![TokenKind::InlineFormula]);
    }

    #[test]
    fn test_bold_is_greedy_within_line() {
        let tokens = tokenize("**a** and **b**\nnext");
        assert_eq!(tokens[0].kind, TokenKind::Bold);
        assert_eq!(tokens[0].text, "**a** and **b**");
    }

    #[test]
    fn test_image_and_link() {
        assert_eq!(kinds("![alt](a.png)"), vec![TokenKind::Image]);
        assert_eq!(kinds("[text](https://x.y)"), vec![TokenKind::Link]);
    }

    #[test]
    fn test_multibyte_text_is_lossless() {
        let source = "环境准备 **加粗** 文本 > 不是引用";
        assert_eq!(detokenize(&tokenize(source)), source);
    }

    #[test]
    fn test_spans_index_the_source() {
        let source = "1. item\n| a | b |\n---\n";
        for token in tokenize(source) {
            assert_eq!(&source[token.span.clone()], token.text);
        }
    }
}
