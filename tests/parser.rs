//! Parser tests over whole markdown snippets
//!
//! Images are resolved with an offline resolver so no test touches the network.

use md2aditor::aditor::assets::AssetResolver;
use md2aditor::aditor::ast::builders;
use md2aditor::aditor::ast::Node;
use md2aditor::aditor::lexing::tokenize;
use md2aditor::aditor::parsing::Parser;
use rstest::rstest;

fn parse(source: &str) -> Vec<Node> {
    let resolver = AssetResolver::offline("/", "static");
    Parser::new(&resolver).parse(&tokenize(source))
}

#[rstest]
#[case("# One", 1, "One")]
#[case("### Title", 3, "Title")]
#[case("###### Six", 6, "Six")]
#[case("## spaced  out", 2, "spaced  out")]
fn test_title_levels(#[case] source: &str, #[case] level: usize, #[case] text: &str) {
    let blocks = parse(source);
    assert_eq!(blocks, vec![builders::title(text, level)]);
}

#[test]
fn test_seven_hashes_are_text() {
    let blocks = parse("####### x");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].name(), "aditorParagraph");
}

#[test]
fn test_paragraph_continuation() {
    let blocks = parse("Hello **world**");
    assert_eq!(
        blocks,
        vec![Node::Paragraph {
            children: vec![
                builders::text("Hello "),
                builders::styled_text("world", builders::bold_style()),
            ],
        }]
    );
}

#[rstest]
#[case("A\n\n---\n\nB")]
#[case("A\nB")]
#[case("A\n---B")]
fn test_block_reset(#[case] source: &str) {
    let blocks = parse(source);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].children()[0].text(), Some("A"));
    assert_eq!(blocks[1].children()[0].text(), Some("B"));
}

#[test]
fn test_quote() {
    let blocks = parse("> quoted text");
    assert_eq!(
        blocks,
        vec![Node::Quote {
            children: vec![builders::text(" quoted text")],
        }]
    );
}

#[test]
fn test_code_block() {
    let blocks = parse("```python\ncode body\n```");
    assert_eq!(
        blocks,
        vec![builders::paragraph_with(builders::code("code body", "python"))]
    );
}

#[test]
fn test_code_block_then_text_opens_paragraph() {
    let blocks = parse("```\nx\n```after");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1].children()[0].text(), Some("after"));
}

#[test]
fn test_escaped_text() {
    let blocks = parse("a \\< b \\> c");
    assert_eq!(blocks[0].children()[0].text(), Some("a < b > c"));
}

#[rstest]
#[case("*it*", "font-style", "italic", "it")]
#[case("**bold**", "font-weight", "bold", "bold")]
#[case("***both***", "font-weight", "bold", "both")]
fn test_emphasis_styles(
    #[case] source: &str,
    #[case] key: &str,
    #[case] value: &str,
    #[case] text: &str,
) {
    let blocks = parse(source);
    let leaf = &blocks[0].children()[0];
    assert_eq!(leaf.text(), Some(text));
    assert_eq!(
        leaf.style().and_then(|style| style.get(key)).map(String::as_str),
        Some(value)
    );
}

#[test]
fn test_link_inside_paragraph() {
    let blocks = parse("see [docs](https://example.com) now");
    assert_eq!(
        blocks,
        vec![Node::Paragraph {
            children: vec![
                builders::text("see "),
                builders::link("docs", "https://example.com"),
                builders::text(" now"),
            ],
        }]
    );
}

#[test]
fn test_image_is_its_own_block() {
    let blocks = parse("before ![alt](pics/a.png) after");
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1], builders::paragraph_with(builders::image("pics/a.png")));
    assert_eq!(blocks[2].children()[0].text(), Some(" after"));
}

#[test]
fn test_display_formula() {
    let blocks = parse("$$E = mc^2$$");
    assert_eq!(
        blocks,
        vec![builders::paragraph_with(builders::formula("E = mc^2", true))]
    );
}

#[test]
fn test_inline_content_extends_quote() {
    let blocks = parse("> quote\n");
    assert_eq!(blocks.len(), 1);

    // The quote stays open until a block break
    let resolver = AssetResolver::offline("/", "static");
    let mut tokens = tokenize("> quote");
    tokens.extend(tokenize("**more**"));
    let blocks = Parser::new(&resolver).parse(&tokens);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].children().len(), 2);
    assert_eq!(blocks[0].children()[1].text(), Some("more"));
}

#[test]
fn test_greedy_bold_spans_runs() {
    let blocks = parse("**a** and **b**");
    assert_eq!(blocks[0].children().len(), 1);
    assert_eq!(blocks[0].children()[0].text(), Some("a** and **b"));
}

#[test]
fn test_local_image_is_embedded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("img")).unwrap();
    std::fs::write(dir.path().join("img").join("a.gif"), b"GIF89a").unwrap();

    let resolver = AssetResolver::offline(dir.path(), "static");
    let tokens = tokenize("![x](http://localhost:8080/static/img/a.gif)");
    let blocks = Parser::new(&resolver).parse(&tokens);
    match &blocks[0].children()[0] {
        Node::Image { src } => assert!(src.starts_with("data:image/gif;base64,")),
        other => panic!("expected image, got {:?}", other),
    }
}
