use super::*;

#[test]
fn test_inline_spans() {
    insta::assert_snapshot!(conv(
        "Some **bold** and *italic* with `code` and [a link](https://example.com)."
    ), @"Some **bold** and *italic* with code and [a link](https://example.com).");
    insta::assert_snapshot!(conv("a ** b"), @"a ** b");
}

#[test]
fn test_headings() {
    insta::assert_snapshot!(conv("# One\n## Two\n###### Six\n####### Seven"), @r###"
    # One
    ## Two
    ###### Six
    ####### Seven
    "###);
}

#[test]
fn test_nested_lists() {
    insta::assert_snapshot!(conv("- one\n  - two\n    1. three\n- four\n\n1. first\n2. second"), @r###"
    - one
      - two
        1. three
    - four

    1. first
    2. second
    "###);
}

#[test]
fn test_numbering_restarts_per_list() {
    insta::assert_snapshot!(conv("1. a\n2. b\n\ntext\n\n1. c"), @r###"
    1. a
    2. b

    text

    1. c
    "###);
}

#[test]
fn test_loose_lists_keep_counting() {
    insta::assert_snapshot!(conv("1. first\n\n2. second\n\n3. third"), @r###"
    1. first
    2. second
    3. third
    "###);
}

#[test]
fn test_table() {
    insta::assert_snapshot!(conv("| A | B |\n|---|---|\n| 1 | 2 | 3 |\n| x |"), @r###"
    | A | B |
    |---|---|
    | 1 | 2 |
    | x |  |
    "###);
}

#[test]
fn test_code_blocks() {
    insta::assert_snapshot!(conv("```rust\nfn main() {\n    println!(\"hi\");\n}\n```\nafter"), @r###"
    Code (rust):
    ```
    fn main() {
        println!("hi");
    }
    ```

    after
    "###);
}

#[test]
fn test_unterminated_code_block() {
    insta::assert_snapshot!(conv("```\nlet a = 1;\n# not a heading"), @r###"
    ```
    let a = 1;
    # not a heading
    ```
    "###);
}

#[test]
fn test_image_placeholders() {
    insta::assert_snapshot!(conv("![Diagram](missing/diagram.png)"), @"[Image not found: diagram.png]");
    insta::assert_snapshot!(
        conv("![](https://example.com/a.png)"),
        @"[Remote image not downloaded: https://example.com/a.png]"
    );
}

#[test]
fn test_short_pipe_runs_are_paragraphs() {
    let mut converter = MdWord::new(bare_config()).with_fetcher(Box::new(OfflineFetcher));
    let chapters = [Chapter::parse(Path::new("doc.md"), "| A | B |\n|---|---|")];
    let document = converter.assemble(&chapters);

    let units = &document.sections[0].units;
    assert_eq!(units.len(), 2);
    assert!(units.iter().all(|unit| matches!(
        unit,
        ir::Unit::Paragraph(para) if para.role == ir::ParagraphRole::Body
    )));
}
