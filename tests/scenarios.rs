// End-to-end rendering of whole documents.

use mdtext::{markdown_to_marked, markdown_to_text, markdown_to_text_no_metadata, sentinel};
use mdtext::{Options, TableAlignment, Width};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn plain(width: usize) -> Options {
    Options::new().with_width(Width::Fixed(width))
}

fn colored(width: usize) -> Options {
    plain(width).with_color(true)
}

fn visible_len(line: &str) -> usize {
    mdtext::wrap::visible_width(&mdtext::style::strip_escapes(line))
}

#[test]
fn heading_opens_an_indented_section() {
    let out = markdown_to_text_no_metadata("# Title\n\nHello world.", &plain(20));
    assert_eq!(out, "--[ Title ]--\n\n    Hello world.\n");
    assert!(out.lines().all(|l| l.chars().count() <= 20));
}

#[test]
fn leading_metadata_is_extracted() {
    let doc = markdown_to_text("Name: Value  \n\nBody text", &plain(40));
    assert_eq!(doc.metadata, vec![("Name".to_string(), "Value".to_string())]);
    assert_eq!(doc.body, "Body text\n");
}

#[test]
fn horizontal_rule_fills_the_width() {
    let out = markdown_to_text_no_metadata("before\n\n---\n\nafter", &plain(24));
    let rule = out.lines().find(|l| l.starts_with('-')).unwrap();
    assert_eq!(rule, "-".repeat(24));
}

#[test]
fn table_columns_take_their_widest_cell() {
    let md = "| A | BB |\n|---|----|\n| 1 | 22 |\n";
    let out = markdown_to_text_no_metadata(md, &plain(40));
    assert_eq!(
        out,
        "+---+----+\n| A | BB |\n+---+----+\n| 1 | 22 |\n+---+----+\n"
    );
}

#[test]
fn table_document_alignment() {
    let md = "| n | word |\n|--:|:----:|\n| 10 | a |\n";
    let options = plain(40).with_table_alignment(TableAlignment::Document);
    let out = markdown_to_text_no_metadata(md, &options);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[1], "|  n | word |");
    assert_eq!(lines[3], "| 10 |  a   |");
}

#[test]
fn nested_quote_list_quote_composes_prefixes() {
    let md = "> - > one two three four five six seven eight nine ten\n";
    let out = markdown_to_text_no_metadata(md, &plain(24));
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.len() > 2, "{out}");
    assert!(lines[0].starts_with(">   * > "));
    for line in &lines[1..] {
        assert!(line.starts_with(">     > "), "{line:?}");
    }
}

#[rstest]
#[case("plain words only, nothing else")]
#[case("# H\n\npara with `code  span` and *em*\n\n> quote\n\n- a\n- b\n")]
#[case("| a | b |\n|---|---|\n| c | d |\n\n***")]
#[case("text[^1]\n\n[^1]: note\n")]
#[case("x[^1]\n\n[^1]: ***\n")]
#[case("- [x] done\n- [ ] open\n\n    indented code\n")]
fn no_sentinel_leaks(#[case] md: &str) {
    for options in [plain(30), colored(30)] {
        let out = markdown_to_text_no_metadata(md, &options);
        assert!(
            !out.chars().any(sentinel::is_sentinel_char),
            "sentinel in {out:?}"
        );
    }
}

#[test]
fn footnote_that_is_only_a_rule() {
    let out = markdown_to_text_no_metadata("x[^1]\n\n[^1]: ***\n", &plain(30));
    assert_eq!(out, format!("x[1]\n\n{}\n[1]\n", "-".repeat(30)));
}

#[test]
fn math_renders_as_code() {
    assert_eq!(markdown_to_text_no_metadata("see $x+1$ here", &plain(30)), "see \"x+1\" here\n");
}

#[test]
fn sentinels_in_input_are_dropped() {
    let out = markdown_to_text_no_metadata("a\u{1}b\u{3}c", &plain(30));
    assert_eq!(out, "abc\n");
}

#[test]
fn color_replaces_fallback_punctuation() {
    let md = "*em* **strong** `code` ~~old~~";
    assert_eq!(
        markdown_to_text_no_metadata(md, &plain(60)),
        "*em* **strong** \"code\" ~~old~~\n"
    );
    assert_eq!(
        markdown_to_text_no_metadata(md, &colored(60)),
        "\x1b[33mem\x1b[0m \x1b[1mstrong\x1b[0m \x1b[32mcode\x1b[0m \x1b[37mold\x1b[0m\n"
    );
}

#[test]
fn colored_lines_fit_the_width() {
    let md = "A **fairly** long paragraph *with* several `styled` spans that must wrap.";
    let out = markdown_to_text_no_metadata(md, &colored(20));
    for line in out.lines() {
        assert!(visible_len(line) <= 20, "{line:?}");
    }
}

#[test]
fn rewrapping_plain_output_is_a_noop() {
    let md = "one two three four five six seven eight nine ten eleven twelve";
    let once = markdown_to_text_no_metadata(md, &plain(18));
    let twice = markdown_to_text_no_metadata(&once.replace('\n', "  \n"), &plain(18));
    assert_eq!(twice, once);
}

#[test]
fn heading_levels_nest_and_unwind() {
    let md = "# A\n\n## B\n\nb text\n\n# C\n\nc text\n";
    let out = markdown_to_text_no_metadata(md, &plain(40));
    assert_eq!(
        out,
        "--[ A ]--\n\n    --[ B ]--\n\n        b text\n\n--[ C ]--\n\n    c text\n"
    );
}

#[test]
fn skipped_heading_level_opens_two_sections() {
    let out = markdown_to_text_no_metadata("## Deep\n\ntext", &plain(40));
    assert_eq!(out, "--[ Deep ]--\n\n        text\n");
}

#[test]
fn code_block_keeps_its_layout() {
    let md = "```\nfn main() {\n    let x  = 1;\n}\n```\n";
    let out = markdown_to_text_no_metadata(md, &plain(12));
    assert_eq!(out, "fn main() {\n    let x  = 1;\n}\n\n");
}

#[test]
fn output_prefixes_wrap_everything() {
    let options = plain(30).with_prefixes("=> ", "   ");
    let out = markdown_to_text_no_metadata("first para\n\nsecond para", &options);
    assert_eq!(out, "=> first para\n\n   second para\n");
}

#[test]
fn marked_dump_names_the_structure() {
    let stream = markdown_to_marked("> hi", &plain(20));
    assert_eq!(sentinel::annotate(&stream), "<START>> <FIRST>> <CONT>hi<STOP>");
}
