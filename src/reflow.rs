// src/reflow.rs
//
// Resolve nested indent scopes and word-wrap every region.
//
// A scope's effective prefixes are the enclosing ones with its own appended.
// Only the very first line written by a call gets the distinct first-line
// prefix; once anything is out, later regions start on continuation lines.

use crate::error::Result;
use crate::marked;
use crate::node::Node;
use crate::sentinel::{HRULE, LINE_BREAK};
use crate::wrap::wrap;

pub fn reflow(nodes: &[Node], prefix_first: &str, prefix_continuation: &str, width: usize) -> String {
    let mut out = String::new();
    let mut first = prefix_first;
    let mut segment = String::new();

    for node in nodes {
        match node {
            Node::Text(s) => segment.push_str(s),
            Node::LineBreak => segment.push(LINE_BREAK as char),
            Node::Rule(fill) => {
                segment.push(HRULE as char);
                segment.push(*fill);
            }
            Node::Scope(scope) => {
                out.push_str(&wrap(&segment, width, first, prefix_continuation));
                segment.clear();
                if !out.is_empty() {
                    first = prefix_continuation;
                }
                let inner_first = format!("{first}{}", scope.prefix_first);
                let inner_continuation = format!("{prefix_continuation}{}", scope.prefix_continuation);
                out.push_str(&reflow(&scope.children, &inner_first, &inner_continuation, width));
                if !out.is_empty() {
                    first = prefix_continuation;
                }
            }
        }
    }
    out.push_str(&wrap(&segment, width, first, prefix_continuation));
    out
}

/// Reflow a flat marked stream. Fails only if the stream is malformed.
pub fn reflow_marked(
    stream: &[u8],
    prefix_first: &str,
    prefix_continuation: &str,
    width: usize,
) -> Result<String> {
    let nodes = marked::decode(stream)?;
    Ok(reflow(&nodes, prefix_first, prefix_continuation, width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::node::{Fragment, Scope};
    use crate::sentinel::{self, INDENT_CONTINUATION, INDENT_FIRST, INDENT_START, INDENT_STOP};
    use pretty_assertions::assert_eq;

    fn scope(first: &str, cont: &str, children: Vec<Node>) -> Node {
        Node::Scope(Scope::new(first, cont).with_children(Fragment::from(children)))
    }

    fn text(s: &str) -> Node {
        Node::Text(s.to_string())
    }

    fn render(nodes: &[Node], width: usize) -> String {
        sentinel::resolve(&reflow(nodes, "", "", width))
    }

    #[test]
    fn plain_text_just_wraps() {
        assert_eq!(render(&[text("alpha beta gamma")], 12), "alpha beta\ngamma\n");
    }

    #[test]
    fn list_item_uses_bullet_then_hanging_indent() {
        let nodes = [scope("  * ", "    ", vec![text("one two three four")])];
        assert_eq!(render(&nodes, 15), "  * one two\n    three four\n");
    }

    #[test]
    fn nested_prefixes_concatenate() {
        let nodes = [scope(
            "> ",
            "> ",
            vec![scope("  * ", "    ", vec![scope("> ", "> ", vec![text("aa bb cc dd ee")])])],
        )];
        let out = render(&nodes, 16);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec![">   * > aa bb", ">     > cc dd", ">     > ee"]);
        for line in &lines[1..] {
            assert!(line.starts_with(">     > "));
        }
    }

    #[test]
    fn text_after_scope_continues_with_outer_prefix() {
        let nodes = [
            text("intro"),
            Node::LineBreak,
            scope("> ", "> ", vec![text("quoted")]),
            Node::LineBreak,
            text("outro"),
        ];
        assert_eq!(render(&nodes, 20), "intro\n> quoted\n\noutro\n");
    }

    #[test]
    fn first_line_prefix_only_once() {
        let nodes = [scope("--[ ", "    ", vec![text("Title")]), text("body")];
        let out = sentinel::resolve(&reflow(&nodes, "# ", "  ", 20));
        assert_eq!(out, "# --[ Title\n  body\n");
    }

    #[test]
    fn rule_spans_the_width_under_prefix() {
        let nodes = [scope("> ", "> ", vec![Node::Rule('=')])];
        assert_eq!(render(&nodes, 8), "> ======\n");
    }

    #[test]
    fn marked_stream_reflows_like_the_tree() {
        let nodes = [
            text("lead"),
            Node::LineBreak,
            scope("> ", "> ", vec![scope("  * ", "    ", vec![text("deep item text here")])]),
        ];
        let stream = marked::encode(&nodes);
        assert_eq!(reflow_marked(&stream, "", "", 14).unwrap(), reflow(&nodes, "", "", 14));
    }

    #[test]
    fn marked_stream_finds_matching_stop() {
        let mut stream = vec![INDENT_START, b'A', INDENT_FIRST, b'A', INDENT_CONTINUATION];
        stream.extend([INDENT_START, b'B', INDENT_FIRST, b'B', INDENT_CONTINUATION, b'x', INDENT_STOP]);
        stream.extend(b" y");
        stream.push(INDENT_STOP);
        stream.extend(b" z");
        let out = sentinel::resolve(&reflow_marked(&stream, "", "", 40).unwrap());
        assert_eq!(out, "ABx\nA y\nz\n");
    }

    #[test]
    fn malformed_marked_stream_is_an_error() {
        let stream = [INDENT_START, b'x'];
        assert_eq!(
            reflow_marked(&stream, "", "", 10),
            Err(Error::UnbalancedScope { offset: 0 })
        );
    }
}
