// src/metadata.rs
//
// Leading `Name: value` metadata and the `///` summary marker.
//
// Metadata is a block of `name: value` lines ended by a blank line. If any
// line in that block lacks `": "`, there was no metadata after all and the
// whole input is body.
//
// A line holding only `///` ends a summary: the text above it becomes a
// "Summary" item. A single marker is a soft break (the summary is also body);
// two markers in a row are a hard break (the summary is metadata only).

use memchr::memmem;

pub const SUMMARY: &str = "Summary";
pub const SUMMARY_MARKER: &str = "\n///\n";
const HARD_BREAK_TAIL: &str = "///\n";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extracted {
    pub items: Vec<(String, String)>,
    /// Byte offset where the body starts.
    pub body_start: usize,
}

pub fn extract(markdown: &str) -> Extracted {
    let mut items = Vec::new();
    let mut pos = 0usize;

    for line in markdown.split('\n') {
        let trimmed = line.trim_matches(' ');
        if trimmed.is_empty() {
            break;
        }
        let Some(colon) = trimmed.find(": ") else {
            items.clear();
            pos = 0;
            break;
        };
        let name = trimmed[..colon].trim_matches(' ');
        let value = trimmed[colon + 1..].trim_matches(' ');
        items.push((name.to_string(), value.to_string()));
        pos += line.len() + 1;
    }
    let mut pos = pos.min(markdown.len());

    let rest = &markdown[pos..];
    if let Some(at) = memmem::find(rest.as_bytes(), SUMMARY_MARKER.as_bytes()) {
        items.push((SUMMARY.to_string(), rest[..at].to_string()));
        let after = &rest[at + SUMMARY_MARKER.len()..];
        if after.starts_with(HARD_BREAK_TAIL) {
            pos += at + SUMMARY_MARKER.len() + HARD_BREAK_TAIL.len();
        }
    }

    Extracted {
        items,
        body_start: pos,
    }
}

/// Replace soft-break summary markers left in the body with a paragraph break.
pub fn strip_summary_markers(body: &str) -> String {
    body.replace(SUMMARY_MARKER, "\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn items(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect()
    }

    #[test]
    fn leading_block_is_metadata() {
        let md = "Name: Value  \n\nBody text";
        let got = extract(md);
        assert_eq!(got.items, items(&[("Name", "Value")]));
        assert_eq!(&md[got.body_start..], "\nBody text");
    }

    #[test]
    fn several_items_keep_order() {
        let md = "Title: Hello\nAuthor: Someone Else\n\nBody";
        assert_eq!(
            extract(md).items,
            items(&[("Title", "Hello"), ("Author", "Someone Else")])
        );
    }

    #[test]
    fn line_without_separator_means_no_metadata() {
        let md = "Title: Hello\nnot metadata\n\nBody";
        assert_eq!(extract(md), Extracted::default());
    }

    #[test]
    fn leading_blank_line_means_no_metadata() {
        assert_eq!(extract("\nKey: value\n"), Extracted::default());
    }

    #[test]
    fn metadata_only_document() {
        let md = "Key: value";
        let got = extract(md);
        assert_eq!(got.items, items(&[("Key", "value")]));
        assert_eq!(got.body_start, md.len());
    }

    #[test]
    fn soft_break_summary_stays_in_body() {
        let md = "Intro line.\n///\nRest.";
        let got = extract(md);
        assert_eq!(got.items, items(&[(SUMMARY, "Intro line.")]));
        assert_eq!(got.body_start, 0);
    }

    #[test]
    fn hard_break_summary_leaves_body() {
        let md = "Key: v\n\nIntro line.\n///\n///\nRest.";
        let got = extract(md);
        assert_eq!(got.items, items(&[("Key", "v"), (SUMMARY, "\nIntro line.")]));
        assert_eq!(&md[got.body_start..], "Rest.");
    }

    #[test]
    fn markers_become_paragraph_breaks() {
        assert_eq!(strip_summary_markers("a\n///\nb"), "a\n\nb");
    }
}
