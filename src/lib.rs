// src/lib.rs
//
// mdtext: render Markdown as word-wrapped text for fixed-width terminals
//
// The pipeline has two phases:
// - render: pulldown-cmark events are turned into a tree of text, forced line
//   breaks, horizontal rules and indent scopes (quote bars, list bullets,
//   heading sections). Tables are laid out into fixed grids at this point.
// - reflow: the tree is walked depth first, composing each scope's prefixes
//   onto the enclosing ones, and every run of text is greedily word-wrapped to
//   the target width. ANSI color escapes never count toward the width.
//
// The same tree can be flattened into a byte stream with private sentinel
// bytes marking the structure (`marked`), and reflowed from that form.

pub mod error;
pub mod marked;
pub mod metadata;
pub mod node;
pub mod options;
pub mod reflow;
pub mod render;
pub mod sentinel;
pub mod style;
pub mod table;
pub mod walk;
pub mod wrap;

pub use error::{Error, Result};
pub use node::{Fragment, Node, Scope};
pub use options::{Options, Width};
pub use table::{Alignment, TableAlignment};

/// A rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Leading `name: value` pairs, in document order.
    pub metadata: Vec<(String, String)>,
    /// The rendered body, one `\n` after every line.
    pub body: String,
}

/// Split off leading metadata, then render the rest.
pub fn markdown_to_text(markdown: &str, options: &Options) -> Document {
    let extracted = metadata::extract(markdown);
    let body = markdown_to_text_no_metadata(&markdown[extracted.body_start..], options);
    Document {
        metadata: extracted.items,
        body,
    }
}

/// Render the whole input as body text.
pub fn markdown_to_text_no_metadata(markdown: &str, options: &Options) -> String {
    let tree = render_tree(markdown, options);
    if tree.is_empty() {
        return String::new();
    }
    let width = options.width.resolve();
    let out = reflow::reflow(
        tree.nodes(),
        &options.first_line_prefix,
        &options.continuation_prefix,
        width,
    );
    sentinel::resolve(&out)
}

/// The intermediate tree for `markdown`, before reflow.
pub fn render_tree(markdown: &str, options: &Options) -> Fragment {
    let markdown = metadata::strip_summary_markers(markdown);
    walk::walk(&markdown, options)
}

/// The intermediate tree flattened into a sentinel-marked byte stream.
pub fn markdown_to_marked(markdown: &str, options: &Options) -> Vec<u8> {
    marked::encode(render_tree(markdown, options).nodes())
}
