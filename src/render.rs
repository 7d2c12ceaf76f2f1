// src/render.rs
//
// One handler per document node kind. Handlers append to the fragment of
// the container they are rendered into; spacing between blocks depends on
// what that fragment already ends with.
//
// Container content arrives as `Rendered`: a child render that found nothing
// to show is `Err(Cancelled)` and simply contributes nothing.

use tracing::trace;

use crate::node::{Fragment, Node, Scope};
use crate::options::Options;
use crate::sentinel::{self, NBSP_CHAR};
use crate::style::{ansi, InlineStyle};
use crate::table::TableGrid;

/// A sub-render produced no visible content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

pub type Rendered = Result<Fragment, Cancelled>;

/// (first-line prefix, continuation prefix) pairs.
pub const QUOTE_PREFIXES: (&str, &str) = ("> ", "> ");
pub const ITEM_PREFIXES: (&str, &str) = ("  * ", "    ");
pub const HEADING_PREFIXES: (&str, &str) = ("--[ ", "    ");
pub const SECTION_PREFIXES: (&str, &str) = ("    ", "    ");

const TAB_STOP: &str = "    ";

/// Keep `inner` only if it shows something.
pub fn require_content(inner: Fragment) -> Rendered {
    if inner.has_content() {
        Ok(inner)
    } else {
        Err(Cancelled)
    }
}

fn scope(prefixes: (&str, &str), children: Fragment) -> Node {
    Node::Scope(Scope::new(prefixes.0, prefixes.1).with_children(children))
}

/* ============================== Headings ================================= */

/// What a heading does to the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingPlan {
    /// Open section scopes to close first.
    pub close: usize,
    /// The title line itself.
    pub title: Node,
    /// Section scopes to open after the title.
    pub open: usize,
    /// Section depth once the heading is applied.
    pub depth: usize,
}

/// Document-level output plus the heading sections still open.
///
/// Each open section is a scope indenting everything after its heading
/// until a heading of the same or a shallower level closes it.
#[derive(Debug, Default)]
pub struct Outline {
    root: Fragment,
    open: Vec<Fragment>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Fragment new blocks are appended to.
    pub fn current(&mut self) -> &mut Fragment {
        match self.open.last_mut() {
            Some(section) => section,
            None => &mut self.root,
        }
    }

    fn close_section(&mut self) {
        if let Some(body) = self.open.pop() {
            let node = scope(SECTION_PREFIXES, body);
            self.current().push(node);
        }
    }

    pub fn apply(&mut self, plan: HeadingPlan) {
        self.current().ensure_blank_line();
        for _ in 0..plan.close {
            self.close_section();
        }
        self.current().push(plan.title);
        for _ in 0..plan.open {
            self.open.push(Fragment::scope_body());
        }
        debug_assert_eq!(self.depth(), plan.depth);
        self.current().ensure_blank_line();
    }

    /// Close every open section and hand back the document.
    pub fn finish(mut self) -> Fragment {
        while !self.open.is_empty() {
            self.close_section();
        }
        self.root
    }
}

/* =============================== Renderer ================================ */

pub struct Renderer<'a> {
    options: &'a Options,
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    fn color(&self) -> bool {
        self.options.color
    }

    /* ----------------------------- Blocks -------------------------------- */

    pub fn code_block(&self, out: &mut Fragment, code: &str) {
        let code = code.strip_suffix('\n').unwrap_or(code);
        out.ensure_blank_line();
        for line in code.split('\n') {
            let line = sentinel::scrub(line)
                .replace('\t', TAB_STOP)
                .replace(' ', &NBSP_CHAR.to_string());
            if self.color() {
                out.push_text(ansi::GREEN);
                out.push_text(line);
                out.push_text(ansi::RESET);
            } else {
                out.push_text(line);
            }
            out.push_break();
        }
        out.ensure_blank_line();
    }

    pub fn block_quote(&self, out: &mut Fragment, inner: Fragment) {
        out.ensure_blank_line();
        out.push(scope(QUOTE_PREFIXES, inner.trim_breaks()));
    }

    pub fn block_html(&self, out: &mut Fragment, html: &str) {
        out.ensure_blank_line();
        let mut lines = html.split('\n').peekable();
        while let Some(line) = lines.next() {
            out.push_text(sentinel::scrub(line));
            if lines.peek().is_some() {
                out.push_break();
            }
        }
    }

    /// Plan a top-level heading of `level` (1-based) given the current depth.
    pub fn heading(&self, depth: usize, level: usize, title: Rendered) -> Result<HeadingPlan, Cancelled> {
        let title = title.inspect_err(|_| trace!(level, "heading cancelled"))?;
        let target = level.saturating_sub(1);
        let close = depth.saturating_sub(target);
        let open = level - depth.min(target);
        trace!(level, depth, close, open, "heading");
        Ok(HeadingPlan {
            close,
            title: self.heading_title(title),
            open,
            depth: level,
        })
    }

    /// The `--[ title ]--` line on its own, for headings nested in containers.
    pub fn nested_heading(&self, out: &mut Fragment, title: Rendered) {
        if let Ok(title) = title {
            out.ensure_blank_line();
            out.push(self.heading_title(title));
            out.ensure_blank_line();
        }
    }

    fn heading_title(&self, title: Fragment) -> Node {
        let mut body = Fragment::new();
        if self.color() {
            body.push_text(ansi::BOLD);
            body.append(title);
            body.push_text(ansi::RESET);
        } else {
            body.append(title);
        }
        body.push_text(format!("{NBSP_CHAR}]--"));
        scope(HEADING_PREFIXES, body)
    }

    pub fn rule(&self, out: &mut Fragment) {
        out.ensure_blank_line();
        out.push(Node::Rule('-'));
        out.ensure_blank_line();
    }

    pub fn list(&self, out: &mut Fragment, items: Rendered) {
        match items {
            Ok(items) => {
                out.ensure_new_line();
                out.append(items);
            }
            Err(Cancelled) => trace!("list cancelled"),
        }
    }

    pub fn list_item(&self, out: &mut Fragment, inner: Fragment) {
        out.ensure_new_line();
        out.push(scope(ITEM_PREFIXES, inner.trim_breaks()));
    }

    pub fn paragraph(&self, out: &mut Fragment, inner: Rendered) {
        out.ensure_blank_line();
        match inner {
            Ok(inner) => out.append(inner),
            Err(Cancelled) => trace!("paragraph cancelled"),
        }
    }

    pub fn table(&self, out: &mut Fragment, grid: &TableGrid) {
        out.ensure_blank_line();
        out.append(grid.render(&self.options.table_alignment));
    }

    pub fn footnotes(&self, out: &mut Fragment, items: Rendered) {
        match items {
            Ok(items) => {
                out.ensure_blank_line();
                out.append(items);
            }
            Err(Cancelled) => trace!("footnotes cancelled"),
        }
    }

    /// Append one footnote definition, labelled with its reference number.
    pub fn footnote_item(&self, out: &mut Fragment, inner: Fragment, id: usize) {
        out.ensure_blank_line();
        let inner = inner.trim_breaks();
        // a rule must stay alone on its line
        let ends_in_rule = matches!(inner.nodes().last(), Some(Node::Rule(_)));
        out.append(inner);
        if ends_in_rule {
            out.push_break();
            out.push_text(format!("[{id}]"));
        } else {
            out.push_text(format!("{NBSP_CHAR}[{id}]"));
        }
    }

    /* ----------------------------- Inlines ------------------------------- */

    pub fn text(&self, text: &str) -> Fragment {
        Fragment::text(sentinel::scrub(text))
    }

    pub fn styled(&self, style: InlineStyle, inner: Fragment) -> Fragment {
        let (open, close) = if self.color() {
            (style.escape(), ansi::RESET)
        } else {
            (style.fallback(), style.fallback())
        };
        let mut out = Fragment::text(open);
        out.append(inner);
        out.push_text(close);
        out
    }

    pub fn code_span(&self, code: &str) -> Fragment {
        let code = sentinel::scrub(code).replace(' ', &NBSP_CHAR.to_string());
        Fragment::text(InlineStyle::Code.wrap(&code, self.color()))
    }

    /// `[content] url`, or just the url when the content adds nothing.
    pub fn link(&self, url: &str, title: &str, content: Fragment) -> Fragment {
        let visible = content.plain_text();
        let label = if !visible.trim().is_empty() && visible != url {
            Some(content)
        } else if !title.is_empty() && title != url {
            Some(self.text(title))
        } else {
            None
        };
        self.labelled(InlineStyle::Link, url, label)
    }

    /// `[alt] url`, `[title] url`, or just the url.
    pub fn image(&self, url: &str, title: &str, alt: Fragment) -> Fragment {
        let label = if !alt.plain_text().trim().is_empty() {
            Some(alt)
        } else if !title.is_empty() {
            Some(self.text(title))
        } else {
            None
        };
        self.labelled(InlineStyle::Image, url, label)
    }

    fn labelled(&self, style: InlineStyle, url: &str, label: Option<Fragment>) -> Fragment {
        let mut out = Fragment::new();
        if self.color() {
            out.push_text(style.escape());
        }
        if let Some(label) = label {
            out.push_text("[");
            out.append(label);
            out.push_text("] ");
        }
        out.push_text(sentinel::scrub(url));
        if self.color() {
            out.push_text(ansi::RESET);
        }
        out
    }

    pub fn footnote_ref(&self, id: usize) -> Fragment {
        Fragment::text(format!("[{id}]"))
    }

    pub fn task_marker(&self, checked: bool) -> Fragment {
        Fragment::text(if checked { "[x] " } else { "[ ] " })
    }

    pub fn line_break(&self) -> Fragment {
        Fragment::from(vec![Node::LineBreak])
    }
}
