// src/node.rs
//
// Intermediate tree built by the renderer and consumed by reflow.
//
// A `Fragment` is an ordered run of nodes. Block spacing rules are phrased in
// terms of "what the output ends with", so `Fragment` can answer that question
// the same way the flat marked stream would: only a line break, the end of a
// scope header and the end of a scope count as sitting at a line start.

use crate::style;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Inline text. May carry SGR escapes and `sentinel::NBSP_CHAR`.
    Text(String),
    LineBreak,
    Scope(Scope),
    /// Horizontal rule drawn with the given fill character.
    Rule(char),
}

/// Nested region with its own first-line and continuation prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scope {
    pub prefix_first: String,
    pub prefix_continuation: String,
    pub children: Vec<Node>,
}

impl Scope {
    pub fn new(prefix_first: impl Into<String>, prefix_continuation: impl Into<String>) -> Self {
        Self {
            prefix_first: prefix_first.into(),
            prefix_continuation: prefix_continuation.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Fragment) -> Self {
        self.children = children.into_nodes();
        self
    }
}

/// What precedes a fragment in the final stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lead {
    /// Nothing: the fragment is a freshly rendered, detached buffer.
    #[default]
    Empty,
    /// The header of a scope the fragment is the body of.
    OpenScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    nodes: Vec<Node>,
    lead: Lead,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body of a scope that stays open while siblings are appended to it.
    pub fn scope_body() -> Self {
        Self {
            nodes: Vec::new(),
            lead: Lead::OpenScope,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        let mut f = Self::new();
        f.push_text(s.into());
        f
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append text, merging with a trailing text node.
    pub fn push_text(&mut self, s: impl AsRef<str>) {
        let s = s.as_ref();
        if s.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.nodes.last_mut() {
            last.push_str(s);
        } else {
            self.nodes.push(Node::Text(s.to_string()));
        }
    }

    pub fn push(&mut self, node: Node) {
        match node {
            Node::Text(s) => self.push_text(s),
            other => self.nodes.push(other),
        }
    }

    pub fn push_break(&mut self) {
        self.nodes.push(Node::LineBreak);
    }

    pub fn append(&mut self, other: Fragment) {
        for node in other.nodes {
            self.push(node);
        }
    }

    /// Strip line breaks from both ends.
    #[must_use]
    pub fn trim_breaks(mut self) -> Self {
        let lead = self.nodes.iter().take_while(|n| **n == Node::LineBreak).count();
        self.nodes.drain(..lead);
        while self.nodes.last() == Some(&Node::LineBreak) {
            self.nodes.pop();
        }
        self
    }

    /// True if anything visible would be printed for this fragment.
    pub fn has_content(&self) -> bool {
        nodes_have_content(&self.nodes)
    }

    /// Visible text with escapes removed; line breaks and scopes flatten to spaces.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        flatten(&self.nodes, &mut out, false);
        out
    }

    /// Text with escapes kept; line breaks flatten to spaces.
    pub fn inline_text(&self) -> String {
        let mut out = String::new();
        flatten(&self.nodes, &mut out, true);
        out
    }

    /// Up to `want` line-end flags for the trailing stream positions, last first.
    fn tail(&self, want: usize) -> Vec<bool> {
        let mut out = Vec::with_capacity(want);
        collect_tail(&self.nodes, &mut out, want);
        if out.len() < want && self.lead == Lead::OpenScope {
            out.push(true);
            out.resize(want, false);
        }
        out
    }

    /// Make the fragment end in a blank line, unless it is empty.
    pub fn ensure_blank_line(&mut self) {
        let add = match self.tail(2).as_slice() {
            [] => 0,
            [last] => {
                if *last {
                    1
                } else {
                    2
                }
            }
            [last, second, ..] => {
                if !*last {
                    2
                } else if !*second {
                    1
                } else {
                    0
                }
            }
        };
        for _ in 0..add {
            self.push_break();
        }
    }

    /// Make the fragment end at a line start, unless it is empty.
    pub fn ensure_new_line(&mut self) {
        if self.tail(1).first() == Some(&false) {
            self.push_break();
        }
    }
}

impl From<Vec<Node>> for Fragment {
    fn from(nodes: Vec<Node>) -> Self {
        let mut f = Fragment::new();
        for node in nodes {
            f.push(node);
        }
        f
    }
}

fn collect_tail(nodes: &[Node], out: &mut Vec<bool>, want: usize) {
    for node in nodes.iter().rev() {
        if out.len() >= want {
            return;
        }
        match node {
            Node::LineBreak => out.push(true),
            Node::Text(s) => {
                let n = s.chars().count().min(want - out.len());
                out.extend(std::iter::repeat(false).take(n));
            }
            Node::Rule(_) => {
                let n = 2.min(want - out.len());
                out.extend(std::iter::repeat(false).take(n));
            }
            Node::Scope(scope) => {
                out.push(true);
                collect_tail(&scope.children, out, want);
                if out.len() < want {
                    out.push(true);
                }
                // a prefix byte or the first-line separator comes before that
                out.resize(out.len().max(want), false);
            }
        }
    }
}

fn nodes_have_content(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Text(s) => style::strip_escapes(s)
            .chars()
            .any(|c| !c.is_whitespace() && c != crate::sentinel::NBSP_CHAR),
        Node::LineBreak => false,
        Node::Rule(_) => true,
        Node::Scope(scope) => nodes_have_content(&scope.children),
    })
}

fn flatten(nodes: &[Node], out: &mut String, keep_escapes: bool) {
    for node in nodes {
        match node {
            Node::Text(s) if keep_escapes => out.push_str(s),
            Node::Text(s) => out.push_str(&style::strip_escapes(s)),
            Node::LineBreak => out.push(' '),
            Node::Rule(c) => out.push(*c),
            Node::Scope(scope) => flatten(&scope.children, out, keep_escapes),
        }
    }
}
