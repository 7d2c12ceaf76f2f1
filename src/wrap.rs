// src/wrap.rs
//
// Greedy, escape-aware word wrap of one prefix-resolved region.
//
// Input lines are separated by `sentinel::LINE_BREAK`; words by spaces.
// SGR escapes are carried as zero-width decorations on the word they sit in,
// so width accounting never has to rescan for them.

use unicode_width::UnicodeWidthChar;

use crate::sentinel::{HRULE, LINE_BREAK, NBSP_CHAR};
use crate::style::{self, ESC};

const BREAK: char = LINE_BREAK as char;

/// A word split into its visible text and the escapes interleaved with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Word {
    visible: String,
    /// (byte offset into `visible`, escape sequence)
    decorations: Vec<(usize, String)>,
    width: usize,
}

impl Word {
    pub fn parse(raw: &str) -> Self {
        let mut visible = String::with_capacity(raw.len());
        let mut decorations = Vec::new();
        let mut rest = raw;
        while let Some(pos) = rest.find(ESC) {
            visible.push_str(&rest[..pos]);
            rest = &rest[pos..];
            match style::sgr_len(rest) {
                Some(n) => {
                    decorations.push((visible.len(), rest[..n].to_string()));
                    rest = &rest[n..];
                }
                None => {
                    // unterminated: the introducer is an ordinary visible char
                    visible.push(ESC);
                    rest = &rest[ESC.len_utf8()..];
                }
            }
        }
        visible.push_str(rest);
        let width = visible.chars().map(char_width).sum();
        Self {
            visible,
            decorations,
            width,
        }
    }

    pub fn visible(&self) -> &str {
        &self.visible
    }

    pub fn decorations(&self) -> &[(usize, String)] {
        &self.decorations
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn write_to(&self, out: &mut String) {
        let mut last = 0usize;
        for (offset, escape) in &self.decorations {
            out.push_str(&self.visible[last..*offset]);
            out.push_str(escape);
            last = *offset;
        }
        out.push_str(&self.visible[last..]);
    }
}

/// Terminal columns taken by `c`. NBSP and a stray ESC count as one column.
pub fn char_width(c: char) -> usize {
    if c == NBSP_CHAR || c == ESC {
        1
    } else {
        c.width().unwrap_or(0)
    }
}

/// Terminal columns taken by `s`, excluding SGR escapes.
pub fn visible_width(s: &str) -> usize {
    style::strip_escapes(s).chars().map(char_width).sum()
}

/// Fill character and whatever follows it, for a line opening with a rule.
fn rule_fill(line: &str) -> Option<(char, &str)> {
    let rest = line.strip_prefix(HRULE as char)?;
    let fill = rest.chars().next()?;
    Some((fill, &rest[fill.len_utf8()..]))
}

fn is_word_gap(c: char) -> bool {
    c == ' ' || c == '\n'
}

/// Wrap `text` to `width` columns.
///
/// The first line written gets `prefix_first`, every later one
/// `prefix_continuation`. A word is appended to the current line only while
/// `len + 1 + word < width`; a word too long for any line is placed alone
/// rather than split. Every produced line, the last included, ends in a
/// line-break sentinel.
pub fn wrap(text: &str, width: usize, prefix_first: &str, prefix_continuation: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = text.strip_suffix(BREAK).unwrap_or(text);
    let continuation_width = visible_width(prefix_continuation);
    let mut out = String::with_capacity(text.len() + text.len() / 8);

    for line in text.split(BREAK) {
        let line = match rule_fill(line) {
            Some((fill, rest)) => {
                let prefix = if out.is_empty() { prefix_first } else { prefix_continuation };
                out.push_str(prefix);
                let mut len = visible_width(prefix);
                let step = char_width(fill).max(1);
                while len + step <= width {
                    out.push(fill);
                    len += step;
                }
                out.push(BREAK);
                if rest.trim_matches(' ').is_empty() {
                    continue;
                }
                // anything after the rule goes on the next line
                rest
            }
            None => line,
        };

        let mut line_len = 0usize;
        let mut start = true;
        for raw in line.split(is_word_gap).filter(|w| !w.is_empty()) {
            let word = Word::parse(raw);
            if start {
                let prefix = if out.is_empty() { prefix_first } else { prefix_continuation };
                out.push_str(prefix);
                line_len = visible_width(prefix) + word.width();
                start = false;
            } else if line_len + 1 + word.width() < width {
                out.push(' ');
                line_len += 1 + word.width();
            } else {
                out.push(BREAK);
                out.push_str(prefix_continuation);
                line_len = continuation_width + word.width();
            }
            word.write_to(&mut out);
        }
        out.push(BREAK);
    }
    out
}
