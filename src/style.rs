// src/style.rs
//
// ANSI SGR escapes and the ASCII fallbacks used when color is off.

use std::borrow::Cow;

pub const ESC: char = '\x1b';

pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const WHITE: &str = "\x1b[37m";
}

/// Inline span styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStyle {
    Emphasis,
    Strong,
    /// Emphasis and strong on the same span.
    Triple,
    Strikethrough,
    Code,
    Link,
    Image,
}

impl InlineStyle {
    /// Escape opening the span when color is on.
    pub fn escape(self) -> &'static str {
        match self {
            InlineStyle::Emphasis => ansi::YELLOW,
            InlineStyle::Strong => ansi::BOLD,
            InlineStyle::Triple => "\x1b[1m\x1b[31m",
            InlineStyle::Strikethrough => ansi::WHITE,
            InlineStyle::Code => ansi::GREEN,
            InlineStyle::Link => ansi::BLUE,
            InlineStyle::Image => ansi::MAGENTA,
        }
    }

    /// Punctuation around the span when color is off.
    /// Links and images carry their own bracket syntax instead.
    pub fn fallback(self) -> &'static str {
        match self {
            InlineStyle::Emphasis => "*",
            InlineStyle::Strong => "**",
            InlineStyle::Triple => "***",
            InlineStyle::Strikethrough => "~~",
            InlineStyle::Code => "\"",
            InlineStyle::Link | InlineStyle::Image => "",
        }
    }

    /// Wrap already rendered text.
    pub fn wrap(self, text: &str, color: bool) -> String {
        let (open, close) = if color {
            (self.escape(), ansi::RESET)
        } else {
            (self.fallback(), self.fallback())
        };
        let mut out = String::with_capacity(open.len() + text.len() + close.len());
        out.push_str(open);
        out.push_str(text);
        out.push_str(close);
        out
    }
}

/// Byte length of the SGR escape starting at `s[0]`, if `s` starts with one.
///
/// Only `ESC [ <digits and ;> m` is recognised. Anything else beginning with
/// ESC is left to be treated as ordinary visible text.
pub fn sgr_len(s: &str) -> Option<usize> {
    let b = s.as_bytes();
    if b.len() < 3 || b[0] != 0x1b || b[1] != b'[' {
        return None;
    }
    let params = b[2..]
        .iter()
        .take_while(|c| c.is_ascii_digit() || **c == b';')
        .count();
    match b.get(2 + params) {
        Some(b'm') => Some(3 + params),
        _ => None,
    }
}

/// Remove SGR escapes, leaving any other text untouched.
pub fn strip_escapes(s: &str) -> Cow<'_, str> {
    if !s.contains(ESC) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find(ESC) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match sgr_len(rest) {
            Some(n) => rest = &rest[n..],
            None => {
                out.push(ESC);
                rest = &rest[ESC.len_utf8()..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
