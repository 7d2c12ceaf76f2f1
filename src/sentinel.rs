// src/sentinel.rs
//
// Private control bytes used to encode structure inside a flat marked stream.
// All of them sit in the C0 range and none is TAB (0x09) or LF (0x0A), so they
// can never collide with text a document legitimately carries.

/// Forced line break.
pub const LINE_BREAK: u8 = 0x01;
/// Space that word wrap must not break on.
pub const NBSP: u8 = 0x02;
/// Opens an indent scope.
pub const INDENT_START: u8 = 0x03;
/// Ends the first-line prefix of a scope.
pub const INDENT_FIRST: u8 = 0x04;
/// Ends the continuation prefix of a scope; content follows.
pub const INDENT_CONTINUATION: u8 = 0x05;
/// Closes the innermost open indent scope.
pub const INDENT_STOP: u8 = 0x06;
/// Terminates a table row in a grid sub-stream.
pub const TABLE_ROW: u8 = 0x07;
/// Terminates a table cell in a grid sub-stream.
pub const TABLE_CELL: u8 = 0x08;
/// Horizontal rule tag; the following byte is the fill character.
pub const HRULE: u8 = 0x0B;

/// `NBSP` as a `char`, for code that builds `String`s.
pub const NBSP_CHAR: char = NBSP as char;

const ALPHABET: [u8; 9] = [
    LINE_BREAK,
    NBSP,
    INDENT_START,
    INDENT_FIRST,
    INDENT_CONTINUATION,
    INDENT_STOP,
    TABLE_ROW,
    TABLE_CELL,
    HRULE,
];

#[inline]
pub fn is_sentinel(b: u8) -> bool {
    ALPHABET.contains(&b)
}

#[inline]
pub fn is_sentinel_char(c: char) -> bool {
    c.is_ascii() && is_sentinel(c as u8)
}

/// True for bytes after which the output already sits at the start of a line:
/// a line break, the end of a scope header, or the end of a scope.
#[inline]
pub fn ends_line(b: u8) -> bool {
    b == LINE_BREAK || b == INDENT_CONTINUATION || b == INDENT_STOP
}

/// Drop sentinel bytes from document text so they can only ever come from the renderer.
pub fn scrub(text: &str) -> std::borrow::Cow<'_, str> {
    if text.chars().any(is_sentinel_char) {
        std::borrow::Cow::Owned(text.chars().filter(|&c| !is_sentinel_char(c)).collect())
    } else {
        std::borrow::Cow::Borrowed(text)
    }
}

/// Final substitution: NBSP becomes a space and LINE_BREAK becomes `\n`.
pub fn resolve(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c == NBSP_CHAR {
                ' '
            } else if c == LINE_BREAK as char {
                '\n'
            } else {
                c
            }
        })
        .collect()
}

/// Debug name of a sentinel byte.
pub fn name(b: u8) -> Option<&'static str> {
    Some(match b {
        LINE_BREAK => "BR",
        NBSP => "NBSP",
        INDENT_START => "START",
        INDENT_FIRST => "FIRST",
        INDENT_CONTINUATION => "CONT",
        INDENT_STOP => "STOP",
        TABLE_ROW => "ROW",
        TABLE_CELL => "CELL",
        HRULE => "HR",
        _ => return None,
    })
}

/// Render a marked stream with each sentinel shown as `<NAME>`.
/// A line break also emits a real newline so the dump stays readable.
pub fn annotate(stream: &[u8]) -> String {
    let mut out = String::with_capacity(stream.len() + stream.len() / 4);
    let mut start = 0usize;
    for (i, &b) in stream.iter().enumerate() {
        if let Some(n) = name(b) {
            out.push_str(&String::from_utf8_lossy(&stream[start..i]));
            out.push('<');
            out.push_str(n);
            out.push('>');
            if b == LINE_BREAK {
                out.push('\n');
            }
            start = i + 1;
        }
    }
    out.push_str(&String::from_utf8_lossy(&stream[start..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn alphabet_avoids_whitespace_controls() {
        assert!(!is_sentinel(b'\t'));
        assert!(!is_sentinel(b'\n'));
        assert!(!is_sentinel(b'\r'));
        assert!(!is_sentinel(0x1b));
        assert!(ALPHABET.iter().all(|b| b.is_ascii_control()));
    }

    #[test]
    fn resolve_substitutes_nbsp_and_breaks() {
        let s = format!("a{}b{}", NBSP_CHAR, LINE_BREAK as char);
        assert_eq!(resolve(&s), "a b\n");
    }

    #[test]
    fn scrub_removes_only_sentinels() {
        let s = format!("x\u{1}y\tz\u{b}");
        assert_eq!(scrub(&s), "xy\tz");
        assert!(matches!(scrub("plain"), std::borrow::Cow::Borrowed(_)));
    }

    #[test]
    fn annotate_names_sentinels() {
        let stream = [INDENT_START, b'>', INDENT_FIRST, b'>', INDENT_CONTINUATION, b'x', INDENT_STOP];
        assert_eq!(annotate(&stream), "<START>><FIRST>><CONT>x<STOP>");
    }
}
