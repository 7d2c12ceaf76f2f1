// src/marked.rs
//
// Flat marked-stream form of the node tree.
//
//   scope := INDENT_START prefix_first INDENT_FIRST prefix_continuation
//            INDENT_CONTINUATION content INDENT_STOP
//   rule  := HRULE fill_char
//
// Scopes nest; the stop matching a start is found with a depth counter, so a
// nested scope's stop never ends its parent.

use memchr::{memchr, memchr2};

use crate::error::{Error, Result};
use crate::node::{Fragment, Node, Scope};
use crate::sentinel::{self, HRULE, INDENT_CONTINUATION, INDENT_FIRST, INDENT_START, INDENT_STOP, LINE_BREAK};

/* ================================ Encode ================================= */

pub fn encode(nodes: &[Node]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(nodes, &mut out);
    out
}

fn encode_into(nodes: &[Node], out: &mut Vec<u8>) {
    for node in nodes {
        match node {
            Node::Text(s) => out.extend_from_slice(s.as_bytes()),
            Node::LineBreak => out.push(LINE_BREAK),
            Node::Rule(fill) => {
                out.push(HRULE);
                let mut buf = [0u8; 4];
                out.extend_from_slice(fill.encode_utf8(&mut buf).as_bytes());
            }
            Node::Scope(scope) => {
                out.push(INDENT_START);
                out.extend_from_slice(scope.prefix_first.as_bytes());
                out.push(INDENT_FIRST);
                out.extend_from_slice(scope.prefix_continuation.as_bytes());
                out.push(INDENT_CONTINUATION);
                encode_into(&scope.children, out);
                out.push(INDENT_STOP);
            }
        }
    }
}

/* ================================ Decode ================================= */

pub fn decode(stream: &[u8]) -> Result<Vec<Node>> {
    decode_at(stream, 0).map(Fragment::into_nodes)
}

/// Index in `body` of the stop closing a scope whose start sits just before it.
fn matching_stop(body: &[u8]) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = 0usize;
    while let Some(i) = memchr2(INDENT_START, INDENT_STOP, &body[pos..]) {
        let at = pos + i;
        if body[at] == INDENT_START {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(at);
            }
        }
        pos = at + 1;
    }
    None
}

fn decode_at(stream: &[u8], base: usize) -> Result<Fragment> {
    let mut out = Fragment::new();
    let mut pos = 0usize;

    while let Some(i) = memchr(INDENT_START, &stream[pos..]) {
        let start = pos + i;
        decode_flat(&stream[pos..start], base + pos, &mut out)?;

        let body = &stream[start + 1..];
        let body_base = base + start + 1;
        let stop = matching_stop(body).ok_or(Error::UnbalancedScope { offset: base + start })?;
        let inner = &body[..stop];

        let missing = Error::MissingSeparator { offset: base + start };
        let first = memchr(INDENT_FIRST, inner).ok_or(missing.clone())?;
        let cont = memchr(INDENT_CONTINUATION, &inner[first + 1..])
            .map(|c| first + 1 + c)
            .ok_or(missing.clone())?;
        if memchr(INDENT_START, &inner[..cont]).is_some() {
            return Err(missing);
        }

        let children = decode_at(&inner[cont + 1..], body_base + cont + 1)?;
        let scope = Scope::new(
            String::from_utf8_lossy(&inner[..first]),
            String::from_utf8_lossy(&inner[first + 1..cont]),
        )
        .with_children(children);
        out.push(Node::Scope(scope));

        pos = start + 1 + stop + 1;
    }
    decode_flat(&stream[pos..], base + pos, &mut out)?;
    Ok(out)
}

/// Decode a run that holds no scopes: text, line breaks and rules.
fn decode_flat(segment: &[u8], base: usize, out: &mut Fragment) -> Result<()> {
    let mut text_start = 0usize;
    let mut i = 0usize;
    while i < segment.len() {
        let b = segment[i];
        if !sentinel::is_sentinel(b) || b == sentinel::NBSP {
            i += 1;
            continue;
        }
        out.push_text(String::from_utf8_lossy(&segment[text_start..i]));
        match b {
            LINE_BREAK => {
                out.push_break();
                i += 1;
            }
            HRULE => {
                let fill = leading_char(&segment[i + 1..]).ok_or(Error::StraySentinel {
                    offset: base + i,
                    name: "HR",
                })?;
                out.push(Node::Rule(fill));
                i += 1 + fill.len_utf8();
            }
            other => {
                return Err(Error::StraySentinel {
                    offset: base + i,
                    name: sentinel::name(other).unwrap_or("unknown"),
                });
            }
        }
        text_start = i;
    }
    out.push_text(String::from_utf8_lossy(&segment[text_start..]));
    Ok(())
}

/// The valid UTF-8 character at the start of `bytes`, if there is one.
fn leading_char(bytes: &[u8]) -> Option<char> {
    (1..=bytes.len().min(4))
        .find_map(|n| std::str::from_utf8(&bytes[..n]).ok())
        .and_then(|s| s.chars().next())
}
