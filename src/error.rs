// src/error.rs

use thiserror::Error;

/// Problems found while decoding a flat marked stream.
///
/// Streams produced by this crate are always well formed; these only surface
/// when decoding bytes that came from elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("indent scope opened at byte {offset} is never closed")]
    UnbalancedScope { offset: usize },

    #[error("indent scope opened at byte {offset} lacks its prefix separators")]
    MissingSeparator { offset: usize },

    #[error("unexpected {name} sentinel at byte {offset}")]
    StraySentinel { offset: usize, name: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
