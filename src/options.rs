// src/options.rs
//
// Render options and terminal width resolution.

use tracing::debug;

use crate::table::TableAlignment;

/// Used when no terminal or `COLUMNS` can tell us better.
pub const DEFAULT_WIDTH: usize = 79;

/// Target line width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Exactly this many columns.
    Fixed(usize),
    /// The ambient terminal width, reduced by this many columns.
    Ambient(usize),
}

impl Default for Width {
    fn default() -> Self {
        Width::Ambient(0)
    }
}

impl Width {
    /// Positive is absolute, zero is the ambient width, negative is the
    /// ambient width minus its magnitude.
    pub fn from_signed(n: i64) -> Self {
        if n > 0 {
            Width::Fixed(n as usize)
        } else {
            Width::Ambient(n.unsigned_abs() as usize)
        }
    }

    /// Resolve against an ambient width probe. Never below one column.
    pub fn resolve_with(self, probe: impl FnOnce() -> Option<usize>) -> usize {
        let width = match self {
            Width::Fixed(n) => n,
            Width::Ambient(less) => probe().unwrap_or(DEFAULT_WIDTH).saturating_sub(less),
        };
        width.max(1)
    }

    pub fn resolve(self) -> usize {
        let width = self.resolve_with(terminal_width);
        debug!(?self, width, "resolved render width");
        width
    }
}

/// Width of the terminal on stdout, falling back to `COLUMNS`.
pub fn terminal_width() -> Option<usize> {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return Some(w as usize);
        }
    }
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
}

/// Immutable configuration for one render call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Options {
    pub width: Width,
    pub color: bool,
    pub first_line_prefix: String,
    pub continuation_prefix: String,
    pub table_alignment: TableAlignment,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_width(mut self, width: Width) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Prefixes applied to the first line and to every later line.
    #[must_use]
    pub fn with_prefixes(mut self, first: impl Into<String>, continuation: impl Into<String>) -> Self {
        self.first_line_prefix = first.into();
        self.continuation_prefix = continuation.into();
        self
    }

    #[must_use]
    pub fn with_table_alignment(mut self, alignment: TableAlignment) -> Self {
        self.table_alignment = alignment;
        self
    }
}
