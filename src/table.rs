// src/table.rs
//
// Table layout: unify column widths across header and body, then draw a
// bordered grid.
//
//   +-----+----+
//   | A   | BB |
//   +-----+----+
//   | 1   | 22 |
//   +-----+----+

use tracing::debug;

use crate::node::Fragment;
use crate::sentinel::{NBSP_CHAR, TABLE_CELL, TABLE_ROW};
use crate::wrap::visible_width;

/// Header rows whose first cell reads this are left out of the grid.
pub const OMIT: &str = "omit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// How cell text sits inside its padded field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableAlignment {
    #[default]
    Left,
    Center,
    Right,
    /// Whatever the document's delimiter row asks for, left where it is silent.
    Document,
    /// Explicit per-column alignment, left past the end of the list.
    Columns(Vec<Alignment>),
}

impl TableAlignment {
    pub fn column(&self, index: usize, document: &[Option<Alignment>]) -> Alignment {
        match self {
            TableAlignment::Left => Alignment::Left,
            TableAlignment::Center => Alignment::Center,
            TableAlignment::Right => Alignment::Right,
            TableAlignment::Document => document.get(index).copied().flatten().unwrap_or_default(),
            TableAlignment::Columns(columns) => columns.get(index).copied().unwrap_or_default(),
        }
    }
}

impl std::str::FromStr for TableAlignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(TableAlignment::Left),
            "center" | "centre" => Ok(TableAlignment::Center),
            "right" => Ok(TableAlignment::Right),
            "document" => Ok(TableAlignment::Document),
            other => Err(format!("unknown table alignment {other:?}")),
        }
    }
}

/// Header and body cells of one table, already rendered to inline text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableGrid {
    pub header: Vec<Vec<String>>,
    pub body: Vec<Vec<String>>,
    /// Alignment requested by the document, per column.
    pub alignments: Vec<Option<Alignment>>,
}

/// Split a row/cell sentinel stream into rows of cells.
///
/// Each cell is terminated by `TABLE_CELL` and each row by `TABLE_ROW`.
/// Rows with no cells are blank separators and are skipped.
pub fn split_rows(stream: &str) -> Vec<Vec<String>> {
    let row_end = TABLE_ROW as char;
    let cell_end = TABLE_CELL as char;
    stream
        .split_terminator(row_end)
        .filter(|row| !row.is_empty())
        .map(|row| row.split_terminator(cell_end).map(str::to_string).collect())
        .collect()
}

impl TableGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a grid from row/cell sentinel sub-streams.
    pub fn from_marked(header: &str, body: &str) -> Self {
        let mut grid = Self::new();
        for row in split_rows(header) {
            grid.push_header(row);
        }
        for row in split_rows(body) {
            grid.push_body(row);
        }
        grid
    }

    /// Add a header row unless it is marked to be omitted.
    pub fn push_header(&mut self, row: Vec<String>) {
        let omitted = row
            .first()
            .is_some_and(|cell| crate::style::strip_escapes(cell).trim() == OMIT);
        if !omitted {
            self.header.push(row);
        }
    }

    pub fn push_body(&mut self, row: Vec<String>) {
        if !row.is_empty() {
            self.body.push(row);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.body.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.header.iter().chain(&self.body).map(Vec::len).max().unwrap_or(0)
    }

    /// Widest visible cell per column, header and body combined.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0usize; self.num_columns()];
        for row in self.header.iter().chain(&self.body) {
            for (c, cell) in row.iter().enumerate() {
                widths[c] = widths[c].max(visible_width(cell));
            }
        }
        widths
    }

    /// Draw the grid as plain lines.
    pub fn layout(&self, policy: &TableAlignment) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        let widths = self.column_widths();
        let aligns: Vec<Alignment> = (0..widths.len())
            .map(|c| policy.column(c, &self.alignments))
            .collect();
        debug!(columns = widths.len(), ?widths, "table layout");

        let border = border_line(&widths);
        let mut lines = vec![border.clone()];
        if !self.header.is_empty() {
            lines.extend(self.header.iter().map(|row| row_line(row, &widths, &aligns)));
            lines.push(border.clone());
        }
        if !self.body.is_empty() {
            lines.extend(self.body.iter().map(|row| row_line(row, &widths, &aligns)));
            lines.push(border);
        }
        lines
    }

    /// Laid-out grid as a fragment: spaces become NBSP so reflow keeps each
    /// line intact, and lines are separated by line-break nodes.
    pub fn render(&self, policy: &TableAlignment) -> Fragment {
        let mut out = Fragment::new();
        for line in self.layout(policy) {
            out.push_text(line.replace(' ', &NBSP_CHAR.to_string()));
            out.push_break();
        }
        out
    }
}

fn border_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line
}

fn row_line(row: &[String], widths: &[usize], aligns: &[Alignment]) -> String {
    let mut line = String::from("|");
    for (c, width) in widths.iter().enumerate() {
        let cell = row.get(c).map(String::as_str).unwrap_or("");
        line.push(' ');
        line.push_str(&align_cell(cell, *width, aligns[c]));
        line.push_str(" |");
    }
    line
}

fn align_cell(cell: &str, width: usize, alignment: Alignment) -> String {
    let padding = width.saturating_sub(visible_width(cell));
    let (left, right) = match alignment {
        Alignment::Left => (0, padding),
        Alignment::Right => (padding, 0),
        Alignment::Center => (padding / 2, padding - padding / 2),
    };
    format!("{}{}{}", " ".repeat(left), cell, " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn sample() -> TableGrid {
        let mut grid = TableGrid::new();
        grid.push_header(row(&["A", "BB"]));
        grid.push_body(row(&["1", "22"]));
        grid
    }

    #[test]
    fn widths_span_header_and_body() {
        assert_eq!(sample().column_widths(), vec![1, 2]);
    }

    #[test]
    fn renders_bordered_grid() {
        let lines = sample().layout(&TableAlignment::Left);
        assert_eq!(
            lines,
            vec![
                "+---+----+",
                "| A | BB |",
                "+---+----+",
                "| 1 | 22 |",
                "+---+----+",
            ]
        );
    }

    #[test]
    fn border_length_matches_widths() {
        let mut grid = TableGrid::new();
        grid.push_header(row(&["name", "x", "description"]));
        grid.push_body(row(&["a", "longer cell", ""]));
        let widths = grid.column_widths();
        let expected: usize = widths.iter().map(|w| w + 3).sum::<usize>() + 1;
        for line in grid.layout(&TableAlignment::Left) {
            assert_eq!(line.chars().count(), expected);
        }
    }

    #[test]
    fn escapes_do_not_widen_columns() {
        let mut grid = TableGrid::new();
        grid.push_body(row(&["\x1b[1mab\x1b[0m", "c"]));
        grid.push_body(row(&["abc", "d"]));
        assert_eq!(grid.column_widths(), vec![3, 1]);
        let lines = grid.layout(&TableAlignment::Left);
        assert_eq!(lines[1], "| \x1b[1mab\x1b[0m  | c |");
    }

    #[test]
    fn omit_header_is_dropped() {
        let mut grid = TableGrid::new();
        grid.push_header(row(&["omit", ""]));
        grid.push_body(row(&["x", "y"]));
        assert!(grid.header.is_empty());
        assert_eq!(grid.layout(&TableAlignment::Left), vec!["+---+---+", "| x | y |", "+---+---+"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let mut grid = TableGrid::new();
        grid.push_body(row(&["a", "b"]));
        grid.push_body(row(&["c"]));
        assert_eq!(grid.layout(&TableAlignment::Left)[2], "| c |   |");
    }

    #[rstest]
    #[case(TableAlignment::Left, "| x   |")]
    #[case(TableAlignment::Right, "|   x |")]
    #[case(TableAlignment::Center, "|  x  |")]
    #[case(TableAlignment::Columns(vec![Alignment::Right]), "|   x |")]
    fn alignment_policy(#[case] policy: TableAlignment, #[case] expected: &str) {
        let mut grid = TableGrid::new();
        grid.push_body(row(&["abc"]));
        grid.push_body(row(&["x"]));
        assert_eq!(grid.layout(&policy)[2], expected);
    }

    #[test]
    fn document_policy_uses_delimiter_row() {
        let mut grid = sample();
        grid.alignments = vec![None, Some(Alignment::Right)];
        grid.push_body(row(&["3", "4"]));
        assert_eq!(grid.layout(&TableAlignment::Document)[4], "| 3 |  4 |");
    }

    #[test]
    fn splits_sentinel_sub_streams() {
        let cell = TABLE_CELL as char;
        let r = TABLE_ROW as char;
        let header = format!("A{cell}BB{cell}{r}");
        let body = format!("1{cell}22{cell}{r}{r}");
        assert_eq!(TableGrid::from_marked(&header, &body), sample());
    }

    #[test]
    fn empty_grid_renders_nothing() {
        assert!(TableGrid::new().render(&TableAlignment::Left).is_empty());
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("Document".parse::<TableAlignment>(), Ok(TableAlignment::Document));
        assert!("diagonal".parse::<TableAlignment>().is_err());
    }
}
