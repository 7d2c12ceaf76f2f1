// src/main.rs
//
// mdtext: print Markdown as word-wrapped terminal text
//
// - Reads a document from a file, or from stdin when no file (or `-`) is given.
// - Leading `name: value` lines are metadata. Each pair is printed as
//   `name:` followed by the value on an indented line, then a blank line, then
//   the rendered body and a final newline.
// - Headings open indented sections, quotes get `> ` bars, list items get
//   `  * ` bullets, tables are drawn as fixed grids.
// - Output is colored with ANSI escapes unless --no-color is given or NO_COLOR
//   is set to a non-empty value.
//
// CLI flags:
//   -w, --width N            : wrap width; 0 = terminal, negative = terminal minus N
//   --indent S               : prefix for the first output line
//   --continuation-indent S  : prefix for every later line
//   --table-align POLICY     : left | center | right | document
//   --no-metadata            : treat leading `name: value` lines as body text
//   --marked                 : dump the intermediate marked stream instead
//   -v, --verbose            : log more to stderr (repeatable; MDTEXT_LOG overrides)

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use mdtext::{sentinel, Document, Options, TableAlignment, Width};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Input file (default: stdin)
    input: Option<PathBuf>,

    /// Disable ANSI colors
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    no_color: bool,

    /// Wrap width: positive is absolute, 0 is the terminal width, negative is
    /// the terminal width less that many columns
    #[arg(short, long, env = "MDTEXT_WIDTH", default_value_t = 0, allow_hyphen_values = true)]
    width: i64,

    /// Prefix for the first output line
    #[arg(long, default_value = "")]
    indent: String,

    /// Prefix for every output line after the first
    #[arg(long = "continuation-indent", default_value = "")]
    continuation_indent: String,

    /// Column alignment inside tables
    #[arg(long = "table-align", default_value = "left")]
    table_align: TableAlignment,

    /// Do not look for leading metadata
    #[arg(long = "no-metadata", action = ArgAction::SetTrue)]
    no_metadata: bool,

    /// Print the marked stream with sentinels shown as <TAGS>
    #[arg(long, action = ArgAction::SetTrue)]
    marked: bool,

    /// More logging on stderr
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let src = read_input(cli.input.as_ref())?;
    debug!(bytes = src.len(), "read input");

    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    let options = Options::new()
        .with_width(Width::from_signed(cli.width))
        .with_color(!(cli.no_color || no_color_env))
        .with_prefixes(cli.indent, cli.continuation_indent)
        .with_table_alignment(cli.table_align);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    if cli.marked {
        let stream = mdtext::markdown_to_marked(&src, &options);
        out.write_all(sentinel::annotate(&stream).as_bytes())?;
    } else if cli.no_metadata {
        let body = mdtext::markdown_to_text_no_metadata(&src, &options);
        out.write_all(body.as_bytes())?;
    } else {
        let doc = mdtext::markdown_to_text(&src, &options);
        write_document(&mut out, &doc)?;
    }
    out.flush().context("writing output")?;
    Ok(())
}

/* ================================ Helpers ================================ */

/// Metadata pairs, a blank line, the body, and a closing newline.
fn write_document(out: &mut impl Write, doc: &Document) -> io::Result<()> {
    for (name, value) in &doc.metadata {
        writeln!(out, "{name}:\n    {value}")?;
    }
    writeln!(out)?;
    out.write_all(doc.body.as_bytes())?;
    writeln!(out)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    let bytes = match path {
        Some(p) if p.as_os_str() != "-" => {
            fs::read(p).with_context(|| format!("reading {}", p.display()))?
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            buf
        }
    };
    String::from_utf8(bytes).context("input is not valid UTF-8")
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("MDTEXT_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_width_is_accepted() {
        let cli = Cli::try_parse_from(["mdtext", "-w", "-8", "doc.md"]).unwrap();
        assert_eq!(cli.width, -8);
        assert_eq!(cli.input, Some(PathBuf::from("doc.md")));
    }

    #[test]
    fn table_alignment_parses() {
        let cli = Cli::try_parse_from(["mdtext", "--table-align", "document"]).unwrap();
        assert_eq!(cli.table_align, TableAlignment::Document);
        assert!(Cli::try_parse_from(["mdtext", "--table-align", "diagonal"]).is_err());
    }

    #[test]
    fn document_layout() {
        let doc = Document {
            metadata: vec![("Title".to_string(), "Notes".to_string())],
            body: "Body.\n".to_string(),
        };
        let mut buf = Vec::new();
        write_document(&mut buf, &doc).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Title:\n    Notes\n\nBody.\n\n");
    }
}
