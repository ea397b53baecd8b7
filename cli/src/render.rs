//! Terminal rendering of search results.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use jnl_journal::{EntryMatch, SearchResults};
use owo_colors::{OwoColorize, Style};

/// Colors used in listings. Disabled palettes print plain text.
pub(crate) struct Palette {
    enabled: bool,
}

impl Palette {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        self.paint(text, Style::new().bright_green())
    }

    fn number(&self, text: &str) -> String {
        self.paint(text, Style::new().red().bold())
    }

    fn file_name(&self, text: &str) -> String {
        self.paint(text, Style::new().bright_yellow())
    }

    fn matched(&self, text: &str) -> String {
        self.paint(text, Style::new().yellow())
    }
}

/// Write the numbered hit list:
///
/// ```text
/// Found 2:
/// 0  HMKYKM4NNG4KREW61D55.txt
///   @quick(tickets/PERF-1188)
/// ```
pub(crate) fn write_results(
    out: &mut impl Write,
    results: &SearchResults<'_>,
    palette: &Palette,
) -> io::Result<()> {
    writeln!(out, "{}", palette.header(&format!("Found {}:", results.total_entries)))?;
    for hit in &results.hits {
        writeln!(
            out,
            "{}  {}",
            palette.number(&hit.index.to_string()),
            palette.file_name(hit.entry.file_name())
        )?;
        for m in &hit.matches {
            write_match(out, m, palette)?;
        }
    }
    Ok(())
}

fn write_match(out: &mut impl Write, m: &EntryMatch<'_>, palette: &Palette) -> io::Result<()> {
    let (before, matched, after) = m.segments();
    writeln!(out, "  {before}{}{after}", palette.matched(matched))
}

/// Prompt for a hit number. An empty answer (or end of input) cancels.
pub(crate) fn read_choice(input: &mut impl BufRead, out: &mut impl Write) -> Result<Option<usize>> {
    write!(out, "? ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    if answer.is_empty() {
        return Ok(None);
    }
    let choice = answer
        .parse()
        .with_context(|| format!("'{answer}' is not a result number"))?;
    Ok(Some(choice))
}
