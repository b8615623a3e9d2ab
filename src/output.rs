//! Terminal output for search results.

use crate::store::Record;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print matching records as `id: cell | cell | ...` lines with a header row.
pub fn print_records(records: &[Record], headers: &[String], color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    if records.is_empty() {
        writeln!(stdout, "no matches")?;
        return Ok(());
    }

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    writeln!(stdout, "# {}", headers.join(" | "))?;
    stdout.reset()?;

    for record in records {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(stdout, "{}", record.id)?;
        stdout.reset()?;
        writeln!(stdout, ": {}", record.cells.join(" | "))?;
    }

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    writeln!(stdout, "{} match(es)", records.len())?;
    stdout.reset()?;

    Ok(())
}

/// Print word completions, one per line.
pub fn print_suggestions(words: &[String]) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for word in words {
        writeln!(stdout, "{word}")?;
    }
    Ok(())
}

/// Print load statistics for a file.
pub fn print_stats(
    rows: usize,
    headers: &[String],
    memory_bytes: u64,
    cached: usize,
) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    writeln!(stdout, "Rows:     {rows}")?;
    writeln!(stdout, "Columns:  {} ({})", headers.len(), headers.join(", "))?;
    writeln!(
        stdout,
        "Memory:   {:.1} KB (approx)",
        memory_bytes as f64 / 1024.0
    )?;
    writeln!(stdout, "Cached:   {cached} result set(s)")?;
    Ok(())
}
