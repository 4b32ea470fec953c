//! Text renderings of an issue's attachment list.
//!
//! Table and plain output are for people: sizes are humanized and timestamps
//! cut to the date. CSV is for machines: size and timestamp are emitted as the
//! tracker reported them. All renderers keep the input order.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::attachment::Attachment;

const HEADERS: [&str; 5] = ["ID", "FILENAME", "SIZE", "AUTHOR", "CREATED"];

/// Spaces between aligned columns.
const COLUMN_GAP: usize = 2;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Humanize a byte count using binary (1024) steps.
///
/// Below 1 KB the count is printed as an integer; above it, with exactly two
/// decimals (`1536` -> `"1.50 KB"`).
pub fn format_size(bytes: u64) -> String {
    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.2} KB", b as f64 / KB as f64),
        b => format!("{b} B"),
    }
}

/// First ten characters of a tracker timestamp, i.e. its `YYYY-MM-DD` prefix.
///
/// This is a truncation, not a parse: short or malformed input comes back as is.
pub fn format_date(raw: &str) -> &str {
    match raw.char_indices().nth(10) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

/// Quote a CSV field if it contains a comma, a double quote or a newline.
/// Embedded quotes are doubled so the output stays RFC 4180 parseable.
pub fn escape_csv(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}

/// Column-aligned listing with a header row.
pub fn render_table<W: Write>(w: &mut W, attachments: &[Attachment]) -> io::Result<()> {
    let mut rows = Vec::with_capacity(attachments.len() + 1);
    rows.push(HEADERS.map(String::from));
    rows.extend(attachments.iter().map(display_row));
    write_aligned(w, &rows)
}

/// Same columns as [`render_table`] without the header row.
pub fn render_plain<W: Write>(w: &mut W, attachments: &[Attachment]) -> io::Result<()> {
    let rows: Vec<_> = attachments.iter().map(display_row).collect();
    write_aligned(w, &rows)
}

pub fn render_csv<W: Write>(w: &mut W, attachments: &[Attachment]) -> io::Result<()> {
    writeln!(w, "{}", HEADERS.join(","))?;
    for a in attachments {
        writeln!(
            w,
            "{},{},{},{},{}",
            a.id,
            escape_csv(&a.filename),
            a.size,
            escape_csv(&a.author.display_name),
            a.created,
        )?;
    }
    Ok(())
}

fn display_row(a: &Attachment) -> [String; 5] {
    [
        a.id.clone(),
        a.filename.clone(),
        format_size(a.size),
        a.author.display_name.clone(),
        format_date(&a.created).to_string(),
    ]
}

fn write_aligned<W: Write>(w: &mut W, rows: &[[String; 5]]) -> io::Result<()> {
    let mut widths = [0usize; 5];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    for row in rows {
        let last = row.len() - 1;
        for (i, cell) in row.iter().enumerate() {
            if i == last {
                writeln!(w, "{cell}")?;
            } else {
                write!(w, "{cell:<width$}", width = widths[i] + COLUMN_GAP)?;
            }
        }
    }
    Ok(())
}
