//! Table-to-entry extraction.
//!
//! Reads time-tracking rows out of a rendered table and produces the
//! [`Envelope`] that the entry tree processor consumes.

use tracing::{debug, info, trace};

use crate::entries::{Envelope, RawEntry};
use crate::markup::{HtmlTable, TableRow};
use crate::numeric::parse_clamped;
use crate::timestamp::normalize;

/// Maximum number of data rows read from one table.
pub const MAX_ROWS: usize = 1000;

/// Minimum number of cells a row needs to be read as an entry.
pub const MIN_CELLS: usize = 4;

/// Maximum indentation level read from a label's margin.
pub const MAX_LEVEL: u8 = 10;

/// Maximum length of extracted free text, in characters.
pub const MAX_TEXT_LEN: usize = 500;

/// Label used when a row has no readable task name.
pub const UNKNOWN_TASK: &str = "Unknown Task";

/// Extract time entries from a parsed table.
///
/// Row 0 is the header. At most [`MAX_ROWS`] data rows are read; rows with
/// fewer than [`MIN_CELLS`] cells are skipped. Returns `None` when no row
/// qualified.
pub fn extract_entries(table: &HtmlTable) -> Option<Envelope> {
    let entries: Vec<RawEntry> = table
        .rows
        .iter()
        .skip(1)
        .take(MAX_ROWS)
        .filter_map(read_row)
        .collect();

    if table.row_count() > MAX_ROWS + 1 {
        info!(
            "Table has {} data rows, only the first {} are read",
            table.row_count() - 1,
            MAX_ROWS
        );
    }

    if entries.is_empty() {
        debug!("No qualifying rows found");
        return None;
    }

    debug!("Extracted {} entries", entries.len());
    Some(Envelope { entries })
}

/// Parse `html` and extract entries from its first table.
pub fn extract_from_html(html: &str) -> Option<Envelope> {
    extract_entries(&HtmlTable::parse(html))
}

fn read_row(row: &TableRow) -> Option<RawEntry> {
    if row.cells.len() < MIN_CELLS {
        trace!("Skipping row with {} cells", row.cells.len());
        return None;
    }

    let label = &row.cells[0];
    let name = sanitize(&label.text());
    let name = if name.is_empty() {
        UNKNOWN_TASK.to_string()
    } else {
        name
    };

    let level = label
        .margin_left()
        .map(|margin| parse_clamped(&margin, 0.0..=f64::from(MAX_LEVEL), 0.0) as u8)
        .unwrap_or(0);

    let start_time = normalize(&row.cells[1].text());
    let end_time = normalize(&row.cells[2].text());

    Some(RawEntry {
        name: Some(name),
        start_time,
        end_time,
        level: Some(level),
        sub_entries: Vec::new(),
    })
}

/// Strip control characters and angle brackets, then cap the length.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() && *c != '<' && *c != '>')
        .take(MAX_TEXT_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}
