//! Minimal reader for rendered HTML tables.
//!
//! Host documents render time-tracking tables as plain `<table>` markup.
//! This module splits that markup into rows and cells and exposes the
//! pieces the extractor needs: visible cell text and the label's
//! `margin-left` style hint. It is not a general HTML parser.
//!
//! Closing `</tr>`, `</td>` and `</th>` tags are optional, as in HTML: a
//! row or cell runs until its closing tag, the next opening tag of the
//! same kind, or the end of the enclosing element. The `<table>` element
//! itself must be closed to be found; markup without one is read as a
//! table body.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref TABLE: Regex = Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").unwrap();
    static ref ROW_START: Regex = Regex::new(r"(?i)<tr\b[^>]*>").unwrap();
    static ref ROW_END: Regex = Regex::new(r"(?i)</(?:tr|thead|tbody|tfoot)\s*>").unwrap();
    static ref CELL_START: Regex = Regex::new(r"(?i)<t[dh]\b[^>]*>").unwrap();
    static ref CELL_END: Regex =
        Regex::new(r"(?i)</(?:td|th|tr|thead|tbody|tfoot)\s*>").unwrap();
    static ref MARGIN_LEFT: Regex =
        Regex::new(r#"(?is)style\s*=\s*["'][^"']*?margin-left\s*:\s*([^;"']*)"#).unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// A cell of a rendered table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    /// Inner markup of the cell.
    pub html: String,
    /// Whether the cell is a header (`<th>`) cell.
    pub is_header: bool,
}

impl TableCell {
    /// Visible text with tags removed, entities decoded and whitespace collapsed.
    pub fn text(&self) -> String {
        let stripped = TAG.replace_all(&self.html, " ");
        let decoded = decode_entities(&stripped);
        WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
    }

    /// Raw value of the first `margin-left` declaration inside the cell, e.g. `"2em"`.
    pub fn margin_left(&self) -> Option<String> {
        MARGIN_LEFT
            .captures(&self.html)
            .map(|caps| caps[1].trim().to_string())
    }
}

/// A row of a rendered table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Get the cell at a column index.
    pub fn cell(&self, col: usize) -> Option<&TableCell> {
        self.cells.get(col)
    }
}

/// A rendered table split into rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlTable {
    pub rows: Vec<TableRow>,
}

impl HtmlTable {
    /// Parse the first `<table>` in `html`. Markup without a table element
    /// is read as a table body.
    pub fn parse(html: &str) -> Self {
        let body = TABLE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map_or(html, |m| m.as_str());

        Self::from_body(body)
    }

    /// Parse every `<table>` in `html`, in document order.
    pub fn parse_all(html: &str) -> Vec<Self> {
        TABLE
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| Self::from_body(m.as_str()))
            .collect()
    }

    fn from_body(body: &str) -> Self {
        let rows: Vec<TableRow> = sections(body, &ROW_START, &ROW_END)
            .into_iter()
            .map(|(_, row)| TableRow {
                cells: sections(row, &CELL_START, &CELL_END)
                    .into_iter()
                    .map(|(open, cell)| TableCell {
                        html: cell.to_string(),
                        is_header: open.get(..3).is_some_and(|tag| tag.eq_ignore_ascii_case("<th")),
                    })
                    .collect(),
            })
            .collect();

        debug!("Parsed table with {} rows", rows.len());

        Self { rows }
    }

    /// Number of rows including the header row.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get header row (first row).
    pub fn header(&self) -> Option<&TableRow> {
        self.rows.first()
    }
}

/// Split `text` at each `start` tag. Each piece runs to the first `end`
/// match or the next `start` tag, whichever comes first. Returns the
/// opening tag with the piece's inner markup.
fn sections<'a>(text: &'a str, start: &Regex, end: &Regex) -> Vec<(&'a str, &'a str)> {
    let opens: Vec<_> = start.find_iter(text).collect();

    opens
        .iter()
        .enumerate()
        .map(|(i, open)| {
            let stop = opens.get(i + 1).map_or(text.len(), |next| next.start());
            let inner = &text[open.end()..stop];
            let inner = end.find(inner).map_or(inner, |close| &inner[..close.start()]);
            (open.as_str(), inner)
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
