//! Invoice document rendering.

mod metrics;
mod pdf;

pub use metrics::{Face, fit_text, text_width};
pub use pdf::PdfRenderer;

use rust_decimal::Decimal;

use crate::error::RenderError;
use crate::models::invoice::Invoice;
use crate::numeric::round_money;

/// Maximum length of any free text placed in a rendered document, in characters.
pub const MAX_RENDER_TEXT_LEN: usize = 1000;

/// Deepest indentation shown in the itemized table.
pub const MAX_INDENT_LEVEL: usize = 10;

/// Placeholder for cells that have no value.
pub const NO_VALUE: &str = "-";

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Trait for invoice document renderers.
pub trait InvoiceRenderer {
    /// Render the invoice into a complete document.
    fn render(&self, invoice: &Invoice) -> Result<Vec<u8>>;
}

/// Strip control characters from text entering a document and cap its length.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .take(MAX_RENDER_TEXT_LEN)
        .collect()
}

/// Sanitize multi-line text, one entry per non-blank line.
pub fn sanitize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(sanitize_text)
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Table label: two spaces per indentation level, capped at [`MAX_INDENT_LEVEL`].
pub fn indented_label(description: &str, level: usize) -> String {
    format!(
        "{}{}",
        "  ".repeat(level.min(MAX_INDENT_LEVEL)),
        sanitize_text(description)
    )
}

/// Format an amount of money, e.g. `$1234.50`.
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", round_money(amount))
}

/// Format hours with two decimals.
pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours)
}
