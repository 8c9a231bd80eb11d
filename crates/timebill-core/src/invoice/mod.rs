//! Invoice generation pipeline.
//!
//! Ties the stages together: envelope JSON is parsed and flattened, the
//! invoice is computed for the selected billing mode and rendered, and the
//! output location is derived. Persisting the bytes is left to the caller.

pub mod naming;

use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::entries::{Envelope, TimeEntry};
use crate::error::Result;
use crate::extract::extract_from_html;
use crate::models::config::TimebillConfig;
use crate::models::invoice::{Invoice, InvoiceOptions};
use crate::render::{InvoiceRenderer, PdfRenderer};

/// A rendered invoice and where it should be stored.
#[derive(Debug, Clone)]
pub struct GeneratedInvoice {
    /// Computed invoice data.
    pub invoice: Invoice,
    /// Rendered document.
    pub document: Vec<u8>,
    /// Expanded output directory, relative to the caller's base directory.
    pub directory: String,
    /// Output file name.
    pub file_name: String,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Invoice generator over a renderer.
pub struct InvoiceGenerator<R = PdfRenderer> {
    config: TimebillConfig,
    renderer: R,
    issue_date: Option<NaiveDate>,
}

impl InvoiceGenerator<PdfRenderer> {
    /// Create a generator that renders PDF documents.
    pub fn new(config: TimebillConfig) -> Self {
        Self {
            config,
            renderer: PdfRenderer::new(),
            issue_date: None,
        }
    }
}

impl<R: InvoiceRenderer> InvoiceGenerator<R> {
    /// Use a different renderer.
    pub fn with_renderer<S: InvoiceRenderer>(self, renderer: S) -> InvoiceGenerator<S> {
        InvoiceGenerator {
            config: self.config,
            renderer,
            issue_date: self.issue_date,
        }
    }

    /// Fix the issue date instead of using today's date.
    pub fn with_issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = Some(date);
        self
    }

    /// The settings invoices are generated with.
    pub fn config(&self) -> &TimebillConfig {
        &self.config
    }

    /// Generate an invoice from an envelope's JSON form.
    ///
    /// Entries are leveled by their depth in the envelope's tree. Returns
    /// `Ok(None)` when the envelope holds no entries.
    pub fn generate(
        &self,
        envelope_json: &str,
        options: &InvoiceOptions,
    ) -> Result<Option<GeneratedInvoice>> {
        let envelope = Envelope::from_json(envelope_json)?;
        self.generate_entries(envelope.flatten(), options)
    }

    /// Extract entries from a rendered table and generate an invoice from them.
    ///
    /// Rows keep the indentation level read from their label margin. Returns
    /// `Ok(None)` when the table holds no usable rows.
    pub fn generate_from_html(
        &self,
        html: &str,
        options: &InvoiceOptions,
    ) -> Result<Option<GeneratedInvoice>> {
        let Some(envelope) = extract_from_html(html) else {
            info!("No time entries found in table");
            return Ok(None);
        };

        self.generate_entries(envelope.flatten_indented(), options)
    }

    fn generate_entries(
        &self,
        entries: Vec<TimeEntry>,
        options: &InvoiceOptions,
    ) -> Result<Option<GeneratedInvoice>> {
        let start = Instant::now();

        if entries.is_empty() {
            info!("No time entries to invoice");
            return Ok(None);
        }
        debug!("Flattened {} entries", entries.len());

        let issue_date = self.issue_date.unwrap_or_else(|| Local::now().date_naive());
        let number = naming::invoice_number(issue_date);
        let invoice = Invoice::compute(&entries, &self.config, options, number, issue_date)?;

        let document = self.renderer.render(&invoice)?;

        let directory = naming::expand_directory(&self.config.output.directory, issue_date);
        let file_name = naming::file_name(&self.config.company.name, &invoice.header.invoice_number);

        info!(
            "Generated invoice {} ({} entries, total {})",
            invoice.header.invoice_number,
            entries.len(),
            invoice.summary.total
        );

        Ok(Some(GeneratedInvoice {
            invoice,
            document,
            directory,
            file_name,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EntryError, RenderError, TimebillError};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    struct FailingRenderer;

    impl InvoiceRenderer for FailingRenderer {
        fn render(&self, _invoice: &Invoice) -> crate::render::Result<Vec<u8>> {
            Err(RenderError::GenerationFailed("font table exhausted".to_string()))
        }
    }

    fn config() -> TimebillConfig {
        let mut config = TimebillConfig::default();
        config.company.name = "My / Co: LLC***".to_string();
        config.billing.hourly_rate = Decimal::from(100);
        config.output.directory = "Invoices/YYYY/MM".to_string();
        config
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    const ENVELOPE: &str = r#"{"entries":[
        {"name":"Design","startTime":"2023-06-15T09:00:00","endTime":"2023-06-15T11:30:00",
         "subEntries":[{"name":"Review","startTime":"2023-06-15T13:00:00","endTime":"2023-06-15T14:00:00"}]}
    ]}"#;

    #[test]
    fn test_generate_hourly() {
        let generated = InvoiceGenerator::new(config())
            .with_issue_date(date())
            .generate(ENVELOPE, &InvoiceOptions::default())
            .unwrap()
            .unwrap();

        assert!(generated.document.starts_with(b"%PDF"));
        assert_eq!(generated.invoice.line_items.len(), 2);
        assert_eq!(generated.invoice.line_items[1].level, 1);
        assert_eq!(generated.invoice.summary.total_hours, 3.5);
        assert_eq!(generated.invoice.summary.total, Decimal::from(350));
        assert_eq!(generated.directory, "Invoices/2024/03");
        assert!(generated.file_name.starts_with("My-Co-LLC-invoice-2024-03-07-"));
        assert!(generated.file_name.ends_with(".pdf"));
    }

    #[test]
    fn test_generate_flat_rate() {
        let generated = InvoiceGenerator::new(config())
            .with_issue_date(date())
            .generate(ENVELOPE, &InvoiceOptions::flat_rate(500.0))
            .unwrap()
            .unwrap();

        assert_eq!(generated.invoice.summary.total, Decimal::from(500));
    }

    #[test]
    fn test_empty_envelope_is_not_an_error() {
        let result = InvoiceGenerator::new(config())
            .generate(r#"{"entries":[]}"#, &InvoiceOptions::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_envelope() {
        let err = InvoiceGenerator::new(config())
            .generate("not json", &InvoiceOptions::default())
            .unwrap_err();
        assert!(matches!(err, TimebillError::Entries(EntryError::MalformedEnvelope)));
        assert_eq!(err.to_string(), "Invalid time entry data");
    }

    #[test]
    fn test_render_failure_is_wrapped() {
        let err = InvoiceGenerator::new(config())
            .with_renderer(FailingRenderer)
            .generate(ENVELOPE, &InvoiceOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate PDF: font table exhausted");
    }

    #[test]
    fn test_generate_from_html() {
        let html = r#"<table>
            <tr><th>Task</th><th>Start</th><th>End</th><th>Time</th></tr>
            <tr><td><span style="margin-left: 0em">Design</span></td>
                <td>15-06-23 09:00:00</td><td>15-06-23 11:30:00</td><td></td></tr>
            <tr><td><span style="margin-left: 1em">Review</span></td>
                <td>15-06-23 13:00:00</td><td>bad</td><td></td></tr>
        </table>"#;

        let generated = InvoiceGenerator::new(config())
            .with_issue_date(date())
            .generate_from_html(html, &InvoiceOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(generated.invoice.line_items[1].level, 1);
        assert_eq!(generated.invoice.line_items[1].hours, 0.0);
        assert_eq!(generated.invoice.summary.total, Decimal::from(250));
    }

    #[test]
    fn test_envelope_levels_follow_tree_depth() {
        let json = r#"{"entries":[{"name":"Parent","level":4,"subEntries":[{"name":"Child"}]}]}"#;
        let generated = InvoiceGenerator::new(config())
            .with_issue_date(date())
            .generate(json, &InvoiceOptions::default())
            .unwrap()
            .unwrap();

        let levels: Vec<usize> = generated.invoice.line_items.iter().map(|i| i.level).collect();
        assert_eq!(levels, vec![0, 1]);
    }

    #[test]
    fn test_overflow_is_reported_not_panicked() {
        let mut config = config();
        config.billing.hourly_rate = Decimal::MAX;
        let err = InvoiceGenerator::new(config)
            .generate(ENVELOPE, &InvoiceOptions::default())
            .unwrap_err();
        assert!(matches!(err, TimebillError::AmountOverflow(_)));
    }

    #[test]
    fn test_generate_from_html_without_rows() {
        let result = InvoiceGenerator::new(config())
            .generate_from_html("<p>no table here</p>", &InvoiceOptions::default())
            .unwrap();
        assert!(result.is_none());
    }
}
