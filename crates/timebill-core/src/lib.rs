//! Core library for invoicing tracked time.
//!
//! This crate provides:
//! - Timestamp normalization for `DD-MM-YY HH:MM:SS` table text
//! - Extraction of time entries from rendered HTML tables
//! - Flattening of nested entry trees with per-entry durations
//! - Hourly and flat-rate invoice computation
//! - Fixed-layout PDF rendering and output naming

pub mod entries;
pub mod error;
pub mod extract;
pub mod invoice;
pub mod markup;
pub mod models;
pub mod numeric;
pub mod render;
pub mod timestamp;

pub use entries::{Envelope, RawEntry, TimeEntry};
pub use error::{EntryError, RenderError, Result, TimebillError};
pub use extract::{extract_entries, extract_from_html};
pub use invoice::{GeneratedInvoice, InvoiceGenerator};
pub use markup::HtmlTable;
pub use models::config::TimebillConfig;
pub use models::invoice::{BillingMode, Invoice, InvoiceOptions, InvoiceSummary, LineItem};
pub use render::{InvoiceRenderer, PdfRenderer};
