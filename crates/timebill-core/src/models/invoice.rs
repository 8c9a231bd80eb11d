//! Invoice data model and amount computation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entries::TimeEntry;
use crate::error::{Result, TimebillError};
use crate::models::config::TimebillConfig;
use crate::numeric::{bill_hours, clamp_duration, positive_finite, round_money};

/// Per-invocation options collected from the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceOptions {
    /// Fixed amount that replaces hours × rate when positive and finite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_rate_amount: Option<f64>,
}

impl InvoiceOptions {
    /// Options with a flat-rate override.
    pub fn flat_rate(amount: f64) -> Self {
        Self {
            flat_rate_amount: Some(amount),
        }
    }
}

/// How an invoice is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum BillingMode {
    /// Every entry bills its hours at `rate`.
    Hourly { rate: Decimal },
    /// The whole invoice bills a single `amount`.
    FlatRate { amount: Decimal },
}

impl BillingMode {
    /// Pick the billing mode for one invoice.
    ///
    /// A positive, finite flat-rate override wins, rounded to cents (so a
    /// fraction of a cent bills `0.00`). Anything else, including amounts
    /// beyond the decimal range, falls back to the configured hourly rate.
    pub fn select(options: &InvoiceOptions, config: &TimebillConfig) -> Self {
        let flat = options
            .flat_rate_amount
            .and_then(positive_finite)
            .and_then(Decimal::from_f64_retain)
            .map(round_money);

        match flat {
            Some(amount) => Self::FlatRate { amount },
            None => Self::Hourly {
                rate: config.billing.effective_rate(),
            },
        }
    }
}

/// One itemized row of the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Task label.
    pub description: String,

    /// Indentation level.
    pub level: usize,

    /// Canonical start timestamp.
    pub start_time: Option<String>,

    /// Canonical end timestamp.
    pub end_time: Option<String>,

    /// Billable hours, clamped to `[0, 8760]`.
    pub hours: f64,

    /// Hourly rate; `None` for flat-rate invoices.
    pub rate: Option<Decimal>,

    /// Line amount; `None` for flat-rate invoices.
    pub amount: Option<Decimal>,
}

/// Invoice header information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Invoice number, `YYYY-MM-DD-NNNN`.
    pub invoice_number: String,

    /// Date the invoice was issued.
    pub issue_date: NaiveDate,

    /// Issuing company name.
    pub company_name: String,

    /// Issuing company address, possibly multi-line.
    pub company_address: String,
}

/// Totals of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    /// Sum of all line hours.
    pub total_hours: f64,

    /// Amount due.
    pub total: Decimal,
}

/// Closing notes of an invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceNotes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    pub terms: String,
}

/// A fully computed invoice, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub header: InvoiceHeader,
    pub mode: BillingMode,
    pub line_items: Vec<LineItem>,
    pub summary: InvoiceSummary,
    pub notes: InvoiceNotes,
}

impl Invoice {
    /// Compute an invoice from flattened entries.
    ///
    /// Fails with [`TimebillError::AmountOverflow`] when an hourly amount does
    /// not fit the decimal range.
    pub fn compute(
        entries: &[TimeEntry],
        config: &TimebillConfig,
        options: &InvoiceOptions,
        invoice_number: impl Into<String>,
        issue_date: NaiveDate,
    ) -> Result<Self> {
        let mode = BillingMode::select(options, config);

        let line_items = entries
            .iter()
            .map(|entry| line_item(entry, &mode))
            .collect::<Result<Vec<LineItem>>>()?;

        let total_hours: f64 = line_items.iter().map(|item| item.hours).sum();
        let total = match mode {
            BillingMode::Hourly { rate } => {
                bill_hours(total_hours, rate).ok_or_else(|| overflow(total_hours, rate))?
            }
            BillingMode::FlatRate { amount } => amount,
        };

        debug!(
            "Computed invoice: {} lines, {:.2} hours, total {} ({:?})",
            line_items.len(),
            total_hours,
            total,
            mode
        );

        Ok(Self {
            header: InvoiceHeader {
                invoice_number: invoice_number.into(),
                issue_date,
                company_name: config.company.name.clone(),
                company_address: config.company.address.clone(),
            },
            mode,
            line_items,
            summary: InvoiceSummary { total_hours, total },
            notes: InvoiceNotes {
                memo: config.billing.memo().map(str::to_string),
                terms: config.billing.terms.clone(),
            },
        })
    }

    /// Whether the invoice bills a flat amount.
    pub fn is_flat_rate(&self) -> bool {
        matches!(self.mode, BillingMode::FlatRate { .. })
    }
}

fn line_item(entry: &TimeEntry, mode: &BillingMode) -> Result<LineItem> {
    let hours = clamp_duration(entry.duration);
    let (rate, amount) = match *mode {
        BillingMode::Hourly { rate } => {
            let amount = bill_hours(hours, rate).ok_or_else(|| overflow(hours, rate))?;
            (Some(rate), Some(amount))
        }
        BillingMode::FlatRate { .. } => (None, None),
    };

    Ok(LineItem {
        description: entry.label().to_string(),
        level: entry.level,
        start_time: entry.start_time.clone(),
        end_time: entry.end_time.clone(),
        hours,
        rate,
        amount,
    })
}

fn overflow(hours: f64, rate: Decimal) -> TimebillError {
    TimebillError::AmountOverflow(format!("{:.2} hours at {}/hr", hours, rate))
}
