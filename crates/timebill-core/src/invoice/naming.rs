//! Invoice numbers, output directories and file names.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lazy_static::lazy_static;
use rand::Rng;
use regex::{Captures, Regex};

/// Exclusive upper bound of the random invoice number suffix.
pub const SUFFIX_BOUND: u32 = 9999;

/// Maximum length of the company part of a file name.
pub const MAX_COMPANY_LEN: usize = 50;

/// Company part used when no company name is configured.
pub const DEFAULT_COMPANY: &str = "Company";

lazy_static! {
    static ref DATE_TOKEN: Regex = Regex::new(r"\[([^\]]*)\]|YYYY|YY|MMMM|MMM|MM|DD").unwrap();
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*\x00-\x1F\s]+"#).unwrap();
    static ref HYPHEN_RUNS: Regex = Regex::new(r"-{2,}").unwrap();
}

/// Generate an invoice number `YYYY-MM-DD-NNNN` for `date`.
///
/// The suffix is random, not a counter: two invoices issued on the same day
/// can collide.
pub fn invoice_number(date: NaiveDate) -> String {
    invoice_number_with(date, &mut rand::thread_rng())
}

/// Generate an invoice number using the given random source.
pub fn invoice_number_with<R: Rng>(date: NaiveDate, rng: &mut R) -> String {
    let suffix: u32 = rng.gen_range(0..SUFFIX_BOUND);
    format!("{}-{:04}", date.format("%Y-%m-%d"), suffix)
}

/// Expand date placeholders in a directory template.
pub fn expand_directory(template: &str, date: NaiveDate) -> String {
    DATE_TOKEN
        .replace_all(template, |caps: &Captures| {
            if let Some(literal) = caps.get(1) {
                return literal.as_str().to_string();
            }
            let format = match &caps[0] {
                "YYYY" => "%Y",
                "YY" => "%y",
                "MMMM" => "%B",
                "MMM" => "%b",
                "MM" => "%m",
                _ => "%d",
            };
            date.format(format).to_string()
        })
        .into_owned()
}

/// Make a company name safe for use in a file name.
pub fn sanitize_company_name(name: &str) -> String {
    let hyphenated = UNSAFE_CHARS.replace_all(name, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
    let truncated: String = collapsed.trim_matches('-').chars().take(MAX_COMPANY_LEN).collect();
    let cleaned = truncated.trim_end_matches('-');

    if cleaned.is_empty() {
        DEFAULT_COMPANY.to_string()
    } else {
        cleaned.to_string()
    }
}

/// File name of a rendered invoice.
pub fn file_name(company_name: &str, invoice_number: &str) -> String {
    format!(
        "{}-invoice-{}.pdf",
        sanitize_company_name(company_name),
        invoice_number
    )
}

/// Full output path: expanded directory template joined with the file name.
pub fn output_path(
    base: &Path,
    template: &str,
    date: NaiveDate,
    company_name: &str,
    invoice_number: &str,
) -> PathBuf {
    base.join(expand_directory(template, date))
        .join(file_name(company_name, invoice_number))
}
