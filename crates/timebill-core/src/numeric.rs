//! Parse-or-default-with-clamp helpers.
//!
//! Loosely typed numbers (indentation margins, durations, hourly rates,
//! flat-rate overrides) pass through these. Non-finite or unparsable input
//! becomes the default and everything else is clamped.

use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

lazy_static! {
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
}

/// Maximum billable duration of a single entry, in hours (one year).
pub const MAX_DURATION_HOURS: f64 = 8760.0;

/// Clamp `value` into `range`, falling back to `default` when it is not finite.
pub fn clamp_or_default(value: f64, range: RangeInclusive<f64>, default: f64) -> f64 {
    if !value.is_finite() {
        return default;
    }
    value.clamp(*range.start(), *range.end())
}

/// Parse the leading numeric portion of `raw` (`"2.5em"` reads as 2.5) and clamp it.
///
/// Text without a leading number yields `default`.
pub fn parse_clamped(raw: &str, range: RangeInclusive<f64>, default: f64) -> f64 {
    LEADING_NUMBER
        .find(raw)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .map(|value| clamp_or_default(value, range, default))
        .unwrap_or(default)
}

/// Clamp a duration in hours to `[0, 8760]`; non-finite durations count as zero.
pub fn clamp_duration(hours: f64) -> f64 {
    clamp_or_default(hours, 0.0..=MAX_DURATION_HOURS, 0.0)
}

/// Accept `value` only if it is finite and strictly positive.
pub fn positive_finite(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Convert hours to a [`Decimal`] for money arithmetic.
///
/// The value is not clamped; callers pass per-entry durations through
/// [`clamp_duration`] first. Non-finite or unrepresentable hours read as zero.
pub fn hours_to_decimal(hours: f64) -> Decimal {
    Decimal::from_f64_retain(hours)
        .unwrap_or(Decimal::ZERO)
        .round_dp(6)
}

/// `hours × rate` rounded to cents, or `None` when the product overflows.
pub fn bill_hours(hours: f64, rate: Decimal) -> Option<Decimal> {
    hours_to_decimal(hours).checked_mul(rate).map(round_money)
}

/// Round an amount of money to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamp a decimal to be non-negative.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
