//! Invoice settings.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimebillError};
use crate::numeric::non_negative;

/// Main configuration for timebill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimebillConfig {
    /// Issuing company identity.
    pub company: CompanyConfig,

    /// Billing rate and invoice wording.
    pub billing: BillingConfig,

    /// Where rendered invoices are written.
    pub output: OutputConfig,
}

/// Company identity printed in the invoice header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    /// Company name.
    pub name: String,

    /// Postal address, one line per address line.
    pub address: String,
}

/// Billing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Hourly rate for hourly invoices. Negative values bill as zero.
    pub hourly_rate: Decimal,

    /// Payment terms, printed in the notes block.
    pub terms: String,

    /// Optional memo printed above the payment terms.
    pub memo: Option<String>,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            hourly_rate: Decimal::ZERO,
            terms: "Payment due within 30 days".to_string(),
            memo: None,
        }
    }
}

impl BillingConfig {
    /// The configured rate, clamped to be non-negative.
    pub fn effective_rate(&self) -> Decimal {
        non_negative(self.hourly_rate)
    }

    /// The memo, if it has any visible text.
    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Output location configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory template; `YYYY`, `YY`, `MMMM`, `MMM`, `MM` and `DD` expand
    /// to the invoice date, `[...]` keeps text literal.
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "Invoices/YYYY/MM".to_string(),
        }
    }
}

impl TimebillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| TimebillError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| TimebillError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TimebillConfig =
            serde_json::from_str(r#"{"company": {"name": "Acme"}}"#).unwrap();
        assert_eq!(config.company.name, "Acme");
        assert_eq!(config.company.address, "");
        assert_eq!(config.billing, BillingConfig::default());
        assert_eq!(config.output.directory, "Invoices/YYYY/MM");
    }

    #[test]
    fn test_hourly_rate_accepts_numbers_and_strings() {
        let config: TimebillConfig =
            serde_json::from_str(r#"{"billing": {"hourly_rate": 85.5}}"#).unwrap();
        assert_eq!(config.billing.hourly_rate, Decimal::from_str("85.5").unwrap());

        let config: TimebillConfig =
            serde_json::from_str(r#"{"billing": {"hourly_rate": "120"}}"#).unwrap();
        assert_eq!(config.billing.hourly_rate, Decimal::from(120));
    }

    #[test]
    fn test_negative_rate_is_clamped() {
        let billing = BillingConfig {
            hourly_rate: Decimal::from(-40),
            ..Default::default()
        };
        assert_eq!(billing.effective_rate(), Decimal::ZERO);
    }

    #[test]
    fn test_blank_memo_is_absent() {
        let billing = BillingConfig {
            memo: Some("  \n ".to_string()),
            ..Default::default()
        };
        assert_eq!(billing.memo(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TimebillConfig::default();
        config.company.name = "Acme".to_string();
        config.billing.hourly_rate = Decimal::from(95);
        config.save(&path).unwrap();

        assert_eq!(TimebillConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            TimebillConfig::from_file(&path),
            Err(TimebillError::Config(_))
        ));
        assert!(matches!(
            TimebillConfig::from_file(&dir.path().join("missing.json")),
            Err(TimebillError::Io(_))
        ));
    }
}
