use crate::error::ConfigError;
use core_types::MetricKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional; a missing section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSource,
    pub ranking: Ranking,
    pub risk_rules: RiskRules,
    pub profile: ProfileSettings,
    pub report: ReportSettings,
}

impl Config {
    /// Checks that the deserialized values are usable by the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranking.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "ranking.top_n must be greater than 0".to_string(),
            ));
        }
        if self.profile.percentile < Decimal::ZERO || self.profile.percentile > Decimal::ONE {
            return Err(ConfigError::ValidationError(
                "profile.percentile must be between 0 and 1".to_string(),
            ));
        }
        self.risk_rules.validate()
    }
}

/// Where the partner base is read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSource {
    /// Path to the CSV export of the partner base.
    pub path: PathBuf,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Base.csv"),
        }
    }
}

/// Parameters for the partner ranking section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
    /// How many partners the ranking keeps.
    pub top_n: usize,
    /// The metric partners are ranked by, highest first.
    pub metric: MetricKey,
}

impl Default for Ranking {
    fn default() -> Self {
        Self {
            top_n: 10,
            metric: MetricKey::ConversionRate,
        }
    }
}

/// Thresholds of the churn-risk rule. A partner meeting any one of them is at risk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskRules {
    /// The partnership status value that marks an inactive partner.
    pub inactive_status: String,
    /// Satisfaction scores strictly below this value are at risk.
    pub min_satisfaction: Decimal,
    /// More days than this without contact is at risk.
    pub max_days_without_contact: i64,
    /// Conversion rates strictly below this value are at risk.
    pub min_conversion_rate: Decimal,
}

impl RiskRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inactive_status.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "risk_rules.inactive_status must not be empty".to_string(),
            ));
        }
        if self.min_satisfaction < Decimal::ZERO {
            return Err(ConfigError::ValidationError(
                "risk_rules.min_satisfaction must not be negative".to_string(),
            ));
        }
        if self.max_days_without_contact < 0 {
            return Err(ConfigError::ValidationError(
                "risk_rules.max_days_without_contact must not be negative".to_string(),
            ));
        }
        if self.min_conversion_rate < Decimal::ZERO || self.min_conversion_rate > Decimal::ONE {
            return Err(ConfigError::ValidationError(
                "risk_rules.min_conversion_rate must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            inactive_status: "Inactive".to_string(),
            min_satisfaction: dec!(30),
            max_days_without_contact: 60,
            min_conversion_rate: dec!(0.2),
        }
    }
}

/// Parameters for the ideal partner profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// The percentile (0..=1) a partner must reach to match the profile.
    pub percentile: Decimal,
    /// An ideal partner has been in contact within this many days.
    pub recent_contact_days: u32,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            percentile: dec!(0.75),
            recent_contact_days: 30,
        }
    }
}

/// Output settings for the report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub format: ReportFormat,
}

/// How a report is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}
