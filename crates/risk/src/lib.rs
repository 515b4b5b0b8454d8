//! # Partnerscope Risk
//!
//! Flags partners at risk of churning and orders them by how long they have
//! gone without contact.
//!
//! ## Public API
//!
//! - `RiskClassifier`: the trait presenters call; it refuses to run when the
//!   data lacks a column one of its rules needs.
//! - `RuleBasedClassifier`: the threshold rule configured by `[risk_rules]`.
//! - `RiskReport`: every partner with its flag, plus the sorted at-risk list.

pub mod error;
pub mod rule_based;

pub use error::RiskError;
pub use rule_based::{REQUIRED_COLUMNS, RuleBasedClassifier};

use core_types::{Dataset, Partner};
use serde::Serialize;
use std::fmt;

/// A churn criterion a partner met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChurnReason {
    Inactive,
    LowSatisfaction,
    ContactLapsed,
    LowConversion,
}

impl fmt::Display for ChurnReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChurnReason::Inactive => "inactive partnership",
            ChurnReason::LowSatisfaction => "low satisfaction",
            ChurnReason::ContactLapsed => "no recent contact",
            ChurnReason::LowConversion => "low conversion",
        };
        f.write_str(label)
    }
}

/// A flagged partner and the criteria it met.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtRiskPartner {
    pub partner: Partner,
    pub reasons: Vec<ChurnReason>,
}

/// The outcome of a churn classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    /// Every input partner, in input order, with `churn_risk` set.
    pub assessed: Dataset,
    /// Flagged partners, most days without contact first.
    pub at_risk: Vec<AtRiskPartner>,
    pub flagged_count: usize,
}

/// The core trait for churn risk classification.
///
/// Implementations must not skip a rule silently: when the data lacks a
/// column a rule needs they return `RiskError::SchemaIncomplete`.
pub trait RiskClassifier: Send + Sync {
    fn classify(&self, dataset: &Dataset) -> Result<RiskReport, RiskError>;
}
