use core_types::{Column, describe_columns};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("Risk parameters from configuration are invalid: {0}")]
    InvalidParameters(String),

    #[error("Churn risk cannot be assessed: the data has no {} column", describe_columns(.missing))]
    SchemaIncomplete { missing: Vec<Column> },
}
