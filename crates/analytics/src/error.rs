use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Quantile must be between 0 and 1, got {0}")]
    InvalidQuantile(Decimal),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
