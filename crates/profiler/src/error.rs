use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Not enough data to describe an ideal profile: the dataset is empty")]
    EmptyInput,

    #[error("Profile settings are invalid: {0}")]
    InvalidParameters(String),

    #[error("Percentile calculation failed: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}
