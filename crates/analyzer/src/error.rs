use core_types::{Column, describe_columns};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("Cannot compute {operation}: the data has no {} column", describe_columns(.missing))]
    SchemaIncomplete {
        operation: &'static str,
        missing: Vec<Column>,
    },
}
