use core_types::Column;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A failure to produce a partner table. Any of these is fatal to a pipeline run.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Partner base at '{path}' is unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse the partner base: {0}")]
    Csv(#[from] csv::Error),

    #[error("Partner base is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Partner base has column '{0}' more than once")]
    DuplicateColumn(String),

    #[error("Line {line}: column '{column}' has invalid value '{value}': {reason}")]
    MalformedField {
        line: u64,
        column: Column,
        value: String,
        reason: String,
    },
}
