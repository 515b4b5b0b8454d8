//! # Partnerscope Core Types
//!
//! The shared data model of the partner metrics pipeline: columns and their
//! source headers, raw records, derived partners, datasets and filter specs.
//! Every other crate in the workspace depends on this one and nothing else
//! in the workspace is depended on by it.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Column, MetricKey, describe_columns};
pub use error::CoreError;
pub use structs::{DerivedFields, Dataset, FilterSpec, Partner, PartnerRecord, PartnerTable, Schema};
