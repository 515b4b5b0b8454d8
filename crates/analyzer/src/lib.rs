//! # Partnerscope Analyzer
//!
//! Narrows a derived dataset down to a working view and summarises it:
//! inclusion filters, top-N rankings and per-group averages.
//!
//! All operations borrow their input and return new values, so any number
//! of them can run over the same dataset independently.

pub mod aggregate;
pub mod error;
pub mod filter;

pub use aggregate::{
    GroupSummaries, GroupSummary, aggregate_by_channel, group_summary, rank_top, top_n,
};
pub use error::AnalyzerError;
pub use filter::{FilterOptions, apply_filters, filter_options};
