//! # Partnerscope Loader
//!
//! Turns a CSV export of the partner base into a `PartnerTable`.
//!
//! ## Responsibilities
//!
//! - Recognise columns by their exact headers and record which ones the source has.
//! - Fail the whole load when the source is unavailable, malformed, or lacks a
//!   column needed to derive metrics. No partial table is ever returned.
//! - Keep per-cell problems that only affect one derived field (dates, scores)
//!   local to that record.
//! - Cache loaded sources by path and modification time (`SourceCache`).

pub mod cache;
pub mod error;
pub mod reader;

pub use cache::SourceCache;
pub use error::LoaderError;
pub use reader::{load_partner_table, read_partner_table};
