//! # Partnerscope Analytics
//!
//! Derives per-partner indicators from the raw partner base and provides the
//! statistics every other component builds on.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** This crate has no knowledge of files or presentation. It
//!   depends only on `core-types`.
//! - **Stateless calculation:** `MetricsEngine` takes a `PartnerTable` and a
//!   reference date and produces a new `Dataset`; the input is never mutated.
//! - **Explicit absence:** rates divide by zero into 0 on purpose, while means
//!   and percentiles over nothing are `None`, never a made-up zero.
//!
//! ## Public API
//!
//! - `MetricsEngine` / `derive_metrics`: derive conversion rate, qualification
//!   rate and days since contact.
//! - `overview`: headline averages of a dataset.
//! - `mean`, `percentile`: shared statistics.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod overview;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{MetricsEngine, derive_metrics, parse_contact_date, rate};
pub use error::AnalyticsError;
pub use overview::{Overview, overview};
pub use stats::{mean, percentile};
