//! # Partnerscope Profiler
//!
//! Describes the "ideal" partner of a dataset: the conversion and
//! satisfaction levels reached by the top of the base, the channel that
//! converts best and how recently such a partner has been in touch.
//!
//! The best channel is an input rather than something recomputed here, so
//! the profile always names the same channel as the channel summary shown
//! next to it.

pub mod error;
pub mod summarizer;

pub use error::ProfileError;
pub use summarizer::{ProfileDescriptor, ProfileSummarizer};
