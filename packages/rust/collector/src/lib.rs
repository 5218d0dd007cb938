//! Keyword discovery and scoring.
//!
//! Seeds are expanded through external suggestion sources and local
//! templates. Every candidate is filtered and scored, then merged into the
//! [`KeywordStore`](rankscout_storage::KeywordStore).

mod collector;
mod expander;
mod filter;
mod scorer;
pub mod sources;

pub use collector::{Candidate, Collector};
pub use expander::TemplateExpander;
pub use filter::{FilterOutcome, KeywordFilter, Rejection};
pub use scorer::Scorer;
pub use sources::{HttpSuggestionSource, SuggestionSource, build_sources};
