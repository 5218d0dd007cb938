//! JSON-backed stores for the keyword pipeline.
//!
//! Each store is one JSON document on disk. Stores are loaded once when a run
//! starts, mutated in memory by the run (single writer), and written back at
//! explicit checkpoints with [`KeywordStore::save`] / [`RankingStore::save`].
//!
//! - [`KeywordStore`]: keyword → score, sources, metadata
//! - [`RankingStore`]: keyword → engine → latest snapshot, plus capped history
//! - [`QuotaLedger`]: per-day request counters for sources and engines

mod json;
mod keywords;
mod quota;
mod rankings;
mod stats;

pub use json::{move_aside, read_json, write_json_atomic};
pub use keywords::{KeywordStore, UpsertOutcome};
pub use quota::QuotaLedger;
pub use rankings::{HistoryEntry, RankingStore};
pub use stats::{CollectionStats, EngineCounter, MAX_ERROR_MESSAGES, MonitoringStats};
