//! Stage orchestration and decision logic for RankScout.
//!
//! This crate drives the SERP extractor across the monitored keywords,
//! derives trends and opportunities from the ranking history, analyzes
//! keywords and writes the run reports (e.g., `run_monitoring`).

pub mod analysis;
pub mod monitor;
pub mod opportunity;
pub mod pipeline;
pub mod report;
pub mod trend;
