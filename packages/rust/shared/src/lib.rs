//! Shared types, error model, and configuration for RankScout.
//!
//! This crate is the foundation depended on by all other RankScout crates.
//! It provides:
//! - [`RankScoutError`]: the unified error type
//! - Domain types ([`KeywordRecord`], [`RankingSnapshot`], [`Opportunity`], [`Trend`])
//! - Configuration ([`AppConfig`] and its sections, config loading and validation)
//! - Request identity rotation and progress callbacks shared by the stages

pub mod agents;
pub mod config;
pub mod error;
pub mod progress;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use agents::{USER_AGENTS, UserAgentRotator};
pub use config::{
    AnalysisConfig, AppConfig, CollectionConfig, EngineConfig, FilterConfig, MonitoringConfig,
    KEYWORD_PLACEHOLDER, PathsConfig, ScoringConfig, SiteConfig, SourceConfig, SourceKind,
    TemplateConfig, config_dir, config_file_path, load_config, load_config_from,
    write_default_config,
};
pub use error::{RankScoutError, Result};
pub use progress::{ProgressReporter, SilentProgress};
pub use types::{
    KeywordMetadata, KeywordRecord, Opportunity, OpportunityKind, Priority, RankingSnapshot,
    Script, Trend, TrendDirection, round1,
};
