//! Stage entry points: collect, monitor, analyze.
//!
//! Each stage loads its stores once, runs, then saves and writes a report.
//! Store and report I/O failures are logged and returned in the outcome;
//! the stage carries on with its in-memory state. A store that fails to load
//! is moved aside before the stage saves a fresh one. Only configuration
//! errors abort a stage.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use rankscout_collector::Collector;
use rankscout_shared::{AppConfig, KeywordRecord, Opportunity, ProgressReporter, Result};
use rankscout_storage::{
    CollectionStats, KeywordStore, MonitoringStats, QuotaLedger, RankingStore, move_aside,
};

use crate::analysis::{KeywordAnalysis, analyze_all};
use crate::monitor::RankMonitor;
use crate::opportunity::{OpportunityRules, find_opportunities};
use crate::report::{AnalysisReport, CollectionReport, RankingReport, write_report};
use crate::trend::trend_table;

/// Result of [`run_collection`].
#[derive(Debug)]
pub struct CollectionOutcome {
    pub stats: CollectionStats,
    pub total_keywords: usize,
    pub report_path: Option<PathBuf>,
    /// Non-fatal store / ledger / report I/O failures.
    pub persistence_errors: Vec<String>,
}

/// Result of [`run_monitoring`].
#[derive(Debug)]
pub struct MonitoringOutcome {
    pub stats: MonitoringStats,
    pub monitored: usize,
    pub opportunities: Vec<Opportunity>,
    pub report_path: Option<PathBuf>,
    pub persistence_errors: Vec<String>,
}

/// Result of [`run_analysis`].
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub analyses: Vec<KeywordAnalysis>,
    pub opportunities: Vec<Opportunity>,
    pub report_path: Option<PathBuf>,
    pub persistence_errors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Store loading
// ---------------------------------------------------------------------------

/// Collects non-fatal persistence failures for the run summary.
#[derive(Debug, Default)]
struct PersistenceLog {
    errors: Vec<String>,
}

impl PersistenceLog {
    fn load<T>(
        &mut self,
        what: &str,
        path: &Path,
        loaded: Result<T>,
        empty: impl FnOnce(&Path) -> T,
    ) -> T {
        let e = match loaded {
            Ok(value) => return value,
            Err(e) => e,
        };
        error!(error = %e, "failed to load {what}, continuing with an empty one");
        self.errors.push(e.to_string());

        match move_aside(path, Utc::now()) {
            Ok(_) => empty(path),
            Err(moved) => {
                // The unreadable file stays where it is; save beside it.
                self.errors.push(moved.to_string());
                let fallback = path.with_extension("recovered.json");
                warn!(path = %fallback.display(), "saving {what} to a separate file");
                empty(&fallback)
            }
        }
    }

    fn check(&mut self, what: &str, result: Result<()>) {
        if let Err(e) = result {
            error!(error = %e, "failed to save {what}");
            self.errors.push(e.to_string());
        }
    }

    fn report(&mut self, written: Result<PathBuf>) -> Option<PathBuf> {
        match written {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "failed to write report");
                self.errors.push(e.to_string());
                None
            }
        }
    }
}

fn load_keywords(config: &AppConfig, log: &mut PersistenceLog) -> KeywordStore {
    let path = config.paths.keywords_file();
    let capacity = config.collection.max_keywords;
    log.load(
        "keyword store",
        &path,
        KeywordStore::load(&path, capacity),
        |path| KeywordStore::empty(path, capacity),
    )
}

fn load_rankings(config: &AppConfig, log: &mut PersistenceLog) -> RankingStore {
    let path = config.paths.rankings_file();
    let cap = config.monitoring.history_cap;
    log.load(
        "ranking store",
        &path,
        RankingStore::load(&path, cap),
        |path| RankingStore::empty(path, cap),
    )
}

fn load_ledger(config: &AppConfig, log: &mut PersistenceLog) -> QuotaLedger {
    let path = config.paths.quota_file();
    let offset = config.site.offset();
    log.load(
        "quota ledger",
        &path,
        QuotaLedger::load(&path, offset),
        |path| QuotaLedger::empty(path, offset),
    )
}

/// The `limit` highest-scored stored keywords.
pub fn top_keywords(config: &AppConfig, limit: usize) -> Result<Vec<(String, KeywordRecord)>> {
    let store = KeywordStore::load(config.paths.keywords_file(), config.collection.max_keywords)?;
    Ok(store
        .top_n(limit)
        .into_iter()
        .map(|(k, r)| (k.clone(), r.clone()))
        .collect())
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Discover keywords from `seeds` (or the configured seeds) and merge them
/// into the keyword store.
#[instrument(skip_all)]
pub async fn run_collection(
    config: &AppConfig,
    seeds: Option<Vec<String>>,
    progress: &dyn ProgressReporter,
) -> Result<CollectionOutcome> {
    let collector = Collector::from_config(config)?;
    let seeds = seeds.unwrap_or_else(|| config.collection.seeds.clone());
    let mut log = PersistenceLog::default();

    progress.phase("Loading keyword store");
    let mut store = load_keywords(config, &mut log);
    let mut ledger = load_ledger(config, &mut log);

    progress.phase("Collecting keywords");
    let stats = collector.collect(&seeds, &mut store, &mut ledger, progress).await;

    progress.phase("Saving");
    store.set_stats(stats.clone());
    log.check("keyword store", store.save());
    log.check("quota ledger", ledger.save());

    let mut report = CollectionReport::build(config, &store, &stats);
    report.persistence_errors = log.errors.clone();
    let report_path = log.report(write_report(
        &config.paths.reports_dir(),
        "keyword-collection",
        report.meta.run_id,
        &report,
    ));

    progress.finish(&format!(
        "{} new keywords, {} total",
        stats.new_keywords,
        store.len()
    ));
    info!(
        new = stats.new_keywords,
        total = store.len(),
        persistence_errors = log.errors.len(),
        "collection stage finished"
    );

    Ok(CollectionOutcome {
        total_keywords: store.len(),
        stats,
        report_path,
        persistence_errors: log.errors,
    })
}

/// Check the top keywords on every enabled engine, then derive trends and
/// opportunities from the updated history.
#[instrument(skip_all)]
pub async fn run_monitoring(
    config: &AppConfig,
    progress: &dyn ProgressReporter,
) -> Result<MonitoringOutcome> {
    let monitor = RankMonitor::from_config(config)?;
    let mut log = PersistenceLog::default();

    progress.phase("Loading stores");
    let keywords = load_keywords(config, &mut log);
    let mut rankings = load_rankings(config, &mut log);
    let mut ledger = load_ledger(config, &mut log);

    let selected = monitor.select_keywords(&keywords);
    if selected.is_empty() {
        warn!("no keywords to monitor, run collection first");
    }

    progress.phase("Checking rankings");
    let stats = monitor.monitor(&selected, &mut rankings, &mut ledger, progress).await;

    progress.phase("Saving");
    rankings.set_stats(stats.clone());
    log.check("ranking store", rankings.save());
    log.check("quota ledger", ledger.save());

    let trends = trend_table(&rankings, Utc::now(), config.analysis.trend_days);
    let opportunities = find_opportunities(
        &keywords,
        &rankings,
        &trends,
        &OpportunityRules::from(&config.analysis),
    );

    let mut report = RankingReport::build(
        config,
        selected.len(),
        &rankings,
        &stats,
        &trends,
        &opportunities,
    );
    report.persistence_errors = log.errors.clone();
    let report_path = log.report(write_report(
        &config.paths.reports_dir(),
        "ranking-monitor",
        report.meta.run_id,
        &report,
    ));

    progress.finish(&format!(
        "{} found, {} not found, {} errors",
        stats.found, stats.not_found, stats.errors
    ));
    info!(
        found = stats.found,
        opportunities = opportunities.len(),
        "monitoring stage finished"
    );

    Ok(MonitoringOutcome {
        stats,
        monitored: selected.len(),
        opportunities,
        report_path,
        persistence_errors: log.errors,
    })
}

/// Analyze every stored keyword against the ranking history. No network.
#[instrument(skip_all)]
pub async fn run_analysis(
    config: &AppConfig,
    progress: &dyn ProgressReporter,
) -> Result<AnalysisOutcome> {
    let started = Utc::now();
    let mut log = PersistenceLog::default();

    progress.phase("Loading stores");
    let keywords = load_keywords(config, &mut log);
    let rankings = load_rankings(config, &mut log);

    progress.phase("Analyzing keywords");
    let trends = trend_table(&rankings, started, config.analysis.trend_days);
    let opportunities = find_opportunities(
        &keywords,
        &rankings,
        &trends,
        &OpportunityRules::from(&config.analysis),
    );
    let analyses = analyze_all(&keywords, &rankings, &opportunities);

    let mut report =
        AnalysisReport::build(config, started, analyses.clone(), opportunities.clone());
    report.persistence_errors = log.errors.clone();
    let report_path = log.report(write_report(
        &config.paths.reports_dir(),
        "keyword-analysis",
        report.meta.run_id,
        &report,
    ));

    progress.finish(&format!(
        "{} keywords analyzed, {} opportunities",
        analyses.len(),
        opportunities.len()
    ));
    info!(keywords = analyses.len(), opportunities = opportunities.len(), "analysis stage finished");

    Ok(AnalysisOutcome {
        analyses,
        opportunities,
        report_path,
        persistence_errors: log.errors,
    })
}
