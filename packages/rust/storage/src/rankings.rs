//! Ranking Store: latest snapshot per (keyword, engine) plus per-keyword
//! cycle history, persisted as `ranking-history.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rankscout_shared::{RankingSnapshot, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::json::{read_json, write_json_atomic};
use crate::stats::MonitoringStats;

/// One monitoring cycle for one keyword: every engine that found the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub rankings: BTreeMap<String, RankingSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankingDocumentMeta {
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    total_keywords: usize,
    #[serde(default)]
    monitoring_stats: MonitoringStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RankingDocument {
    #[serde(default)]
    metadata: RankingDocumentMeta,
    #[serde(default)]
    rankings: BTreeMap<String, BTreeMap<String, RankingSnapshot>>,
    #[serde(default)]
    history: BTreeMap<String, Vec<HistoryEntry>>,
}

/// In-memory ranking repository with explicit load / save.
#[derive(Debug, Clone)]
pub struct RankingStore {
    path: PathBuf,
    history_cap: usize,
    doc: RankingDocument,
}

impl RankingStore {
    pub fn empty(path: impl Into<PathBuf>, history_cap: usize) -> Self {
        Self {
            path: path.into(),
            history_cap,
            doc: RankingDocument::default(),
        }
    }

    /// Load the store from `path`. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>, history_cap: usize) -> Result<Self> {
        let path = path.into();
        let mut doc: RankingDocument = read_json(&path)?.unwrap_or_default();

        // Snapshots nested under an engine key may omit their engine id.
        for engines in doc.rankings.values_mut() {
            backfill_engine_ids(engines);
        }
        for entries in doc.history.values_mut() {
            for entry in entries.iter_mut() {
                backfill_engine_ids(&mut entry.rankings);
            }
        }

        info!(path = %path.display(), keywords = doc.rankings.len(), "loaded ranking store");
        Ok(Self {
            path,
            history_cap,
            doc,
        })
    }

    pub fn save(&mut self) -> Result<()> {
        self.doc.metadata.last_updated = Some(Utc::now());
        self.doc.metadata.total_keywords = self.doc.rankings.len();
        write_json_atomic(&self.path, &self.doc)?;
        info!(path = %self.path.display(), keywords = self.doc.rankings.len(), "saved ranking store");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the snapshots found for `keyword` in one monitoring cycle.
    ///
    /// Each snapshot replaces the latest one for its engine and is appended
    /// to history as a single cycle entry. Cycles where nothing was found
    /// leave the store untouched.
    pub fn record_cycle(
        &mut self,
        keyword: &str,
        snapshots: Vec<RankingSnapshot>,
        timestamp: DateTime<Utc>,
    ) {
        if snapshots.is_empty() {
            return;
        }

        let latest = self.doc.rankings.entry(keyword.to_string()).or_default();
        let mut cycle = BTreeMap::new();
        for snapshot in snapshots {
            latest.insert(snapshot.engine.clone(), snapshot.clone());
            cycle.insert(snapshot.engine.clone(), snapshot);
        }
        let engines: Vec<String> = cycle.keys().cloned().collect();

        let entries = self.doc.history.entry(keyword.to_string()).or_default();
        let entry = HistoryEntry {
            timestamp,
            rankings: cycle,
        };
        // Keep chronological order even if a caller supplies an older timestamp.
        let at = entries.partition_point(|e| e.timestamp <= timestamp);
        entries.insert(at, entry);

        for engine in &engines {
            prune_engine(entries, engine, self.history_cap);
        }
        entries.retain(|e| !e.rankings.is_empty());

        debug!(keyword, engines = engines.len(), "recorded ranking cycle");
    }

    /// Record a single snapshot as its own cycle.
    pub fn append(&mut self, keyword: &str, snapshot: RankingSnapshot) {
        let timestamp = snapshot.timestamp;
        self.record_cycle(keyword, vec![snapshot], timestamp);
    }

    /// Latest snapshot per engine for `keyword`.
    pub fn latest(&self, keyword: &str) -> Option<&BTreeMap<String, RankingSnapshot>> {
        self.doc.rankings.get(keyword)
    }

    pub fn latest_for(&self, keyword: &str, engine: &str) -> Option<&RankingSnapshot> {
        self.doc.rankings.get(keyword).and_then(|m| m.get(engine))
    }

    /// Whether `keyword` has a ranking on any engine.
    pub fn is_ranked(&self, keyword: &str) -> bool {
        self.doc
            .rankings
            .get(keyword)
            .is_some_and(|engines| !engines.is_empty())
    }

    /// All (keyword, engine → snapshot) pairs.
    pub fn iter_latest(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, RankingSnapshot>)> {
        self.doc.rankings.iter()
    }

    /// Chronological snapshots for one (keyword, engine).
    pub fn history_for(&self, keyword: &str, engine: &str) -> Vec<&RankingSnapshot> {
        self.doc
            .history
            .get(keyword)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.rankings.get(engine))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Raw cycle entries for one keyword.
    pub fn history(&self, keyword: &str) -> &[HistoryEntry] {
        self.doc
            .history
            .get(keyword)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of ranked keywords.
    pub fn len(&self) -> usize {
        self.doc.rankings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.rankings.is_empty()
    }

    /// Number of (keyword, engine) pairs with a latest snapshot.
    pub fn total_rankings(&self) -> usize {
        self.doc.rankings.values().map(BTreeMap::len).sum()
    }

    pub fn stats(&self) -> &MonitoringStats {
        &self.doc.metadata.monitoring_stats
    }

    pub fn set_stats(&mut self, stats: MonitoringStats) {
        self.doc.metadata.monitoring_stats = stats;
    }
}

fn backfill_engine_ids(engines: &mut BTreeMap<String, RankingSnapshot>) {
    for (engine, snapshot) in engines.iter_mut() {
        if snapshot.engine.is_empty() {
            snapshot.engine = engine.clone();
        }
    }
}

/// Drop `engine`'s oldest snapshots until at most `cap` remain.
fn prune_engine(entries: &mut [HistoryEntry], engine: &str, cap: usize) {
    let count = entries
        .iter()
        .filter(|e| e.rankings.contains_key(engine))
        .count();
    let mut excess = count.saturating_sub(cap);

    for entry in entries.iter_mut() {
        if excess == 0 {
            break;
        }
        if entry.rankings.remove(engine).is_some() {
            excess -= 1;
        }
    }
}
