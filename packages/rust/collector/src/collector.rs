//! Keyword discovery: seeds → sources + templates → filter → score → store.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use rankscout_shared::{AppConfig, ProgressReporter, Result};
use rankscout_storage::{CollectionStats, KeywordStore, QuotaLedger, UpsertOutcome};

use crate::expander::TemplateExpander;
use crate::filter::{FilterOutcome, KeywordFilter};
use crate::scorer::Scorer;
use crate::sources::{SuggestionSource, build_sources};

/// A raw candidate tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub keyword: String,
    pub source_id: String,
    pub weight: f64,
    pub base_keyword: Option<String>,
}

/// Drives discovery for a list of seeds.
pub struct Collector {
    sources: Vec<Box<dyn SuggestionSource>>,
    expander: TemplateExpander,
    filter: KeywordFilter,
    scorer: Scorer,
    pause_every: usize,
    pause: Duration,
    max_seeds: usize,
}

impl Collector {
    /// Build a collector with the configured HTTP suggestion sources.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let sources = build_sources(&config.collection)?;
        Self::with_sources(sources, config)
    }

    /// Build a collector around an explicit set of sources.
    pub fn with_sources(
        sources: Vec<Box<dyn SuggestionSource>>,
        config: &AppConfig,
    ) -> Result<Self> {
        Ok(Self {
            sources,
            expander: TemplateExpander::new(&config.collection.templates, &config.filters),
            filter: KeywordFilter::new(&config.filters)?,
            scorer: Scorer::new(&config.scoring),
            pause_every: config.collection.batch_pause_every,
            pause: Duration::from_millis(config.collection.batch_pause_ms),
            max_seeds: config.collection.max_seeds_per_run,
        })
    }

    /// Process every seed and merge accepted candidates into `store`.
    ///
    /// Source failures are counted and logged; they never abort the run.
    #[instrument(skip_all, fields(seeds = seeds.len(), sources = self.sources.len()))]
    pub async fn collect(
        &self,
        seeds: &[String],
        store: &mut KeywordStore,
        ledger: &mut QuotaLedger,
        progress: &dyn ProgressReporter,
    ) -> CollectionStats {
        let mut stats = CollectionStats {
            started_at: Some(Utc::now()),
            ..CollectionStats::default()
        };

        let mut unique: Vec<&str> = Vec::new();
        for seed in seeds.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !unique.contains(&seed) {
                unique.push(seed);
            }
        }
        if unique.len() > self.max_seeds {
            warn!(limit = self.max_seeds, seeds = unique.len(), "seed limit reached, truncating");
            unique.truncate(self.max_seeds);
        }

        info!(seeds = unique.len(), "starting keyword collection");
        let total = unique.len();

        for (i, seed) in unique.iter().enumerate() {
            if i > 0 && self.pause_every > 0 && i % self.pause_every == 0 && !self.pause.is_zero() {
                debug!(pause_ms = self.pause.as_millis() as u64, "pausing between seed batches");
                tokio::time::sleep(self.pause).await;
            }

            let candidates = self.gather(seed, ledger, &mut stats).await;
            for candidate in candidates {
                self.ingest(candidate, store, &mut stats);
            }

            stats.seeds_processed += 1;
            progress.step(seed, i + 1, total);
        }

        stats.finished_at = Some(Utc::now());
        info!(
            collected = stats.total_collected,
            new = stats.new_keywords,
            duplicates = stats.duplicates,
            filtered = stats.filtered,
            irrelevant = stats.irrelevant,
            errors = stats.errors,
            "keyword collection complete"
        );
        stats
    }

    /// Query every source with remaining quota concurrently, then expand templates.
    async fn gather(
        &self,
        seed: &str,
        ledger: &mut QuotaLedger,
        stats: &mut CollectionStats,
    ) -> Vec<Candidate> {
        let now = Utc::now();
        let mut active: Vec<&dyn SuggestionSource> = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            if ledger.try_consume(source.id(), source.daily_limit(), now) {
                active.push(source.as_ref());
            } else {
                stats.quota_skipped += 1;
                debug!(source = source.id(), seed, "daily quota used up, skipping source");
            }
        }

        let calls = active.iter().map(|source| async move {
            let result = source.suggest(seed).await;
            (*source, result)
        });
        let results = join_all(calls).await;

        let mut candidates = Vec::new();
        for (source, result) in results {
            match result {
                Ok(suggestions) => {
                    candidates.extend(suggestions.into_iter().map(|keyword| Candidate {
                        keyword,
                        source_id: source.id().to_string(),
                        weight: source.weight(),
                        base_keyword: None,
                    }));
                }
                Err(e) => {
                    stats.errors += 1;
                    warn!(source = source.id(), seed, error = %e, "suggestion source failed");
                }
            }
        }

        candidates.extend(self.expander.expand(seed).into_iter().map(|keyword| Candidate {
            keyword,
            source_id: self.expander.source_id().to_string(),
            weight: self.expander.weight(),
            base_keyword: Some(seed.to_string()),
        }));

        candidates
    }

    fn ingest(&self, candidate: Candidate, store: &mut KeywordStore, stats: &mut CollectionStats) {
        match self.filter.check(&candidate.keyword) {
            FilterOutcome::Rejected(reason) => {
                stats.filtered += 1;
                debug!(keyword = %candidate.keyword, ?reason, "candidate rejected");
            }
            FilterOutcome::Irrelevant => {
                stats.irrelevant += 1;
            }
            FilterOutcome::Accepted => {
                let score = self.scorer.score(&candidate.keyword, candidate.weight);
                let outcome = store.upsert(
                    &candidate.keyword,
                    score,
                    &candidate.source_id,
                    candidate.base_keyword.as_deref(),
                    Utc::now(),
                );
                match outcome {
                    UpsertOutcome::Inserted => stats.new_keywords += 1,
                    UpsertOutcome::Merged => stats.duplicates += 1,
                    UpsertOutcome::Refused => stats.capacity_rejected += 1,
                }
                stats.total_collected += 1;
                stats.record_source(&candidate.source_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rankscout_shared::{RankScoutError, SilentProgress};
    use uuid::Uuid;

    struct StaticSource {
        id: &'static str,
        weight: f64,
        daily_limit: u32,
        suggestions: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(id: &'static str, weight: f64, suggestions: Vec<&'static str>) -> Self {
            Self {
                id,
                weight,
                daily_limit: 1000,
                suggestions,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SuggestionSource for StaticSource {
        fn id(&self) -> &str {
            self.id
        }
        fn weight(&self) -> f64 {
            self.weight
        }
        fn daily_limit(&self) -> u32 {
            self.daily_limit
        }
        async fn suggest(&self, _query: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.suggestions.iter().map(|s| s.to_string()).collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SuggestionSource for FailingSource {
        fn id(&self) -> &str {
            "broken-suggest"
        }
        fn weight(&self) -> f64 {
            2.0
        }
        fn daily_limit(&self) -> u32 {
            1000
        }
        async fn suggest(&self, _query: &str) -> Result<Vec<String>> {
            Err(RankScoutError::unavailable("broken-suggest", "timed out"))
        }
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.collection.batch_pause_ms = 0;
        config
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("rs-collector-test-{}", Uuid::now_v7()))
    }

    fn stores(dir: &Path, capacity: usize) -> (KeywordStore, QuotaLedger) {
        let config = AppConfig::default();
        (
            KeywordStore::empty(dir.join("keywords.json"), capacity),
            QuotaLedger::empty(dir.join("quota.json"), config.site.offset()),
        )
    }

    fn seeds(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn template_then_suggestion_rediscovery() {
        let config = test_config();
        let dir = temp_dir();
        let (mut store, mut ledger) = stores(&dir, 1000);

        let collector = Collector::with_sources(Vec::new(), &config).unwrap();
        let stats = collector
            .collect(&seeds(&["Telegram Bot"]), &mut store, &mut ledger, &SilentProgress)
            .await;

        assert_eq!(stats.new_keywords, 18);
        let record = store.get("Telegram Bot下载").expect("expanded keyword");
        assert_eq!(record.sources, vec!["related-terms"]);
        assert_eq!(record.score, 9.0);
        assert_eq!(record.metadata.base_keyword.as_deref(), Some("Telegram Bot"));
        assert_eq!(store.get("Telegram Bot教程").map(|r| r.score), Some(9.0));

        let source = StaticSource::new("suggestion-source-X", 3.0, vec!["Telegram Bot下载"]);
        let collector = Collector::with_sources(vec![Box::new(source)], &config).unwrap();
        let stats = collector
            .collect(&seeds(&["Telegram Bot"]), &mut store, &mut ledger, &SilentProgress)
            .await;

        assert_eq!(stats.new_keywords, 0);
        assert_eq!(stats.duplicates, 19);
        let record = store.get("Telegram Bot下载").unwrap();
        assert_eq!(record.sources, vec!["related-terms", "suggestion-source-X"]);
        // (1 + 1 + 6) * 3 + 1
        assert_eq!(record.score, 25.0);
        assert_eq!(stats.by_source["suggestion-source-X"], 1);
    }

    #[tokio::test]
    async fn failing_source_does_not_abort_run() {
        let config = test_config();
        let dir = temp_dir();
        let (mut store, mut ledger) = stores(&dir, 1000);

        let good = StaticSource::new("baidu-suggest", 3.0, vec!["电报中文版下载"]);
        let collector =
            Collector::with_sources(vec![Box::new(FailingSource), Box::new(good)], &config)
                .unwrap();
        let stats = collector
            .collect(&seeds(&["电报", "TG"]), &mut store, &mut ledger, &SilentProgress)
            .await;

        assert_eq!(stats.errors, 2);
        assert_eq!(stats.seeds_processed, 2);
        assert!(store.get("电报中文版下载").is_some());
        assert!(store.get("TG教程").is_some());
    }

    #[tokio::test]
    async fn filter_outcomes_are_counted_separately() {
        let config = test_config();
        let dir = temp_dir();
        let (mut store, mut ledger) = stores(&dir, 1000);

        let source = StaticSource::new(
            "sogou-suggest",
            2.0,
            vec!["天气预报", "电报赌博", "12345", "tg下载"],
        );
        let mut config_no_templates = config.clone();
        config_no_templates.collection.templates.enabled = false;
        let collector =
            Collector::with_sources(vec![Box::new(source)], &config_no_templates).unwrap();
        let stats = collector
            .collect(&seeds(&["tg"]), &mut store, &mut ledger, &SilentProgress)
            .await;

        assert_eq!(stats.irrelevant, 1);
        assert_eq!(stats.filtered, 2);
        assert_eq!(stats.new_keywords, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_quota_skips_source() {
        let config = test_config();
        let dir = temp_dir();
        let (mut store, mut ledger) = stores(&dir, 1000);

        let mut source = StaticSource::new("360-suggest", 2.0, vec!["电报群组推荐"]);
        source.daily_limit = 1;
        let collector = Collector::with_sources(vec![Box::new(source)], &config).unwrap();
        let stats = collector
            .collect(&seeds(&["电报", "电报群组"]), &mut store, &mut ledger, &SilentProgress)
            .await;

        assert_eq!(stats.quota_skipped, 1);
        assert_eq!(ledger.used("360-suggest", Utc::now()), 1);
    }

    #[tokio::test]
    async fn capacity_refusals_are_counted() {
        let config = test_config();
        let dir = temp_dir();
        let (mut store, mut ledger) = stores(&dir, 5);

        let collector = Collector::with_sources(Vec::new(), &config).unwrap();
        let stats = collector
            .collect(&seeds(&["电报"]), &mut store, &mut ledger, &SilentProgress)
            .await;

        assert_eq!(store.len(), 5);
        assert_eq!(stats.new_keywords, 5);
        assert_eq!(stats.capacity_rejected, 13);
    }

    #[tokio::test]
    async fn duplicate_seeds_are_processed_once() {
        let config = test_config();
        let dir = temp_dir();
        let (mut store, mut ledger) = stores(&dir, 1000);

        let collector = Collector::with_sources(Vec::new(), &config).unwrap();
        let stats = collector
            .collect(&seeds(&["TG", " TG ", ""]), &mut store, &mut ledger, &SilentProgress)
            .await;
        assert_eq!(stats.seeds_processed, 1);
    }
}
