//! Ranking monitor: drives the SERP extractors over the selected keywords and
//! records what they find.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};

use rankscout_serp::{EngineRegistry, SerpExtractor, SerpHit};
use rankscout_shared::{AppConfig, MonitoringConfig, ProgressReporter, RankingSnapshot, Result};
use rankscout_storage::{KeywordStore, MonitoringStats, QuotaLedger, RankingStore};

/// Checks each keyword on every enabled engine, in batches.
pub struct RankMonitor {
    registry: EngineRegistry,
    top_keywords: usize,
    batch_size: usize,
    batch_pause: Duration,
    parallel_engines: bool,
}

impl RankMonitor {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let registry = EngineRegistry::from_config(config)?;
        Ok(Self::new(registry, &config.monitoring))
    }

    pub fn new(registry: EngineRegistry, config: &MonitoringConfig) -> Self {
        Self {
            registry,
            top_keywords: config.top_keywords,
            batch_size: config.batch_size.max(1),
            batch_pause: Duration::from_millis(config.batch_pause_ms),
            parallel_engines: config.parallel_engines,
        }
    }

    pub fn engine_ids(&self) -> Vec<&str> {
        self.registry.ids()
    }

    /// Display name of an engine id, falling back to the id.
    pub fn engine_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.registry.get(id).map_or(id, SerpExtractor::name)
    }

    /// The highest-scored keywords, up to the configured count.
    pub fn select_keywords(&self, store: &KeywordStore) -> Vec<String> {
        store
            .top_n(self.top_keywords)
            .into_iter()
            .map(|(keyword, _)| keyword.clone())
            .collect()
    }

    /// Check every keyword and record found ranks in `rankings`.
    ///
    /// Failed lookups are counted and logged, never propagated.
    #[instrument(skip_all, fields(keywords = keywords.len(), engines = self.registry.extractors().len()))]
    pub async fn monitor(
        &self,
        keywords: &[String],
        rankings: &mut RankingStore,
        ledger: &mut QuotaLedger,
        progress: &dyn ProgressReporter,
    ) -> MonitoringStats {
        let mut stats = MonitoringStats {
            started_at: Some(Utc::now()),
            ..MonitoringStats::default()
        };
        info!(keywords = keywords.len(), "starting ranking monitoring");

        let total = keywords.len();
        let mut done = 0;
        for (batch_index, batch) in keywords.chunks(self.batch_size).enumerate() {
            if batch_index > 0 && !self.batch_pause.is_zero() {
                debug!(pause_ms = self.batch_pause.as_millis() as u64, "pausing between batches");
                tokio::time::sleep(self.batch_pause).await;
            }

            for keyword in batch {
                let snapshots = self.check_keyword(keyword, ledger, &mut stats).await;
                rankings.record_cycle(keyword, snapshots, Utc::now());
                done += 1;
                progress.step(keyword, done, total);
            }
        }

        stats.finished_at = Some(Utc::now());
        info!(
            checks = stats.total_checks,
            found = stats.found,
            not_found = stats.not_found,
            errors = stats.errors,
            "ranking monitoring complete"
        );
        stats
    }

    /// One keyword across all engines with remaining quota.
    async fn check_keyword(
        &self,
        keyword: &str,
        ledger: &mut QuotaLedger,
        stats: &mut MonitoringStats,
    ) -> Vec<RankingSnapshot> {
        let now = Utc::now();
        let mut active: Vec<&SerpExtractor> = Vec::new();
        for extractor in self.registry.extractors() {
            if ledger.try_consume(extractor.id(), extractor.daily_limit(), now) {
                active.push(extractor);
            } else {
                stats.quota_skipped += 1;
                debug!(engine = extractor.id(), keyword, "daily quota used up, skipping engine");
            }
        }

        let outcomes: Vec<(&SerpExtractor, Result<Option<SerpHit>>)> = if self.parallel_engines {
            let lookups = active
                .iter()
                .map(|extractor| async move { (*extractor, extractor.find_rank(keyword).await) });
            join_all(lookups).await
        } else {
            let mut outcomes = Vec::with_capacity(active.len());
            for extractor in active {
                outcomes.push((extractor, extractor.find_rank(keyword).await));
            }
            outcomes
        };

        let mut snapshots = Vec::new();
        for (extractor, outcome) in outcomes {
            let engine = extractor.id();
            match outcome {
                Ok(Some(hit)) => {
                    stats.record_check(engine, true);
                    info!(engine, keyword, rank = hit.rank, "ranking found");
                    snapshots.push(RankingSnapshot {
                        engine: engine.to_string(),
                        rank: hit.rank,
                        url: hit.url,
                        title: hit.title,
                        page: hit.page,
                        timestamp: Utc::now(),
                    });
                }
                Ok(None) => {
                    stats.record_check(engine, false);
                    warn!(engine, keyword, "site not found in results");
                }
                Err(e) => {
                    error!(engine, keyword, error = %e, "ranking check failed");
                    stats.record_error(engine, keyword, &e.to_string());
                }
            }
        }
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankscout_shared::SilentProgress;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixture(name: &str) -> String {
        let path = format!("../../../fixtures/serp/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {path}: {e}"))
    }

    /// Baidu and Bing pointed at the mock server, no pacing.
    fn config_for(server: &MockServer) -> AppConfig {
        let mut config = AppConfig::default();
        for engine in config.engines.iter_mut() {
            engine.enabled = matches!(engine.id.as_str(), "baidu" | "bing");
            engine.search_url = format!("{}/{}", server.uri(), engine.id);
        }
        config.monitoring.request_delay_ms = 0;
        config.monitoring.batch_pause_ms = 0;
        config.monitoring.batch_size = 2;
        config
    }

    fn ledger() -> QuotaLedger {
        let path = std::env::temp_dir().join(format!("quota-{}.json", Uuid::now_v7()));
        QuotaLedger::empty(path, AppConfig::default().site.offset())
    }

    fn rankings() -> RankingStore {
        let path = std::env::temp_dir().join(format!("rankings-{}.json", Uuid::now_v7()));
        RankingStore::empty(path, 365)
    }

    async fn mount(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn records_found_ranks_and_counts_misses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/baidu"))
            .and(query_param("pn", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture("baidu_page1.html")))
            .mount(&server)
            .await;
        mount(&server, "/bing", fixture("baidu_empty.html")).await;

        let monitor = RankMonitor::from_config(&config_for(&server)).unwrap();
        let mut store = rankings();
        let mut quota = ledger();
        let keywords = vec!["Telegram Bot".to_string()];

        let stats = monitor.monitor(&keywords, &mut store, &mut quota, &SilentProgress).await;

        assert_eq!(stats.total_checks, 2);
        assert_eq!(stats.found, 1);
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.engines["baidu"].found, 1);
        assert_eq!(stats.engines["bing"].checked, 1);

        let snapshot = store.latest_for("Telegram Bot", "baidu").expect("baidu rank");
        assert_eq!(snapshot.rank, 7);
        assert_eq!(snapshot.engine, "baidu");
        assert!(store.latest_for("Telegram Bot", "bing").is_none());
        assert_eq!(store.history("Telegram Bot").len(), 1);
    }

    #[tokio::test]
    async fn engine_failure_is_counted_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/baidu"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        mount(&server, "/bing", fixture("bing_page.html")).await;

        let mut config = config_for(&server);
        config.monitoring.parallel_engines = true;
        let monitor = RankMonitor::from_config(&config).unwrap();
        let mut store = rankings();
        let mut quota = ledger();
        let keywords = vec!["电报".to_string(), "tg频道".to_string(), "电报群".to_string()];

        let stats = monitor.monitor(&keywords, &mut store, &mut quota, &SilentProgress).await;

        assert_eq!(stats.errors, 3);
        assert_eq!(stats.found, 3);
        assert_eq!(stats.error_messages.len(), 3);
        assert!(stats.error_messages[0].starts_with("baidu-电报"));
        assert_eq!(store.len(), 3);
        assert_eq!(store.latest_for("tg频道", "bing").map(|s| s.rank), Some(2));
    }

    #[tokio::test]
    async fn exhausted_quota_skips_engine() {
        let server = MockServer::start().await;
        mount(&server, "/baidu", fixture("baidu_page1.html")).await;
        mount(&server, "/bing", fixture("bing_page.html")).await;

        let mut config = config_for(&server);
        config.engines[0].daily_limit = 1;
        let monitor = RankMonitor::from_config(&config).unwrap();
        let mut store = rankings();
        let mut quota = ledger();
        let keywords = vec!["电报".to_string(), "tg频道".to_string()];

        let stats = monitor.monitor(&keywords, &mut store, &mut quota, &SilentProgress).await;

        assert_eq!(stats.quota_skipped, 1);
        assert_eq!(stats.engines["baidu"].checked, 1);
        assert_eq!(stats.engines["bing"].checked, 2);
        assert!(store.latest_for("tg频道", "baidu").is_none());
    }

    #[tokio::test]
    async fn selects_top_scored_keywords() {
        let server = MockServer::start().await;
        let mut config = config_for(&server);
        config.monitoring.top_keywords = 2;
        let monitor = RankMonitor::from_config(&config).unwrap();

        let now = Utc::now();
        let mut keywords = KeywordStore::empty(std::env::temp_dir().join("kw-unused.json"), 10);
        keywords.upsert("电报", 19.0, "baidu-suggest", None, now);
        keywords.upsert("tg", 4.0, "baidu-suggest", None, now);
        keywords.upsert("电报群", 12.0, "baidu-suggest", None, now);

        assert_eq!(monitor.select_keywords(&keywords), vec!["电报", "电报群"]);
        assert_eq!(monitor.engine_ids(), vec!["baidu", "bing"]);
        assert_eq!(monitor.engine_name("bing"), "Bing");
    }
}
