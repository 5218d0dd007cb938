//! Run counters persisted in store metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Error lines kept per monitoring run; `errors` keeps counting past it.
pub const MAX_ERROR_MESSAGES: usize = 100;

/// Counters for one collection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionStats {
    /// Candidates that passed the filter (new + duplicates + capacity_rejected).
    pub total_collected: usize,
    pub new_keywords: usize,
    pub duplicates: usize,
    /// Rejected by length, banned pattern or blacklist.
    pub filtered: usize,
    /// Failed the domain-term relevance gate.
    pub irrelevant: usize,
    /// New keywords refused because the store was full.
    pub capacity_rejected: usize,
    /// Source calls skipped because the daily quota was used up.
    pub quota_skipped: usize,
    /// Failed source calls.
    #[serde(deserialize_with = "count_or_list")]
    pub errors: usize,
    /// Accepted candidates per source id.
    #[serde(alias = "sources")]
    pub by_source: BTreeMap<String, usize>,
    pub seeds_processed: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CollectionStats {
    pub fn record_source(&mut self, source_id: &str) {
        *self.by_source.entry(source_id.to_string()).or_default() += 1;
    }
}

/// Checked / found counts for one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCounter {
    pub checked: usize,
    pub found: usize,
}

impl EngineCounter {
    /// Percentage of checks that found the site, one decimal.
    pub fn success_rate(&self) -> f64 {
        if self.checked == 0 {
            return 0.0;
        }
        rankscout_shared::round1(self.found as f64 / self.checked as f64 * 100.0)
    }
}

/// Counters for one monitoring run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringStats {
    pub total_checks: usize,
    #[serde(alias = "foundRankings")]
    pub found: usize,
    pub not_found: usize,
    /// Checks that failed with a transport or parse error.
    ///
    /// Older stores wrote the error lines here instead of a count.
    #[serde(deserialize_with = "count_or_list")]
    pub errors: usize,
    pub quota_skipped: usize,
    /// Short `engine-keyword: message` lines for the report, at most
    /// [`MAX_ERROR_MESSAGES`].
    pub error_messages: Vec<String>,
    pub engines: BTreeMap<String, EngineCounter>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl MonitoringStats {
    /// Record the outcome of one (keyword, engine) check.
    pub fn record_check(&mut self, engine: &str, found: bool) {
        self.total_checks += 1;
        let counter = self.engines.entry(engine.to_string()).or_default();
        counter.checked += 1;
        if found {
            self.found += 1;
            counter.found += 1;
        } else {
            self.not_found += 1;
        }
    }

    pub fn record_error(&mut self, engine: &str, keyword: &str, message: &str) {
        self.errors += 1;
        self.engines.entry(engine.to_string()).or_default().checked += 1;
        self.total_checks += 1;
        if self.error_messages.len() < MAX_ERROR_MESSAGES {
            self.error_messages.push(format!("{engine}-{keyword}: {message}"));
        }
    }
}

fn count_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tally {
        Count(usize),
        Lines(Vec<serde_json::Value>),
    }

    Ok(match Tally::deserialize(deserializer)? {
        Tally::Count(n) => n,
        Tally::Lines(lines) => lines.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitoring_counters() {
        let mut stats = MonitoringStats::default();
        stats.record_check("baidu", true);
        stats.record_check("baidu", false);
        stats.record_error("baidu", "电报", "timed out");

        assert_eq!(stats.total_checks, 3);
        assert_eq!(stats.found, 1);
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.errors, 1);
        let baidu = stats.engines["baidu"];
        assert_eq!(baidu.checked, 3);
        assert_eq!(baidu.success_rate(), 33.3);
        assert_eq!(stats.error_messages, vec!["baidu-电报: timed out"]);
    }

    #[test]
    fn error_lines_are_capped_but_counted() {
        let mut stats = MonitoringStats::default();
        for i in 0..MAX_ERROR_MESSAGES + 5 {
            stats.record_error("bing", &format!("kw{i}"), "503");
        }
        assert_eq!(stats.errors, MAX_ERROR_MESSAGES + 5);
        assert_eq!(stats.error_messages.len(), MAX_ERROR_MESSAGES);
    }

    #[test]
    fn monitoring_stats_accept_error_list() {
        let json = r#"{
            "totalChecks": 6,
            "foundRankings": 2,
            "notFound": 3,
            "errors": ["baidu-电报: timeout"],
            "engines": {"baidu": {"checked": 6, "found": 2}},
            "lastUpdate": "2025-01-08T02:00:00.000Z"
        }"#;
        let stats: MonitoringStats = serde_json::from_str(json).expect("parse");
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.found, 2);
        assert_eq!(stats.engines["baidu"].checked, 6);

        let stats: MonitoringStats = serde_json::from_str(r#"{"errors": 4}"#).expect("parse");
        assert_eq!(stats.errors, 4);
    }

    #[test]
    fn stats_tolerate_missing_fields() {
        let stats: CollectionStats =
            serde_json::from_str(r#"{"totalCollected": 4}"#).expect("parse");
        assert_eq!(stats.total_collected, 4);
        assert!(stats.by_source.is_empty());

        let stats: CollectionStats = serde_json::from_str(
            r#"{"totalCollected": 9, "errors": ["a", "b"], "sources": {"baidu-suggest": 9}}"#,
        )
        .expect("parse");
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.by_source["baidu-suggest"], 9);
    }
}
