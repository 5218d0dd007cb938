//! Core domain types for keyword discovery and ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Round to one decimal place (scores are reported with one decimal).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// KeywordRecord
// ---------------------------------------------------------------------------

/// Writing system detected in a keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Chinese,
    Latin,
    Mixed,
    #[default]
    Other,
}

impl Script {
    /// Detect the script of a keyword from CJK unified ideographs and ASCII letters.
    pub fn detect(keyword: &str) -> Self {
        let has_cjk = keyword.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c));
        let has_latin = keyword.chars().any(|c| c.is_ascii_alphabetic());
        match (has_cjk, has_latin) {
            (true, true) => Self::Mixed,
            (true, false) => Self::Chinese,
            (false, true) => Self::Latin,
            (false, false) => Self::Other,
        }
    }
}

/// Descriptive metadata captured when a keyword is first discovered.
///
/// `length` and `script` are derived from the keyword; see [`KeywordMetadata::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMetadata {
    /// Length in characters.
    #[serde(default)]
    pub length: usize,
    /// Detected script.
    #[serde(default)]
    pub script: Script,
    /// Seed keyword this one was expanded from, if any.
    #[serde(default)]
    pub base_keyword: Option<String>,
}

impl KeywordMetadata {
    /// Build metadata for a normalized keyword.
    pub fn for_keyword(keyword: &str, base_keyword: Option<String>) -> Self {
        Self {
            length: keyword.chars().count(),
            script: Script::detect(keyword),
            base_keyword,
        }
    }

    /// Recompute the derived fields, e.g. for records stored without them.
    pub fn refresh(&mut self, keyword: &str) {
        self.length = keyword.chars().count();
        self.script = Script::detect(keyword);
    }
}

fn default_score() -> f64 {
    1.0
}

/// A discovered keyword with its heuristic score and provenance.
///
/// The keyword string itself is the key in the Keyword Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    /// Heuristic relevance score. Never lowered by a merge.
    #[serde(default = "default_score")]
    pub score: f64,
    /// Source ids that independently produced this keyword (no duplicates).
    #[serde(default)]
    pub sources: Vec<String>,
    /// Length / script / base keyword.
    #[serde(default)]
    pub metadata: KeywordMetadata,
    /// First discovery time.
    #[serde(rename = "timestamp", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last time any source re-discovered this keyword.
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl KeywordRecord {
    /// Create a record for a first discovery.
    pub fn new(
        keyword: &str,
        score: f64,
        source: &str,
        base_keyword: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            score,
            sources: vec![source.to_string()],
            metadata: KeywordMetadata::for_keyword(keyword, base_keyword),
            created_at: now,
            last_updated: now,
        }
    }

    /// Fold a re-discovery into this record: score raised to the max,
    /// source set unioned, `last_updated` refreshed.
    pub fn merge(&mut self, score: f64, source: &str, now: DateTime<Utc>) {
        self.score = self.score.max(score);
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
        self.last_updated = now;
    }
}

// ---------------------------------------------------------------------------
// RankingSnapshot
// ---------------------------------------------------------------------------

/// Best rank found for one keyword on one engine in one monitoring cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    /// Engine id (`baidu`, `google`, ...).
    #[serde(default)]
    pub engine: String,
    /// 1-based global rank.
    pub rank: u32,
    /// Destination URL on the monitored site.
    pub url: String,
    /// Result title as shown on the SERP.
    pub title: String,
    /// 1-based SERP page the result was found on.
    pub page: u32,
    /// When the observation was made.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Direction of rank movement. `Up` means the site moved toward rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Rank movement for one (keyword, engine) inside the trend window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub first_rank: u32,
    pub last_rank: u32,
    /// `first_rank - last_rank`; positive is an improvement.
    pub change: i64,
    pub direction: TrendDirection,
    pub best_rank: u32,
    pub worst_rank: u32,
    pub average_rank: u32,
    /// Number of observations inside the window.
    pub points: usize,
}

// ---------------------------------------------------------------------------
// Opportunity
// ---------------------------------------------------------------------------

/// Kind of optimization opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    /// Scored keyword with no ranking on any engine.
    New,
    /// Rank 11–15: one push from the first page.
    Breakthrough,
    /// Rank 4–6: within reach of the top three.
    TopThree,
    /// Rising rank worth continued optimization.
    Underperforming,
    /// Rank dropping faster than the alert threshold.
    UrgentDecline,
}

impl OpportunityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Breakthrough => "breakthrough",
            Self::TopThree => "top_three",
            Self::Underperforming => "underperforming",
            Self::UrgentDecline => "urgent_decline",
        }
    }
}

/// Action priority. Ordering is `Low < Medium < High < Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// A prioritized recommendation for one keyword (and engine, when ranked).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub keyword: String,
    /// `None` for keywords with no ranking on any engine.
    pub engine: Option<String>,
    pub current_rank: Option<u32>,
    pub kind: OpportunityKind,
    pub priority: Priority,
    /// Keyword score at evaluation time (tie-breaker when sorting).
    pub keyword_score: f64,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_detection() {
        assert_eq!(Script::detect("电报下载"), Script::Chinese);
        assert_eq!(Script::detect("Telegram Bot"), Script::Latin);
        assert_eq!(Script::detect("Telegram Bot教程"), Script::Mixed);
        assert_eq!(Script::detect("12345"), Script::Other);
    }

    #[test]
    fn metadata_counts_characters_not_bytes() {
        let meta = KeywordMetadata::for_keyword("电报频道", None);
        assert_eq!(meta.length, 4);
    }

    #[test]
    fn merge_keeps_max_score_and_unique_sources() {
        let now = Utc::now();
        let mut record = KeywordRecord::new("Telegram Bot下载", 9.0, "related-terms", None, now);

        record.merge(4.0, "baidu-suggest", now);
        record.merge(12.5, "baidu-suggest", now);

        assert_eq!(record.score, 12.5);
        assert_eq!(record.sources, vec!["related-terms", "baidu-suggest"]);

        record.merge(1.0, "related-terms", now);
        assert_eq!(record.score, 12.5);
        assert_eq!(record.sources.len(), 2);
    }

    #[test]
    fn record_serializes_with_store_field_names() {
        let now = Utc::now();
        let record = KeywordRecord::new("TG频道", 7.0, "sogou-suggest", Some("TG".into()), now);
        let json = serde_json::to_value(&record).expect("serialize");

        assert!(json.get("timestamp").is_some());
        assert!(json.get("lastUpdated").is_some());
        assert_eq!(json["metadata"]["baseKeyword"], "TG");
        assert_eq!(json["metadata"]["script"], "mixed");
    }

    #[test]
    fn sparse_record_fills_defaults() {
        let json = r#"{
            "timestamp": "2025-01-06T08:00:00.000Z",
            "metadata": {"baseKeyword": "电报", "length": 5, "hasChineseChars": true, "hasEnglishChars": false}
        }"#;
        let mut record: KeywordRecord = serde_json::from_str(json).expect("parse");
        assert_eq!(record.score, 1.0);
        assert!(record.sources.is_empty());
        assert_eq!(record.metadata.base_keyword.as_deref(), Some("电报"));
        assert_eq!(record.metadata.script, Script::Other);

        record.metadata.refresh("电报资源1");
        assert_eq!(record.metadata.script, Script::Chinese);
        assert_eq!(record.metadata.length, 5);

        let bare: KeywordRecord = serde_json::from_str("{}").expect("parse");
        assert_eq!(bare.metadata, KeywordMetadata::default());
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Urgent > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn round_to_one_decimal() {
        assert_eq!(round1(8.46), 8.5);
        assert_eq!(round1(3.0), 3.0);
        assert_eq!(round1(0.04), 0.0);
    }
}
