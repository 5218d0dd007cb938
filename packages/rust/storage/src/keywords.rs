//! Keyword Store: keyword → [`KeywordRecord`], persisted as `keywords-database.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rankscout_shared::{KeywordRecord, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::json::{read_json, write_json_atomic};
use crate::stats::CollectionStats;

/// On-disk shape of the keyword database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct KeywordDocument {
    #[serde(default)]
    metadata: KeywordDocumentMeta,
    #[serde(default)]
    keywords: BTreeMap<String, KeywordRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeywordDocumentMeta {
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    total_keywords: usize,
    #[serde(default, alias = "collectionStats")]
    stats: CollectionStats,
}

/// What [`KeywordStore::upsert`] did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First discovery; a new record was created.
    Inserted,
    /// Re-discovery; merged into the existing record.
    Merged,
    /// New keyword refused because the store is at capacity.
    Refused,
}

/// In-memory keyword repository with explicit load / save.
#[derive(Debug, Clone)]
pub struct KeywordStore {
    path: PathBuf,
    capacity: usize,
    doc: KeywordDocument,
}

impl KeywordStore {
    /// An empty store that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
            doc: KeywordDocument::default(),
        }
    }

    /// Load the store from `path`. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Result<Self> {
        let path = path.into();
        let mut doc: KeywordDocument = read_json(&path)?.unwrap_or_default();
        for (keyword, record) in doc.keywords.iter_mut() {
            record.metadata.refresh(keyword);
        }
        info!(path = %path.display(), keywords = doc.keywords.len(), "loaded keyword store");
        Ok(Self {
            path,
            capacity,
            doc,
        })
    }

    /// Write the store back to disk, refreshing the document metadata.
    pub fn save(&mut self) -> Result<()> {
        self.doc.metadata.last_updated = Some(Utc::now());
        self.doc.metadata.total_keywords = self.doc.keywords.len();
        write_json_atomic(&self.path, &self.doc)?;
        info!(path = %self.path.display(), keywords = self.doc.keywords.len(), "saved keyword store");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a new keyword or merge a re-discovery into the existing record.
    ///
    /// The key is the trimmed keyword. At capacity, new keys are refused while
    /// existing keys still merge.
    pub fn upsert(
        &mut self,
        keyword: &str,
        score: f64,
        source: &str,
        base_keyword: Option<&str>,
        now: DateTime<Utc>,
    ) -> UpsertOutcome {
        let key = keyword.trim();

        if let Some(record) = self.doc.keywords.get_mut(key) {
            record.merge(score, source, now);
            debug!(keyword = key, source, score = record.score, "merged keyword");
            return UpsertOutcome::Merged;
        }

        if self.doc.keywords.len() >= self.capacity {
            debug!(keyword = key, capacity = self.capacity, "keyword store full");
            return UpsertOutcome::Refused;
        }

        let record = KeywordRecord::new(key, score, source, base_keyword.map(String::from), now);
        self.doc.keywords.insert(key.to_string(), record);
        UpsertOutcome::Inserted
    }

    pub fn get(&self, keyword: &str) -> Option<&KeywordRecord> {
        self.doc.keywords.get(keyword.trim())
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.doc.keywords.contains_key(keyword.trim())
    }

    pub fn len(&self) -> usize {
        self.doc.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KeywordRecord)> {
        self.doc.keywords.iter()
    }

    /// The `n` highest-scored keywords, ties broken alphabetically.
    pub fn top_n(&self, n: usize) -> Vec<(&String, &KeywordRecord)> {
        let mut all: Vec<_> = self.doc.keywords.iter().collect();
        all.sort_by(|(ka, a), (kb, b)| b.score.total_cmp(&a.score).then_with(|| ka.cmp(kb)));
        all.truncate(n);
        all
    }

    /// Stats of the last collection run.
    pub fn stats(&self) -> &CollectionStats {
        &self.doc.metadata.stats
    }

    pub fn set_stats(&mut self, stats: CollectionStats) {
        self.doc.metadata.stats = stats;
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.doc.metadata.last_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("rs-keywords-test-{}", Uuid::now_v7()))
            .join("keywords-database.json")
    }

    #[test]
    fn insert_then_merge() {
        let mut store = KeywordStore::empty(temp_path(), 100);
        let now = Utc::now();

        let first = store.upsert("Telegram Bot下载", 9.0, "related-terms", Some("Telegram Bot"), now);
        let second = store.upsert(" Telegram Bot下载 ", 27.0, "baidu-suggest", None, now);

        assert_eq!(first, UpsertOutcome::Inserted);
        assert_eq!(second, UpsertOutcome::Merged);
        assert_eq!(store.len(), 1);

        let record = store.get("Telegram Bot下载").expect("record");
        assert_eq!(record.score, 27.0);
        assert_eq!(record.sources, vec!["related-terms", "baidu-suggest"]);
        assert_eq!(record.metadata.base_keyword.as_deref(), Some("Telegram Bot"));
    }

    #[test]
    fn capacity_refuses_new_but_merges_existing() {
        let mut store = KeywordStore::empty(temp_path(), 2);
        let now = Utc::now();

        store.upsert("电报下载", 6.0, "related-terms", None, now);
        store.upsert("电报教程", 6.0, "related-terms", None, now);
        let refused = store.upsert("电报官网", 6.0, "related-terms", None, now);
        let merged = store.upsert("电报下载", 8.0, "sogou-suggest", None, now);

        assert_eq!(refused, UpsertOutcome::Refused);
        assert_eq!(merged, UpsertOutcome::Merged);
        assert_eq!(store.len(), 2);
        assert!(!store.contains("电报官网"));
    }

    #[test]
    fn top_n_orders_by_score_then_keyword() {
        let mut store = KeywordStore::empty(temp_path(), 100);
        let now = Utc::now();
        store.upsert("b-tg", 5.0, "s", None, now);
        store.upsert("a-tg", 5.0, "s", None, now);
        store.upsert("c-tg", 9.0, "s", None, now);

        let top: Vec<&str> = store.top_n(2).into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(top, vec!["c-tg", "a-tg"]);
    }

    #[test]
    fn save_and_reload() {
        let path = temp_path();
        let mut store = KeywordStore::empty(&path, 100);
        store.upsert("TG频道", 7.0, "360-suggest", None, Utc::now());
        let mut stats = CollectionStats::default();
        stats.new_keywords = 1;
        store.set_stats(stats);
        store.save().expect("save");

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["metadata"]["totalKeywords"], 1);
        assert_eq!(json["keywords"]["TG频道"]["sources"][0], "360-suggest");

        let reloaded = KeywordStore::load(&path, 100).expect("load");
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.stats().new_keywords, 1);
        assert!(reloaded.last_updated().is_some());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn loads_database_without_derived_fields() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let raw = r#"{
            "metadata": {
                "lastUpdated": "2025-01-06T08:00:00.000Z",
                "totalKeywords": 2,
                "collectionStats": {"totalCollected": 2, "errors": [], "sources": {"baidu-suggest": 2}}
            },
            "keywords": {
                "电报资源1": {
                    "score": 6.5,
                    "sources": ["baidu-suggest"],
                    "timestamp": "2025-01-06T08:00:00.000Z",
                    "metadata": {"baseKeyword": "电报", "length": 5, "hasChineseChars": true, "hasEnglishChars": false},
                    "lastUpdated": "2025-01-06T08:00:00.000Z"
                },
                "tg频道": {"timestamp": "2025-01-06T08:00:00.000Z"}
            }
        }"#;
        std::fs::write(&path, raw).unwrap();

        let store = KeywordStore::load(&path, 100).expect("load");
        assert_eq!(store.len(), 2);
        let record = store.get("电报资源1").expect("record");
        assert_eq!(record.metadata.script, rankscout_shared::Script::Chinese);
        assert_eq!(record.metadata.base_keyword.as_deref(), Some("电报"));
        let sparse = store.get("tg频道").expect("record");
        assert_eq!(sparse.score, 1.0);
        assert_eq!(sparse.metadata.script, rankscout_shared::Script::Mixed);
        assert_eq!(store.stats().by_source["baidu-suggest"], 2);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
