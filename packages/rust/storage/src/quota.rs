//! Persistent per-day request counters for suggestion sources and engines.
//!
//! Counters reset when the local calendar date (in the site's timezone)
//! changes. A source or engine that reached its daily limit is skipped until
//! the next local day.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rankscout_shared::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::json::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct QuotaDocument {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    counters: BTreeMap<String, u32>,
}

#[derive(Debug, Clone)]
pub struct QuotaLedger {
    path: PathBuf,
    offset: FixedOffset,
    doc: QuotaDocument,
}

impl QuotaLedger {
    pub fn empty(path: impl Into<PathBuf>, offset: FixedOffset) -> Self {
        Self {
            path: path.into(),
            offset,
            doc: QuotaDocument::default(),
        }
    }

    pub fn load(path: impl Into<PathBuf>, offset: FixedOffset) -> Result<Self> {
        let path = path.into();
        let doc: QuotaDocument = read_json(&path)?.unwrap_or_default();
        debug!(path = %path.display(), date = ?doc.date, "loaded quota ledger");
        Ok(Self { path, offset, doc })
    }

    pub fn save(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.doc)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take one unit of `id`'s daily quota. Returns `false` when the limit is
    /// already used up for the local day containing `now`.
    pub fn try_consume(&mut self, id: &str, limit: u32, now: DateTime<Utc>) -> bool {
        self.roll_over(now);
        let used = self.doc.counters.entry(id.to_string()).or_default();
        if *used >= limit {
            debug!(id, limit, "daily quota exhausted");
            return false;
        }
        *used += 1;
        true
    }

    /// Units of `id`'s quota used on the local day containing `now`.
    pub fn used(&self, id: &str, now: DateTime<Utc>) -> u32 {
        if self.doc.date != Some(self.local_date(now)) {
            return 0;
        }
        self.doc.counters.get(id).copied().unwrap_or(0)
    }

    pub fn remaining(&self, id: &str, limit: u32, now: DateTime<Utc>) -> u32 {
        limit.saturating_sub(self.used(id, now))
    }

    fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    fn roll_over(&mut self, now: DateTime<Utc>) {
        let today = self.local_date(now);
        if self.doc.date != Some(today) {
            if self.doc.date.is_some() {
                info!(%today, "new quota day, counters reset");
            }
            self.doc.date = Some(today);
            self.doc.counters.clear();
        }
    }
}
