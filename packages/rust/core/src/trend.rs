//! Rank movement inside the trend window.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use rankscout_shared::{RankingSnapshot, Trend, TrendDirection};
use rankscout_storage::RankingStore;

/// keyword → engine → trend. Pairs with fewer than two points are absent.
pub type TrendTable = BTreeMap<String, BTreeMap<String, Trend>>;

/// Compute the trend of one (keyword, engine) history.
///
/// Only snapshots strictly newer than `now - trend_days` count. Fewer than
/// two points yields `None`.
pub fn compute_trend(
    history: &[&RankingSnapshot],
    now: DateTime<Utc>,
    trend_days: i64,
) -> Option<Trend> {
    let cutoff = now - Duration::days(trend_days);
    let ranks: Vec<u32> = history
        .iter()
        .filter(|s| s.timestamp > cutoff && s.rank > 0)
        .map(|s| s.rank)
        .collect();

    let (&first_rank, &last_rank) = match (ranks.first(), ranks.last()) {
        (Some(first), Some(last)) if ranks.len() >= 2 => (first, last),
        _ => return None,
    };

    let change = i64::from(first_rank) - i64::from(last_rank);
    let direction = match change {
        c if c > 0 => TrendDirection::Up,
        c if c < 0 => TrendDirection::Down,
        _ => TrendDirection::Stable,
    };
    let sum: u64 = ranks.iter().map(|&r| u64::from(r)).sum();

    Some(Trend {
        first_rank,
        last_rank,
        change,
        direction,
        best_rank: ranks.iter().copied().min().unwrap_or(first_rank),
        worst_rank: ranks.iter().copied().max().unwrap_or(first_rank),
        average_rank: (sum as f64 / ranks.len() as f64).round() as u32,
        points: ranks.len(),
    })
}

/// Trends for every engine that has history for `keyword`.
pub fn trends_for(
    store: &RankingStore,
    keyword: &str,
    now: DateTime<Utc>,
    trend_days: i64,
) -> BTreeMap<String, Trend> {
    let mut engines: Vec<&str> = store
        .history(keyword)
        .iter()
        .flat_map(|entry| entry.rankings.keys().map(String::as_str))
        .collect();
    engines.sort_unstable();
    engines.dedup();

    engines
        .into_iter()
        .filter_map(|engine| {
            let history = store.history_for(keyword, engine);
            compute_trend(&history, now, trend_days).map(|t| (engine.to_string(), t))
        })
        .collect()
}

/// Trends for every keyword with a latest ranking.
pub fn trend_table(store: &RankingStore, now: DateTime<Utc>, trend_days: i64) -> TrendTable {
    store
        .iter_latest()
        .map(|(keyword, _)| (keyword.clone(), trends_for(store, keyword, now, trend_days)))
        .filter(|(_, trends)| !trends.is_empty())
        .collect()
}

/// Count of trends per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub up_trends: usize,
    pub down_trends: usize,
    pub stable_trends: usize,
}

impl TrendSummary {
    pub fn from_table(table: &TrendTable) -> Self {
        let mut summary = Self::default();
        for trend in table.values().flat_map(BTreeMap::values) {
            match trend.direction {
                TrendDirection::Up => summary.up_trends += 1,
                TrendDirection::Down => summary.down_trends += 1,
                TrendDirection::Stable => summary.stable_trends += 1,
            }
        }
        summary
    }
}
