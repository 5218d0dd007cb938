//! Opportunity & priority engine.
//!
//! A pure function of the keyword store, the ranking store and the trend
//! table. Identical inputs always yield the identical, identically ordered
//! list.

use std::cmp::Reverse;

use rankscout_shared::{
    AnalysisConfig, Opportunity, OpportunityKind, Priority, Trend, TrendDirection,
};
use rankscout_storage::{KeywordStore, RankingStore};

use crate::trend::TrendTable;

/// Thresholds for the opportunity rules.
#[derive(Debug, Clone, Copy)]
pub struct OpportunityRules {
    /// A drop of more than this many places is urgent.
    pub alert_threshold: i64,
    /// Minimum score for an unranked keyword to be reported.
    pub new_keyword_min_score: f64,
}

impl From<&AnalysisConfig> for OpportunityRules {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            alert_threshold: config.alert_threshold,
            new_keyword_min_score: config.new_keyword_min_score,
        }
    }
}

impl Default for OpportunityRules {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

/// Derive the prioritized opportunity list.
///
/// Sorted by priority (urgent first), then keyword score descending; the
/// remaining ties are broken by keyword, engine and kind.
pub fn find_opportunities(
    keywords: &KeywordStore,
    rankings: &RankingStore,
    trends: &TrendTable,
    rules: &OpportunityRules,
) -> Vec<Opportunity> {
    let mut found = Vec::new();

    for (keyword, engines) in rankings.iter_latest() {
        let score = keywords.get(keyword).map_or(0.0, |r| r.score);
        for (engine, snapshot) in engines {
            let trend = trends.get(keyword).and_then(|t| t.get(engine));
            let Some((kind, priority, rationale)) = classify(snapshot.rank, trend, rules) else {
                continue;
            };
            found.push(Opportunity {
                keyword: keyword.clone(),
                engine: Some(engine.clone()),
                current_rank: Some(snapshot.rank),
                kind,
                priority,
                keyword_score: score,
                rationale,
            });
        }
    }

    for (keyword, record) in keywords.iter() {
        if rankings.is_ranked(keyword) || record.score < rules.new_keyword_min_score {
            continue;
        }
        let priority = if record.score >= rules.new_keyword_min_score * 2.0 {
            Priority::High
        } else {
            Priority::Medium
        };
        found.push(Opportunity {
            keyword: keyword.clone(),
            engine: None,
            current_rank: None,
            kind: OpportunityKind::New,
            priority,
            keyword_score: record.score,
            rationale: format!("score {}, not ranked on any engine yet", record.score),
        });
    }

    found.sort_by(|a, b| {
        Reverse(a.priority)
            .cmp(&Reverse(b.priority))
            .then_with(|| b.keyword_score.total_cmp(&a.keyword_score))
            .then_with(|| a.keyword.cmp(&b.keyword))
            .then_with(|| a.engine.cmp(&b.engine))
            .then_with(|| a.kind.cmp(&b.kind))
    });
    found
}

/// At most one opportunity per (keyword, engine).
///
/// Trend rules win over position rules: an urgent decline first, then a
/// strong rise, then closeness to the first page or the top three.
fn classify(
    rank: u32,
    trend: Option<&Trend>,
    rules: &OpportunityRules,
) -> Option<(OpportunityKind, Priority, String)> {
    if let Some(t) = trend {
        if t.direction == TrendDirection::Down && t.change.abs() > rules.alert_threshold {
            return Some((
                OpportunityKind::UrgentDecline,
                Priority::Urgent,
                format!("dropped {} places to #{rank}, needs attention", t.change.abs()),
            ));
        }
        if t.direction == TrendDirection::Up && t.change > 3 {
            return Some((
                OpportunityKind::Underperforming,
                Priority::High,
                format!("rose {} places to #{rank}, keep optimizing", t.change),
            ));
        }
    }

    match rank {
        11..=15 => Some((
            OpportunityKind::Breakthrough,
            Priority::High,
            format!("#{rank}, close to the first page"),
        )),
        4..=6 => Some((
            OpportunityKind::TopThree,
            Priority::Medium,
            format!("#{rank}, close to the top three"),
        )),
        _ => None,
    }
}

/// Count of opportunities per keyword.
pub fn count_by_keyword(opportunities: &[Opportunity]) -> std::collections::BTreeMap<&str, usize> {
    let mut counts = std::collections::BTreeMap::new();
    for o in opportunities {
        *counts.entry(o.keyword.as_str()).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::trend_table;
    use chrono::{DateTime, Duration, Utc};
    use rankscout_shared::RankingSnapshot;

    fn snapshot(engine: &str, rank: u32, at: DateTime<Utc>) -> RankingSnapshot {
        RankingSnapshot {
            engine: engine.into(),
            rank,
            url: "https://q877220.github.io/repo-030/a.html".into(),
            title: "a".into(),
            page: (rank - 1) / 10 + 1,
            timestamp: at,
        }
    }

    fn stores() -> (KeywordStore, RankingStore) {
        let dir = std::env::temp_dir();
        (
            KeywordStore::empty(dir.join("kw-unused.json"), 100),
            RankingStore::empty(dir.join("rk-unused.json"), 365),
        )
    }

    fn evaluate(keywords: &KeywordStore, rankings: &RankingStore, now: DateTime<Utc>) -> Vec<Opportunity> {
        let trends = trend_table(rankings, now, 30);
        find_opportunities(keywords, rankings, &trends, &OpportunityRules::default())
    }

    #[test]
    fn rank_thirteen_is_one_breakthrough() {
        let now = Utc::now();
        let (mut keywords, mut rankings) = stores();
        keywords.upsert("电报", 8.0, "baidu-suggest", None, now);
        rankings.append("电报", snapshot("baidu", 13, now));

        let found = evaluate(&keywords, &rankings, now);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, OpportunityKind::Breakthrough);
        assert_eq!(found[0].priority, Priority::High);
        assert_eq!(found[0].engine.as_deref(), Some("baidu"));
        assert_eq!(found[0].current_rank, Some(13));
    }

    #[test]
    fn unranked_keyword_above_threshold_is_new() {
        let now = Utc::now();
        let (mut keywords, rankings) = stores();
        keywords.upsert("Telegram Bot下载", 9.0, "related-terms", None, now);
        keywords.upsert("电报群组大全", 12.0, "related-terms", None, now);
        keywords.upsert("tg", 4.9, "related-terms", None, now);

        let found = evaluate(&keywords, &rankings, now);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|o| o.kind == OpportunityKind::New && o.engine.is_none()));
        assert_eq!(found[0].keyword, "电报群组大全");
        assert_eq!(found[0].priority, Priority::High);
        assert_eq!(found[1].priority, Priority::Medium);
    }

    #[test]
    fn urgent_decline_overrides_other_kinds() {
        let now = Utc::now();
        let (mut keywords, mut rankings) = stores();
        keywords.upsert("tg频道", 6.0, "baidu-suggest", None, now);
        rankings.append("tg频道", snapshot("bing", 4, now - Duration::days(2)));
        rankings.append("tg频道", snapshot("bing", 12, now));

        let found = evaluate(&keywords, &rankings, now);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, OpportunityKind::UrgentDecline);
        assert_eq!(found[0].priority, Priority::Urgent);
    }

    #[test]
    fn decline_within_threshold_is_not_urgent() {
        let now = Utc::now();
        let (keywords, mut rankings) = stores();
        rankings.append("tg频道", snapshot("bing", 8, now - Duration::days(2)));
        rankings.append("tg频道", snapshot("bing", 13, now));

        let found = evaluate(&keywords, &rankings, now);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, OpportunityKind::Breakthrough);
        assert_eq!(found[0].keyword_score, 0.0);
    }

    #[test]
    fn rising_rank_takes_precedence_over_position() {
        let now = Utc::now();
        let (mut keywords, mut rankings) = stores();
        keywords.upsert("电报机器人", 10.0, "baidu-suggest", None, now);
        rankings.append("电报机器人", snapshot("google", 12, now - Duration::days(3)));
        rankings.append("电报机器人", snapshot("google", 5, now));

        let found = evaluate(&keywords, &rankings, now);
        let kinds: Vec<_> = found.iter().map(|o| (o.kind, o.priority)).collect();
        assert_eq!(kinds, vec![(OpportunityKind::Underperforming, Priority::High)]);
    }

    #[test]
    fn rising_into_breakthrough_range_is_one_opportunity() {
        let now = Utc::now();
        let (mut keywords, mut rankings) = stores();
        keywords.upsert("电报", 8.0, "baidu-suggest", None, now);
        rankings.append("电报", snapshot("baidu", 20, now - Duration::days(1)));
        rankings.append("电报", snapshot("baidu", 13, now));

        let found = evaluate(&keywords, &rankings, now);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, OpportunityKind::Underperforming);
        assert_eq!(found[0].current_rank, Some(13));
        assert_eq!(count_by_keyword(&found)["电报"], 1);
    }

    #[test]
    fn ordering_is_priority_then_score() {
        let now = Utc::now();
        let (mut keywords, mut rankings) = stores();
        keywords.upsert("a电报", 3.0, "s", None, now);
        keywords.upsert("b电报", 20.0, "s", None, now);
        keywords.upsert("c电报", 7.0, "s", None, now);
        rankings.append("a电报", snapshot("baidu", 12, now));
        rankings.append("b电报", snapshot("baidu", 5, now));
        rankings.append("c电报", snapshot("baidu", 14, now));

        let found = evaluate(&keywords, &rankings, now);
        let order: Vec<&str> = found.iter().map(|o| o.keyword.as_str()).collect();
        assert_eq!(order, vec!["c电报", "a电报", "b电报"]);

        assert_eq!(found, evaluate(&keywords, &rankings, now));
        assert_eq!(count_by_keyword(&found)["b电报"], 1);
    }
}
