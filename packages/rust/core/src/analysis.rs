//! Per-keyword analysis: category, language, estimated competition, ranking
//! tier and an overall score combining them.

use std::collections::BTreeMap;

use serde::Serialize;

use rankscout_shared::{KeywordRecord, Opportunity, Priority, RankingSnapshot, Script, round1};
use rankscout_storage::{KeywordStore, RankingStore};

use crate::opportunity::count_by_keyword;

// ---------------------------------------------------------------------------
// Category & language
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Brand,
    Product,
    Feature,
    Tutorial,
    Commercial,
    General,
}

const CATEGORY_TERMS: &[(Category, &[&str])] = &[
    (Category::Brand, &["telegram", "电报", "tg"]),
    (Category::Product, &["bot", "机器人", "频道", "群组", "channel", "group"]),
    (Category::Feature, &["下载", "download", "注册", "register", "使用", "use"]),
    (Category::Tutorial, &["教程", "tutorial", "怎么", "how", "如何"]),
    (Category::Commercial, &["官网", "最新", "免费", "free", "official", "latest"]),
];

impl Category {
    /// First category (in the order above) with a matching term.
    pub fn of(keyword: &str) -> Self {
        let lower = keyword.to_lowercase();
        CATEGORY_TERMS
            .iter()
            .find(|(_, terms)| terms.iter().any(|t| lower.contains(t)))
            .map_or(Self::General, |(category, _)| *category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Chinese,
    English,
    Mixed,
    Other,
}

impl From<Script> for Language {
    fn from(script: Script) -> Self {
        match script {
            Script::Chinese => Self::Chinese,
            Script::Latin => Self::English,
            Script::Mixed => Self::Mixed,
            Script::Other => Self::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// Competition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

impl CompetitionLevel {
    fn from_score(score: u8) -> Self {
        match score {
            8.. => Self::High,
            6..=7 => Self::Medium,
            4..=5 => Self::Low,
            _ => Self::VeryLow,
        }
    }

    /// Multiplier applied to the overall score.
    pub fn adjustment(self) -> f64 {
        match self {
            Self::VeryLow => 1.2,
            Self::Low => 1.1,
            Self::Medium => 1.0,
            Self::High => 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    VeryEasy,
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl Difficulty {
    fn from_score(score: u8) -> Self {
        match score {
            0..=2 => Self::VeryEasy,
            3..=4 => Self::Easy,
            5..=6 => Self::Medium,
            7..=8 => Self::Hard,
            _ => Self::VeryHard,
        }
    }
}

/// Heuristic competition estimate from the keyword's shape alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    /// 1..=10.
    pub score: u8,
    pub level: CompetitionLevel,
    pub difficulty: Difficulty,
    pub contains_brand: bool,
    pub is_commercial: bool,
    pub is_long_tail: bool,
}

impl Competition {
    pub fn estimate(keyword: &str) -> Self {
        let lower = keyword.to_lowercase();
        let length = keyword.chars().count();
        let contains_brand = ["telegram", "电报", "tg"].iter().any(|t| lower.contains(t));
        let is_commercial = ["下载", "官网", "最新", "免费"].iter().any(|t| lower.contains(t));
        let is_long_tail = length > 15 || keyword.split_whitespace().count() > 3;

        let mut score: i32 = 5;
        if contains_brand {
            score += 3;
        }
        if is_commercial {
            score += 2;
        }
        if is_long_tail {
            score -= 2;
        }
        if length <= 4 {
            score += 2;
        }
        let score = score.clamp(1, 10) as u8;

        Self {
            score,
            level: CompetitionLevel::from_score(score),
            difficulty: Difficulty::from_score(score),
            contains_brand,
            is_commercial,
            is_long_tail,
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingTier {
    Excellent,
    Good,
    Fair,
    Poor,
    Weak,
    #[serde(rename = "none")]
    Unranked,
}

impl RankingTier {
    pub fn of(rank: u32) -> Self {
        match rank {
            1..=3 => Self::Excellent,
            4..=10 => Self::Good,
            11..=20 => Self::Fair,
            21..=50 => Self::Poor,
            51..=100 => Self::Weak,
            _ => Self::Unranked,
        }
    }

    pub fn score(self) -> u32 {
        match self {
            Self::Excellent => 10,
            Self::Good => 7,
            Self::Fair => 5,
            Self::Poor => 3,
            Self::Weak => 1,
            Self::Unranked => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankDistribution {
    pub top3: usize,
    pub top10: usize,
    pub top20: usize,
    pub beyond20: usize,
}

impl RankDistribution {
    pub fn from_ranks(ranks: impl IntoIterator<Item = u32>) -> Self {
        let mut d = Self::default();
        for rank in ranks {
            if rank <= 3 {
                d.top3 += 1;
            }
            if rank <= 10 {
                d.top10 += 1;
            }
            if rank <= 20 {
                d.top20 += 1;
            } else {
                d.beyond20 += 1;
            }
        }
        d
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRank {
    pub engine: String,
    pub rank: u32,
    pub url: String,
    pub tier: RankingTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingAnalysis {
    pub engines: Vec<EngineRank>,
    pub best_rank: Option<u32>,
    pub average_rank: Option<u32>,
    /// Mean of the best-rank and average-rank tier scores, rounded.
    pub ranking_score: u32,
    pub distribution: RankDistribution,
}

impl RankingAnalysis {
    pub fn from_latest(latest: Option<&BTreeMap<String, RankingSnapshot>>) -> Self {
        let engines: Vec<EngineRank> = latest
            .into_iter()
            .flatten()
            .map(|(engine, s)| EngineRank {
                engine: engine.clone(),
                rank: s.rank,
                url: s.url.clone(),
                tier: RankingTier::of(s.rank),
            })
            .collect();

        let best_rank = engines.iter().map(|e| e.rank).min();
        let average_rank = (!engines.is_empty()).then(|| {
            let sum: u64 = engines.iter().map(|e| u64::from(e.rank)).sum();
            (sum as f64 / engines.len() as f64).round() as u32
        });
        let ranking_score = match (best_rank, average_rank) {
            (Some(best), Some(avg)) => {
                let total = RankingTier::of(best).score() + RankingTier::of(avg).score();
                (f64::from(total) / 2.0).round() as u32
            }
            _ => 0,
        };

        Self {
            distribution: RankDistribution::from_ranks(engines.iter().map(|e| e.rank)),
            engines,
            best_rank,
            average_rank,
            ranking_score,
        }
    }

    pub fn has_rankings(&self) -> bool {
        !self.engines.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Keyword analysis
// ---------------------------------------------------------------------------

/// Priority of a keyword for optimization work: its score plus a bonus
/// for an existing best rank within the first three pages.
pub fn keyword_priority(score: f64, best_rank: Option<u32>) -> Priority {
    let bonus = match best_rank {
        Some(r) if r <= 10 => 3.0,
        Some(r) if r <= 20 => 2.0,
        Some(r) if r <= 30 => 1.0,
        _ => 0.0,
    };
    match score + bonus {
        s if s >= 8.0 => Priority::High,
        s if s >= 5.0 => Priority::Medium,
        _ => Priority::Low,
    }
}

fn timeline(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent | Priority::High => "1-3 months",
        Priority::Medium => "3-6 months",
        Priority::Low => "6-12 months",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordAnalysis {
    pub keyword: String,
    pub score: f64,
    pub sources: Vec<String>,
    pub length: usize,
    pub language: Language,
    pub category: Category,
    pub ranking: RankingAnalysis,
    pub competition: Competition,
    pub opportunities: usize,
    pub priority: Priority,
    pub timeline: String,
    pub overall_score: f64,
}

pub fn analyze_keyword(
    keyword: &str,
    record: &KeywordRecord,
    latest: Option<&BTreeMap<String, RankingSnapshot>>,
    opportunities: usize,
) -> KeywordAnalysis {
    let ranking = RankingAnalysis::from_latest(latest);
    let competition = Competition::estimate(keyword);
    let priority = keyword_priority(record.score, ranking.best_rank);

    let mut overall = record.score * 0.3;
    if ranking.has_rankings() {
        overall += f64::from(ranking.ranking_score) * 0.4;
    }
    overall *= competition.level.adjustment();
    overall += opportunities as f64 * 0.5;

    KeywordAnalysis {
        keyword: keyword.to_string(),
        score: record.score,
        sources: record.sources.clone(),
        length: keyword.chars().count(),
        language: Script::detect(keyword).into(),
        category: Category::of(keyword),
        ranking,
        competition,
        opportunities,
        priority,
        timeline: timeline(priority).to_string(),
        overall_score: round1(overall),
    }
}

/// Analyze every stored keyword, best overall score first.
pub fn analyze_all(
    keywords: &KeywordStore,
    rankings: &RankingStore,
    opportunities: &[Opportunity],
) -> Vec<KeywordAnalysis> {
    let counts = count_by_keyword(opportunities);
    let mut analyses: Vec<KeywordAnalysis> = keywords
        .iter()
        .map(|(keyword, record)| {
            let count = counts.get(keyword.as_str()).copied().unwrap_or(0);
            analyze_keyword(keyword, record, rankings.latest(keyword), count)
        })
        .collect();
    analyses.sort_by(|a, b| {
        b.overall_score
            .total_cmp(&a.overall_score)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    analyses
}

pub fn category_distribution(analyses: &[KeywordAnalysis]) -> BTreeMap<Category, usize> {
    let mut counts = BTreeMap::new();
    for a in analyses {
        *counts.entry(a.category).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(engine: &str, rank: u32) -> RankingSnapshot {
        RankingSnapshot {
            engine: engine.into(),
            rank,
            url: format!("https://q877220.github.io/repo-030/{engine}.html"),
            title: "t".into(),
            page: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn categories_follow_term_order() {
        assert_eq!(Category::of("Telegram Bot"), Category::Brand);
        assert_eq!(Category::of("机器人下载"), Category::Product);
        assert_eq!(Category::of("下载教程"), Category::Feature);
        assert_eq!(Category::of("如何翻墙"), Category::Tutorial);
        assert_eq!(Category::of("最新导航"), Category::Commercial);
        assert_eq!(Category::of("导航"), Category::General);
    }

    #[test]
    fn competition_estimate() {
        // brand +3, commercial +2, short +2
        let c = Competition::estimate("电报下载");
        assert_eq!(c.score, 10);
        assert_eq!(c.level, CompetitionLevel::High);
        assert_eq!(c.difficulty, Difficulty::VeryHard);

        let c = Competition::estimate("how to create a channel quickly");
        assert!(c.is_long_tail);
        assert_eq!(c.score, 3);
        assert_eq!(c.level, CompetitionLevel::VeryLow);
        assert_eq!(c.difficulty, Difficulty::Easy);

        let c = Competition::estimate("频道推荐");
        assert_eq!(c.score, 7);
        assert_eq!(c.level, CompetitionLevel::Medium);
    }

    #[test]
    fn ranking_tiers_and_score() {
        assert_eq!(RankingTier::of(3), RankingTier::Excellent);
        assert_eq!(RankingTier::of(11), RankingTier::Fair);
        assert_eq!(RankingTier::of(101), RankingTier::Unranked);

        let latest: BTreeMap<String, RankingSnapshot> = [
            ("baidu".to_string(), snapshot("baidu", 2)),
            ("bing".to_string(), snapshot("bing", 14)),
        ]
        .into();
        let ranking = RankingAnalysis::from_latest(Some(&latest));
        assert_eq!(ranking.best_rank, Some(2));
        assert_eq!(ranking.average_rank, Some(8));
        // (10 + 7) / 2 = 8.5
        assert_eq!(ranking.ranking_score, 9);
        assert_eq!(ranking.distribution.top3, 1);
        assert_eq!(ranking.distribution.top20, 2);
        assert_eq!(ranking.distribution.beyond20, 0);

        let none = RankingAnalysis::from_latest(None);
        assert!(!none.has_rankings());
        assert_eq!(none.ranking_score, 0);
    }

    #[test]
    fn overall_score_combines_parts() {
        let record = KeywordRecord::new("电报下载", 19.0, "baidu-suggest", None, Utc::now());
        let latest: BTreeMap<String, RankingSnapshot> =
            [("baidu".to_string(), snapshot("baidu", 2))].into();

        let a = analyze_keyword("电报下载", &record, Some(&latest), 1);
        // (19 * 0.3 + 10 * 0.4) * 0.9 + 0.5 = 9.23
        assert_eq!(a.overall_score, 9.2);
        assert_eq!(a.language, Language::Chinese);
        assert_eq!(a.category, Category::Brand);
        assert_eq!(a.priority, Priority::High);
        assert_eq!(a.timeline, "1-3 months");
    }

    #[test]
    fn priority_bonus_from_best_rank() {
        assert_eq!(keyword_priority(4.0, None), Priority::Low);
        assert_eq!(keyword_priority(4.0, Some(25)), Priority::Medium);
        assert_eq!(keyword_priority(5.0, Some(9)), Priority::High);
    }
}
