//! JSON run reports for the collection, monitoring and analysis stages.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use rankscout_shared::{AppConfig, KeywordRecord, Opportunity, Priority, Result, Script, round1};
use rankscout_storage::{CollectionStats, KeywordStore, MonitoringStats, RankingStore, write_json_atomic};

use crate::analysis::{Category, KeywordAnalysis, RankDistribution, category_distribution};
use crate::trend::{TrendSummary, TrendTable};

// ---------------------------------------------------------------------------
// Common
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub run_id: Uuid,
    pub report_type: String,
    pub started_at: DateTime<FixedOffset>,
    pub generated_at: DateTime<FixedOffset>,
    pub duration_secs: i64,
}

impl ReportMeta {
    fn new(report_type: &str, started: DateTime<Utc>, offset: FixedOffset) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::now_v7(),
            report_type: report_type.to_string(),
            started_at: started.with_timezone(&offset),
            generated_at: now.with_timezone(&offset),
            duration_secs: (now - started).num_seconds(),
        }
    }
}

/// Write `report` as `<dir>/<prefix>-<run id>.json` and return the path.
pub fn write_report<T: Serialize>(dir: &Path, prefix: &str, run_id: Uuid, report: &T) -> Result<PathBuf> {
    let path = dir.join(format!("{prefix}-{run_id}.json"));
    write_json_atomic(&path, report)?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopKeyword {
    pub keyword: String,
    #[serde(flatten)]
    pub record: KeywordRecord,
}

fn top_keywords(store: &KeywordStore, n: usize) -> Vec<TopKeyword> {
    store
        .top_n(n)
        .into_iter()
        .map(|(keyword, record)| TopKeyword {
            keyword: keyword.clone(),
            record: record.clone(),
        })
        .collect()
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 / total as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Collection report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub premium: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageDistribution {
    pub chinese: usize,
    pub english: usize,
    pub mixed: usize,
    pub other: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthDistribution {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordDistributions {
    pub average_score: f64,
    pub scores: ScoreDistribution,
    pub languages: LanguageDistribution,
    pub lengths: LengthDistribution,
}

impl KeywordDistributions {
    pub fn from_store(store: &KeywordStore) -> Self {
        let mut scores = ScoreDistribution::default();
        let mut languages = LanguageDistribution::default();
        let mut lengths = LengthDistribution::default();
        let mut total = 0.0;

        for (_, record) in store.iter() {
            total += record.score;
            match record.score {
                s if s >= 10.0 => scores.premium += 1,
                s if s >= 7.0 => scores.high += 1,
                s if s >= 4.0 => scores.medium += 1,
                _ => scores.low += 1,
            }
            match record.metadata.script {
                Script::Chinese => languages.chinese += 1,
                Script::Latin => languages.english += 1,
                Script::Mixed => languages.mixed += 1,
                Script::Other => languages.other += 1,
            }
            match record.metadata.length {
                0..=5 => lengths.short += 1,
                6..=10 => lengths.medium += 1,
                _ => lengths.long += 1,
            }
        }

        let average_score = if store.is_empty() {
            0.0
        } else {
            (total / store.len() as f64 * 100.0).round() / 100.0
        };
        Self {
            average_score,
            scores,
            languages,
            lengths,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub total_keywords: usize,
    pub new_keywords: usize,
    pub total_collected: usize,
    pub duplicates: usize,
    pub filtered: usize,
    pub irrelevant: usize,
    pub capacity_rejected: usize,
    pub quota_skipped: usize,
    pub errors: usize,
    pub seeds_processed: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceShare {
    pub source: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionReport {
    pub meta: ReportMeta,
    pub summary: CollectionSummary,
    pub sources: Vec<SourceShare>,
    pub top_keywords: Vec<TopKeyword>,
    pub analysis: KeywordDistributions,
    pub recommendations: Vec<String>,
    pub next_collection: DateTime<FixedOffset>,
    /// Store or ledger writes that failed during the run.
    pub persistence_errors: Vec<String>,
}

impl CollectionReport {
    pub fn build(config: &AppConfig, store: &KeywordStore, stats: &CollectionStats) -> Self {
        let offset = config.site.offset();
        let started = stats.started_at.unwrap_or_else(Utc::now);
        let meta = ReportMeta::new("keyword-collection", started, offset);
        let finished = stats.finished_at.unwrap_or_else(Utc::now);

        let sources = stats
            .by_source
            .iter()
            .map(|(source, &count)| SourceShare {
                source: source.clone(),
                count,
                percentage: percentage(count, stats.total_collected),
            })
            .collect();
        let analysis = KeywordDistributions::from_store(store);
        let recommendations = collection_recommendations(store.len(), &analysis.scores, stats);

        Self {
            meta,
            summary: CollectionSummary {
                total_keywords: store.len(),
                new_keywords: stats.new_keywords,
                total_collected: stats.total_collected,
                duplicates: stats.duplicates,
                filtered: stats.filtered,
                irrelevant: stats.irrelevant,
                capacity_rejected: stats.capacity_rejected,
                quota_skipped: stats.quota_skipped,
                errors: stats.errors,
                seeds_processed: stats.seeds_processed,
            },
            sources,
            top_keywords: top_keywords(store, 50),
            analysis,
            recommendations,
            next_collection: (finished + Duration::hours(config.collection.refresh_interval_hours))
                .with_timezone(&offset),
            persistence_errors: Vec::new(),
        }
    }
}

fn collection_recommendations(
    total: usize,
    scores: &ScoreDistribution,
    stats: &CollectionStats,
) -> Vec<String> {
    let mut out = Vec::new();
    let total_f = total as f64;
    if (scores.premium as f64) < total_f * 0.1 {
        out.push("collect more high-value keywords".to_string());
    }
    if scores.low as f64 > total_f * 0.3 {
        out.push("too many low-value keywords, tighten the filter rules".to_string());
    }
    if stats.errors > 0 {
        out.push("source errors occurred, check network connectivity and API limits".to_string());
    }
    if total < 1000 {
        out.push("keyword database is small, add more seed keywords".to_string());
    }
    if out.is_empty() {
        out.push("keyword collection is healthy".to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// Ranking report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingSummary {
    pub monitored_keywords: usize,
    pub total_rankings: usize,
    pub found: usize,
    pub not_found: usize,
    pub average_rank: f64,
    pub errors: usize,
    pub quota_skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSuccess {
    pub engine: String,
    pub checked: usize,
    pub found: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub keyword: String,
    pub engine: String,
    pub rank: u32,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingReport {
    pub meta: ReportMeta,
    pub summary: RankingSummary,
    pub engines: Vec<EngineSuccess>,
    pub top_rankings: Vec<RankingRow>,
    pub opportunities: Vec<Opportunity>,
    pub performance: RankDistribution,
    pub trends: TrendSummary,
    pub recommendations: Vec<String>,
    pub error_messages: Vec<String>,
    pub next_monitoring: DateTime<FixedOffset>,
    pub persistence_errors: Vec<String>,
}

impl RankingReport {
    pub fn build(
        config: &AppConfig,
        monitored: usize,
        rankings: &RankingStore,
        stats: &MonitoringStats,
        trends: &TrendTable,
        opportunities: &[Opportunity],
    ) -> Self {
        let offset = config.site.offset();
        let started = stats.started_at.unwrap_or_else(Utc::now);
        let finished = stats.finished_at.unwrap_or_else(Utc::now);
        let engine_name = |id: &str| {
            config
                .engines
                .iter()
                .find(|e| e.id == id)
                .map_or_else(|| id.to_string(), |e| e.name.clone())
        };

        let mut rows: Vec<RankingRow> = rankings
            .iter_latest()
            .flat_map(|(keyword, engines)| {
                engines.iter().map(move |(engine, s)| (keyword, engine, s))
            })
            .map(|(keyword, engine, s)| RankingRow {
                keyword: keyword.clone(),
                engine: engine_name(engine),
                rank: s.rank,
                url: s.url.clone(),
                title: s.title.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.keyword.cmp(&b.keyword)));

        let performance = RankDistribution::from_ranks(rows.iter().map(|r| r.rank));
        let average_rank = if rows.is_empty() {
            0.0
        } else {
            let sum: u64 = rows.iter().map(|r| u64::from(r.rank)).sum();
            (sum as f64 / rows.len() as f64 * 100.0).round() / 100.0
        };
        let total_rankings = rows.len();
        rows.truncate(20);

        let engines = stats
            .engines
            .iter()
            .map(|(id, counter)| EngineSuccess {
                engine: engine_name(id),
                checked: counter.checked,
                found: counter.found,
                success_rate: counter.success_rate(),
            })
            .collect();

        let recommendations = ranking_recommendations(monitored, &performance, stats, opportunities);

        Self {
            meta: ReportMeta::new("ranking-monitor", started, offset),
            summary: RankingSummary {
                monitored_keywords: monitored,
                total_rankings,
                found: stats.found,
                not_found: stats.not_found,
                average_rank,
                errors: stats.errors,
                quota_skipped: stats.quota_skipped,
            },
            engines,
            top_rankings: rows,
            opportunities: opportunities.iter().take(50).cloned().collect(),
            performance,
            trends: TrendSummary::from_table(trends),
            recommendations,
            error_messages: stats.error_messages.clone(),
            next_monitoring: (finished + Duration::hours(config.monitoring.recheck_interval_hours))
                .with_timezone(&offset),
            persistence_errors: Vec::new(),
        }
    }
}

fn ranking_recommendations(
    monitored: usize,
    performance: &RankDistribution,
    stats: &MonitoringStats,
    opportunities: &[Opportunity],
) -> Vec<String> {
    let count = |p: Priority| opportunities.iter().filter(|o| o.priority == p).count();
    let mut out = Vec::new();
    if count(Priority::Urgent) > 0 {
        out.push("urgent ranking drops found, optimize the affected pages now".to_string());
    }
    if (performance.top10 as f64) < monitored as f64 * 0.1 {
        out.push("few top-10 rankings, strengthen on-page SEO".to_string());
    }
    if stats.not_found > stats.found {
        out.push("most keywords are not ranked, improve content relevance".to_string());
    }
    if count(Priority::High) > 10 {
        out.push("many high-value opportunities, handle them first".to_string());
    }
    if out.is_empty() {
        out.push("ranking monitoring is healthy".to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// Analysis report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_keywords: usize,
    pub ranked_keywords: usize,
    pub opportunities: usize,
    pub average_overall_score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub meta: ReportMeta,
    pub summary: AnalysisSummary,
    pub categories: BTreeMap<Category, usize>,
    pub top_keywords: Vec<KeywordAnalysis>,
    pub opportunities: Vec<Opportunity>,
    pub keywords: Vec<KeywordAnalysis>,
    /// Store loads and saves that failed during the run.
    pub persistence_errors: Vec<String>,
}

impl AnalysisReport {
    pub fn build(
        config: &AppConfig,
        started: DateTime<Utc>,
        analyses: Vec<KeywordAnalysis>,
        opportunities: Vec<Opportunity>,
    ) -> Self {
        let average_overall_score = if analyses.is_empty() {
            0.0
        } else {
            round1(analyses.iter().map(|a| a.overall_score).sum::<f64>() / analyses.len() as f64)
        };
        Self {
            meta: ReportMeta::new("keyword-analysis", started, config.site.offset()),
            summary: AnalysisSummary {
                total_keywords: analyses.len(),
                ranked_keywords: analyses.iter().filter(|a| a.ranking.has_rankings()).count(),
                opportunities: opportunities.len(),
                average_overall_score,
            },
            categories: category_distribution(&analyses),
            top_keywords: analyses.iter().take(50).cloned().collect(),
            opportunities,
            keywords: analyses,
            persistence_errors: Vec::new(),
        }
    }
}
