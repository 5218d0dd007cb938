//! Application configuration for RankScout.
//!
//! User config lives at `~/.rankscout/rankscout.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RankScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "rankscout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".rankscout";

/// Placeholder substituted by the template expander.
pub const KEYWORD_PLACEHOLDER: &str = "{keyword}";

// ---------------------------------------------------------------------------
// Config structs (matching rankscout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The monitored site.
    #[serde(default)]
    pub site: SiteConfig,

    /// Where stores and reports live.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Keyword discovery.
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Candidate filtering rules.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Heuristic scoring terms.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Ranking monitor pacing and retention.
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// Trend and opportunity thresholds.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Search engine descriptors.
    #[serde(default = "default_engines")]
    pub engines: Vec<EngineConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            paths: PathsConfig::default(),
            collection: CollectionConfig::default(),
            filters: FilterConfig::default(),
            scoring: ScoringConfig::default(),
            monitoring: MonitoringConfig::default(),
            analysis: AnalysisConfig::default(),
            engines: default_engines(),
        }
    }
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public URL of the monitored site (scheme optional in matching).
    #[serde(default = "default_site_url")]
    pub url: String,

    /// Offset of the site's local timezone from UTC, used for daily quotas.
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset_hours: i32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: default_site_url(),
            timezone_offset_hours: default_timezone_offset(),
        }
    }
}

impl SiteConfig {
    /// Site URL without scheme and trailing slash, e.g. `example.github.io/repo`.
    pub fn domain(&self) -> String {
        self.url
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string()
    }

    /// Local timezone as a fixed offset (falls back to UTC when out of range).
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone_offset_hours * 3600).unwrap_or(Utc.fix())
    }
}

fn default_site_url() -> String {
    "https://q877220.github.io/repo-030".into()
}
fn default_timezone_offset() -> i32 {
    8
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the keyword database, ranking history and quota ledger.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory where JSON run reports are written.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            reports_dir: default_reports_dir(),
        }
    }
}

impl PathsConfig {
    pub fn keywords_file(&self) -> PathBuf {
        Path::new(&self.data_dir)
            .join("keywords")
            .join("keywords-database.json")
    }

    pub fn rankings_file(&self) -> PathBuf {
        Path::new(&self.data_dir)
            .join("rankings")
            .join("ranking-history.json")
    }

    pub fn quota_file(&self) -> PathBuf {
        Path::new(&self.data_dir).join("quota-ledger.json")
    }

    pub fn reports_dir(&self) -> PathBuf {
        PathBuf::from(&self.reports_dir)
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_reports_dir() -> String {
    "reports".into()
}

/// `[collection]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Pause after every N seeds.
    #[serde(default = "default_batch_pause_every")]
    pub batch_pause_every: usize,

    /// Length of that pause in ms.
    #[serde(default = "default_collection_pause_ms")]
    pub batch_pause_ms: u64,

    /// Maximum seeds processed per run.
    #[serde(default = "default_max_seeds")]
    pub max_seeds_per_run: usize,

    /// Keyword Store capacity; new keywords beyond it are refused.
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Timeout for each suggestion request.
    #[serde(default = "default_suggest_timeout")]
    pub request_timeout_secs: u64,

    /// Hours until the next scheduled collection (report only).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_hours: i64,

    /// Hand-curated seed phrases.
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,

    /// Template expansion.
    #[serde(default)]
    pub templates: TemplateConfig,

    /// External suggestion sources.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            batch_pause_every: default_batch_pause_every(),
            batch_pause_ms: default_collection_pause_ms(),
            max_seeds_per_run: default_max_seeds(),
            max_keywords: default_max_keywords(),
            request_timeout_secs: default_suggest_timeout(),
            refresh_interval_hours: default_refresh_interval(),
            seeds: default_seeds(),
            templates: TemplateConfig::default(),
            sources: default_sources(),
        }
    }
}

fn default_batch_pause_every() -> usize {
    10
}
fn default_collection_pause_ms() -> u64 {
    2000
}
fn default_max_seeds() -> usize {
    5000
}
fn default_max_keywords() -> usize {
    50_000
}
fn default_suggest_timeout() -> u64 {
    10
}
fn default_refresh_interval() -> i64 {
    24
}

fn default_seeds() -> Vec<String> {
    [
        "Telegram", "电报", "TG", "Telegram Bot", "Telegram频道", "Telegram群组",
        "电报机器人", "电报频道", "电报群组", "TG机器人", "TG频道", "TG群组",
        "Telegram下载", "Telegram客户端", "Telegram网页版", "Telegram桌面版",
        "电报下载", "电报客户端", "电报网页版", "电报桌面版",
        "Telegram API", "Telegram SDK", "Telegram开发", "Bot开发",
        "电报API", "电报SDK", "电报开发", "机器人开发",
        "Telegram导航", "Telegram资源", "Telegram工具", "Telegram主题",
        "电报导航", "电报资源", "电报工具", "电报主题",
        "Telegram使用教程", "Telegram注册方法", "Telegram汉化包",
        "电报使用教程", "电报注册方法", "电报汉化包",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Which wire format a suggestion source speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Baidu,
    So360,
    Sogou,
}

/// `[[collection.sources]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Identifier recorded in keyword provenance (e.g. `baidu-suggest`).
    pub id: String,
    /// Wire format.
    pub kind: SourceKind,
    /// Suggestion endpoint.
    pub endpoint: String,
    /// Score multiplier for keywords produced by this source.
    pub weight: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Requests allowed per local day.
    pub daily_limit: u32,
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            id: "baidu-suggest".into(),
            kind: SourceKind::Baidu,
            endpoint: "https://suggestion.baidu.com/su".into(),
            weight: 3.0,
            enabled: true,
            daily_limit: 1000,
        },
        SourceConfig {
            id: "360-suggest".into(),
            kind: SourceKind::So360,
            endpoint: "https://sug.so.360.cn/suggest".into(),
            weight: 2.0,
            enabled: true,
            daily_limit: 500,
        },
        SourceConfig {
            id: "sogou-suggest".into(),
            kind: SourceKind::Sogou,
            endpoint: "https://pb.sogou.com/suggestions.jsp".into(),
            weight: 2.0,
            enabled: true,
            daily_limit: 500,
        },
    ]
}

/// `[collection.templates]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Source id recorded for expanded keywords.
    #[serde(default = "default_template_source_id")]
    pub source_id: String,

    /// Score multiplier for expanded keywords.
    #[serde(default = "default_template_weight")]
    pub weight: f64,

    /// Patterns containing the `{keyword}` placeholder.
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_id: default_template_source_id(),
            weight: default_template_weight(),
            patterns: default_patterns(),
        }
    }
}

fn default_template_source_id() -> String {
    "related-terms".into()
}
fn default_template_weight() -> f64 {
    1.0
}

fn default_patterns() -> Vec<String> {
    [
        "{keyword}教程", "{keyword}下载", "{keyword}使用",
        "{keyword}注册", "{keyword}安装", "{keyword}配置",
        "{keyword}官网", "{keyword}中文版", "{keyword}汉化",
        "如何使用{keyword}", "{keyword}怎么用", "{keyword}是什么",
        "{keyword}最新版", "{keyword}破解版", "{keyword}免费",
        "{keyword}推荐", "{keyword}大全", "{keyword}合集",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// `[filters]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Regexes; a match rejects the candidate.
    #[serde(default = "default_banned_patterns")]
    pub banned_patterns: Vec<String>,

    /// Case-insensitive substrings that always reject.
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,

    /// Case-insensitive substrings; at least one must be present.
    #[serde(default = "default_must_contain")]
    pub must_contain: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            banned_patterns: default_banned_patterns(),
            blacklist: default_blacklist(),
            must_contain: default_must_contain(),
        }
    }
}

fn default_min_length() -> usize {
    2
}
fn default_max_length() -> usize {
    50
}

fn default_banned_patterns() -> Vec<String> {
    [
        r"^[0-9]+$",
        r"^[a-zA-Z]$",
        r"(?i)porn|sex|adult",
        r"(?i)illegal|hack|crack",
        r"^\s*$",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_blacklist() -> Vec<String> {
    ["色情", "赌博", "毒品", "暴力", "非法"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_must_contain() -> Vec<String> {
    ["telegram", "电报", "tg", "bot", "机器人", "频道", "群组", "导航"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// `[scoring]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Each distinct term present adds 3 (before the source multiplier).
    #[serde(default = "default_core_terms")]
    pub core_terms: Vec<String>,

    /// Each distinct term present adds 1 (after the source multiplier).
    #[serde(default = "default_commercial_terms")]
    pub commercial_terms: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            core_terms: default_core_terms(),
            commercial_terms: default_commercial_terms(),
        }
    }
}

fn default_core_terms() -> Vec<String> {
    ["telegram", "电报", "tg", "bot", "机器人", "频道", "群组"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_commercial_terms() -> Vec<String> {
    [
        "下载", "注册", "教程", "使用", "官网", "最新", "免费",
        "download", "register", "tutorial",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// `[[engines]]` entry: a declarative search engine descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine id; selects the adapter (`baidu`, `google`, `bing`, `so360`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Search endpoint.
    pub search_url: String,
    /// Query-string parameter carrying the query.
    pub query_param: String,
    /// Query-string parameter carrying the result offset.
    pub offset_param: String,
    /// CSS selector for one organic result block.
    pub result_selector: String,
    /// CSS selector for the result link inside a block.
    pub link_selector: String,
    /// CSS selector for the result title inside a block.
    pub title_selector: String,
    /// Deepest SERP page scanned.
    pub max_pages: u32,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keyword checks allowed per local day.
    pub daily_limit: u32,
}

fn default_results_per_page() -> u32 {
    10
}

fn default_engines() -> Vec<EngineConfig> {
    let engine = |id: &str,
                  name: &str,
                  search_url: &str,
                  query_param: &str,
                  offset_param: &str,
                  selectors: [&str; 3],
                  max_pages: u32,
                  daily_limit: u32| EngineConfig {
        id: id.into(),
        name: name.into(),
        search_url: search_url.into(),
        query_param: query_param.into(),
        offset_param: offset_param.into(),
        result_selector: selectors[0].into(),
        link_selector: selectors[1].into(),
        title_selector: selectors[2].into(),
        max_pages,
        results_per_page: default_results_per_page(),
        enabled: true,
        daily_limit,
    };

    vec![
        engine(
            "baidu",
            "Baidu",
            "https://www.baidu.com/s",
            "wd",
            "pn",
            [".result.c-container", "h3 a", "h3 a"],
            5,
            1000,
        ),
        engine(
            "google",
            "Google",
            "https://www.google.com/search",
            "q",
            "start",
            [".g", "h3 a", "h3"],
            3,
            500,
        ),
        engine(
            "bing",
            "Bing",
            "https://www.bing.com/search",
            "q",
            "first",
            [".b_algo", "h2 a", "h2 a"],
            3,
            500,
        ),
        engine(
            "so360",
            "360 Search",
            "https://www.so.com/s",
            "q",
            "pn",
            [".result", "h3 a", "h3 a"],
            3,
            300,
        ),
    ]
}

/// `[monitoring]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Number of highest-scored keywords monitored per run.
    #[serde(default = "default_top_keywords")]
    pub top_keywords: usize,

    /// Keywords per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches in ms.
    #[serde(default = "default_monitor_pause_ms")]
    pub batch_pause_ms: u64,

    /// Minimum gap between two page requests to the same engine, in ms.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Timeout for each SERP request.
    #[serde(default = "default_serp_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum retained snapshots per (keyword, engine).
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Check engines for one keyword concurrently (each keeps its own pacing).
    #[serde(default)]
    pub parallel_engines: bool,

    /// Hours until the next scheduled monitoring run (report only).
    #[serde(default = "default_refresh_interval")]
    pub recheck_interval_hours: i64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            top_keywords: default_top_keywords(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_monitor_pause_ms(),
            request_delay_ms: default_request_delay(),
            request_timeout_secs: default_serp_timeout(),
            history_cap: default_history_cap(),
            parallel_engines: false,
            recheck_interval_hours: default_refresh_interval(),
        }
    }
}

fn default_top_keywords() -> usize {
    200
}
fn default_batch_size() -> usize {
    10
}
fn default_monitor_pause_ms() -> u64 {
    5000
}
fn default_request_delay() -> u64 {
    3000
}
fn default_serp_timeout() -> u64 {
    30
}
fn default_history_cap() -> usize {
    365
}

/// `[analysis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Trend window in days.
    #[serde(default = "default_trend_days")]
    pub trend_days: i64,

    /// A drop of more than this many places is urgent.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: i64,

    /// Unranked keywords at or above this score become `new` opportunities.
    #[serde(default = "default_new_min_score")]
    pub new_keyword_min_score: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trend_days: default_trend_days(),
            alert_threshold: default_alert_threshold(),
            new_keyword_min_score: default_new_min_score(),
        }
    }
}

fn default_trend_days() -> i64 {
    30
}
fn default_alert_threshold() -> i64 {
    5
}
fn default_new_min_score() -> f64 {
    5.0
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Check everything that can be checked without the engine adapters
    /// (selectors are validated when the engine registry is built).
    pub fn validate(&self) -> Result<()> {
        if self.site.domain().is_empty() {
            return Err(RankScoutError::config("site.url must not be empty"));
        }

        let filters = &self.filters;
        if filters.min_length > filters.max_length {
            return Err(RankScoutError::config(format!(
                "filters.min_length ({}) exceeds filters.max_length ({})",
                filters.min_length, filters.max_length
            )));
        }
        for pattern in &filters.banned_patterns {
            regex::Regex::new(pattern).map_err(|e| {
                RankScoutError::config(format!("invalid banned pattern '{pattern}': {e}"))
            })?;
        }

        let mut source_ids = HashSet::new();
        for source in &self.collection.sources {
            Url::parse(&source.endpoint).map_err(|e| {
                RankScoutError::config(format!(
                    "source '{}' has invalid endpoint '{}': {e}",
                    source.id, source.endpoint
                ))
            })?;
            if !source_ids.insert(source.id.as_str()) {
                return Err(RankScoutError::config(format!(
                    "duplicate source id '{}'",
                    source.id
                )));
            }
        }
        if source_ids.contains(self.collection.templates.source_id.as_str()) {
            return Err(RankScoutError::config(format!(
                "template source id '{}' collides with a suggestion source",
                self.collection.templates.source_id
            )));
        }
        for pattern in &self.collection.templates.patterns {
            if !pattern.contains(KEYWORD_PLACEHOLDER) {
                return Err(RankScoutError::config(format!(
                    "template pattern '{pattern}' has no {KEYWORD_PLACEHOLDER} placeholder"
                )));
            }
        }

        let mut engine_ids = HashSet::new();
        for engine in &self.engines {
            Url::parse(&engine.search_url).map_err(|e| {
                RankScoutError::config(format!(
                    "engine '{}' has invalid search_url '{}': {e}",
                    engine.id, engine.search_url
                ))
            })?;
            if engine.max_pages == 0 || engine.results_per_page == 0 {
                return Err(RankScoutError::config(format!(
                    "engine '{}' needs max_pages and results_per_page >= 1",
                    engine.id
                )));
            }
            if !engine_ids.insert(engine.id.as_str()) {
                return Err(RankScoutError::config(format!(
                    "duplicate engine id '{}'",
                    engine.id
                )));
            }
        }

        if self.monitoring.history_cap == 0 {
            return Err(RankScoutError::config("monitoring.history_cap must be >= 1"));
        }

        Ok(())
    }

    /// Enabled engine descriptors, in configuration order.
    pub fn enabled_engines(&self) -> impl Iterator<Item = &EngineConfig> {
        self.engines.iter().filter(|e| e.enabled)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.rankscout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RankScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.rankscout/rankscout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path and validate it.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RankScoutError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        RankScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Write the default configuration to `path`, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| RankScoutError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| RankScoutError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| RankScoutError::io(path, e))?;
    tracing::info!(?path, "created default config file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("baidu-suggest"));
        assert!(toml_str.contains("[[engines]]"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.monitoring.history_cap, 365);
        assert_eq!(parsed.engines.len(), 4);
        assert_eq!(parsed.collection.templates.patterns.len(), 18);
        parsed.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[site]
url = "https://docs.example.com/"

[analysis]
trend_days = 14
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.site.domain(), "docs.example.com");
        assert_eq!(config.analysis.trend_days, 14);
        assert_eq!(config.analysis.alert_threshold, 5);
        assert_eq!(config.engines.len(), 4);
        assert_eq!(config.collection.sources.len(), 3);
    }

    #[test]
    fn rejects_bad_banned_pattern() {
        let mut config = AppConfig::default();
        config.filters.banned_patterns.push("(unclosed".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid banned pattern"));
    }

    #[test]
    fn rejects_duplicate_engine_ids() {
        let mut config = AppConfig::default();
        let dup = config.engines[0].clone();
        config.engines.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let mut config = AppConfig::default();
        config.collection.templates.patterns = vec!["教程".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn timezone_offset() {
        let site = SiteConfig::default();
        assert_eq!(site.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn store_paths_under_data_dir() {
        let paths = PathsConfig::default();
        assert!(paths.keywords_file().ends_with("keywords/keywords-database.json"));
        assert!(paths.rankings_file().ends_with("rankings/ranking-history.json"));
    }

    #[test]
    fn default_config_file_loads_back() {
        let path = std::env::temp_dir()
            .join(format!("rankscout-config-{}", std::process::id()))
            .join("rankscout.toml");
        write_default_config(&path).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.engines.len(), 4);
        assert_eq!(config.collection.seeds.len(), 42);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
