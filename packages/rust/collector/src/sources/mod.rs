//! External suggestion sources.
//!
//! Each source turns a query into autocomplete-style suggestions. The wire
//! format of every provider lives in its own module so format drift stays
//! local and testable.

mod baidu;
mod so360;
mod sogou;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT};
use tracing::debug;
use url::Url;

use rankscout_shared::{
    CollectionConfig, RankScoutError, Result, SourceConfig, SourceKind, UserAgentRotator,
};

/// A provider of query suggestions.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Identifier recorded in keyword provenance.
    fn id(&self) -> &str;

    /// Score multiplier for keywords produced by this source.
    fn weight(&self) -> f64;

    /// Requests allowed per local day.
    fn daily_limit(&self) -> u32;

    /// Fetch suggestions for `query`.
    async fn suggest(&self, query: &str) -> Result<Vec<String>>;
}

/// A suggestion source backed by one of the known HTTP endpoints.
pub struct HttpSuggestionSource {
    config: SourceConfig,
    endpoint: Url,
    client: Client,
    agents: Arc<UserAgentRotator>,
}

impl HttpSuggestionSource {
    pub fn new(config: SourceConfig, client: Client, agents: Arc<UserAgentRotator>) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            RankScoutError::config(format!("source '{}' endpoint: {e}", config.id))
        })?;
        Ok(Self {
            config,
            endpoint,
            client,
            agents,
        })
    }

    fn request_url(&self, query: &str) -> Url {
        match self.config.kind {
            SourceKind::Baidu => baidu::request_url(&self.endpoint, query),
            SourceKind::So360 => so360::request_url(&self.endpoint, query),
            SourceKind::Sogou => sogou::request_url(&self.endpoint, query),
        }
    }

    fn parse(&self, body: &str) -> Result<Vec<String>> {
        match self.config.kind {
            SourceKind::Baidu => baidu::parse(body),
            SourceKind::So360 => so360::parse(body),
            SourceKind::Sogou => sogou::parse(body),
        }
    }
}

#[async_trait]
impl SuggestionSource for HttpSuggestionSource {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn weight(&self) -> f64 {
        self.config.weight
    }

    fn daily_limit(&self) -> u32 {
        self.config.daily_limit
    }

    async fn suggest(&self, query: &str) -> Result<Vec<String>> {
        let url = self.request_url(query);
        let unavailable = |msg: String| RankScoutError::unavailable(&self.config.id, msg);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.agents.next_agent())
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.8,en;q=0.5")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| unavailable(e.to_string()))?;
        let suggestions = self
            .parse(&body)
            .map_err(|e| RankScoutError::parse(&self.config.id, e.to_string()))?;

        debug!(source = %self.config.id, query, count = suggestions.len(), "suggestions fetched");
        Ok(suggestions)
    }
}

/// Build the HTTP client shared by all suggestion sources.
pub fn build_client(config: &CollectionConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(3))
        .build()
        .map_err(|e| RankScoutError::config(format!("failed to build HTTP client: {e}")))
}

/// Build every enabled source from configuration.
pub fn build_sources(config: &CollectionConfig) -> Result<Vec<Box<dyn SuggestionSource>>> {
    let client = build_client(config)?;
    let agents = Arc::new(UserAgentRotator::new());

    config
        .sources
        .iter()
        .filter(|s| s.enabled)
        .map(|s| {
            HttpSuggestionSource::new(s.clone(), client.clone(), agents.clone())
                .map(|source| Box::new(source) as Box<dyn SuggestionSource>)
        })
        .collect()
}

/// Strip a JSONP callback wrapper: `callback( ... );` → ` ... `.
fn jsonp_payload(body: &str) -> Option<&str> {
    let body = body.trim().trim_end_matches(';').trim_end();
    let open = body.find('(')?;
    if !body.ends_with(')') {
        return None;
    }
    Some(&body[open + 1..body.len() - 1])
}

/// Collect the string elements of a JSON array, skipping anything else.
fn string_items(items: &[serde_json::Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
