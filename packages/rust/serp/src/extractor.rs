//! Best-rank lookup of the monitored site for one keyword on one engine.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA, USER_AGENT};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use rankscout_shared::{RankScoutError, Result, UserAgentRotator};

use crate::adapters::{EngineAdapter, parse_results};
use crate::descriptor::EngineDescriptor;
use crate::site::SiteMatcher;

/// Where the site was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerpHit {
    /// 1-based global rank: `(page - 1) * per_page + position + 1`.
    pub rank: u32,
    pub url: String,
    pub title: String,
    /// 1-based page.
    pub page: u32,
}

/// Queries one engine. Requests to the same engine are spaced by a fixed
/// delay, across keywords and across tasks sharing the extractor.
pub struct SerpExtractor {
    descriptor: EngineDescriptor,
    adapter: Box<dyn EngineAdapter>,
    client: Client,
    agents: Arc<UserAgentRotator>,
    site: SiteMatcher,
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl SerpExtractor {
    pub fn new(
        descriptor: EngineDescriptor,
        adapter: Box<dyn EngineAdapter>,
        client: Client,
        agents: Arc<UserAgentRotator>,
        site: SiteMatcher,
        delay: Duration,
    ) -> Self {
        Self {
            descriptor,
            adapter,
            client,
            agents,
            site,
            delay,
            last_request: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn daily_limit(&self) -> u32 {
        self.descriptor.daily_limit
    }

    pub fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    /// Scan up to `max_pages` pages and return the first match.
    ///
    /// Paging stops at the first page containing the site. `Ok(None)` means
    /// not found within the page budget. A transport failure on any page
    /// ends the attempt with an error.
    #[instrument(skip_all, fields(engine = %self.descriptor.id, keyword))]
    pub async fn find_rank(&self, keyword: &str) -> Result<Option<SerpHit>> {
        let query = self.adapter.site_query(keyword, self.site.domain());
        let per_page = self.descriptor.results_per_page;

        for page in 1..=self.descriptor.max_pages {
            let html = self.fetch_page(&query, page).await?;
            let parsed = parse_results(self.adapter.as_ref(), &self.descriptor, &html);

            let hit = parsed.results.iter().find(|r| self.site.matches(&r.url));
            if let Some(result) = hit {
                let rank = (page - 1) * per_page + result.position as u32 + 1;
                info!(rank, page, url = %result.url, "site found");
                return Ok(Some(SerpHit {
                    rank,
                    url: result.url.clone(),
                    title: result.title.clone(),
                    page,
                }));
            }

            if parsed.blocks == 0 {
                debug!(page, "no result blocks, stopping");
                break;
            }
        }

        debug!("site not found within page budget");
        Ok(None)
    }

    async fn fetch_page(&self, query: &str, page: u32) -> Result<String> {
        self.wait_turn().await;

        let url = self.descriptor.page_url(query, page);
        debug!(%url, page, "fetching SERP page");
        let unavailable = |msg: String| RankScoutError::unavailable(&self.descriptor.id, msg);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.agents.next_agent())
            .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "zh-CN,zh;q=0.8,en;q=0.5")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {status} on page {page}")));
        }

        response.text().await.map_err(|e| unavailable(e.to_string()))
    }

    /// Wait until `delay` has passed since this engine's previous request.
    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
