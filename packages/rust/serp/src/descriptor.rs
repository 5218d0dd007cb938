use scraper::Selector;
use url::Url;

use rankscout_shared::{EngineConfig, RankScoutError, Result};

/// A compiled engine descriptor: parsed endpoint and CSS selectors.
#[derive(Debug, Clone)]
pub struct EngineDescriptor {
    pub id: String,
    pub name: String,
    pub search_url: Url,
    pub query_param: String,
    pub offset_param: String,
    pub result_selector: Selector,
    pub link_selector: Selector,
    pub title_selector: Selector,
    pub max_pages: u32,
    pub results_per_page: u32,
    pub daily_limit: u32,
}

impl EngineDescriptor {
    /// Validate and compile an `[[engines]]` entry.
    pub fn compile(config: &EngineConfig) -> Result<Self> {
        let search_url = Url::parse(&config.search_url).map_err(|e| {
            RankScoutError::config(format!("engine '{}' search_url: {e}", config.id))
        })?;

        let selector = |field: &str, css: &str| -> Result<Selector> {
            if css.trim().is_empty() {
                return Err(RankScoutError::config(format!(
                    "engine '{}' {field} is empty",
                    config.id
                )));
            }
            Selector::parse(css).map_err(|e| {
                RankScoutError::config(format!("engine '{}' {field} '{css}': {e}", config.id))
            })
        };

        if config.max_pages == 0 || config.results_per_page == 0 {
            return Err(RankScoutError::config(format!(
                "engine '{}' needs max_pages and results_per_page >= 1",
                config.id
            )));
        }

        Ok(Self {
            id: config.id.clone(),
            name: config.name.clone(),
            search_url,
            query_param: config.query_param.clone(),
            offset_param: config.offset_param.clone(),
            result_selector: selector("result_selector", &config.result_selector)?,
            link_selector: selector("link_selector", &config.link_selector)?,
            title_selector: selector("title_selector", &config.title_selector)?,
            max_pages: config.max_pages,
            results_per_page: config.results_per_page,
            daily_limit: config.daily_limit,
        })
    }

    /// URL of 1-based SERP `page` for `query`.
    pub fn page_url(&self, query: &str, page: u32) -> Url {
        let offset = (page.saturating_sub(1)) * self.results_per_page;
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.query_param, query)
            .append_pair(&self.offset_param, &offset.to_string());
        url
    }
}
