//! Per-engine adapters and the shared result-block parser.

mod baidu;
mod bing;
mod google;
mod so360;

use scraper::{ElementRef, Html};
use url::Url;

use crate::descriptor::EngineDescriptor;

pub use baidu::BaiduAdapter;
pub use bing::BingAdapter;
pub use google::GoogleAdapter;
pub use so360::So360Adapter;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Engine-specific markup knowledge.
///
/// Locating result blocks is declarative (see [`EngineDescriptor`]); the
/// adapter only knows how each engine hides the real destination URL.
pub trait EngineAdapter: Send + Sync {
    /// Engine id this adapter serves.
    fn id(&self) -> &str;

    /// Destination URL of one result block, given its link element.
    fn destination(&self, _block: &ElementRef<'_>, link: &ElementRef<'_>) -> Option<String> {
        link.value()
            .attr("href")
            .map(|href| self.unwrap_redirect(href))
    }

    /// Recover the true destination from the engine's redirect wrapping.
    /// Links that are not wrapped come back unchanged.
    fn unwrap_redirect(&self, href: &str) -> String {
        href.to_string()
    }

    /// Search query restricting results to `domain`.
    fn site_query(&self, keyword: &str, domain: &str) -> String {
        format!("{keyword} site:{domain}")
    }
}

/// Look up the adapter for an engine id.
pub fn adapter_for(id: &str) -> Option<Box<dyn EngineAdapter>> {
    match id {
        "baidu" => Some(Box::new(BaiduAdapter)),
        "google" => Some(Box::new(GoogleAdapter)),
        "bing" => Some(Box::new(BingAdapter)),
        "so360" => Some(Box::new(So360Adapter)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// One organic result with a resolvable link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerpResult {
    /// 0-based position among the page's result blocks.
    pub position: usize,
    pub url: String,
    pub title: String,
}

/// Everything extracted from one SERP page.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Number of result blocks matched by the descriptor.
    pub blocks: usize,
    /// Blocks whose link could be resolved, in page order.
    pub results: Vec<SerpResult>,
}

/// Parse a SERP page with the descriptor's locators and the adapter's
/// destination rules.
pub fn parse_results(
    adapter: &dyn EngineAdapter,
    descriptor: &EngineDescriptor,
    html: &str,
) -> ParsedPage {
    let doc = Html::parse_document(html);
    let mut page = ParsedPage::default();

    for (position, block) in doc.select(&descriptor.result_selector).enumerate() {
        page.blocks += 1;

        let Some(link) = block.select(&descriptor.link_selector).next() else {
            continue;
        };
        let Some(url) = adapter.destination(&block, &link) else {
            continue;
        };

        let title = block
            .select(&descriptor.title_selector)
            .next()
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| element_text(&link));

        page.results.push(SerpResult {
            position,
            url,
            title,
        });
    }

    page
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decoded value of query parameter `key` in a possibly relative `href`.
pub(crate) fn query_value(href: &str, key: &str) -> Option<String> {
    let base = Url::parse("https://serp.invalid/").ok()?;
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Whether `value` looks like an absolute http(s) URL.
pub(crate) fn is_absolute_http(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
pub(crate) mod test_support {
    use rankscout_shared::AppConfig;

    use crate::descriptor::EngineDescriptor;

    pub fn fixture(name: &str) -> String {
        let path = format!("../../../fixtures/serp/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("fixture {path}: {e}"))
    }

    pub fn descriptor(id: &str) -> EngineDescriptor {
        let config = AppConfig::default();
        let engine = config
            .engines
            .iter()
            .find(|e| e.id == id)
            .expect("default engine");
        EngineDescriptor::compile(engine).expect("compile")
    }
}
