//! 360 Search adapter.
//!
//! Links go through `so.com/link?m=...`; the destination is exposed in a
//! `data-mdurl` attribute on the link (or the block). Some variants carry it
//! in a `url` query parameter instead.

use scraper::ElementRef;

use super::{EngineAdapter, is_absolute_http, query_value};

pub struct So360Adapter;

impl EngineAdapter for So360Adapter {
    fn id(&self) -> &str {
        "so360"
    }

    fn destination(&self, block: &ElementRef<'_>, link: &ElementRef<'_>) -> Option<String> {
        let mdurl = link
            .value()
            .attr("data-mdurl")
            .or_else(|| block.value().attr("data-mdurl"))
            .map(str::trim)
            .filter(|u| is_absolute_http(u));
        if let Some(url) = mdurl {
            return Some(url.to_string());
        }
        link.value().attr("href").map(|href| self.unwrap_redirect(href))
    }

    fn unwrap_redirect(&self, href: &str) -> String {
        if !href.contains("so.com/link?") {
            return href.to_string();
        }
        query_value(href, "url")
            .filter(|target| is_absolute_http(target))
            .unwrap_or_else(|| href.to_string())
    }
}
