//! Baidu adapter.
//!
//! Organic blocks carry the real destination in a `mu` attribute. The link
//! itself goes through `baidu.com/link?url=...`; when the `url` parameter is
//! a plain URL it is decoded, otherwise the opaque redirect is kept.

use scraper::ElementRef;

use super::{EngineAdapter, is_absolute_http, query_value};

pub struct BaiduAdapter;

impl EngineAdapter for BaiduAdapter {
    fn id(&self) -> &str {
        "baidu"
    }

    fn destination(&self, block: &ElementRef<'_>, link: &ElementRef<'_>) -> Option<String> {
        let mu = block
            .value()
            .attr("mu")
            .map(str::trim)
            .filter(|mu| is_absolute_http(mu));
        if let Some(mu) = mu {
            return Some(mu.to_string());
        }
        link.value().attr("href").map(|href| self.unwrap_redirect(href))
    }

    fn unwrap_redirect(&self, href: &str) -> String {
        if !href.contains("baidu.com/link?") {
            return href.to_string();
        }
        query_value(href, "url")
            .filter(|target| is_absolute_http(target))
            .unwrap_or_else(|| href.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::parse_results;
    use crate::adapters::test_support::{descriptor, fixture};

    #[test]
    fn reads_mu_attribute_and_skips_ads() {
        let page = parse_results(&BaiduAdapter, &descriptor("baidu"), &fixture("baidu_page1.html"));
        assert_eq!(page.blocks, 10);
        let hit = &page.results[6];
        assert_eq!(hit.position, 6);
        assert_eq!(hit.url, "https://q877220.github.io/repo-030/bots/telegram-bot.html");
        assert_eq!(hit.title, "结果 7 - Telegram Bot");
    }

    #[test]
    fn decodes_plain_link_redirect() {
        let page = parse_results(&BaiduAdapter, &descriptor("baidu"), &fixture("baidu_page2.html"));
        assert_eq!(page.results[2].url, "https://q877220.github.io/repo-030/bots/tg-channels.html");
    }

    #[test]
    fn opaque_redirect_is_kept() {
        let href = "http://www.baidu.com/link?url=Xk3Zp9TqL0aBcD";
        assert_eq!(BaiduAdapter.unwrap_redirect(href), href);
    }

    #[test]
    fn empty_page_has_no_blocks() {
        let page = parse_results(&BaiduAdapter, &descriptor("baidu"), &fixture("baidu_empty.html"));
        assert_eq!(page.blocks, 0);
        assert!(page.results.is_empty());
    }
}
