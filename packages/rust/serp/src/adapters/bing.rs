//! Bing adapter. Organic links point straight at the destination.

use super::EngineAdapter;

pub struct BingAdapter;

impl EngineAdapter for BingAdapter {
    fn id(&self) -> &str {
        "bing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::parse_results;
    use crate::adapters::test_support::{descriptor, fixture};

    #[test]
    fn parses_fixture() {
        let page = parse_results(&BingAdapter, &descriptor("bing"), &fixture("bing_page.html"));
        assert_eq!(page.blocks, 10);
        assert_eq!(page.results[1].position, 1);
        assert_eq!(page.results[1].url, "https://q877220.github.io/repo-030/bots/telegram-bot.html");
    }
}
