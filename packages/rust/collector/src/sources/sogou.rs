//! Sogou suggestion endpoint.
//!
//! Response: JSONP `window.sogou.sug(["query", ["..", ..], ..], -1);`.

use url::Url;

use rankscout_shared::{RankScoutError, Result};

use super::{jsonp_payload, string_items};

pub(super) fn request_url(endpoint: &Url, query: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("key", query)
        .append_pair("type", "web")
        .append_pair("ori", "cluster")
        .append_pair("n", "10");
    url
}

pub(super) fn parse(body: &str) -> Result<Vec<String>> {
    let payload = jsonp_payload(body)
        .ok_or_else(|| RankScoutError::parse("sogou", "missing JSONP wrapper"))?;

    // The call may carry trailing arguments; wrapping turns them into one array.
    let args: Vec<serde_json::Value> = serde_json::from_str(&format!("[{payload}]"))
        .map_err(|e| RankScoutError::parse("sogou", e.to_string()))?;

    let suggestions = args
        .first()
        .and_then(|first| first.as_array())
        .and_then(|data| data.get(1))
        .and_then(|list| list.as_array())
        .ok_or_else(|| RankScoutError::parse("sogou", "unexpected payload shape"))?;

    Ok(string_items(suggestions))
}
