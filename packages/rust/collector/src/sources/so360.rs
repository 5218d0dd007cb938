//! 360 Search suggestion endpoint.
//!
//! Response: JSON `{"result": [{"word": ".."}, ..]}`. Older responses list
//! plain strings instead of objects.

use url::Url;

use rankscout_shared::{RankScoutError, Result};

use super::jsonp_payload;

pub(super) fn request_url(endpoint: &Url, query: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("word", query)
        .append_pair("src", "chrome")
        .append_pair("from", "chrome");
    url
}

pub(super) fn parse(body: &str) -> Result<Vec<String>> {
    let trimmed = body.trim();
    // Some edges answer with a JSONP wrapper even without a callback parameter.
    let json = if trimmed.starts_with('{') {
        trimmed
    } else {
        jsonp_payload(trimmed).ok_or_else(|| RankScoutError::parse("360", "not a JSON object"))?
    };

    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| RankScoutError::parse("360", e.to_string()))?;

    let Some(items) = value.get("result").and_then(|r| r.as_array()) else {
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s.as_str()),
            other => other.get("word").and_then(|w| w.as_str()),
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
