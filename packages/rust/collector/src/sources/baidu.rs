//! Baidu suggestion endpoint.
//!
//! Response: JSONP `window.bdsug.sug({q:"..",p:false,s:["..", ..]});`. The
//! object literal usually has unquoted keys, so it is not always valid JSON.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use rankscout_shared::{RankScoutError, Result};

use super::{jsonp_payload, string_items};

pub(super) fn request_url(endpoint: &Url, query: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("wd", query)
        .append_pair("p", "3")
        .append_pair("ie", "utf-8")
        .append_pair("cb", "window.bdsug.sug");
    url
}

pub(super) fn parse(body: &str) -> Result<Vec<String>> {
    static S_ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?:^|[{,])\s*"?s"?\s*:\s*(\[[^\]]*\])"#).expect("valid regex")
    });

    let payload = jsonp_payload(body)
        .ok_or_else(|| RankScoutError::parse("baidu", "missing JSONP wrapper"))?;

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) {
        return match value.get("s").and_then(|s| s.as_array()) {
            Some(items) => Ok(string_items(items)),
            None => Ok(Vec::new()),
        };
    }

    let array = S_ARRAY_RE
        .captures(payload)
        .and_then(|c| c.get(1))
        .ok_or_else(|| RankScoutError::parse("baidu", "no suggestion array"))?;
    let items: Vec<serde_json::Value> = serde_json::from_str(array.as_str())
        .map_err(|e| RankScoutError::parse("baidu", e.to_string()))?;
    Ok(string_items(&items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unquoted_object_literal() {
        let body = r#"window.bdsug.sug({q:"tg",p:false,s:["tg下载","tg中文版"]});"#;
        assert_eq!(parse(body).unwrap(), vec!["tg下载", "tg中文版"]);
    }

    #[test]
    fn parses_strict_json() {
        let body = r#"window.bdsug({"q":"电报","s":["电报机器人"]})"#;
        assert_eq!(parse(body).unwrap(), vec!["电报机器人"]);
    }

    #[test]
    fn empty_suggestion_list() {
        let body = r#"window.bdsug.sug({q:"zzz",p:false,s:[]});"#;
        assert!(parse(body).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_jsonp() {
        assert!(parse("<html></html>").is_err());
    }

    #[test]
    fn query_is_encoded() {
        let endpoint = Url::parse("https://suggestion.baidu.com/su").unwrap();
        let url = request_url(&endpoint, "电报 bot");
        let wd = url.query_pairs().find(|(k, _)| k == "wd").map(|(_, v)| v.into_owned());
        assert_eq!(wd.as_deref(), Some("电报 bot"));
    }
}
