//! Google adapter. Result links may be wrapped as `/url?q=<destination>&sa=..`.

use super::{EngineAdapter, is_absolute_http, query_value};

pub struct GoogleAdapter;

impl EngineAdapter for GoogleAdapter {
    fn id(&self) -> &str {
        "google"
    }

    fn unwrap_redirect(&self, href: &str) -> String {
        let wrapped = href.starts_with("/url?") || href.contains("google.com/url?");
        if wrapped {
            for key in ["q", "url"] {
                if let Some(target) = query_value(href, key).filter(|t| is_absolute_http(t)) {
                    return target;
                }
            }
        }
        href.to_string()
    }
}
