use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::info;

use rankscout_shared::{AppConfig, RankScoutError, Result, UserAgentRotator};

use crate::adapters::adapter_for;
use crate::descriptor::EngineDescriptor;
use crate::extractor::SerpExtractor;
use crate::site::SiteMatcher;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One ready-to-use extractor per enabled engine, in configuration order.
///
/// Building the registry validates every enabled engine: its descriptor must
/// compile and an adapter must exist for its id.
pub struct EngineRegistry {
    extractors: Vec<SerpExtractor>,
}

impl EngineRegistry {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.monitoring.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| RankScoutError::config(format!("failed to build HTTP client: {e}")))?;
        let delay = Duration::from_millis(config.monitoring.request_delay_ms);

        let mut extractors = Vec::new();
        for engine in config.enabled_engines() {
            let descriptor = EngineDescriptor::compile(engine)?;
            let adapter = adapter_for(&engine.id).ok_or_else(|| {
                RankScoutError::config(format!("no adapter registered for engine '{}'", engine.id))
            })?;
            extractors.push(SerpExtractor::new(
                descriptor,
                adapter,
                client.clone(),
                Arc::new(UserAgentRotator::new()),
                SiteMatcher::new(&config.site.url),
                delay,
            ));
        }

        info!(engines = extractors.len(), "engine registry ready");
        Ok(Self { extractors })
    }

    pub fn extractors(&self) -> &[SerpExtractor] {
        &self.extractors
    }

    pub fn get(&self, id: &str) -> Option<&SerpExtractor> {
        self.extractors.iter().find(|e| e.id() == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_enabled_engines_in_order() {
        let mut config = AppConfig::default();
        config.engines[1].enabled = false;
        let registry = EngineRegistry::from_config(&config).unwrap();
        assert_eq!(registry.ids(), vec!["baidu", "bing", "so360"]);
        assert!(registry.get("google").is_none());
    }

    #[test]
    fn unknown_engine_is_rejected_at_startup() {
        let mut config = AppConfig::default();
        let mut yandex = config.engines[0].clone();
        yandex.id = "yandex".into();
        config.engines.push(yandex);

        let err = EngineRegistry::from_config(&config).err().expect("error");
        assert!(err.to_string().contains("no adapter registered"));
    }

    #[test]
    fn invalid_selector_is_rejected_at_startup() {
        let mut config = AppConfig::default();
        config.engines[2].link_selector = "h2 a[".into();
        assert!(EngineRegistry::from_config(&config).is_err());
    }
}
