//! Deterministic template expansion of seed keywords.

use rankscout_shared::{FilterConfig, KEYWORD_PLACEHOLDER, TemplateConfig};

/// Substitutes a seed into `{keyword}` patterns. No I/O.
#[derive(Debug, Clone)]
pub struct TemplateExpander {
    patterns: Vec<String>,
    source_id: String,
    weight: f64,
    min_length: usize,
    max_length: usize,
}

impl TemplateExpander {
    pub fn new(templates: &TemplateConfig, filters: &FilterConfig) -> Self {
        let patterns = if templates.enabled {
            templates.patterns.clone()
        } else {
            Vec::new()
        };
        Self {
            patterns,
            source_id: templates.source_id.clone(),
            weight: templates.weight,
            min_length: filters.min_length,
            max_length: filters.max_length,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Expand `seed` through every pattern.
    ///
    /// Never yields the seed itself; every result is within the length bounds
    /// and appears once, in pattern order.
    pub fn expand(&self, seed: &str) -> Vec<String> {
        let seed = seed.trim();
        let mut out: Vec<String> = Vec::with_capacity(self.patterns.len());

        for pattern in &self.patterns {
            let candidate = pattern.replace(KEYWORD_PLACEHOLDER, seed).trim().to_string();
            let length = candidate.chars().count();
            if candidate == seed || length < self.min_length || length > self.max_length {
                continue;
            }
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankscout_shared::AppConfig;

    fn expander() -> TemplateExpander {
        let config = AppConfig::default();
        TemplateExpander::new(&config.collection.templates, &config.filters)
    }

    #[test]
    fn expands_seed_through_patterns() {
        let out = expander().expand("Telegram Bot");
        assert_eq!(out.len(), 18);
        assert_eq!(out[0], "Telegram Bot教程");
        assert!(out.contains(&"Telegram Bot下载".to_string()));
        assert!(out.contains(&"如何使用Telegram Bot".to_string()));
    }

    #[test]
    fn never_emits_seed_and_respects_length() {
        let config = AppConfig::default();
        let mut templates = config.collection.templates.clone();
        templates.patterns = vec!["{keyword}".into(), " {keyword} ".into(), "{keyword}教程".into()];
        let expander = TemplateExpander::new(&templates, &config.filters);

        let seed = "电报";
        let out = expander.expand(seed);
        assert_eq!(out, vec!["电报教程"]);

        let long_seed = "t".repeat(49);
        for candidate in expander.expand(&long_seed) {
            assert_ne!(candidate, long_seed);
            assert!(candidate.chars().count() <= 50);
        }
        assert!(expander.expand(&long_seed).is_empty());
    }

    #[test]
    fn disabled_templates_expand_nothing() {
        let config = AppConfig::default();
        let mut templates = config.collection.templates.clone();
        templates.enabled = false;
        assert!(TemplateExpander::new(&templates, &config.filters).expand("TG").is_empty());
    }
}
