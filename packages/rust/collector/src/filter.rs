//! Candidate filtering: length bounds, banned patterns, blacklist and the
//! domain-term relevance gate.

use regex::Regex;

use rankscout_shared::{FilterConfig, RankScoutError, Result};

/// Why a candidate was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Length(usize),
    BannedPattern(String),
    Blacklisted(String),
}

/// Verdict for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Accepted,
    /// Rejected outright; never stored whatever else it matches.
    Rejected(Rejection),
    /// Clean but contains no domain term.
    Irrelevant,
}

#[derive(Debug, Clone)]
pub struct KeywordFilter {
    min_length: usize,
    max_length: usize,
    banned: Vec<Regex>,
    blacklist: Vec<String>,
    must_contain: Vec<String>,
}

impl KeywordFilter {
    /// Compile the configured rules.
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let banned = config
            .banned_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    RankScoutError::config(format!("invalid banned pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let lower = |terms: &[String]| -> Vec<String> {
            terms.iter().map(|t| t.to_lowercase()).collect()
        };

        Ok(Self {
            min_length: config.min_length,
            max_length: config.max_length,
            banned,
            blacklist: lower(&config.blacklist),
            must_contain: lower(&config.must_contain),
        })
    }

    pub fn check(&self, candidate: &str) -> FilterOutcome {
        let keyword = candidate.trim();

        let length = keyword.chars().count();
        if length < self.min_length || length > self.max_length {
            return FilterOutcome::Rejected(Rejection::Length(length));
        }

        if let Some(re) = self.banned.iter().find(|re| re.is_match(keyword)) {
            return FilterOutcome::Rejected(Rejection::BannedPattern(re.as_str().to_string()));
        }

        let lower = keyword.to_lowercase();
        if let Some(term) = self.blacklist.iter().find(|t| lower.contains(t.as_str())) {
            return FilterOutcome::Rejected(Rejection::Blacklisted(term.clone()));
        }

        if self.must_contain.iter().any(|t| lower.contains(t.as_str())) {
            FilterOutcome::Accepted
        } else {
            FilterOutcome::Irrelevant
        }
    }
}
