//! Heuristic keyword scoring.

use rankscout_shared::{ScoringConfig, round1};

#[derive(Debug, Clone)]
pub struct Scorer {
    core_terms: Vec<String>,
    commercial_terms: Vec<String>,
}

impl Scorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            core_terms: distinct_lowercase(&config.core_terms),
            commercial_terms: distinct_lowercase(&config.commercial_terms),
        }
    }

    /// Score a keyword produced by a source with the given weight.
    ///
    /// Base 1; +2 for 3–8 characters, +1 for 9–15; +3 per core term present;
    /// the total so far is multiplied by `weight`; then +1 per commercial
    /// term present. Rounded to one decimal.
    pub fn score(&self, keyword: &str, weight: f64) -> f64 {
        let keyword = keyword.trim();
        let lower = keyword.to_lowercase();
        let length = keyword.chars().count();

        let mut score = 1.0;
        match length {
            3..=8 => score += 2.0,
            9..=15 => score += 1.0,
            _ => {}
        }

        let core_hits = self.core_terms.iter().filter(|t| lower.contains(t.as_str())).count();
        score += 3.0 * core_hits as f64;

        score *= weight;

        let commercial_hits = self
            .commercial_terms
            .iter()
            .filter(|t| lower.contains(t.as_str()))
            .count();
        score += commercial_hits as f64;

        round1(score)
    }
}

fn distinct_lowercase(terms: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}
