//! Client identity rotation for outbound requests.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Browser identity strings rotated across requests.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
];

/// Round-robin over [`USER_AGENTS`]. Safe to share between tasks.
#[derive(Debug, Default)]
pub struct UserAgentRotator {
    next: AtomicUsize,
}

impl UserAgentRotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity string for the next request.
    pub fn next_agent(&self) -> &'static str {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        USER_AGENTS[i % USER_AGENTS.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_and_wraps() {
        let rotator = UserAgentRotator::new();
        let first = rotator.next_agent();
        let second = rotator.next_agent();
        assert_ne!(first, second);

        for _ in 0..USER_AGENTS.len() - 2 {
            rotator.next_agent();
        }
        assert_eq!(rotator.next_agent(), first);
    }
}
