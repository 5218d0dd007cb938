/// Decides whether a destination URL belongs to the monitored site.
///
/// The site is given as a URL that may carry a path prefix
/// (`https://user.github.io/repo`). Scheme and a leading `www.` are ignored
/// on both sides; the destination must start with the site and continue at
/// a path boundary.
#[derive(Debug, Clone)]
pub struct SiteMatcher {
    prefix: String,
}

impl SiteMatcher {
    pub fn new(site_url: &str) -> Self {
        Self {
            prefix: normalize(site_url).trim_end_matches('/').to_string(),
        }
    }

    /// Site without scheme, as used in `site:` restrictions.
    pub fn domain(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, url: &str) -> bool {
        if self.prefix.is_empty() {
            return false;
        }
        let candidate = normalize(url);
        match candidate.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
            None => false,
        }
    }
}

fn normalize(url: &str) -> String {
    let lower = url.trim().to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .or_else(|| lower.strip_prefix("//"))
        .unwrap_or(&lower);
    without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme)
        .to_string()
}
