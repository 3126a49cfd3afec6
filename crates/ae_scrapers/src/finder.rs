use std::sync::Arc;

use ae_core::{Error, Result, SearchProvider, SearchResult};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::utils::parse_url;

/// Hosts (optionally with a path prefix) that never hold article content.
pub const DENYLIST: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "twitter.com",
    "x.com",
    "facebook.com",
    "linkedin.com",
    "instagram.com",
    "pinterest.com",
    "reddit.com",
    "tiktok.com",
    "wikipedia.org",
    "amazon.com",
    "ebay.com",
    "google.com/maps",
];

/// Path fragments that mark an individual content page.
pub const ARTICLE_PATH_MARKERS: &[&str] =
    &["/blog/", "/article/", "/post/", "/news/", "/story/", "/content/"];

lazy_static! {
    static ref SLUG: Regex =
        Regex::new(r"/[a-z0-9]+(?:-[a-z0-9]+)+(?:\.html?)?/?$").expect("valid regex");
    static ref DATED_PATH: Regex = Regex::new(r"/\d{4}/\d{2}/").expect("valid regex");
}

#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Results requested from the provider, leaving room for filtering.
    pub search_limit: usize,
    /// Survivors returned to the caller.
    pub max_results: usize,
    /// A URL split on '/' into more than this many pieces counts as deep.
    pub deep_url_components: usize,
    pub denylist: Vec<String>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            search_limit: 10,
            max_results: 2,
            deep_url_components: 4,
            denylist: DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct ReferenceFinder {
    provider: Arc<dyn SearchProvider>,
    config: FinderConfig,
}

impl ReferenceFinder {
    pub fn new(provider: Arc<dyn SearchProvider>, config: FinderConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Searches for `query` and keeps the top results that look like articles, in provider order.
    pub async fn find(&self, query: &str) -> Result<Vec<SearchResult>> {
        let results = self
            .provider
            .search(query, self.config.search_limit)
            .await
            .map_err(|e| match e {
                Error::Search(_) => e,
                other => Error::Search(other.to_string()),
            })?;

        let total = results.len();
        let kept = self.filter(results);
        debug!(
            query,
            provider = self.provider.name(),
            total,
            kept = kept.len(),
            "Filtered search results"
        );
        Ok(kept)
    }

    pub fn filter(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        results
            .into_iter()
            .filter(|r| match parse_url(&r.link) {
                Ok(url) => !self.is_denied(&url) && self.looks_like_article(&r.link, &url),
                Err(_) => false,
            })
            .take(self.config.max_results)
            .collect()
    }

    fn is_denied(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let path = url.path().to_lowercase();

        self.config.denylist.iter().any(|entry| {
            let (domain, prefix) = match entry.split_once('/') {
                Some((domain, rest)) => (domain, Some(format!("/{}", rest))),
                None => (entry.as_str(), None),
            };
            let host_matches = host == domain || host.ends_with(&format!(".{}", domain));
            host_matches && prefix.map_or(true, |p| path.starts_with(&p))
        })
    }

    fn looks_like_article(&self, link: &str, url: &Url) -> bool {
        let path = url.path().to_lowercase();

        ARTICLE_PATH_MARKERS.iter().any(|m| path.contains(m))
            || SLUG.is_match(&path)
            || DATED_PATH.is_match(&path)
            || link.split('/').count() > self.config.deep_url_components
    }
}
