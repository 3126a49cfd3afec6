use std::time::Duration;

use ae_core::{Error, Result, SearchProvider, SearchResult};
use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::fetcher::BROWSER_USER_AGENT;
use crate::utils::element_text;

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

lazy_static! {
    static ref RESULT: Selector = Selector::parse("div.result").expect("valid selector");
    static ref TITLE: Selector = Selector::parse("a.result__a").expect("valid selector");
    static ref SNIPPET: Selector = Selector::parse(".result__snippet").expect("valid selector");
}

/// Web search through DuckDuckGo's HTML endpoint. Needs no credential.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "DuckDuckGo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| Error::Search(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Search(format!("Search provider returned HTTP {}", status.as_u16())));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Search(format!("Failed to read search response: {}", e)))?;

        let results = parse_results(&html, limit);
        debug!(query, count = results.len(), "Parsed search results");
        Ok(results)
    }
}

/// Parses a DuckDuckGo HTML result page, skipping ads and entries without a usable link.
pub fn parse_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT)
        .filter(|block| {
            !block
                .value()
                .classes()
                .any(|c| c == "result--ad" || c == "result--no-result")
        })
        .filter_map(|block| {
            let anchor = block.select(&TITLE).next()?;
            let link = resolve_link(anchor.value().attr("href")?)?;
            let title = element_text(anchor);
            let snippet = block.select(&SNIPPET).next().map(element_text).unwrap_or_default();
            Some(SearchResult { title, link, snippet })
        })
        .take(limit)
        .collect()
}

/// Unwraps DuckDuckGo's `/l/?uddg=<target>` redirects and keeps only http(s) links.
fn resolve_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let url = Url::parse(&absolute).ok()?;
    let is_redirect = url
        .host_str()
        .map_or(false, |h| h.ends_with("duckduckgo.com"))
        && url.path().starts_with("/l/");

    let target = if is_redirect {
        let (_, target) = url.query_pairs().find(|(k, _)| k == "uddg")?;
        Url::parse(&target).ok()?
    } else {
        url
    };

    matches!(target.scheme(), "http" | "https").then(|| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
          <div class="result results_links result--ad">
            <a class="result__a" href="https://ads.example/buy">Sponsored</a>
          </div>
          <div class="result results_links web-result">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fblog.example.com%2Fblog%2Fchatbots-101&amp;rut=abc">
              Chatbots   101
            </a></h2>
            <a class="result__snippet">A beginner's guide to <b>chatbots</b>.</a>
          </div>
          <div class="result results_links web-result">
            <a class="result__a" href="https://news.example.org/2024/05/ai-support">AI Support</a>
          </div>
          <div class="result results_links web-result">
            <a class="result__a" href="javascript:void(0)">Broken</a>
          </div>
          <div class="result results_links web-result">
            <a class="result__a" href="https://third.example/post/x">Third</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results() {
        let results = parse_results(FIXTURE, 10);
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Chatbots 101");
        assert_eq!(results[0].link, "https://blog.example.com/blog/chatbots-101");
        assert_eq!(results[0].snippet, "A beginner's guide to chatbots.");

        assert_eq!(results[1].link, "https://news.example.org/2024/05/ai-support");
        assert_eq!(results[1].snippet, "");
        assert_eq!(results[2].title, "Third");
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let results = parse_results(FIXTURE, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].title, "AI Support");
    }

    #[test]
    fn test_parse_results_on_garbage() {
        assert!(parse_results("<html><p>no results</p>", 10).is_empty());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("/l/?uddg=https%3A%2F%2Fa.example%2Fx").as_deref(),
            Some("https://a.example/x")
        );
        assert_eq!(resolve_link("https://a.example/y").as_deref(), Some("https://a.example/y"));
        assert_eq!(resolve_link("mailto:someone@example.com"), None);
        assert_eq!(resolve_link("//duckduckgo.com/l/?rut=abc"), None);
    }
}
