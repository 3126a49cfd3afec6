use async_trait::async_trait;
use crate::types::SearchResult;
use crate::Result;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` and return up to `limit` results in provider rank order
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Download the raw HTML behind `url`
    async fn fetch(&self, url: &str) -> Result<String>;
}
