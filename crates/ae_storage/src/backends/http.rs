use std::time::Duration;

use ae_core::{Article, ArticleId, ArticleStore, Error, PublishedArticle, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

/// Every store response is wrapped in `{ success, ... }`.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    articles: Option<Vec<Article>>,
    #[serde(default)]
    article: Option<Article>,
    #[serde(default)]
    article_id: Option<ArticleId>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the external article CRUD API.
#[derive(Debug, Clone)]
pub struct HttpArticleStore {
    client: Client,
    base_url: String,
}

impl HttpArticleStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn article_url(&self, id: &ArticleId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Envelope> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::store(None, format!("Failed to {}: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::store(Some(status.as_u16()), format!("Failed to {}: {}", action, e)))?;
        debug!(action, status = status.as_u16(), bytes = body.len(), "Store responded");

        let envelope = serde_json::from_str::<Envelope>(&body);

        if !status.is_success() {
            let message = envelope
                .ok()
                .and_then(|e| e.error)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| format!("Failed to {}", action));
            return Err(Error::store(Some(status.as_u16()), message));
        }

        let envelope = envelope.map_err(|e| {
            Error::store(Some(status.as_u16()), format!("Invalid API response format: {}", e))
        })?;

        if !envelope.success {
            let message = envelope.error.unwrap_or_else(|| format!("Failed to {}", action));
            return Err(Error::store(Some(status.as_u16()), message));
        }

        Ok(envelope)
    }
}

#[async_trait]
impl ArticleStore for HttpArticleStore {
    async fn list_articles(&self) -> Result<Vec<Article>> {
        let envelope = self.send(self.client.get(&self.base_url), "fetch articles").await?;
        envelope
            .articles
            .ok_or_else(|| Error::store(None, "Invalid API response format: missing articles"))
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article> {
        let envelope = self.send(self.client.get(self.article_url(id)), "fetch article").await?;
        envelope
            .article
            .ok_or_else(|| Error::store(None, format!("Article {} not found", id)))
    }

    async fn publish_article(&self, article: &PublishedArticle) -> Result<Option<ArticleId>> {
        let envelope = self
            .send(self.client.post(&self.base_url).json(article), "publish article")
            .await?;
        Ok(envelope.article_id)
    }

    async fn update_article(&self, id: &ArticleId, article: &PublishedArticle) -> Result<()> {
        self.send(self.client.put(self.article_url(id)).json(article), "update article")
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parsing() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"success": true, "articles": [{"id": 1, "title": "A"}]}"#).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.articles.unwrap().len(), 1);

        let envelope: Envelope = serde_json::from_str(r#"{"success": true, "article_id": 12}"#).unwrap();
        assert_eq!(envelope.article_id, Some(ArticleId::Number(12)));

        let envelope: Envelope = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_urls() {
        let store = HttpArticleStore::new("http://localhost:5001/api/articles/", Duration::from_secs(1)).unwrap();
        assert_eq!(store.base_url(), "http://localhost:5001/api/articles");
        assert_eq!(
            store.article_url(&ArticleId::Number(4)),
            "http://localhost:5001/api/articles/4"
        );
    }
}
