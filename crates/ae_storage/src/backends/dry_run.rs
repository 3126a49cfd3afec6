use std::sync::Arc;

use ae_core::{Article, ArticleId, ArticleStore, PublishedArticle, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// Reads from `source`, records writes locally instead of sending them.
pub struct DryRunStore {
    source: Arc<dyn ArticleStore>,
    published: RwLock<Vec<PublishedArticle>>,
    updated: RwLock<Vec<(ArticleId, PublishedArticle)>>,
}

impl DryRunStore {
    pub fn new(source: Arc<dyn ArticleStore>) -> Self {
        Self {
            source,
            published: RwLock::new(Vec::new()),
            updated: RwLock::new(Vec::new()),
        }
    }

    pub async fn published(&self) -> Vec<PublishedArticle> {
        self.published.read().await.clone()
    }

    pub async fn updated(&self) -> Vec<(ArticleId, PublishedArticle)> {
        self.updated.read().await.clone()
    }
}

#[async_trait]
impl ArticleStore for DryRunStore {
    async fn list_articles(&self) -> Result<Vec<Article>> {
        self.source.list_articles().await
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article> {
        self.source.get_article(id).await
    }

    async fn publish_article(&self, article: &PublishedArticle) -> Result<Option<ArticleId>> {
        info!(
            title = %article.title,
            url = %article.url,
            chars = article.content.chars().count(),
            "Dry run: would publish article"
        );
        self.published.write().await.push(article.clone());
        Ok(None)
    }

    async fn update_article(&self, id: &ArticleId, article: &PublishedArticle) -> Result<()> {
        info!(%id, title = %article.title, "Dry run: would update article");
        self.updated.write().await.push((id.clone(), article.clone()));
        Ok(())
    }
}
