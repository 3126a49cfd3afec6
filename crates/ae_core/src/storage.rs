use async_trait::async_trait;
use crate::types::{Article, ArticleId, PublishedArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetch every article the store holds
    async fn list_articles(&self) -> Result<Vec<Article>>;

    /// Fetch a single article by id
    async fn get_article(&self, id: &ArticleId) -> Result<Article>;

    /// Create a new article, returning the id the store assigned when it reports one
    async fn publish_article(&self, article: &PublishedArticle) -> Result<Option<ArticleId>>;

    /// Replace an existing article
    async fn update_article(&self, id: &ArticleId, article: &PublishedArticle) -> Result<()>;
}
