use std::sync::Arc;

use ae_core::{Article, ArticleId, ArticleStore, Error, PublishedArticle, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    articles: Vec<Article>,
    next_id: i64,
}

impl MemoryState {
    fn insert(&mut self, article: &PublishedArticle) -> ArticleId {
        self.next_id += 1;
        let id = ArticleId::Number(self.next_id);
        self.articles.push(to_article(id.clone(), article));
        id
    }
}

fn to_article(id: ArticleId, article: &PublishedArticle) -> Article {
    Article {
        id,
        title: article.title.clone(),
        content: Some(article.content.clone()),
        url: Some(article.url.clone()),
        author: Some(article.author.clone()),
        published_date: Some(article.published_date.clone()),
    }
}

/// Article store held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `articles`; new ids continue after the largest numeric id.
    pub fn with_articles(articles: Vec<Article>) -> Self {
        let next_id = articles
            .iter()
            .filter_map(|a| match a.id {
                ArticleId::Number(n) => Some(n),
                ArticleId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);
        Self {
            state: Arc::new(RwLock::new(MemoryState { articles, next_id })),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn list_articles(&self) -> Result<Vec<Article>> {
        Ok(self.state.read().await.articles.clone())
    }

    async fn get_article(&self, id: &ArticleId) -> Result<Article> {
        self.state
            .read()
            .await
            .articles
            .iter()
            .find(|a| &a.id == id)
            .cloned()
            .ok_or_else(|| Error::store(Some(404), format!("Article {} not found", id)))
    }

    async fn publish_article(&self, article: &PublishedArticle) -> Result<Option<ArticleId>> {
        Ok(Some(self.state.write().await.insert(article)))
    }

    async fn update_article(&self, id: &ArticleId, article: &PublishedArticle) -> Result<()> {
        let mut state = self.state.write().await;
        let existing = state
            .articles
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| Error::store(Some(404), format!("Article {} not found", id)))?;
        *existing = to_article(id.clone(), article);
        Ok(())
    }
}
