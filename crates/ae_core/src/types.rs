use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::citations::build_citation_block;

/// Store-assigned article identity. The store may hand out numeric or textual ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleId::Number(n) => write!(f, "{}", n),
            ArticleId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ArticleId {
    fn from(id: i64) -> Self {
        ArticleId::Number(id)
    }
}

impl From<&str> for ArticleId {
    fn from(id: &str) -> Self {
        ArticleId::Text(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// ISO-8601 timestamp as stored.
    #[serde(default)]
    pub published_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub title: String,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementResult {
    pub content: String,
}

/// The envelope handed to the store for a rewritten article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedArticle {
    pub title: String,
    pub url: String,
    pub content: String,
    pub author: String,
    pub published_date: String,
}

impl PublishedArticle {
    /// Builds the publish envelope for `original`, appending the citation block for `references`.
    ///
    /// Missing url, author and date fall back to `<synthetic_base>/articles/<id>`, an empty
    /// string and `now` respectively.
    pub fn from_enhancement(
        original: &Article,
        enhancement: &EnhancementResult,
        references: &[ReferenceDocument],
        synthetic_base: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let url = original
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| synthetic_url(synthetic_base, &original.id));

        let published_date = original
            .published_date
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

        Self {
            title: original.title.clone(),
            url,
            content: format!("{}{}", enhancement.content, build_citation_block(references)),
            author: original.author.clone().unwrap_or_default(),
            published_date,
        }
    }
}

pub fn synthetic_url(base: &str, id: &ArticleId) -> String {
    format!("{}/articles/{}", base.trim_end_matches('/'), id)
}
