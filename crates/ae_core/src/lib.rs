pub mod citations;
pub mod error;
pub mod inference;
pub mod search;
pub mod storage;
pub mod types;

pub use citations::{build_citation_block, is_enhanced};
pub use error::{Error, Result};
pub use inference::TextGenerator;
pub use search::{PageFetcher, SearchProvider};
pub use storage::ArticleStore;
pub use types::{
    Article, ArticleId, EnhancementResult, PublishedArticle, ReferenceDocument, SearchResult,
};
