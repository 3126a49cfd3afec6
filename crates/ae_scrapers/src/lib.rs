pub mod collector;
pub mod extractor;
pub mod fetcher;
pub mod finder;
pub mod logging;
pub mod manager;
pub mod search;
mod utils;

pub use collector::ReferenceCollector;
pub use extractor::{ContentExtractor, ExtractorConfig, Strategy};
pub use fetcher::{HttpFetcher, DEFAULT_FETCH_TIMEOUT};
pub use finder::{FinderConfig, ReferenceFinder};
pub use logging::{init_logging, Logger};
pub use manager::{
    ArticleOutcome, ArticleReport, EnhancementManager, PipelineConfig, PublishMode, RunReport, RunSummary,
};
pub use search::DuckDuckGoSearch;

pub mod prelude {
    pub use super::{EnhancementManager, PipelineConfig, ReferenceCollector, ReferenceFinder};
    pub use ae_core::{Article, Error, Result};
}
