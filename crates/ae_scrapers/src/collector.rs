use std::sync::Arc;

use ae_core::{PageFetcher, ReferenceDocument, SearchResult};
use tracing::{info, warn};

use crate::extractor::ContentExtractor;

/// Fetches candidate pages and keeps the ones with extractable text.
pub struct ReferenceCollector {
    fetcher: Arc<dyn PageFetcher>,
    extractor: ContentExtractor,
}

impl ReferenceCollector {
    pub fn new(fetcher: Arc<dyn PageFetcher>, extractor: ContentExtractor) -> Self {
        Self { fetcher, extractor }
    }

    /// Walks up to `max_candidates` results in rank order. A failed fetch or an empty
    /// extraction drops that candidate only; the caller decides whether the count is enough.
    pub async fn collect(&self, candidates: &[SearchResult], max_candidates: usize) -> Vec<ReferenceDocument> {
        let mut documents = Vec::new();

        for candidate in candidates.iter().take(max_candidates) {
            let html = match self.fetcher.fetch(&candidate.link).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(url = %candidate.link, "Skipping reference: {}", e);
                    continue;
                }
            };

            let content = self.extractor.extract(&html, &candidate.link);
            if content.is_empty() {
                warn!(url = %candidate.link, "Skipping reference: no content extracted");
                continue;
            }

            info!(url = %candidate.link, chars = content.chars().count(), "Collected reference");
            documents.push(ReferenceDocument {
                title: candidate.title.clone(),
                url: candidate.link.clone(),
                content,
            });
        }

        documents
    }
}
