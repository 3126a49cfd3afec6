use std::fmt;
use std::sync::Arc;

use ae_core::{is_enhanced, Article, ArticleId, ArticleStore, PublishedArticle, Result};
use ae_inference::Synthesizer;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::collector::ReferenceCollector;
use crate::finder::ReferenceFinder;
use crate::logging::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// POST the enhanced article as a new store entry.
    #[default]
    Create,
    /// PUT the enhanced article over the original.
    UpdateOriginal,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search results fetched and extracted per article.
    pub max_candidates: usize,
    /// Accepted references required before synthesis.
    pub min_documents: usize,
    /// Base for `<base>/articles/<id>` when an article has no url.
    pub synthetic_url_base: String,
    /// Articles processed at once.
    pub concurrency: usize,
    pub skip_enhanced: bool,
    pub publish_mode: PublishMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_candidates: 2,
            min_documents: 2,
            synthetic_url_base: "https://example.com".to_string(),
            concurrency: 1,
            skip_enhanced: false,
            publish_mode: PublishMode::Create,
        }
    }
}

/// Terminal state of one article's run.
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleOutcome {
    Published { article_id: Option<ArticleId> },
    SkippedAlreadyEnhanced,
    SkippedInsufficientReferences { found: usize },
    SkippedSynthesisFailure { reason: String },
    Failed { reason: String },
}

impl ArticleOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, ArticleOutcome::Published { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            ArticleOutcome::SkippedAlreadyEnhanced
                | ArticleOutcome::SkippedInsufficientReferences { .. }
                | ArticleOutcome::SkippedSynthesisFailure { .. }
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ArticleOutcome::Failed { .. })
    }
}

impl fmt::Display for ArticleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleOutcome::Published { article_id: Some(id) } => write!(f, "published as {}", id),
            ArticleOutcome::Published { article_id: None } => write!(f, "published"),
            ArticleOutcome::SkippedAlreadyEnhanced => write!(f, "skipped: already enhanced"),
            ArticleOutcome::SkippedInsufficientReferences { found } => {
                write!(f, "skipped: only {} usable reference(s)", found)
            }
            ArticleOutcome::SkippedSynthesisFailure { reason } => write!(f, "skipped: {}", reason),
            ArticleOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleReport {
    pub id: ArticleId,
    pub title: String,
    pub outcome: ArticleOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Articles never started because the run was cancelled.
    pub not_started: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {}, published {}, skipped {}, failed {}",
            self.processed, self.published, self.skipped, self.failed
        )?;
        if self.not_started > 0 {
            write!(f, ", not started {}", self.not_started)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Per-article results in completion order.
    pub articles: Vec<ArticleReport>,
    pub summary: RunSummary,
}

impl RunReport {
    fn from_reports(articles: Vec<ArticleReport>, total: usize) -> Self {
        let summary = RunSummary {
            processed: articles.len(),
            published: articles.iter().filter(|r| r.outcome.is_published()).count(),
            skipped: articles.iter().filter(|r| r.outcome.is_skipped()).count(),
            failed: articles.iter().filter(|r| r.outcome.is_failed()).count(),
            not_started: total.saturating_sub(articles.len()),
        };
        Self { articles, summary }
    }
}

/// Drives search, scrape, synthesis and publish for every article in the store.
#[derive(Clone)]
pub struct EnhancementManager {
    store: Arc<dyn ArticleStore>,
    finder: Arc<ReferenceFinder>,
    collector: Arc<ReferenceCollector>,
    synthesizer: Arc<Synthesizer>,
    config: PipelineConfig,
}

impl EnhancementManager {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        finder: ReferenceFinder,
        collector: ReferenceCollector,
        synthesizer: Synthesizer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            finder: Arc::new(finder),
            collector: Arc::new(collector),
            synthesizer: Arc::new(synthesizer),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes every article once. Only the initial listing can fail the run;
    /// per-article problems end up in the report.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunReport> {
        info!("📥 Fetching articles from store");
        let articles = self.store.list_articles().await?;
        let total = articles.len();
        info!(count = total, "✅ Found {} article(s)", total);

        let reports = self.process_all(articles, &cancel).await;
        let report = RunReport::from_reports(reports, total);
        if report.summary.not_started > 0 {
            warn!(not_started = report.summary.not_started, "Run cancelled before all articles started");
        }
        Ok(report)
    }

    /// Processes the single article `id`.
    pub async fn run_one(&self, id: &ArticleId) -> Result<RunReport> {
        let article = self.store.get_article(id).await?;
        let reports = self.process_all(vec![article], &CancellationToken::new()).await;
        Ok(RunReport::from_reports(reports, 1))
    }

    async fn process_all(&self, articles: Vec<Article>, cancel: &CancellationToken) -> Vec<ArticleReport> {
        let concurrency = self.config.concurrency.max(1);

        let mut results = stream::iter(articles)
            .take_while(|_| futures::future::ready(!cancel.is_cancelled()))
            .map(|article| {
                let manager = self.clone();
                async move {
                    let id = article.id.clone();
                    let title = article.title.clone();
                    // Spawned so a panic stays inside this article.
                    let outcome = match tokio::spawn(async move { manager.process_article(&article).await }).await {
                        Ok(outcome) => outcome,
                        Err(e) => ArticleOutcome::Failed {
                            reason: format!("article task aborted: {}", e),
                        },
                    };
                    ArticleReport { id, title, outcome }
                }
            })
            .buffer_unordered(concurrency);

        let mut reports = Vec::new();
        while let Some(report) = results.next().await {
            debug!(article_id = %report.id, done = reports.len() + 1, "Article finished: {}", report.outcome);
            reports.push(report);
        }
        reports
    }

    /// Runs one article through the pipeline. Never fails; every error becomes a terminal outcome.
    pub async fn process_article(&self, article: &Article) -> ArticleOutcome {
        let log = Logger::for_article(article);
        log.info("📄 Processing");

        if self.config.skip_enhanced && article.content.as_deref().map_or(false, is_enhanced) {
            log.info("⏭️ Already carries a References section");
            return ArticleOutcome::SkippedAlreadyEnhanced;
        }

        log.info("🔍 Searching for references");
        let results = match self.finder.find(&article.title).await {
            Ok(results) => results,
            Err(e) => {
                log.warn(&format!("⚠️ Search failed: {}", e));
                return ArticleOutcome::SkippedInsufficientReferences { found: 0 };
            }
        };
        if results.len() < self.config.min_documents {
            log.warn(&format!("⚠️ Only {} usable search result(s)", results.len()));
            return ArticleOutcome::SkippedInsufficientReferences { found: results.len() };
        }

        log.info(&format!("📥 Scraping {} candidate(s)", results.len().min(self.config.max_candidates)));
        let references = self.collector.collect(&results, self.config.max_candidates).await;
        if references.len() < self.config.min_documents {
            log.warn(&format!("⚠️ Only {} reference(s) could be scraped", references.len()));
            return ArticleOutcome::SkippedInsufficientReferences { found: references.len() };
        }

        log.info("🤖 Synthesizing enhanced article");
        let enhancement = match self
            .synthesizer
            .synthesize(&article.title, article.content.as_deref().unwrap_or_default(), &references)
            .await
        {
            Ok(enhancement) => enhancement,
            Err(e) => {
                log.warn(&format!("❌ {}", e));
                return ArticleOutcome::SkippedSynthesisFailure { reason: e.to_string() };
            }
        };

        let published = PublishedArticle::from_enhancement(
            article,
            &enhancement,
            &references,
            &self.config.synthetic_url_base,
            Utc::now(),
        );

        log.info("📤 Publishing");
        let result = match self.config.publish_mode {
            PublishMode::Create => self.store.publish_article(&published).await,
            PublishMode::UpdateOriginal => self
                .store
                .update_article(&article.id, &published)
                .await
                .map(|_| Some(article.id.clone())),
        };

        match result {
            Ok(article_id) => {
                log.info("✅ Published");
                ArticleOutcome::Published { article_id }
            }
            Err(e) => {
                log.error(&format!("❌ Publish failed: {}", e));
                ArticleOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}
