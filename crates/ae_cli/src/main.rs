use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ae_core::ArticleId;
use ae_inference::{create_model, Config as GeneratorConfig, Provider, Synthesizer, SynthesizerConfig};
use ae_scrapers::{
    init_logging, ContentExtractor, DuckDuckGoSearch, EnhancementManager, ExtractorConfig, FinderConfig,
    HttpFetcher, PipelineConfig, PublishMode, ReferenceCollector, ReferenceFinder, RunReport,
};
use ae_storage::{create_store, DryRunStore, DEFAULT_BASE_URL};
use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// A duration such as `15s`, `2m` or `1h30m`. A bare number means seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut seen_number = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            let num = current_number
                .parse::<u64>()
                .map_err(|_| format!("Expected a number before '{}' in duration: {}", c, s))?;
            let unit = match c {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total_seconds = num
                .checked_mul(unit)
                .and_then(|secs| total_seconds.checked_add(secs))
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            current_number.clear();
            seen_number = true;
        }

        if !current_number.is_empty() {
            let num = current_number
                .parse::<u64>()
                .map_err(|_| format!("Invalid number in duration: {}", s))?;
            total_seconds = total_seconds
                .checked_add(num)
                .ok_or_else(|| format!("Duration too large: {}", s))?;
            seen_number = true;
        }

        if !seen_number {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

fn parse_article_id(s: &str) -> std::result::Result<ArticleId, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Article id must not be empty".to_string());
    }
    Ok(s.parse::<i64>().map(ArticleId::Number).unwrap_or_else(|_| ArticleId::from(s)))
}

/// Rewrites every article in the store using the top web references for its
/// title, then publishes the result with a References section.
#[derive(Parser, Debug)]
#[command(name = "enhance", author, version, about, long_about = None)]
struct Cli {
    /// Article store endpoint
    #[arg(long, env = "API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api_base_url: String,

    /// Credential for the text-generation service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Text-generation provider: openai or deepseek
    #[arg(long, env = "LLM_PROVIDER", default_value = "openai")]
    provider: Provider,

    /// Model name, defaults to the provider's preset
    #[arg(long, env = "LLM_MODEL")]
    model: Option<String>,

    /// Override for the provider's API base URL
    #[arg(long, env = "LLM_BASE_URL")]
    llm_base_url: Option<String>,

    #[arg(long, env = "LLM_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    #[arg(long, env = "LLM_MAX_TOKENS", default_value_t = 4000)]
    max_tokens: u32,

    /// Search results fetched and scraped per article
    #[arg(long, env = "ENHANCE_CANDIDATES", default_value_t = 2)]
    candidates: usize,

    /// References required before an article is rewritten
    #[arg(long, env = "ENHANCE_MIN_DOCUMENTS", default_value_t = 2)]
    min_documents: usize,

    #[arg(long, env = "ENHANCE_SEARCH_LIMIT", default_value_t = 10)]
    search_limit: usize,

    #[arg(long, env = "ENHANCE_MIN_PARAGRAPH_LEN", default_value_t = 50)]
    min_paragraph_len: usize,

    #[arg(long, env = "ENHANCE_MIN_CONTENT_LEN", default_value_t = 500)]
    min_content_len: usize,

    #[arg(long, env = "ENHANCE_MAX_FALLBACK_PARAGRAPHS", default_value_t = 20)]
    max_fallback_paragraphs: usize,

    /// Characters of each reference sent to the model
    #[arg(long, env = "ENHANCE_PREVIEW_CAP", default_value_t = 2000)]
    preview_cap: usize,

    /// Base for generated URLs of articles that have none
    #[arg(long, env = "ENHANCE_SYNTHETIC_URL_BASE", default_value = "https://example.com")]
    synthetic_url_base: String,

    #[arg(long, env = "ENHANCE_FETCH_TIMEOUT", default_value = "15s")]
    fetch_timeout: HumanDuration,

    #[arg(long, env = "ENHANCE_STORE_TIMEOUT", default_value = "30s")]
    store_timeout: HumanDuration,

    #[arg(long, env = "ENHANCE_SEARCH_TIMEOUT", default_value = "30s")]
    search_timeout: HumanDuration,

    #[arg(long, env = "ENHANCE_GENERATION_TIMEOUT", default_value = "2m")]
    generation_timeout: HumanDuration,

    /// Articles processed at the same time
    #[arg(long, env = "ENHANCE_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Skip articles that already end in a References section
    #[arg(long)]
    skip_enhanced: bool,

    /// Run the whole pipeline but do not write to the store
    #[arg(long)]
    dry_run: bool,

    /// Process only this article
    #[arg(long, value_parser = parse_article_id)]
    article_id: Option<ArticleId>,

    /// Overwrite the original article instead of publishing a new one
    #[arg(long)]
    update_original: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            provider: self.provider,
            api_key: self.api_key.clone(),
            model_name: self.model.clone(),
            base_url: self.llm_base_url.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.generation_timeout.0,
        }
    }

    fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            min_paragraph_len: self.min_paragraph_len,
            min_content_len: self.min_content_len,
            max_fallback_paragraphs: self.max_fallback_paragraphs,
        }
    }

    fn finder_config(&self) -> FinderConfig {
        FinderConfig {
            search_limit: self.search_limit,
            max_results: self.candidates,
            ..FinderConfig::default()
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            max_candidates: self.candidates,
            min_documents: self.min_documents,
            synthetic_url_base: self.synthetic_url_base.clone(),
            concurrency: self.concurrency,
            skip_enhanced: self.skip_enhanced,
            publish_mode: if self.update_original {
                PublishMode::UpdateOriginal
            } else {
                PublishMode::Create
            },
        }
    }
}

fn build_manager(cli: &Cli) -> anyhow::Result<(EnhancementManager, Option<Arc<DryRunStore>>)> {
    let generator = create_model(&cli.generator_config()).context("Failed to configure text generation")?;
    let configured = create_store(&cli.api_base_url, cli.store_timeout.0, cli.dry_run)
        .context("Failed to configure article store")?;
    let search = DuckDuckGoSearch::new(cli.search_timeout.0).context("Failed to configure search")?;
    let fetcher = HttpFetcher::new(cli.fetch_timeout.0).context("Failed to configure page fetcher")?;

    let manager = EnhancementManager::new(
        configured.store,
        ReferenceFinder::new(Arc::new(search), cli.finder_config()),
        ReferenceCollector::new(Arc::new(fetcher), ContentExtractor::new(cli.extractor_config())),
        Synthesizer::new(
            generator,
            SynthesizerConfig {
                preview_cap: cli.preview_cap,
            },
        ),
        cli.pipeline_config(),
    );
    Ok((manager, configured.recorder))
}

fn log_report(report: &RunReport) {
    for entry in &report.articles {
        if entry.outcome.is_failed() {
            error!(article_id = %entry.id, "\"{}\": {}", entry.title, entry.outcome);
        } else {
            info!(article_id = %entry.id, "\"{}\": {}", entry.title, entry.outcome);
        }
    }
    info!("🏁 Run finished: {}", report.summary);
}

/// One line per write a dry run held back.
async fn dry_run_lines(recorder: &DryRunStore) -> Vec<String> {
    let published = recorder.published().await.into_iter().map(|a| {
        format!(
            "would publish \"{}\" at {} ({} chars)",
            a.title,
            a.url,
            a.content.chars().count()
        )
    });
    let updated = recorder
        .updated()
        .await
        .into_iter()
        .map(|(id, a)| format!("would update {} with \"{}\" ({} chars)", id, a.title, a.content.chars().count()));
    published.chain(updated).collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "info" });

    let (manager, recorder) = build_manager(&cli)?;
    info!(
        store = %cli.api_base_url,
        provider = %cli.provider,
        concurrency = cli.concurrency,
        dry_run = cli.dry_run,
        "🚀 Starting article enhancement"
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight articles");
            on_signal.cancel();
        }
    });

    let report = match &cli.article_id {
        Some(id) => manager
            .run_one(id)
            .await
            .with_context(|| format!("Failed to process article {}", id))?,
        None => manager.run(cancel).await.context("Failed to fetch articles")?,
    };

    log_report(&report);
    if let Some(recorder) = recorder {
        let lines = dry_run_lines(&recorder).await;
        info!(count = lines.len(), "🧪 Dry run held back {} write(s)", lines.len());
        for line in lines {
            info!("{}", line);
        }
    }
    Ok(())
}
