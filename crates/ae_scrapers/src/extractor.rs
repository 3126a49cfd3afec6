//! Best-effort article text extraction from arbitrary HTML.
//!
//! Non-content elements are stripped first, then an ordered list of
//! [`Strategy`] values is tried until one yields text. Container strategies
//! only count when they produce a substantial amount of paragraph text; the
//! final body-wide strategy takes whatever paragraphs the page has.

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::utils::{element_text, parse_selector};

/// Elements removed before any strategy runs.
pub const NON_CONTENT_SELECTOR: &str =
    "script, style, noscript, nav, header, footer, aside, .advertisement, .ads";

/// Content containers, most specific first.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".content",
    ".article-body",
    ".post-body",
    "[role=\"article\"]",
    "main article",
    "main .content",
    ".post",
    "#content",
];

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Paragraphs at or below this many characters are dropped.
    pub min_paragraph_len: usize,
    /// A container must yield at least this many characters to be accepted.
    pub min_content_len: usize,
    /// Paragraph cap for the body-wide fallback.
    pub max_fallback_paragraphs: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_paragraph_len: 50,
            min_content_len: 500,
            max_fallback_paragraphs: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Paragraphs of the first element matching the selector.
    Container(String),
    /// Paragraphs anywhere under `<body>`.
    BodyParagraphs,
}

impl Strategy {
    pub fn apply(&self, document: &Html, config: &ExtractorConfig) -> Option<String> {
        match self {
            Strategy::Container(selector) => {
                let selector = parse_selector(selector)?;
                let container = document.select(&selector).next()?;
                let paragraphs = paragraphs_in(container, config.min_paragraph_len)?;
                let text = paragraphs.join("\n\n");
                (text.chars().count() >= config.min_content_len).then_some(text)
            }
            Strategy::BodyParagraphs => {
                let selector = parse_selector("body p")?;
                let text = document
                    .select(&selector)
                    .map(element_text)
                    .filter(|p| p.chars().count() > config.min_paragraph_len)
                    .take(config.max_fallback_paragraphs)
                    .collect::<Vec<_>>()
                    .join("\n\n");
                (!text.is_empty()).then_some(text)
            }
        }
    }
}

/// Long-enough paragraph texts under `container`, or `None` when it has no `<p>` at all.
fn paragraphs_in(container: ElementRef<'_>, min_len: usize) -> Option<Vec<String>> {
    let selector = parse_selector("p")?;
    let mut found_any = false;
    let paragraphs = container
        .select(&selector)
        .inspect(|_| found_any = true)
        .map(element_text)
        .filter(|p| p.chars().count() > min_len)
        .collect::<Vec<_>>();
    found_any.then_some(paragraphs)
}

pub fn default_strategies() -> Vec<Strategy> {
    CONTENT_SELECTORS
        .iter()
        .map(|s| Strategy::Container(s.to_string()))
        .chain(std::iter::once(Strategy::BodyParagraphs))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ContentExtractor {
    config: ExtractorConfig,
    strategies: Vec<Strategy>,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl ContentExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            strategies: default_strategies(),
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Returns clean article text for `html`, or an empty string when nothing usable is found.
    pub fn extract(&self, html: &str, source_url: &str) -> String {
        let document = strip_non_content(Html::parse_document(html));

        for strategy in &self.strategies {
            if let Some(text) = strategy.apply(&document, &self.config) {
                debug!(url = source_url, ?strategy, chars = text.chars().count(), "Extracted content");
                return text.trim().to_string();
            }
        }

        debug!(url = source_url, "No content found");
        String::new()
    }
}

/// Detached subtrees stay in the arena and `Html::select` still walks them,
/// so the pruned tree is serialized and parsed again.
fn strip_non_content(mut document: Html) -> Html {
    let Some(selector) = parse_selector(NON_CONTENT_SELECTOR) else {
        return document;
    };
    let ids = document.select(&selector).map(|el| el.id()).collect::<Vec<_>>();
    if ids.is_empty() {
        return document;
    }
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    Html::parse_document(&document.html())
}
