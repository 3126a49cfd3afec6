use std::fmt;
use std::sync::Arc;

use ae_core::{EnhancementResult, Error, ReferenceDocument, Result, TextGenerator};
use tracing::info;

pub const SYSTEM_PROMPT: &str = "You are an expert content writer and SEO specialist. You rewrite \
articles so they match the style, formatting and quality of top-ranking articles on the same topic.

Guidelines:
1. Keep the core message and every fact from the original article
2. Match the tone, structure and formatting patterns (headings, paragraphs, lists) of the reference articles
3. Improve readability and engagement
4. Stay factual and accurate; do not invent claims
5. Use clear headings and subheadings
6. Write in a professional yet accessible tone";

const NO_CONTENT: &str = "(No content provided)";

#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    /// Characters of each reference included in the request.
    pub preview_cap: usize,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self { preview_cap: 2000 }
    }
}

pub struct Synthesizer {
    generator: Arc<dyn TextGenerator>,
    config: SynthesizerConfig,
}

impl fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synthesizer")
            .field("generator", &self.generator.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Synthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: SynthesizerConfig) -> Self {
        Self { generator, config }
    }

    /// Rewrites `original_content` using `references` as style and fact grounding.
    ///
    /// Any generator failure, and a blank completion, is reported as [`Error::Synthesis`].
    pub async fn synthesize(
        &self,
        title: &str,
        original_content: &str,
        references: &[ReferenceDocument],
    ) -> Result<EnhancementResult> {
        let user_prompt = build_user_prompt(title, original_content, references, self.config.preview_cap);

        let content = self
            .generator
            .generate(SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(|e| match e {
                Error::Synthesis(_) => e,
                other => Error::Synthesis(other.to_string()),
            })?;

        let content = content.trim();
        if content.is_empty() {
            return Err(Error::Synthesis(format!(
                "Empty response from {}",
                self.generator.name()
            )));
        }

        info!(
            generator = self.generator.name(),
            chars = content.chars().count(),
            "Generated enhanced content"
        );
        Ok(EnhancementResult {
            content: content.to_string(),
        })
    }
}

/// First `cap` characters of `text`, with an ellipsis when anything was cut.
pub fn preview(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

pub fn build_user_prompt(
    title: &str,
    original_content: &str,
    references: &[ReferenceDocument],
    preview_cap: usize,
) -> String {
    let original = if original_content.trim().is_empty() {
        NO_CONTENT
    } else {
        original_content
    };

    let summaries = references
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Reference Article {}: \"{}\"\nURL: {}\nContent Preview: {}",
                i + 1,
                r.title,
                r.url,
                preview(&r.content, preview_cap)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Please enhance and rewrite the following article to match the style and quality of \
the top-ranking reference articles provided.

Original Article Title: \"{title}\"

Original Article Content:
{original}

Reference Articles (top-ranking articles for the same title):
{summaries}

Rewrite the article to:
1. Match the formatting and style of the reference articles
2. Improve clarity, structure, and readability
3. Make it more comprehensive and valuable
4. Use proper headings (H2, H3) to organize content
5. Keep all important information from the original

Return only the enhanced article content, with no meta information or explanations."
    )
}
