//! Reply/post text generation
//!
//! Each item gets at most two generation attempts. If both fail, a fixed
//! per-category fallback is used, so `generate` always returns publishable text:
//!
//! ```text
//! First --fail--> (retry delay) --> Retry --fail--> Fallback
//!   |                                 |
//!   +--ok--> Model text               +--ok--> Model text
//! ```

mod client;

pub use client::{ChatCompletionsClient, GenerationError, TextGenerator};

use crate::config::{Config, FallbackConfig, PromptConfig};
use crate::filter::Category;
use crate::queue::CandidateItem;
use std::sync::Arc;
use std::time::Duration;

/// Platform limit on post length, in characters
pub const MAX_POST_CHARS: usize = 280;

const ELLIPSIS: &str = "...";

/// Placeholder replaced with the item text in prompt templates
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Where generated text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Model,
    Fallback,
}

/// Publishable text for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    pub text: String,
    pub source: TextSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retry,
}

/// Turns candidate items into post text
pub struct Generator {
    client: Arc<dyn TextGenerator>,
    system_prompt: String,
    prompts: PromptConfig,
    fallbacks: FallbackConfig,
    retry_delay: Duration,
}

impl Generator {
    pub fn new(
        client: Arc<dyn TextGenerator>,
        system_prompt: impl Into<String>,
        prompts: PromptConfig,
        fallbacks: FallbackConfig,
        retry_delay: Duration,
    ) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
            prompts,
            fallbacks,
            retry_delay,
        }
    }

    /// Builds a generator using the configured prompts, fallbacks and retry delay
    pub fn from_config(config: &Config, client: Arc<dyn TextGenerator>) -> Self {
        Self::new(
            client,
            config.generator.system_prompt.clone(),
            config.prompts.clone(),
            config.fallbacks.clone(),
            Duration::from_millis(config.generator.retry_delay_ms),
        )
    }

    /// Renders the prompt for an item
    pub fn prompt_for(&self, item: &CandidateItem) -> String {
        let template = match item.category() {
            Category::Neutral => &self.prompts.neutral,
            Category::TopicNegative => &self.prompts.topic_negative,
            Category::PromotedTopic => &self.prompts.promoted_topic,
        };
        template.replace(TEXT_PLACEHOLDER, item.text())
    }

    /// Fixed text used after two failed attempts
    pub fn fallback_for(&self, category: Category) -> String {
        let text = match category {
            Category::Neutral => &self.fallbacks.neutral,
            Category::TopicNegative => &self.fallbacks.topic_negative,
            Category::PromotedTopic => &self.fallbacks.promoted_topic,
        };
        truncate_post(text)
    }

    /// Generates publishable text for an item
    ///
    /// Never fails: generation errors are logged and replaced by fallback text.
    pub async fn generate(&self, item: &CandidateItem) -> GeneratedText {
        let prompt = self.prompt_for(item);
        let mut attempt = Attempt::First;

        loop {
            let error = match self.client.complete(&self.system_prompt, &prompt).await {
                Ok(raw) => {
                    let text = normalize(&raw);
                    if !text.is_empty() {
                        return GeneratedText {
                            text: truncate_post(&text),
                            source: TextSource::Model,
                        };
                    }
                    GenerationError::EmptyOutput
                }
                Err(e) => e,
            };

            match attempt {
                Attempt::First => {
                    tracing::warn!(
                        "Generation failed for item {}: {}; retrying in {:?}",
                        item.id(),
                        error,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    attempt = Attempt::Retry;
                }
                Attempt::Retry => {
                    tracing::warn!(
                        "GenerationUnavailable for item {} ({}): using {} fallback",
                        item.id(),
                        error,
                        item.category()
                    );
                    return GeneratedText {
                        text: self.fallback_for(item.category()),
                        source: TextSource::Fallback,
                    };
                }
            }
        }
    }
}

/// Trims whitespace and one pair of surrounding quotes
fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”'), ('«', '»')] {
        if trimmed.chars().count() >= 2 && trimmed.starts_with(open) && trimmed.ends_with(close) {
            let inner = &trimmed[open.len_utf8()..trimmed.len() - close.len_utf8()];
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Caps text at the platform post length
///
/// Longer text keeps its first 277 characters followed by `...`.
pub fn truncate_post(text: &str) -> String {
    if text.chars().count() <= MAX_POST_CHARS {
        return text.to_string();
    }

    let keep = MAX_POST_CHARS - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
