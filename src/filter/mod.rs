//! Content filter for fetched items
//!
//! Classification is a pure function of the text and the configured lexicons.
//! The checks run in strict priority order:
//!
//! 1. Sensitive lexicon → `Blocked` (short-circuits everything else)
//! 2. Topic-negative lexicon → `TopicNegative`
//! 3. Promoted-topic lexicon → `PromotedTopic`
//! 4. Otherwise → `Neutral`
//!
//! The humor lexicon never changes the decision; it only marks an accepted item
//! as a confirmed troll post.

pub mod lexicon;

use crate::config::FilterConfig;
pub use lexicon::{fold_case, Lexicon};
use std::fmt;

/// Classification of an accepted item, driving prompt and fallback selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Neutral,
    TopicNegative,
    PromotedTopic,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::TopicNegative => "topic-negative",
            Self::PromotedTopic => "promoted-topic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The text touches a sensitive topic and must not be answered
    Blocked { phrase: String },

    /// The text may be answered
    Accepted {
        category: Category,
        /// A troll/humor indicator matched (only when the override is enabled)
        humor: bool,
    },
}

impl Classification {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// The category of an accepted item
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Accepted { category, .. } => Some(*category),
            Self::Blocked { .. } => None,
        }
    }
}

/// Table-driven classifier
#[derive(Debug, Clone)]
pub struct ContentFilter {
    sensitive: Lexicon,
    topic_negative: Lexicon,
    promoted_topic: Lexicon,
    humor: Option<Lexicon>,
}

impl ContentFilter {
    /// Creates a filter from explicit lexicons
    ///
    /// Pass `None` for `humor` to disable the humor confirmation signal.
    pub fn new(
        sensitive: Lexicon,
        topic_negative: Lexicon,
        promoted_topic: Lexicon,
        humor: Option<Lexicon>,
    ) -> Self {
        Self {
            sensitive,
            topic_negative,
            promoted_topic,
            humor,
        }
    }

    /// Creates a filter from the `[filter]` configuration section
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            Lexicon::new(&config.sensitive),
            Lexicon::new(&config.topic_negative),
            Lexicon::new(&config.promoted_topic),
            config
                .humor_override
                .then(|| Lexicon::new(&config.humor)),
        )
    }

    /// Classifies a piece of text
    ///
    /// # Examples
    ///
    /// ```
    /// use kibitz::filter::{Category, Classification, ContentFilter};
    ///
    /// let filter = ContentFilter::default();
    /// assert!(filter.classify("Büyük DEPREM oldu").is_blocked());
    /// assert_eq!(
    ///     filter.classify("A Milli takım yine galip geldi").category(),
    ///     Some(Category::PromotedTopic)
    /// );
    /// ```
    pub fn classify(&self, text: &str) -> Classification {
        let folded = fold_case(text);

        if let Some(phrase) = self.sensitive.find(&folded) {
            return Classification::Blocked {
                phrase: phrase.to_string(),
            };
        }

        let category = if self.topic_negative.find(&folded).is_some() {
            Category::TopicNegative
        } else if self.promoted_topic.find(&folded).is_some() {
            Category::PromotedTopic
        } else {
            Category::Neutral
        };

        let humor = self
            .humor
            .as_ref()
            .is_some_and(|lexicon| lexicon.find(&folded).is_some());

        Classification::Accepted { category, humor }
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
