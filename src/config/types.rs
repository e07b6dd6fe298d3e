use crate::filter::lexicon;
use serde::Deserialize;

/// Main configuration structure for Kibitz
///
/// Every section is optional; omitted keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub source: SourceConfig,
    pub publish: PublishConfig,
    pub generator: GeneratorConfig,
    pub prompts: PromptConfig,
    pub fallbacks: FallbackConfig,
    pub filter: FilterConfig,
}

/// Scheduler cadence and backoff configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Wait after a successful publish (seconds)
    #[serde(rename = "tick-interval-secs")]
    pub tick_interval_secs: u64,

    /// Wait after an unsuccessful tick that leaves work in the queue (seconds)
    #[serde(rename = "short-backoff-secs")]
    pub short_backoff_secs: u64,

    /// Wait after an unsuccessful tick with an empty queue (seconds)
    #[serde(rename = "long-backoff-secs")]
    pub long_backoff_secs: u64,

    /// Wait after a tick that panicked (seconds)
    #[serde(rename = "recovery-backoff-secs")]
    pub recovery_backoff_secs: u64,

    /// Upper bound of the random delay added to every wait (seconds)
    #[serde(rename = "jitter-secs")]
    pub jitter_secs: u64,

    /// Number of published item ids remembered for de-duplication
    #[serde(rename = "history-size")]
    pub history_size: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 15 * 60,
            short_backoff_secs: 60,
            long_backoff_secs: 15 * 60,
            recovery_backoff_secs: 15 * 60,
            jitter_secs: 0,
            history_size: 500,
        }
    }
}

/// Where candidate items come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Recent-post search on the platform API; items are answered with replies
    Search,
    /// Scraped trend listings; items become standalone posts
    Trends,
}

/// Fetch gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,

    /// Search query sent to the platform
    pub query: String,

    /// Items requested per fetch (the platform minimum is 10)
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Recent-search endpoint
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Trend listing with `trend-card` blocks
    #[serde(rename = "trends24-url")]
    pub trends24_url: String,

    /// Trend listing with JSON-LD / table markup
    #[serde(rename = "twitter-trending-url")]
    pub twitter_trending_url: String,

    /// User agent sent to trend listing sites
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Search,
            query: "a lang:tr -is:retweet -is:reply".to_string(),
            page_size: 10,
            search_url: "https://api.twitter.com/2/tweets/search/recent".to_string(),
            trends24_url: "https://trends24.in/turkey/".to_string(),
            twitter_trending_url: "https://www.twitter-trending.com/turkey/tr".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .to_string(),
            timeout_secs: 10,
        }
    }
}

/// Publish gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Post creation endpoint
    pub url: String,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            url: "https://api.twitter.com/2/tweets".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Text generation service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,

    pub model: String,

    pub temperature: f32,

    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Pause before the single retry (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// System instruction shared by every category
    #[serde(rename = "system-prompt")]
    pub system_prompt: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.9,
            max_tokens: 200,
            timeout_secs: 15,
            retry_delay_ms: 1000,
            system_prompt: "You write short, absurd, darkly humorous social media replies in \
                            Turkish. Every reply is different and creative. You never insult, \
                            swear, threaten, or write anything unlawful."
                .to_string(),
        }
    }
}

/// Per-category prompt templates; `{text}` is replaced with the item text
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub neutral: String,

    #[serde(rename = "topic-negative")]
    pub topic_negative: String,

    #[serde(rename = "promoted-topic")]
    pub promoted_topic: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            neutral: "Someone posted: \"{text}\"\n\n\
                      Write an absurd, funny, nonsensical reply in Turkish.\n\
                      - Absurd, like \"karpuz kestim biber çıktı\"\n\
                      - Maximum 280 characters\n\
                      - Write only the reply, no explanation"
                .to_string(),
            topic_negative: "Someone posted: \"{text}\"\n\n\
                             This person is insulting Atatürk. Write an absurd, darkly \
                             humorous reply in Turkish that infuriates them.\n\
                             - No insults and nothing that could get you sued\n\
                             - Maximum 280 characters\n\
                             - Write only the reply, no explanation"
                .to_string(),
            promoted_topic: "Someone posted: \"{text}\"\n\n\
                             Write a light, celebratory, playful reply in Turkish cheering \
                             for the national team.\n\
                             - Maximum 280 characters\n\
                             - Write only the reply, no explanation"
                .to_string(),
        }
    }
}

/// Static per-category text used when generation fails twice
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub neutral: String,

    #[serde(rename = "topic-negative")]
    pub topic_negative: String,

    #[serde(rename = "promoted-topic")]
    pub promoted_topic: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            neutral: "Karpuz kestim biber çıktı".to_string(),
            topic_negative: "Karpuz kestim biber çıktı, sen de Atatürk'e laf atıyorsun. Mantık?"
                .to_string(),
            promoted_topic: "Karpuz kestim biber çıktı, maçı yine de biz alırız.".to_string(),
        }
    }
}

/// Content filter lexicons
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Phrases that block an item outright
    pub sensitive: Vec<String>,

    #[serde(rename = "topic-negative")]
    pub topic_negative: Vec<String>,

    #[serde(rename = "promoted-topic")]
    pub promoted_topic: Vec<String>,

    /// Troll/humor indicators; only confirm an accepted item
    pub humor: Vec<String>,

    #[serde(rename = "humor-override")]
    pub humor_override: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sensitive: to_owned(lexicon::SENSITIVE),
            topic_negative: to_owned(lexicon::TOPIC_NEGATIVE),
            promoted_topic: to_owned(lexicon::PROMOTED_TOPIC),
            humor: to_owned(lexicon::HUMOR),
            humor_override: true,
        }
    }
}

fn to_owned(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_string()).collect()
}
