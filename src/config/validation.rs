use crate::config::types::{
    AgentConfig, Config, FallbackConfig, FilterConfig, GeneratorConfig, PromptConfig,
    PublishConfig, SourceConfig, SourceKind,
};
use crate::ConfigError;
use url::Url;

/// Smallest page size the search endpoint accepts
pub const MIN_PAGE_SIZE: u32 = 10;

/// Largest page size the search endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_agent_config(&config.agent)?;
    validate_source_config(&config.source)?;
    validate_publish_config(&config.publish)?;
    validate_generator_config(&config.generator)?;
    validate_prompts(&config.prompts)?;
    validate_fallbacks(&config.fallbacks)?;
    validate_filter_config(&config.filter)?;
    Ok(())
}

/// Validates scheduler cadence and backoffs
fn validate_agent_config(config: &AgentConfig) -> Result<(), ConfigError> {
    if config.tick_interval_secs < 1 {
        return Err(ConfigError::Validation(
            "tick-interval-secs must be >= 1".to_string(),
        ));
    }

    if config.short_backoff_secs < 1 {
        return Err(ConfigError::Validation(
            "short-backoff-secs must be >= 1".to_string(),
        ));
    }

    // Unpublished accepted work is more urgent than discovering new work
    if config.short_backoff_secs >= config.long_backoff_secs {
        return Err(ConfigError::Validation(format!(
            "short-backoff-secs ({}) must be less than long-backoff-secs ({})",
            config.short_backoff_secs, config.long_backoff_secs
        )));
    }

    if config.recovery_backoff_secs < 1 {
        return Err(ConfigError::Validation(
            "recovery-backoff-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetch gateway configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    if config.page_size < MIN_PAGE_SIZE || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page-size must be between {} and {}, got {}",
            MIN_PAGE_SIZE, MAX_PAGE_SIZE, config.page_size
        )));
    }

    validate_timeout("source.timeout-secs", config.timeout_secs)?;

    match config.kind {
        SourceKind::Search => {
            if config.query.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "query cannot be empty for the search source".to_string(),
                ));
            }
            validate_url("search-url", &config.search_url)?;
        }
        SourceKind::Trends => {
            validate_url("trends24-url", &config.trends24_url)?;
            validate_url("twitter-trending-url", &config.twitter_trending_url)?;
        }
    }

    Ok(())
}

/// Validates publish gateway configuration
fn validate_publish_config(config: &PublishConfig) -> Result<(), ConfigError> {
    validate_url("publish.url", &config.url)?;
    validate_timeout("publish.timeout-secs", config.timeout_secs)
}

/// Validates text generation configuration
fn validate_generator_config(config: &GeneratorConfig) -> Result<(), ConfigError> {
    validate_url("generator.endpoint", &config.endpoint)?;
    validate_timeout("generator.timeout-secs", config.timeout_secs)?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "generator.model cannot be empty".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "generator.temperature must be between 0.0 and 2.0, got {}",
            config.temperature
        )));
    }

    if config.max_tokens < 1 {
        return Err(ConfigError::Validation(
            "generator.max-tokens must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Every template must reference the item text
fn validate_prompts(prompts: &PromptConfig) -> Result<(), ConfigError> {
    for (name, template) in [
        ("neutral", &prompts.neutral),
        ("topic-negative", &prompts.topic_negative),
        ("promoted-topic", &prompts.promoted_topic),
    ] {
        if !template.contains("{text}") {
            return Err(ConfigError::Validation(format!(
                "prompt template '{}' must contain the {{text}} placeholder",
                name
            )));
        }
    }
    Ok(())
}

fn validate_fallbacks(fallbacks: &FallbackConfig) -> Result<(), ConfigError> {
    for (name, text) in [
        ("neutral", &fallbacks.neutral),
        ("topic-negative", &fallbacks.topic_negative),
        ("promoted-topic", &fallbacks.promoted_topic),
    ] {
        if text.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "fallback '{}' cannot be empty",
                name
            )));
        }
    }
    Ok(())
}

/// Blank phrases would match every text
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    for (name, phrases) in [
        ("sensitive", &config.sensitive),
        ("topic-negative", &config.topic_negative),
        ("promoted-topic", &config.promoted_topic),
        ("humor", &config.humor),
    ] {
        if phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "filter lexicon '{}' contains an empty phrase",
                name
            )));
        }
    }
    Ok(())
}

fn validate_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}

fn validate_timeout(name: &str, secs: u64) -> Result<(), ConfigError> {
    if secs < 1 || secs > 120 {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and 120 seconds, got {}",
            name, secs
        )));
    }
    Ok(())
}
