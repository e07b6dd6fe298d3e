//! The shipped demo configurations must stay loadable

use kibitz::config::{load_config_with_hash, SourceKind};
use std::path::PathBuf;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

#[test]
fn test_reply_demo_config() {
    let (config, hash) = load_config_with_hash(&demo("kibitz.toml")).expect("demo config");

    assert_eq!(config.source.kind, SourceKind::Search);
    assert_eq!(config.source.page_size, 10);
    assert!(config.filter.humor_override);
    assert!(!config.filter.sensitive.is_empty());
    assert_eq!(hash.len(), 64);
}

#[test]
fn test_trends_demo_config() {
    let (config, _) = load_config_with_hash(&demo("trends.toml")).expect("demo config");

    assert_eq!(config.source.kind, SourceKind::Trends);
    assert_eq!(config.agent.jitter_secs, 1800);
    assert!(config.prompts.neutral.contains("{text}"));
    assert!(config.agent.short_backoff_secs < config.agent.long_backoff_secs);
}
