//! Kibitz main entry point
//!
//! This is the command-line interface for the Kibitz reply agent.

use anyhow::Context;
use clap::Parser;
use kibitz::config::{load_config_with_hash, Config, Credentials, SourceKind};
use kibitz::Agent;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Kibitz: a rate-limit-aware social reply agent
///
/// Kibitz fetches candidate posts or trending topics, skips anything touching a
/// sensitive subject, writes a short reply with a language model, and publishes
/// it without exceeding the platform's rate limits.
#[derive(Parser, Debug)]
#[command(name = "kibitz")]
#[command(version)]
#[command(about = "A rate-limit-aware social reply agent", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the plan without contacting any service
    #[arg(long, conflicts_with = "once")]
    dry_run: bool,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,

    /// Load environment variables from this file (default: ./.env if present)
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    load_env_file(cli.env_file.as_ref())?;

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let credentials = Credentials::from_env();
    let missing = credentials.missing();
    if !missing.is_empty() {
        tracing::warn!("Missing credentials: {}", missing.join(", "));
    }

    if cli.dry_run {
        print_plan(&config, &credentials);
        return Ok(());
    }

    let mut agent = Agent::from_config(&config, &credentials)?;

    if cli.once {
        let wait = agent.step().await;
        tracing::info!(
            "Single tick finished ({} queued, next tick would wait {}s)",
            agent.queue_len(),
            wait.as_secs()
        );
        tracing::info!("Session summary: {}", agent.stats());
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                // Keep the sender alive so the agent keeps running
                std::future::pending::<()>().await;
            }
        }
    });

    agent.run(shutdown_rx).await;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kibitz=info,warn"),
            1 => EnvFilter::new("kibitz=debug,info"),
            2 => EnvFilter::new("kibitz=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads an explicit env file, or `./.env` when present
fn load_env_file(path: Option<&PathBuf>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| {
                kibitz::ConfigError::EnvFile(format!("{}: {}", path.display(), e))
            })?;
            tracing::info!("Loaded environment from {}", path.display());
        }
        None => match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        },
    }
    Ok(())
}

/// Handles the --dry-run mode: shows what the agent would do
fn print_plan(config: &Config, credentials: &Credentials) {
    println!("=== Kibitz Dry Run ===\n");

    println!("Source:");
    match config.source.kind {
        SourceKind::Search => {
            println!("  Kind: search");
            println!("  Endpoint: {}", config.source.search_url);
            println!("  Query: {}", config.source.query);
        }
        SourceKind::Trends => {
            println!("  Kind: trends");
            println!("  Listings: {}", config.source.trends24_url);
            println!("            {}", config.source.twitter_trending_url);
        }
    }
    println!("  Page size: {}", config.source.page_size);

    println!("\nSchedule:");
    println!("  Tick interval: {}s", config.agent.tick_interval_secs);
    println!("  Short backoff: {}s", config.agent.short_backoff_secs);
    println!("  Long backoff: {}s", config.agent.long_backoff_secs);
    println!("  Recovery backoff: {}s", config.agent.recovery_backoff_secs);
    if config.agent.jitter_secs > 0 {
        println!("  Jitter: up to {}s", config.agent.jitter_secs);
    }

    println!("\nGenerator:");
    println!("  Endpoint: {}", config.generator.endpoint);
    println!("  Model: {}", config.generator.model);

    println!("\nFilter:");
    println!("  Sensitive phrases: {}", config.filter.sensitive.len());
    println!("  Topic-negative phrases: {}", config.filter.topic_negative.len());
    println!("  Promoted-topic phrases: {}", config.filter.promoted_topic.len());
    println!(
        "  Humor phrases: {}{}",
        config.filter.humor.len(),
        if config.filter.humor_override { "" } else { " (disabled)" }
    );

    println!("\nPublishing: {}", config.publish.url);
    if credentials.oauth.is_none() {
        println!("  ! No OAuth credentials: generated text will only be logged");
    }

    println!("\n✓ Configuration is valid");
}
