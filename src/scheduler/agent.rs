use crate::config::{Config, Credentials, SourceKind};
use crate::filter::{Classification, ContentFilter};
use crate::gateway::{
    FetchOutcome, GatewayError, ItemSource, PublishGateway, PublishOutcome, Publisher,
    SearchGateway, TrendGateway,
};
use crate::generator::{ChatCompletionsClient, Generator, TextSource};
use crate::queue::{CandidateItem, PendingQueue};
use crate::scheduler::backoff::BackoffPolicy;
use crate::scheduler::stats::SessionStats;
use crate::{ConfigError, Result};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// What a single tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// An item was published
    Published {
        item_id: String,
        new_id: Option<String>,
    },

    /// Publishing is rate limited; the item went back to the front of the queue
    PublishRateLimited { reset_at: DateTime<Utc> },

    /// Publishing failed; the item went back to the front of the queue
    PublishFailed(GatewayError),

    /// Publishing credentials are missing; the item was dropped
    PublishUnconfigured,

    /// Fetching is rate limited
    FetchRateLimited { reset_at: DateTime<Utc> },

    /// Fetching failed
    FetchFailed(GatewayError),

    /// The fetch returned no items
    FetchEmpty,

    /// Every fetched item was blocked or already seen
    NothingAccepted,
}

impl TickOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Summary of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub outcome: TickOutcome,

    /// Items enqueued by this tick's fetch
    pub enqueued: usize,

    /// Publish calls made (at most one)
    pub publish_attempts: usize,

    /// Queue length after the tick
    pub queue_len: usize,

    /// Wait before the next tick, before jitter
    pub backoff: Duration,
}

/// Agent tunables that are not gateway-specific
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub query: String,
    pub page_size: u32,
    pub history_size: usize,
    pub backoff: BackoffPolicy,
}

impl AgentSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            query: config.source.query.clone(),
            page_size: config.source.page_size,
            history_size: config.agent.history_size,
            backoff: BackoffPolicy::from_config(&config.agent),
        }
    }
}

/// The publishing agent
///
/// Owns the pending queue; every tick runs to completion before the next starts.
pub struct Agent {
    source: Arc<dyn ItemSource>,
    publisher: Arc<dyn Publisher>,
    generator: Generator,
    filter: ContentFilter,
    queue: PendingQueue,
    settings: AgentSettings,
    stats: SessionStats,
}

impl Agent {
    pub fn new(
        source: Arc<dyn ItemSource>,
        publisher: Arc<dyn Publisher>,
        generator: Generator,
        filter: ContentFilter,
        settings: AgentSettings,
    ) -> Self {
        Self {
            source,
            publisher,
            generator,
            filter,
            queue: PendingQueue::new(settings.history_size),
            settings,
            stats: SessionStats::default(),
        }
    }

    /// Wires the HTTP gateways described by the configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `credentials` - Credentials read from the environment; any may be absent
    ///
    /// # Returns
    ///
    /// * `Ok(Agent)` - Ready to run
    /// * `Err(KibitzError)` - An HTTP client could not be built or a URL is invalid
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self> {
        let source_timeout = Duration::from_secs(config.source.timeout_secs);
        let source: Arc<dyn ItemSource> = match config.source.kind {
            SourceKind::Search => Arc::new(SearchGateway::new(
                config.source.search_url.clone(),
                credentials.bearer_token.clone(),
                source_timeout,
            )?),
            SourceKind::Trends => Arc::new(TrendGateway::new(
                config.source.trends24_url.clone(),
                config.source.twitter_trending_url.clone(),
                &config.source.user_agent,
                source_timeout,
            )?),
        };

        let publish_url = Url::parse(&config.publish.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.publish.url, e)))?;
        let publisher = Arc::new(PublishGateway::new(
            publish_url,
            credentials.oauth.clone(),
            Duration::from_secs(config.publish.timeout_secs),
        )?);

        let client = Arc::new(ChatCompletionsClient::new(
            &config.generator,
            credentials.generator_api_key.clone(),
        )?);

        Ok(Self::new(
            source,
            publisher,
            Generator::from_config(config, client),
            ContentFilter::from_config(&config.filter),
            AgentSettings::from_config(config),
        ))
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Runs one tick: drain one queued item, or fetch and then drain one
    pub async fn tick(&mut self) -> TickReport {
        self.stats.ticks += 1;
        let mut enqueued = 0;

        let item = match self.queue.dequeue_front() {
            Some(item) => item,
            None => {
                match self.fetch_cycle().await {
                    Ok(count) => enqueued = count,
                    Err(outcome) => return self.report(outcome, enqueued, 0),
                }
                match self.queue.dequeue_front() {
                    Some(item) => item,
                    None => return self.report(TickOutcome::NothingAccepted, enqueued, 0),
                }
            }
        };

        // A panic while publishing must not lose the dequeued item
        let pending = item.clone();
        let outcome = match AssertUnwindSafe(self.publish_item(item)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                self.queue.requeue_front(pending);
                std::panic::resume_unwind(panic);
            }
        };
        self.report(outcome, enqueued, 1)
    }

    /// Runs one tick with panic containment and returns the wait before the next
    pub async fn step(&mut self) -> Duration {
        let backoff = self.settings.backoff;

        match AssertUnwindSafe(self.tick()).catch_unwind().await {
            Ok(report) => {
                tracing::debug!("Tick finished: {:?}", report.outcome);
                tracing::debug!("Session: {}", self.stats);
                backoff.wait_after_tick(report.outcome.is_success(), report.queue_len == 0)
            }
            Err(panic) => {
                self.stats.panics += 1;
                tracing::error!(
                    "Tick panicked: {}; recovering in {}s",
                    panic_message(panic.as_ref()),
                    backoff.recovery.as_secs()
                );
                backoff.jittered(backoff.recovery)
            }
        }
    }

    /// Ticks until `shutdown` fires or its sender is dropped
    pub async fn run(&mut self, mut shutdown: watch::Receiver<()>) {
        tracing::info!(
            "Agent started (source: {}, publisher: {})",
            self.source.name(),
            self.publisher.name()
        );

        loop {
            let wait = self.step().await;
            tracing::info!(
                "Next tick in {}s ({} queued)",
                wait.as_secs(),
                self.queue.len()
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.changed() => {
                    tracing::info!("Shutdown requested");
                    break;
                }
            }
        }

        tracing::info!("Session summary: {}", self.stats);
    }

    /// Fetches, filters and enqueues; returns the number of items enqueued
    async fn fetch_cycle(&mut self) -> std::result::Result<usize, TickOutcome> {
        let items = match self
            .source
            .fetch(&self.settings.query, self.settings.page_size)
            .await
        {
            FetchOutcome::Items(items) => items,
            FetchOutcome::RateLimited { reset_at } => {
                tracing::info!("Fetch rate limited until {}", reset_at);
                return Err(TickOutcome::FetchRateLimited { reset_at });
            }
            FetchOutcome::Error(e) => {
                tracing::warn!("Fetch from {} failed: {}", self.source.name(), e);
                return Err(TickOutcome::FetchFailed(e));
            }
            FetchOutcome::Empty => {
                tracing::info!("Fetch from {} returned nothing", self.source.name());
                return Err(TickOutcome::FetchEmpty);
            }
        };

        let fetched = items.len();
        self.stats.fetched += fetched as u64;
        let mut enqueued = 0;

        for item in items {
            match self.filter.classify(&item.text) {
                Classification::Blocked { phrase } => {
                    self.stats.blocked += 1;
                    tracing::info!("Skipping item {}: sensitive phrase '{}'", item.id, phrase);
                }
                Classification::Accepted { category, humor } => {
                    if humor {
                        tracing::debug!("Item {} carries humor indicators", item.id);
                    }
                    let id = item.id.clone();
                    if self.queue.enqueue(CandidateItem::new(item, category)) {
                        self.stats.accepted += 1;
                        enqueued += 1;
                    } else {
                        self.stats.duplicates += 1;
                        tracing::debug!("Item {} already seen", id);
                    }
                }
            }
        }

        tracing::info!("Fetched {} items, queued {}", fetched, enqueued);

        if enqueued == 0 {
            Err(TickOutcome::NothingAccepted)
        } else {
            Ok(enqueued)
        }
    }

    async fn publish_item(&mut self, item: CandidateItem) -> TickOutcome {
        let generated = self.generator.generate(&item).await;
        if generated.source == TextSource::Fallback {
            self.stats.fallbacks += 1;
        }

        match self
            .publisher
            .publish(item.reply_target(), &generated.text)
            .await
        {
            PublishOutcome::Success { new_id } => {
                self.stats.published += 1;
                self.queue.mark_published(item.id());
                TickOutcome::Published {
                    item_id: item.id().to_string(),
                    new_id,
                }
            }
            PublishOutcome::RateLimited { reset_at } => {
                self.stats.publish_failures += 1;
                tracing::info!(
                    "Publish rate limited until {}; item {} stays queued",
                    reset_at,
                    item.id()
                );
                self.queue.requeue_front(item);
                TickOutcome::PublishRateLimited { reset_at }
            }
            PublishOutcome::Error(e) => {
                self.stats.publish_failures += 1;
                tracing::warn!("Publishing item {} failed: {}", item.id(), e);
                self.queue.requeue_front(item);
                TickOutcome::PublishFailed(e)
            }
            PublishOutcome::Unconfigured => {
                self.stats.publish_failures += 1;
                tracing::warn!("Publishing is not configured; dropping item {}", item.id());
                TickOutcome::PublishUnconfigured
            }
        }
    }

    fn report(&self, outcome: TickOutcome, enqueued: usize, publish_attempts: usize) -> TickReport {
        let backoff = self
            .settings
            .backoff
            .after_tick(outcome.is_success(), self.queue.is_empty());

        TickReport {
            outcome,
            enqueued,
            publish_attempts,
            queue_len: self.queue.len(),
            backoff,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
