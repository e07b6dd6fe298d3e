//! Trend listing gateway
//!
//! Scrapes two public trend listings and merges them. Trends that appear on both
//! listings rank first; ties keep the order in which they were first seen.
//!
//! Each listing is handled independently: one failing listing is logged and the
//! other is still used. The query argument is ignored.

use crate::gateway::rate_limit::RateLimitState;
use crate::gateway::{build_http_client, FetchOutcome, GatewayError, ItemSource};
use crate::queue::FetchedItem;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Most trends taken from a single listing
const MAX_TRENDS_PER_SOURCE: usize = 20;

/// Most JSON-LD entries read (roughly the last hour)
const MAX_JSON_LD_TRENDS: usize = 10;

/// Most links inspected when a trends24 page has no trend card
const MAX_LISTING_LINKS: usize = 30;

/// Result of fetching one listing page
enum ListingPage {
    Body(String),
    RateLimited(DateTime<Utc>),
    Failed(GatewayError),
}

/// Fetch gateway backed by trend listing pages
pub struct TrendGateway {
    client: Client,
    trends24_url: String,
    twitter_trending_url: String,
}

impl TrendGateway {
    /// Creates a trend gateway
    ///
    /// # Arguments
    ///
    /// * `trends24_url` - Listing made of `trend-card` blocks
    /// * `twitter_trending_url` - Listing with JSON-LD and table markup
    /// * `user_agent` - Browser-like user agent sent to both sites
    /// * `timeout` - Per-request timeout
    pub fn new(
        trends24_url: impl Into<String>,
        twitter_trending_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, timeout)?,
            trends24_url: trends24_url.into(),
            twitter_trending_url: twitter_trending_url.into(),
        })
    }

    async fn fetch_listing(&self, url: &str) -> ListingPage {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return ListingPage::Failed(GatewayError::from_reqwest(&e)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let rate_limit = RateLimitState::from_headers(response.headers(), Utc::now());
            return match rate_limit.reset_at {
                Some(reset_at) => ListingPage::RateLimited(reset_at),
                None => ListingPage::Failed(GatewayError::MissingResetMetadata {
                    status: status.as_u16(),
                }),
            };
        }

        match response.text().await {
            Ok(body) if status.is_success() => ListingPage::Body(body),
            Ok(body) => ListingPage::Failed(GatewayError::rejected(status.as_u16(), &body)),
            Err(e) => ListingPage::Failed(GatewayError::from_reqwest(&e)),
        }
    }
}

#[async_trait]
impl ItemSource for TrendGateway {
    fn name(&self) -> &'static str {
        "trends"
    }

    async fn fetch(&self, _query: &str, max_results: u32) -> FetchOutcome {
        let (first, second) = tokio::join!(
            self.fetch_listing(&self.trends24_url),
            self.fetch_listing(&self.twitter_trending_url)
        );

        let mut lists = Vec::new();
        let mut rate_limited: Option<DateTime<Utc>> = None;
        let mut error = None;

        let pages: [(&str, ListingPage, fn(&str) -> Vec<String>); 2] = [
            ("trends24", first, parse_trends24),
            ("twitter-trending", second, parse_twitter_trending),
        ];

        for (name, page, parse) in pages {
            match page {
                ListingPage::Body(body) => {
                    let trends = parse(&body);
                    tracing::info!("{} listed {} trends", name, trends.len());
                    lists.push(trends);
                }
                ListingPage::RateLimited(reset_at) => {
                    tracing::warn!("{} rate limited until {}", name, reset_at);
                    rate_limited = Some(rate_limited.map_or(reset_at, |r| r.max(reset_at)));
                }
                ListingPage::Failed(e) => {
                    tracing::warn!("Failed to read trends from {}: {}", name, e);
                    error.get_or_insert(e);
                }
            }
        }

        let ranked = rank_trends(&lists, max_results as usize);
        if !ranked.is_empty() {
            return FetchOutcome::Items(ranked.into_iter().map(FetchedItem::trend).collect());
        }

        if let Some(reset_at) = rate_limited {
            FetchOutcome::RateLimited { reset_at }
        } else if let Some(e) = error {
            FetchOutcome::Error(e)
        } else {
            FetchOutcome::Empty
        }
    }
}

/// Merges trend lists, most widely listed first
///
/// Ties keep first-seen order across the lists.
pub fn rank_trends(lists: &[Vec<String>], limit: usize) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for trend in lists.iter().flatten() {
        let count = counts.entry(trend.as_str()).or_insert(0);
        if *count == 0 {
            order.push(trend.as_str());
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(limit).map(str::to_string).collect()
}

/// Extracts trends from the first `trend-card` block of a trends24-style page
///
/// Trailing tweet counts such as `12K` are stripped from each entry. Pages
/// without a usable card fall back to the texts of links into the listing.
pub fn parse_trends24(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let from_card = trend_card_trends(&document);
    if !from_card.is_empty() {
        return from_card;
    }

    listing_link_trends(&document)
}

fn trend_card_trends(document: &Html) -> Vec<String> {
    let mut trends = Vec::new();
    let (Ok(card_selector), Ok(item_selector)) =
        (Selector::parse("div.trend-card"), Selector::parse("li"))
    else {
        return trends;
    };

    let Some(card) = document.select(&card_selector).next() else {
        return trends;
    };

    for item in card.select(&item_selector).take(MAX_TRENDS_PER_SOURCE) {
        let text = joined_text(item);
        let name = trailing_count_re().replace(&text, "").trim().to_string();
        push_unique(&mut trends, name);
    }

    trends
}

fn listing_link_trends(document: &Html) -> Vec<String> {
    let mut trends = Vec::new();
    let Ok(selector) = Selector::parse(r#"a[href*="/turkey/"]"#) else {
        return trends;
    };

    for link in document.select(&selector).take(MAX_LISTING_LINKS) {
        let text = joined_text(link);
        if text.contains('#') || text.chars().count() > 2 {
            push_unique(&mut trends, text);
        }
    }

    trends.truncate(MAX_TRENDS_PER_SOURCE);
    trends
}

/// Extracts trends from a twitter-trending-style page
///
/// JSON-LD structured data is preferred; the two trend tables are the fallback.
pub fn parse_twitter_trending(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let from_json_ld = json_ld_trends(&document);
    if !from_json_ld.is_empty() {
        return from_json_ld;
    }

    table_trends(&document)
}

fn json_ld_trends(document: &Html) -> Vec<String> {
    let mut trends = Vec::new();
    let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return trends;
    };
    let Some(script) = document.select(&selector).next() else {
        return trends;
    };

    let raw: String = script.text().collect();
    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("JSON-LD parse error: {}", e);
            return trends;
        }
    };

    if let Some(elements) = value.get("itemListElement").and_then(|v| v.as_array()) {
        for element in elements.iter().take(MAX_JSON_LD_TRENDS) {
            if let Some(name) = element.get("name").and_then(|n| n.as_str()) {
                push_unique(&mut trends, name.trim().to_string());
            }
        }
    }

    trends.truncate(MAX_TRENDS_PER_SOURCE);
    trends
}

fn table_trends(document: &Html) -> Vec<String> {
    let mut trends = Vec::new();
    let (Ok(titled_link), Ok(any_link)) = (Selector::parse("a[title]"), Selector::parse("a"))
    else {
        return trends;
    };

    for table_id in ["tableBody1", "tableBody2"] {
        let Ok(rows) = Selector::parse(&format!("tbody#{} tr.tablestr", table_id)) else {
            continue;
        };

        for row in document.select(&rows) {
            if let Some(link) = row.select(&titled_link).next() {
                let title = link.value().attr("title").unwrap_or_default();
                push_unique(&mut trends, title.trim().to_string());
            } else if let Some(data) = row.value().attr("data-trendsname") {
                let decoded = urlencoding::decode(data)
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| data.to_string());
                push_unique(&mut trends, decoded.replace('+', " ").trim().to_string());
            } else if let Some(link) = row.select(&any_link).next() {
                let text = joined_text(link);
                let name = tweet_count_re().replace_all(&text, "").trim().to_string();
                if name.chars().count() > 1 {
                    push_unique(&mut trends, name);
                }
            }
        }
    }

    trends.truncate(MAX_TRENDS_PER_SOURCE);
    trends
}

/// Concatenates the trimmed text nodes of an element
fn joined_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<Vec<_>>().join("")
}

fn push_unique(trends: &mut Vec<String>, name: String) {
    if !name.is_empty() && !trends.contains(&name) {
        trends.push(name);
    }
}

fn trailing_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+K?\s*$").expect("valid regex"))
}

fn tweet_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\d+k?\s*tweet").expect("valid regex"))
}
