//! Reference price feeds.
//!
//! The derived coin tracks an external daily series. A feed only fetches;
//! timeouts and fallbacks are the price engine's business.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use pitboss_types::{PitbossError, PricingConfig, Result};
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

/// Source of the reference price.
pub trait ReferenceFeed: Send + Sync {
    /// Latest reference price, in base-currency units.
    fn fetch_reference(&self) -> impl Future<Output = Result<Decimal>> + Send;
}

/// A feed that always answers with the same price.
#[derive(Debug, Clone, Copy)]
pub struct FixedFeed(pub Decimal);

impl ReferenceFeed for FixedFeed {
    async fn fetch_reference(&self) -> Result<Decimal> {
        Ok(self.0)
    }
}

/// Daily-series HTTP feed (`TIME_SERIES_DAILY` shape).
#[derive(Debug, Clone)]
pub struct HttpReferenceFeed {
    http: HttpClient,
    url: String,
    symbol: String,
    api_key: Option<String>,
    timeout_ms: u64,
}

impl HttpReferenceFeed {
    /// # Errors
    /// `Configuration` if the HTTP client cannot be built.
    pub fn from_config(cfg: &PricingConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(cfg.feed_timeout_ms))
            .build()
            .map_err(|e| PitbossError::Configuration(format!("feed client: {e}")))?;
        Ok(Self {
            http,
            url: cfg.feed_url.clone(),
            symbol: cfg.feed_symbol.clone(),
            api_key: cfg.feed_api_key.clone(),
            timeout_ms: cfg.feed_timeout_ms,
        })
    }

    fn map_err(&self, err: &reqwest::Error) -> PitbossError {
        if err.is_timeout() {
            PitbossError::FeedTimeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            PitbossError::FeedUnavailable {
                reason: err.to_string(),
            }
        }
    }
}

impl ReferenceFeed for HttpReferenceFeed {
    async fn fetch_reference(&self) -> Result<Decimal> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(PitbossError::FeedUnavailable {
                reason: "no feed api key configured".to_string(),
            });
        };

        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", self.symbol.as_str()),
                ("apikey", key),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.map_err(&e))?;
        let body = response.text().await.map_err(|e| self.map_err(&e))?;

        let open = parse_daily_open(&body)?;
        debug!(symbol = %self.symbol, open = %open, "reference fetched");
        Ok(open)
    }
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    #[serde(rename = "Time Series (Daily)")]
    days: BTreeMap<String, DailyBar>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: Decimal,
}

/// Opening price of the most recent day in a daily-series body.
///
/// # Errors
/// `FeedUnavailable` if the body is not a daily series, is empty, or the
/// open is not positive.
pub fn parse_daily_open(body: &str) -> Result<Decimal> {
    let series: DailySeries = serde_json::from_str(body).map_err(|e| PitbossError::FeedUnavailable {
        reason: format!("unexpected feed body: {e}"),
    })?;
    // ISO dates sort chronologically.
    let (day, bar) = series
        .days
        .iter()
        .next_back()
        .ok_or_else(|| PitbossError::FeedUnavailable {
            reason: "feed returned no days".to_string(),
        })?;
    if bar.open <= Decimal::ZERO {
        return Err(PitbossError::FeedUnavailable {
            reason: format!("non-positive open {} on {day}", bar.open),
        });
    }
    Ok(bar.open)
}
