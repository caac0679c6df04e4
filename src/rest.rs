//! Candle loader for kline-style REST endpoints.
//!
//! The endpoint answers `GET {path}?symbol=..&interval=..&startTime=..&endTime=..&limit=..`
//! with an array of rows `[openTimeMs, open, high, low, close, volume, ...]`.

use crate::data_types::{Candle, Resolution};
use crate::loader::{LoadRequest, SeriesLoader};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use eyre::WrapErr;
use reqwest::Url;
use serde::de::{self, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestEndpointConfig {
    pub base_url: String,
    pub path: String,
    /// Rows requested per page.
    pub page_limit: u32,
}

impl Default for RestEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            path: "/api/v3/klines".to_string(),
            page_limit: 1000,
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed kline payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes a JSON array of kline rows.
pub fn decode_candle_rows(bytes: &[u8]) -> Result<Vec<Candle>, DecodeError> {
    let rows: Vec<KlineRow> = serde_json::from_slice(bytes)?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Url of the page starting at `start`; `end` is exclusive.
pub fn request_url(
    config: &RestEndpointConfig,
    symbol: &str,
    resolution: Resolution,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> eyre::Result<Url> {
    let base = Url::parse(&config.base_url)
        .wrap_err_with(|| format!("invalid base url {:?}", config.base_url))?;
    let mut url = base
        .join(&config.path)
        .wrap_err_with(|| format!("invalid endpoint path {:?}", config.path))?;
    url.query_pairs_mut()
        .append_pair("symbol", symbol)
        .append_pair("interval", resolution.as_str())
        .append_pair("startTime", &start.timestamp_millis().to_string())
        .append_pair("endTime", &(end.timestamp_millis() - 1).to_string())
        .append_pair("limit", &config.page_limit.to_string());
    Ok(url)
}

pub struct RestCandleLoader {
    config: RestEndpointConfig,
    http: reqwest::Client,
}

impl RestCandleLoader {
    pub fn new(config: RestEndpointConfig) -> eyre::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("series-chart/", env!("CARGO_PKG_VERSION")))
            .build()
            .wrap_err("failed to build http client")?;
        Self::with_client(config, http)
    }

    /// Uses a caller-configured client (proxies, timeouts, TLS).
    pub fn with_client(config: RestEndpointConfig, http: reqwest::Client) -> eyre::Result<Self> {
        eyre::ensure!(config.page_limit > 0, "page_limit must be positive");
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &RestEndpointConfig {
        &self.config
    }

    async fn fetch_page(&self, url: Url) -> eyre::Result<Vec<Candle>> {
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .wrap_err_with(|| format!("request to {url} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("{url} answered with an error status"))?;
        let body = resp.bytes().await.wrap_err("failed to read kline body")?;
        decode_candle_rows(&body).wrap_err_with(|| format!("bad kline page from {url}"))
    }
}

#[async_trait]
impl SeriesLoader<Candle> for RestCandleLoader {
    async fn load(&self, request: &LoadRequest) -> eyre::Result<Vec<Candle>> {
        let end = request.range.end();
        let step = request.resolution.duration();
        let mut cursor = request.range.start();
        let mut candles = Vec::new();

        while cursor < end {
            let url = request_url(&self.config, &request.symbol, request.resolution, cursor, end)?;
            let page = self.fetch_page(url).await?;
            let page_len = page.len();
            let Some(next) = page.last().map(|c| c.time + step) else {
                break;
            };
            debug!(
                symbol = %request.symbol,
                resolution = %request.resolution,
                rows = page_len,
                "kline page received"
            );
            candles.extend(page);
            if page_len < self.config.page_limit as usize || next <= cursor {
                break;
            }
            cursor = next;
        }
        Ok(candles)
    }
}

struct KlineRow(Candle);

impl<'de> Deserialize<'de> for KlineRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(KlineRowVisitor)
    }
}

struct KlineRowVisitor;

impl<'de> Visitor<'de> for KlineRowVisitor {
    type Value = KlineRow;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a kline row [openTime, open, high, low, close, volume, ...]")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<KlineRow, A::Error> {
        let mut field = |index: usize| -> Result<f64, A::Error> {
            seq.next_element::<Numeric>()?
                .map(|n| n.0)
                .ok_or_else(|| de::Error::invalid_length(index, &self))
        };
        let open_ms = field(0)?;
        let open = field(1)?;
        let high = field(2)?;
        let low = field(3)?;
        let close = field(4)?;
        let volume = field(5)?;
        while seq.next_element::<IgnoredAny>()?.is_some() {}

        let time = Utc
            .timestamp_millis_opt(open_ms as i64)
            .single()
            .filter(|_| open_ms.fract() == 0.0)
            .ok_or_else(|| de::Error::custom(format!("invalid open time {open_ms}")))?;
        Ok(KlineRow(Candle {
            time,
            open,
            high,
            low,
            close,
            volume,
        }))
    }
}

/// A JSON number, or a string holding one.
struct Numeric(f64);

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericVisitor)
    }
}

struct NumericVisitor;

impl<'de> Visitor<'de> for NumericVisitor {
    type Value = Numeric;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Numeric, E> {
        if v.is_finite() {
            Ok(Numeric(v))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Numeric, E> {
        Ok(Numeric(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Numeric, E> {
        Ok(Numeric(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Numeric, E> {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Numeric)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}
