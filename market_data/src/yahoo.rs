//! Yahoo Finance chart API client
//!
//! Uses the v8 chart endpoint with a daily interval. Timestamps are shifted
//! by the exchange's GMT offset before the trading date is taken.

use crate::provider::MarketDataProvider;
use crate::{MarketDataError, Observation, Result};
use chrono::{DateTime, Days, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

/// Default chart endpoint
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Environment variable overriding [`DEFAULT_BASE_URL`]
pub const BASE_URL_ENV: &str = "STOCK_FORECASTER_YAHOO_URL";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Option<Vec<AdjCloseColumn>>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Blocking Yahoo Finance client
#[derive(Debug, Clone)]
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    /// Client with the given request timeout and the default endpoint
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(timeout, DEFAULT_BASE_URL)
    }

    /// Client whose endpoint comes from `STOCK_FORECASTER_YAHOO_URL` when set
    pub fn from_env(timeout: Duration) -> Result<Self> {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::with_base_url(timeout, url.trim()),
            _ => Self::new(timeout),
        }
    }

    pub fn with_base_url(timeout: Duration, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MarketDataError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chart URL for `[start, end]`; `period2` is exclusive so it points at
    /// the day after `end`.
    fn build_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let period1 = midnight_timestamp(start);
        let period2 = midnight_timestamp(end.checked_add_days(Days::new(1)).unwrap_or(end));
        format!(
            "{}/{}?period1={}&period2={}&interval=1d&events=history&includeAdjustedClose=true",
            self.base_url, ticker, period1, period2
        )
    }
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Decode a chart payload into observations.
///
/// Rows with any missing OHLCV value are skipped. A missing adjusted close
/// falls back to the close.
fn parse_chart(ticker: &str, body: &str) -> Result<Vec<Observation>> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| MarketDataError::Parse(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(MarketDataError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let data = match response.chart.result.and_then(|r| r.into_iter().next()) {
        Some(data) => data,
        None => return Err(MarketDataError::NoData(ticker.to_string())),
    };
    let quote = match data.indicators.quote.first() {
        Some(quote) => quote,
        None => return Ok(Vec::new()),
    };
    let adj_close = data
        .indicators
        .adjclose
        .as_ref()
        .and_then(|columns| columns.first());
    let offset = data.meta.as_ref().map_or(0, |m| m.gmtoffset);

    let cell = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let mut observations = Vec::with_capacity(data.timestamp.len());
    for (i, &ts) in data.timestamp.iter().enumerate() {
        let date = match DateTime::from_timestamp(ts + offset, 0) {
            Some(dt) => dt.date_naive(),
            None => continue,
        };
        let volume = quote.volume.get(i).copied().flatten();

        if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            cell(&quote.open, i),
            cell(&quote.high, i),
            cell(&quote.low, i),
            cell(&quote.close, i),
            volume,
        ) {
            observations.push(Observation {
                date,
                open,
                high,
                low,
                close,
                adj_close: adj_close
                    .and_then(|a| cell(&a.adjclose, i))
                    .unwrap_or(close),
                volume,
            });
        }
    }

    Ok(observations)
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let url = self.build_url(ticker, start, end);
        log::info!("Fetching {} daily bars {}..={} from Yahoo", ticker, start, end);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| MarketDataError::Request(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| MarketDataError::Request(e.to_string()))?;

        match parse_chart(ticker, &body) {
            Err(MarketDataError::Parse(_)) if !status.is_success() => {
                Err(MarketDataError::Request(format!("HTTP {}", status)))
            }
            Ok(rows) => {
                log::info!("Yahoo returned {} rows for {}", rows.len(), ticker);
                Ok(rows)
            }
            Err(e) => Err(e),
        }
    }
}
