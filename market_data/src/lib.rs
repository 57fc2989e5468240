//! # Market Data
//!
//! Daily OHLCV observations for a single ticker and the providers that
//! produce them.
//!
//! ## Providers
//!
//! - [`YahooProvider`]: Yahoo Finance chart API over HTTPS
//! - [`CsvProvider`]: local files in the Yahoo download layout
//! - [`SyntheticProvider`]: seeded random walk, for demos and tests
//!
//! ## Usage Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use market_data::{Field, MarketDataProvider, ObservationSeries, SyntheticProvider};
//!
//! let provider = SyntheticProvider::new(42);
//! let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
//!
//! let rows = provider.fetch_daily("AAPL", start, end).unwrap();
//! let series = ObservationSeries::normalized("AAPL", rows, start, end).unwrap();
//! let closes = series.column(Field::Close);
//! println!("{} closes, last {:?}", closes.len(), closes.last());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod csv_source;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_source::CsvProvider;
pub use provider::MarketDataProvider;
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;

/// Errors raised while fetching or assembling market data
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("No data returned for {0}")]
    NoData(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error [{code}]: {description}")]
    Api { code: String, description: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Observations are not strictly increasing at {0}")]
    UnorderedSeries(NaiveDate),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for market data operations
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Close adjusted for splits and dividends
    pub adj_close: f64,
    pub volume: u64,
}

impl Observation {
    /// Value of a single field as a float
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Open => self.open,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Close => self.close,
            Field::AdjClose => self.adj_close,
            Field::Volume => self.volume as f64,
        }
    }
}

/// A non-date column of an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::AdjClose,
        Field::Volume,
    ];

    /// Column header, as in the Yahoo download layout
    pub fn label(&self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::AdjClose => "Adj Close",
            Field::Volume => "Volume",
        }
    }

    /// Whether the field is a price (as opposed to a count)
    pub fn is_price(&self) -> bool {
        !matches!(self, Field::Volume)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Field {
    type Err = MarketDataError;

    /// Accepts `close`, `Close`, `adj_close`, `Adj Close`, `adjclose`, ...
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "open" => Ok(Field::Open),
            "high" => Ok(Field::High),
            "low" => Ok(Field::Low),
            "close" => Ok(Field::Close),
            "adjclose" => Ok(Field::AdjClose),
            "volume" => Ok(Field::Volume),
            _ => Err(MarketDataError::UnknownField(s.to_string())),
        }
    }
}

/// Ordered daily observations for one ticker.
///
/// Dates are strictly increasing; both constructors enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    ticker: String,
    observations: Vec<Observation>,
}

impl ObservationSeries {
    /// Wrap rows that are already sorted with unique dates
    pub fn new(ticker: impl Into<String>, observations: Vec<Observation>) -> Result<Self> {
        if let Some(pair) = observations
            .windows(2)
            .find(|pair| pair[1].date <= pair[0].date)
        {
            return Err(MarketDataError::UnorderedSeries(pair[1].date));
        }

        Ok(Self {
            ticker: ticker.into(),
            observations,
        })
    }

    /// Build a series from raw provider rows.
    ///
    /// Rows outside `[start, end]` are dropped, the rest are sorted by date
    /// and a repeated date keeps its last row.
    pub fn normalized(
        ticker: impl Into<String>,
        rows: Vec<Observation>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        if start > end {
            return Err(MarketDataError::InvalidRange { start, end });
        }

        let mut kept: Vec<Observation> = rows
            .into_iter()
            .filter(|row| row.date >= start && row.date <= end)
            .collect();
        kept.sort_by_key(|row| row.date);

        let mut observations: Vec<Observation> = Vec::with_capacity(kept.len());
        for row in kept {
            match observations.last_mut() {
                Some(last) if last.date == row.date => *last = row,
                _ => observations.push(row),
            }
        }

        Self::new(ticker, observations)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    /// One field across the whole series
    pub fn column(&self, field: Field) -> Vec<f64> {
        self.observations.iter().map(|o| o.get(field)).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}
