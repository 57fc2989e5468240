//! Provider abstraction over market data sources

use crate::{Observation, Result};
use chrono::NaiveDate;

/// A source of daily observations.
///
/// Implementations return the raw rows they have for `[start, end]`; an empty
/// vector is a valid answer and callers decide whether it is an error.
/// Rows may be unsorted or contain repeated dates.
pub trait MarketDataProvider {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Fetch daily rows for `ticker` between `start` and `end` inclusive
    fn fetch_daily(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<Observation>>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        (**self).fetch_daily(ticker, start, end)
    }
}
