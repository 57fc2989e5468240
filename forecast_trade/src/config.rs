//! Built-in defaults and limits for the forecasting pipeline

use chrono::NaiveDate;
use market_data::Field;

/// Tickers the tool accepts
pub const ALLOWED_TICKERS: [&str; 10] = [
    "AAPL", "MSFT", "AMZN", "TSLA", "GOOG", "META", "TSM", "NVDA", "NFLX", "AMD",
];

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_COLUMN: Field = Field::Close;

/// `(p, d, q)`
pub const DEFAULT_ORDER: (usize, usize, usize) = (1, 1, 1);
/// `(P, D, Q, s)`
pub const DEFAULT_SEASONAL_ORDER: (usize, usize, usize, usize) = (1, 1, 1, 12);

pub const DEFAULT_HORIZON: usize = 30;
pub const MIN_HORIZON: usize = 1;
pub const MAX_HORIZON: usize = 365;

/// Period of the additive decomposition
pub const DECOMPOSITION_PERIOD: usize = 30;

/// The series is called stationary when the ADF p-value is below this
pub use trade_math::stationarity::DEFAULT_SIGNIFICANCE as SIGNIFICANCE_LEVEL;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub use market_data::yahoo::{BASE_URL_ENV as YAHOO_URL_ENV, DEFAULT_BASE_URL as YAHOO_BASE_URL};

/// First day of the default date range
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default()
}

/// Last day of the default date range (today, local time)
pub fn default_end() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Canonical upper-case ticker if it is on the allow-list
pub fn allowed_ticker(ticker: &str) -> Option<&'static str> {
    let wanted = ticker.trim().to_uppercase();
    ALLOWED_TICKERS.iter().copied().find(|t| *t == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_ticker() {
        assert_eq!(allowed_ticker("aapl"), Some("AAPL"));
        assert_eq!(allowed_ticker(" NVDA "), Some("NVDA"));
        assert_eq!(allowed_ticker("ZZZZ99"), None);
        assert_eq!(allowed_ticker(""), None);
    }

    #[test]
    fn test_defaults_are_consistent() {
        assert!(default_start() < default_end());
        assert!((MIN_HORIZON..=MAX_HORIZON).contains(&DEFAULT_HORIZON));
        assert!(allowed_ticker(DEFAULT_TICKER).is_some());
    }
}
