//! Seeded random-walk provider for demos and offline tests

use crate::provider::MarketDataProvider;
use crate::{Observation, Result};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Generates geometric random-walk prices on weekdays.
///
/// The walk always starts at a fixed epoch (or at `start` if earlier), so the
/// same seed and ticker give the same price for a date whatever range is
/// requested.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    seed: u64,
    starting_price: f64,
    /// Mean daily log return
    drift: f64,
    /// Standard deviation of the daily log return
    volatility: f64,
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or_default()
}

impl SyntheticProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            starting_price: 100.0,
            drift: 0.0003,
            volatility: 0.015,
        }
    }

    pub fn with_starting_price(mut self, price: f64) -> Self {
        self.starting_price = price;
        self
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility.abs();
        self
    }

    /// Per-ticker seed so different symbols get different paths
    fn ticker_seed(&self, ticker: &str) -> u64 {
        ticker
            .to_uppercase()
            .bytes()
            .fold(self.seed ^ 0x9E37_79B9_7F4A_7C15, |acc, b| {
                acc.rotate_left(5).wrapping_mul(31).wrapping_add(u64::from(b))
            })
    }
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let mut rows = Vec::new();
        if start > end {
            return Ok(rows);
        }

        let mut rng = StdRng::seed_from_u64(self.ticker_seed(ticker));
        let returns = Normal::new(self.drift, self.volatility.max(f64::MIN_POSITIVE))
            .map_err(|e| crate::MarketDataError::Parse(e.to_string()))?;

        let mut date = start.min(epoch());
        let mut price = self.starting_price;

        while date <= end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let open = price;
                let close = open * returns.sample(&mut rng).exp();
                let high = open.max(close) * (1.0 + rng.gen::<f64>() * self.volatility * 0.5);
                let low = open.min(close) * (1.0 - rng.gen::<f64>() * self.volatility * 0.5);
                let volume = rng.gen_range(1_000_000..10_000_000);
                price = close;

                if date >= start {
                    rows.push(Observation {
                        date,
                        open,
                        high,
                        low,
                        close,
                        adj_close: close,
                        volume,
                    });
                }
            }

            date = match date.checked_add_days(Days::new(1)) {
                Some(next) => next,
                None => break,
            };
        }

        log::info!(
            "Generated {} synthetic rows for {} in {}..={}",
            rows.len(),
            ticker,
            start,
            end
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_weekdays_only_and_positive() {
        let provider = SyntheticProvider::new(1);
        let rows = provider
            .fetch_daily("AAPL", date("2021-03-01"), date("2021-03-31"))
            .unwrap();

        assert_eq!(rows.len(), 23);
        for row in &rows {
            assert!(!matches!(row.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(row.close > 0.0);
            assert!(row.low <= row.open.min(row.close));
            assert!(row.high >= row.open.max(row.close));
        }
    }

    #[test]
    fn test_deterministic_and_range_independent() {
        let provider = SyntheticProvider::new(7);
        let wide = provider
            .fetch_daily("MSFT", date("2020-01-01"), date("2020-06-30"))
            .unwrap();
        let narrow = provider
            .fetch_daily("MSFT", date("2020-03-02"), date("2020-03-06"))
            .unwrap();

        let matching: Vec<&Observation> = wide
            .iter()
            .filter(|o| o.date >= date("2020-03-02") && o.date <= date("2020-03-06"))
            .collect();
        assert_eq!(matching.len(), narrow.len());
        for (a, b) in matching.iter().zip(&narrow) {
            assert_eq!(**a, *b);
        }
    }

    #[test]
    fn test_tickers_differ() {
        let provider = SyntheticProvider::new(7);
        let a = provider
            .fetch_daily("AAPL", date("2020-01-01"), date("2020-01-31"))
            .unwrap();
        let b = provider
            .fetch_daily("AMZN", date("2020-01-01"), date("2020-01-31"))
            .unwrap();
        assert_ne!(a[5].close, b[5].close);
    }

    #[test]
    fn test_walk_parameters() {
        let provider = SyntheticProvider::new(3)
            .with_starting_price(50.0)
            .with_drift(0.01)
            .with_volatility(0.0);
        let rows = provider
            .fetch_daily("AAPL", date("2000-01-03"), date("2000-01-14"))
            .unwrap();

        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].open, 50.0);
        for (i, row) in rows.iter().enumerate() {
            let expected = 50.0 * (0.01 * (i + 1) as f64).exp();
            assert!((row.close - expected).abs() < 1e-9);
            assert_eq!(row.high, row.close);
            assert_eq!(row.low, row.open);
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let provider = SyntheticProvider::new(0);
        assert!(provider
            .fetch_daily("AAPL", date("2020-02-01"), date("2020-01-01"))
            .unwrap()
            .is_empty());
    }
}
