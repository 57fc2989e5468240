//! Offline provider reading CSV files in the Yahoo download layout
//!
//! Expected header: `Date,Open,High,Low,Close,Adj Close,Volume`. Yahoo marks
//! missing days with `null`; such rows are skipped.

use crate::provider::MarketDataProvider;
use crate::{MarketDataError, Observation, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open", deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(rename = "High", deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(rename = "Low", deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(rename = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(
        rename = "Adj Close",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    adj_close: Option<f64>,
    #[serde(rename = "Volume", deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

impl CsvRow {
    fn into_observation(self) -> Option<Observation> {
        let close = self.close?;
        Some(Observation {
            date: self.date,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close,
            adj_close: self.adj_close.unwrap_or(close),
            volume: self.volume?.max(0.0).round() as u64,
        })
    }
}

#[derive(Debug, Clone)]
enum Source {
    /// One file serving every ticker
    File(PathBuf),
    /// `<dir>/<TICKER>.csv`
    Directory(PathBuf),
}

/// Provider backed by local CSV files
#[derive(Debug, Clone)]
pub struct CsvProvider {
    source: Source,
}

impl CsvProvider {
    /// Serve every ticker from a single file.
    ///
    /// The ticker is not checked: whatever symbol is requested, the rows of
    /// `path` are returned. Use [`CsvProvider::from_dir`] to keep one file per
    /// symbol.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
        }
    }

    /// Look up `<TICKER>.csv` inside `dir`
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Directory(dir.into()),
        }
    }

    fn path_for(&self, ticker: &str) -> Result<PathBuf> {
        match &self.source {
            Source::File(path) => Ok(path.clone()),
            Source::Directory(dir) => {
                let path = dir.join(format!("{}.csv", ticker.to_uppercase()));
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(MarketDataError::UnknownTicker(ticker.to_string()))
                }
            }
        }
    }
}

/// Read every complete row of a Yahoo-layout CSV file
pub fn read_observations(path: &Path) -> Result<Vec<Observation>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for record in reader.deserialize::<CsvRow>() {
        match record?.into_observation() {
            Some(observation) => rows.push(observation),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {} incomplete rows in {}", skipped, path.display());
    }
    Ok(rows)
}

impl MarketDataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>> {
        let path = self.path_for(ticker)?;
        log::info!("Reading {} from {}", ticker, path.display());

        let rows: Vec<Observation> = read_observations(&path)?
            .into_iter()
            .filter(|row| row.date >= start && row.date <= end)
            .collect();

        log::info!("{} rows for {} in {}..={}", rows.len(), ticker, start, end);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2020-01-02,74.06,75.15,73.80,75.09,73.06,135480400
2020-01-03,74.29,75.14,74.13,74.36,72.35,146322800
2020-01-04,null,null,null,null,null,null
2020-01-06,73.45,74.99,73.19,74.95,72.93,118387200
";

    fn sample_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_reads_and_skips_null_rows() {
        let file = sample_file();
        let rows = read_observations(file.path()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].close, 75.09);
        assert_eq!(rows[0].adj_close, 73.06);
        assert_eq!(rows[2].volume, 118387200);
    }

    #[test]
    fn test_filters_to_range() {
        let file = sample_file();
        let provider = CsvProvider::from_file(file.path());
        let rows = provider
            .fetch_daily("AAPL", date("2020-01-03"), date("2020-01-31"))
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date("2020-01-03"));
    }

    #[test]
    fn test_single_file_ignores_ticker() {
        let file = sample_file();
        let provider = CsvProvider::from_file(file.path());
        let (start, end) = (date("2020-01-01"), date("2020-12-31"));

        let aapl = provider.fetch_daily("AAPL", start, end).unwrap();
        let other = provider.fetch_daily("ZZZZ99", start, end).unwrap();
        assert_eq!(aapl.len(), 3);
        assert_eq!(aapl, other);
    }

    #[test]
    fn test_directory_lookup() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("MSFT.csv"), SAMPLE).unwrap();
        let provider = CsvProvider::from_dir(dir.path());

        let rows = provider
            .fetch_daily("msft", date("2020-01-01"), date("2020-12-31"))
            .unwrap();
        assert_eq!(rows.len(), 3);

        assert!(matches!(
            provider.fetch_daily("ZZZZ99", date("2020-01-01"), date("2020-12-31")),
            Err(MarketDataError::UnknownTicker(_))
        ));
    }

    #[test]
    fn test_missing_file_is_error() {
        let provider = CsvProvider::from_file("/definitely/not/here.csv");
        assert!(provider
            .fetch_daily("AAPL", date("2020-01-01"), date("2020-12-31"))
            .is_err());
    }
}
