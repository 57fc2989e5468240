//! User-selected parameters for one pipeline run

use crate::config;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use market_data::Field;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use trade_math::SarimaSpec;

/// Non-seasonal ARIMA order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ModelOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Seasonal order; all four values are chosen independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub period: usize,
}

impl SeasonalOrder {
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Self {
        Self { p, d, q, period }
    }

    pub fn none() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.p, self.d, self.q, self.period)
    }
}

/// Where forecast dates start counting from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForecastAnchor {
    /// Day after the last observed date
    #[default]
    LastObservation,
    /// Day after the requested end date, even if the data stops earlier
    RequestedEnd,
}

impl fmt::Display for ForecastAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastAnchor::LastObservation => f.write_str("last-observation"),
            ForecastAnchor::RequestedEnd => f.write_str("requested-end"),
        }
    }
}

impl FromStr for ForecastAnchor {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "last-observation" | "last" => Ok(ForecastAnchor::LastObservation),
            "requested-end" | "end" => Ok(ForecastAnchor::RequestedEnd),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown forecast anchor '{}', expected last-observation or requested-end",
                other
            ))),
        }
    }
}

/// Everything one pipeline run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub column: Field,
    pub order: ModelOrder,
    pub seasonal: SeasonalOrder,
    pub horizon: usize,
    pub anchor: ForecastAnchor,
    pub decomposition_period: usize,
}

impl Default for PipelineParams {
    fn default() -> Self {
        let (p, d, q) = config::DEFAULT_ORDER;
        let (sp, sd, sq, s) = config::DEFAULT_SEASONAL_ORDER;
        Self {
            ticker: config::DEFAULT_TICKER.to_string(),
            start: config::default_start(),
            end: config::default_end(),
            column: config::DEFAULT_COLUMN,
            order: ModelOrder::new(p, d, q),
            seasonal: SeasonalOrder::new(sp, sd, sq, s),
            horizon: config::DEFAULT_HORIZON,
            anchor: ForecastAnchor::default(),
            decomposition_period: config::DECOMPOSITION_PERIOD,
        }
    }
}

/// Canonical ticker if it is on the allow-list
pub fn validate_ticker(ticker: &str) -> Result<String> {
    config::allowed_ticker(ticker)
        .map(str::to_string)
        .ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Ticker '{}' is not supported; choose one of {}",
                ticker.trim(),
                config::ALLOWED_TICKERS.join(", ")
            ))
        })
}

/// Keys accepted by [`PipelineParams::with_value`]
pub const PARAM_KEYS: [&str; 14] = [
    "ticker",
    "start",
    "end",
    "column",
    "p",
    "d",
    "q",
    "seasonal-p",
    "seasonal-d",
    "seasonal-q",
    "seasonal-period",
    "horizon",
    "anchor",
    "period",
];

fn parse_date(key: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ForecastError::InvalidParameter(format!(
            "{} must be a YYYY-MM-DD date, got '{}'",
            key, value
        ))
    })
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        ForecastError::InvalidParameter(format!(
            "{} must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}

impl PipelineParams {
    /// Check the constraints every run needs.
    ///
    /// The ticker allow-list is not enforced here; see [`validate_ticker`].
    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Ticker must not be empty".to_string(),
            ));
        }
        if self.start > self.end {
            return Err(ForecastError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                self.start, self.end
            )));
        }
        validate_horizon(self.horizon)?;
        if self.decomposition_period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Decomposition period must be at least 2, got {}",
                self.decomposition_period
            )));
        }
        Ok(())
    }

    /// A copy with one parameter replaced, validated as a whole.
    ///
    /// `self` is left untouched, so a rejected value keeps the previous
    /// parameters in effect.
    pub fn with_value(&self, key: &str, value: &str) -> Result<PipelineParams> {
        let mut next = self.clone();
        match key.trim().to_lowercase().replace('_', "-").as_str() {
            "ticker" => next.ticker = validate_ticker(value)?,
            "start" => next.start = parse_date("start", value)?,
            "end" => next.end = parse_date("end", value)?,
            "column" => {
                next.column = value
                    .parse::<Field>()
                    .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?
            }
            "p" => next.order.p = parse_count("p", value)?,
            "d" => next.order.d = parse_count("d", value)?,
            "q" => next.order.q = parse_count("q", value)?,
            "seasonal-p" | "sp" => next.seasonal.p = parse_count("seasonal-p", value)?,
            "seasonal-d" | "sd" => next.seasonal.d = parse_count("seasonal-d", value)?,
            "seasonal-q" | "sq" => next.seasonal.q = parse_count("seasonal-q", value)?,
            "seasonal-period" | "s" => {
                next.seasonal.period = parse_count("seasonal-period", value)?
            }
            "horizon" => next.horizon = parse_count("horizon", value)?,
            "anchor" => next.anchor = value.parse()?,
            "period" => next.decomposition_period = parse_count("period", value)?,
            other => {
                return Err(ForecastError::InvalidParameter(format!(
                    "Unknown parameter '{}'; known parameters: {}",
                    other,
                    PARAM_KEYS.join(", ")
                )))
            }
        }
        next.validate()?;
        Ok(next)
    }

    /// Model orders in the form the estimator takes
    pub fn sarima_spec(&self) -> SarimaSpec {
        to_sarima_spec(self.order, self.seasonal)
    }
}

impl fmt::Display for PipelineParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticker:          {}", self.ticker)?;
        writeln!(f, "start:           {}", self.start)?;
        writeln!(f, "end:             {}", self.end)?;
        writeln!(f, "column:          {}", self.column)?;
        writeln!(f, "order:           {}", self.order)?;
        writeln!(f, "seasonal order:  {}", self.seasonal)?;
        writeln!(f, "horizon:         {}", self.horizon)?;
        writeln!(f, "anchor:          {}", self.anchor)?;
        write!(f, "decomp. period:  {}", self.decomposition_period)
    }
}

pub(crate) fn validate_horizon(horizon: usize) -> Result<()> {
    if !(config::MIN_HORIZON..=config::MAX_HORIZON).contains(&horizon) {
        return Err(ForecastError::InvalidParameter(format!(
            "Horizon must be between {} and {}, got {}",
            config::MIN_HORIZON,
            config::MAX_HORIZON,
            horizon
        )));
    }
    Ok(())
}

pub(crate) fn to_sarima_spec(order: ModelOrder, seasonal: SeasonalOrder) -> SarimaSpec {
    SarimaSpec::new(
        (order.p, order.d, order.q),
        (seasonal.p, seasonal.d, seasonal.q, seasonal.period),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let params = PipelineParams::default();
        assert_eq!(params.ticker, "AAPL");
        assert_eq!(params.column, Field::Close);
        assert_eq!(params.order, ModelOrder::new(1, 1, 1));
        assert_eq!(params.seasonal, SeasonalOrder::new(1, 1, 1, 12));
        assert_eq!(params.horizon, 30);
        assert_eq!(params.decomposition_period, 30);
        assert_eq!(params.anchor, ForecastAnchor::LastObservation);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_with_value_returns_fresh_params() {
        let params = PipelineParams::default();
        let next = params.with_value("ticker", "msft").unwrap();

        assert_eq!(next.ticker, "MSFT");
        assert_eq!(params.ticker, "AAPL");

        let next = next.with_value("seasonal-period", "7").unwrap();
        assert_eq!(next.seasonal, SeasonalOrder::new(1, 1, 1, 7));
        assert_eq!(next.order, ModelOrder::new(1, 1, 1));
    }

    #[test]
    fn test_with_value_rejects_bad_input() {
        let params = PipelineParams::default();

        assert!(params.with_value("ticker", "ZZZZ99").is_err());
        assert!(params.with_value("horizon", "0").is_err());
        assert!(params.with_value("horizon", "366").is_err());
        assert!(params.with_value("p", "-1").is_err());
        assert!(params.with_value("start", "2010/01/01").is_err());
        assert!(params.with_value("column", "price").is_err());
        assert!(params.with_value("colour", "red").is_err());
        assert!(params.with_value("start", "2999-01-01").is_err());
    }

    #[test]
    fn test_anchor_parsing() {
        assert_eq!(
            "requested-end".parse::<ForecastAnchor>().unwrap(),
            ForecastAnchor::RequestedEnd
        );
        assert_eq!(
            "Last_Observation".parse::<ForecastAnchor>().unwrap(),
            ForecastAnchor::LastObservation
        );
        assert!("tomorrow".parse::<ForecastAnchor>().is_err());
    }

    #[test]
    fn test_sarima_spec_keeps_seasonal_values_independent() {
        let params = PipelineParams {
            order: ModelOrder::new(2, 1, 0),
            seasonal: SeasonalOrder::new(0, 1, 1, 5),
            ..PipelineParams::default()
        };
        let spec = params.sarima_spec();

        assert_eq!(spec.order(), (2, 1, 0));
        assert_eq!(spec.seasonal_order(), (0, 1, 1, 5));
    }
}
