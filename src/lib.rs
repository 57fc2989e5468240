//! # Stock Forecaster
//!
//! Command-line front end for the `forecast_trade` pipeline.
//!
//! ```no_run
//! use clap::Parser;
//! use stock_forecaster::Cli;
//!
//! let cli = Cli::parse_from(["stock-forecaster", "--ticker", "NVDA", "--source", "synthetic"]);
//! let params = cli.params().unwrap();
//! assert_eq!(params.ticker, "NVDA");
//! ```

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use forecast_trade::config;
use forecast_trade::params::validate_ticker;
use forecast_trade::{ForecastAnchor, ModelOrder, PipelineParams, Presenter, SeasonalOrder};
use market_data::{CsvProvider, Field, MarketDataProvider, SyntheticProvider, YahooProvider};
use std::path::PathBuf;
use std::time::Duration;

pub use forecast_trade;
pub use market_data;
pub use trade_math;

/// Where price history comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Yahoo Finance chart API
    Yahoo,
    /// Local CSV file, or a directory of `<TICKER>.csv` files
    Csv,
    /// Seeded random walk
    Synthetic,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ticker symbol
    #[arg(long, default_value = config::DEFAULT_TICKER)]
    pub ticker: String,

    /// First day of the history, YYYY-MM-DD [default: 2010-01-01]
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the history, YYYY-MM-DD [default: today]
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Column to analyse: open, high, low, close, adj-close or volume
    #[arg(long, default_value = "close")]
    pub column: String,

    /// Autoregressive order
    #[arg(short = 'p', default_value_t = config::DEFAULT_ORDER.0)]
    pub p: usize,

    /// Differencing order
    #[arg(short = 'd', default_value_t = config::DEFAULT_ORDER.1)]
    pub d: usize,

    /// Moving-average order
    #[arg(short = 'q', default_value_t = config::DEFAULT_ORDER.2)]
    pub q: usize,

    #[arg(long, default_value_t = config::DEFAULT_SEASONAL_ORDER.0)]
    pub seasonal_p: usize,

    #[arg(long, default_value_t = config::DEFAULT_SEASONAL_ORDER.1)]
    pub seasonal_d: usize,

    #[arg(long, default_value_t = config::DEFAULT_SEASONAL_ORDER.2)]
    pub seasonal_q: usize,

    #[arg(long, default_value_t = config::DEFAULT_SEASONAL_ORDER.3)]
    pub seasonal_period: usize,

    /// Days to forecast, 1 to 365
    #[arg(long, default_value_t = config::DEFAULT_HORIZON)]
    pub horizon: usize,

    /// Day the forecast counts from: last-observation or requested-end
    #[arg(long, default_value = "last-observation")]
    pub anchor: String,

    #[arg(long, value_enum, default_value_t = Source::Yahoo)]
    pub source: Source,

    /// CSV file or directory for `--source csv`; a single file serves any ticker
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Seed for `--source synthetic`
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First price of the `--source synthetic` walk
    #[arg(long, default_value_t = 100.0)]
    pub start_price: f64,

    /// Mean daily log return of the `--source synthetic` walk
    #[arg(long, default_value_t = 0.0003, allow_negative_numbers = true)]
    pub drift: f64,

    /// Daily log return standard deviation of the `--source synthetic` walk
    #[arg(long, default_value_t = 0.015)]
    pub volatility: f64,

    /// HTTP timeout for `--source yahoo`
    #[arg(long, default_value_t = config::DEFAULT_HTTP_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Directory for charts and exports
    #[arg(long, default_value = forecast_trade::presenter::DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Skip writing SVG charts
    #[arg(long, default_value_t = false)]
    pub no_charts: bool,

    /// Write tables and a JSON summary to the output directory
    #[arg(long, default_value_t = false)]
    pub export_csv: bool,

    /// Rows of recent history printed under the forecast
    #[arg(long, default_value_t = forecast_trade::presenter::DEFAULT_TAIL_ROWS)]
    pub tail_rows: usize,

    /// Read commands from stdin after the first run
    #[arg(long, default_value_t = false)]
    pub interactive: bool,
}

impl Cli {
    /// Validated pipeline parameters from the flags
    pub fn params(&self) -> Result<PipelineParams> {
        let defaults = PipelineParams::default();
        let column: Field = self
            .column
            .parse()
            .with_context(|| format!("invalid --column '{}'", self.column))?;
        let anchor: ForecastAnchor = self.anchor.parse().context("invalid --anchor")?;

        let params = PipelineParams {
            ticker: validate_ticker(&self.ticker)?,
            start: self.start.unwrap_or(defaults.start),
            end: self.end.unwrap_or(defaults.end),
            column,
            order: ModelOrder::new(self.p, self.d, self.q),
            seasonal: SeasonalOrder::new(
                self.seasonal_p,
                self.seasonal_d,
                self.seasonal_q,
                self.seasonal_period,
            ),
            horizon: self.horizon,
            anchor,
            decomposition_period: config::DECOMPOSITION_PERIOD,
        };
        params.validate()?;
        Ok(params)
    }

    /// The data source selected by `--source`
    pub fn provider(&self) -> Result<Box<dyn MarketDataProvider>> {
        let provider: Box<dyn MarketDataProvider> = match self.source {
            Source::Yahoo => Box::new(
                YahooProvider::from_env(Duration::from_secs(self.timeout_secs))
                    .context("failed to build the HTTP client")?,
            ),
            Source::Csv => {
                let Some(path) = &self.csv else {
                    bail!("--source csv needs --csv <file or directory>");
                };
                if path.is_dir() {
                    Box::new(CsvProvider::from_dir(path))
                } else {
                    Box::new(CsvProvider::from_file(path))
                }
            }
            Source::Synthetic => {
                if !(self.start_price.is_finite() && self.start_price > 0.0) {
                    bail!("--start-price must be a positive number");
                }
                Box::new(
                    SyntheticProvider::new(self.seed)
                        .with_starting_price(self.start_price)
                        .with_drift(self.drift)
                        .with_volatility(self.volatility),
                )
            }
        };
        log::info!("Using {} data source", provider.name());
        Ok(provider)
    }

    pub fn presenter(&self) -> Presenter {
        Presenter::default()
            .with_out_dir(&self.out_dir)
            .with_charts(!self.no_charts)
            .with_csv_export(self.export_csv)
            .with_tail_rows(self.tail_rows)
    }
}
