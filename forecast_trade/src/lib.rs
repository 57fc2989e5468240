//! # Forecast Trade
//!
//! Daily stock price analysis: fetch a ticker's history, test it for
//! stationarity, decompose it into trend and seasonal parts and forecast it
//! with a seasonal ARIMA model.
//!
//! ## Pipeline
//!
//! One run is `fetch -> (stationarity, decomposition, forecast) -> present`.
//! A failed fetch halts the run. The three analysis stages are independent
//! and each records its own outcome in the [`PipelineReport`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_trade::{run_pipeline, PipelineParams, Presenter};
//! use market_data::YahooProvider;
//! use std::time::Duration;
//!
//! let provider = YahooProvider::from_env(Duration::from_secs(30))?;
//! let params = PipelineParams::default().with_value("ticker", "MSFT")?;
//!
//! let report = run_pipeline(&params, &provider)?;
//! Presenter::default().present(&report, &mut std::io::stdout())?;
//! # Ok::<(), forecast_trade::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod decomposition;
pub mod error;
pub mod models;
pub mod params;
pub mod pipeline;
pub mod presenter;
pub mod session;
pub mod stationarity;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{fetch_series, TimeSeriesData};
pub use crate::decomposition::{decompose, DecompositionResult};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{forecast_series, ForecastModel, ForecastRequest, ForecastResult};
pub use crate::params::{ForecastAnchor, ModelOrder, PipelineParams, SeasonalOrder};
pub use crate::pipeline::{run_pipeline, PipelineReport};
pub use crate::presenter::Presenter;
pub use crate::session::{run_interactive, Command, Session};
pub use crate::stationarity::{check_stationarity, StationarityVerdict};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
