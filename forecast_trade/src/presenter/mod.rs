//! Terminal tables, SVG charts and file exports for a pipeline report.
//!
//! Nothing here computes new results: every number shown comes from the
//! [`PipelineReport`]. A stage that failed is shown as a message in its own
//! section while the other sections still render.

pub mod charts;
pub mod tables;

use crate::error::Result;
use crate::models::{FitDiagnostics, ForecastResult};
use crate::params::PipelineParams;
use crate::pipeline::PipelineReport;
use crate::stationarity::StationarityVerdict;
use crate::utils::{forecast_accuracy, ForecastAccuracy};
use market_data::{Field, ObservationSeries};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUT_DIR: &str = "output";
pub const DEFAULT_TAIL_ROWS: usize = 10;
pub const SUMMARY_FILE: &str = "summary.json";

/// Renders reports to a writer and, optionally, to files
#[derive(Debug, Clone)]
pub struct Presenter {
    out_dir: PathBuf,
    charts: bool,
    export_csv: bool,
    tail_rows: usize,
}

impl Default for Presenter {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            charts: true,
            export_csv: false,
            tail_rows: DEFAULT_TAIL_ROWS,
        }
    }
}

/// Machine-readable digest written next to the exported tables
#[derive(Debug, Serialize)]
struct Summary<'a> {
    params: &'a PipelineParams,
    observations: usize,
    stationarity: Option<&'a StationarityVerdict>,
    diagnostics: Option<&'a FitDiagnostics>,
    accuracy: Option<ForecastAccuracy>,
    failures: Vec<String>,
}

impl Presenter {
    /// Terminal output only
    pub fn terminal() -> Self {
        Self {
            charts: false,
            ..Self::default()
        }
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    pub fn with_charts(mut self, charts: bool) -> Self {
        self.charts = charts;
        self
    }

    pub fn with_csv_export(mut self, export_csv: bool) -> Self {
        self.export_csv = export_csv;
        self
    }

    pub fn with_tail_rows(mut self, tail_rows: usize) -> Self {
        self.tail_rows = tail_rows.max(1);
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn writes_files(&self) -> bool {
        self.charts || self.export_csv
    }

    /// Print every section of `report` to `out`, then write charts and exports.
    ///
    /// Only failures to write to `out` itself, or to create the output
    /// directory, are returned. Chart and export failures are printed.
    pub fn present<W: Write>(&self, report: &PipelineReport, out: &mut W) -> Result<()> {
        let params = &report.params;
        let field = params.column;

        writeln!(
            out,
            "=== {} {} | {}..={} | {} observations ===",
            report.series.ticker(),
            field,
            params.start,
            params.end,
            report.series.len()
        )?;

        writeln!(out, "\n--- Raw data ---")?;
        match tables::raw_table(&report.series) {
            Ok(df) => writeln!(out, "{}", df)?,
            Err(e) => writeln!(out, "Raw data table unavailable: {}", e)?,
        }

        writeln!(out, "\n--- {} ---", field)?;
        match tables::selected_table(&report.series, field) {
            Ok(df) => writeln!(out, "{}", df)?,
            Err(e) => writeln!(out, "Column table unavailable: {}", e)?,
        }

        writeln!(out, "\n--- Stationarity (ADF) ---")?;
        match &report.stationarity {
            Ok(verdict) => write_verdict(out, verdict)?,
            Err(e) => writeln!(out, "Stationarity check failed: {}", e)?,
        }

        writeln!(out, "\n--- Decomposition ---")?;
        match &report.decomposition {
            Ok(decomposition) => match tables::decomposition_table(decomposition) {
                Ok(df) => writeln!(out, "{}", df)?,
                Err(e) => writeln!(out, "Decomposition table unavailable: {}", e)?,
            },
            Err(e) => writeln!(out, "Decomposition failed: {}", e)?,
        }

        writeln!(out, "\n--- Forecast ---")?;
        match &report.forecast {
            Ok(forecast) => self.write_forecast(out, &report.series, field, forecast)?,
            Err(e) => writeln!(out, "Forecast failed: {}", e)?,
        }

        if !self.writes_files() {
            return Ok(());
        }
        fs::create_dir_all(&self.out_dir)?;

        if self.charts {
            writeln!(out, "\n--- Charts ---")?;
            for written in self.render_charts(report) {
                match written {
                    Ok(Some(path)) => writeln!(out, "Wrote {}", path.display())?,
                    Ok(None) => {}
                    Err(e) => writeln!(out, "Chart error: {}", e)?,
                }
            }
        }

        if self.export_csv {
            writeln!(out, "\n--- Exports ---")?;
            for written in self.export(report) {
                match written {
                    Ok(path) => writeln!(out, "Wrote {}", path.display())?,
                    Err(e) => writeln!(out, "Export error: {}", e)?,
                }
            }
        }

        Ok(())
    }

    fn write_forecast<W: Write>(
        &self,
        out: &mut W,
        series: &ObservationSeries,
        field: Field,
        forecast: &ForecastResult,
    ) -> Result<()> {
        let diagnostics = &forecast.diagnostics;
        writeln!(
            out,
            "{}  sigma2 {:.6}  AIC {:.3}  {} iterations{}",
            diagnostics.model,
            diagnostics.sigma2,
            diagnostics.aic,
            diagnostics.iterations,
            if diagnostics.converged { "" } else { " (not converged)" }
        )?;

        match tables::prediction_table(forecast) {
            Ok(df) => writeln!(out, "{}", df)?,
            Err(e) => writeln!(out, "Prediction table unavailable: {}", e)?,
        }

        writeln!(out, "Actual, last {} observations:", self.tail_rows)?;
        match tables::actual_tail_table(series, field, self.tail_rows) {
            Ok(df) => writeln!(out, "{}", df)?,
            Err(e) => writeln!(out, "Actual table unavailable: {}", e)?,
        }

        if let Some(accuracy) = in_sample_accuracy(series, field, forecast) {
            writeln!(out, "{}", accuracy)?;
        }
        Ok(())
    }

    fn render_charts(&self, report: &PipelineReport) -> Vec<Result<Option<PathBuf>>> {
        let mut written = vec![charts::render_raw(&report.series, &self.out_dir)];
        if let Ok(decomposition) = &report.decomposition {
            written.push(charts::render_decomposition(decomposition, &self.out_dir));
        }
        if let Ok(forecast) = &report.forecast {
            written.push(charts::render_forecast(
                &report.series,
                report.params.column,
                forecast,
                &self.out_dir,
            ));
        }
        written
    }

    fn export(&self, report: &PipelineReport) -> Vec<Result<PathBuf>> {
        let field = report.params.column;
        let mut written = vec![tables::raw_table(&report.series)
            .and_then(|df| write_csv(df, &self.out_dir.join("raw.csv")))];

        if let Ok(decomposition) = &report.decomposition {
            written.push(
                tables::decomposition_table(decomposition)
                    .and_then(|df| write_csv(df, &self.out_dir.join("decomposition.csv"))),
            );
        }
        if let Ok(forecast) = &report.forecast {
            written.push(
                tables::prediction_table(forecast)
                    .and_then(|df| write_csv(df, &self.out_dir.join("forecast.csv"))),
            );
            written.push(
                tables::fitted_table(&report.series, field, forecast)
                    .and_then(|df| write_csv(df, &self.out_dir.join("fitted.csv"))),
            );
        }

        written.push(self.write_summary(report));
        written
    }

    fn write_summary(&self, report: &PipelineReport) -> Result<PathBuf> {
        let forecast = report.forecast.as_ref().ok();
        let failures = [
            report.stationarity.as_ref().err(),
            report.decomposition.as_ref().err(),
            report.forecast.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .map(ToString::to_string)
        .collect();

        let summary = Summary {
            params: &report.params,
            observations: report.series.len(),
            stationarity: report.stationarity.as_ref().ok(),
            diagnostics: forecast.map(|f| &f.diagnostics),
            accuracy: forecast
                .and_then(|f| in_sample_accuracy(&report.series, report.params.column, f)),
            failures,
        };

        let path = self.out_dir.join(SUMMARY_FILE);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, &summary)?;
        Ok(path)
    }
}

fn write_verdict<W: Write>(out: &mut W, verdict: &StationarityVerdict) -> Result<()> {
    writeln!(out, "{}", verdict.is_stationary)?;
    writeln!(out, "ADF statistic: {:.4}", verdict.statistic)?;
    writeln!(out, "p-value:       {:.4}", verdict.p_value)?;
    writeln!(
        out,
        "lag {} | {} observations | critical values 1% {:.3}, 5% {:.3}, 10% {:.3}",
        verdict.used_lag,
        verdict.n_obs,
        verdict.critical_values.one_percent,
        verdict.critical_values.five_percent,
        verdict.critical_values.ten_percent
    )?;
    Ok(())
}

/// Error of the one-step-ahead fit over the points where it is defined
fn in_sample_accuracy(
    series: &ObservationSeries,
    field: Field,
    forecast: &ForecastResult,
) -> Option<ForecastAccuracy> {
    let (fitted, actual): (Vec<f64>, Vec<f64>) = forecast
        .fitted
        .iter()
        .zip(series.column(field))
        .filter_map(|(fit, actual)| fit.map(|f| (f, actual)))
        .unzip();

    forecast_accuracy(&fitted, &actual).ok()
}

fn write_csv(mut df: DataFrame, path: &Path) -> Result<PathBuf> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(path.to_path_buf())
}
