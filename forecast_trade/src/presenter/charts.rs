//! SVG charts rendered with plotters

use crate::decomposition::DecompositionResult;
use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;
use crate::utils::defined_segments;
use chrono::{Duration, NaiveDate};
use market_data::{Field, ObservationSeries};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

pub const CHART_SIZE: (u32, u32) = (1200, 700);
pub const RAW_CHART: &str = "raw.svg";
pub const DECOMPOSITION_CHART: &str = "decomposition.svg";
pub const FORECAST_CHART: &str = "forecast.svg";

const FIELD_COLORS: [RGBColor; 6] = [BLUE, GREEN, RED, BLACK, MAGENTA, CYAN];

fn render_error(err: impl std::fmt::Display) -> ForecastError {
    ForecastError::Render(err.to_string())
}

/// One named line that may contain undefined points
struct Line<'a> {
    label: &'a str,
    color: RGBColor,
    points: Vec<(NaiveDate, Option<f64>)>,
}

impl<'a> Line<'a> {
    fn new(label: &'a str, color: RGBColor, points: Vec<(NaiveDate, Option<f64>)>) -> Self {
        Self { label, color, points }
    }

    fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|(x, y)| y.filter(|v| v.is_finite()).map(|v| (*x, v)))
    }
}

/// Axis ranges covering every defined point; `None` if there is nothing to draw
fn bounds(lines: &[Line<'_>]) -> Option<(std::ops::Range<NaiveDate>, std::ops::Range<f64>)> {
    let mut points = lines.iter().flat_map(|line| line.defined()).peekable();
    let (first_x, first_y) = *points.peek()?;

    let (min_x, max_x, min_y, max_y) = points.fold(
        (first_x, first_x, first_y, first_y),
        |(min_x, max_x, min_y, max_y), (x, y)| {
            (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
        },
    );

    let max_x = if max_x > min_x { max_x } else { min_x + Duration::days(1) };
    let pad = if max_y > min_y { (max_y - min_y) * 0.05 } else { 1.0 };
    Some((min_x..max_x, (min_y - pad)..(max_y + pad)))
}

/// Draw `lines` into `area`, one path per contiguous run of defined points
fn draw_lines(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    caption: &str,
    lines: &[Line<'_>],
) -> Result<()> {
    let Some((x_range, y_range)) = bounds(lines) else {
        return Ok(());
    };

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_labels(10)
        .draw()
        .map_err(render_error)?;

    for line in lines {
        let color = line.color;
        let segments = defined_segments(&line.points);
        for (i, segment) in segments.into_iter().enumerate() {
            let series = chart
                .draw_series(LineSeries::new(segment, &color))
                .map_err(render_error)?;
            if i == 0 {
                series
                    .label(line.label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_error)?;

    Ok(())
}

fn with_canvas(
    path: &Path,
    draw: impl FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;
    draw(&root)?;
    root.present().map_err(render_error)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Every price field against date. Writes nothing for an empty series.
pub fn render_raw(series: &ObservationSeries, out_dir: &Path) -> Result<Option<PathBuf>> {
    if series.is_empty() {
        return Ok(None);
    }

    let dates = series.dates();
    let lines: Vec<Line<'static>> = Field::ALL
        .into_iter()
        .filter(Field::is_price)
        .zip(FIELD_COLORS)
        .map(|(field, color)| {
            let points = dates
                .iter()
                .copied()
                .zip(series.column(field).into_iter().map(Some))
                .collect();
            Line::new(field.label(), color, points)
        })
        .collect();

    let path = out_dir.join(RAW_CHART);
    let caption = format!("{} daily prices", series.ticker());
    with_canvas(&path, |root| draw_lines(root, &caption, &lines))?;
    Ok(Some(path))
}

/// Observed, trend, seasonal and residual in four stacked panels
pub fn render_decomposition(
    decomposition: &DecompositionResult,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    if decomposition.is_empty() {
        return Ok(None);
    }

    let dates = &decomposition.dates;
    let zip = |values: Vec<Option<f64>>| -> Vec<(NaiveDate, Option<f64>)> {
        dates.iter().copied().zip(values).collect()
    };

    let defined = |values: &[f64]| -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    };

    let panels = [
        Line::new("Observed", BLUE, zip(defined(&decomposition.observed))),
        Line::new("Trend", RED, zip(decomposition.trend.clone())),
        Line::new("Seasonal", GREEN, zip(defined(&decomposition.seasonal))),
        Line::new("Residual", BLACK, zip(decomposition.residual.clone())),
    ];

    let path = out_dir.join(DECOMPOSITION_CHART);
    with_canvas(&path, |root| {
        let areas = root.split_evenly((panels.len(), 1));
        for (area, panel) in areas.iter().zip(panels) {
            let caption = format!("{} (period {})", panel.label, decomposition.period);
            draw_lines(area, &caption, std::slice::from_ref(&panel))?;
        }
        Ok(())
    })?;
    Ok(Some(path))
}

/// Actual history, in-sample fit and forecast on one chart
pub fn render_forecast(
    series: &ObservationSeries,
    field: Field,
    forecast: &ForecastResult,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    if series.is_empty() && forecast.values.is_empty() {
        return Ok(None);
    }

    let actual = Line::new(
        "Actual",
        BLUE,
        series
            .dates()
            .into_iter()
            .zip(series.column(field).into_iter().map(Some))
            .collect(),
    );
    let fitted = Line::new(
        "Fitted",
        GREEN,
        forecast
            .history_dates
            .iter()
            .copied()
            .zip(forecast.fitted.iter().copied())
            .collect(),
    );
    let predicted = Line::new(
        "Forecast",
        RED,
        forecast.points().map(|(d, v)| (d, Some(v))).collect(),
    );

    let path = out_dir.join(FORECAST_CHART);
    let caption = format!(
        "{} {}: {} day forecast, {}",
        series.ticker(),
        field,
        forecast.horizon(),
        forecast.diagnostics.model
    );
    with_canvas(&path, |root| draw_lines(root, &caption, &[actual, fitted, predicted]))?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PipelineParams;
    use crate::pipeline::{run_pipeline, PipelineReport};
    use market_data::SyntheticProvider;
    use std::fs;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 3, d).unwrap()
    }

    fn report() -> PipelineReport {
        let params = PipelineParams {
            start: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2021, 9, 30).unwrap(),
            horizon: 10,
            ..PipelineParams::default()
        };
        run_pipeline(&params, &SyntheticProvider::new(9)).unwrap()
    }

    fn assert_svg(written: Result<Option<PathBuf>>, name: &str) {
        let path = written.unwrap().unwrap();
        assert_eq!(path.file_name().unwrap(), name);
        assert!(fs::metadata(&path).unwrap().len() > 0);
        assert!(fs::read_to_string(&path).unwrap().contains("<svg"));
    }

    #[test]
    fn test_render_raw_chart() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();

        assert_svg(render_raw(&report.series, dir.path()), RAW_CHART);
    }

    #[test]
    fn test_render_decomposition_with_undefined_edges() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();
        let decomposition = report.decomposition.as_ref().unwrap();
        assert!(decomposition.trend.first().unwrap().is_none());
        assert!(decomposition.residual.last().unwrap().is_none());

        assert_svg(render_decomposition(decomposition, dir.path()), DECOMPOSITION_CHART);
    }

    #[test]
    fn test_render_forecast_chart() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();
        let forecast = report.forecast.as_ref().unwrap();

        assert_svg(
            render_forecast(&report.series, Field::Close, forecast, dir.path()),
            FORECAST_CHART,
        );
    }

    #[test]
    fn test_missing_directory_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();

        let result = render_raw(&report.series, &dir.path().join("absent"));
        assert!(matches!(result, Err(ForecastError::Render(_))));
    }

    #[test]
    fn test_bounds_skip_undefined_points() {
        let line = Line::new(
            "x",
            BLUE,
            vec![(day(1), None), (day(2), Some(3.0)), (day(5), Some(7.0)), (day(9), None)],
        );
        let (x, y) = bounds(&[line]).unwrap();

        assert_eq!(x, day(2)..day(5));
        assert!(y.start < 3.0 && y.end > 7.0);
    }

    #[test]
    fn test_bounds_of_nothing() {
        let line = Line::new("x", BLUE, vec![(day(1), None), (day(2), Some(f64::NAN))]);
        assert!(bounds(&[line]).is_none());
        assert!(bounds(&[]).is_none());
    }

    #[test]
    fn test_single_point_gets_a_nonempty_range() {
        let line = Line::new("x", BLUE, vec![(day(4), Some(10.0))]);
        let (x, y) = bounds(&[line]).unwrap();

        assert!(x.start < x.end);
        assert!(y.start < y.end);
    }

    #[test]
    fn test_empty_inputs_render_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let series = ObservationSeries::new("AAPL", Vec::new()).unwrap();
        let decomposition = DecompositionResult {
            period: 30,
            dates: Vec::new(),
            observed: Vec::new(),
            trend: Vec::new(),
            seasonal: Vec::new(),
            residual: Vec::new(),
        };

        assert_eq!(render_raw(&series, dir.path()).unwrap(), None);
        assert_eq!(render_decomposition(&decomposition, dir.path()).unwrap(), None);
        assert!(!dir.path().join(RAW_CHART).exists());
    }
}
