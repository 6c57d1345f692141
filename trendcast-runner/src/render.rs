//! Chart model and renderers.
//!
//! The pipeline builds a backend-neutral [`Chart`] and hands it to a
//! [`ChartRenderer`]. [`GnuplotRenderer`] draws it through the `gnuplot`
//! binary (pngcairo terminal); tests substitute a renderer that only records
//! what it was asked to draw.

use chrono::{NaiveDate, NaiveTime};
use gnuplot::AlignType::{AlignLeft, AlignTop};
use gnuplot::Coordinate::Graph;
use gnuplot::{
    AutoOption, AxesCommon, DashType, Figure, LabelOption, LegendOption, PlotOption, Tick,
    TickOption,
};
use std::path::Path;
use thiserror::Error;
use trendcast_core::PricePoint;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("gnuplot failed: {0}")]
    Gnuplot(String),

    #[error("renderer produced no file at {0}")]
    MissingOutput(String),

    #[error("output path is not valid UTF-8: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Line appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub caption: String,
    pub color: String,
    pub kind: LineKind,
    pub points: Vec<PricePoint>,
}

/// Canvas and axis styling.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub width_px: u32,
    pub height_px: u32,
    pub x_label: String,
    pub y_label: String,
    pub y_max: f64,
    pub y_tick_step: f64,
    pub y_tick_rotation: f64,
    pub grid_line_width: f64,
}

impl Default for ChartStyle {
    /// 14x7 inches at 200 dpi with a fixed 0..220k USD axis.
    fn default() -> Self {
        Self {
            width_px: 2800,
            height_px: 1400,
            x_label: "Date".into(),
            y_label: "Price (USD)".into(),
            y_max: 220_000.0,
            y_tick_step: 10_000.0,
            y_tick_rotation: 45.0,
            grid_line_width: 0.5,
        }
    }
}

impl ChartStyle {
    /// Y tick positions and `$<n>` labels over `[0, y_max)`.
    pub fn y_ticks(&self) -> Vec<(f64, String)> {
        if self.y_tick_step <= 0.0 {
            return Vec::new();
        }
        let count = (self.y_max / self.y_tick_step).ceil() as usize;
        (0..count)
            .map(|i| {
                let y = i as f64 * self.y_tick_step;
                (y, format!("${}", y as i64))
            })
            .collect()
    }
}

/// Everything needed to draw one forecast chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub series: Vec<ChartSeries>,
    pub style: ChartStyle,
}

/// Draws a chart to an image file.
pub trait ChartRenderer {
    /// File extension of the produced image (without dot).
    fn extension(&self) -> &str;

    fn render(&self, chart: &Chart, path: &Path) -> Result<(), RenderError>;
}

/// Renders PNG charts with gnuplot's pngcairo terminal.
///
/// Requires a `gnuplot` executable with cairo support on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct GnuplotRenderer;

/// Seconds since the Unix epoch, gnuplot's time axis unit.
fn epoch_seconds(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64
}

impl ChartRenderer for GnuplotRenderer {
    fn extension(&self) -> &str {
        "png"
    }

    fn render(&self, chart: &Chart, path: &Path) -> Result<(), RenderError> {
        let out = path
            .to_str()
            .ok_or_else(|| RenderError::InvalidPath(path.display().to_string()))?;
        let style = &chart.style;
        let terminal = format!(
            "pngcairo size {},{} font ',22'",
            style.width_px, style.height_px
        );

        let mut fg = Figure::new();
        fg.set_terminal(&terminal, out);
        {
            let axes = fg.axes2d();
            axes.set_title(&chart.title, &[])
                .set_x_label(&style.x_label, &[])
                .set_y_label(&style.y_label, &[])
                .set_x_time(true)
                .set_x_ticks(
                    Some((AutoOption::Auto, 0)),
                    &[TickOption::Mirror(false), TickOption::Format("%Y")],
                    &[],
                )
                .set_y_range(AutoOption::Fix(0.0), AutoOption::Fix(style.y_max))
                .set_y_ticks_custom(
                    style
                        .y_ticks()
                        .into_iter()
                        .map(|(y, label)| Tick::Major(y, AutoOption::Fix(label))),
                    &[TickOption::Mirror(false)],
                    &[LabelOption::Rotate(style.y_tick_rotation)],
                )
                .set_grid_options(
                    false,
                    &[
                        PlotOption::LineStyle(DashType::Dash),
                        PlotOption::LineWidth(style.grid_line_width),
                    ],
                )
                .set_x_grid(true)
                .set_y_grid(true)
                .set_legend(
                    Graph(0.02),
                    Graph(0.98),
                    &[LegendOption::Placement(AlignLeft, AlignTop)],
                    &[],
                );

            for line in &chart.series {
                let xs: Vec<f64> = line.points.iter().map(|p| epoch_seconds(p.date)).collect();
                let ys: Vec<f64> = line.points.iter().map(|p| p.price).collect();
                let dash = match line.kind {
                    LineKind::Solid => DashType::Solid,
                    LineKind::Dashed => DashType::Dash,
                };
                axes.lines(
                    xs,
                    ys,
                    &[
                        PlotOption::Caption(line.caption.as_str()),
                        PlotOption::Color(line.color.as_str()),
                        PlotOption::LineStyle(dash),
                        PlotOption::LineWidth(2.0),
                    ],
                );
            }
        }

        fg.show()
            .map_err(|e| RenderError::Gnuplot(format!("{e:?}")))?;
        // Wait for gnuplot to flush the file before checking for it.
        fg.close();

        if !path.exists() {
            return Err(RenderError::MissingOutput(out.to_string()));
        }
        tracing::debug!(path = out, lines = chart.series.len(), "gnuplot rendered chart");
        Ok(())
    }
}
