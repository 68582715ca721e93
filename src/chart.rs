// Chart rendering: metric series -> RGB line chart with min/max/avg overlay lines.
// Only geometry is drawn here; titles and axis labels are laid out by the document writer.

use plotters::prelude::*;

use crate::error::RenderError;
use crate::models::{ChartImage, MetricDescriptor, MetricSeries, SeriesSummary};
use crate::window::TimeWindow;

pub const DEFAULT_CHART_WIDTH: u32 = 1000;
pub const DEFAULT_CHART_HEIGHT: u32 = 450;

/// Timestamp format used in chart titles and axis labels.
pub const CHART_TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

const LINE_COLOR: RGBColor = RGBColor(0, 120, 212);
const AVG_COLOR: RGBColor = RGBColor(230, 120, 20);
const BOUND_COLOR: RGBColor = RGBColor(150, 150, 150);
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);
const GRID_LINES: u32 = 4;
/// Series at or below this many points also get point markers.
const MARKER_THRESHOLD: usize = 60;

#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT)
    }
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `Ok(None)` for an empty series: no data means no chart, and no error.
    pub fn render(
        &self,
        series: &MetricSeries,
        instance_label: &str,
        descriptor: &MetricDescriptor,
        window: &TimeWindow,
    ) -> Result<Option<ChartImage>, RenderError> {
        let Some(summary) = series.summary() else {
            return Ok(None);
        };
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::new(&descriptor.name, "chart size must be non-zero"));
        }

        // x is seconds since window start, so every chart in a report shares one x range.
        let x_max = window.duration().num_seconds().max(1) as f64;
        let (y_min, y_max) = padded_range(summary.min, summary.max);
        let points: Vec<(f64, f64)> = series
            .samples()
            .iter()
            .map(|s| ((s.timestamp - window.start).num_seconds() as f64, s.value))
            .collect();

        let mut pixels = vec![0u8; self.width as usize * self.height as usize * 3];
        draw(
            &mut pixels,
            (self.width, self.height),
            x_max,
            (y_min, y_max),
            &points,
            &summary,
        )
        .map_err(|e| RenderError::new(&descriptor.name, e))?;

        let x_start = window.start.format(CHART_TIME_FORMAT).to_string();
        let x_end = window.end.format(CHART_TIME_FORMAT).to_string();
        Ok(Some(ChartImage {
            width: self.width,
            height: self.height,
            pixels,
            title: format!(
                "{} - {} ({} to {})",
                instance_label, descriptor.name, x_start, x_end
            ),
            y_label: format!("{} ({})", descriptor.name, descriptor.unit),
            x_start,
            x_end,
            y_min,
            y_max,
        }))
    }
}

/// Pads the value range by 10% so flat or single-point series stay drawable.
/// Non-negative series keep a non-negative floor. Bounds are always finite.
pub fn padded_range(min: f64, max: f64) -> (f64, f64) {
    // Half-span form cannot overflow for finite inputs.
    let half_span = max / 2.0 - min / 2.0;
    let pad = if half_span.abs() < f64::EPSILON {
        (max.abs() * 0.1).max(1.0)
    } else {
        half_span * 0.2
    };
    let lo = if min >= 0.0 { (min - pad).max(0.0) } else { min - pad };
    (lo.max(f64::MIN), (max + pad).min(f64::MAX))
}

fn draw(
    buf: &mut [u8],
    size: (u32, u32),
    x_max: f64,
    (y_min, y_max): (f64, f64),
    points: &[(f64, f64)],
    summary: &SeriesSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(buf, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

    for step in 1..GRID_LINES {
        let y = y_min + (y_max - y_min) * f64::from(step) / f64::from(GRID_LINES);
        chart.draw_series(LineSeries::new(
            [(0.0, y), (x_max, y)],
            GRID_COLOR.stroke_width(1),
        ))?;
    }
    chart.draw_series(LineSeries::new(
        [(0.0, y_max), (0.0, y_min), (x_max, y_min)],
        BLACK.stroke_width(2),
    ))?;

    for (value, color) in [
        (summary.min, BOUND_COLOR),
        (summary.max, BOUND_COLOR),
        (summary.avg, AVG_COLOR),
    ] {
        chart.draw_series(LineSeries::new(
            [(0.0, value), (x_max, value)],
            color.stroke_width(1),
        ))?;
    }

    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        LINE_COLOR.stroke_width(2),
    ))?;
    if points.len() <= MARKER_THRESHOLD {
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, 3, LINE_COLOR.filled())),
        )?;
    }

    root.present()?;
    Ok(())
}
