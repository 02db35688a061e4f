use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::Result;
use crate::render::frame::{self, Glyph, LegendEntry};
use crate::render::panel::{ErrorBarPanel, ErrorPoint, ErrorSeries, PanelSpec};
use crate::render::style::{self, Chart2d, PlotClip};

pub(crate) fn draw<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    spec: &PanelSpec,
    panel: &ErrorBarPanel,
) -> Result<()> {
    let frame = frame::finalize(canvas, &spec.title, spec.margins)?;
    let x_range = frame::x_range(&panel.x, all_points(&panel.series).map(|p| p.x));
    let y_range = match spec.y_range {
        Some((lo, hi)) => lo..hi,
        None => frame::padded_range(y_extent(&panel.series), 0.05),
    };

    let mut chart = frame::build_chart(&frame.plot, x_range, y_range, false)?;
    frame::draw_mesh(&mut chart, &panel.x, &spec.y_desc)?;
    for series in &panel.series {
        draw_series(canvas, &chart, series, &|y| y)?;
    }

    let entries: Vec<LegendEntry> = panel.series.iter().map(legend_entry).collect();
    let region = frame::legend_region(&chart, &frame, spec.legend);
    frame::draw_legend(canvas, region, &entries, spec.legend)
}

pub(crate) fn all_points(series: &[ErrorSeries]) -> impl Iterator<Item = &ErrorPoint> {
    series.iter().flat_map(|s| s.points.iter())
}

/// Every finite `y`, `y - err` and `y + err`.
pub(crate) fn y_extent(series: &[ErrorSeries]) -> Vec<f64> {
    let mut out = Vec::new();
    for p in all_points(series) {
        out.push(p.y);
        if let Some(e) = p.err.filter(|e| e.is_finite()) {
            out.push(p.y - e);
            out.push(p.y + e);
        }
    }
    out
}

pub(crate) fn legend_entry(series: &ErrorSeries) -> LegendEntry {
    LegendEntry {
        label: series.label.clone(),
        color: style::series_color(series.color),
        glyph: Glyph::Line(Some(series.marker)),
    }
}

/// Connected markers with capped error bars, cut to the plotting area.
/// `map_y` moves values into the chart's y coordinate, which lets a second
/// axis share the frame.
pub(crate) fn draw_series<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    chart: &Chart2d<'_, DB>,
    series: &ErrorSeries,
    map_y: &dyn Fn(f64) -> f64,
) -> Result<()> {
    let color = style::series_color(series.color);
    let clip = PlotClip::of(chart);
    let px = |x: f64, y: f64| chart.backend_coord(&(x, map_y(y)));

    // A NaN mean breaks the connecting line.
    let mut run: Vec<(i32, i32)> = Vec::new();
    for p in &series.points {
        if p.x.is_finite() && p.y.is_finite() {
            run.push(px(p.x, p.y));
            continue;
        }
        style::draw_polyline_in(canvas, &clip, &run, color.stroke_width(2))?;
        run.clear();
    }
    style::draw_polyline_in(canvas, &clip, &run, color.stroke_width(2))?;

    for p in series.points.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
        if let Some(e) = p.err.filter(|e| e.is_finite()) {
            let (low, high) = (px(p.x, p.y - e), px(p.x, p.y + e));
            style::draw_error_bar(canvas, &clip, low, high, color)?;
        }
        style::draw_marker_in(canvas, &clip, px(p.x, p.y), series.marker, color)?;
    }
    Ok(())
}
