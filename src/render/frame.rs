//! Title, layout, chart frame and legend shared by every panel.

use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::Result;
use crate::render::panel::{Legend, LegendPlacement, Margins, Marker, XAxis};
use crate::render::style::{self, Chart2d, FONT, LABEL_SIZE, TITLE_SIZE};

/// Plot region and, when `Margins::right < 1`, the reserved legend strip.
pub struct Frame<DB: DrawingBackend> {
    pub plot: DrawingArea<DB, Shift>,
    pub side: Option<DrawingArea<DB, Shift>>,
}

/// Places the suptitle first, then lays out the remaining canvas inside
/// `[0, right] x [0, top]`. The order keeps the title clear of the axes.
pub fn finalize<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    title: &str,
    margins: Margins,
) -> Result<Frame<DB>> {
    let (w, h) = canvas.dim_in_pixel();
    let (title_area, body) = canvas.split_vertically(title_height(h, margins));

    let (tw, th) = title_area.dim_in_pixel();
    let title_style = (FONT, TITLE_SIZE)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    title_area.draw(&Text::new(
        title.to_string(),
        (tw as i32 / 2, th as i32 / 2),
        title_style,
    ))?;

    let right_px = (margins.right.clamp(0.1, 1.0) * w as f64).round() as u32;
    if right_px < w {
        let (plot, side) = body.split_horizontally(right_px);
        Ok(Frame {
            plot,
            side: Some(side),
        })
    } else {
        Ok(Frame {
            plot: body,
            side: None,
        })
    }
}

/// Height in pixels of the title strip above the plot on a canvas `h` high.
pub fn title_height(h: u32, margins: Margins) -> u32 {
    let px = ((1.0 - margins.top.clamp(0.0, 1.0)) * h as f64).round() as u32;
    px.max(TITLE_SIZE as u32 + 10)
}

pub fn build_chart<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    x: Range<f64>,
    y: Range<f64>,
    right_axis: bool,
) -> Result<Chart2d<'a, DB>> {
    let chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(44)
        .y_label_area_size(68)
        .right_y_label_area_size(if right_axis { 68 } else { 0 })
        .build_cartesian_2d(x, y)?;
    Ok(chart)
}

/// Grid, spines and tick labels for a primary coordinate frame.
pub fn draw_mesh<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    x: &XAxis,
    y_desc: &str,
) -> Result<()> {
    let labels = x.tick_labels().to_vec();
    let fmt = |v: &f64| category_tick(&labels, *v);
    let mut mesh = chart.configure_mesh();
    style::configure_axes(&mut mesh, y_desc);
    match x {
        XAxis::Categorical(labels) => {
            mesh.disable_x_mesh()
                .x_labels(category_tick_count(labels.len()))
                .x_label_formatter(&fmt);
        }
        XAxis::Numeric { desc } => {
            mesh.x_labels(10).x_desc(desc.clone());
        }
    }
    mesh.draw()?;
    Ok(())
}

/// X range for an axis: category slots, or the padded extent of `xs`.
pub fn x_range(x: &XAxis, xs: impl IntoIterator<Item = f64>) -> Range<f64> {
    match x {
        XAxis::Categorical(labels) => category_range(labels.len()),
        XAxis::Numeric { .. } => padded_range(xs, 0.05),
    }
}

/// Finite extent of `values` widened by `pad` of its span on each side.
pub fn padded_range(values: impl IntoIterator<Item = f64>, pad: f64) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        return (lo - 0.5)..(hi + 0.5);
    }
    (lo - pad * span)..(hi + pad * span)
}

pub fn category_range(n: usize) -> Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

/// Label for a tick at `x`, blank unless `x` sits on a category position.
pub fn category_tick(labels: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 || i as usize >= labels.len() {
        return String::new();
    }
    labels[i as usize].clone()
}

/// Tick request that always lands on every integer category position.
pub fn category_tick_count(n: usize) -> usize {
    2 * n.max(1) + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Line(Option<Marker>),
    Marker(Marker),
    Swatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub glyph: Glyph,
}

const LEGEND_ROW: i32 = 20;
const LEGEND_GLYPH: i32 = 26;
const LEGEND_PAD: i32 = 8;
const LEGEND_CHAR: i32 = 7;

/// Absolute pixel region a legend is placed in.
pub fn legend_region<DB: DrawingBackend>(
    chart: &Chart2d<'_, DB>,
    frame: &Frame<DB>,
    legend: Legend,
) -> (Range<i32>, Range<i32>) {
    match (legend.placement, &frame.side) {
        (LegendPlacement::OutsideRight, Some(side)) => side.get_pixel_range(),
        _ => chart.plotting_area().get_pixel_range(),
    }
}

/// Draws one combined legend inside `region` (absolute pixel ranges).
pub fn draw_legend<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    region: (Range<i32>, Range<i32>),
    entries: &[LegendEntry],
    legend: Legend,
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let cols = legend.columns.clamp(1, entries.len());
    let rows = entries.len().div_ceil(cols);
    let max_chars = entries
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0) as i32;
    let col_w = LEGEND_GLYPH + 6 + max_chars * LEGEND_CHAR + 12;
    let width = cols as i32 * col_w + 2 * LEGEND_PAD;
    let height = rows as i32 * LEGEND_ROW + 2 * LEGEND_PAD;

    let (xr, yr) = region;
    let x_mid = (xr.start + xr.end) / 2;
    let y_mid = (yr.start + yr.end) / 2;
    let left = xr.start + LEGEND_PAD;
    let right = xr.end - width - LEGEND_PAD;
    let top = yr.start + LEGEND_PAD;
    let bottom = yr.end - height - LEGEND_PAD;
    let (x0, y0) = match legend.placement {
        LegendPlacement::UpperRight => (right, top),
        LegendPlacement::UpperLeft => (left, top),
        LegendPlacement::UpperCenter => (x_mid - width / 2, top),
        LegendPlacement::LowerLeft => (left, bottom),
        LegendPlacement::LowerRight => (right, bottom),
        LegendPlacement::OutsideRight => (left, y_mid - height / 2),
    };

    canvas.draw(&Rectangle::new(
        [(x0, y0), (x0 + width, y0 + height)],
        WHITE.mix(0.8).filled(),
    ))?;

    let text_style = (FONT, LABEL_SIZE)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (k, entry) in entries.iter().enumerate() {
        let col = (k / rows) as i32;
        let row = (k % rows) as i32;
        let gx = x0 + LEGEND_PAD + col * col_w;
        let gy = y0 + LEGEND_PAD + row * LEGEND_ROW + LEGEND_ROW / 2;
        let centre = (gx + LEGEND_GLYPH / 2, gy);
        match entry.glyph {
            Glyph::Line(marker) => {
                canvas.draw(&PathElement::new(
                    vec![(gx, gy), (gx + LEGEND_GLYPH, gy)],
                    entry.color.stroke_width(2),
                ))?;
                if let Some(marker) = marker {
                    style::draw_marker(canvas, centre, marker, entry.color)?;
                }
            }
            Glyph::Marker(marker) => style::draw_marker(canvas, centre, marker, entry.color)?,
            Glyph::Swatch => canvas.draw(&Rectangle::new(
                [(gx + 4, gy - 6), (gx + LEGEND_GLYPH - 4, gy + 6)],
                entry.color.filled(),
            ))?,
        }
        canvas.draw(&Text::new(
            entry.label.clone(),
            (gx + LEGEND_GLYPH + 6, gy),
            text_style.clone(),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ticks_only_on_integers() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_tick(&labels, 0.0), "a");
        assert_eq!(category_tick(&labels, 1.0000000001), "b");
        assert_eq!(category_tick(&labels, 0.5), "");
        assert_eq!(category_tick(&labels, -1.0), "");
        assert_eq!(category_tick(&labels, 2.0), "");
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range([f64::NAN], 0.05), 0.0..1.0);
        assert_eq!(padded_range([2.0, 2.0], 0.05), 1.5..2.5);
        let r = padded_range([0.0, 10.0, f64::INFINITY], 0.1);
        assert!((r.start + 1.0).abs() < 1e-12 && (r.end - 11.0).abs() < 1e-12);
    }
}
