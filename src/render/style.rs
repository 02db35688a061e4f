//! Shared colours, markers and axis styling.

use std::ops::Range;

use plotters::chart::MeshStyle;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::error::Result;
use crate::render::panel::Marker;

pub const FONT: &str = "sans-serif";
pub const TITLE_SIZE: f64 = 20.0;
pub const LABEL_SIZE: f64 = 14.0;
pub const MARKER_RADIUS: i32 = 4;
pub const CAP_HALF_WIDTH: i32 = 4;

const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Marker per canonical category position: o, s, ^, D.
pub const CATEGORY_MARKERS: [Marker; 4] = [
    Marker::Circle,
    Marker::Square,
    Marker::Triangle,
    Marker::Diamond,
];

pub fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

pub fn category_marker(position: usize) -> Marker {
    CATEGORY_MARKERS[position % CATEGORY_MARKERS.len()]
}

pub type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Major grid, faint minor grid, left/bottom spines only.
pub fn configure_axes<'a, 'b, DB: DrawingBackend>(
    mesh: &mut MeshStyle<'a, 'b, RangedCoordf64, RangedCoordf64, DB>,
    y_desc: &str,
) {
    mesh.bold_line_style(BLACK.mix(0.22))
        .light_line_style(BLACK.mix(0.06))
        .axis_style(BLACK)
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, LABEL_SIZE + 1.0))
        .y_labels(8)
        .y_desc(y_desc.to_string());
}

/// Draws a marker centred on an absolute backend coordinate.
pub fn draw_marker<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    at: (i32, i32),
    marker: Marker,
    color: RGBColor,
) -> Result<()> {
    let r = MARKER_RADIUS;
    let (x, y) = at;
    let fill = color.filled();
    match marker {
        Marker::Circle => canvas.draw(&Circle::new(at, r, fill))?,
        Marker::Square => canvas.draw(&Rectangle::new([(x - r, y - r), (x + r, y + r)], fill))?,
        Marker::Triangle => canvas.draw(&TriangleMarker::new(at, r + 1, fill))?,
        Marker::Diamond => canvas.draw(&Polygon::new(
            vec![(x, y - r - 1), (x + r, y), (x, y + r + 1), (x - r, y)],
            fill,
        ))?,
    }
    Ok(())
}

/// Pixel bounds of a chart's plotting area, edges included. Data drawn in
/// absolute coordinates is cut to these bounds so values outside a fixed
/// axis range never reach the title or the label areas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotClip {
    pub x: Range<i32>,
    pub y: Range<i32>,
}

impl PlotClip {
    pub fn of<DB: DrawingBackend>(chart: &Chart2d<'_, DB>) -> Self {
        let (x, y) = chart.plotting_area().get_pixel_range();
        Self { x, y }
    }

    pub fn contains(&self, (x, y): (i32, i32)) -> bool {
        (self.x.start..=self.x.end).contains(&x) && (self.y.start..=self.y.end).contains(&y)
    }

    /// The part of segment `a`-`b` inside the bounds (Liang-Barsky).
    pub fn segment(&self, a: (i32, i32), b: (i32, i32)) -> Option<((i32, i32), (i32, i32))> {
        let (x0, y0) = (a.0 as f64, a.1 as f64);
        let (dx, dy) = (b.0 as f64 - x0, b.1 as f64 - y0);
        let (xmin, xmax) = (self.x.start as f64, self.x.end as f64);
        let (ymin, ymax) = (self.y.start as f64, self.y.end as f64);

        let (mut t0, mut t1) = (0.0f64, 1.0f64);
        for (p, q) in [(-dx, x0 - xmin), (dx, xmax - x0), (-dy, y0 - ymin), (dy, ymax - y0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
        let at = |t: f64| ((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
        Some((at(t0), at(t1)))
    }

    /// Visible pieces of a polyline; a piece ends wherever the line leaves
    /// the bounds.
    pub fn polyline(&self, points: &[(i32, i32)]) -> Vec<Vec<(i32, i32)>> {
        let mut pieces = Vec::new();
        let mut current: Vec<(i32, i32)> = Vec::new();
        for pair in points.windows(2) {
            match self.segment(pair[0], pair[1]) {
                Some((p, q)) => {
                    if current.last() != Some(&p) {
                        if current.len() > 1 {
                            pieces.push(std::mem::take(&mut current));
                        }
                        current.clear();
                        current.push(p);
                    }
                    current.push(q);
                }
                None => {
                    if current.len() > 1 {
                        pieces.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
            }
        }
        if current.len() > 1 {
            pieces.push(current);
        }
        pieces
    }

    /// Rectangle spanned by `a` and `b` cut to the bounds; `None` when
    /// nothing of it is visible.
    pub fn rect(&self, a: (i32, i32), b: (i32, i32)) -> Option<[(i32, i32); 2]> {
        let x0 = a.0.min(b.0).max(self.x.start);
        let x1 = a.0.max(b.0).min(self.x.end);
        let y0 = a.1.min(b.1).max(self.y.start);
        let y1 = a.1.max(b.1).min(self.y.end);
        (x0 < x1 && y0 < y1).then_some([(x0, y0), (x1, y1)])
    }
}

/// Draws a marker only when its centre lies inside `clip`.
pub fn draw_marker_in<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    clip: &PlotClip,
    at: (i32, i32),
    marker: Marker,
    color: RGBColor,
) -> Result<()> {
    if clip.contains(at) {
        draw_marker(canvas, at, marker, color)?;
    }
    Ok(())
}

/// Polyline cut to `clip`.
pub fn draw_polyline_in<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    clip: &PlotClip,
    points: &[(i32, i32)],
    style: ShapeStyle,
) -> Result<()> {
    for piece in clip.polyline(points) {
        canvas.draw(&PathElement::new(piece, style))?;
    }
    Ok(())
}

/// Vertical bar between two absolute coordinates with short horizontal caps.
/// The bar is cut to `clip`; a cap is drawn only where its end is visible.
pub fn draw_error_bar<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    clip: &PlotClip,
    low: (i32, i32),
    high: (i32, i32),
    color: RGBColor,
) -> Result<()> {
    let stroke = color.stroke_width(1);
    let Some((a, b)) = clip.segment(low, high) else {
        return Ok(());
    };
    canvas.draw(&PathElement::new(vec![a, b], stroke))?;
    for (x, y) in [low, high] {
        if clip.contains((x, y)) {
            canvas.draw(&PathElement::new(
                vec![(x - CAP_HALF_WIDTH, y), (x + CAP_HALF_WIDTH, y)],
                stroke,
            ))?;
        }
    }
    Ok(())
}
