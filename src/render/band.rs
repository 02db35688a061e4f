use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::Result;
use crate::render::frame::{self, Glyph, LegendEntry};
use crate::render::panel::{BandPanel, BandPoint, PanelSpec, XAxis};
use crate::render::style;

/// Closed outlines of the mean ± std band, one per run of points whose
/// spread is defined.
pub fn band_outlines(points: &[BandPoint]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut run: Vec<BandPoint> = Vec::new();
    let mut flush = |run: &mut Vec<BandPoint>| {
        if run.len() > 1 {
            let mut outline: Vec<(f64, f64)> = run.iter().map(|p| (p.x, p.mean + p.std)).collect();
            outline.extend(run.iter().rev().map(|p| (p.x, p.mean - p.std)));
            out.push(outline);
        }
        run.clear();
    };
    for p in points {
        if p.mean.is_finite() && p.std.is_finite() {
            run.push(*p);
        } else {
            flush(&mut run);
        }
    }
    flush(&mut run);
    out
}

pub(crate) fn draw<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    spec: &PanelSpec,
    panel: &BandPanel,
) -> Result<()> {
    let frame = frame::finalize(canvas, &spec.title, spec.margins)?;
    let axis = XAxis::Numeric {
        desc: panel.x_desc.clone(),
    };
    let curves: Vec<_> = panel.curves.iter().filter(|c| !c.points.is_empty()).collect();

    let points = || curves.iter().flat_map(|c| c.points.iter());
    let x_range = frame::x_range(&axis, points().map(|p| p.x));
    let y_range = match spec.y_range {
        Some((lo, hi)) => lo..hi,
        None => {
            let mut ys: Vec<f64> = points().map(|p| p.mean).collect();
            ys.extend(
                points()
                    .filter(|p| p.std.is_finite())
                    .flat_map(|p| [p.mean - p.std, p.mean + p.std]),
            );
            if panel.zero_line {
                ys.push(0.0);
            }
            frame::padded_range(ys, 0.05)
        }
    };

    let mut chart = frame::build_chart(&frame.plot, x_range.clone(), y_range, false)?;
    frame::draw_mesh(&mut chart, &axis, &spec.y_desc)?;

    for curve in &curves {
        let color = style::series_color(curve.color);
        chart.draw_series(
            band_outlines(&curve.points)
                .into_iter()
                .map(|outline| Polygon::new(outline, color.mix(0.2).filled())),
        )?;
        chart.draw_series(LineSeries::new(
            curve
                .points
                .iter()
                .filter(|p| p.mean.is_finite())
                .map(|p| (p.x, p.mean)),
            color.stroke_width(2),
        ))?;
    }

    if panel.zero_line {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x_range.start, 0.0), (x_range.end, 0.0)],
            BLACK.mix(0.7).stroke_width(1),
        )))?;
    }

    let entries: Vec<LegendEntry> = curves
        .iter()
        .map(|c| LegendEntry {
            label: c.label.clone(),
            color: style::series_color(c.color),
            glyph: Glyph::Line(None),
        })
        .collect();
    let region = frame::legend_region(&chart, &frame, spec.legend);
    frame::draw_legend(canvas, region, &entries, spec.legend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, mean: f64, std: f64) -> BandPoint {
        BandPoint { x, mean, std }
    }

    #[test]
    fn undefined_spread_splits_the_band() {
        let outlines = band_outlines(&[
            pt(3.0, 1.0, 0.5),
            pt(4.0, 1.5, 0.25),
            pt(5.0, 1.2, f64::NAN),
            pt(6.0, 1.0, 0.5),
        ]);
        assert_eq!(outlines.len(), 1);
        assert_eq!(
            outlines[0],
            vec![(3.0, 1.5), (4.0, 1.75), (4.0, 1.25), (3.0, 0.5)]
        );
    }
}
