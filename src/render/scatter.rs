use plotters::coord::Shift;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::render::frame::{self, Glyph, LegendEntry};
use crate::render::panel::{Marker, PanelSpec, ScatterCloud, ScatterPanel, XAxis};
use crate::render::style::{self, PlotClip};
use crate::stats::Summary;

/// Horizontal positions of every plotted value, indexed `[cloud][category][i]`.
///
/// Draws are taken category by category, and within a category cloud by
/// cloud, from one generator seeded with `panel.seed`, so the same panel
/// always yields the same positions.
pub fn jitter_positions(panel: &ScatterPanel) -> Vec<Vec<Vec<f64>>> {
    let mut rng = StdRng::seed_from_u64(panel.seed);
    let mut out: Vec<Vec<Vec<f64>>> = panel
        .clouds
        .iter()
        .map(|c| vec![Vec::new(); c.values.len()])
        .collect();
    for category in 0..panel.categories.len() {
        for (ci, cloud) in panel.clouds.iter().enumerate() {
            let Some(values) = cloud.values.get(category) else {
                continue;
            };
            let centre = category as f64 + cloud.offset;
            let w = cloud.jitter;
            out[ci][category] = values
                .iter()
                .map(|_| {
                    if w > 0.0 {
                        centre + rng.random_range(-w..w)
                    } else {
                        centre
                    }
                })
                .collect();
        }
    }
    out
}

/// Mean ± std of the finite values per category of one cloud; `None` where
/// the category has none.
pub fn cloud_summaries(cloud: &ScatterCloud) -> Vec<Option<Summary>> {
    cloud
        .values
        .iter()
        .map(|v| {
            let finite: Vec<f64> = v.iter().copied().filter(|x| x.is_finite()).collect();
            (!finite.is_empty()).then(|| Summary::of(&finite))
        })
        .collect()
}

pub(crate) fn draw<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    spec: &PanelSpec,
    panel: &ScatterPanel,
) -> Result<()> {
    let frame = frame::finalize(canvas, &spec.title, spec.margins)?;
    let axis = XAxis::Categorical(panel.categories.clone());
    let summaries: Vec<Vec<Option<Summary>>> = panel.clouds.iter().map(cloud_summaries).collect();

    let y_range = match spec.y_range {
        Some((lo, hi)) => lo..hi,
        None => {
            let mut ys: Vec<f64> = panel
                .clouds
                .iter()
                .flat_map(|c| c.values.iter().flatten().copied())
                .collect();
            for s in summaries.iter().flatten().flatten() {
                if let Some(e) = s.error() {
                    ys.push(s.mean - e);
                    ys.push(s.mean + e);
                }
            }
            frame::padded_range(ys, 0.05)
        }
    };

    let mut chart = frame::build_chart(
        &frame.plot,
        frame::category_range(panel.categories.len()),
        y_range,
        false,
    )?;
    frame::draw_mesh(&mut chart, &axis, &spec.y_desc)?;

    let clip = PlotClip::of(&chart);
    let positions = jitter_positions(panel);
    for (ci, cloud) in panel.clouds.iter().enumerate() {
        for (category, values) in cloud.values.iter().enumerate() {
            let color = style::series_color(cloud.color.index(category));
            for (&x, &y) in positions[ci][category].iter().zip(values) {
                if y.is_finite() {
                    let at = chart.backend_coord(&(x, y));
                    style::draw_marker_in(canvas, &clip, at, cloud.marker, color)?;
                }
            }
        }
    }

    let mut entries: Vec<LegendEntry> = panel
        .clouds
        .iter()
        .filter_map(|c| {
            c.label.as_ref().map(|label| LegendEntry {
                label: label.clone(),
                color: style::series_color(c.color.index(0)),
                glyph: Glyph::Marker(c.marker),
            })
        })
        .collect();

    for (cloud, sums) in panel.clouds.iter().zip(&summaries) {
        let mut line: Vec<(i32, i32)> = Vec::new();
        for (category, s) in sums.iter().enumerate() {
            let Some(s) = s.filter(|s| s.mean.is_finite()) else {
                continue;
            };
            let color = style::series_color(
                cloud
                    .summary_color
                    .unwrap_or_else(|| cloud.color.index(category)),
            );
            let x = category as f64 + cloud.offset;
            if let Some(e) = s.error() {
                style::draw_error_bar(
                    canvas,
                    &clip,
                    chart.backend_coord(&(x, s.mean - e)),
                    chart.backend_coord(&(x, s.mean + e)),
                    color,
                )?;
            }
            let at = chart.backend_coord(&(x, s.mean));
            style::draw_marker_in(canvas, &clip, at, Marker::Square, color)?;
            line.push(at);
        }
        if panel.summary_line.is_some() && line.len() > 1 {
            let color = style::series_color(cloud.summary_color.unwrap_or(cloud.color.index(0)));
            style::draw_polyline_in(canvas, &clip, &line, color.stroke_width(2))?;
        }
    }
    if let (Some(label), Some(cloud)) = (&panel.summary_line, panel.clouds.first()) {
        entries.push(LegendEntry {
            label: label.clone(),
            color: style::series_color(cloud.summary_color.unwrap_or(cloud.color.index(0))),
            glyph: Glyph::Line(Some(Marker::Square)),
        });
    }

    let region = frame::legend_region(&chart, &frame, spec.legend);
    frame::draw_legend(canvas, region, &entries, spec.legend)
}
