use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::Result;
use crate::render::frame::{self, Glyph, LegendEntry};
use crate::render::panel::{PanelSpec, StackedPanel, XAxis};
use crate::render::style::{self, PlotClip};

const BAR_HALF_WIDTH: f64 = 0.4;

/// `(bottom, top)` of every segment, indexed `[component][category]`.
/// Components are stacked in declaration order; a non-finite value is an
/// empty segment.
pub fn stack_extents(panel: &StackedPanel) -> Vec<Vec<(f64, f64)>> {
    let mut bottom = vec![0.0; panel.categories.len()];
    panel
        .components
        .iter()
        .map(|component| {
            bottom
                .iter_mut()
                .enumerate()
                .map(|(category, base)| {
                    let h = component
                        .values
                        .get(category)
                        .copied()
                        .filter(|v| v.is_finite())
                        .unwrap_or(0.0);
                    let segment = (*base, *base + h);
                    *base += h;
                    segment
                })
                .collect()
        })
        .collect()
}

pub(crate) fn draw<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    spec: &PanelSpec,
    panel: &StackedPanel,
) -> Result<()> {
    let frame = frame::finalize(canvas, &spec.title, spec.margins)?;
    let axis = XAxis::Categorical(panel.categories.clone());
    let extents = stack_extents(panel);
    let y_range = match spec.y_range {
        Some((lo, hi)) => lo..hi,
        None => frame::padded_range(
            extents.iter().flatten().flat_map(|&(b, t)| [b, t]),
            0.05,
        ),
    };

    let mut chart = frame::build_chart(
        &frame.plot,
        frame::category_range(panel.categories.len()),
        y_range,
        false,
    )?;
    frame::draw_mesh(&mut chart, &axis, &spec.y_desc)?;

    let clip = PlotClip::of(&chart);
    let corner = |x: f64, y: f64| chart.backend_coord(&(x, y));
    for (component, segments) in panel.components.iter().zip(&extents) {
        let color = style::series_color(component.color);
        for (category, &(bottom, top)) in segments.iter().enumerate() {
            let x = category as f64;
            let Some(rect) = clip.rect(
                corner(x - BAR_HALF_WIDTH, bottom),
                corner(x + BAR_HALF_WIDTH, top),
            ) else {
                continue;
            };
            canvas.draw(&Rectangle::new(rect, color.filled()))?;
        }
    }

    let entries: Vec<LegendEntry> = panel
        .components
        .iter()
        .map(|c| LegendEntry {
            label: c.label.clone(),
            color: style::series_color(c.color),
            glyph: Glyph::Swatch,
        })
        .collect();
    let region = frame::legend_region(&chart, &frame, spec.legend);
    frame::draw_legend(canvas, region, &entries, spec.legend)
}
