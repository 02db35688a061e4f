use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::Result;
use crate::render::errorbar;
use crate::render::frame::{self, LegendEntry};
use crate::render::panel::{DualAxisPanel, PanelSpec};
use crate::render::style::{FONT, LABEL_SIZE};

/// Affine map from the right-axis range onto the left one.
pub fn to_left(value: f64, right: &Range<f64>, left: &Range<f64>) -> f64 {
    let span = right.end - right.start;
    if span == 0.0 {
        return left.start;
    }
    left.start + (value - right.start) / span * (left.end - left.start)
}

/// One combined legend: left-axis series first, then right-axis series.
pub fn legend_entries(panel: &DualAxisPanel) -> Vec<LegendEntry> {
    panel
        .left
        .iter()
        .chain(&panel.right)
        .map(errorbar::legend_entry)
        .collect()
}

pub(crate) fn draw<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    spec: &PanelSpec,
    panel: &DualAxisPanel,
) -> Result<()> {
    let frame = frame::finalize(canvas, &spec.title, spec.margins)?;
    let x_range = frame::x_range(
        &panel.x,
        errorbar::all_points(&panel.left)
            .chain(errorbar::all_points(&panel.right))
            .map(|p| p.x),
    );
    let left_range = match spec.y_range {
        Some((lo, hi)) => lo..hi,
        None => frame::padded_range(errorbar::y_extent(&panel.left), 0.05),
    };
    let right_range = match panel.right_range {
        Some((lo, hi)) => lo..hi,
        None => frame::padded_range(errorbar::y_extent(&panel.right), 0.05),
    };

    let mut chart = frame::build_chart(&frame.plot, x_range.clone(), left_range.clone(), true)?;
    frame::draw_mesh(&mut chart, &panel.x, &spec.y_desc)?;

    for series in &panel.left {
        errorbar::draw_series(canvas, &chart, series, &|y| y)?;
    }
    let map = |y: f64| to_left(y, &right_range, &left_range);
    for series in &panel.right {
        errorbar::draw_series(canvas, &chart, series, &map)?;
    }

    let entries = legend_entries(panel);
    let region = frame::legend_region(&chart, &frame, spec.legend);
    frame::draw_legend(canvas, region, &entries, spec.legend)?;

    let mut chart = chart.set_secondary_coord(x_range, right_range.clone());
    chart
        .configure_secondary_axes()
        .axis_style(BLACK)
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, LABEL_SIZE + 1.0))
        .y_labels(8)
        .y_desc(panel.right_desc.clone())
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn right_values_map_affinely() {
        let right = 10.0..20.0;
        let left = 0.0..1.0;
        assert_eq!(to_left(10.0, &right, &left), 0.0);
        assert_eq!(to_left(20.0, &right, &left), 1.0);
        assert_abs_diff_eq!(to_left(12.5, &right, &left), 0.25, epsilon = 1e-12);
    }
}
