//! Panel renderer: lays out a `PanelSpec` on a fixed-size canvas and writes
//! the artefact.

pub mod band;
pub mod dual_axis;
pub mod errorbar;
pub mod frame;
pub mod output;
pub mod panel;
pub mod scatter;
pub mod stacked;
pub mod style;

use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::Result;

pub use output::{OutputTarget, draw_svg, write_artefact};
pub use panel::{
    BandCurve, BandPanel, BandPoint, CloudColor, DualAxisPanel, ErrorBarPanel, ErrorPoint,
    ErrorSeries, Legend, LegendPlacement, Margins, Marker, PanelBody, PanelSpec, ScatterCloud,
    ScatterPanel, StackComponent, StackedPanel, XAxis,
};

pub fn draw_panel<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    spec: &PanelSpec,
) -> Result<()> {
    match &spec.body {
        PanelBody::ErrorBars(p) => errorbar::draw(canvas, spec, p),
        PanelBody::DualAxis(p) => dual_axis::draw(canvas, spec, p),
        PanelBody::JitterScatter(p) => scatter::draw(canvas, spec, p),
        PanelBody::StackedFractions(p) => stacked::draw(canvas, spec, p),
        PanelBody::BandedCurves(p) => band::draw(canvas, spec, p),
    }
}

pub fn render_svg(spec: &PanelSpec, size: (u32, u32)) -> Result<String> {
    draw_svg(size, |root| draw_panel(root, spec))
}

/// Renders `spec` and writes it to `<target.dir>/<spec.name>.<ext>`.
pub fn render_panel(spec: &PanelSpec, target: &OutputTarget) -> Result<PathBuf> {
    let svg = render_svg(spec, target.size)?;
    write_artefact(target, &spec.name, svg)
}
