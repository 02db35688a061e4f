//! Figures 1 and 2: schematic drawings laid out in plot-fraction coordinates.

use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::figures::{Figure, FigureContext};
use crate::render::frame;
use crate::render::style::{self, FONT};
use crate::render::{Margins, Marker, draw_svg, write_artefact};

pub const FIG01: &str = "fig01_bedsheet";
pub const FIG02: &str = "fig02_stage2_pipeline";

pub const SCHEMATIC_FIGURES: &[Figure] = &[
    Figure {
        name: FIG01,
        run: run_bedsheet,
    },
    Figure {
        name: FIG02,
        run: run_pipeline,
    },
];

const BOX_PAD: f64 = 0.02;
const BOX_ROUNDING: f64 = 0.02;
const STROKES: usize = 26;

const NODES: [(f64, f64); 6] = [
    (0.60, 0.30),
    (0.67, 0.55),
    (0.83, 0.35),
    (0.90, 0.62),
    (0.74, 0.75),
    (0.58, 0.72),
];
const EDGES: [(usize, usize); 8] = [
    (0, 1),
    (1, 2),
    (1, 4),
    (4, 3),
    (4, 2),
    (5, 4),
    (5, 1),
    (2, 3),
];

const PIPELINE: [&str; 5] = [
    "Run outputs\n(outputs_cloth/...)",
    "Cloth extraction\n(hits1; core/halo)",
    "Community partition\n(Louvain; γ)",
    "Community super-graph\n(nodes=communities)",
    "Diagnostics\n(stability, d_eff, curvature,\noptional d_s, localisation)",
];
const PIPELINE_CENTRES: [f64; 5] = [0.80, 0.64, 0.48, 0.32, 0.16];

/// Drawing surface addressed in fractions of the plot area, y pointing up.
struct Sketch<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    width: f64,
    height: f64,
}

impl<'a, DB: DrawingBackend> Sketch<'a, DB> {
    fn new(area: &'a DrawingArea<DB, Shift>) -> Self {
        let (w, h) = area.dim_in_pixel();
        Self {
            area,
            width: w as f64,
            height: h as f64,
        }
    }

    fn px(&self, (x, y): (f64, f64)) -> (i32, i32) {
        (
            (x * self.width).round() as i32,
            ((1.0 - y) * self.height).round() as i32,
        )
    }

    /// Outline of the box at `(x, y)` of size `w` x `h`, padded and with
    /// rounded corners.
    fn rounded_box(&self, (x, y): (f64, f64), (w, h): (f64, f64)) -> Result<()> {
        let (x0, y0) = (x - BOX_PAD, y - BOX_PAD);
        let (x1, y1) = (x + w + BOX_PAD, y + h + BOX_PAD);
        let r = BOX_ROUNDING;
        let corners = [
            ((x1 - r, y1 - r), 0.0),
            ((x0 + r, y1 - r), 90.0),
            ((x0 + r, y0 + r), 180.0),
            ((x1 - r, y0 + r), 270.0),
        ];
        let mut outline: Vec<(i32, i32)> = Vec::new();
        for ((cx, cy), start) in corners {
            for step in 0..=6 {
                let a = (start + 15.0 * step as f64).to_radians();
                outline.push(self.px((cx + r * a.cos(), cy + r * a.sin())));
            }
        }
        if let Some(&first) = outline.first() {
            outline.push(first);
        }
        self.area
            .draw(&PathElement::new(outline, BLACK.stroke_width(1)))?;
        Ok(())
    }

    /// Multi-line text centred on `at`.
    fn text(&self, at: (f64, f64), text: &str, size: f64) -> Result<()> {
        let lines: Vec<&str> = text.lines().collect();
        let line_height = (size * 1.25).round() as i32;
        let (cx, cy) = self.px(at);
        let top = cy - line_height * (lines.len() as i32 - 1) / 2;
        let style = (FONT, size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        for (i, line) in lines.iter().enumerate() {
            self.area.draw(&Text::new(
                line.to_string(),
                (cx, top + line_height * i as i32),
                style.clone(),
            ))?;
        }
        Ok(())
    }

    fn line(&self, from: (f64, f64), to: (f64, f64), color: RGBColor, width: u32) -> Result<()> {
        self.area.draw(&PathElement::new(
            vec![self.px(from), self.px(to)],
            color.stroke_width(width),
        ))?;
        Ok(())
    }

    /// Straight arrow with a filled triangular head at `to`.
    fn arrow(&self, from: (f64, f64), to: (f64, f64)) -> Result<()> {
        let (fx, fy) = self.px(from);
        let (tx, ty) = self.px(to);
        let (dx, dy) = ((tx - fx) as f64, (ty - fy) as f64);
        let len = dx.hypot(dy);
        if len == 0.0 {
            return Ok(());
        }
        let (ux, uy) = (dx / len, dy / len);
        let head = 12.0_f64.min(len);
        let (bx, by) = (tx as f64 - ux * head, ty as f64 - uy * head);
        let half = head * 0.4;
        let base = (bx.round() as i32, by.round() as i32);
        self.area.draw(&PathElement::new(
            vec![(fx, fy), base],
            BLACK.stroke_width(1),
        ))?;
        self.area.draw(&Polygon::new(
            vec![
                (tx, ty),
                ((bx - uy * half).round() as i32, (by + ux * half).round() as i32),
                ((bx + uy * half).round() as i32, (by - ux * half).round() as i32),
            ],
            BLACK.filled(),
        ))?;
        Ok(())
    }
}

/// Endpoints of the random strokes in the left panel of the bed-sheet figure.
/// Each stroke takes four uniform draws: x0, y0, x1, y1.
pub fn bedsheet_strokes(seed: u64) -> Vec<((f64, f64), (f64, f64))> {
    let mut rng = StdRng::seed_from_u64(seed);
    let point = |rng: &mut StdRng| {
        let x = 0.07 + 0.37 * rng.random::<f64>();
        let y = 0.22 + 0.58 * rng.random::<f64>();
        (x, y)
    };
    (0..STROKES)
        .map(|_| {
            let a = point(&mut rng);
            let b = point(&mut rng);
            (a, b)
        })
        .collect()
}

pub fn draw_bedsheet<DB: DrawingBackend>(
    canvas: &DrawingArea<DB, Shift>,
    seed: u64,
) -> Result<()> {
    let frame = frame::finalize(
        canvas,
        "Bed-sheet picture: microstructure varies; coarse geometry persists",
        Margins::default(),
    )?;
    let sketch = Sketch::new(&frame.plot);

    sketch.rounded_box((0.04, 0.16), (0.43, 0.72))?;
    sketch.rounded_box((0.53, 0.16), (0.43, 0.72))?;
    sketch.text((0.255, 0.86), "Molecular noise\n(edge-level fluctuations)", 16.0)?;
    sketch.text(
        (0.745, 0.86),
        "Fabric deformation\n(persistent mesoscopic geometry)",
        16.0,
    )?;

    for (k, (a, b)) in bedsheet_strokes(seed).into_iter().enumerate() {
        sketch.line(a, b, style::series_color(k), 1)?;
    }
    for &(i, j) in &EDGES {
        sketch.line(NODES[i], NODES[j], style::series_color(0), 2)?;
    }
    for (k, &node) in NODES.iter().enumerate() {
        let color = style::series_color(k + 1);
        style::draw_marker(&frame.plot, sketch.px(node), Marker::Circle, color)?;
    }

    sketch.arrow((0.47, 0.52), (0.53, 0.52))?;
    sketch.text((0.50, 0.58), "coarse-grain\n(communities)", 15.0)?;
    Ok(())
}

pub fn draw_pipeline<DB: DrawingBackend>(canvas: &DrawingArea<DB, Shift>) -> Result<()> {
    let frame = frame::finalize(
        canvas,
        "Stage–2 pipeline: from runs to persistent cloth diagnostics",
        Margins::default(),
    )?;
    let sketch = Sketch::new(&frame.plot);
    let (x, w, h) = (0.50, 0.68, 0.12);

    for (label, &yc) in PIPELINE.iter().zip(&PIPELINE_CENTRES) {
        sketch.rounded_box((x - w / 2.0, yc - h / 2.0), (w, h))?;
        sketch.text((x, yc), label, 15.0)?;
    }
    for pair in PIPELINE_CENTRES.windows(2) {
        sketch.arrow((x, pair[0] - h / 2.0), (x, pair[1] + h / 2.0))?;
    }
    Ok(())
}

fn run_bedsheet(ctx: &FigureContext) -> Result<PathBuf> {
    let target = ctx.output();
    let seed = ctx.config.jitter.seed;
    let svg = draw_svg(target.size, |root| draw_bedsheet(root, seed))?;
    write_artefact(&target, FIG01, svg)
}

fn run_pipeline(ctx: &FigureContext) -> Result<PathBuf> {
    let target = ctx.output();
    let svg = draw_svg(target.size, |root| draw_pipeline(root))?;
    write_artefact(&target, FIG02, svg)
}
