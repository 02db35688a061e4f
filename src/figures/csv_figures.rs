//! Figures 3 to 9: statistical panels built from the run artefacts.
//!
//! Every figure is split into a pure builder (relations in, `PanelSpec` out)
//! and a `run_*` wrapper that loads its artefacts and writes the output.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::data::{Relation, Schema};
use crate::data::schema::{
    CURVATURE_RUNS, DEFF_RUNS, HOPDIST_SEEDWISE, PIVOT_SUMMARY, RESOLUTION_SWEEP, RUN_SUMMARY,
    SPECTRAL_CURVES,
};
use crate::error::Result;
use crate::figures::{Figure, FigureContext};
use crate::render::style::category_marker;
use crate::render::{
    BandCurve, BandPanel, BandPoint, CloudColor, DualAxisPanel, ErrorBarPanel, ErrorPoint,
    ErrorSeries, Legend, LegendPlacement, Margins, Marker, PanelBody, PanelSpec, ScatterCloud,
    ScatterPanel, StackComponent, StackedPanel, XAxis, render_panel,
};
use crate::stats::{Curve, ValueGuard, curve_summary, group_summary};

pub const FIG03: &str = "fig03_partition_stability";
pub const FIG04: &str = "fig04_supergraph_summary_stability";
pub const FIG05: &str = "fig05_ballgrowth_deff";
pub const FIG06: &str = "fig06_forman_curvature_summary";
pub const FIG07: &str = "fig07_spectral_dimension_curves";
pub const FIG08: &str = "fig08_localisation_hopdist_stacked";
pub const FIG09: &str = "fig09_scaling_core_fraction_qclock";

pub const SWEEP_CSV: &str = "louvain_resolution_sweep_summary.csv";
pub const PIVOT_CSV: &str = "pivot_gates_1_2_3_summary.csv";
pub const DEFF_CSV: &str = "pivot_base/pivot_supergraph_deff_d_eff_runs.csv";
pub const CURVATURE_ALL_CSV: &str = "curvature/curvature_pivot_all_supergraph_curvature_runs.csv";
pub const CURVATURE_CORE_CSV: &str =
    "curvature/curvature_pivot_core_supergraph_curvature_runs.csv";
pub const SPECTRAL_CSV: &str = "spectral_dim/pivot_core_exact_spectral_dim_curves.csv";
pub const HOPDIST_CSVS: [&str; 2] = [
    "gate4/gate4_n0p4_all_all_hopdist_seedwise.csv",
    "gate4/gate4_n0p8_all_all_hopdist_seedwise.csv",
];
pub const RUN_SUMMARY_CSVS: [&str; 2] = [
    "gateA3_N16/gateA3_N16_run_summary.csv",
    "gateA3_N32/gateA3_N32_run_summary.csv",
];

const HOP_COLUMNS: [(&str, &str); 4] = [
    ("frac_d0", "d=0"),
    ("frac_d1", "d=1"),
    ("frac_d2", "d=2"),
    ("frac_dge3", "d≥3"),
];

pub const CSV_FIGURES: &[Figure] = &[
    Figure {
        name: FIG03,
        run: run_partition_stability,
    },
    Figure {
        name: FIG04,
        run: run_supergraph_summary,
    },
    Figure {
        name: FIG05,
        run: run_ballgrowth_deff,
    },
    Figure {
        name: FIG06,
        run: run_curvature_summary,
    },
    Figure {
        name: FIG07,
        run: run_spectral_dimension,
    },
    Figure {
        name: FIG08,
        run: run_hopdist_stacked,
    },
    Figure {
        name: FIG09,
        run: run_core_fraction_qclock,
    },
];

fn panel(name: &str, title: &str, y_desc: &str, legend: Legend, body: PanelBody) -> PanelSpec {
    PanelSpec {
        name: name.to_string(),
        title: title.to_string(),
        y_desc: y_desc.to_string(),
        y_range: None,
        legend,
        margins: Margins::default(),
        body,
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn error_points(curve: &Curve) -> Vec<ErrorPoint> {
    curve
        .points
        .iter()
        .map(|p| ErrorPoint {
            x: p.index as f64,
            y: p.summary.mean,
            err: p.summary.error(),
        })
        .collect()
}

/// Raw values of `column` per canonical position; empty where a category has
/// no rows.
fn values_by_position(
    ctx: &FigureContext,
    figure: &str,
    relation: &Relation,
    column: &str,
) -> Result<Vec<Vec<f64>>> {
    let values = relation.numeric(column)?;
    let mut out = vec![Vec::new(); ctx.canonical.len()];
    for group in ctx.groups(figure, relation)? {
        out[group.position] = group.values(&values);
    }
    Ok(out)
}

pub fn partition_stability(ctx: &FigureContext, sweep: &Relation) -> Result<PanelSpec> {
    let resolution = sweep.numeric("resolution")?;
    let nmi_mean = sweep.numeric("NMI_mean")?;
    let nmi_std = sweep.numeric("NMI_std")?;

    let series = ctx
        .groups(FIG03, sweep)?
        .into_iter()
        .map(|group| {
            let mut rows = group.rows;
            rows.sort_by(|&a, &b| resolution[a].total_cmp(&resolution[b]));
            ErrorSeries {
                label: group.label,
                marker: category_marker(group.position),
                color: group.position,
                points: rows
                    .iter()
                    .map(|&r| ErrorPoint {
                        x: resolution[r],
                        y: nmi_mean[r],
                        err: finite(nmi_std[r]),
                    })
                    .collect(),
            }
        })
        .collect();

    let mut spec = panel(
        FIG03,
        "Partition stability across seeds vs Louvain resolution",
        "Partition similarity (NMI)",
        Legend::at(LegendPlacement::LowerRight).columns(2),
        PanelBody::ErrorBars(ErrorBarPanel {
            x: XAxis::Numeric {
                desc: "Louvain resolution γ".into(),
            },
            series,
        }),
    );
    spec.y_range = Some((0.0, 1.0));
    Ok(spec)
}

pub fn supergraph_summary(ctx: &FigureContext, pivot: &Relation) -> Result<PanelSpec> {
    let keys = ctx.quad_keys();
    let labels: Vec<String> = ctx
        .groups(FIG04, pivot)?
        .into_iter()
        .map(|g| g.label)
        .collect();

    // Pre-aggregated table: one row per category, averaged if repeated.
    let series = |mean_col: &str,
                  std_col: &str,
                  label: &str,
                  marker: Marker,
                  color: usize|
     -> Result<ErrorSeries> {
        let means = group_summary(pivot, &keys, mean_col, &ctx.canonical)?;
        let stds = group_summary(pivot, &keys, std_col, &ctx.canonical)?;
        let points = means
            .iter()
            .zip(&stds)
            .enumerate()
            .map(|(i, (m, s))| ErrorPoint {
                x: i as f64,
                y: m.summary.mean,
                err: finite(s.summary.mean),
            })
            .collect();
        Ok(ErrorSeries {
            label: label.to_string(),
            marker,
            color,
            points,
        })
    };

    let left = vec![series("K_mean", "K_std", "K (communities)", Marker::Circle, 0)?];
    let right = vec![
        series(
            "super_J_mean",
            "super_J_std",
            "Edge Jaccard (super)",
            Marker::Square,
            1,
        )?,
        series(
            "super_corr_mean",
            "super_corr_std",
            "Weight corr (super)",
            Marker::Triangle,
            2,
        )?,
    ];

    Ok(panel(
        FIG04,
        "Super-graph summary and stability across seeds",
        "K (mean ± sd)",
        Legend::at(LegendPlacement::UpperRight),
        PanelBody::DualAxis(DualAxisPanel {
            x: XAxis::Categorical(labels),
            left,
            right,
            right_desc: "Stability (mean ± sd)".into(),
            right_range: None,
        }),
    ))
}

pub fn ballgrowth_deff(ctx: &FigureContext, deff: &Relation) -> Result<PanelSpec> {
    let jitter = &ctx.config.jitter;
    let values = values_by_position(ctx, FIG05, deff, "d_eff")?;
    Ok(panel(
        FIG05,
        "Ball-growth effective exponent on the community super-graph",
        "d_eff (ball-growth fit exponent)",
        Legend::at(LegendPlacement::UpperRight),
        PanelBody::JitterScatter(ScatterPanel {
            categories: ctx.canonical.labels(),
            clouds: vec![ScatterCloud {
                label: None,
                marker: Marker::Circle,
                color: CloudColor::ByCategory,
                offset: 0.0,
                jitter: jitter.width,
                values,
                summary_color: Some(ctx.canonical.len()),
            }],
            summary_line: Some("mean ± sd".into()),
            seed: jitter.seed,
        }),
    ))
}

pub fn curvature_summary(
    ctx: &FigureContext,
    all_edges: &Relation,
    core_edges: &Relation,
) -> Result<PanelSpec> {
    let jitter = &ctx.config.jitter;
    let cloud = |label: &str, marker, color, offset, values| ScatterCloud {
        label: Some(label.to_string()),
        marker,
        color: CloudColor::Fixed(color),
        offset,
        jitter: jitter.paired_width,
        values,
        summary_color: None,
    };
    let clouds = vec![
        cloud(
            "all edges",
            Marker::Circle,
            0,
            -jitter.paired_offset,
            values_by_position(ctx, FIG06, all_edges, "F_mean")?,
        ),
        cloud(
            "core edges",
            Marker::Triangle,
            1,
            jitter.paired_offset,
            values_by_position(ctx, FIG06, core_edges, "F_mean")?,
        ),
    ];
    Ok(panel(
        FIG06,
        "Curvature proxy on the community super-graph (all vs core)",
        "Edge-mean Forman curvature (F_mean)",
        Legend::at(LegendPlacement::LowerLeft),
        PanelBody::JitterScatter(ScatterPanel {
            categories: ctx.canonical.labels(),
            clouds,
            summary_line: None,
            seed: jitter.seed,
        }),
    ))
}

pub fn spectral_dimension(ctx: &FigureContext, curves: &Relation) -> Result<PanelSpec> {
    let limits = &ctx.config.curves;
    let exact = curves.filter_text("mode", "exact")?.filter_between(
        "t",
        limits.t_min as f64,
        limits.t_max as f64,
    )?;
    debug!(
        figure = FIG07,
        "{} of {} rows in exact mode within t range",
        exact.len(),
        curves.len()
    );
    let guard = ValueGuard {
        limit: limits.sanity_limit,
    };

    let mut bands = Vec::new();
    for group in ctx.groups(FIG07, &exact)? {
        let curve = curve_summary(&exact.take_rows(&group.rows), "t", "d_s", Some(guard))?;
        if curve.dropped > 0 {
            warn!(
                figure = FIG07,
                "{}: dropped {} points outside |d_s| < {}",
                group.label,
                curve.dropped,
                guard.limit
            );
        }
        if curve.is_empty() {
            warn!(figure = FIG07, "{}: no points left, curve omitted", group.label);
            continue;
        }
        bands.push(BandCurve {
            label: group.label,
            color: group.position,
            points: curve
                .points
                .iter()
                .map(|p| BandPoint {
                    x: p.index as f64,
                    mean: p.summary.mean,
                    std: p.summary.std,
                })
                .collect(),
        });
    }

    Ok(panel(
        FIG07,
        "Spectral-dimension curves on the community super-graph (exact mode)",
        "d_s(t)",
        Legend::at(LegendPlacement::UpperRight).columns(2),
        PanelBody::BandedCurves(BandPanel {
            x_desc: "t (walk steps)".into(),
            curves: bands,
            zero_line: true,
        }),
    ))
}

pub fn hopdist_stacked(ctx: &FigureContext, hops: &Relation) -> Result<PanelSpec> {
    let keys = ctx.quad_keys();
    let categories: Vec<String> = ctx
        .groups(FIG08, hops)?
        .into_iter()
        .map(|g| g.label)
        .collect();
    let components = HOP_COLUMNS
        .iter()
        .enumerate()
        .map(|(color, &(column, label))| {
            let means = group_summary(hops, &keys, column, &ctx.canonical)?;
            Ok(StackComponent {
                label: label.to_string(),
                color,
                values: means.iter().map(|c| c.summary.mean).collect(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut spec = panel(
        FIG08,
        "Thread localisation proxy: hop-distance distribution on the super-graph",
        "Fraction of mapped transitions",
        Legend::at(LegendPlacement::OutsideRight),
        PanelBody::StackedFractions(StackedPanel {
            categories,
            components,
        }),
    );
    spec.y_range = Some((0.0, 1.0));
    spec.margins.right = 0.82;
    Ok(spec)
}

/// Core fraction `core / (core + halo)` per run; NaN for a run with no events.
pub fn core_fraction(runs: &Relation) -> Result<Vec<f64>> {
    let core = runs.numeric("core_events_count")?;
    let halo = runs.numeric("halo_events_count")?;
    Ok(core.iter().zip(&halo).map(|(c, h)| c / (c + h)).collect())
}

pub fn core_fraction_qclock(runs: &Relation) -> Result<PanelSpec> {
    let phi = core_fraction(runs)?;
    let runs = runs.clone().with_float_column("phi_core", phi)?;
    let guard = Some(ValueGuard {
        limit: f64::INFINITY,
    });
    let phi_curve = curve_summary(&runs, "N", "phi_core", guard)?;
    let q_curve = curve_summary(&runs, "N", "Q_clock", guard)?;
    for (column, curve) in [("phi_core", &phi_curve), ("Q_clock", &q_curve)] {
        if curve.dropped > 0 {
            warn!(figure = FIG09, "{column}: skipped {} non-finite values", curve.dropped);
        }
    }

    let mut spec = panel(
        FIG09,
        "Scaling with N: core/halo separation and clock stability (n=0.8)",
        "Core fraction Φ (mean ± sd)",
        Legend::at(LegendPlacement::UpperCenter).columns(2),
        PanelBody::DualAxis(DualAxisPanel {
            x: XAxis::Numeric {
                desc: "Ensemble size N".into(),
            },
            left: vec![ErrorSeries {
                label: "Core fraction Φ".into(),
                marker: Marker::Circle,
                color: 0,
                points: error_points(&phi_curve),
            }],
            right: vec![ErrorSeries {
                label: "Q_clock".into(),
                marker: Marker::Square,
                color: 1,
                points: error_points(&q_curve),
            }],
            right_desc: "Clock quality Q_clock (mean ± sd)".into(),
            right_range: None,
        }),
    );
    spec.y_range = Some((0.0, 1.02));
    Ok(spec)
}

fn load_pair(ctx: &FigureContext, paths: [&str; 2], schema: &Schema) -> Result<Relation> {
    let first = ctx.load(paths[0], schema)?;
    let second = ctx.load(paths[1], schema)?;
    first.concat(&second)
}

fn run_partition_stability(ctx: &FigureContext) -> Result<PathBuf> {
    let sweep = ctx.load(SWEEP_CSV, &RESOLUTION_SWEEP)?;
    render_panel(&partition_stability(ctx, &sweep)?, &ctx.output())
}

fn run_supergraph_summary(ctx: &FigureContext) -> Result<PathBuf> {
    let pivot = ctx.load(PIVOT_CSV, &PIVOT_SUMMARY)?;
    render_panel(&supergraph_summary(ctx, &pivot)?, &ctx.output())
}

fn run_ballgrowth_deff(ctx: &FigureContext) -> Result<PathBuf> {
    let deff = ctx.load(DEFF_CSV, &DEFF_RUNS)?;
    render_panel(&ballgrowth_deff(ctx, &deff)?, &ctx.output())
}

fn run_curvature_summary(ctx: &FigureContext) -> Result<PathBuf> {
    let all_edges = ctx.load(CURVATURE_ALL_CSV, &CURVATURE_RUNS)?;
    let core_edges = ctx.load(CURVATURE_CORE_CSV, &CURVATURE_RUNS)?;
    render_panel(
        &curvature_summary(ctx, &all_edges, &core_edges)?,
        &ctx.output(),
    )
}

fn run_spectral_dimension(ctx: &FigureContext) -> Result<PathBuf> {
    let curves = ctx.load(SPECTRAL_CSV, &SPECTRAL_CURVES)?;
    render_panel(&spectral_dimension(ctx, &curves)?, &ctx.output())
}

fn run_hopdist_stacked(ctx: &FigureContext) -> Result<PathBuf> {
    let hops = load_pair(ctx, HOPDIST_CSVS, &HOPDIST_SEEDWISE)?;
    render_panel(&hopdist_stacked(ctx, &hops)?, &ctx.output())
}

fn run_core_fraction_qclock(ctx: &FigureContext) -> Result<PathBuf> {
    let runs = load_pair(ctx, RUN_SUMMARY_CSVS, &RUN_SUMMARY)?;
    render_panel(&core_fraction_qclock(&runs)?, &ctx.output())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FiguresConfig;
    use crate::data::ColumnData;

    fn ctx() -> FigureContext {
        FigureContext::new(std::env::temp_dir(), FiguresConfig::default()).unwrap()
    }

    #[test]
    fn spectral_curves_apply_mode_range_and_guard() {
        let rel = Relation::from_columns(
            "spectral",
            vec![
                ("N", ColumnData::Int(vec![4, 4, 4, 4, 4, 8])),
                ("n", ColumnData::Float(vec![0.4, 0.4, 0.4, 0.4, 0.4, 0.8])),
                (
                    "mode",
                    ColumnData::Text(
                        ["exact", "exact", "approx", "exact", "exact", "exact"]
                            .map(String::from)
                            .to_vec(),
                    ),
                ),
                ("t", ColumnData::Int(vec![3, 3, 3, 2, 4, 5])),
                (
                    "d_s",
                    ColumnData::Float(vec![1.0, 2.0, 9.0, 1.0, 7.0, 1.5]),
                ),
            ],
        )
        .unwrap();

        let spec = spectral_dimension(&ctx(), &rel).unwrap();
        let PanelBody::BandedCurves(body) = spec.body else {
            panic!("expected banded curves");
        };
        assert!(body.zero_line);
        // N=4 keeps t=3 only: the approx row, the t=2 row and the divergent t=4 row go.
        assert_eq!(body.curves.len(), 2);
        assert_eq!(body.curves[0].label, "N=4, n=0.4");
        assert_eq!(body.curves[0].points.len(), 1);
        assert_eq!(body.curves[0].points[0].mean, 1.5);
        assert_eq!(body.curves[1].label, "N=8, n=0.8");
        assert_eq!(body.curves[1].color, 3);
        assert!(body.curves[1].points[0].std.is_nan());
    }

    #[test]
    fn core_fraction_groups_by_ensemble_size() {
        let rel = Relation::from_columns(
            "runs",
            vec![
                ("N", ColumnData::Int(vec![32, 16, 16, 32])),
                (
                    "core_events_count",
                    ColumnData::Float(vec![30.0, 10.0, 30.0, 10.0]),
                ),
                (
                    "halo_events_count",
                    ColumnData::Float(vec![10.0, 30.0, 10.0, 30.0]),
                ),
                ("Q_clock", ColumnData::Float(vec![2.0, 1.0, 3.0, 4.0])),
            ],
        )
        .unwrap();

        let spec = core_fraction_qclock(&rel).unwrap();
        assert_eq!(spec.y_range, Some((0.0, 1.02)));
        let PanelBody::DualAxis(body) = spec.body else {
            panic!("expected dual axis");
        };
        let xs: Vec<f64> = body.left[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![16.0, 32.0]);
        assert_eq!(body.left[0].points[0].y, 0.5);
        assert_eq!(body.right[0].points[1].y, 3.0);
        assert_eq!(body.right[0].label, "Q_clock");
    }
}
