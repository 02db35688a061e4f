use std::fs;
use std::path::{Path, PathBuf};

use cloth_figures::FigureError;
use cloth_figures::config::{FiguresConfig, OutputFormat};
use cloth_figures::data::schema::DEFF_RUNS;
use cloth_figures::data::{ColumnData, Relation, load};
use cloth_figures::figures::csv_figures::{
    CSV_FIGURES, FIG03, FIG05, partition_stability, supergraph_summary,
};
use cloth_figures::figures::schematics::SCHEMATIC_FIGURES;
use cloth_figures::figures::{FigureContext, quad_keys, run_figures};
use cloth_figures::render::dual_axis::legend_entries;
use cloth_figures::render::frame::title_height;
use cloth_figures::render::{
    ErrorBarPanel, ErrorPoint, ErrorSeries, Legend, LegendPlacement, Margins, Marker, PanelBody,
    PanelSpec, XAxis, render_svg,
};
use cloth_figures::stats::{CanonicalOrder, group_summary};

fn unique_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "cloth_figures_pipeline_{}_{}",
        name,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    path
}

fn write_csv(root: &Path, rel: &str, contents: &str) {
    let path = root.join("csv").join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn svg_context(root: &Path) -> FigureContext {
    let mut config = FiguresConfig::default();
    config.output.format = OutputFormat::Svg;
    FigureContext::new(root, config).unwrap()
}

/// Every `y` drawn by polylines, polygons and circles in an SVG document.
fn drawn_ys(svg: &str) -> Vec<i32> {
    let mut ys = Vec::new();
    for (attr, pairs) in [(" points=\"", true), (" cy=\"", false)] {
        for chunk in svg.split(attr).skip(1) {
            let value = &chunk[..chunk.find('"').unwrap()];
            if pairs {
                for pair in value.split_whitespace() {
                    let (_, y) = pair.split_once(',').unwrap();
                    ys.push(y.parse().unwrap());
                }
            } else {
                ys.push(value.parse().unwrap());
            }
        }
    }
    ys
}

fn sample_std(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (values.len() as f64 - 1.0)).sqrt()
}

#[test]
fn four_categories_three_seeds_make_four_error_points() {
    // Rows deliberately out of canonical order.
    let rows: Vec<(i64, f64, f64)> = vec![
        (8, 0.8, 0.91),
        (4, 0.4, 0.52),
        (8, 0.4, 0.73),
        (4, 0.8, 0.60),
        (8, 0.8, 0.95),
        (4, 0.4, 0.55),
        (4, 0.8, 0.66),
        (8, 0.4, 0.70),
        (4, 0.4, 0.49),
        (8, 0.8, 0.90),
        (4, 0.8, 0.62),
        (8, 0.4, 0.77),
    ];
    let rel = Relation::from_columns(
        "seeds",
        vec![
            ("N", ColumnData::Int(rows.iter().map(|r| r.0).collect())),
            ("n", ColumnData::Float(rows.iter().map(|r| r.1).collect())),
            ("score", ColumnData::Float(rows.iter().map(|r| r.2).collect())),
        ],
    )
    .unwrap();
    let order = CanonicalOrder::quads(&[(4, 0.4), (4, 0.8), (8, 0.4), (8, 0.8)]);

    let summary = group_summary(&rel, &quad_keys(0.05), "score", &order).unwrap();
    let series = ErrorSeries {
        label: "score".into(),
        marker: Marker::Circle,
        color: 0,
        points: summary
            .iter()
            .map(|c| ErrorPoint {
                x: c.position as f64,
                y: c.summary.mean,
                err: c.summary.error(),
            })
            .collect(),
    };
    assert_eq!(series.points.len(), 4);

    let per_category = [
        vec![0.52, 0.55, 0.49],
        vec![0.60, 0.66, 0.62],
        vec![0.73, 0.70, 0.77],
        vec![0.91, 0.95, 0.90],
    ];
    for (point, values) in series.points.iter().zip(&per_category) {
        let err = point.err.unwrap();
        assert!((err - sample_std(values)).abs() < 1e-12);
    }

    let spec = PanelSpec {
        name: "seeds".into(),
        title: "Seeds per category".into(),
        y_desc: "score".into(),
        y_range: None,
        legend: Legend::at(LegendPlacement::UpperLeft),
        margins: Margins::default(),
        body: PanelBody::ErrorBars(ErrorBarPanel {
            x: XAxis::Categorical(order.labels()),
            series: vec![series],
        }),
    };
    let PanelBody::ErrorBars(body) = &spec.body else {
        unreachable!()
    };
    assert_eq!(
        body.x.tick_labels(),
        &["N=4, n=0.4", "N=4, n=0.8", "N=8, n=0.4", "N=8, n=0.8"]
    );

    let svg = render_svg(&spec, (850, 550)).unwrap();
    let mut last = 0;
    for label in order.labels() {
        let at = svg.find(&label).unwrap_or_else(|| panic!("tick {label} missing"));
        assert!(at >= last, "tick {label} out of order");
        last = at;
    }
    assert!(svg.contains("Seeds per category"));
}

#[test]
fn missing_column_fails_only_its_own_figure() {
    let root = unique_path("missing_column");
    write_csv(
        &root,
        "louvain_resolution_sweep_summary.csv",
        "N,n,resolution,NMI_mean,NMI_std\n\
         4,0.4,0.5,0.81,0.05\n\
         4,0.4,1.0,0.77,0.04\n\
         8,0.8,0.5,0.90,0.02\n\
         8,0.8,1.0,0.88,\n",
    );
    write_csv(
        &root,
        "pivot_base/pivot_supergraph_deff_d_eff_runs.csv",
        "ensemble,n,d_eff\n4,0.4,2.1\n8,0.8,2.4\n",
    );

    let ctx = svg_context(&root);
    let figures: Vec<_> = CSV_FIGURES
        .iter()
        .copied()
        .filter(|f| f.name == FIG03 || f.name == FIG05)
        .collect();
    let outcomes = run_figures(&ctx, &figures);
    assert_eq!(outcomes.len(), 2);

    let sweep = &outcomes[0];
    assert_eq!(sweep.name, FIG03);
    let path = sweep.result.as_ref().unwrap();
    assert_eq!(path, &root.join("figures").join(format!("{FIG03}.svg")));
    let svg = fs::read_to_string(path).unwrap();
    assert!(svg.contains("Partition stability across seeds vs Louvain resolution"));

    let deff = &outcomes[1];
    assert_eq!(deff.name, FIG05);
    match &deff.result {
        Err(FigureError::Schema { artefact, column }) => {
            assert_eq!(column, "N");
            assert_eq!(artefact, "pivot_supergraph_deff_d_eff_runs.csv");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(!root.join("figures").join(format!("{FIG05}.svg")).exists());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn absent_artefacts_report_not_found() {
    let root = unique_path("absent");
    let ctx = svg_context(&root);
    let outcomes = run_figures(&ctx, CSV_FIGURES);
    assert_eq!(outcomes.len(), 7);
    for outcome in &outcomes {
        assert!(
            matches!(outcome.result, Err(FigureError::NotFound { .. })),
            "{}: {:?}",
            outcome.name,
            outcome.result
        );
    }
}

#[test]
fn schematics_need_no_input() {
    let root = unique_path("schematics");
    let ctx = svg_context(&root);
    let outcomes = run_figures(&ctx, SCHEMATIC_FIGURES);
    for outcome in &outcomes {
        let path = outcome.result.as_ref().unwrap();
        assert!(path.exists(), "{} not written", path.display());
    }
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn loader_rejects_unparseable_cells() {
    let root = unique_path("parse");
    write_csv(
        &root,
        "deff.csv",
        "N,n,d_eff\n4,0.4,2.0\nfour,0.8,2.2\n",
    );
    let err = load(&root.join("csv").join("deff.csv"), &DEFF_RUNS).unwrap_err();
    match err {
        FigureError::Parse {
            row, column, value, ..
        } => {
            assert_eq!(row, 1);
            assert_eq!(column, "N");
            assert_eq!(value, "four");
        }
        other => panic!("expected parse error, got {other}"),
    }
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn values_beyond_fixed_range_stay_inside_the_plot() {
    let sweep = Relation::from_columns(
        "sweep",
        vec![
            ("N", ColumnData::Int(vec![4, 4, 8])),
            ("n", ColumnData::Float(vec![0.4, 0.4, 0.8])),
            ("resolution", ColumnData::Float(vec![0.5, 1.0, 0.5])),
            ("NMI_mean", ColumnData::Float(vec![0.95, 0.90, 1.3])),
            ("NMI_std", ColumnData::Float(vec![0.6, 0.05, 0.1])),
        ],
    )
    .unwrap();
    let ctx = svg_context(&std::env::temp_dir());
    let spec = partition_stability(&ctx, &sweep).unwrap();
    assert_eq!(spec.y_range, Some((0.0, 1.0)));

    let size = (850, 550);
    let svg = render_svg(&spec, size).unwrap();
    let title = title_height(size.1, spec.margins) as i32;
    let ys = drawn_ys(&svg);
    assert!(!ys.is_empty());
    for y in ys {
        assert!(y >= title, "element drawn at y={y} inside the {title}px title strip");
    }
}

#[test]
fn dual_axis_legend_lists_each_series_once() {
    let pivot = Relation::from_columns(
        "pivot",
        vec![
            ("N", ColumnData::Int(vec![4, 8])),
            ("n", ColumnData::Float(vec![0.4, 0.8])),
            ("K_mean", ColumnData::Float(vec![5.0, 7.0])),
            ("K_std", ColumnData::Float(vec![0.5, 0.7])),
            ("super_J_mean", ColumnData::Float(vec![0.6, 0.7])),
            ("super_J_std", ColumnData::Float(vec![0.05, 0.04])),
            ("super_corr_mean", ColumnData::Float(vec![0.8, 0.85])),
            ("super_corr_std", ColumnData::Float(vec![0.02, 0.03])),
        ],
    )
    .unwrap();
    let ctx = svg_context(&std::env::temp_dir());
    let spec = supergraph_summary(&ctx, &pivot).unwrap();
    let PanelBody::DualAxis(body) = &spec.body else {
        panic!("expected dual axis");
    };

    let labels: Vec<String> = legend_entries(body).into_iter().map(|e| e.label).collect();
    assert_eq!(
        labels,
        vec![
            "K (communities)",
            "Edge Jaccard (super)",
            "Weight corr (super)"
        ]
    );

    let svg = render_svg(&spec, (850, 550)).unwrap();
    for label in &labels {
        let shown = svg.matches(label.as_str()).count();
        assert_eq!(shown, 1, "{label} shown {shown} times");
    }
}

#[test]
fn default_pdf_output_keeps_text() {
    let root = unique_path("pdf");
    let ctx = FigureContext::new(&root, FiguresConfig::default()).unwrap();
    assert_eq!(ctx.config.output.format, OutputFormat::Pdf);
    let outcomes = run_figures(&ctx, SCHEMATIC_FIGURES);
    for outcome in &outcomes {
        let path = outcome.result.as_ref().unwrap();
        assert_eq!(path.extension().unwrap(), "pdf");
        let bytes = fs::read(path).unwrap();
        assert!(
            bytes.windows(5).any(|w| w == b"/Font"),
            "{} has no font resource",
            path.display()
        );
    }
    let _ = fs::remove_dir_all(&root);
}
