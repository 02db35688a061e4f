//! The fixed figure catalogue and the per-figure failure boundary.

pub mod csv_figures;
pub mod schematics;

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::FiguresConfig;
use crate::data::{Relation, Schema};
use crate::error::Result;
use crate::render::OutputTarget;
use crate::stats::{CanonicalGroup, CanonicalOrder, KeyColumn, canonical_groups};

/// Read-only state shared by every figure of one run.
#[derive(Debug, Clone)]
pub struct FigureContext {
    pub root: PathBuf,
    pub config: FiguresConfig,
    pub canonical: CanonicalOrder,
}

impl FigureContext {
    pub fn new(root: impl Into<PathBuf>, config: FiguresConfig) -> Result<Self> {
        let canonical = config.canonical_order()?;
        config.check_jitter()?;
        Ok(Self {
            root: root.into(),
            config,
            canonical,
        })
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.root.join(&self.config.layout.csv_dir)
    }

    pub fn figure_dir(&self) -> PathBuf {
        self.root.join(&self.config.layout.figure_dir)
    }

    pub fn output(&self) -> OutputTarget {
        OutputTarget::new(self.figure_dir(), &self.config)
    }

    pub fn load(&self, artefact: &str, schema: &Schema) -> Result<Relation> {
        crate::data::load(&self.csv_dir().join(artefact), schema)
    }

    /// Ensemble size compared exactly, density within the configured tolerance.
    pub fn quad_keys(&self) -> [KeyColumn; 2] {
        quad_keys(self.config.canonical.density_tolerance)
    }

    /// Canonical groups of `relation`, logging every canonical category that
    /// has no rows.
    pub fn groups(&self, figure: &str, relation: &Relation) -> Result<Vec<CanonicalGroup>> {
        let groups = canonical_groups(relation, &self.quad_keys(), &self.canonical)?;
        for (position, entry) in self.canonical.entries().iter().enumerate() {
            if !groups.iter().any(|g| g.position == position) {
                warn!(
                    figure,
                    artefact = relation.artefact(),
                    "no rows for {}, series omitted",
                    entry.label
                );
            }
        }
        Ok(groups)
    }
}

pub fn quad_keys(density_tolerance: f64) -> [KeyColumn; 2] {
    [
        KeyColumn::exact("N"),
        KeyColumn::tolerance("n", density_tolerance),
    ]
}

/// One named output of the catalogue.
#[derive(Clone, Copy)]
pub struct Figure {
    pub name: &'static str,
    pub run: fn(&FigureContext) -> Result<PathBuf>,
}

impl std::fmt::Debug for Figure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Figure").field("name", &self.name).finish()
    }
}

#[derive(Debug)]
pub struct FigureOutcome {
    pub name: &'static str,
    pub result: Result<PathBuf>,
}

/// Runs every figure in order. A failing figure is logged and recorded; the
/// remaining figures still run.
pub fn run_figures(ctx: &FigureContext, figures: &[Figure]) -> Vec<FigureOutcome> {
    figures
        .iter()
        .map(|figure| {
            info!(figure = figure.name, "rendering");
            let result = (figure.run)(ctx);
            if let Err(err) = &result {
                error!(figure = figure.name, "{err}");
            }
            FigureOutcome {
                name: figure.name,
                result,
            }
        })
        .collect()
}

/// Prints the per-figure summary lines and returns the number of failures.
pub fn report(outcomes: &[FigureOutcome]) -> usize {
    let mut failed = 0;
    for outcome in outcomes {
        match &outcome.result {
            Ok(path) => println!("[ok] wrote {}", display_path(path)),
            Err(err) => {
                failed += 1;
                eprintln!("[fail] {}: {err}", outcome.name);
            }
        }
    }
    failed
}

fn display_path(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
