//! Fixed column schemas of the Stage-2 CSV artefacts.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Text,
}

impl ColumnKind {
    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Int => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn int(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Int,
    }
}

const fn float(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Float,
    }
}

const fn text(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Text,
    }
}

/// Declared columns of one artefact type. Columns present in the file but not
/// declared here are ignored by the loader.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

pub const RESOLUTION_SWEEP: Schema = Schema {
    name: "louvain_resolution_sweep_summary",
    columns: &[
        int("N"),
        float("n"),
        float("resolution"),
        float("NMI_mean"),
        float("NMI_std"),
    ],
};

pub const PIVOT_SUMMARY: Schema = Schema {
    name: "pivot_gates_1_2_3_summary",
    columns: &[
        int("N"),
        float("n"),
        float("K_mean"),
        float("K_std"),
        float("super_J_mean"),
        float("super_J_std"),
        float("super_corr_mean"),
        float("super_corr_std"),
    ],
};

pub const DEFF_RUNS: Schema = Schema {
    name: "pivot_supergraph_deff_d_eff_runs",
    columns: &[int("N"), float("n"), float("d_eff")],
};

pub const CURVATURE_RUNS: Schema = Schema {
    name: "supergraph_curvature_runs",
    columns: &[int("N"), float("n"), float("F_mean")],
};

pub const SPECTRAL_CURVES: Schema = Schema {
    name: "pivot_core_exact_spectral_dim_curves",
    columns: &[int("N"), float("n"), text("mode"), int("t"), float("d_s")],
};

pub const HOPDIST_SEEDWISE: Schema = Schema {
    name: "all_all_hopdist_seedwise",
    columns: &[
        int("N"),
        float("n"),
        float("frac_d0"),
        float("frac_d1"),
        float("frac_d2"),
        float("frac_dge3"),
    ],
};

pub const RUN_SUMMARY: Schema = Schema {
    name: "run_summary",
    columns: &[
        int("N"),
        float("core_events_count"),
        float("halo_events_count"),
        float("Q_clock"),
    ],
};
