use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{FigureError, Result};
use crate::stats::CanonicalOrder;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_csv_dir")]
    pub csv_dir: String,
    #[serde(default = "LayoutConfig::default_figure_dir")]
    pub figure_dir: String,
}

impl LayoutConfig {
    fn default_csv_dir() -> String {
        "csv".to_string()
    }
    fn default_figure_dir() -> String {
        "figures".to_string()
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            csv_dir: Self::default_csv_dir(),
            figure_dir: Self::default_figure_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "OutputConfig::default_width_px")]
    pub width_px: u32,
    #[serde(default = "OutputConfig::default_height_px")]
    pub height_px: u32,
}

impl OutputConfig {
    // 8.5 x 5.5 in at 100 px per inch
    fn default_width_px() -> u32 {
        850
    }
    fn default_height_px() -> u32 {
        550
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            width_px: Self::default_width_px(),
            height_px: Self::default_height_px(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct QuadConfig {
    pub size: i64,
    pub density: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalConfig {
    #[serde(default = "CanonicalConfig::default_density_tolerance")]
    pub density_tolerance: f64,
    #[serde(default = "CanonicalConfig::default_quads")]
    pub quads: Vec<QuadConfig>,
}

impl CanonicalConfig {
    fn default_quads() -> Vec<QuadConfig> {
        [(4, 0.4), (4, 0.8), (8, 0.4), (8, 0.8)]
            .into_iter()
            .map(|(size, density)| QuadConfig { size, density })
            .collect()
    }
    // densities come from a one-decimal enumeration
    fn default_density_tolerance() -> f64 {
        0.05
    }
}

impl Default for CanonicalConfig {
    fn default() -> Self {
        Self {
            density_tolerance: Self::default_density_tolerance(),
            quads: Self::default_quads(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveConfig {
    #[serde(default = "CurveConfig::default_t_min")]
    pub t_min: i64,
    #[serde(default = "CurveConfig::default_t_max")]
    pub t_max: i64,
    #[serde(default = "CurveConfig::default_sanity_limit")]
    pub sanity_limit: f64,
}

impl CurveConfig {
    fn default_t_min() -> i64 {
        3
    }
    fn default_t_max() -> i64 {
        100
    }
    fn default_sanity_limit() -> f64 {
        5.0
    }
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            t_min: Self::default_t_min(),
            t_max: Self::default_t_max(),
            sanity_limit: Self::default_sanity_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JitterConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "JitterConfig::default_width")]
    pub width: f64,
    #[serde(default = "JitterConfig::default_paired_width")]
    pub paired_width: f64,
    #[serde(default = "JitterConfig::default_paired_offset")]
    pub paired_offset: f64,
}

impl JitterConfig {
    fn default_width() -> f64 {
        0.10
    }
    fn default_paired_width() -> f64 {
        0.03
    }
    fn default_paired_offset() -> f64 {
        0.14
    }
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            width: Self::default_width(),
            paired_width: Self::default_paired_width(),
            paired_offset: Self::default_paired_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FiguresConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub canonical: CanonicalConfig,
    #[serde(default)]
    pub curves: CurveConfig,
    #[serde(default)]
    pub jitter: JitterConfig,
}

impl FiguresConfig {
    /// Reads `path` if it exists; a missing, unreadable or invalid file falls
    /// back to the built-in defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(cfg) => return cfg,
                Err(err) => {
                    warn!(
                        "Failed to parse config {}: {err}. Using defaults.",
                        path.display()
                    );
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read config {}: {err}. Using defaults.",
                    path.display()
                );
            }
        }
        Self::default()
    }

    pub fn canonical_order(&self) -> Result<CanonicalOrder> {
        let quads = &self.canonical.quads;
        if quads.is_empty() {
            return Err(FigureError::Config("canonical.quads is empty".into()));
        }
        if !(self.canonical.density_tolerance >= 0.0) {
            return Err(FigureError::Config(
                "canonical.density_tolerance must be non-negative".into(),
            ));
        }
        for (i, q) in quads.iter().enumerate() {
            if q.size <= 0 || !(0.0..=1.0).contains(&q.density) {
                return Err(FigureError::Config(format!(
                    "canonical.quads[{i}]: size must be positive and density in [0, 1]"
                )));
            }
            let duplicate = quads[..i].iter().any(|p| {
                p.size == q.size
                    && (p.density - q.density).abs() <= self.canonical.density_tolerance
            });
            if duplicate {
                return Err(FigureError::Config(format!(
                    "canonical.quads[{i}] repeats an earlier category"
                )));
            }
        }
        let pairs: Vec<(i64, f64)> = quads.iter().map(|q| (q.size, q.density)).collect();
        Ok(CanonicalOrder::quads(&pairs))
    }

    /// Jitter widths must keep every cloud inside its own slot: the paired
    /// clouds at `±paired_offset` may not reach each other or the
    /// neighbouring category.
    pub fn check_jitter(&self) -> Result<()> {
        let j = &self.jitter;
        if !(j.width >= 0.0 && j.width < 0.5) {
            return Err(FigureError::Config(format!(
                "jitter.width = {} must lie in [0, 0.5)",
                j.width
            )));
        }
        if !(j.paired_width >= 0.0 && j.paired_width < j.paired_offset) {
            return Err(FigureError::Config(format!(
                "jitter.paired_width = {} must be non-negative and below paired_offset = {}",
                j.paired_width, j.paired_offset
            )));
        }
        if !(j.paired_offset + j.paired_width < 0.5) {
            return Err(FigureError::Config(format!(
                "jitter.paired_offset + paired_width = {} reaches the next category",
                j.paired_offset + j.paired_width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "cloth_figures_config_test_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = unique_path("absent.toml");
        let cfg = FiguresConfig::load_or_default(&path);
        assert!(!path.exists(), "loading must not create a config file");
        assert_eq!(cfg.output.format, OutputFormat::Pdf);
        assert_eq!((cfg.output.width_px, cfg.output.height_px), (850, 550));
        assert_eq!(cfg.canonical.quads.len(), 4);
        assert_eq!(cfg.curves.t_min, 3);
        assert_eq!(cfg.curves.t_max, 100);
        assert_eq!(cfg.jitter.seed, 0);
        let order = cfg.canonical_order().unwrap();
        assert_eq!(
            order.labels(),
            vec!["N=4, n=0.4", "N=4, n=0.8", "N=8, n=0.4", "N=8, n=0.8"]
        );
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = unique_path("partial.toml");
        fs::write(&path, "[output]\nformat = \"svg\"\n\n[curves]\nsanity_limit = 3.5\n").unwrap();

        let cfg = FiguresConfig::load_or_default(&path);
        assert_eq!(cfg.output.format, OutputFormat::Svg);
        assert_eq!(cfg.output.width_px, 850);
        assert_eq!(cfg.curves.sanity_limit, 3.5);
        assert_eq!(cfg.curves.t_max, 100);
        assert_eq!(cfg.layout.csv_dir, "csv");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn invalid_file_falls_back() {
        let path = unique_path("broken.toml");
        fs::write(&path, "[output\nformat = ").unwrap();
        let cfg = FiguresConfig::load_or_default(&path);
        assert_eq!(cfg.output.format, OutputFormat::Pdf);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn duplicate_quads_are_rejected() {
        let mut cfg = FiguresConfig::default();
        cfg.canonical.quads.push(QuadConfig {
            size: 4,
            density: 0.41,
        });
        assert!(matches!(cfg.canonical_order(), Err(FigureError::Config(_))));
    }

    #[test]
    fn overlapping_paired_clouds_are_rejected() {
        let mut cfg = FiguresConfig::default();
        assert!(cfg.check_jitter().is_ok());

        cfg.jitter.paired_width = cfg.jitter.paired_offset;
        assert!(matches!(cfg.check_jitter(), Err(FigureError::Config(_))));

        cfg.jitter.paired_width = 0.03;
        cfg.jitter.paired_offset = 0.48;
        assert!(matches!(cfg.check_jitter(), Err(FigureError::Config(_))));

        cfg.jitter.paired_offset = 0.14;
        cfg.jitter.width = f64::NAN;
        assert!(matches!(cfg.check_jitter(), Err(FigureError::Config(_))));
    }
}
