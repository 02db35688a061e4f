use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::config::FiguresConfig;
use crate::figures::{Figure, FigureContext, report, run_figures};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Repository root holding the csv/ and figures/ directories
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to config TOML (default: <root>/figures.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.root().join("figures.toml"))
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Shared entry point of the figure binaries.
pub fn run(figures: &[Figure]) -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let config = FiguresConfig::load_or_default(&args.config_path());
    let ctx = match FigureContext::new(args.root(), config) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let outcomes = run_figures(&ctx, figures);
    if report(&outcomes) == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
