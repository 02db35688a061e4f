use std::process::ExitCode;

use cloth_figures::cli;
use cloth_figures::figures::csv_figures::CSV_FIGURES;

fn main() -> ExitCode {
    cli::run(CSV_FIGURES)
}
