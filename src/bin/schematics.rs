use std::process::ExitCode;

use cloth_figures::cli;
use cloth_figures::figures::schematics::SCHEMATIC_FIGURES;

fn main() -> ExitCode {
    cli::run(SCHEMATIC_FIGURES)
}
