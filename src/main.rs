//! rvn - Command-line tool for generating and scoring progressive-matrix puzzles

use std::process::ExitCode;

use ravenmatrix::cli;

fn main() -> ExitCode {
    cli::run()
}
