//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod catalog;
mod generate;
mod ladder;
mod score;
mod simulate;

use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::analysis::CognitiveAnalysisEngine;
use crate::catalog::{Catalog, ComplexityMatrix};
use crate::config::{load_config_with_source, merge_cli_overrides, CliOverrides, RavenConfig};
use crate::generator::{GenerateError, MatrixGenerator};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// rvn - Generate and score progressive-matrix reasoning puzzles
#[derive(Parser)]
#[command(name = "rvn")]
#[command(about = "Generate progressive-matrix puzzles and score reasoning test sessions")]
#[command(version)]
pub struct Cli {
    /// Path to raven.toml (discovered from the working directory when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for reproducible puzzles
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate puzzles for a difficulty level
    Generate {
        /// Difficulty level (1-13)
        #[arg(short, long)]
        level: u32,

        /// Number of puzzles; more than one is generated in parallel
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Answer options per puzzle
        #[arg(long, value_parser = clap::value_parser!(u8).range(2..=12))]
        options: Option<u8>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Score a response log
    Score {
        /// JSON file with answers, correctAnswers and responseTimes
        input: PathBuf,

        /// Reasoning category the responses belong to
        #[arg(short, long, default_value = "raven")]
        category: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run a whole test session against a simulated respondent
    Simulate {
        /// Probability of answering each question correctly
        #[arg(long, default_value = "0.7")]
        accuracy: f64,

        /// Mean response time in milliseconds
        #[arg(long, default_value = "30000")]
        mean_time: u64,

        /// Highest level in the session
        #[arg(long)]
        levels: Option<u32>,

        /// Questions generated per level
        #[arg(long)]
        per_level: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Climb one puzzle per level with a simulated respondent
    Ladder {
        /// Probability of answering each puzzle correctly
        #[arg(long, default_value = "0.7")]
        accuracy: f64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the complexity levels, parameter catalog and pattern catalog
    Catalog,
}

/// Settings shared by every subcommand after config and flags are merged.
pub(crate) struct Context {
    pub config: RavenConfig,
}

impl Context {
    /// Seeded when a seed is configured, otherwise from entropy.
    pub fn rng(&self) -> SmallRng {
        match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }

    pub fn generator(&self) -> Result<MatrixGenerator, GenerateError> {
        MatrixGenerator::new(Catalog::builtin(), ComplexityMatrix::builtin(), self.config.generator)
    }

    pub fn engine(&self) -> CognitiveAnalysisEngine {
        CognitiveAnalysisEngine::new(self.config.scoring.to_analysis_config())
    }
}

/// Route tracing events to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: Failed to serialize output: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Exit code for a generation failure.
pub(crate) fn generate_error_code(error: &GenerateError) -> ExitCode {
    match error {
        GenerateError::UnsupportedLevel(_) => ExitCode::from(EXIT_INVALID_ARGS),
        _ => ExitCode::from(EXIT_ERROR),
    }
}

fn probability_arg(name: &str, value: f64) -> Result<f64, ExitCode> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        eprintln!("Error: --{} must be between 0 and 1, got {}", name, value);
        Err(ExitCode::from(EXIT_INVALID_ARGS))
    }
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut overrides = CliOverrides { seed: cli.seed, ..Default::default() };
    match &cli.command {
        Commands::Generate { options, .. } => {
            overrides.option_count = options.map(usize::from);
        }
        Commands::Simulate { levels, per_level, .. } => {
            overrides.max_levels = *levels;
            overrides.questions_per_level = *per_level;
        }
        _ => {}
    }

    let mut config = match load_config_with_source(cli.config.as_deref()) {
        Ok((config, source)) => {
            tracing::info!(source = %source, "using configuration");
            config
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if let Err(e) = merge_cli_overrides(&mut config, &overrides) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    let ctx = Context { config };

    match cli.command {
        Commands::Generate { level, count, json, .. } => {
            generate::run_generate(&ctx, level, count, json)
        }
        Commands::Score { input, category, json } => {
            score::run_score(&ctx, &input, &category, json)
        }
        Commands::Simulate { accuracy, mean_time, json, .. } => {
            match probability_arg("accuracy", accuracy) {
                Ok(accuracy) => simulate::run_simulate(&ctx, accuracy, mean_time, json),
                Err(code) => code,
            }
        }
        Commands::Ladder { accuracy, json } => match probability_arg("accuracy", accuracy) {
            Ok(accuracy) => ladder::run_ladder(&ctx, accuracy, json),
            Err(code) => code,
        },
        Commands::Catalog => catalog::run_catalog(&ctx),
    }
}
