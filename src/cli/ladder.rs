//! Ladder command implementation

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::process::ExitCode;

use crate::ladder::{LadderResult, LadderRun};

use super::simulate::simulated_answer;
use super::{print_json, Context, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the ladder command
pub fn run_ladder(ctx: &Context, accuracy: f64, json: bool) -> ExitCode {
    let generator = match ctx.generator() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let mut rng = ctx.rng();
    let mut respondent = SmallRng::seed_from_u64(rng.gen());
    let mut run = match LadderRun::new(&generator, rng) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut steps = Vec::new();
    while let Some(matrix) = run.current() {
        let level = matrix.level;
        let answer = simulated_answer(matrix, accuracy, &mut respondent);
        match run.answer(answer) {
            Ok(correct) => steps.push((level, correct)),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let result: LadderResult = match run.finish() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        return print_json(&result);
    }
    for (level, correct) in steps {
        println!("Level {:>2}: {}", level, if correct { "correct" } else { "wrong" });
    }
    println!("Score: {}/{} ({:.1}%)", result.score, result.levels, result.accuracy * 100.0);
    ExitCode::from(EXIT_SUCCESS)
}
