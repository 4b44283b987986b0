//! Generate command implementation

use rand::Rng;
use std::process::ExitCode;

use crate::generator::{PuzzleMatrix, ANSWER_CELL, GRID_SIZE};

use super::{generate_error_code, print_json, Context, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the generate command
pub fn run_generate(ctx: &Context, level: u32, count: usize, json: bool) -> ExitCode {
    if count == 0 {
        eprintln!("Error: --count must be at least 1");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let generator = match ctx.generator() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let results = if count == 1 {
        vec![generator.generate_matrix(level, &mut ctx.rng())]
    } else {
        let seed = ctx.config.seed.unwrap_or_else(|| ctx.rng().gen());
        generator.generate_batch(level, count, seed)
    };

    let mut puzzles = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(matrix) => puzzles.push(matrix),
            Err(e) => {
                eprintln!("Error: {}", e);
                return generate_error_code(&e);
            }
        }
    }

    if json {
        return match puzzles.as_slice() {
            [single] => print_json(single),
            many => print_json(&many),
        };
    }

    for (index, puzzle) in puzzles.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print!("{}", render_text(puzzle));
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Plain-text listing of a puzzle's grid and options.
fn render_text(puzzle: &PuzzleMatrix) -> String {
    let mut out = format!("Level {}\n", puzzle.level);
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let cell = match puzzle.cell(row, col) {
                Some(element) => element.to_string(),
                None if (row, col) == ANSWER_CELL => "?".to_string(),
                None => "-".to_string(),
            };
            out.push_str(&format!("  [{},{}] {}\n", row, col, cell));
        }
    }
    out.push_str("Options:\n");
    for (index, option) in puzzle.options.iter().enumerate() {
        out.push_str(&format!("  {}) {}\n", option_label(index), option.element));
    }
    out.push_str(&format!("Answer: {}\n", option_label(puzzle.correct_answer)));
    out
}

fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
