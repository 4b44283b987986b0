//! Simulate command implementation (end-to-end session with a scripted respondent)

use rand::Rng;
use std::process::ExitCode;

use crate::generator::PuzzleMatrix;
use crate::session::{FinalReport, Millis, RavenSystem};

use super::{print_json, score, Context, EXIT_ERROR, EXIT_SUCCESS};

/// Pick an option: correct with probability `accuracy`, otherwise a uniformly
/// chosen wrong one.
pub(crate) fn simulated_answer<R: Rng + ?Sized>(
    matrix: &PuzzleMatrix,
    accuracy: f64,
    rng: &mut R,
) -> usize {
    let len = matrix.options.len();
    if len < 2 || rng.gen_bool(accuracy) {
        matrix.correct_answer
    } else {
        (matrix.correct_answer + rng.gen_range(1..len)) % len
    }
}

/// Execute the simulate command
pub fn run_simulate(ctx: &Context, accuracy: f64, mean_time: Millis, json: bool) -> ExitCode {
    let generator = match ctx.generator() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let system = RavenSystem::new(generator, ctx.engine(), ctx.config.session);
    let mut rng = ctx.rng();

    let mut clock: Millis = 0;
    let mut session = match system.start_test(&mut rng, clock) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut index = 0;
    loop {
        clock += 500;
        let answer = match system.present_question(&mut session, index, clock) {
            Ok(question) => simulated_answer(&question.matrix, accuracy, &mut rng),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };
        clock += (mean_time as f64 * rng.gen_range(0.5..1.5)) as Millis;

        match system.process_answer(&mut session, index, answer, clock) {
            Ok(outcome) if outcome.should_continue => index += 1,
            Ok(_) => break,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let report = match system.generate_final_report(&session, clock) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        return print_json(&report);
    }
    print!("{}", render_text(&report));
    ExitCode::from(EXIT_SUCCESS)
}

fn render_text(report: &FinalReport) -> String {
    format!(
        "Questions: {}\nCorrect: {} ({:.1}%)\nAverage time per question: {:.0} ms\nHighest level reached: {}\n{}",
        report.total_questions,
        report.correct_answers,
        report.accuracy * 100.0,
        report.average_time_per_question,
        report.max_level_reached,
        score::render_text(&report.cognitive),
    )
}
