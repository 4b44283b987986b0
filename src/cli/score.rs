//! Score command implementation

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::analysis::{Category, DetailedReport, ResponseSet};

use super::{print_json, Context, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the score command
///
/// Parse failures are errors; incomplete or inconsistent data is scored with
/// the fallback report and only logged.
pub fn run_score(ctx: &Context, input: &Path, category: &str, json: bool) -> ExitCode {
    let category: Category = match category.parse() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            let names: Vec<&str> = Category::ALL.iter().map(|c| c.id()).collect();
            eprintln!("Available categories: {}", names.join(", "));
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let contents = match fs::read_to_string(input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: Cannot read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let responses: ResponseSet = match serde_json::from_str(&contents) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: Invalid response log '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let report = ctx.engine().generate_detailed_report(&responses, category);
    if json {
        return print_json(&report);
    }
    print!("{}", render_text(&report));
    ExitCode::from(EXIT_SUCCESS)
}

pub(crate) fn render_text(report: &DetailedReport) -> String {
    format!(
        "Category: {}\nScore: {} ({})\nAccuracy: {:.1}%\nAverage response time: {:.0} ms\nSpeed score: {:.3}\n",
        report.category,
        report.iq_score,
        report.interpretation,
        report.details.accuracy * 100.0,
        report.details.average_response_time,
        report.details.speed_score,
    )
}
