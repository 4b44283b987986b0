//! WASM API module for browser/JS interop
//!
//! Puzzles and reports cross the boundary as JSON strings.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::analysis::{Category, CognitiveAnalysisEngine, Interpretation, ResponseSet};
use crate::generator::MatrixGenerator;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": message.to_string() }).to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(error_json)
}

/// Generate one puzzle as JSON, or `{"error": ...}`.
#[wasm_bindgen]
pub fn generate_matrix(level: u32, seed: u64) -> String {
    let mut rng = SmallRng::seed_from_u64(seed);
    match MatrixGenerator::default().generate_matrix(level, &mut rng) {
        Ok(matrix) => to_json(&matrix),
        Err(e) => error_json(e),
    }
}

/// Score a JSON response log. Any malformed input yields the fallback score.
#[wasm_bindgen]
pub fn analyze_performance(responses_json: &str, category: &str) -> u32 {
    let engine = CognitiveAnalysisEngine::default();
    let category = match category.parse::<Category>() {
        Ok(c) => c,
        Err(_) => return engine.fallback_score(),
    };
    match serde_json::from_str::<ResponseSet>(responses_json) {
        Ok(responses) => engine.analyze_performance(&responses, category),
        Err(_) => engine.fallback_score(),
    }
}

/// Detailed report as JSON; unparseable logs get the fallback report.
#[wasm_bindgen]
pub fn detailed_report(responses_json: &str, category: &str) -> String {
    let engine = CognitiveAnalysisEngine::default();
    let category = match category.parse::<Category>() {
        Ok(c) => c,
        Err(e) => return error_json(e),
    };
    let responses = serde_json::from_str::<ResponseSet>(responses_json).unwrap_or_default();
    to_json(&engine.generate_detailed_report(&responses, category))
}

/// Label for a normalized score
#[wasm_bindgen]
pub fn interpret(score: u32) -> String {
    Interpretation::from_score(score).label().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERFECT_FAST: &str =
        r#"{"answers": [1, 2, 3], "correctAnswers": [1, 2, 3], "responseTimes": [0, 0, 0]}"#;

    #[test]
    fn test_generate_matrix_json() {
        let json = generate_matrix(4, 17);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], 4);
        assert_eq!(value["options"].as_array().unwrap().len(), 6);
        assert_eq!(json, generate_matrix(4, 17));
    }

    #[test]
    fn test_generate_matrix_error() {
        let value: serde_json::Value = serde_json::from_str(&generate_matrix(99, 1)).unwrap();
        assert!(value["error"].as_str().unwrap().contains("99"));
    }

    #[test]
    fn test_analyze_performance() {
        assert_eq!(analyze_performance(PERFECT_FAST, "raven"), 114);
        assert_eq!(analyze_performance("not json", "raven"), 100);
        assert_eq!(analyze_performance(PERFECT_FAST, "astrology"), 100);
    }

    #[test]
    fn test_detailed_report_fallback() {
        let value: serde_json::Value =
            serde_json::from_str(&detailed_report(r#"{"answers": [1]}"#, "spaziale")).unwrap();
        assert_eq!(value["category"], "spatial");
        assert_eq!(value["iq_score"], 100);
        assert_eq!(value["interpretation"], "Nella media");
    }

    #[test]
    fn test_interpret() {
        assert_eq!(interpret(131), "Eccezionale");
        assert_eq!(interpret(85), "Sotto la media");
    }
}
