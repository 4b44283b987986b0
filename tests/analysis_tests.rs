//! Integration tests for response scoring
//!
//! Checks the scoring contract end to end: parsed response logs in, bounded
//! scores and qualitative bands out, never a failure on bad data.

use ravenmatrix::analysis::{
    AnalysisConfig, AnalysisError, Category, CognitiveAnalysisEngine, Interpretation,
    ResponseSet, ScoreScale,
};

fn engine() -> CognitiveAnalysisEngine {
    CognitiveAnalysisEngine::default()
}

fn parse(json: &str) -> ResponseSet {
    serde_json::from_str(json).expect("response log should parse")
}

#[test]
fn test_scores_stay_in_bounds_for_every_category() {
    let logs = [
        ResponseSet::new(vec![1; 10], vec![1; 10], vec![0.0; 10]),
        ResponseSet::new(vec![0; 10], vec![1; 10], vec![1_000_000.0; 10]),
        ResponseSet::new(vec![0, 1, 2, 3], vec![0, 1, 0, 0], vec![25_000.0; 4]),
    ];
    for category in Category::ALL {
        for log in &logs {
            let score = engine().analyze_performance(log, category);
            assert!((40..=160).contains(&score), "{}: {}", category, score);
        }
    }
}

#[test]
fn test_more_accuracy_never_scores_lower() {
    let times = vec![30_000.0; 6];
    let mut previous = 0;
    for correct in 0..=6 {
        let answers: Vec<usize> = (0..6).map(|i| if i < correct { 1 } else { 0 }).collect();
        let log = ResponseSet::new(answers, vec![1; 6], times.clone());
        let score = engine().analyze_performance(&log, Category::Abstract);
        assert!(score >= previous, "{} correct scored {} < {}", correct, score, previous);
        previous = score;
    }
}

#[test]
fn test_faster_never_scores_lower() {
    let mut previous = u32::MAX;
    for time in [1_000.0, 20_000.0, 40_000.0, 80_000.0, 160_000.0] {
        let log = ResponseSet::new(vec![1, 0, 1], vec![1, 1, 1], vec![time; 3]);
        let score = engine().analyze_performance(&log, Category::Deductive);
        assert!(score <= previous);
        previous = score;
    }
}

#[test]
fn test_camel_and_snake_case_logs_agree() {
    let camel = parse(r#"{"answers": [1, 2], "correctAnswers": [1, 3], "responseTimes": [1000, 2000]}"#);
    let snake =
        parse(r#"{"answers": [1, 2], "correct_answers": [1, 3], "response_times": [1000, 2000]}"#);
    assert_eq!(camel, snake);
    assert_eq!(
        engine().analyze_performance(&camel, Category::Spatial),
        engine().analyze_performance(&snake, Category::Spatial)
    );
}

#[test]
fn test_malformed_logs_fall_back() {
    let cases = [
        r#"{}"#,
        r#"{"answers": [1]}"#,
        r#"{"answers": [1, 2], "correctAnswers": [1], "responseTimes": [1000]}"#,
        r#"{"answers": [1], "correctAnswers": [1], "responseTimes": []}"#,
        r#"{"answers": [1], "correctAnswers": [1], "responseTimes": [-5]}"#,
    ];
    for json in cases {
        let log = parse(json);
        assert_eq!(engine().analyze_performance(&log, Category::Raven), 100, "{}", json);
        let report = engine().generate_detailed_report(&log, Category::Raven);
        assert_eq!(report.iq_score, 100);
        assert_eq!(report.interpretation, Interpretation::Average);
        assert_eq!(report.details.speed_score, 0.5);
    }
}

#[test]
fn test_try_variants_report_the_cause() {
    let e = engine();
    assert_eq!(
        e.try_analyze_performance(&parse(r#"{"answers": [1]}"#), Category::Raven),
        Err(AnalysisError::IncompleteData("responseTimes"))
    );
    assert_eq!(
        e.try_analyze_performance(
            &parse(r#"{"answers": [1, 2], "correctAnswers": [1], "responseTimes": [1]}"#),
            Category::Raven
        ),
        Err(AnalysisError::MismatchedLength { answers: 2, correct: 1 })
    );
}

#[test]
fn test_detailed_report_contents() {
    let log = ResponseSet::new(vec![1, 2, 0], vec![1, 2, 3], vec![30_000.0; 3]);
    let report = engine().generate_detailed_report(&log, Category::Inductive);
    assert_eq!(report.category, Category::Inductive);
    assert_eq!(report.iq_score, 104);
    assert_eq!(report.interpretation, Interpretation::Average);
    assert!((report.details.accuracy - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(report.details.average_response_time, 30_000.0);
    assert!((report.details.speed_score - 0.5).abs() < 1e-12);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["interpretation"], "Nella media");
    assert_eq!(json["category"], "inductive");
}

#[test]
fn test_interpretation_bands() {
    let expected = [
        (160, Interpretation::Exceptional),
        (130, Interpretation::Exceptional),
        (129, Interpretation::Superior),
        (120, Interpretation::Superior),
        (110, Interpretation::AboveAverage),
        (109, Interpretation::Average),
        (90, Interpretation::Average),
        (89, Interpretation::BelowAverage),
        (80, Interpretation::BelowAverage),
        (79, Interpretation::NeedsImprovement),
        (40, Interpretation::NeedsImprovement),
    ];
    for (score, band) in expected {
        assert_eq!(engine().interpret(score), band, "score {}", score);
    }
}

#[test]
fn test_custom_scale() {
    let config = AnalysisConfig {
        scale: ScoreScale { mean: 500.0, standard_deviation: 100.0, min_score: 200, max_score: 800 },
        ..Default::default()
    };
    let engine = CognitiveAnalysisEngine::new(config);
    assert_eq!(engine.normalize_score(0.5), 500);
    assert_eq!(engine.fallback_score(), 500);
    let top = engine.normalize_score(1.0);
    assert!(top > 500 && top <= 800);
}
