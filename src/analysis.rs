//! Cognitive performance analysis
//!
//! Turns a completed sub-test's response log into an accuracy ratio, a
//! logistic speed score, a weighted raw score in `[0, 1]` and finally a score
//! on a bounded mean-centered scale (default mean 100, standard deviation 15,
//! clamped to `[40, 160]`).
//!
//! Scoring never fails from the caller's point of view:
//! [`CognitiveAnalysisEngine::analyze_performance`] and
//! [`CognitiveAnalysisEngine::generate_detailed_report`] fall back to a
//! neutral result on malformed input. The `try_*` variants expose the error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Exponent applied to accuracy before weighting
const ACCURACY_EXPONENT: f64 = 1.2;

/// Steepness of the logistic used during normalization
const NORMALIZATION_STEEPNESS: f64 = 6.0;

/// Speed score reported by fallback reports
const FALLBACK_SPEED_SCORE: f64 = 0.5;

/// Reasoning skill a question set exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[serde(alias = "deduttivo")]
    Deductive,
    #[serde(alias = "induttivo")]
    Inductive,
    #[serde(alias = "spaziale")]
    Spatial,
    #[serde(alias = "analogico")]
    Analogical,
    #[serde(alias = "quantitativo")]
    Quantitative,
    #[serde(alias = "astratto")]
    Abstract,
    #[serde(alias = "critico")]
    Critical,
    #[serde(alias = "sistemico")]
    Systemic,
    Raven,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Deductive,
        Category::Inductive,
        Category::Spatial,
        Category::Analogical,
        Category::Quantitative,
        Category::Abstract,
        Category::Critical,
        Category::Systemic,
        Category::Raven,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Category::Deductive => "deductive",
            Category::Inductive => "inductive",
            Category::Spatial => "spatial",
            Category::Analogical => "analogical",
            Category::Quantitative => "quantitative",
            Category::Abstract => "abstract",
            Category::Critical => "critical",
            Category::Systemic => "systemic",
            Category::Raven => "raven",
        }
    }

    /// Key used by the Italian question bank
    pub fn legacy_key(self) -> &'static str {
        match self {
            Category::Deductive => "deduttivo",
            Category::Inductive => "induttivo",
            Category::Spatial => "spaziale",
            Category::Analogical => "analogico",
            Category::Quantitative => "quantitativo",
            Category::Abstract => "astratto",
            Category::Critical => "critico",
            Category::Systemic => "sistemico",
            Category::Raven => "raven",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when a category name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category '{0}'")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.id() == key || c.legacy_key() == key)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Per-category constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    /// Difficulty weight; its square root scales the raw score
    pub weight: f64,
    /// Response time in milliseconds that earns a neutral speed score
    pub expected_response_ms: f64,
}

/// Output scale for normalized scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreScale {
    pub mean: f64,
    pub standard_deviation: f64,
    pub min_score: u32,
    pub max_score: u32,
}

impl Default for ScoreScale {
    fn default() -> Self {
        Self { mean: 100.0, standard_deviation: 15.0, min_score: 40, max_score: 160 }
    }
}

/// Relative weight of accuracy and speed in the raw score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationWeights {
    pub accuracy: f64,
    pub speed: f64,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        Self { accuracy: 0.7, speed: 0.3 }
    }
}

/// Every constant the engine scores with.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub scale: ScoreScale,
    pub weights: EvaluationWeights,
    pub categories: BTreeMap<Category, CategoryProfile>,
}

impl AnalysisConfig {
    /// Category weights and expected times of the reasoning test.
    pub fn builtin_categories() -> BTreeMap<Category, CategoryProfile> {
        [
            (Category::Deductive, 1.2, 45_000.0),
            (Category::Inductive, 1.0, 30_000.0),
            (Category::Spatial, 1.3, 40_000.0),
            (Category::Analogical, 1.1, 35_000.0),
            (Category::Quantitative, 1.4, 50_000.0),
            (Category::Abstract, 1.5, 45_000.0),
            (Category::Critical, 1.2, 60_000.0),
            (Category::Systemic, 1.3, 55_000.0),
            (Category::Raven, 1.6, 40_000.0),
        ]
        .into_iter()
        .map(|(category, weight, expected_response_ms)| {
            (category, CategoryProfile { weight, expected_response_ms })
        })
        .collect()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scale: ScoreScale::default(),
            weights: EvaluationWeights::default(),
            categories: Self::builtin_categories(),
        }
    }
}

/// Raw response log of one sub-test.
///
/// Fields are optional because the log comes from a presentation layer that
/// may not have collected everything; missing data is an analysis error,
/// not a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSet {
    #[serde(default)]
    pub answers: Option<Vec<usize>>,
    #[serde(default, alias = "correct_answers")]
    pub correct_answers: Option<Vec<usize>>,
    /// Milliseconds per answer
    #[serde(default, alias = "response_times")]
    pub response_times: Option<Vec<f64>>,
}

impl ResponseSet {
    pub fn new(answers: Vec<usize>, correct_answers: Vec<usize>, response_times: Vec<f64>) -> Self {
        Self {
            answers: Some(answers),
            correct_answers: Some(correct_answers),
            response_times: Some(response_times),
        }
    }
}

/// Reasons a response log cannot be scored
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("incomplete response data: missing {0}")]
    IncompleteData(&'static str),

    #[error("{answers} answers but {correct} correct answers")]
    MismatchedLength { answers: usize, correct: usize },

    #[error("no response times recorded")]
    NoResponseTimes,

    #[error("invalid response time {0}")]
    InvalidResponseTime(f64),

    #[error("no scoring profile for category '{0}'")]
    UnknownCategory(Category),
}

/// Average response time and its logistic score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedMetrics {
    pub average_time: f64,
    pub speed_score: f64,
}

/// Qualitative band of a normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpretation {
    #[serde(rename = "Eccezionale")]
    Exceptional,
    #[serde(rename = "Superiore alla media")]
    Superior,
    #[serde(rename = "Sopra la media")]
    AboveAverage,
    #[serde(rename = "Nella media")]
    Average,
    #[serde(rename = "Sotto la media")]
    BelowAverage,
    #[serde(rename = "Necessita miglioramento")]
    NeedsImprovement,
}

impl Interpretation {
    /// Band for `score`, evaluated from the top down.
    pub fn from_score(score: u32) -> Self {
        if score >= 130 {
            Interpretation::Exceptional
        } else if score >= 120 {
            Interpretation::Superior
        } else if score >= 110 {
            Interpretation::AboveAverage
        } else if score >= 90 {
            Interpretation::Average
        } else if score >= 80 {
            Interpretation::BelowAverage
        } else {
            Interpretation::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Interpretation::Exceptional => "Eccezionale",
            Interpretation::Superior => "Superiore alla media",
            Interpretation::AboveAverage => "Sopra la media",
            Interpretation::Average => "Nella media",
            Interpretation::BelowAverage => "Sotto la media",
            Interpretation::NeedsImprovement => "Necessita miglioramento",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Measurements behind a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportDetails {
    pub accuracy: f64,
    pub average_response_time: f64,
    pub speed_score: f64,
}

/// Score plus the measurements and band it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedReport {
    pub category: Category,
    pub iq_score: u32,
    pub details: ReportDetails,
    pub interpretation: Interpretation,
}

/// Fraction of positions where the answer equals the correct answer.
///
/// Returns 0 for an empty answer list. Answers without a counterpart count
/// as wrong.
pub fn calculate_accuracy(answers: &[usize], correct_answers: &[usize]) -> f64 {
    if answers.is_empty() {
        return 0.0;
    }
    let correct = answers.iter().zip(correct_answers).filter(|(a, c)| a == c).count();
    correct as f64 / answers.len() as f64
}

/// Standard logistic function
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Stateless scorer over injected constants.
#[derive(Debug, Clone, Default)]
pub struct CognitiveAnalysisEngine {
    config: AnalysisConfig,
}

impl CognitiveAnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Score a response log, falling back to the scale mean on any error.
    pub fn analyze_performance(&self, responses: &ResponseSet, category: Category) -> u32 {
        match self.try_analyze_performance(responses, category) {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!(error = %e, %category, "performance analysis failed, using fallback score");
                self.fallback_score()
            }
        }
    }

    /// Score a response log, reporting malformed input.
    pub fn try_analyze_performance(
        &self,
        responses: &ResponseSet,
        category: Category,
    ) -> Result<u32, AnalysisError> {
        let (answers, correct, times) = validate_input(responses)?;
        let accuracy = calculate_accuracy(answers, correct);
        let speed = self.analyze_response_times(times, category)?;
        let raw = self.calculate_raw_score(accuracy, speed.speed_score, category)?;
        Ok(self.normalize_score(raw))
    }

    /// Average time and `sigmoid(1 - average / expected)`.
    pub fn analyze_response_times(
        &self,
        response_times: &[f64],
        category: Category,
    ) -> Result<SpeedMetrics, AnalysisError> {
        if response_times.is_empty() {
            return Err(AnalysisError::NoResponseTimes);
        }
        if let Some(bad) = response_times.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(AnalysisError::InvalidResponseTime(*bad));
        }
        let profile = self.profile(category)?;

        let average_time = mean(response_times);
        let speed_ratio = average_time / profile.expected_response_ms;
        Ok(SpeedMetrics { average_time, speed_score: sigmoid(1.0 - speed_ratio) })
    }

    /// `(accuracy^1.2 · w_acc + speed · w_speed) · sqrt(category weight)`, clamped to `[0, 1]`.
    pub fn calculate_raw_score(
        &self,
        accuracy: f64,
        speed_score: f64,
        category: Category,
    ) -> Result<f64, AnalysisError> {
        let weights = &self.config.weights;
        let profile = self.profile(category)?;

        let weighted = (accuracy.powf(ACCURACY_EXPONENT) * weights.accuracy
            + speed_score * weights.speed)
            * profile.weight.sqrt();
        Ok(weighted.clamp(0.0, 1.0))
    }

    /// Map a raw score onto the output scale.
    ///
    /// A steep logistic pushes the raw score toward the extremes, the result
    /// is read as a z-score in `[-1, 1]` and scaled by the standard deviation.
    /// Non-finite input maps to the mean.
    pub fn normalize_score(&self, raw: f64) -> u32 {
        let scale = &self.config.scale;
        let raw = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.5 };

        let normalized = sigmoid(NORMALIZATION_STEEPNESS * (raw - 0.5));
        let z_score = (normalized - 0.5) * 2.0;
        let score = (scale.mean + z_score * scale.standard_deviation).round();
        score.clamp(scale.min_score as f64, scale.max_score as f64) as u32
    }

    /// Band for a normalized score
    pub fn interpret(&self, score: u32) -> Interpretation {
        Interpretation::from_score(score)
    }

    /// Full report, degrading to [`CognitiveAnalysisEngine::fallback_report`] on any error.
    pub fn generate_detailed_report(
        &self,
        responses: &ResponseSet,
        category: Category,
    ) -> DetailedReport {
        match self.try_detailed_report(responses, category) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, %category, "report generation failed, using fallback report");
                self.fallback_report(responses, category)
            }
        }
    }

    pub fn try_detailed_report(
        &self,
        responses: &ResponseSet,
        category: Category,
    ) -> Result<DetailedReport, AnalysisError> {
        let (answers, correct, times) = validate_input(responses)?;
        let accuracy = calculate_accuracy(answers, correct);
        let speed = self.analyze_response_times(times, category)?;
        let raw = self.calculate_raw_score(accuracy, speed.speed_score, category)?;
        let iq_score = self.normalize_score(raw);

        Ok(DetailedReport {
            category,
            iq_score,
            details: ReportDetails {
                accuracy,
                average_response_time: speed.average_time,
                speed_score: speed.speed_score,
            },
            interpretation: self.interpret(iq_score),
        })
    }

    /// Score returned when analysis fails
    pub fn fallback_score(&self) -> u32 {
        let scale = &self.config.scale;
        scale.mean.round().clamp(scale.min_score as f64, scale.max_score as f64) as u32
    }

    /// Neutral report built from whatever data is usable.
    pub fn fallback_report(&self, responses: &ResponseSet, category: Category) -> DetailedReport {
        let accuracy = match (&responses.answers, &responses.correct_answers) {
            (Some(answers), Some(correct)) => calculate_accuracy(answers, correct),
            _ => 0.0,
        };
        let average_response_time = match &responses.response_times {
            Some(times) if !times.is_empty() => mean(times),
            _ => 0.0,
        };

        DetailedReport {
            category,
            iq_score: self.fallback_score(),
            details: ReportDetails {
                accuracy,
                average_response_time,
                speed_score: FALLBACK_SPEED_SCORE,
            },
            interpretation: Interpretation::Average,
        }
    }

    fn profile(&self, category: Category) -> Result<CategoryProfile, AnalysisError> {
        self.config.categories.get(&category).copied().ok_or(AnalysisError::UnknownCategory(category))
    }
}

/// Check every field is present and answers line up with solutions.
pub fn validate_input(
    responses: &ResponseSet,
) -> Result<(&[usize], &[usize], &[f64]), AnalysisError> {
    let answers = responses.answers.as_deref().ok_or(AnalysisError::IncompleteData("answers"))?;
    let times = responses
        .response_times
        .as_deref()
        .ok_or(AnalysisError::IncompleteData("responseTimes"))?;
    let correct = responses
        .correct_answers
        .as_deref()
        .ok_or(AnalysisError::IncompleteData("correctAnswers"))?;

    if answers.len() != correct.len() {
        return Err(AnalysisError::MismatchedLength {
            answers: answers.len(),
            correct: correct.len(),
        });
    }
    Ok((answers, correct, times))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CognitiveAnalysisEngine {
        CognitiveAnalysisEngine::default()
    }

    #[test]
    fn test_accuracy_partial() {
        let acc = calculate_accuracy(&[1, 2, 3], &[1, 2, 4]);
        assert!((acc - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_empty_and_perfect() {
        assert_eq!(calculate_accuracy(&[], &[]), 0.0);
        assert_eq!(calculate_accuracy(&[4, 0, 2], &[4, 0, 2]), 1.0);
    }

    #[test]
    fn test_accuracy_short_solution_list() {
        assert_eq!(calculate_accuracy(&[1, 1], &[1]), 0.5);
    }

    #[test]
    fn test_speed_at_expected_time_is_half() {
        let speed = engine().analyze_response_times(&[30_000.0, 50_000.0], Category::Raven).unwrap();
        assert_eq!(speed.average_time, 40_000.0);
        assert!((speed.speed_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_faster_is_better() {
        let e = engine();
        let fast = e.analyze_response_times(&[10_000.0], Category::Spatial).unwrap();
        let slow = e.analyze_response_times(&[90_000.0], Category::Spatial).unwrap();
        assert!(fast.speed_score > 0.5);
        assert!(slow.speed_score < 0.5);
    }

    #[test]
    fn test_raw_score_is_clamped() {
        let raw = engine().calculate_raw_score(1.0, 1.0, Category::Raven).unwrap();
        assert_eq!(raw, 1.0);
        let raw = engine().calculate_raw_score(0.0, 0.0, Category::Inductive).unwrap();
        assert_eq!(raw, 0.0);
    }

    #[test]
    fn test_normalize_bounds() {
        let e = engine();
        for i in 0..=100 {
            let score = e.normalize_score(i as f64 / 100.0);
            assert!((40..=160).contains(&score));
        }
        assert_eq!(e.normalize_score(0.5), 100);
        assert_eq!(e.normalize_score(1.0), 114);
        assert_eq!(e.normalize_score(0.0), 86);
    }

    #[test]
    fn test_normalize_respects_narrow_bounds() {
        let config = AnalysisConfig {
            scale: ScoreScale { min_score: 95, max_score: 105, ..Default::default() },
            ..Default::default()
        };
        let e = CognitiveAnalysisEngine::new(config);
        assert_eq!(e.normalize_score(1.0), 105);
        assert_eq!(e.normalize_score(0.0), 95);
    }

    #[test]
    fn test_perfect_fast_raven() {
        let responses = ResponseSet::new(vec![1, 2], vec![1, 2], vec![20_000.0, 20_000.0]);
        assert_eq!(engine().analyze_performance(&responses, Category::Raven), 114);
    }

    #[test]
    fn test_all_wrong_slow_raven() {
        let responses = ResponseSet::new(vec![0, 0], vec![1, 2], vec![80_000.0, 80_000.0]);
        assert_eq!(engine().analyze_performance(&responses, Category::Raven), 88);
    }

    #[test]
    fn test_missing_times_falls_back() {
        let responses = ResponseSet {
            answers: Some(vec![1]),
            correct_answers: Some(vec![1]),
            response_times: None,
        };
        let e = engine();
        assert_eq!(e.analyze_performance(&responses, Category::Raven), 100);
        assert_eq!(
            e.try_analyze_performance(&responses, Category::Raven),
            Err(AnalysisError::IncompleteData("responseTimes"))
        );

        let report = e.generate_detailed_report(&responses, Category::Raven);
        assert_eq!(report.iq_score, 100);
        assert_eq!(report.interpretation.label(), "Nella media");
        assert_eq!(report.details.accuracy, 1.0);
        assert_eq!(report.details.speed_score, 0.5);
        assert_eq!(report.details.average_response_time, 0.0);
    }

    #[test]
    fn test_mismatched_lengths_fall_back() {
        let responses = ResponseSet::new(vec![1, 2, 3], vec![1, 2], vec![1000.0; 3]);
        let e = engine();
        assert_eq!(
            e.try_analyze_performance(&responses, Category::Deductive),
            Err(AnalysisError::MismatchedLength { answers: 3, correct: 2 })
        );
        assert_eq!(e.analyze_performance(&responses, Category::Deductive), 100);
    }

    #[test]
    fn test_empty_or_invalid_times_fall_back() {
        let e = engine();
        let empty = ResponseSet::new(vec![1], vec![1], vec![]);
        assert_eq!(
            e.try_analyze_performance(&empty, Category::Raven),
            Err(AnalysisError::NoResponseTimes)
        );
        let negative = ResponseSet::new(vec![1], vec![1], vec![-5.0]);
        assert!(matches!(
            e.try_analyze_performance(&negative, Category::Raven),
            Err(AnalysisError::InvalidResponseTime(_))
        ));
        assert_eq!(e.analyze_performance(&negative, Category::Raven), 100);
    }

    #[test]
    fn test_unknown_category_falls_back() {
        let mut config = AnalysisConfig::default();
        config.categories.remove(&Category::Critical);
        let e = CognitiveAnalysisEngine::new(config);
        let responses = ResponseSet::new(vec![1], vec![1], vec![1000.0]);
        assert_eq!(
            e.try_analyze_performance(&responses, Category::Critical),
            Err(AnalysisError::UnknownCategory(Category::Critical))
        );
        assert_eq!(e.analyze_performance(&responses, Category::Critical), 100);
    }

    #[test]
    fn test_interpretation_bands() {
        assert_eq!(Interpretation::from_score(145), Interpretation::Exceptional);
        assert_eq!(Interpretation::from_score(130), Interpretation::Exceptional);
        assert_eq!(Interpretation::from_score(129), Interpretation::Superior);
        assert_eq!(Interpretation::from_score(110), Interpretation::AboveAverage);
        assert_eq!(Interpretation::from_score(90), Interpretation::Average);
        assert_eq!(Interpretation::from_score(89), Interpretation::BelowAverage);
        assert_eq!(Interpretation::from_score(79), Interpretation::NeedsImprovement);
    }

    #[test]
    fn test_detailed_report() {
        let responses = ResponseSet::new(vec![1, 2, 3], vec![1, 2, 4], vec![30_000.0; 3]);
        let report = engine().generate_detailed_report(&responses, Category::Inductive);
        assert_eq!(report.category, Category::Inductive);
        assert_eq!(report.iq_score, 104);
        assert_eq!(report.interpretation, Interpretation::Average);
        assert!((report.details.speed_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("raven".parse::<Category>(), Ok(Category::Raven));
        assert_eq!("Spaziale".parse::<Category>(), Ok(Category::Spatial));
        assert_eq!("quantitative".parse::<Category>(), Ok(Category::Quantitative));
        assert!("verbal".parse::<Category>().is_err());
    }

    #[test]
    fn test_response_set_accepts_both_casings() {
        let camel: ResponseSet = serde_json::from_str(
            r#"{"answers": [1], "correctAnswers": [1], "responseTimes": [1200]}"#,
        )
        .unwrap();
        let snake: ResponseSet = serde_json::from_str(
            r#"{"answers": [1], "correct_answers": [1], "response_times": [1200]}"#,
        )
        .unwrap();
        assert_eq!(camel, snake);
        let partial: ResponseSet = serde_json::from_str(r#"{"answers": [1]}"#).unwrap();
        assert!(partial.response_times.is_none());
    }

    #[test]
    fn test_report_serializes_label() {
        let responses = ResponseSet::default();
        let report = engine().generate_detailed_report(&responses, Category::Raven);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"interpretation\":\"Nella media\""));
        assert!(json.contains("\"category\":\"raven\""));
    }
}
