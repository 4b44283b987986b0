//! Configuration schema types for `raven.toml`
//!
//! Defines the structure and validation rules for generator, scoring and
//! session settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{AnalysisConfig, Category, CategoryProfile, EvaluationWeights, ScoreScale};
use crate::catalog::ComplexityMatrix;
use crate::generator::GeneratorConfig;
use crate::session::SessionConfig;

/// Smallest accepted number of answer options
pub const MIN_OPTION_COUNT: usize = 2;

/// Largest accepted number of answer options
pub const MAX_OPTION_COUNT: usize = 12;

/// Scoring scale and weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_mean")]
    pub mean: f64,
    #[serde(default = "default_standard_deviation")]
    pub standard_deviation: f64,
    #[serde(default = "default_min_score")]
    pub min_score: u32,
    #[serde(default = "default_max_score")]
    pub max_score: u32,
    #[serde(default = "default_accuracy_weight")]
    pub accuracy_weight: f64,
    #[serde(default = "default_speed_weight")]
    pub speed_weight: f64,
    /// Per-category overrides layered over the built-in table
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<Category, CategoryProfile>,
}

fn default_mean() -> f64 {
    100.0
}

fn default_standard_deviation() -> f64 {
    15.0
}

fn default_min_score() -> u32 {
    40
}

fn default_max_score() -> u32 {
    160
}

fn default_accuracy_weight() -> f64 {
    0.7
}

fn default_speed_weight() -> f64 {
    0.3
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mean: default_mean(),
            standard_deviation: default_standard_deviation(),
            min_score: default_min_score(),
            max_score: default_max_score(),
            accuracy_weight: default_accuracy_weight(),
            speed_weight: default_speed_weight(),
            categories: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Engine constants with the overrides applied.
    pub fn to_analysis_config(&self) -> AnalysisConfig {
        let mut categories = AnalysisConfig::builtin_categories();
        categories.extend(self.categories.iter().map(|(c, p)| (*c, *p)));

        AnalysisConfig {
            scale: ScoreScale {
                mean: self.mean,
                standard_deviation: self.standard_deviation,
                min_score: self.min_score,
                max_score: self.max_score,
            },
            weights: EvaluationWeights { accuracy: self.accuracy_weight, speed: self.speed_weight },
            categories,
        }
    }
}

/// Complete raven.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RavenConfig {
    /// Fixed RNG seed; entropy-seeded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "scoring.min_score")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raven.toml: '{}' {}", self.field, self.message)
    }
}

impl RavenConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: String| {
            errors.push(ConfigValidationError { field: field.to_string(), message })
        };

        let generator = &self.generator;
        if !(MIN_OPTION_COUNT..=MAX_OPTION_COUNT).contains(&generator.option_count) {
            push(
                "generator.option_count",
                format!("must be between {} and {}", MIN_OPTION_COUNT, MAX_OPTION_COUNT),
            );
        }
        if generator.max_attempts == 0 {
            push("generator.max_attempts", "must be a positive integer".to_string());
        }

        let scoring = &self.scoring;
        if !(scoring.standard_deviation.is_finite() && scoring.standard_deviation > 0.0) {
            push("scoring.standard_deviation", "must be a positive number".to_string());
        }
        if scoring.min_score >= scoring.max_score {
            push("scoring.min_score", "must be less than scoring.max_score".to_string());
        } else if !(scoring.mean >= scoring.min_score as f64
            && scoring.mean <= scoring.max_score as f64)
        {
            push(
                "scoring.mean",
                format!("must lie within [{}, {}]", scoring.min_score, scoring.max_score),
            );
        }
        if !(scoring.accuracy_weight.is_finite() && scoring.speed_weight.is_finite()) {
            push("scoring.accuracy_weight", "weights must be finite".to_string());
        } else if scoring.accuracy_weight < 0.0 || scoring.speed_weight < 0.0 {
            push("scoring.accuracy_weight", "weights must be non-negative".to_string());
        } else if scoring.accuracy_weight + scoring.speed_weight <= 0.0 {
            push("scoring.accuracy_weight", "weights must not both be zero".to_string());
        }
        for (category, profile) in &scoring.categories {
            if !(profile.weight > 0.0 && profile.expected_response_ms > 0.0) {
                push(
                    &format!("scoring.categories.{}", category),
                    "weight and expected_response_ms must be positive".to_string(),
                );
            }
        }

        let session = &self.session;
        let top_level = ComplexityMatrix::builtin().max_level().unwrap_or(0);
        if session.min_level == 0 {
            push("session.min_level", "must be at least 1".to_string());
        }
        if session.max_levels < session.min_level || session.max_levels > top_level {
            push(
                "session.max_levels",
                format!("must lie between session.min_level and {}", top_level),
            );
        }
        if session.questions_per_level == 0 {
            push("session.questions_per_level", "must be a positive integer".to_string());
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
