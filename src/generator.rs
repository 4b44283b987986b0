//! Matrix puzzle generation
//!
//! Builds a 3×3 progressive matrix for a difficulty level: eight cells are
//! derived from their coordinates, the ninth (bottom right) is left blank and
//! its value becomes the correct answer. Distractors are produced by bounded
//! mutation of the correct answer on linear levels and by full randomization
//! on trigonometric levels; any candidate that looks like an already accepted
//! option is thrown away and redrawn.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

use crate::catalog::{Catalog, ComplexityMatrix, LevelBounds, TrigVariant};
use crate::element::{are_visually_identical, VisualElement};

/// Rows and columns of a puzzle grid
pub const GRID_SIZE: usize = 3;

/// The blank cell holding the answer
pub const ANSWER_CELL: (usize, usize) = (2, 2);

/// Number of distinct distractor mutations on linear levels
const MUTATION_SLOTS: usize = 5;

/// Errors raised while generating a single puzzle
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// The level has no row in the complexity matrix
    #[error("difficulty level {0} is not supported")]
    UnsupportedLevel(u32),

    /// Not enough visually distinct options could be produced
    #[error("level {level}: only {found} of {required} visually distinct options available")]
    InsufficientDistinctOptions { level: u32, required: usize, found: usize },

    /// A finished matrix failed its structural checks
    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),

    /// Catalog, complexity matrix or settings cannot work together
    #[error("invalid generator setup: {0}")]
    InvalidSetup(String),
}

/// Generator tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Answer options per puzzle, the correct one included
    pub option_count: usize,
    /// Redraws allowed per distractor before giving up
    pub max_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { option_count: 6, max_attempts: 1000 }
    }
}

/// One multiple-choice option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    #[serde(flatten)]
    pub element: VisualElement,
    pub is_correct: bool,
}

/// A generated puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleMatrix {
    pub level: u32,
    /// Row-major grid; the answer cell is `None`
    pub cells: [[Option<VisualElement>; GRID_SIZE]; GRID_SIZE],
    /// Options in presentation order
    pub options: Vec<AnswerOption>,
    /// Index of the correct option in `options`
    pub correct_answer: usize,
}

impl PuzzleMatrix {
    pub fn cell(&self, row: usize, col: usize) -> Option<&VisualElement> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.get(self.correct_answer)
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

/// Parametric puzzle generator.
///
/// Holds only immutable configuration, so one generator can serve any number
/// of calls, including concurrent ones from [`MatrixGenerator::generate_batch`].
#[derive(Debug, Clone)]
pub struct MatrixGenerator {
    catalog: Catalog,
    complexity: ComplexityMatrix,
    config: GeneratorConfig,
    distinct_pool: usize,
}

impl MatrixGenerator {
    /// Create a generator, checking the catalog and table fit together.
    pub fn new(
        catalog: Catalog,
        complexity: ComplexityMatrix,
        config: GeneratorConfig,
    ) -> Result<Self, GenerateError> {
        let empty = catalog.empty_families();
        if !empty.is_empty() {
            return Err(GenerateError::InvalidSetup(format!(
                "empty catalog families: {}",
                empty.join(", ")
            )));
        }
        let problems = complexity.check_against(&catalog);
        if !problems.is_empty() {
            return Err(GenerateError::InvalidSetup(problems.join("; ")));
        }
        if config.option_count < 2 {
            return Err(GenerateError::InvalidSetup(format!(
                "option_count must be at least 2, got {}",
                config.option_count
            )));
        }
        let distinct_pool = catalog.distinct_combinations();
        Ok(Self { catalog, complexity, config, distinct_pool })
    }

    /// Generator over the built-in catalog and table with custom settings.
    pub fn with_config(config: GeneratorConfig) -> Result<Self, GenerateError> {
        Self::new(Catalog::builtin(), ComplexityMatrix::builtin(), config)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn complexity(&self) -> &ComplexityMatrix {
        &self.complexity
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one puzzle for `level`.
    pub fn generate_matrix<R: Rng + ?Sized>(
        &self,
        level: u32,
        rng: &mut R,
    ) -> Result<PuzzleMatrix, GenerateError> {
        let bounds = self.level_bounds(level)?;

        let mut cells: [[Option<VisualElement>; GRID_SIZE]; GRID_SIZE] = Default::default();
        for (row, cells_row) in cells.iter_mut().enumerate() {
            for (col, cell) in cells_row.iter_mut().enumerate() {
                if (row, col) != ANSWER_CELL {
                    *cell = Some(self.derive_element(level, bounds, row, col));
                }
            }
        }

        let correct = self.derive_element(level, bounds, ANSWER_CELL.0, ANSWER_CELL.1);
        let mut options = self.generate_options(&correct, level, rng)?;
        options.shuffle(rng);
        let correct_answer = options.iter().position(|o| o.is_correct).unwrap_or(options.len());

        let matrix = PuzzleMatrix { level, cells, options, correct_answer };
        validate_matrix(&matrix)?;
        tracing::trace!(level, correct_answer, "generated matrix");
        Ok(matrix)
    }

    /// The deterministic element for a grid coordinate.
    ///
    /// For [`ANSWER_CELL`] this is the correct answer.
    pub fn cell_element(
        &self,
        level: u32,
        row: usize,
        col: usize,
    ) -> Result<VisualElement, GenerateError> {
        let bounds = self.level_bounds(level)?;
        Ok(self.derive_element(level, bounds, row, col))
    }

    /// Correct answer for `level`
    pub fn correct_element(&self, level: u32) -> Result<VisualElement, GenerateError> {
        self.cell_element(level, ANSWER_CELL.0, ANSWER_CELL.1)
    }

    /// The correct option followed by the distractors, unshuffled.
    pub fn generate_options<R: Rng + ?Sized>(
        &self,
        correct: &VisualElement,
        level: u32,
        rng: &mut R,
    ) -> Result<Vec<AnswerOption>, GenerateError> {
        let bounds = self.level_bounds(level)?;
        let required = self.config.option_count;
        if self.distinct_pool < required {
            return Err(GenerateError::InsufficientDistinctOptions {
                level,
                required,
                found: self.distinct_pool,
            });
        }

        let randomize = self.complexity.is_trigonometric(level);
        let mut options = Vec::with_capacity(required);
        options.push(AnswerOption { element: correct.clone(), is_correct: true });

        for slot in 0..required - 1 {
            let mut candidate = if randomize {
                self.catalog.random_element(rng)
            } else {
                self.mutate(correct, slot, level, bounds)
            };

            let mut attempts = 0;
            while options.iter().any(|o| are_visually_identical(&o.element, &candidate)) {
                attempts += 1;
                if attempts > self.config.max_attempts {
                    return Err(GenerateError::InsufficientDistinctOptions {
                        level,
                        required,
                        found: options.len(),
                    });
                }
                candidate = self.catalog.random_element(rng);
            }
            if attempts > 0 {
                tracing::debug!(level, slot, attempts, "redrew duplicate distractor");
            }

            options.push(AnswerOption { element: candidate, is_correct: false });
        }

        Ok(options)
    }

    /// Generate `count` puzzles in parallel.
    ///
    /// Item `i` is seeded with `seed + i`, so the output does not depend on
    /// how work is split across threads.
    pub fn generate_batch(
        &self,
        level: u32,
        count: usize,
        seed: u64,
    ) -> Vec<Result<PuzzleMatrix, GenerateError>> {
        (0..count)
            .into_par_iter()
            .map(|i| {
                let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.generate_matrix(level, &mut rng)
            })
            .collect()
    }

    fn level_bounds(&self, level: u32) -> Result<LevelBounds, GenerateError> {
        self.complexity.bounds(level).ok_or(GenerateError::UnsupportedLevel(level))
    }

    fn derive_element(
        &self,
        level: u32,
        bounds: LevelBounds,
        row: usize,
        col: usize,
    ) -> VisualElement {
        match self.complexity.trig_variant(level) {
            None => self.linear_element(level, bounds, row, col),
            Some(variant) => self.trig_element(level, variant, row, col),
        }
    }

    fn linear_element(&self, level: u32, b: LevelBounds, i: usize, j: usize) -> VisualElement {
        let c = &self.catalog;
        let t = &self.complexity.thresholds;
        let stride = if level >= t.rotation_stride_from { 2 } else { 1 };

        let opacity = if level >= t.opacity_from {
            c.opacities[((i + j) % b.opacities).min(b.opacities - 1)]
        } else {
            1.0
        };
        let scale = if level >= t.scale_from {
            c.scales[((i * j) % b.scales).min(b.scales - 1)]
        } else {
            1.0
        };

        VisualElement::new(
            c.shapes[(i * 2 + j) % b.shapes],
            c.rotations[((i + j) * stride) % b.rotations],
            c.colors[((i * 2 + j) % b.colors).min(b.colors - 1)].clone(),
            opacity,
            scale,
        )
    }

    fn trig_element(&self, level: u32, variant: TrigVariant, i: usize, j: usize) -> VisualElement {
        let c = &self.catalog;
        let (x, y) = (i as f64, j as f64);

        let mut e = VisualElement::new(
            c.shapes[(i * 3 + j * 2) % c.shapes.len()],
            (((i * 90 + j * 45) as u64 * level as u64) % 360) as f64,
            c.colors[(i * 2 + j * 3) % c.colors.len()].clone(),
            c.opacities[(i + j) % c.opacities.len()],
            c.scales[(i * j) % c.scales.len()],
        );

        match variant {
            TrigVariant::Sine => {
                e.rotation = (e.rotation + (x * y).sin() * 30.0) % 360.0;
                e.scale = c.scales[trig_index((x + y).sin() * 4.0, c.scales.len())];
            }
            TrigVariant::Cosine => {
                e.rotation = (e.rotation + (x * y * PI).cos() * 45.0) % 360.0;
                e.opacity = c.opacities[trig_index((x + y).cos() * 6.0, c.opacities.len())];
            }
            TrigVariant::Tangent => {
                e.rotation = (e.rotation + (x * y).tan() * 60.0) % 360.0;
                e.scale = c.scales[trig_index((x + y).tan() * 5.0, c.scales.len())];
                e.opacity = c.opacities[trig_index((x * y * PI).sin() * 7.0, c.opacities.len())];
            }
        }
        e
    }

    /// Bounded structural mutation of the correct answer for one distractor slot.
    fn mutate(
        &self,
        correct: &VisualElement,
        slot: usize,
        level: u32,
        bounds: LevelBounds,
    ) -> VisualElement {
        let t = &self.complexity.thresholds;
        let mut e = correct.clone();
        let shape_index = self.catalog.shape_index(e.shape).unwrap_or(0);

        match slot % MUTATION_SLOTS {
            0 => e.rotation = (e.rotation + 45.0) % 360.0,
            1 => e.shape = self.catalog.shapes[(shape_index + 1) % bounds.shapes],
            2 => {
                e.shape = self.catalog.shapes[(shape_index + 2) % bounds.shapes];
                e.rotation = (e.rotation + 90.0) % 360.0;
            }
            3 => {
                if level >= t.scale_from {
                    e.scale *= 1.2;
                }
                e.rotation = (e.rotation + 180.0) % 360.0;
            }
            _ => {
                if level >= t.opacity_from {
                    e.opacity = (e.opacity - 0.2).max(0.3);
                }
                e.rotation = (e.rotation + 135.0) % 360.0;
            }
        }
        e
    }
}

impl Default for MatrixGenerator {
    fn default() -> Self {
        let catalog = Catalog::builtin();
        let distinct_pool = catalog.distinct_combinations();
        Self {
            catalog,
            complexity: ComplexityMatrix::builtin(),
            config: GeneratorConfig::default(),
            distinct_pool,
        }
    }
}

fn trig_index(value: f64, len: usize) -> usize {
    (value.abs().floor() as usize) % len
}

/// Structural checks every shipped puzzle must pass.
pub fn validate_matrix(matrix: &PuzzleMatrix) -> Result<(), GenerateError> {
    if matrix.correct_answer >= matrix.options.len() {
        return Err(GenerateError::InvalidMatrix(format!(
            "correct answer index {} out of range for {} options",
            matrix.correct_answer,
            matrix.options.len()
        )));
    }

    let correct_count = matrix.options.iter().filter(|o| o.is_correct).count();
    if correct_count != 1 || !matrix.options[matrix.correct_answer].is_correct {
        return Err(GenerateError::InvalidMatrix(format!(
            "expected exactly one correct option at index {}, found {}",
            matrix.correct_answer, correct_count
        )));
    }

    for (a, first) in matrix.options.iter().enumerate() {
        for (b, second) in matrix.options.iter().enumerate().skip(a + 1) {
            if are_visually_identical(&first.element, &second.element) {
                return Err(GenerateError::InvalidMatrix(format!(
                    "options {} and {} are visually identical",
                    a, b
                )));
            }
        }
    }

    let (row, col) = ANSWER_CELL;
    if matrix.cells[row][col].is_some() || matrix.filled_cells() != GRID_SIZE * GRID_SIZE - 1 {
        return Err(GenerateError::InvalidMatrix(
            "grid must have every cell filled except the answer cell".to_string(),
        ));
    }

    Ok(())
}
