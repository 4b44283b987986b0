//! Progressive ladder run
//!
//! One puzzle per level, climbing from the lowest to the highest level of the
//! generator's complexity matrix. Each correct answer scores a point; the run
//! never branches on performance.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::{GenerateError, MatrixGenerator, PuzzleMatrix};

/// Errors raised by a ladder run
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum LadderError {
    /// Every level has already been answered
    #[error("ladder run is already finished")]
    Finished,

    /// `finish` called with levels still open
    #[error("ladder run still has {remaining} levels to answer")]
    NotFinished { remaining: usize },

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LadderResult {
    /// Correctly answered levels
    pub score: u32,
    pub levels: u32,
    /// `score / levels`
    pub accuracy: f64,
}

/// A run in progress.
pub struct LadderRun<'g, R> {
    generator: &'g MatrixGenerator,
    rng: R,
    levels: Vec<u32>,
    position: usize,
    current: Option<PuzzleMatrix>,
    score: u32,
}

impl<'g, R: Rng> LadderRun<'g, R> {
    /// Start at the lowest level and generate its puzzle.
    pub fn new(generator: &'g MatrixGenerator, mut rng: R) -> Result<Self, LadderError> {
        let levels: Vec<u32> = generator.complexity().levels().map(|(level, _)| level).collect();
        let current = match levels.first() {
            Some(level) => Some(generator.generate_matrix(*level, &mut rng)?),
            None => None,
        };
        Ok(Self { generator, rng, levels, position: 0, current, score: 0 })
    }

    /// Puzzle awaiting an answer, `None` once finished
    pub fn current(&self) -> Option<&PuzzleMatrix> {
        self.current.as_ref()
    }

    pub fn level(&self) -> Option<u32> {
        self.current.as_ref().map(|m| m.level)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    /// Answer the current puzzle and advance. Returns whether it was correct.
    ///
    /// The next level is generated before the answer is recorded; if that
    /// fails the run stays on the current puzzle with its score unchanged.
    pub fn answer(&mut self, option_index: usize) -> Result<bool, LadderError> {
        let matrix = self.current.as_ref().ok_or(LadderError::Finished)?;
        let correct = matrix.is_correct(option_index);
        let level = matrix.level;

        let next = match self.levels.get(self.position + 1).copied() {
            Some(next_level) => Some(self.generator.generate_matrix(next_level, &mut self.rng)?),
            None => None,
        };
        tracing::debug!(level, option_index, correct, "ladder answer");

        if correct {
            self.score += 1;
        }
        self.position += 1;
        self.current = next;
        Ok(correct)
    }

    /// Final score once every level is answered.
    pub fn finish(&self) -> Result<LadderResult, LadderError> {
        if !self.is_finished() {
            return Err(LadderError::NotFinished { remaining: self.levels.len() - self.position });
        }
        let levels = self.levels.len() as u32;
        let accuracy = if levels == 0 { 0.0 } else { self.score as f64 / levels as f64 };
        Ok(LadderResult { score: self.score, levels, accuracy })
    }
}
