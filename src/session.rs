//! Test session orchestration
//!
//! [`RavenSystem`] sequences several difficulty levels into one test: it
//! pre-generates every question, records answers against caller-supplied
//! timestamps and summarizes the session at the end. Timestamps are plain
//! milliseconds on whatever clock the host uses; the core never reads a clock.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{Category, CognitiveAnalysisEngine, DetailedReport, ResponseSet};
use crate::generator::{MatrixGenerator, PuzzleMatrix};

/// Milliseconds on the host's clock
pub type Millis = u64;

/// Errors raised by session lifecycle calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Question index outside the session
    #[error("invalid parameters: question index {index} out of range for {len} questions")]
    InvalidParameters { index: usize, len: usize },

    /// The question already has a response
    #[error("question {0} has already been answered")]
    AlreadyAnswered(String),

    /// Final report requested before any answer
    #[error("invalid session data: no responses recorded")]
    InvalidSessionData,

    /// Every question failed to generate
    #[error("no questions could be generated")]
    NoQuestions,
}

/// Shape of a test session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lowest level; failures here are dropped instead of retried
    pub min_level: u32,
    /// Highest level included
    pub max_levels: u32,
    pub questions_per_level: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { min_level: 1, max_levels: 3, questions_per_level: 7 }
    }
}

/// A question bound to its generated puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub level: u32,
    pub matrix: PuzzleMatrix,
    pub presented_at: Option<Millis>,
    pub answered_at: Option<Millis>,
}

/// One recorded answer. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub question_id: String,
    pub level: u32,
    pub answer: usize,
    pub correct_answer: usize,
    pub is_correct: bool,
    pub time_spent: Millis,
}

/// State of one running test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSession {
    pub questions: Vec<Question>,
    pub responses: Vec<ResponseRecord>,
    pub started_at: Millis,
    pub current_question: usize,
}

impl TestSession {
    pub fn is_complete(&self) -> bool {
        self.questions.iter().all(|q| q.answered_at.is_some())
    }

    /// Response log in the shape the analysis engine scores.
    pub fn response_set(&self) -> ResponseSet {
        ResponseSet::new(
            self.responses.iter().map(|r| r.answer).collect(),
            self.responses.iter().map(|r| r.correct_answer).collect(),
            self.responses.iter().map(|r| r.time_spent as f64).collect(),
        )
    }
}

/// Result of submitting one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub response: ResponseRecord,
    pub should_continue: bool,
}

/// End-of-session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub accuracy: f64,
    pub average_time_per_question: f64,
    pub max_level_reached: u32,
    pub finished_at: Millis,
    /// Scored under [`Category::Raven`]
    pub cognitive: DetailedReport,
}

/// Multi-level test orchestrator.
#[derive(Debug, Clone, Default)]
pub struct RavenSystem {
    generator: MatrixGenerator,
    engine: CognitiveAnalysisEngine,
    config: SessionConfig,
}

impl RavenSystem {
    pub fn new(
        generator: MatrixGenerator,
        engine: CognitiveAnalysisEngine,
        config: SessionConfig,
    ) -> Self {
        Self { generator, engine, config }
    }

    pub fn generator(&self) -> &MatrixGenerator {
        &self.generator
    }

    pub fn engine(&self) -> &CognitiveAnalysisEngine {
        &self.engine
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Generate a new session's questions and open it at `started_at`.
    pub fn start_test<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        started_at: Millis,
    ) -> Result<TestSession, SessionError> {
        let questions = self.generate_test_questions(rng);
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        tracing::info!(questions = questions.len(), started_at, "test session started");
        Ok(TestSession { questions, responses: Vec::new(), started_at, current_question: 0 })
    }

    /// Every configured level × questions per level, in level order.
    ///
    /// A question whose level fails to generate is retried once at the level
    /// below; at the minimum level, or if the retry fails too, it is dropped.
    pub fn plan_questions<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Question> {
        let SessionConfig { min_level, max_levels, questions_per_level } = self.config;
        let mut questions = Vec::new();

        for level in min_level..=max_levels {
            for index in 0..questions_per_level {
                let generated = match self.generator.generate_matrix(level, rng) {
                    Ok(matrix) => Some((level, matrix)),
                    Err(e) if level > min_level => {
                        tracing::warn!(level, index, error = %e, "generation failed, falling back one level");
                        match self.generator.generate_matrix(level - 1, rng) {
                            Ok(matrix) => Some((level - 1, matrix)),
                            Err(e) => {
                                tracing::warn!(level = level - 1, index, error = %e, "fallback generation failed, question dropped");
                                None
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(level, index, error = %e, "generation failed at minimum level, question dropped");
                        None
                    }
                };

                if let Some((level, matrix)) = generated {
                    questions.push(Question {
                        id: format!("Q{}", questions.len() + 1),
                        level,
                        matrix,
                        presented_at: None,
                        answered_at: None,
                    });
                }
            }
        }

        questions
    }

    /// [`RavenSystem::plan_questions`] in uniformly shuffled order.
    pub fn generate_test_questions<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Question> {
        let mut questions = self.plan_questions(rng);
        questions.shuffle(rng);
        questions
    }

    /// Record when a question was shown; response time counts from here.
    ///
    /// An answered question cannot be shown again.
    pub fn present_question<'s>(
        &self,
        session: &'s mut TestSession,
        index: usize,
        at: Millis,
    ) -> Result<&'s Question, SessionError> {
        let len = session.questions.len();
        let question =
            session.questions.get_mut(index).ok_or(SessionError::InvalidParameters { index, len })?;
        if question.answered_at.is_some() {
            return Err(SessionError::AlreadyAnswered(question.id.clone()));
        }
        question.presented_at = Some(at);
        session.current_question = index;
        Ok(question)
    }

    /// Score `answer` for question `index` and append it to the session log.
    ///
    /// Time spent is `answered_at - presented_at`, or 0 if the question was
    /// never presented.
    pub fn process_answer(
        &self,
        session: &mut TestSession,
        index: usize,
        answer: usize,
        answered_at: Millis,
    ) -> Result<AnswerOutcome, SessionError> {
        let len = session.questions.len();
        let question =
            session.questions.get_mut(index).ok_or(SessionError::InvalidParameters { index, len })?;
        if question.answered_at.is_some() {
            return Err(SessionError::AlreadyAnswered(question.id.clone()));
        }

        let correct_answer = question.matrix.correct_answer;
        let is_correct = answer == correct_answer;
        let time_spent = question
            .presented_at
            .map(|shown| answered_at.saturating_sub(shown))
            .unwrap_or(0);
        question.answered_at = Some(answered_at);

        let response = ResponseRecord {
            question_id: question.id.clone(),
            level: question.level,
            answer,
            correct_answer,
            is_correct,
            time_spent,
        };
        tracing::debug!(question = %response.question_id, is_correct, time_spent, "answer recorded");

        session.responses.push(response.clone());
        session.current_question = index + 1;

        Ok(AnswerOutcome { response, should_continue: index + 1 < len })
    }

    /// Aggregate accuracy, timing and level reached over all responses.
    pub fn generate_final_report(
        &self,
        session: &TestSession,
        finished_at: Millis,
    ) -> Result<FinalReport, SessionError> {
        let responses = &session.responses;
        if responses.is_empty() {
            return Err(SessionError::InvalidSessionData);
        }

        let total = responses.len();
        let correct_answers = responses.iter().filter(|r| r.is_correct).count();
        let total_time: Millis = responses.iter().map(|r| r.time_spent).sum();
        let max_level_reached = responses.iter().map(|r| r.level).max().unwrap_or(0);
        let cognitive =
            self.engine.generate_detailed_report(&session.response_set(), Category::Raven);

        let report = FinalReport {
            total_questions: total,
            correct_answers,
            accuracy: correct_answers as f64 / total as f64,
            average_time_per_question: total_time as f64 / total as f64,
            max_level_reached,
            finished_at,
            cognitive,
        };
        tracing::info!(
            total,
            correct_answers,
            score = report.cognitive.iq_score,
            "test session finished"
        );
        Ok(report)
    }
}
