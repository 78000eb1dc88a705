use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::model::Question;
use crate::shuffle::shuffle_options;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Precondition violations when driving a `QuizSession`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions loaded")]
    Empty,
    #[error("quiz already completed")]
    Completed,
    #[error("current question has not been answered")]
    Unanswered,
}

//
// ─── TRANSITION RESULTS ────────────────────────────────────────────────────────
//

/// Outcome of `QuizSession::select_answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Correct,
    Incorrect,
    /// The question is already locked, or there is no current question.
    Ignored,
}

/// Which row of the advance table was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question of the current pass.
    Next { position: usize },
    /// The pass ended with mistakes; those questions are now the queue.
    ReviewPass { pass: u32, questions: usize },
    /// The pass ended without mistakes.
    Completed,
}

/// Coarse status for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Loading,
    Active,
    Reviewing,
    Complete,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Quiz session state machine.
///
/// Walks the active queue question by question. Wrong answers are collected
/// (once per question text) and, when a pass ends with mistakes, replayed as
/// the next pass. The session completes after a pass with no mistakes.
///
/// Generic over the random source used to order answer options so tests can
/// use a seeded generator.
pub struct QuizSession<R = StdRng> {
    active: Vec<Question>,
    position: usize,
    missed: Vec<Question>,
    review_pass: bool,
    pass: u32,
    selected: Option<String>,
    display_order: Vec<String>,
    complete: bool,
    rng: R,
}

impl QuizSession<StdRng> {
    /// Start a session with an OS-seeded random source.
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self::with_rng(questions, StdRng::from_os_rng())
    }

    /// Start a session whose option order is reproducible from `seed`.
    #[must_use]
    pub fn seeded(questions: Vec<Question>, seed: u64) -> Self {
        Self::with_rng(questions, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> QuizSession<R> {
    /// Start a session drawing option order from `rng`.
    ///
    /// An empty `questions` yields a session in `SessionStatus::Loading`.
    pub fn with_rng(questions: Vec<Question>, rng: R) -> Self {
        let mut session = Self {
            active: Vec::new(),
            position: 0,
            missed: Vec::new(),
            review_pass: false,
            pass: 0,
            selected: None,
            display_order: Vec::new(),
            complete: false,
            rng,
        };
        session.reset(questions);
        session
    }

    /// Discard all pass history and start over with `questions`.
    pub fn restart(&mut self, questions: Vec<Question>) {
        self.reset(questions);
    }

    fn reset(&mut self, questions: Vec<Question>) {
        self.active = questions;
        self.position = 0;
        self.missed.clear();
        self.review_pass = false;
        self.pass = 0;
        self.selected = None;
        self.complete = false;
        self.reshuffle();
    }

    fn reshuffle(&mut self) {
        self.display_order = match self.active.get(self.position) {
            Some(question) => shuffle_options(question.options(), &mut self.rng),
            None => Vec::new(),
        };
    }

    /// Lock `option` as the answer to the current question.
    ///
    /// A wrong answer records the question for review unless a question with
    /// the same text is already recorded in this pass. Further calls before
    /// `advance` are ignored.
    pub fn select_answer(&mut self, option: &str) -> Selection {
        if self.selected.is_some() || self.complete {
            return Selection::Ignored;
        }
        let Some(current) = self.active.get(self.position) else {
            return Selection::Ignored;
        };

        let correct = current.is_correct(option);
        if !correct && !self.missed.iter().any(|q| q.text() == current.text()) {
            self.missed.push(current.clone());
        }
        self.selected = Some(option.to_owned());

        if correct {
            Selection::Correct
        } else {
            Selection::Incorrect
        }
    }

    /// Move past the current, answered question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` without questions,
    /// `SessionError::Completed` once finished, and
    /// `SessionError::Unanswered` if no answer is locked. None of these
    /// change the session.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.complete {
            return Err(SessionError::Completed);
        }
        if self.active.is_empty() {
            return Err(SessionError::Empty);
        }
        if self.selected.is_none() {
            return Err(SessionError::Unanswered);
        }

        if self.position + 1 < self.active.len() {
            self.position += 1;
            self.selected = None;
            self.reshuffle();
            return Ok(Advance::Next {
                position: self.position,
            });
        }

        if !self.missed.is_empty() {
            self.active = std::mem::take(&mut self.missed);
            self.position = 0;
            self.review_pass = true;
            self.pass += 1;
            self.selected = None;
            self.reshuffle();
            return Ok(Advance::ReviewPass {
                pass: self.pass,
                questions: self.active.len(),
            });
        }

        self.complete = true;
        Ok(Advance::Completed)
    }
}

impl<R> QuizSession<R> {
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.complete {
            SessionStatus::Complete
        } else if self.active.is_empty() {
            SessionStatus::Loading
        } else if self.review_pass {
            SessionStatus::Reviewing
        } else {
            SessionStatus::Active
        }
    }

    #[must_use]
    pub fn active_queue(&self) -> &[Question] {
        &self.active
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn missed(&self) -> &[Question] {
        &self.missed
    }

    #[must_use]
    pub fn is_review_pass(&self) -> bool {
        self.review_pass
    }

    /// Zero for the first pass, incremented with each review pass.
    #[must_use]
    pub fn pass(&self) -> u32 {
        self.pass
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn display_order(&self) -> &[String] {
        &self.display_order
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.complete {
            return None;
        }
        self.active.get(self.position)
    }

    /// True once an answer is locked for the current question.
    #[must_use]
    pub fn show_explanation(&self) -> bool {
        self.selected.is_some()
    }

    /// Correctness of the locked answer, if any.
    #[must_use]
    pub fn is_correct(&self) -> Option<bool> {
        let selected = self.selected.as_deref()?;
        let question = self.active.get(self.position)?;
        Some(question.is_correct(selected))
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            position: self.position,
            total: self.active.len(),
            pass: self.pass,
            missed: self.missed.len(),
        }
    }

    /// Everything a view needs to render the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let current = self.current_question();
        let answered = self.show_explanation();
        let revealed = current.filter(|_| answered);

        SessionSnapshot {
            status: self.status(),
            progress: self.progress(),
            question: current.map(|q| q.text().to_owned()),
            options: if current.is_some() {
                self.display_order.clone()
            } else {
                Vec::new()
            },
            selected: current.and(self.selected.clone()),
            is_correct: current.and(self.is_correct()),
            correct_answer: revealed.map(|q| q.answer().to_owned()),
            explanation: revealed.map(|q| q.explanation().to_owned()),
            example: revealed.and_then(|q| q.example().map(str::to_owned)),
        }
    }
}

impl<R> fmt::Debug for QuizSession<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("active_len", &self.active.len())
            .field("position", &self.position)
            .field("missed_len", &self.missed.len())
            .field("review_pass", &self.review_pass)
            .field("pass", &self.pass)
            .field("selected", &self.selected)
            .field("complete", &self.complete)
            .finish_non_exhaustive()
    }
}

//
// ─── VIEW DATA ─────────────────────────────────────────────────────────────────
//

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizProgress {
    /// Zero-based index into the active queue.
    pub position: usize,
    pub total: usize,
    pub pass: u32,
    /// Mistakes collected so far in the current pass.
    pub missed: usize,
}

/// Read-only copy of the session state handed to a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub progress: QuizProgress,
    pub question: Option<String>,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub is_correct: Option<bool>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub example: Option<String>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
