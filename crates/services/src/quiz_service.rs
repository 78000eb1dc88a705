use std::fmt;
use std::sync::Arc;

use quiz_core::{Advance, QuizName, QuizSession, Selection, SessionSnapshot};
use storage::repository::{QuestionStore, StorageError};

use crate::error::QuizServiceError;

//
// ─── RUN ───────────────────────────────────────────────────────────────────────
//

/// A quiz in progress: the set it was started from and its session.
pub struct QuizRun {
    name: QuizName,
    session: QuizSession,
}

impl QuizRun {
    #[must_use]
    pub fn name(&self) -> &QuizName {
        &self.name
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }
}

impl fmt::Debug for QuizRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizRun")
            .field("name", &self.name)
            .field("session", &self.session)
            .finish()
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Starts quizzes from a question store and drives their sessions.
#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn QuestionStore>,
    seed: Option<u64>,
}

impl QuizService {
    #[must_use]
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store, seed: None }
    }

    /// Seed every session's option shuffle. `None` uses OS randomness.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn new_session(&self, questions: Vec<quiz_core::Question>) -> QuizSession {
        match self.seed {
            Some(seed) => QuizSession::seeded(questions, seed),
            None => QuizSession::new(questions),
        }
    }

    async fn load(&self, name: &QuizName) -> Result<Vec<quiz_core::Question>, QuizServiceError> {
        self.store.load(name).await.map_err(|e| match e {
            StorageError::NotFound => QuizServiceError::NotFound(name.clone()),
            other => QuizServiceError::Storage(other),
        })
    }

    /// Load the set `name` and start a session over it.
    ///
    /// An empty set starts a session in the loading state.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotFound` for unknown sets and
    /// `QuizServiceError::Storage` for other storage failures.
    pub async fn start(&self, name: &QuizName) -> Result<QuizRun, QuizServiceError> {
        let questions = self.load(name).await?;
        tracing::info!(quiz = %name, questions = questions.len(), "starting quiz");
        Ok(QuizRun {
            name: name.clone(),
            session: self.new_session(questions),
        })
    }

    /// Lock `option` for the current question.
    pub fn answer(&self, run: &mut QuizRun, option: &str) -> Selection {
        let selection = run.session.select_answer(option);
        tracing::debug!(quiz = %run.name, ?selection, "answer selected");
        selection
    }

    /// Lock the option shown at 1-based position `choice`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NoSuchOption` if `choice` is not on screen.
    pub fn answer_choice(
        &self,
        run: &mut QuizRun,
        choice: usize,
    ) -> Result<Selection, QuizServiceError> {
        let shown = run.session.display_order();
        let option = choice
            .checked_sub(1)
            .and_then(|idx| shown.get(idx))
            .cloned()
            .ok_or(QuizServiceError::NoSuchOption {
                choice,
                count: shown.len(),
            })?;
        Ok(self.answer(run, &option))
    }

    /// Move past the answered question.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` when the session rejects the call.
    pub fn advance(&self, run: &mut QuizRun) -> Result<Advance, QuizServiceError> {
        let step = run.session.advance()?;
        match step {
            Advance::Next { position } => {
                tracing::debug!(quiz = %run.name, position, "next question");
            }
            Advance::ReviewPass { pass, questions } => {
                tracing::info!(quiz = %run.name, pass, questions, "starting review pass");
            }
            Advance::Completed => {
                tracing::info!(quiz = %run.name, passes = run.session.pass() + 1, "quiz complete");
            }
        }
        Ok(step)
    }

    /// Reload the set from the store and start over.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError` if the set can no longer be loaded; the run
    /// is left untouched in that case.
    pub async fn restart(&self, run: &mut QuizRun) -> Result<(), QuizServiceError> {
        let questions = self.load(&run.name).await?;
        tracing::info!(quiz = %run.name, questions = questions.len(), "restarting quiz");
        run.session.restart(questions);
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::{Question, SessionError, SessionStatus};
    use storage::repository::InMemoryRepository;

    fn name(s: &str) -> QuizName {
        QuizName::new(s).unwrap()
    }

    async fn service_with(questions: &[Question]) -> QuizService {
        let repo = InMemoryRepository::new();
        repo.save(&name("set"), questions).await.unwrap();
        QuizService::new(Arc::new(repo)).with_seed(Some(3))
    }

    fn question(text: &str, answer: &str) -> Question {
        Question::new(text, vec!["A".into(), "B".into()], answer, "")
    }

    #[tokio::test]
    async fn unknown_set_is_not_found() {
        let svc = service_with(&[]).await;
        let err = svc.start(&name("missing")).await.unwrap_err();
        assert!(matches!(err, QuizServiceError::NotFound(n) if n.as_str() == "missing"));
    }

    #[tokio::test]
    async fn empty_set_starts_loading() {
        let svc = service_with(&[]).await;
        let run = svc.start(&name("set")).await.unwrap();
        assert_eq!(run.session().status(), SessionStatus::Loading);
    }

    #[tokio::test]
    async fn answer_choice_maps_to_display_order() {
        let svc = service_with(&[question("Q", "B")]).await;
        let mut run = svc.start(&name("set")).await.unwrap();

        let b_at = run
            .session()
            .display_order()
            .iter()
            .position(|o| o == "B")
            .unwrap();
        assert_eq!(svc.answer_choice(&mut run, b_at + 1).unwrap(), Selection::Correct);
        assert_eq!(run.session().selected_option(), Some("B"));
    }

    #[tokio::test]
    async fn answer_choice_rejects_out_of_range() {
        let svc = service_with(&[question("Q", "B")]).await;
        let mut run = svc.start(&name("set")).await.unwrap();

        for choice in [0, 3] {
            let err = svc.answer_choice(&mut run, choice).unwrap_err();
            assert!(matches!(err, QuizServiceError::NoSuchOption { count: 2, .. }));
        }
        assert_eq!(run.session().selected_option(), None);
    }

    #[tokio::test]
    async fn premature_advance_is_a_session_error() {
        let svc = service_with(&[question("Q", "B")]).await;
        let mut run = svc.start(&name("set")).await.unwrap();
        let err = svc.advance(&mut run).unwrap_err();
        assert!(matches!(
            err,
            QuizServiceError::Session(SessionError::Unanswered)
        ));
    }

    #[tokio::test]
    async fn restart_reloads_latest_questions() {
        let repo = InMemoryRepository::new();
        repo.save(&name("set"), &[question("Q1", "A")]).await.unwrap();
        let svc = QuizService::new(Arc::new(repo.clone()));

        let mut run = svc.start(&name("set")).await.unwrap();
        svc.answer(&mut run, "A");
        svc.advance(&mut run).unwrap();
        assert!(run.is_complete());

        repo.replace(&name("set"), &[question("Q1", "A"), question("Q2", "B")])
            .await
            .unwrap();
        svc.restart(&mut run).await.unwrap();
        assert!(!run.is_complete());
        assert_eq!(run.session().active_queue().len(), 2);
        assert_eq!(run.session().position(), 0);
    }
}
