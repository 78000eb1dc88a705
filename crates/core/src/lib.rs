#![forbid(unsafe_code)]

pub mod model;
pub mod session;
pub mod shuffle;

#[cfg(test)]
mod property_tests;

pub use model::{
    FormatError, NameError, Question, QuestionDraft, QuestionError, QuizName, parse_question_set,
};
pub use session::{
    Advance, QuizProgress, QuizSession, Selection, SessionError, SessionSnapshot, SessionStatus,
};
