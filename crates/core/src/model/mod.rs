mod ids;
mod question;

pub use ids::{NameError, QuizName};
pub use question::{FormatError, Question, QuestionDraft, QuestionError, parse_question_set};
