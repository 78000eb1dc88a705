use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Required-field violations for a single question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question needs at least one option")]
    NoOptions,

    #[error("answer `{answer}` is not one of the options")]
    AnswerNotAnOption { answer: String },
}

/// Raised when imported question JSON does not have the authoring shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("JSON must be an array")]
    NotAnArray,

    #[error("invalid question format in record {index}: `{field}` must be {expected}")]
    InvalidRecord {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question.
///
/// Serialized in the authoring format: the prompt lives under `"question"`,
/// `"text"` is accepted on input. `answer` is expected to be one of
/// `options`; nothing downstream repairs a question where it is not, so such
/// a question can only ever be answered incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question", alias = "text")]
    text: String,
    options: Vec<String>,
    answer: String,
    explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    example: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options,
            answer: answer.into(),
            explanation: explanation.into(),
            example: None,
        }
    }

    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// Exact string comparison against the stored answer.
    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        option == self.answer
    }

    /// Checks the fields a store requires before persisting.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyText` or `QuestionError::NoOptions`.
    pub fn check_required(&self) -> Result<(), QuestionError> {
        if self.text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        Ok(())
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated input from the single-question editor form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
    pub example: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into a `Question`.
    ///
    /// Blank options are dropped, text and options are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, no option is left, or the
    /// answer is not one of the remaining options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let options: Vec<String> = self
            .options
            .iter()
            .map(|opt| opt.trim())
            .filter(|opt| !opt.is_empty())
            .map(str::to_owned)
            .collect();
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let answer = self.answer.trim();
        if !options.iter().any(|opt| opt == answer) {
            return Err(QuestionError::AnswerNotAnOption {
                answer: answer.to_owned(),
            });
        }

        let example = self
            .example
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty());

        Ok(Question {
            text: text.to_owned(),
            answer: answer.to_owned(),
            options,
            explanation: self.explanation.trim().to_owned(),
            example,
        })
    }
}

//
// ─── JSON IMPORT ───────────────────────────────────────────────────────────────
//

/// Parse and validate a question set in the authoring JSON format.
///
/// The input must be an array of objects, each with a string `question`
/// (or `text`), an array of string `options`, a string `answer` and a string
/// `explanation`. An optional string `example` is kept.
///
/// # Errors
///
/// Returns `FormatError` naming the first offending record and field.
pub fn parse_question_set(input: &str) -> Result<Vec<Question>, FormatError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| FormatError::InvalidJson(e.to_string()))?;

    let Value::Array(records) = value else {
        return Err(FormatError::NotAnArray);
    };

    records
        .iter()
        .enumerate()
        .map(|(index, record)| question_from_value(index, record))
        .collect()
}

fn question_from_value(index: usize, record: &Value) -> Result<Question, FormatError> {
    let Value::Object(map) = record else {
        return Err(FormatError::InvalidRecord {
            index,
            field: "record",
            expected: "an object",
        });
    };

    let text = map.get("question").or_else(|| map.get("text"));
    let text = string_field(index, "question", text)?;
    let options = options_field(index, map)?;
    let answer = string_field(index, "answer", map.get("answer"))?;
    let explanation = string_field(index, "explanation", map.get("explanation"))?;

    let example = match map.get("example") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(FormatError::InvalidRecord {
                index,
                field: "example",
                expected: "a string",
            });
        }
    };

    Ok(Question {
        text,
        options,
        answer,
        explanation,
        example,
    })
}

fn string_field(
    index: usize,
    field: &'static str,
    value: Option<&Value>,
) -> Result<String, FormatError> {
    value
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(FormatError::InvalidRecord {
            index,
            field,
            expected: "a string",
        })
}

fn options_field(index: usize, map: &Map<String, Value>) -> Result<Vec<String>, FormatError> {
    let err = FormatError::InvalidRecord {
        index,
        field: "options",
        expected: "an array of strings",
    };
    let Some(Value::Array(items)) = map.get("options") else {
        return Err(err);
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_owned).ok_or_else(|| err.clone()))
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
