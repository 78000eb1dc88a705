use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for building a `QuizName` from user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("quiz name cannot be empty")]
    Empty,
}

/// Name under which a question set is stored.
///
/// Always trimmed and non-empty.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuizName(String);

impl QuizName {
    /// Creates a new `QuizName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `NameError::Empty` if nothing is left after trimming.
    pub fn new(name: impl AsRef<str>) -> Result<Self, NameError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for QuizName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuizName> for String {
    fn from(value: QuizName) -> Self {
        value.0
    }
}

impl AsRef<str> for QuizName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for QuizName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizName({:?})", self.0)
    }
}

impl fmt::Display for QuizName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QuizName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
