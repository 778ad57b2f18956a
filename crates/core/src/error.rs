// src/error.rs
//! Error types for engine operations.
//!
//! Structural problems abort the operation before anything is saved. An
//! incompletely answered page is not an error: page turns report it as
//! `PageTurn::Blocked` instead.

use quizflow_traits::DocumentError;
use thiserror::Error;

/// The main error enum for all operations within the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuizError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
    #[error("Document structure error: {0}")]
    Structure(String),
    #[error("Invalid {attribute}=\"{value}\" on <{element}>: expected an integer")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
    #[error("Randomization needs at least 2 non-zero page groups, found {found}")]
    InsufficientGroups { found: usize },
    #[error("Quiz validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
    #[error("Navigation index {index} is out of range for {len} entries")]
    NavigationOutOfRange { index: usize, len: usize },
    #[error("The quiz is open for review only")]
    ReadOnly,
}

impl QuizError {
    pub fn structure(message: impl Into<String>) -> Self {
        QuizError::Structure(message.into())
    }
}
