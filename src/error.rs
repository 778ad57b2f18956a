// src/error.rs
use quizflow_core::QuizError;
use quizflow_traits::DocumentError;
use thiserror::Error;

/// Top-level error for opening and driving a quiz from the command line.
#[derive(Error, Debug)]
pub enum QuizflowError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Quiz(#[from] QuizError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
