//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::ExamResultError;
use exam_core::scoring::ScoringError;

/// Errors emitted by exam session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("question at position {position} carries index {found}")]
    MisalignedQuestion { position: usize, found: usize },

    #[error("question index {index} out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },

    #[error("session already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Result(#[from] ExamResultError),
}
