use thiserror::Error;

use crate::model::{ExamResultError, QuestionError};
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Result(#[from] ExamResultError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}
