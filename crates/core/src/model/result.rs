use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::SessionId;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ExamResultError {
    #[error("score percentage {0} outside 0.0..=100.0")]
    ScoreOutOfRange(f64),

    #[error("attempted count ({attempted}) exceeds total questions ({total})")]
    AttemptedExceedsTotal { attempted: u32, total: u32 },
}

/// Scored outcome of a submitted exam session.
///
/// Immutable once produced. Question positions are 1-based here; the
/// 0-based indices used inside the engine never leak into this record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamResult {
    session_id: SessionId,
    total_questions: u32,
    attempted_count: u32,
    time_taken_seconds: u32,
    score_percentage: f64,
    per_question_answers: BTreeMap<u32, String>,
    per_question_correct_answers: BTreeMap<u32, String>,
    bookmarked_positions: Vec<u32>,
}

impl ExamResult {
    /// Assemble a result record, validating the aggregate fields.
    ///
    /// # Errors
    ///
    /// Returns `ExamResultError::ScoreOutOfRange` if the percentage falls
    /// outside `0.0..=100.0`, and `ExamResultError::AttemptedExceedsTotal`
    /// if the counts do not align.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        session_id: SessionId,
        total_questions: u32,
        attempted_count: u32,
        time_taken_seconds: u32,
        score_percentage: f64,
        per_question_answers: BTreeMap<u32, String>,
        per_question_correct_answers: BTreeMap<u32, String>,
        bookmarked_positions: Vec<u32>,
    ) -> Result<Self, ExamResultError> {
        if !(0.0..=100.0).contains(&score_percentage) {
            return Err(ExamResultError::ScoreOutOfRange(score_percentage));
        }
        if attempted_count > total_questions {
            return Err(ExamResultError::AttemptedExceedsTotal {
                attempted: attempted_count,
                total: total_questions,
            });
        }

        Ok(Self {
            session_id,
            total_questions,
            attempted_count,
            time_taken_seconds,
            score_percentage,
            per_question_answers,
            per_question_correct_answers,
            bookmarked_positions,
        })
    }

    /// Best-effort fallback for the forced-submission path.
    ///
    /// Carries honest attempted/time figures but no score detail, so an
    /// expired session still hands something to the result consumer when
    /// scoring fails.
    #[must_use]
    pub fn degraded(
        session_id: SessionId,
        total_questions: u32,
        attempted_count: u32,
        time_taken_seconds: u32,
    ) -> Self {
        Self {
            session_id,
            total_questions,
            attempted_count: attempted_count.min(total_questions),
            time_taken_seconds,
            score_percentage: 0.0,
            per_question_answers: BTreeMap::new(),
            per_question_correct_answers: BTreeMap::new(),
            bookmarked_positions: Vec::new(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn attempted_count(&self) -> u32 {
        self.attempted_count
    }

    #[must_use]
    pub fn time_taken_seconds(&self) -> u32 {
        self.time_taken_seconds
    }

    #[must_use]
    pub fn score_percentage(&self) -> f64 {
        self.score_percentage
    }

    /// Submitted answers keyed by 1-based question position. Unanswered
    /// questions have no entry.
    #[must_use]
    pub fn per_question_answers(&self) -> &BTreeMap<u32, String> {
        &self.per_question_answers
    }

    /// Answer key, keyed by 1-based question position.
    #[must_use]
    pub fn per_question_correct_answers(&self) -> &BTreeMap<u32, String> {
        &self.per_question_correct_answers
    }

    /// Bookmarked question positions, 1-based, ascending.
    #[must_use]
    pub fn bookmarked_positions(&self) -> &[u32] {
        &self.bookmarked_positions
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(entries: &[(u32, &str)]) -> BTreeMap<u32, String> {
        entries
            .iter()
            .map(|(pos, opt)| (*pos, (*opt).to_owned()))
            .collect()
    }

    #[test]
    fn builds_valid_result() {
        let result = ExamResult::from_parts(
            SessionId::new("s1"),
            5,
            3,
            120,
            60.0,
            answers(&[(1, "A"), (2, "B"), (3, "C")]),
            answers(&[(1, "A"), (2, "C"), (3, "C"), (4, "D"), (5, "A")]),
            vec![2, 4],
        )
        .unwrap();

        assert_eq!(result.total_questions(), 5);
        assert_eq!(result.attempted_count(), 3);
        assert_eq!(result.score_percentage(), 60.0);
        assert_eq!(result.bookmarked_positions(), &[2, 4]);
    }

    #[test]
    fn rejects_score_out_of_range() {
        let err = ExamResult::from_parts(
            SessionId::new("s1"),
            5,
            3,
            120,
            100.1,
            BTreeMap::new(),
            BTreeMap::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ExamResultError::ScoreOutOfRange(_)));
    }

    #[test]
    fn rejects_attempted_beyond_total() {
        let err = ExamResult::from_parts(
            SessionId::new("s1"),
            2,
            3,
            120,
            50.0,
            BTreeMap::new(),
            BTreeMap::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExamResultError::AttemptedExceedsTotal {
                attempted: 3,
                total: 2
            }
        ));
    }

    #[test]
    fn degraded_result_is_always_well_formed() {
        let result = ExamResult::degraded(SessionId::new("s1"), 2, 9, 60);
        assert_eq!(result.attempted_count(), 2);
        assert_eq!(result.score_percentage(), 0.0);
        assert!(result.per_question_answers().is_empty());
    }
}
