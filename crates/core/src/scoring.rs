use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::{Question, QuestionState};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("question/state length mismatch: {questions} questions, {states} states")]
    StateCountMismatch { questions: usize, states: usize },

    #[error("too many questions to score: {len}")]
    TooManyQuestions { len: usize },
}

//
// ─── SCORE BREAKDOWN ───────────────────────────────────────────────────────────
//

/// Raw scoring output, before assembly into an `ExamResult`.
///
/// Map keys are 1-based question positions; `BTreeMap` keeps the output
/// deterministic for identical input.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub total_questions: u32,
    pub attempted_count: u32,
    pub correct_count: u32,
    pub score_percentage: f64,
    pub per_question_answers: BTreeMap<u32, String>,
    pub per_question_correct_answers: BTreeMap<u32, String>,
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Score a session's states against the answer key.
///
/// Pure and deterministic: no I/O, no hidden state, identical output for
/// identical input. Correctness is exact string equality against each
/// question's answer key entry. A question counts as attempted when an
/// answer was actually recorded, whether or not it also carries a review
/// mark.
///
/// The 0-based indices used inside the engine are converted to 1-based
/// positions here, and only here.
///
/// # Errors
///
/// Returns `ScoringError::StateCountMismatch` if the two slices are not
/// index-aligned.
///
/// # Examples
///
/// ```
/// # use exam_core::model::{Question, QuestionState};
/// # use exam_core::scoring;
/// let questions = vec![
///     Question::new(0, "2 + 2?", vec!["3".into(), "4".into()], "4")?,
///     Question::new(1, "3 + 3?", vec!["5".into(), "6".into()], "6")?,
/// ];
/// let mut states = vec![QuestionState::new(), QuestionState::new()];
/// states[0].record_answer("4");
///
/// let breakdown = scoring::score(&questions, &states)?;
/// assert_eq!(breakdown.attempted_count, 1);
/// assert_eq!(breakdown.score_percentage, 50.0);
/// # Ok::<(), exam_core::Error>(())
/// ```
pub fn score(
    questions: &[Question],
    states: &[QuestionState],
) -> Result<ScoreBreakdown, ScoringError> {
    if questions.len() != states.len() {
        return Err(ScoringError::StateCountMismatch {
            questions: questions.len(),
            states: states.len(),
        });
    }
    let total_questions =
        u32::try_from(questions.len()).map_err(|_| ScoringError::TooManyQuestions {
            len: questions.len(),
        })?;

    let mut attempted_count = 0_u32;
    let mut correct_count = 0_u32;
    let mut per_question_answers = BTreeMap::new();
    let mut per_question_correct_answers = BTreeMap::new();

    for (index, (question, state)) in questions.iter().zip(states).enumerate() {
        let position = position_from_index(index);
        per_question_correct_answers.insert(position, question.correct_option().to_owned());

        if let Some(selected) = state.selected_option() {
            attempted_count += 1;
            per_question_answers.insert(position, selected.to_owned());
            if question.is_correct(selected) {
                correct_count += 1;
            }
        }
    }

    Ok(ScoreBreakdown {
        total_questions,
        attempted_count,
        correct_count,
        score_percentage: percentage(correct_count, total_questions),
        per_question_answers,
        per_question_correct_answers,
    })
}

/// 1-based positions of bookmarked questions, ascending.
#[must_use]
pub fn bookmarked_positions(states: &[QuestionState]) -> Vec<u32> {
    states
        .iter()
        .enumerate()
        .filter(|(_, state)| state.bookmarked())
        .map(|(index, _)| position_from_index(index))
        .collect()
}

/// Percentage of correct answers, rounded to one decimal place.
///
/// Defined as `0.0` for an empty question set.
fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = 100.0 * f64::from(correct) / f64::from(total);
    (raw * 10.0).round() / 10.0
}

// total question counts are checked against u32 before any position is built
#[allow(clippy::cast_possible_truncation)]
fn position_from_index(index: usize) -> u32 {
    index as u32 + 1
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
