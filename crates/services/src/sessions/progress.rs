use exam_core::model::{QuestionState, QuestionStatus};

/// Aggregated attempt counts for a session, useful for navigator UI.
///
/// `attempted` counts answered and review-marked questions alike, the way
/// an exam navigator displays them; `answered` counts only questions with
/// a recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub attempted: usize,
    pub marked: usize,
    pub unattempted: usize,
    pub answered: usize,
    pub bookmarked: usize,
}

impl SessionProgress {
    #[must_use]
    pub fn from_states(states: &[QuestionState]) -> Self {
        let mut attempted = 0;
        let mut marked = 0;
        let mut answered = 0;
        let mut bookmarked = 0;

        for state in states {
            match state.status() {
                QuestionStatus::Attempted => attempted += 1,
                QuestionStatus::MarkedForReview => {
                    attempted += 1;
                    marked += 1;
                }
                QuestionStatus::Unattempted => {}
            }
            if state.has_answer() {
                answered += 1;
            }
            if state.bookmarked() {
                bookmarked += 1;
            }
        }

        Self {
            total: states.len(),
            attempted,
            marked,
            unattempted: states.len() - attempted,
            answered,
            bookmarked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_marked_without_answer_as_attempted() {
        let mut states = vec![QuestionState::new(); 3];
        states[0].mark_for_review();
        states[1].record_answer("A");

        let progress = SessionProgress::from_states(&states);
        assert_eq!(progress.attempted, 2);
        assert_eq!(progress.marked, 1);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.unattempted, 1);
    }

    #[test]
    fn empty_states_produce_zeroes() {
        let progress = SessionProgress::from_states(&[]);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.attempted, 0);
    }
}
