/// Attempt status of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionStatus {
    #[default]
    Unattempted,
    Attempted,
    MarkedForReview,
}

/// Mutable per-question state tracked over a session's lifetime.
///
/// The status, selected answer, and bookmark flag move independently,
/// with two rules: recording an answer promotes `Unattempted` to
/// `Attempted`, and a question marked for review keeps its mark across
/// later answer changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionState {
    status: QuestionStatus,
    selected_option: Option<String>,
    bookmarked: bool,
}

impl QuestionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> QuestionStatus {
        self.status
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    #[must_use]
    pub fn has_answer(&self) -> bool {
        self.selected_option.is_some()
    }

    #[must_use]
    pub fn bookmarked(&self) -> bool {
        self.bookmarked
    }

    /// Record (or replace) the selected answer.
    ///
    /// Promotes `Unattempted` to `Attempted`; a review mark is kept.
    pub fn record_answer(&mut self, option: impl Into<String>) {
        self.selected_option = Some(option.into());
        if self.status != QuestionStatus::MarkedForReview {
            self.status = QuestionStatus::Attempted;
        }
    }

    /// Flag the question for review. Idempotent; an answer is not required.
    pub fn mark_for_review(&mut self) {
        self.status = QuestionStatus::MarkedForReview;
    }

    /// Flip the bookmark flag and return the new value.
    pub fn toggle_bookmark(&mut self) -> bool {
        self.bookmarked = !self.bookmarked;
        self.bookmarked
    }

    /// Set the bookmark flag directly. Used when rehydrating persisted state.
    pub fn set_bookmarked(&mut self, bookmarked: bool) {
        self.bookmarked = bookmarked;
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answering_promotes_unattempted() {
        let mut state = QuestionState::new();
        assert_eq!(state.status(), QuestionStatus::Unattempted);

        state.record_answer("B");
        assert_eq!(state.status(), QuestionStatus::Attempted);
        assert_eq!(state.selected_option(), Some("B"));
    }

    #[test]
    fn answer_change_keeps_review_mark() {
        let mut state = QuestionState::new();
        state.mark_for_review();
        state.record_answer("A");

        assert_eq!(state.status(), QuestionStatus::MarkedForReview);
        assert_eq!(state.selected_option(), Some("A"));
    }

    #[test]
    fn marking_after_answer_overrides_attempted() {
        let mut state = QuestionState::new();
        state.record_answer("A");
        state.mark_for_review();

        assert_eq!(state.status(), QuestionStatus::MarkedForReview);
        // the recorded answer survives the mark
        assert!(state.has_answer());
    }

    #[test]
    fn mark_for_review_is_idempotent() {
        let mut state = QuestionState::new();
        state.mark_for_review();
        state.mark_for_review();
        assert_eq!(state.status(), QuestionStatus::MarkedForReview);
    }

    #[test]
    fn bookmark_toggles_independently_of_status() {
        let mut state = QuestionState::new();
        assert!(state.toggle_bookmark());
        assert!(!state.toggle_bookmark());
        assert_eq!(state.status(), QuestionStatus::Unattempted);
    }
}
