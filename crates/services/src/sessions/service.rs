use chrono::{DateTime, Utc};
use std::fmt;

use exam_core::model::{ExamConfig, Question, QuestionState, SessionId};
use exam_core::timer::{CountdownTimer, TimerEvent};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── SUBMISSION PHASE ──────────────────────────────────────────────────────────
//

/// Submission lifecycle of a session.
///
/// `Submitting` and `Submitted` gate re-entrancy: once either is reached, a
/// second submission trigger is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Active,
    Submitting,
    Submitted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state store for one timed exam attempt.
///
/// Owns the per-question states, the current question pointer, the
/// countdown, and the submission phase. External callers mutate it only
/// through the operations below; none of them perform I/O.
pub struct ExamSession {
    session_id: SessionId,
    questions: Vec<Question>,
    states: Vec<QuestionState>,
    current: usize,
    time_limit_seconds: u32,
    timer: CountdownTimer,
    phase: SubmissionPhase,
    started_at: DateTime<Utc>,
}

impl ExamSession {
    /// Build a fresh session from the provider-supplied config.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the config has no questions, and
    /// `SessionError::MisalignedQuestion` if a question's declared index
    /// does not match its position in the set.
    pub fn new(config: &ExamConfig, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        Self::with_restored_states(config, None, started_at)
    }

    /// Build a session, applying previously persisted question states.
    ///
    /// `restored` comes from a snapshot looked up under this session's id,
    /// so identity already matched. A state vector of the wrong length is
    /// ignored and the session starts fresh. The countdown is always
    /// re-armed at the full limit; elapsed time is not reconstructed from
    /// storage.
    ///
    /// # Errors
    ///
    /// Same as [`ExamSession::new`].
    pub fn with_restored_states(
        config: &ExamConfig,
        restored: Option<Vec<QuestionState>>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if config.questions.is_empty() {
            return Err(SessionError::Empty);
        }
        for (position, question) in config.questions.iter().enumerate() {
            if question.index() != position {
                return Err(SessionError::MisalignedQuestion {
                    position,
                    found: question.index(),
                });
            }
        }

        let question_count = config.questions.len();
        let states = match restored {
            Some(states) if states.len() == question_count => states,
            _ => vec![QuestionState::new(); question_count],
        };
        let time_limit_seconds = config.time_limit_seconds();

        Ok(Self {
            session_id: config.session_id.clone(),
            questions: config.questions.clone(),
            states,
            current: 0,
            time_limit_seconds,
            timer: CountdownTimer::new(time_limit_seconds),
            phase: SubmissionPhase::Active,
            started_at,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_states(&self) -> &[QuestionState] {
        &self.states
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question the pointer rests on. Always valid: sessions are never
    /// empty and navigation clamps.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_seconds
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.timer.remaining_seconds()
    }

    /// Seconds spent so far, derived from the countdown.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.timer.elapsed_seconds()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == SubmissionPhase::Submitted
    }

    /// Aggregate counts for navigator-style UI.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::from_states(&self.states)
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index >= self.states.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: self.states.len(),
            });
        }
        Ok(())
    }

    fn check_active(&self) -> Result<(), SessionError> {
        if self.phase != SubmissionPhase::Active {
            return Err(SessionError::AlreadySubmitted);
        }
        Ok(())
    }

    /// Record an answer for a question.
    ///
    /// Promotes the question to `Attempted` unless it carries a review
    /// mark, which is kept.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a bad index, `AlreadySubmitted` once submission has
    /// begun.
    pub fn select_answer(
        &mut self,
        index: usize,
        option: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.check_active()?;
        self.check_index(index)?;
        self.states[index].record_answer(option);
        Ok(())
    }

    /// Flag a question for review. Idempotent.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a bad index, `AlreadySubmitted` once submission has
    /// begun.
    pub fn mark_for_review(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_active()?;
        self.check_index(index)?;
        self.states[index].mark_for_review();
        Ok(())
    }

    /// Flip a question's bookmark and return the new value, so the caller
    /// can surface a notification.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a bad index, `AlreadySubmitted` once submission has
    /// begun.
    pub fn toggle_bookmark(&mut self, index: usize) -> Result<bool, SessionError> {
        self.check_active()?;
        self.check_index(index)?;
        Ok(self.states[index].toggle_bookmark())
    }

    /// Jump the pointer to a question.
    ///
    /// # Errors
    ///
    /// `OutOfRange` outside the question range.
    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_index(index)?;
        self.current = index;
        Ok(())
    }

    /// Move to the next question, clamping at the last one.
    pub fn next(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Move to the previous question, clamping at the first one.
    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub(crate) fn tick_timer(&mut self) -> TimerEvent {
        self.timer.tick()
    }

    pub(crate) fn stop_timer(&mut self) {
        self.timer.stop();
    }

    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub(crate) fn set_phase(&mut self, phase: SubmissionPhase) {
        self.phase = phase;
    }
}

impl fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSession")
            .field("session_id", &self.session_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("remaining_seconds", &self.timer.remaining_seconds())
            .field("phase", &self.phase)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::QuestionStatus;
    use exam_core::time::fixed_now;

    fn build_config(question_count: usize) -> ExamConfig {
        let questions = (0..question_count)
            .map(|i| {
                Question::new(
                    i,
                    format!("Q{i}"),
                    vec!["A".to_owned(), "B".to_owned(), "C".to_owned()],
                    "A",
                )
                .unwrap()
            })
            .collect();
        ExamConfig {
            session_id: SessionId::new("quiz_test"),
            subject: "Biology".to_owned(),
            module: "Cells".to_owned(),
            exam_format: "MCQ".to_owned(),
            difficulty: "easy".to_owned(),
            time_limit_minutes: 10,
            questions,
        }
    }

    #[test]
    fn empty_config_is_rejected() {
        let err = ExamSession::new(&build_config(0), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn misaligned_question_is_rejected() {
        let mut config = build_config(2);
        config.questions[1] = Question::new(
            5,
            "Q5",
            vec!["A".to_owned(), "B".to_owned()],
            "A",
        )
        .unwrap();

        let err = ExamSession::new(&config, fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::MisalignedQuestion {
                position: 1,
                found: 5
            }
        ));
    }

    #[test]
    fn answering_sets_status_and_keeps_review_mark() {
        let mut session = ExamSession::new(&build_config(3), fixed_now()).unwrap();

        session.select_answer(0, "B").unwrap();
        assert_eq!(session.question_states()[0].status(), QuestionStatus::Attempted);

        session.mark_for_review(1).unwrap();
        session.select_answer(1, "A").unwrap();
        assert_eq!(
            session.question_states()[1].status(),
            QuestionStatus::MarkedForReview
        );
        assert_eq!(session.question_states()[1].selected_option(), Some("A"));
    }

    #[test]
    fn out_of_range_operations_fail() {
        let mut session = ExamSession::new(&build_config(2), fixed_now()).unwrap();

        assert!(matches!(
            session.select_answer(2, "A"),
            Err(SessionError::OutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            session.mark_for_review(9),
            Err(SessionError::OutOfRange { .. })
        ));
        assert!(matches!(
            session.go_to(2),
            Err(SessionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn navigation_clamps_at_boundaries() {
        let mut session = ExamSession::new(&build_config(3), fixed_now()).unwrap();

        session.previous();
        assert_eq!(session.current_index(), 0);

        session.next();
        session.next();
        session.next();
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.current_question().index(), 2);

        session.go_to(1).unwrap();
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn bookmark_toggle_reports_new_value() {
        let mut session = ExamSession::new(&build_config(2), fixed_now()).unwrap();
        assert!(session.toggle_bookmark(1).unwrap());
        assert!(!session.toggle_bookmark(1).unwrap());
    }

    #[test]
    fn restored_states_of_wrong_length_are_ignored() {
        let config = build_config(3);
        let restored = vec![QuestionState::new(); 2];
        let session =
            ExamSession::with_restored_states(&config, Some(restored), fixed_now()).unwrap();
        assert!(session.question_states().iter().all(|s| !s.has_answer()));
    }

    #[test]
    fn restored_session_rearms_full_timer() {
        let config = build_config(3);
        let mut restored = vec![QuestionState::new(); 3];
        restored[0].record_answer("A");

        let session =
            ExamSession::with_restored_states(&config, Some(restored), fixed_now()).unwrap();
        assert_eq!(session.remaining_seconds(), 600);
        assert!(session.question_states()[0].has_answer());
    }

    #[test]
    fn mutations_after_submission_begin_are_rejected() {
        let mut session = ExamSession::new(&build_config(2), fixed_now()).unwrap();
        session.set_phase(SubmissionPhase::Submitted);

        assert!(matches!(
            session.select_answer(0, "A"),
            Err(SessionError::AlreadySubmitted)
        ));
        assert!(matches!(
            session.toggle_bookmark(0),
            Err(SessionError::AlreadySubmitted)
        ));
    }

    #[test]
    fn progress_counts_match_navigator_semantics() {
        let mut session = ExamSession::new(&build_config(4), fixed_now()).unwrap();
        session.select_answer(0, "A").unwrap();
        session.mark_for_review(1).unwrap();
        session.toggle_bookmark(3).unwrap();

        let progress = session.progress();
        assert_eq!(progress.total, 4);
        assert_eq!(progress.attempted, 2);
        assert_eq!(progress.marked, 1);
        assert_eq!(progress.unattempted, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.bookmarked, 1);
    }
}
