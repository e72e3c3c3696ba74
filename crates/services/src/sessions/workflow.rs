use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{ExamConfig, ExamResult};
use exam_core::scoring::{self, ScoreBreakdown};
use exam_core::timer::TimerEvent;
use storage::repository::{SessionSnapshot, SnapshotRepository};

use super::service::{ExamSession, SubmissionPhase};
use crate::error::SessionError;

//
// ─── TICK OUTCOME ──────────────────────────────────────────────────────────────
//

/// What a driven tick produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The countdown moved on; nothing to surface.
    Running { remaining_seconds: u32 },
    /// The mid-exam warning. At most once per session.
    Warning { remaining_seconds: u32 },
    /// Time ran out and the session was auto-submitted.
    AutoSubmitted(ExamResult),
    /// The countdown already ended; the tick was ignored.
    Idle,
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Orchestrates session start/resume, autosave, tick driving, and
/// at-most-once submission.
///
/// Persistence is best-effort throughout: storage failures are logged and
/// swallowed so the exam never blocks on the autosave path.
#[derive(Clone)]
pub struct ExamRunner {
    clock: Clock,
    snapshots: Arc<dyn SnapshotRepository>,
}

impl ExamRunner {
    #[must_use]
    pub fn new(clock: Clock, snapshots: Arc<dyn SnapshotRepository>) -> Self {
        Self { clock, snapshots }
    }

    /// Start a session, resuming persisted answers and bookmarks when a
    /// snapshot exists under this session id.
    ///
    /// Storage trouble while loading degrades to a fresh session. The
    /// countdown is always re-armed at the full limit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` or `SessionError::MisalignedQuestion`
    /// for unusable question sets.
    pub async fn start_session(&self, config: &ExamConfig) -> Result<ExamSession, SessionError> {
        let restored = match self.snapshots.load(&config.session_id).await {
            Ok(Some(snapshot)) => Some(snapshot.restore_states(config.questions.len())),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(
                    session_id = %config.session_id,
                    error = %err,
                    "failed to load session snapshot, starting fresh"
                );
                None
            }
        };
        ExamSession::with_restored_states(config, restored, self.clock.now())
    }

    /// Record an answer, then autosave.
    ///
    /// # Errors
    ///
    /// Propagates the session's `OutOfRange`/`AlreadySubmitted` errors.
    pub async fn select_answer(
        &self,
        session: &mut ExamSession,
        index: usize,
        option: impl Into<String>,
    ) -> Result<(), SessionError> {
        session.select_answer(index, option)?;
        self.autosave(session).await;
        Ok(())
    }

    /// Mark a question for review, then autosave.
    ///
    /// # Errors
    ///
    /// Propagates the session's `OutOfRange`/`AlreadySubmitted` errors.
    pub async fn mark_for_review(
        &self,
        session: &mut ExamSession,
        index: usize,
    ) -> Result<(), SessionError> {
        session.mark_for_review(index)?;
        self.autosave(session).await;
        Ok(())
    }

    /// Toggle a bookmark, autosave, and return the new value.
    ///
    /// # Errors
    ///
    /// Propagates the session's `OutOfRange`/`AlreadySubmitted` errors.
    pub async fn toggle_bookmark(
        &self,
        session: &mut ExamSession,
        index: usize,
    ) -> Result<bool, SessionError> {
        let bookmarked = session.toggle_bookmark(index)?;
        self.autosave(session).await;
        Ok(bookmarked)
    }

    /// Jump to a question. The save keeps the stored entry fresh even
    /// though the persisted shape ignores the pointer.
    ///
    /// # Errors
    ///
    /// Propagates the session's `OutOfRange` error.
    pub async fn go_to(&self, session: &mut ExamSession, index: usize) -> Result<(), SessionError> {
        session.go_to(index)?;
        self.autosave(session).await;
        Ok(())
    }

    /// Move to the next question, clamping at the last one.
    pub async fn next(&self, session: &mut ExamSession) {
        session.next();
        self.autosave(session).await;
    }

    /// Move to the previous question, clamping at the first one.
    pub async fn previous(&self, session: &mut ExamSession) {
        session.previous();
        self.autosave(session).await;
    }

    /// Drive the countdown by one second.
    ///
    /// Expiry triggers automatic submission with no confirmation step; on
    /// that path any scoring trouble still produces a degraded result
    /// rather than a frozen session.
    pub async fn tick(&self, session: &mut ExamSession) -> TickOutcome {
        match session.tick_timer() {
            TimerEvent::Expired => {
                let result = self.submit_on_expiry(session).await;
                TickOutcome::AutoSubmitted(result)
            }
            TimerEvent::Warning { remaining_seconds } => {
                TickOutcome::Warning { remaining_seconds }
            }
            TimerEvent::None => {
                if session.is_timer_running() {
                    TickOutcome::Running {
                        remaining_seconds: session.remaining_seconds(),
                    }
                } else {
                    TickOutcome::Idle
                }
            }
        }
    }

    /// User-confirmed submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` if a submission already
    /// happened (for instance expiry racing the confirm click). A scoring
    /// failure leaves the session active so the caller may retry; the
    /// timer stays stopped either way.
    pub async fn submit(&self, session: &mut ExamSession) -> Result<ExamResult, SessionError> {
        if session.phase() != SubmissionPhase::Active {
            return Err(SessionError::AlreadySubmitted);
        }
        session.set_phase(SubmissionPhase::Submitting);
        session.stop_timer();
        let time_taken_seconds = session.elapsed_seconds();

        let breakdown = match scoring::score(session.questions(), session.question_states()) {
            Ok(breakdown) => breakdown,
            Err(err) => {
                session.set_phase(SubmissionPhase::Active);
                return Err(err.into());
            }
        };
        let result = match Self::assemble(session, time_taken_seconds, breakdown) {
            Ok(result) => result,
            Err(err) => {
                session.set_phase(SubmissionPhase::Active);
                return Err(err);
            }
        };

        self.finish(session).await;
        Ok(result)
    }

    /// Forced submission on timer expiry. Infallible: whatever goes wrong,
    /// the caller gets a result record.
    async fn submit_on_expiry(&self, session: &mut ExamSession) -> ExamResult {
        session.set_phase(SubmissionPhase::Submitting);
        session.stop_timer();
        let time_taken_seconds = session.elapsed_seconds();

        let result = scoring::score(session.questions(), session.question_states())
            .map_err(SessionError::from)
            .and_then(|breakdown| Self::assemble(session, time_taken_seconds, breakdown))
            .unwrap_or_else(|err| {
                tracing::warn!(
                    session_id = %session.session_id(),
                    error = %err,
                    "scoring failed on expiry, handing off degraded result"
                );
                Self::degraded(session, time_taken_seconds)
            });

        self.finish(session).await;
        result
    }

    fn assemble(
        session: &ExamSession,
        time_taken_seconds: u32,
        breakdown: ScoreBreakdown,
    ) -> Result<ExamResult, SessionError> {
        let bookmarked_positions = scoring::bookmarked_positions(session.question_states());
        ExamResult::from_parts(
            session.session_id().clone(),
            breakdown.total_questions,
            breakdown.attempted_count,
            time_taken_seconds,
            breakdown.score_percentage,
            breakdown.per_question_answers,
            breakdown.per_question_correct_answers,
            bookmarked_positions,
        )
        .map_err(Into::into)
    }

    fn degraded(session: &ExamSession, time_taken_seconds: u32) -> ExamResult {
        let attempted = session
            .question_states()
            .iter()
            .filter(|state| state.has_answer())
            .count();
        ExamResult::degraded(
            session.session_id().clone(),
            u32::try_from(session.question_count()).unwrap_or(u32::MAX),
            u32::try_from(attempted).unwrap_or(u32::MAX),
            time_taken_seconds,
        )
    }

    /// Clear the persisted snapshot and seal the session. The clear is
    /// best-effort; a failure leaves a stale entry behind but never blocks
    /// the result hand-off.
    async fn finish(&self, session: &mut ExamSession) {
        if let Err(err) = self.snapshots.clear(session.session_id()).await {
            tracing::warn!(
                session_id = %session.session_id(),
                error = %err,
                "failed to clear session snapshot after submission"
            );
        }
        session.set_phase(SubmissionPhase::Submitted);
    }

    async fn autosave(&self, session: &ExamSession) {
        // never resurrect a snapshot the submission path already cleared
        if session.phase() != SubmissionPhase::Active {
            return;
        }
        let snapshot = SessionSnapshot::from_states(session.question_states());
        if let Err(err) = self.snapshots.save(session.session_id(), &snapshot).await {
            tracing::warn!(
                session_id = %session.session_id(),
                error = %err,
                "failed to autosave session snapshot"
            );
        }
    }
}
