//! Countdown for a timed exam session.
//!
//! An explicit state machine with a single `tick()` entry point. The host
//! environment owns the scheduling primitive and calls `tick()` once per
//! elapsed second; nothing here reads the wall clock.

/// Seconds remaining at which the one-shot warning fires.
pub const WARNING_THRESHOLD_SECONDS: u32 = 300;

/// Lifecycle phase of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// Counting down; ticks are honored.
    Running,
    /// Reached zero. Terminal.
    Expired,
    /// Cancelled by a completed submission. Terminal.
    Stopped,
}

/// Event produced by a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Nothing notable, including ticks delivered after the countdown ended.
    None,
    /// The countdown crossed the warning threshold. Fired at most once.
    Warning { remaining_seconds: u32 },
    /// The countdown reached zero. Fired exactly once.
    Expired,
}

/// One-second countdown with a single warning and a terminal expiry.
///
/// # Examples
///
/// ```
/// # use exam_core::timer::{CountdownTimer, TimerEvent};
/// let mut timer = CountdownTimer::new(2);
/// assert_eq!(timer.tick(), TimerEvent::None);
/// assert_eq!(timer.tick(), TimerEvent::Expired);
/// // late ticks are ignored
/// assert_eq!(timer.tick(), TimerEvent::None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTimer {
    time_limit_seconds: u32,
    remaining_seconds: u32,
    warning_fired: bool,
    phase: TimerPhase,
}

impl CountdownTimer {
    /// Arm a timer at the full limit.
    ///
    /// A limit at or below the warning threshold never crosses it, so the
    /// warning is pre-armed off for short exams.
    #[must_use]
    pub fn new(time_limit_seconds: u32) -> Self {
        Self {
            time_limit_seconds,
            remaining_seconds: time_limit_seconds,
            warning_fired: time_limit_seconds <= WARNING_THRESHOLD_SECONDS,
            phase: TimerPhase::Running,
        }
    }

    #[must_use]
    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_seconds
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn warning_fired(&self) -> bool {
        self.warning_fired
    }

    #[must_use]
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Seconds consumed so far.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u32 {
        self.time_limit_seconds - self.remaining_seconds
    }

    /// Advance the countdown by one second.
    ///
    /// The phase check lives inside the handler, not in the scheduler: a
    /// tick already queued when `stop` was called must land as a no-op.
    pub fn tick(&mut self) -> TimerEvent {
        if self.phase != TimerPhase::Running {
            return TimerEvent::None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);

        if self.remaining_seconds == 0 {
            self.phase = TimerPhase::Expired;
            return TimerEvent::Expired;
        }

        if !self.warning_fired && self.remaining_seconds <= WARNING_THRESHOLD_SECONDS {
            self.warning_fired = true;
            return TimerEvent::Warning {
                remaining_seconds: self.remaining_seconds,
            };
        }

        TimerEvent::None
    }

    /// Stop the countdown. Idempotent, and safe from any phase.
    pub fn stop(&mut self) {
        self.phase = TimerPhase::Stopped;
    }
}

/// Render a second count as a zero-padded `MM:SS` clock.
///
/// Minutes are not wrapped at the hour: 3600 seconds renders as `60:00`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{mins:02}:{secs:02}")
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_one_second_per_tick() {
        let mut timer = CountdownTimer::new(600);
        assert_eq!(timer.remaining_seconds(), 600);
        assert_eq!(timer.tick(), TimerEvent::None);
        assert_eq!(timer.remaining_seconds(), 599);
        assert_eq!(timer.elapsed_seconds(), 1);
    }

    #[test]
    fn warning_fires_exactly_once_when_crossing_threshold() {
        let mut timer = CountdownTimer::new(WARNING_THRESHOLD_SECONDS + 3);

        let mut warnings = 0;
        while timer.is_running() {
            if let TimerEvent::Warning { remaining_seconds } = timer.tick() {
                warnings += 1;
                assert_eq!(remaining_seconds, WARNING_THRESHOLD_SECONDS);
            }
        }
        assert_eq!(warnings, 1);
        assert!(timer.warning_fired());
    }

    #[test]
    fn short_limit_never_warns() {
        let mut timer = CountdownTimer::new(60);
        while timer.is_running() {
            assert!(!matches!(timer.tick(), TimerEvent::Warning { .. }));
        }
        assert_eq!(timer.phase(), TimerPhase::Expired);
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut timer = CountdownTimer::new(2);
        assert_eq!(timer.tick(), TimerEvent::None);
        assert_eq!(timer.tick(), TimerEvent::Expired);
        assert_eq!(timer.tick(), TimerEvent::None);
        assert_eq!(timer.remaining_seconds(), 0);
        assert_eq!(timer.elapsed_seconds(), 2);
    }

    #[test]
    fn tick_after_stop_is_a_no_op() {
        let mut timer = CountdownTimer::new(10);
        timer.stop();
        assert_eq!(timer.tick(), TimerEvent::None);
        assert_eq!(timer.remaining_seconds(), 10);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut timer = CountdownTimer::new(10);
        timer.stop();
        timer.stop();
        assert_eq!(timer.phase(), TimerPhase::Stopped);
    }

    #[test]
    fn zero_limit_expires_on_first_tick() {
        let mut timer = CountdownTimer::new(0);
        assert_eq!(timer.tick(), TimerEvent::Expired);
    }

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(3600), "60:00");
    }
}
