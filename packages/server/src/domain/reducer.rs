//! Room-state reducer.
//!
//! `reduce` is pure: the only time source is the `now_ms` argument, and the
//! result is a fresh value that never aliases the input state.

use serde::{Deserialize, Serialize};

use super::room_state::{PomodoroMode, PomodoroState, RoomState, SessionType};

/// Action sent by clients inside an `action` frame.
///
/// Unrecognized `type` tags decode to [`Action::Unknown`], which leaves the
/// state unchanged apart from the auto-finish pre-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetShowPomodoro {
        value: bool,
    },
    SetChartIdx {
        value: i64,
    },
    SetTimeframeDays {
        value: i64,
    },
    #[serde(rename_all = "camelCase")]
    PomoSetSession {
        session_type: SessionType,
    },
    PomoStart,
    PomoPause,
    PomoResume,
    PomoReset,
    PomoSkip,
    #[serde(other)]
    Unknown,
}

/// Elapsed time of the current session in milliseconds.
pub fn elapsed_ms(p: &PomodoroState, now_ms: i64) -> i64 {
    let Some(started_at) = p.started_at_ms else {
        return 0;
    };
    match p.mode {
        PomodoroMode::Idle => 0,
        PomodoroMode::Running => now_ms
            .saturating_sub(started_at)
            .saturating_add(p.elapsed_before_pause_ms),
        PomodoroMode::Paused => match p.paused_at_ms {
            Some(paused_at) => paused_at
                .saturating_sub(started_at)
                .saturating_add(p.elapsed_before_pause_ms),
            None => p.elapsed_before_pause_ms,
        },
    }
}

/// Remaining time of the current session in milliseconds. Negative once overdue.
pub fn remaining_ms(p: &PomodoroState, now_ms: i64) -> i64 {
    i64::from(p.duration_sec)
        .saturating_mul(1000)
        .saturating_sub(elapsed_ms(p, now_ms))
}

/// Session that follows `finished`.
///
/// `work_sessions_completed` is the count after the finished session was tallied.
/// A cadence of 0 never selects a long break.
pub fn next_session_after(
    finished: SessionType,
    work_sessions_completed: u32,
    long_break_every: u32,
) -> SessionType {
    match finished {
        SessionType::Work => {
            if work_sessions_completed.checked_rem(long_break_every) == Some(0) {
                SessionType::Long
            } else {
                SessionType::Short
            }
        }
        SessionType::Short | SessionType::Long => SessionType::Work,
    }
}

/// Complete the current session: stop, tally, advance.
fn finish_session(p: &mut PomodoroState) {
    let finished = p.session_type;
    p.stop();

    match finished {
        SessionType::Work => {
            p.work_count = p.work_count.saturating_add(1);
            p.work_sessions_completed = p.work_sessions_completed.saturating_add(1);
        }
        SessionType::Short => p.short_count = p.short_count.saturating_add(1),
        SessionType::Long => p.long_count = p.long_count.saturating_add(1),
    }

    p.session_type = next_session_after(
        finished,
        p.work_sessions_completed,
        p.config.long_break_every,
    );
    p.refresh_duration();
}

fn start_fresh(p: &mut PomodoroState, now_ms: i64) {
    p.mode = PomodoroMode::Running;
    p.started_at_ms = Some(now_ms);
    p.paused_at_ms = None;
    p.elapsed_before_pause_ms = 0;
}

/// Force-complete a running session whose elapsed time reached its duration.
pub fn maybe_auto_finish(state: &RoomState, now_ms: i64) -> RoomState {
    let mut next = state.clone();
    let p = &mut next.pomodoro;
    if p.mode == PomodoroMode::Running && remaining_ms(p, now_ms) <= 0 {
        finish_session(p);
    }
    next
}

/// Apply `action` at time `now_ms`.
pub fn reduce(state: &RoomState, action: &Action, now_ms: i64) -> RoomState {
    let mut next = maybe_auto_finish(state, now_ms);
    let p = &mut next.pomodoro;

    match action {
        Action::SetShowPomodoro { value } => next.show_pomodoro = *value,
        Action::SetChartIdx { value } => next.current_chart_idx = *value,
        Action::SetTimeframeDays { value } => next.timeframe_days = *value,
        Action::PomoSetSession { session_type } => {
            p.stop();
            p.session_type = *session_type;
            p.refresh_duration();
        }
        Action::PomoStart => {
            if p.mode != PomodoroMode::Running {
                start_fresh(p, now_ms);
                p.refresh_duration();
            }
        }
        Action::PomoPause => {
            if p.mode == PomodoroMode::Running {
                p.mode = PomodoroMode::Paused;
                p.paused_at_ms = Some(now_ms);
            }
        }
        Action::PomoResume => {
            if p.mode == PomodoroMode::Paused {
                match (p.started_at_ms, p.paused_at_ms) {
                    (Some(started_at), Some(paused_at)) => {
                        p.elapsed_before_pause_ms = p
                            .elapsed_before_pause_ms
                            .saturating_add(paused_at.saturating_sub(started_at));
                        p.started_at_ms = Some(now_ms);
                        p.paused_at_ms = None;
                        p.mode = PomodoroMode::Running;
                    }
                    // corrupt anchors: restart the session
                    _ => start_fresh(p, now_ms),
                }
            }
        }
        Action::PomoReset => {
            p.stop();
            p.session_type = SessionType::Work;
            p.work_sessions_completed = 0;
            p.work_count = 0;
            p.short_count = 0;
            p.long_count = 0;
            p.refresh_duration();
        }
        Action::PomoSkip => finish_session(p),
        Action::Unknown => {}
    }

    next
}
