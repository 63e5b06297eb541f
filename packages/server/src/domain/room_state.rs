//! Shared per-room document: dashboard preferences plus the pomodoro timer.
//!
//! Field names serialize in camelCase; this is both the wire format and the
//! `state_json` column format.

use serde::{Deserialize, Serialize};

/// Kind of pomodoro session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Work,
    Short,
    Long,
}

/// Timer mode. Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PomodoroMode {
    Idle,
    Running,
    Paused,
}

/// Session durations and long-break cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroConfig {
    pub work_sec: u32,
    pub short_sec: u32,
    pub long_sec: u32,
    /// A Work session is followed by a Long break every `long_break_every` completions.
    pub long_break_every: u32,
}

impl PomodoroConfig {
    /// Target duration of a session of the given type.
    pub fn seconds_for(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Work => self.work_sec,
            SessionType::Short => self.short_sec,
            SessionType::Long => self.long_sec,
        }
    }
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_sec: 25 * 60,
            short_sec: 5 * 60,
            long_sec: 15 * 60,
            long_break_every: 4,
        }
    }
}

/// Pomodoro timer state.
///
/// `started_at_ms` is set only while running or paused, `paused_at_ms` only
/// while paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroState {
    pub session_type: SessionType,
    pub mode: PomodoroMode,
    pub duration_sec: u32,

    pub started_at_ms: Option<i64>,
    pub paused_at_ms: Option<i64>,
    pub elapsed_before_pause_ms: i64,

    pub work_sessions_completed: u32,
    pub work_count: u32,
    pub short_count: u32,
    pub long_count: u32,

    pub config: PomodoroConfig,
}

impl PomodoroState {
    /// Stop the timer: idle, anchors and accumulator cleared.
    pub(crate) fn stop(&mut self) {
        self.mode = PomodoroMode::Idle;
        self.started_at_ms = None;
        self.paused_at_ms = None;
        self.elapsed_before_pause_ms = 0;
    }

    /// Recompute `duration_sec` from the config for the current session type.
    pub(crate) fn refresh_duration(&mut self) {
        self.duration_sec = self.config.seconds_for(self.session_type);
    }
}

impl Default for PomodoroState {
    fn default() -> Self {
        let config = PomodoroConfig::default();
        Self {
            session_type: SessionType::Work,
            mode: PomodoroMode::Idle,
            duration_sec: config.work_sec,
            started_at_ms: None,
            paused_at_ms: None,
            elapsed_before_pause_ms: 0,
            work_sessions_completed: 0,
            work_count: 0,
            short_count: 0,
            long_count: 0,
            config,
        }
    }
}

/// The whole shared room document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub show_pomodoro: bool,
    pub current_chart_idx: i64,
    pub timeframe_days: i64,
    pub pomodoro: PomodoroState,
}

impl Default for RoomState {
    fn default() -> Self {
        Self {
            show_pomodoro: false,
            current_chart_idx: 0,
            timeframe_days: 365,
            pomodoro: PomodoroState::default(),
        }
    }
}
