//! Snapshot formatting utilities for client display.

use pomosync_server::domain::{PomodoroMode, RoomState, SessionType, remaining_ms};

use crate::domain::server_now_ms;

/// Formatter for client display
pub struct SnapshotFormatter;

impl SnapshotFormatter {
    /// Format a received snapshot
    ///
    /// # Arguments
    ///
    /// * `state` - The room state
    /// * `version` - The room version
    /// * `local_now_ms` - Local clock reading
    /// * `server_offset_ms` - Last known `serverNowMs - localNowMs`
    pub fn format_state(
        state: &RoomState,
        version: u64,
        local_now_ms: i64,
        server_offset_ms: i64,
    ) -> String {
        let p = &state.pomodoro;
        let remaining = remaining_ms(p, server_now_ms(local_now_ms, server_offset_ms));
        format!(
            "\n[v{}] {} {} {} remaining\n\
             completed: {} work, {} short, {} long ({} work sessions)\n\
             pomodoro panel: {}, chart #{}, {} days\n",
            version,
            Self::session_label(p.session_type),
            Self::mode_label(p.mode),
            Self::format_remaining(remaining),
            p.work_count,
            p.short_count,
            p.long_count,
            p.work_sessions_completed,
            if state.show_pomodoro { "shown" } else { "hidden" },
            state.current_chart_idx,
            state.timeframe_days,
        )
    }

    /// Format remaining milliseconds as `mm:ss`, rounding up and clamping at zero
    pub fn format_remaining(remaining_ms: i64) -> String {
        let seconds = remaining_ms.max(0).saturating_add(999) / 1000;
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }

    /// Format the connection status
    pub fn format_status(
        enabled: bool,
        room_id: Option<&str>,
        connected: bool,
        version: u64,
        last_error: Option<&str>,
    ) -> String {
        let mut output = format!(
            "\nsync: {}, room: {}, {}, version {}\n",
            if enabled { "on" } else { "off" },
            room_id.unwrap_or("(none)"),
            if connected { "connected" } else { "disconnected" },
            version
        );
        if let Some(error) = last_error {
            output.push_str(&format!("last error: {}\n", error));
        }
        output
    }

    /// Format an error reported by the agent or the server
    pub fn format_error(error: &str) -> String {
        format!("\n! {}\n", error)
    }

    fn session_label(session_type: SessionType) -> &'static str {
        match session_type {
            SessionType::Work => "Work",
            SessionType::Short => "Short break",
            SessionType::Long => "Long break",
        }
    }

    fn mode_label(mode: PomodoroMode) -> &'static str {
        match mode {
            PomodoroMode::Idle => "idle",
            PomodoroMode::Running => "running",
            PomodoroMode::Paused => "paused",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomosync_server::domain::{Action, reduce};

    #[test]
    fn test_format_remaining_rounds_up() {
        // テスト項目: 残り時間は秒単位で切り上げ、負の値は 00:00 になる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(SnapshotFormatter::format_remaining(1_500_000), "25:00");
        assert_eq!(SnapshotFormatter::format_remaining(61_001), "01:02");
        assert_eq!(SnapshotFormatter::format_remaining(1), "00:01");
        assert_eq!(SnapshotFormatter::format_remaining(0), "00:00");
        assert_eq!(SnapshotFormatter::format_remaining(-5_000), "00:00");
    }

    #[test]
    fn test_format_state_uses_server_offset() {
        // テスト項目: 残り時間はサーバー時刻のオフセットを考慮して計算される
        // given (前提条件):
        let state = reduce(&RoomState::default(), &Action::PomoStart, 100_000);

        // when (操作):
        // ローカル時刻 40_000 + オフセット 120_000 = サーバー時刻 160_000 (60 秒経過)
        let result = SnapshotFormatter::format_state(&state, 4, 40_000, 120_000);

        // then (期待する結果):
        assert!(result.contains("[v4] Work running 24:00 remaining"));
        assert!(result.contains("completed: 0 work, 0 short, 0 long"));
        assert!(result.contains("pomodoro panel: hidden, chart #0, 365 days"));
    }

    #[test]
    fn test_format_status_with_error() {
        // テスト項目: 接続状態と直近のエラーが表示される
        // given (前提条件) / when (操作):
        let result =
            SnapshotFormatter::format_status(true, Some("12345678"), false, 3, Some("room not found"));

        // then (期待する結果):
        assert!(result.contains("sync: on, room: 12345678, disconnected, version 3"));
        assert!(result.contains("last error: room not found"));
    }
}
