//! Prompt command parser.
//!
//! ```text
//! start | pause | resume | reset | skip
//! session work|short|long
//! show on|off
//! chart <index>
//! days <count>
//! sync on|off
//! room [<8-digit id>]
//! status | help | quit
//! ```

use pomosync_server::domain::{Action, RoomId, SessionType};
use thiserror::Error;

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send an action to the room
    Action(Action),
    /// Turn sync on or off
    Sync(bool),
    /// Select a room, or clear the selection
    Room(Option<RoomId>),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("'{command}' expects {expected}")]
    InvalidArgument {
        command: &'static str,
        expected: &'static str,
    },
}

/// Usage text printed by `help`.
pub const HELP: &str = "\
Commands:
  start | pause | resume | reset | skip   control the timer
  session work|short|long                 switch session type
  show on|off                             show or hide the pomodoro panel
  chart <index>                           select a chart
  days <count>                            set the timeframe in days
  sync on|off                             enable or disable sync
  room [<id>]                             select a room (no id clears it)
  status                                  show connection status
  quit                                    exit
";

/// Parse one non-empty prompt line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err(CommandError::Unknown(String::new()));
    };
    let argument = words.next();

    let command = match name.to_ascii_lowercase().as_str() {
        "start" => Command::Action(Action::PomoStart),
        "pause" => Command::Action(Action::PomoPause),
        "resume" => Command::Action(Action::PomoResume),
        "reset" => Command::Action(Action::PomoReset),
        "skip" => Command::Action(Action::PomoSkip),
        "session" => Command::Action(Action::PomoSetSession {
            session_type: parse_session_type(argument)?,
        }),
        "show" => Command::Action(Action::SetShowPomodoro {
            value: parse_switch("show", argument)?,
        }),
        "chart" => Command::Action(Action::SetChartIdx {
            value: parse_integer("chart", argument)?,
        }),
        "days" => Command::Action(Action::SetTimeframeDays {
            value: parse_integer("days", argument)?,
        }),
        "sync" => Command::Sync(parse_switch("sync", argument)?),
        "room" => match argument {
            None => Command::Room(None),
            Some(id) => Command::Room(Some(RoomId::new(id.to_string()).map_err(|_| {
                CommandError::InvalidArgument {
                    command: "room",
                    expected: "an 8-digit room id",
                }
            })?)),
        },
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn parse_session_type(argument: Option<&str>) -> Result<SessionType, CommandError> {
    match argument.map(str::to_ascii_lowercase).as_deref() {
        Some("work") => Ok(SessionType::Work),
        Some("short") => Ok(SessionType::Short),
        Some("long") => Ok(SessionType::Long),
        _ => Err(CommandError::InvalidArgument {
            command: "session",
            expected: "work, short or long",
        }),
    }
}

fn parse_switch(command: &'static str, argument: Option<&str>) -> Result<bool, CommandError> {
    match argument.map(str::to_ascii_lowercase).as_deref() {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err(CommandError::InvalidArgument {
            command,
            expected: "on or off",
        }),
    }
}

fn parse_integer(command: &'static str, argument: Option<&str>) -> Result<i64, CommandError> {
    argument
        .and_then(|value| value.parse().ok())
        .ok_or(CommandError::InvalidArgument {
            command,
            expected: "an integer",
        })
}
