//! Room sync server library.
//!
//! Shares one pomodoro-timer / dashboard state per room between every
//! WebSocket client connected to that room. Rooms are persisted in SQLite.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
