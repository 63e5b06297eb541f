//! Terminal client and sync agent for pomosync rooms.
//!
//! [`agent::SyncAgent`] keeps one WebSocket connection to the selected room
//! while sync is enabled and republishes every received snapshot through
//! `tokio::sync::watch` stores.

pub mod agent;
pub mod command;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod runner;
mod ui;
