//! Interactive client: prompt commands in, room snapshots out.

use std::sync::Arc;

use pomosync_server::domain::RoomId;
use pomosync_shared::time::{Clock, SystemClock};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    agent::{SyncAgent, SyncStores},
    command::{Command, HELP, parse_command},
    formatter::SnapshotFormatter,
    ui::redisplay_prompt,
};

const PROMPT: &str = "pomo> ";

/// Client options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub url: String,
    pub client_id: String,
    pub room_id: Option<RoomId>,
    pub sync_enabled: bool,
}

/// Run the interactive client until `quit`, Ctrl+C or Ctrl+D
pub async fn run_client(options: ClientOptions) -> Result<(), Box<dyn std::error::Error>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let agent = SyncAgent::spawn(options.url.clone(), options.client_id.clone(), clock.clone());
    agent.set_room(options.room_id.clone());
    agent.set_enabled(options.sync_enabled);

    tracing::info!(
        "Client '{}' using {} (room: {}, sync: {})",
        options.client_id,
        options.url,
        options.room_id.as_ref().map_or("(none)", RoomId::as_str),
        if options.sync_enabled { "on" } else { "off" }
    );
    println!("\nType 'help' for commands. Press Ctrl+C to exit.\n");

    let printer = tokio::spawn(print_updates(agent.stores(), clock));

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    while let Some(line) = input_rx.recv().await {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                print!("{}", SnapshotFormatter::format_error(&e.to_string()));
                redisplay_prompt(PROMPT);
                continue;
            }
        };

        match command {
            Command::Action(action) => {
                if let Err(e) = agent.send_action(action) {
                    print!("{}", SnapshotFormatter::format_error(&e.to_string()));
                }
            }
            Command::Sync(enabled) => agent.set_enabled(enabled),
            Command::Room(room_id) => agent.set_room(room_id),
            Command::Status => {
                let target = agent.target();
                let stores = agent.stores();
                let last_error = stores.last_error.borrow().clone();
                print!(
                    "{}",
                    SnapshotFormatter::format_status(
                        target.enabled,
                        target.room_id.as_ref().map(RoomId::as_str),
                        *stores.connected.borrow(),
                        *stores.room_version.borrow(),
                        last_error.as_deref(),
                    )
                );
            }
            Command::Help => print!("\n{}", HELP),
            Command::Quit => break,
        }
        redisplay_prompt(PROMPT);
    }

    printer.abort();
    tracing::info!("Client session ended");
    Ok(())
}

/// Print every snapshot, error and connection change published by the agent.
async fn print_updates(mut stores: SyncStores, clock: Arc<dyn Clock>) {
    loop {
        tokio::select! {
            changed = stores.room_state.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = stores.room_state.borrow_and_update().clone();
                if let Some(state) = state {
                    print!(
                        "{}",
                        SnapshotFormatter::format_state(
                            &state,
                            *stores.room_version.borrow(),
                            clock.now_millis(),
                            *stores.server_offset_ms.borrow(),
                        )
                    );
                }
            }
            changed = stores.last_error.changed() => {
                if changed.is_err() {
                    break;
                }
                let error = stores.last_error.borrow_and_update().clone();
                if let Some(error) = error {
                    print!("{}", SnapshotFormatter::format_error(&error));
                }
            }
            changed = stores.connected.changed() => {
                if changed.is_err() {
                    break;
                }
                let connected = *stores.connected.borrow_and_update();
                println!("\n{}", if connected { "connected" } else { "disconnected" });
            }
        }
        redisplay_prompt(PROMPT);
    }
}
