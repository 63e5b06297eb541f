//! Terminal client for pomosync rooms.
//!
//! Connects to a room on the sync server, prints every snapshot and sends
//! timer actions typed at the prompt. Reconnects with exponential backoff.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin pomosync-client -- --room-id 12345678
//! cargo run --bin pomosync-client -- --url ws://127.0.0.1:8787/ws --room-id 12345678 --client-id alice
//! ```

use clap::Parser;
use pomosync_client::runner::{ClientOptions, run_client};
use pomosync_server::domain::RoomId;
use pomosync_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "pomosync-client")]
#[command(about = "Terminal client for shared pomodoro rooms", long_about = None)]
struct Args {
    /// WebSocket endpoint of the sync server
    #[arg(short = 'u', long, env = "SYNC_WS_URL", default_value = "ws://127.0.0.1:8787/ws")]
    url: String,

    /// Room to join (8 digits)
    #[arg(short = 'r', long, value_parser = parse_room_id)]
    room_id: Option<RoomId>,

    /// Identifier announced to the server (random when omitted)
    #[arg(short = 'c', long)]
    client_id: Option<String>,

    /// Start with sync disabled
    #[arg(long)]
    no_sync: bool,
}

fn parse_room_id(value: &str) -> Result<RoomId, String> {
    RoomId::new(value.to_string()).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let options = ClientOptions {
        url: args.url,
        client_id: args
            .client_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        room_id: args.room_id,
        sync_enabled: !args.no_sync,
    };

    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
