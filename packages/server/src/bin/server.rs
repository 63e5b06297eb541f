//! Room sync server.
//!
//! Serves `GET /ws?roomId=<id>` (room-scoped WebSocket), `GET /health` and
//! `GET /api/rooms/{room_id}`. Room state is persisted in SQLite.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin pomosync-server
//! cargo run --bin pomosync-server -- --host 0.0.0.0 --port 8787 --database ./sync.db
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use pomosync_server::{infrastructure::repository::SqliteRoomRepository, ui::Server};
use pomosync_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "pomosync-server")]
#[command(about = "Room sync server for shared pomodoro timers", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8787")]
    port: u16,

    /// SQLite database file
    #[arg(short = 'd', long, env = "SQLITE_PATH", default_value = "./sync.db")]
    database: PathBuf,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // 1. Create Repository (SQLite)
    let repository = match SqliteRoomRepository::open(&args.database) {
        Ok(repository) => Arc::new(repository),
        Err(e) => {
            tracing::error!(
                "Failed to open database '{}': {}",
                args.database.display(),
                e
            );
            std::process::exit(1);
        }
    };
    tracing::info!("Using database '{}'", args.database.display());

    // 2. Wire MessagePusher, runtime cache and UseCases, then run the server
    let server = Server::from_repository(repository, Arc::new(SystemClock));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
