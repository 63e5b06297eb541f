//! Room administration tool.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin pomosync-rooms -- add
//! cargo run --bin pomosync-rooms -- add 12345678
//! cargo run --bin pomosync-rooms -- remove 12345678
//! cargo run --bin pomosync-rooms -- list
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use pomosync_server::{
    domain::{RoomId, Timestamp},
    infrastructure::repository::SqliteRoomRepository,
    usecase::ManageRoomsUseCase,
};
use pomosync_shared::{
    logger::setup_logger,
    time::{get_timestamp, timestamp_to_rfc3339},
};

#[derive(Parser, Debug)]
#[command(name = "pomosync-rooms")]
#[command(about = "Create, remove and list sync rooms", long_about = None)]
struct Args {
    /// SQLite database file
    #[arg(short = 'd', long, env = "SQLITE_PATH", default_value = "./sync.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a room (random 8-digit id when omitted) and print its id
    Add {
        /// Room id (8 digits)
        id: Option<String>,
    },
    /// Remove a room and its state
    Remove {
        /// Room id (8 digits)
        id: String,
    },
    /// List rooms, newest first
    List,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    if let Err(e) = run(args).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let repository = Arc::new(SqliteRoomRepository::open(&args.database)?);
    let usecase = ManageRoomsUseCase::new(repository);

    match args.command {
        Command::Add { id } => {
            let id = id.map(RoomId::new).transpose()?;
            let room = usecase.create(id, Timestamp::new(get_timestamp())).await?;
            println!("{}", room.id);
        }
        Command::Remove { id } => {
            let id = RoomId::new(id)?;
            usecase.remove(&id).await?;
            println!("removed {}", id);
        }
        Command::List => {
            for room in usecase.list().await? {
                println!(
                    "{}  enabled={}  created_at={}",
                    room.id,
                    u8::from(room.enabled),
                    timestamp_to_rfc3339(room.created_at.value())
                );
            }
        }
    }

    Ok(())
}
