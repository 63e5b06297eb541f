//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use pomosync_shared::time::Clock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    domain::{RoomRepository, RoomRuntimeCache},
    infrastructure::message_pusher::WebSocketMessagePusher,
    usecase::{
        ApplyActionUseCase, ConnectClientUseCase, DisconnectClientUseCase, GetRoomDetailUseCase,
        SendErrorUseCase,
    },
};

use super::{
    handler::{get_room_detail, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Room sync server
///
/// # Example
///
/// ```ignore
/// let repository = Arc::new(SqliteRoomRepository::open("./sync.db")?);
/// let server = Server::from_repository(repository, Arc::new(SystemClock));
/// server.run("127.0.0.1".to_string(), 8787).await?;
/// ```
pub struct Server {
    app_state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance from already wired use cases
    pub fn new(
        connect_client_usecase: Arc<ConnectClientUseCase>,
        apply_action_usecase: Arc<ApplyActionUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        send_error_usecase: Arc<SendErrorUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            app_state: Arc::new(AppState {
                connect_client_usecase,
                apply_action_usecase,
                disconnect_client_usecase,
                send_error_usecase,
                get_room_detail_usecase,
                clock,
            }),
        }
    }

    /// Wire every use case around one repository
    ///
    /// Dependencies are created in order:
    /// 1. MessagePusher (WebSocket implementation)
    /// 2. RoomRuntimeCache
    /// 3. UseCases
    pub fn from_repository(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        // 1. MessagePusher
        let message_pusher = Arc::new(WebSocketMessagePusher::default());

        // 2. Runtime cache
        let cache = Arc::new(RoomRuntimeCache::new());

        // 3. UseCases
        let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            cache.clone(),
        ));
        let apply_action_usecase = Arc::new(ApplyActionUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            cache.clone(),
        ));
        let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(
            message_pusher.clone(),
            cache.clone(),
        ));
        let send_error_usecase = Arc::new(SendErrorUseCase::new(message_pusher));
        let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository, cache));

        Self::new(
            connect_client_usecase,
            apply_action_usecase,
            disconnect_client_usecase,
            send_error_usecase,
            get_room_detail_usecase,
            clock,
        )
    }

    /// Build the axum router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/health", get(health_check))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state.clone())
    }

    /// Run the server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Sync server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?roomId=<room id>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
