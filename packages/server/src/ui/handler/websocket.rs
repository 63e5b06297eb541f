//! WebSocket gateway handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ClientId, ConnectionId, RoomId, SyncError, Timestamp},
    infrastructure::dto::websocket::{InboundMessage, InboundParseError, parse_inbound},
    ui::state::AppState,
    usecase::ConnectError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(rename = "roomId")]
    pub room_id: Option<String>,
}

fn room_not_found() -> Response {
    (StatusCode::NOT_FOUND, "room not found").into_response()
}

/// `GET /ws?roomId=<8 digits>`
///
/// The room is validated before the upgrade; unknown, disabled or malformed
/// ids are answered with a plain 404.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Response {
    let raw_room_id = query.room_id.unwrap_or_default();
    let room_id = match RoomId::new(raw_room_id.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Rejecting connection with invalid room id '{}'", raw_room_id);
            return room_not_found();
        }
    };

    match state.connect_client_usecase.check_room(&room_id).await {
        Ok(()) => {}
        Err(ConnectError::RoomNotFound(_)) => {
            tracing::warn!("Rejecting connection to unknown room '{}'", room_id);
            return room_not_found();
        }
        Err(e) => {
            tracing::error!("Failed to look up room '{}': {}", room_id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id))
}

/// Spawns a task that drains the pusher channel into the WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room_id: RoomId) {
    let connection_id = ConnectionId::generate();
    let (tx, rx) = mpsc::unbounded_channel();
    let (sender, mut receiver) = socket.split();

    // 初回スナップショットは tx に積まれ、pusher_loop の開始後に送信される
    let now = Timestamp::new(state.clock.now_millis());
    if let Err(e) = state
        .connect_client_usecase
        .execute(&room_id, connection_id, tx, now)
        .await
    {
        tracing::error!(
            "Failed to attach connection '{}' to room '{}': {}",
            connection_id,
            room_id,
            e
        );
        return;
    }

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let room_id_clone = room_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on connection '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_frame(&state_clone, &room_id_clone, &connection_id, text.as_str())
                        .await;
                }
                Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
                    Ok(text) => {
                        handle_frame(&state_clone, &room_id_clone, &connection_id, text).await;
                    }
                    Err(_) => {
                        reply_error(&state_clone, &connection_id, SyncError::bad_json()).await;
                    }
                },
                Message::Ping(_) => {
                    // Pong は axum が自動で返す
                    tracing::trace!("Received ping from connection '{}'", connection_id);
                }
                Message::Close(_) => {
                    tracing::debug!("Connection '{}' requested close", connection_id);
                    break;
                }
                Message::Pong(_) => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_client_usecase
        .execute(&room_id, &connection_id)
        .await;
}

/// Dispatch one inbound text frame. `now` is read once per frame.
async fn handle_frame(
    state: &AppState,
    room_id: &RoomId,
    connection_id: &ConnectionId,
    text: &str,
) {
    let now = Timestamp::new(state.clock.now_millis());

    match parse_inbound(text) {
        Ok(InboundMessage::Hello(hello)) => {
            tracing::debug!(
                "Hello from client '{}' on connection '{}'",
                client_label(hello.client_id()),
                connection_id
            );
        }
        Ok(InboundMessage::Action(message)) => {
            tracing::debug!(
                "Action {:?} from client '{}' on connection '{}'",
                message.action,
                client_label(message.client_id()),
                connection_id
            );
            if let Err(e) = state
                .apply_action_usecase
                .execute(room_id, connection_id, &message.action, now)
                .await
            {
                tracing::warn!("Action rejected for room '{}': {}", room_id, e);
            }
        }
        Err(InboundParseError::BadJson) => {
            tracing::debug!("Malformed frame on connection '{}'", connection_id);
            reply_error(state, connection_id, SyncError::bad_json()).await;
        }
        Err(InboundParseError::UnknownType(frame_type)) => {
            tracing::debug!(
                "Unknown frame type {:?} on connection '{}'",
                frame_type,
                connection_id
            );
            reply_error(state, connection_id, SyncError::unknown_msg()).await;
        }
    }
}

fn client_label(client_id: Option<ClientId>) -> String {
    client_id.map_or_else(|| "anonymous".to_string(), |id| id.to_string())
}

async fn reply_error(state: &AppState, connection_id: &ConnectionId, error: SyncError) {
    if let Err(e) = state.send_error_usecase.execute(connection_id, error).await {
        tracing::warn!("Failed to reply error to connection '{}': {}", connection_id, e);
    }
}
