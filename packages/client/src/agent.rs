//! Client sync agent.
//!
//! Keeps a single WebSocket connection to `<url>?roomId=<id>` while sync is
//! enabled and a room is selected. Received snapshots are republished through
//! `watch` stores; actions are sent only while connected.
//!
//! An unsolicited close is followed by a reconnection with bounded exponential
//! backoff. Disabling sync or switching rooms tears the connection down and
//! cancels any pending reconnection.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use pomosync_server::{
    domain::{Action, RoomId, RoomState},
    infrastructure::dto::websocket::{
        ActionMessage, HelloMessage, MessageType, OutboundMessage, parse_outbound,
    },
};
use pomosync_shared::time::Clock;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message, http::StatusCode},
};

use crate::{domain::reconnect_delay, error::ClientError};

/// `last_error` value for transport failures.
pub const WEBSOCKET_ERROR: &str = "WebSocket error";

/// `last_error` value when the server rejects the room.
pub const ROOM_NOT_FOUND_ERROR: &str = "room not found";

/// What the agent should be connected to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncTarget {
    pub enabled: bool,
    pub room_id: Option<RoomId>,
}

impl SyncTarget {
    /// The room to connect to, if sync is on and a room is selected.
    pub fn active_room(&self) -> Option<&RoomId> {
        self.room_id.as_ref().filter(|_| self.enabled)
    }
}

/// Read side of the agent's stores.
#[derive(Debug, Clone)]
pub struct SyncStores {
    pub connected: watch::Receiver<bool>,
    pub last_error: watch::Receiver<Option<String>>,
    pub room_state: watch::Receiver<Option<RoomState>>,
    pub room_version: watch::Receiver<u64>,
    /// `serverNowMs - localNowMs` of the last snapshot
    pub server_offset_ms: watch::Receiver<i64>,
}

/// Write side of the agent's stores.
#[derive(Debug)]
pub(crate) struct StorePublisher {
    connected: watch::Sender<bool>,
    last_error: watch::Sender<Option<String>>,
    room_state: watch::Sender<Option<RoomState>>,
    room_version: watch::Sender<u64>,
    server_offset_ms: watch::Sender<i64>,
}

impl StorePublisher {
    pub(crate) fn new() -> Self {
        Self {
            connected: watch::Sender::new(false),
            last_error: watch::Sender::new(None),
            room_state: watch::Sender::new(None),
            room_version: watch::Sender::new(0),
            server_offset_ms: watch::Sender::new(0),
        }
    }

    pub(crate) fn subscribe(&self) -> SyncStores {
        SyncStores {
            connected: self.connected.subscribe(),
            last_error: self.last_error.subscribe(),
            room_state: self.room_state.subscribe(),
            room_version: self.room_version.subscribe(),
            server_offset_ms: self.server_offset_ms.subscribe(),
        }
    }

    fn set_connected(&self, connected: bool) {
        self.connected.send_if_modified(|current| {
            let changed = *current != connected;
            *current = connected;
            changed
        });
    }

    fn set_error(&self, error: Option<String>) {
        self.last_error.send_replace(error);
    }

    /// Apply one server text frame. Unparseable frames are ignored.
    pub(crate) fn apply_server_text(&self, text: &str, local_now_ms: i64) {
        match parse_outbound(text) {
            Some(OutboundMessage::State(msg)) => {
                self.room_version.send_replace(msg.version);
                self.server_offset_ms
                    .send_replace(msg.server_now_ms.saturating_sub(local_now_ms));
                self.room_state.send_replace(Some(msg.state));
            }
            Some(OutboundMessage::Error(msg)) => {
                tracing::warn!("Server error {}: {}", msg.code, msg.message);
                self.set_error(Some(format!("{}: {}", msg.code, msg.message)));
            }
            None => {
                tracing::debug!("Ignoring unrecognized frame: {}", text);
            }
        }
    }
}

/// How a connection attempt ended.
enum SessionEnd {
    /// The socket never opened.
    Failed(ClientError),
    /// The socket opened and was later closed.
    Closed,
}

struct AgentContext {
    url: String,
    client_id: String,
    stores: Arc<StorePublisher>,
    clock: Arc<dyn Clock>,
}

/// Handle to the background sync task.
pub struct SyncAgent {
    target: watch::Sender<SyncTarget>,
    outbound: mpsc::UnboundedSender<Action>,
    stores: Arc<StorePublisher>,
    task: JoinHandle<()>,
}

impl SyncAgent {
    /// Spawn the agent on the current tokio runtime. Sync starts disabled.
    ///
    /// # Arguments
    ///
    /// * `url` - WebSocket endpoint without query (e.g. `ws://127.0.0.1:8787/ws`)
    /// * `client_id` - Identifier announced in `hello` and `action` frames
    /// * `clock` - Local time source used for the server clock offset
    pub fn spawn(url: impl Into<String>, client_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let (target, target_rx) = watch::channel(SyncTarget::default());
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let stores = Arc::new(StorePublisher::new());

        let context = AgentContext {
            url: url.into(),
            client_id: client_id.into(),
            stores: stores.clone(),
            clock,
        };
        let task = tokio::spawn(agent_loop(context, target_rx, outbound_rx));

        Self {
            target,
            outbound,
            stores,
            task,
        }
    }

    /// Subscribe to the agent's stores.
    pub fn stores(&self) -> SyncStores {
        self.stores.subscribe()
    }

    /// Current target.
    pub fn target(&self) -> SyncTarget {
        self.target.borrow().clone()
    }

    /// Turn sync on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.target.send_if_modified(|target| {
            let changed = target.enabled != enabled;
            target.enabled = enabled;
            changed
        });
    }

    /// Select the room to sync with.
    pub fn set_room(&self, room_id: Option<RoomId>) {
        self.target.send_if_modified(|target| {
            let changed = target.room_id != room_id;
            target.room_id = room_id;
            changed
        });
    }

    /// Send an action to the current room.
    ///
    /// Returns [`ClientError::NotConnected`] (and drops the action) unless a
    /// connection is open.
    pub fn send_action(&self, action: Action) -> Result<(), ClientError> {
        if !*self.stores.connected.borrow() {
            return Err(ClientError::NotConnected);
        }
        self.outbound
            .send(action)
            .map_err(|_| ClientError::NotConnected)
    }
}

impl Drop for SyncAgent {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn agent_loop(
    context: AgentContext,
    mut target_rx: watch::Receiver<SyncTarget>,
    mut outbound_rx: mpsc::UnboundedReceiver<Action>,
) {
    let mut attempt: u32 = 0;

    loop {
        let target = target_rx.borrow_and_update().clone();
        let Some(room_id) = target.active_room().cloned() else {
            context.stores.set_connected(false);
            attempt = 0;
            if target_rx.changed().await.is_err() {
                return;
            }
            continue;
        };

        let end = tokio::select! {
            end = run_connection(&context, &room_id, &mut outbound_rx) => end,
            changed = target_rx.changed() => {
                context.stores.set_connected(false);
                if changed.is_err() {
                    return;
                }
                tracing::info!("Sync target changed, leaving room '{}'", room_id);
                attempt = 0;
                continue;
            }
        };
        context.stores.set_connected(false);

        match end {
            SessionEnd::Closed => {
                tracing::info!("Connection to room '{}' closed", room_id);
                attempt = 0;
            }
            SessionEnd::Failed(e) => {
                tracing::warn!("Failed to connect to room '{}': {}", room_id, e);
            }
        }

        let delay = reconnect_delay(attempt);
        attempt = attempt.saturating_add(1);
        tracing::info!(
            "Reconnecting to room '{}' in {} ms (attempt {})",
            room_id,
            delay.as_millis(),
            attempt
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            changed = target_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                attempt = 0;
            }
        }
    }
}

async fn run_connection(
    context: &AgentContext,
    room_id: &RoomId,
    outbound_rx: &mut mpsc::UnboundedReceiver<Action>,
) -> SessionEnd {
    let stores = &context.stores;
    let url = format!("{}?roomId={}", context.url, room_id);
    stores.set_error(None);

    let ws_stream = match connect_async(&url).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(tungstenite::Error::Http(response)) if response.status() == StatusCode::NOT_FOUND => {
            stores.set_error(Some(ROOM_NOT_FOUND_ERROR.to_string()));
            return SessionEnd::Failed(ClientError::RoomNotFound(room_id.to_string()));
        }
        Err(e) => {
            stores.set_error(Some(WEBSOCKET_ERROR.to_string()));
            return SessionEnd::Failed(ClientError::ConnectionError(e.to_string()));
        }
    };

    let (mut write, mut read) = ws_stream.split();

    // 接続前に積まれたアクションは送らない
    while outbound_rx.try_recv().is_ok() {}

    let hello = HelloMessage {
        r#type: MessageType::Hello,
        room_id: room_id.to_string(),
        client_id: context.client_id.clone(),
    };
    if let Err(e) = send_json(&mut write, &hello).await {
        tracing::warn!("Failed to send hello: {}", e);
        stores.set_error(Some(WEBSOCKET_ERROR.to_string()));
        return SessionEnd::Closed;
    }

    stores.set_connected(true);
    tracing::info!("Connected to room '{}'", room_id);

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    stores.apply_server_text(text.as_str(), context.clock.now_millis());
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    stores.set_error(Some(WEBSOCKET_ERROR.to_string()));
                    break;
                }
            },
            action = outbound_rx.recv() => {
                let Some(action) = action else {
                    break;
                };
                let message = ActionMessage {
                    r#type: MessageType::Action,
                    room_id: room_id.to_string(),
                    client_id: context.client_id.clone(),
                    action,
                };
                if let Err(e) = send_json(&mut write, &message).await {
                    tracing::warn!("Failed to send action: {}", e);
                    stores.set_error(Some(WEBSOCKET_ERROR.to_string()));
                    break;
                }
            }
        }
    }

    SessionEnd::Closed
}

async fn send_json<S, T>(write: &mut S, message: &T) -> Result<(), ClientError>
where
    S: futures_util::Sink<Message, Error = tungstenite::Error> + Unpin,
    T: serde::Serialize,
{
    let json =
        serde_json::to_string(message).map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))
}
