//! Integration tests for the room sync gateway.
//!
//! Each test serves the real router on an ephemeral port backed by an
//! in-memory SQLite database and talks to it over real WebSocket connections.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use pomosync_server::{
    domain::{Room, RoomId, RoomRepository, Timestamp},
    infrastructure::repository::SqliteRoomRepository,
    ui::Server,
};
use pomosync_shared::time::FixedClock;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ROOM_ID: &str = "12345678";
const NOW_MS: i64 = 1_700_000_000_000;

/// Helper struct to manage an in-process server
struct TestServer {
    port: u16,
    repository: Arc<SqliteRoomRepository>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a server with one enabled room
    async fn start() -> Self {
        let repository = Arc::new(SqliteRoomRepository::open_in_memory().unwrap());
        repository
            .create_room(&Room::new(room_id(ROOM_ID), Timestamp::new(0)))
            .await
            .unwrap();

        let server = Server::from_repository(repository.clone(), Arc::new(FixedClock::new(NOW_MS)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let router = server.router();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            port,
            repository,
            handle,
        }
    }

    fn ws_url(&self, room_id: &str) -> String {
        format!("ws://127.0.0.1:{}/ws?roomId={}", self.port, room_id)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn connect(&self, room_id: &str) -> Socket {
        let (socket, _response) = connect_async(self.ws_url(room_id)).await.unwrap();
        socket
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn room_id(value: &str) -> RoomId {
    RoomId::new(value.to_string()).unwrap()
}

/// Receive the next text frame as JSON
async fn recv_json(socket: &mut Socket) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

async fn send_action(socket: &mut Socket, action: Value) {
    send_json(
        socket,
        json!({"type": "action", "roomId": ROOM_ID, "clientId": "alice", "action": action}),
    )
    .await;
}

async fn expect_rejected(server: &TestServer, room_id: &str) {
    match connect_async(server.ws_url(room_id)).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 404);
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("connection to room '{room_id}' should have been rejected"),
    }
}

#[tokio::test]
async fn test_snapshot_on_connect() {
    // テスト項目: 接続直後に version 0 のデフォルト状態のスナップショットが届く
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let mut socket = server.connect(ROOM_ID).await;
    let frame = recv_json(&mut socket).await;

    // then (期待する結果):
    assert_eq!(frame["type"], "state");
    assert_eq!(frame["roomId"], ROOM_ID);
    assert_eq!(frame["version"], 0);
    assert_eq!(frame["serverNowMs"], NOW_MS);
    assert_eq!(frame["state"]["timeframeDays"], 365);
    assert_eq!(frame["state"]["pomodoro"]["mode"], "idle");
}

#[tokio::test]
async fn test_action_is_broadcast_to_every_socket() {
    // テスト項目: 1 つのソケットからのアクションで両方のソケットに version+1 の同じ状態が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect(ROOM_ID).await;
    let mut bob = server.connect(ROOM_ID).await;
    let alice_initial = recv_json(&mut alice).await;
    let bob_initial = recv_json(&mut bob).await;
    assert_eq!(alice_initial["version"], 0);
    assert_eq!(bob_initial["version"], 0);

    // when (操作):
    send_action(&mut alice, json!({"type": "POMO_START"})).await;
    let alice_frame = recv_json(&mut alice).await;
    let bob_frame = recv_json(&mut bob).await;

    // then (期待する結果):
    assert_eq!(alice_frame["version"], 1);
    assert_eq!(bob_frame["version"], 1);
    assert_eq!(alice_frame["state"], bob_frame["state"]);
    assert_eq!(alice_frame["state"]["pomodoro"]["mode"], "running");
    assert_eq!(alice_frame["state"]["pomodoro"]["startedAtMs"], NOW_MS);

    let stored = server
        .repository
        .load_snapshot(&room_id(ROOM_ID))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.version, 1);
}

#[tokio::test]
async fn test_reconnect_resumes_persisted_version() {
    // テスト項目: 全員が切断した後に再接続すると永続化された version から再開する
    // given (前提条件):
    let server = TestServer::start().await;
    {
        let mut socket = server.connect(ROOM_ID).await;
        recv_json(&mut socket).await;
        send_action(&mut socket, json!({"type": "SET_SHOW_POMODORO", "value": true})).await;
        send_action(&mut socket, json!({"type": "SET_TIMEFRAME_DAYS", "value": 30})).await;
        recv_json(&mut socket).await;
        recv_json(&mut socket).await;
        socket.close(None).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    // when (操作):
    let mut socket = server.connect(ROOM_ID).await;
    let frame = recv_json(&mut socket).await;

    // then (期待する結果):
    assert_eq!(frame["version"], 2);
    assert_eq!(frame["state"]["showPomodoro"], true);
    assert_eq!(frame["state"]["timeframeDays"], 30);
}

#[tokio::test]
async fn test_rejects_invalid_unknown_and_disabled_rooms() {
    // テスト項目: 不正な形式・未登録・無効化されたルームはアップグレード前に 404 で拒否される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut disabled = Room::new(room_id("22223333"), Timestamp::new(0));
    disabled.enabled = false;
    server.repository.create_room(&disabled).await.unwrap();

    // when (操作) / then (期待する結果):
    expect_rejected(&server, "1234").await;
    expect_rejected(&server, "abcdefgh").await;
    expect_rejected(&server, "123456789").await;
    expect_rejected(&server, "").await;
    expect_rejected(&server, "99999999").await;
    expect_rejected(&server, "22223333").await;
}

#[tokio::test]
async fn test_protocol_errors_do_not_close_connection() {
    // テスト項目: 不正な JSON と未知のメッセージには送信元にのみエラーが返り、接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect(ROOM_ID).await;
    let mut bob = server.connect(ROOM_ID).await;
    recv_json(&mut alice).await;
    recv_json(&mut bob).await;

    // when (操作):
    alice
        .send(Message::Text("{not json".into()))
        .await
        .unwrap();
    let bad_json = recv_json(&mut alice).await;
    send_json(&mut alice, json!({"type": "subscribe"})).await;
    let unknown = recv_json(&mut alice).await;
    send_json(&mut alice, json!({"type": "hello", "roomId": ROOM_ID, "clientId": "alice"})).await;
    send_action(&mut alice, json!({"type": "POMO_START"})).await;
    let after_hello = recv_json(&mut alice).await;
    let bob_frame = recv_json(&mut bob).await;

    // then (期待する結果):
    assert_eq!(bad_json["type"], "error");
    assert_eq!(bad_json["code"], "BAD_JSON");
    assert_eq!(bad_json["message"], "Invalid JSON");
    assert_eq!(unknown["code"], "UNKNOWN_MSG");
    assert_eq!(unknown["message"], "Unknown message type");
    // hello は何も返さず、次に届くのはアクションの結果
    assert_eq!(after_hello["type"], "state");
    assert_eq!(after_hello["version"], 1);
    // bob にはエラーが届かず、最初に届くのはブロードキャスト
    assert_eq!(bob_frame["type"], "state");
    assert_eq!(bob_frame["version"], 1);
}

#[tokio::test]
async fn test_unknown_action_still_bumps_version() {
    // テスト項目: 未知のアクションは状態を変えないが version は進む
    // given (前提条件):
    let server = TestServer::start().await;
    let mut socket = server.connect(ROOM_ID).await;
    let initial = recv_json(&mut socket).await;

    // when (操作):
    send_action(&mut socket, json!({"type": "POMO_WARP"})).await;
    let frame = recv_json(&mut socket).await;

    // then (期待する結果):
    assert_eq!(frame["version"], 1);
    assert_eq!(frame["state"], initial["state"]);
}

#[tokio::test]
async fn test_http_endpoints() {
    // テスト項目: ヘルスチェックとルーム詳細 API が応答する
    // given (前提条件):
    let server = TestServer::start().await;
    let mut socket = server.connect(ROOM_ID).await;
    recv_json(&mut socket).await;
    send_action(&mut socket, json!({"type": "POMO_START"})).await;
    recv_json(&mut socket).await;

    // when (操作):
    let health: Value = reqwest::get(server.http_url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail: Value = reqwest::get(server.http_url(&format!("/api/rooms/{ROOM_ID}")))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let missing = reqwest::get(server.http_url("/api/rooms/99999999"))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(detail["id"], ROOM_ID);
    assert_eq!(detail["enabled"], true);
    assert_eq!(detail["version"], 1);
    assert_eq!(detail["connectedClients"], 1);
    assert_eq!(missing.status(), 404);
}
