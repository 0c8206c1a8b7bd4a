#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tictactoe_relay::Config;
use tictactoe_relay::messages::{ClientMessage, ServerMessage};
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

pub struct TestServer {
    base_url: String,
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.base_url)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!(
            "http://{}{}",
            self.base_url.strip_prefix("ws://").unwrap(),
            path
        )
    }
}

pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with_config(Config::default()).await
}

pub async fn spawn_test_server_with_config(config: Config) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = tictactoe_relay::app_with_config(&config);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("ws://{}", addr),
    }
}

pub async fn connect(server: &TestServer) -> WsStream {
    let (ws, _) = connect_async(&server.ws_url()).await.expect("Failed to connect");
    ws
}

pub async fn send(ws: &mut WsStream, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(Message::Text(json.into())).await.unwrap();
}

pub fn create_room_msg(player_name: &str) -> ClientMessage {
    ClientMessage::CreateRoom {
        player_name: player_name.to_string(),
        player_id: Some(format!("{}-id", player_name)),
    }
}

pub fn join_room_msg(room_code: &str, player_name: &str) -> ClientMessage {
    ClientMessage::JoinRoom {
        room_code: room_code.to_string(),
        player_name: player_name.to_string(),
        player_id: Some(format!("{}-id", player_name)),
    }
}

pub fn make_move_msg(room_id: &str, index: i64, player: &str) -> ClientMessage {
    ClientMessage::MakeMove {
        room_id: room_id.to_string(),
        index,
        player: player.to_string(),
    }
}

pub async fn recv(ws: &mut WsStream) -> ServerMessage {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for message")
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Assert nothing arrives on `ws` for a short while
pub async fn assert_silent(ws: &mut WsStream) {
    if let Ok(Some(Ok(msg))) = tokio::time::timeout(SILENCE_WINDOW, ws.next()).await {
        panic!("Expected no message, got {:?}", msg);
    }
}

/// Create a room and return `(room_id, room_code)`
pub async fn create_room(ws: &mut WsStream, player_name: &str) -> (String, String) {
    send(ws, &create_room_msg(player_name)).await;
    match recv(ws).await {
        ServerMessage::RoomCreated { room_id, room_code } => (room_id, room_code),
        other => panic!("Expected RoomCreated, got {:?}", other),
    }
}

/// Host creates a room and a guest joins it. Both `playerJoined` notices are consumed.
pub async fn paired_room(server: &TestServer) -> (WsStream, WsStream, String, String) {
    let mut host = connect(server).await;
    let (room_id, room_code) = create_room(&mut host, "Alice").await;

    let mut guest = connect(server).await;
    send(&mut guest, &join_room_msg(&room_code, "Bob")).await;

    assert!(matches!(recv(&mut host).await, ServerMessage::PlayerJoined { .. }));
    assert!(matches!(recv(&mut guest).await, ServerMessage::PlayerJoined { .. }));

    (host, guest, room_id, room_code)
}
