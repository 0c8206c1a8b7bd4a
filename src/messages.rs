use serde::{Deserialize, Serialize};

/// Events sent by a browser client. The `type` tag carries the event name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    // Room lifecycle
    CreateRoom {
        player_name: String,
        #[serde(default)]
        player_id: Option<String>,
    },
    JoinRoom {
        room_code: String,
        player_name: String,
        #[serde(default)]
        player_id: Option<String>,
    },
    LeaveRoom,

    // Relayed gameplay
    MakeMove {
        room_id: String,
        index: i64,
        player: String,
    },
    NewGame {
        room_id: String,
    },
    GameOver {
        room_id: String,
        winner: Option<String>,
    },
}

/// Events pushed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    // Room lifecycle
    RoomCreated {
        room_id: String,
        room_code: String,
    },
    RoomNotFound,
    RoomFull,
    PlayerJoined {
        player_name: String,
        room_owner: String,
    },
    PlayerLeft,
    RoomExpired,

    // Relayed gameplay
    MoveMade {
        index: i64,
        player: String,
    },
    NewGame,
    GameOver {
        winner: Option<String>,
    },
}
