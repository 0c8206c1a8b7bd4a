use crate::messages::{ClientMessage, ServerMessage};
use crate::relay;
use crate::rooms::{ConnectionId, Departure, JoinError, RoomRegistry};
use std::time::{Duration, Instant};
use tracing::warn;

/// A server event addressed to one connection
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub message: ServerMessage,
}

impl Outbound {
    fn new(to: ConnectionId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

/// Turns inbound client events into outbound deliveries.
/// Owns the room registry; performs no I/O.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: RoomRegistry,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn handle(&mut self, connection_id: ConnectionId, msg: ClientMessage) -> Vec<Outbound> {
        match msg {
            ClientMessage::CreateRoom {
                player_name,
                player_id,
            } => {
                let created = self
                    .registry
                    .create_room(connection_id, player_name, player_id);
                let mut out = departure_notices(created.released);
                out.push(Outbound::new(
                    connection_id,
                    ServerMessage::RoomCreated {
                        room_id: created.room_id,
                        room_code: created.room_code,
                    },
                ));
                out
            }
            ClientMessage::JoinRoom {
                room_code,
                player_name,
                player_id,
            } => match self
                .registry
                .join_room(connection_id, &room_code, player_name, player_id)
            {
                Ok(joined) => {
                    let mut out = departure_notices(joined.released);
                    let notice = ServerMessage::PlayerJoined {
                        player_name: joined.player_name,
                        room_owner: joined.room_owner,
                    };
                    out.extend(
                        joined
                            .occupants
                            .into_iter()
                            .map(|to| Outbound::new(to, notice.clone())),
                    );
                    out
                }
                Err(JoinError::RoomNotFound) => {
                    vec![Outbound::new(connection_id, ServerMessage::RoomNotFound)]
                }
                Err(JoinError::RoomFull) => {
                    vec![Outbound::new(connection_id, ServerMessage::RoomFull)]
                }
                Err(err @ JoinError::AlreadyInRoom) => {
                    warn!(%connection_id, room_code, %err, "Join ignored");
                    Vec::new()
                }
            },
            ClientMessage::LeaveRoom => self.disconnect(connection_id),
            ClientMessage::MakeMove {
                room_id,
                index,
                player,
            } => relay::relay_move(&self.registry, connection_id, &room_id, index, player),
            ClientMessage::NewGame { room_id } => {
                relay::relay_new_game(&self.registry, connection_id, &room_id)
            }
            ClientMessage::GameOver { room_id, winner } => {
                relay::relay_game_over(&self.registry, connection_id, &room_id, winner)
            }
        }
    }

    /// Release whatever room the connection holds. Same path for an explicit
    /// `leaveRoom` and a dropped socket.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Outbound> {
        departure_notices(self.registry.leave_room(connection_id))
    }

    pub fn sweep_idle(&mut self, now: Instant, timeout: Duration) -> Vec<Outbound> {
        self.registry
            .sweep_idle(now, timeout)
            .into_iter()
            .map(|expired| Outbound::new(expired.occupant, ServerMessage::RoomExpired))
            .collect()
    }
}

fn departure_notices(departure: Option<Departure>) -> Vec<Outbound> {
    departure
        .map(|d| {
            d.remaining
                .into_iter()
                .map(|to| Outbound::new(to, ServerMessage::PlayerLeft))
                .collect()
        })
        .unwrap_or_default()
}
