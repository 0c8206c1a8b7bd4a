//! Forwarding of gameplay events between the occupants of a room.
//!
//! Payloads are passed through untouched: move bounds, markers and winners are
//! the clients' business. Every relay skips the sender and only reaches the
//! named room. The sender is not required to be seated there.

use crate::dispatch::Outbound;
use crate::messages::ServerMessage;
use crate::rooms::{ConnectionId, RoomRegistry};
use tracing::{debug, warn};

pub fn relay_move(
    registry: &RoomRegistry,
    sender: ConnectionId,
    room_id: &str,
    index: i64,
    player: String,
) -> Vec<Outbound> {
    relay_to_others(registry, sender, room_id, ServerMessage::MoveMade { index, player })
}

pub fn relay_new_game(registry: &RoomRegistry, sender: ConnectionId, room_id: &str) -> Vec<Outbound> {
    relay_to_others(registry, sender, room_id, ServerMessage::NewGame)
}

pub fn relay_game_over(
    registry: &RoomRegistry,
    sender: ConnectionId,
    room_id: &str,
    winner: Option<String>,
) -> Vec<Outbound> {
    relay_to_others(registry, sender, room_id, ServerMessage::GameOver { winner })
}

fn relay_to_others(
    registry: &RoomRegistry,
    sender: ConnectionId,
    room_id: &str,
    message: ServerMessage,
) -> Vec<Outbound> {
    let Some(room) = registry.room(room_id) else {
        debug!(%sender, room_id, "Relay to unknown room dropped");
        return Vec::new();
    };

    // The room id is trusted as given; an unseated sender is only logged
    if !room.contains(sender) {
        warn!(%sender, room_id, "Relay from non-occupant");
    }

    debug!(%sender, room_id, ?message, "Relaying");
    room.others(sender)
        .map(|to| Outbound {
            to,
            message: message.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Pair {
        registry: RoomRegistry,
        room_id: String,
        alice: ConnectionId,
        bob: ConnectionId,
    }

    fn pair() -> Pair {
        let mut registry = RoomRegistry::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let created = registry.create_room(alice, "Alice".to_string(), None);
        registry
            .join_room(bob, &created.room_code, "Bob".to_string(), None)
            .unwrap();
        Pair {
            registry,
            room_id: created.room_id,
            alice,
            bob,
        }
    }

    #[test]
    fn move_reaches_only_the_opponent() {
        let p = pair();

        let out = relay_move(&p.registry, p.bob, &p.room_id, 4, "O".to_string());

        assert_eq!(
            out,
            vec![Outbound {
                to: p.alice,
                message: ServerMessage::MoveMade {
                    index: 4,
                    player: "O".to_string()
                }
            }]
        );
    }

    #[test]
    fn new_game_and_game_over_skip_sender() {
        let p = pair();

        let out = relay_new_game(&p.registry, p.alice, &p.room_id);
        assert_eq!(
            out,
            vec![Outbound {
                to: p.bob,
                message: ServerMessage::NewGame
            }]
        );

        let out = relay_game_over(&p.registry, p.alice, &p.room_id, Some("X".to_string()));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, p.bob);
        assert_eq!(
            out[0].message,
            ServerMessage::GameOver {
                winner: Some("X".to_string())
            }
        );
    }

    #[test]
    fn relay_in_waiting_room_has_no_recipients() {
        let mut registry = RoomRegistry::new();
        let alice = Uuid::new_v4();
        let created = registry.create_room(alice, "Alice".to_string(), None);

        assert!(relay_new_game(&registry, alice, &created.room_id).is_empty());
    }

    #[test]
    fn relay_to_unknown_room_is_dropped() {
        let p = pair();
        assert!(relay_move(&p.registry, p.alice, "no-such-room", 0, "X".to_string()).is_empty());
    }

    #[test]
    fn relay_from_outsider_reaches_whole_room() {
        let p = pair();
        let outsider = Uuid::new_v4();

        let out = relay_move(&p.registry, outsider, &p.room_id, 0, "X".to_string());

        let recipients: Vec<_> = out.iter().map(|o| o.to).collect();
        assert_eq!(recipients, vec![p.alice, p.bob]);
    }

    #[test]
    fn relay_never_crosses_rooms() {
        let mut p = pair();
        let (carol, dave) = (Uuid::new_v4(), Uuid::new_v4());
        let other = p.registry.create_room(carol, "Carol".to_string(), None);
        p.registry
            .join_room(dave, &other.room_code, "Dave".to_string(), None)
            .unwrap();

        let out = relay_move(&p.registry, p.alice, &p.room_id, 1, "X".to_string());

        let recipients: Vec<_> = out.iter().map(|o| o.to).collect();
        assert_eq!(recipients, vec![p.bob]);
    }
}
