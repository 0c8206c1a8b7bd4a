use super::code::generate_unique_room_code;
use super::room::{ConnectionId, Membership, Occupant, Room};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("no room with that code")]
    RoomNotFound,
    #[error("room already has two players")]
    RoomFull,
    #[error("connection is already seated in that room")]
    AlreadyInRoom,
}

/// A connection that left (or was released from) a room
#[derive(Debug, PartialEq)]
pub struct Departure {
    pub room_id: String,
    /// Occupants still in the room, to be told `playerLeft`
    pub remaining: Vec<ConnectionId>,
    pub room_deleted: bool,
}

#[derive(Debug, PartialEq)]
pub struct CreatedRoom {
    pub room_id: String,
    pub room_code: String,
    /// Set when the creator was pulled out of a previous room
    pub released: Option<Departure>,
}

#[derive(Debug, PartialEq)]
pub struct JoinedRoom {
    pub room_id: String,
    pub player_name: String,
    pub room_owner: String,
    /// Everyone now in the room, joiner included
    pub occupants: Vec<ConnectionId>,
    pub released: Option<Departure>,
}

/// A room removed by the idle sweep together with its lone occupant
#[derive(Debug, PartialEq)]
pub struct ExpiredRoom {
    pub room_id: String,
    pub occupant: ConnectionId,
}

/// Owns every active room and each connection's membership.
/// Rooms are keyed by id with a secondary index by code.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    codes: HashMap<String, String>, // code -> room_id
    memberships: HashMap<ConnectionId, Membership>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_by_code(&self, code: &str) -> Option<&Room> {
        let room_id = self.codes.get(code)?;
        self.rooms.get(room_id)
    }

    pub fn membership(&self, connection_id: ConnectionId) -> Option<&Membership> {
        self.memberships.get(&connection_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Open a new room with the creator as its owner and sole occupant.
    pub fn create_room(
        &mut self,
        connection_id: ConnectionId,
        player_name: String,
        player_id: Option<String>,
    ) -> CreatedRoom {
        let released = self.leave_room(connection_id);

        let code = generate_unique_room_code(|code| self.codes.contains_key(code));
        let owner = Occupant::new(connection_id, player_name, player_id);
        let room = Room::new(code.clone(), owner);
        let room_id = room.id.clone();

        info!(room_id, code, owner = room.owner_name, "Created room");

        self.codes.insert(code.clone(), room_id.clone());
        self.rooms.insert(room_id.clone(), room);
        self.memberships.insert(
            connection_id,
            Membership {
                room_id: room_id.clone(),
                is_owner: true,
            },
        );

        CreatedRoom {
            room_id,
            room_code: code,
            released,
        }
    }

    /// Seat a connection in the room holding `room_code`.
    pub fn join_room(
        &mut self,
        connection_id: ConnectionId,
        room_code: &str,
        player_name: String,
        player_id: Option<String>,
    ) -> Result<JoinedRoom, JoinError> {
        let room_id = self
            .codes
            .get(room_code)
            .cloned()
            .ok_or(JoinError::RoomNotFound)?;
        let room = self.rooms.get(&room_id).ok_or(JoinError::RoomNotFound)?;

        if room.is_full() {
            debug!(room_id, room_code, "Join refused, room full");
            return Err(JoinError::RoomFull);
        }
        if room.contains(connection_id) {
            return Err(JoinError::AlreadyInRoom);
        }

        let released = self.leave_room(connection_id);

        let room = self.rooms.get_mut(&room_id).ok_or(JoinError::RoomNotFound)?;
        room.admit(Occupant::new(connection_id, player_name.clone(), player_id));
        let occupants = room.occupants().iter().map(|o| o.connection_id).collect();
        let room_owner = room.owner_name.clone();

        self.memberships.insert(
            connection_id,
            Membership {
                room_id: room_id.clone(),
                is_owner: false,
            },
        );

        info!(room_id, player_name, room_owner, "Player joined room");

        Ok(JoinedRoom {
            room_id,
            player_name,
            room_owner,
            occupants,
            released,
        })
    }

    /// Remove a connection from its room, deleting the room once empty.
    /// Explicit leaves and transport disconnects both land here.
    /// Returns None when the connection held no membership.
    pub fn leave_room(&mut self, connection_id: ConnectionId) -> Option<Departure> {
        let membership = self.memberships.remove(&connection_id)?;
        let room_id = membership.room_id;
        let room = self.rooms.get_mut(&room_id)?;

        let remaining: Vec<_> = room.others(connection_id).collect();
        room.remove(connection_id);

        let room_deleted = room.is_empty();
        if room_deleted {
            if let Some(room) = self.rooms.remove(&room_id) {
                self.codes.remove(&room.code);
            }
            info!(room_id, "Room emptied and deleted");
        } else {
            info!(room_id, remaining = remaining.len(), "Player left room");
        }

        Some(Departure {
            room_id,
            remaining,
            room_deleted,
        })
    }

    /// Drop rooms that have waited with a single occupant for at least `timeout`.
    pub fn sweep_idle(&mut self, now: Instant, timeout: Duration) -> Vec<ExpiredRoom> {
        let expired: Vec<String> = self
            .rooms
            .values()
            .filter(|room| room.occupants().len() == 1)
            .filter(|room| {
                room.idle_since()
                    .is_some_and(|since| now.saturating_duration_since(since) >= timeout)
            })
            .map(|room| room.id.clone())
            .collect();

        expired
            .into_iter()
            .filter_map(|room_id| {
                let room = self.rooms.remove(&room_id)?;
                self.codes.remove(&room.code);
                let occupant = room.occupants().first()?.connection_id;
                self.memberships.remove(&occupant);
                info!(room_id, code = room.code, "Expired idle room");
                Some(ExpiredRoom { room_id, occupant })
            })
            .collect()
    }
}
