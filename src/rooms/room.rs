use std::time::Instant;
use uuid::Uuid;

/// Transport-assigned identity of a live connection.
pub type ConnectionId = Uuid;

pub const ROOM_CAPACITY: usize = 2;

/// A party seated in a room
#[derive(Debug, Clone, PartialEq)]
pub struct Occupant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    /// Opaque client token, stored but never used for routing
    pub player_id: Option<String>,
}

impl Occupant {
    pub fn new(
        connection_id: ConnectionId,
        display_name: impl Into<String>,
        player_id: Option<String>,
    ) -> Self {
        Self {
            connection_id,
            display_name: display_name.into(),
            player_id,
        }
    }
}

#[derive(Debug)]
pub struct Room {
    pub id: String,
    pub code: String,
    pub owner_connection_id: ConnectionId,
    pub owner_name: String,
    occupants: Vec<Occupant>,
    /// Set while the room holds a single occupant
    idle_since: Option<Instant>,
}

impl Room {
    pub fn new(code: impl Into<String>, owner: Occupant) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            owner_connection_id: owner.connection_id,
            owner_name: owner.display_name.clone(),
            occupants: vec![owner],
            idle_since: Some(Instant::now()),
        }
    }

    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= ROOM_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.occupants
            .iter()
            .any(|o| o.connection_id == connection_id)
    }

    /// Connections in the room other than `connection_id`
    pub fn others(&self, connection_id: ConnectionId) -> impl Iterator<Item = ConnectionId> + '_ {
        self.occupants
            .iter()
            .map(|o| o.connection_id)
            .filter(move |id| *id != connection_id)
    }

    pub fn idle_since(&self) -> Option<Instant> {
        self.idle_since
    }

    /// Seat a new occupant. Returns false without changes when the room is full.
    pub(super) fn admit(&mut self, occupant: Occupant) -> bool {
        if self.is_full() {
            return false;
        }
        self.occupants.push(occupant);
        if self.is_full() {
            self.idle_since = None;
        }
        true
    }

    /// Remove an occupant. Returns false if they were not seated here.
    pub(super) fn remove(&mut self, connection_id: ConnectionId) -> bool {
        let Some(index) = self
            .occupants
            .iter()
            .position(|o| o.connection_id == connection_id)
        else {
            return false;
        };
        self.occupants.remove(index);
        if self.occupants.len() == 1 {
            self.idle_since = Some(Instant::now());
        }
        true
    }
}

/// Which room a connection belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub room_id: String,
    pub is_owner: bool,
}
