mod code;
mod registry;
mod room;

pub use code::CODE_LENGTH;
pub use registry::{CreatedRoom, Departure, ExpiredRoom, JoinError, JoinedRoom, RoomRegistry};
pub use room::{ConnectionId, Membership, Occupant, ROOM_CAPACITY, Room};
