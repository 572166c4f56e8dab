//! Canonical room enumeration.
//!
//! # Responsibility
//! - Define the closed set of rooms an inventory entry may reference.
//! - Provide stable string forms used in persisted documents.
//!
//! # Invariants
//! - A room stored on an entry is always one of these variants.
//! - Persisted strings never change once released.
//!
//! # See also
//! - `crate::matching::normalize::resolve_room` for free-text resolution.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Closed set of rooms known to the household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Room {
    #[serde(rename = "hall")]
    Hall,
    #[serde(rename = "kitchen")]
    Kitchen,
    #[serde(rename = "balcony")]
    Balcony,
    #[serde(rename = "bedroom")]
    Bedroom,
    #[serde(rename = "computer room")]
    ComputerRoom,
    #[serde(rename = "2nd bedroom")]
    SecondBedroom,
}

const ROOM_HALL: &str = "hall";
const ROOM_KITCHEN: &str = "kitchen";
const ROOM_BALCONY: &str = "balcony";
const ROOM_BEDROOM: &str = "bedroom";
const ROOM_COMPUTER_ROOM: &str = "computer room";
const ROOM_SECOND_BEDROOM: &str = "2nd bedroom";

impl Room {
    /// Every canonical room, in declaration order.
    pub const ALL: [Room; 6] = [
        Room::Hall,
        Room::Kitchen,
        Room::Balcony,
        Room::Bedroom,
        Room::ComputerRoom,
        Room::SecondBedroom,
    ];

    /// Stable string id used in persisted documents and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hall => ROOM_HALL,
            Self::Kitchen => ROOM_KITCHEN,
            Self::Balcony => ROOM_BALCONY,
            Self::Bedroom => ROOM_BEDROOM,
            Self::ComputerRoom => ROOM_COMPUTER_ROOM,
            Self::SecondBedroom => ROOM_SECOND_BEDROOM,
        }
    }

    /// Parses an already-normalized canonical room name.
    ///
    /// Synonyms are not handled here; callers holding free text should go
    /// through `resolve_room`.
    pub fn from_canonical(value: &str) -> Option<Room> {
        match value {
            ROOM_HALL => Some(Self::Hall),
            ROOM_KITCHEN => Some(Self::Kitchen),
            ROOM_BALCONY => Some(Self::Balcony),
            ROOM_BEDROOM => Some(Self::Bedroom),
            ROOM_COMPUTER_ROOM => Some(Self::ComputerRoom),
            ROOM_SECOND_BEDROOM => Some(Self::SecondBedroom),
            _ => None,
        }
    }
}

impl Display for Room {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
