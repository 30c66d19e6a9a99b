//! Where an item currently is
//!
//! Container parent, room and "carried by owner" are mutually exclusive, so
//! they are modelled as one enum instead of three nullable fields.

use serde::{Deserialize, Serialize};

use crate::{ItemId, RoomId};

/// Placement of an item in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Placement {
    /// Freshly created and not yet placed anywhere
    #[default]
    Unplaced,
    /// Inside a container item
    Container(ItemId),
    /// Lying in a room
    Room(RoomId),
    /// Held directly by its owner, outside any room or container
    Carried,
}

impl Placement {
    /// The container parent, if any.
    pub fn container(&self) -> Option<ItemId> {
        match self {
            Self::Container(id) => Some(*id),
            _ => None,
        }
    }

    /// The room, if the item lies directly in one.
    pub fn room(&self) -> Option<RoomId> {
        match self {
            Self::Room(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_in_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unplaced => write!(f, "unplaced"),
            Self::Container(id) => write!(f, "in container {}", id),
            Self::Room(id) => write!(f, "in room {}", id),
            Self::Carried => write!(f, "carried"),
        }
    }
}
