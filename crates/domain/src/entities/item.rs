//! Item entity - A placed or storable instance of a catalog template
//!
//! # Containment
//!
//! Items form a forest through [`Placement::Container`]: each item has at most
//! one container parent. The engine only ever changes placement, ownership
//! and the equip/bind flags; identities are created and destroyed elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{ItemId, OwnerId, Placement, RoomId, TemplateId};

/// An item instance
///
/// Simple data struct: every field combination is representable, the
/// containment rules are enforced by the engine before any change is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub template_id: TemplateId,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub owner_id: Option<OwnerId>,
    /// Number of units in this stack; multiplies template weight and volume
    #[serde(default = "default_stack_size")]
    pub stack_size: u32,
    #[serde(default)]
    pub is_equipped: bool,
    #[serde(default)]
    pub is_bound: bool,
    pub last_modified_at: DateTime<Utc>,
}

fn default_stack_size() -> u32 {
    1
}

impl Item {
    /// A new, unplaced and unowned item.
    pub fn new(template_id: TemplateId, now: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(),
            template_id,
            placement: Placement::Unplaced,
            owner_id: None,
            stack_size: 1,
            is_equipped: false,
            is_bound: false,
            last_modified_at: now,
        }
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = id;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_equipped(mut self, equipped: bool) -> Self {
        self.is_equipped = equipped;
        self
    }

    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an empty stack.
    pub fn with_stack_size(mut self, stack_size: u32) -> Result<Self, DomainError> {
        if stack_size == 0 {
            return Err(DomainError::validation("Stack size must be at least 1"));
        }
        self.stack_size = stack_size;
        Ok(self)
    }

    /// Check a record that was built outside the engine, e.g. deserialized.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an empty stack.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.stack_size == 0 {
            return Err(DomainError::validation(format!(
                "Item {} has a stack size of 0",
                self.id
            )));
        }
        Ok(())
    }

    /// The container this item sits in, if any.
    pub fn container_parent(&self) -> Option<ItemId> {
        self.placement.container()
    }

    /// The room this item lies in directly, if any.
    pub fn room(&self) -> Option<RoomId> {
        self.placement.room()
    }

    /// Placement an item falls back to when it leaves a container without
    /// landing in a room: carried if someone owns it, otherwise unplaced.
    pub fn loose_placement(&self) -> Placement {
        if self.owner_id.is_some() {
            Placement::Carried
        } else {
            Placement::Unplaced
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_modified_at = now;
    }
}
