//! Holdfast domain: items, catalog templates and the values the containment
//! engine reasons about.

extern crate self as holdfast_domain;

pub mod containment;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use containment::{MAX_NESTING_DEPTH, WALK_LIMIT};
pub use entities::{ContainerSpec, Item, ItemTemplate};
pub use error::DomainError;
pub use ids::{ItemId, OwnerId, RoomId, TemplateId};
pub use value_objects::{ItemTypeSet, ItemTypeTag, Placement, ReductionFactor};
