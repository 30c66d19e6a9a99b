//! Test fixtures: in-memory containment worlds built item by item.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut world = ContainmentWorld::new();
//! let chest = world.container("Chest", ContainerSpec::default().with_max_weight(10.0));
//! let rock = world.leaf_in("Rock", 5.0, chest);
//! let world = world.build();
//! let result = world.ops.can_store(chest, rock).await;
//! ```

pub mod world_builder;

pub use world_builder::{ContainmentWorld, TestWorld};
