//! Domain entities - Core business objects with identity

mod item;
mod item_template;

pub use item::Item;
pub use item_template::{ContainerSpec, ItemTemplate};
