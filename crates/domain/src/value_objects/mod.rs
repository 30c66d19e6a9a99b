//! Value objects - Immutable objects defined by their attributes

mod item_type;
mod placement;
mod reduction;

pub use item_type::{ItemTypeSet, ItemTypeTag};
pub use placement::Placement;
pub use reduction::ReductionFactor;
