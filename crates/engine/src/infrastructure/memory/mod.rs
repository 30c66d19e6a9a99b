//! In-memory adapters for the item store and template catalog.

mod catalog;
mod item_store;
mod snapshot;

pub use catalog::InMemoryCatalog;
pub use item_store::InMemoryItemStore;
pub use snapshot::WorldSnapshot;
