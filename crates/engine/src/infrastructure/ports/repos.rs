//! Repository port traits for item and catalog access.

use std::sync::Arc;

use async_trait::async_trait;
use holdfast_domain::{Item, ItemId, ItemTemplate, TemplateId};

use super::error::RepoError;

/// An item record together with its store version.
///
/// Versions increase on every committed change to the record, and on every
/// change to the set of items directly inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedItem {
    pub item: Item,
    pub version: u64,
}

/// A conditional, all-or-nothing write.
///
/// `expected` lists the versions the writer based its decision on; the commit
/// is rejected with [`RepoError::Conflict`] if any of them changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub expected: Vec<(ItemId, u64)>,
    pub writes: Vec<Item>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

// =============================================================================
// Item Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, id: ItemId) -> Result<Option<VersionedItem>, RepoError>;

    /// Items whose placement is directly inside `container_id`.
    async fn get_children(&self, container_id: ItemId) -> Result<Vec<VersionedItem>, RepoError>;

    async fn list_all(&self) -> Result<Vec<VersionedItem>, RepoError>;

    /// Apply `changes` atomically.
    ///
    /// Implementations must check every expected version and apply every write
    /// as one unit, bump the version of each written item, and bump the
    /// versions of both the previous and the new container parent of any item
    /// whose placement changed. Writes to unknown items fail with `NotFound`.
    async fn commit(&self, changes: ChangeSet) -> Result<(), RepoError>;
}

// =============================================================================
// Catalog
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn get(&self, id: TemplateId) -> Result<Option<Arc<ItemTemplate>>, RepoError>;
}
