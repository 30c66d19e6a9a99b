//! In-memory item store with optimistic, versioned commits.
//!
//! Reads take the read lock; a commit checks every expected version and
//! applies every write under a single write lock, so no reader ever observes a
//! half-applied change set.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use holdfast_domain::{Item, ItemId};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{ChangeSet, ItemStore, RepoError, VersionedItem};

/// In-memory item store
pub struct InMemoryItemStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<ItemId, VersionedItem>,
    /// Direct children per container, kept in id order for stable listings
    children: HashMap<ItemId, BTreeSet<ItemId>>,
}

impl Inner {
    fn link(&mut self, item: &Item) {
        if let Some(parent) = item.container_parent() {
            self.children.entry(parent).or_default().insert(item.id);
        }
    }

    fn unlink(&mut self, item_id: ItemId, parent: Option<ItemId>) {
        if let Some(parent) = parent {
            if let Some(set) = self.children.get_mut(&parent) {
                set.remove(&item_id);
                if set.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
    }

    fn insert(&mut self, item: Item) {
        if let Some(previous) = self.records.get(&item.id) {
            let parent = previous.item.container_parent();
            self.unlink(item.id, parent);
        }
        self.link(&item);
        self.records
            .insert(item.id, VersionedItem { item, version: 1 });
    }
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Build a store seeded with existing item records, each at version 1.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut inner = Inner::default();
        for item in items {
            inner.insert(item);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Seed one item record, replacing any record with the same id.
    ///
    /// Item creation belongs to the catalog and spawn layers; this exists for
    /// loading snapshots and for tests.
    pub async fn insert(&self, item: Item) {
        self.inner.write().await.insert(item);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, id: ItemId) -> Result<Option<VersionedItem>, RepoError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn get_children(&self, container_id: ItemId) -> Result<Vec<VersionedItem>, RepoError> {
        let inner = self.inner.read().await;
        let Some(ids) = inner.children.get(&container_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<VersionedItem>, RepoError> {
        let inner = self.inner.read().await;
        let mut all: Vec<VersionedItem> = inner.records.values().cloned().collect();
        all.sort_by_key(|record| record.item.id);
        Ok(all)
    }

    async fn commit(&self, changes: ChangeSet) -> Result<(), RepoError> {
        let mut inner = self.inner.write().await;

        for (id, expected) in &changes.expected {
            match inner.records.get(id) {
                Some(record) if record.version == *expected => {}
                _ => return Err(RepoError::conflict(*id)),
            }
        }
        if let Some(unknown) = changes
            .writes
            .iter()
            .find(|item| !inner.records.contains_key(&item.id))
        {
            return Err(RepoError::not_found("Item", unknown.id));
        }

        let mut bumped = BTreeSet::new();
        for item in changes.writes {
            let previous_parent = inner
                .records
                .get(&item.id)
                .and_then(|record| record.item.container_parent());
            let new_parent = item.container_parent();
            if previous_parent != new_parent {
                inner.unlink(item.id, previous_parent);
                inner.link(&item);
                bumped.extend(previous_parent);
                bumped.extend(new_parent);
            }
            bumped.insert(item.id);
            if let Some(record) = inner.records.get_mut(&item.id) {
                record.item = item;
            }
        }

        for id in bumped {
            if let Some(record) = inner.records.get_mut(&id) {
                record.version += 1;
            }
        }
        Ok(())
    }
}
