//! JSON world snapshots used to seed the in-memory adapters.

use std::path::Path;

use holdfast_domain::{Item, ItemTemplate};
use serde::{Deserialize, Serialize};

use super::{InMemoryCatalog, InMemoryItemStore};
use crate::infrastructure::ports::RepoError;

/// Templates and item records as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub templates: Vec<ItemTemplate>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl WorldSnapshot {
    pub fn from_json(json: &str) -> Result<Self, RepoError> {
        serde_json::from_str(json).map_err(RepoError::serialization)
    }

    pub async fn read(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RepoError::database("read_snapshot", format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Split into the two in-memory adapters, rejecting invalid records.
    pub fn into_adapters(self) -> Result<(InMemoryItemStore, InMemoryCatalog), RepoError> {
        let catalog =
            InMemoryCatalog::new(self.templates).map_err(RepoError::serialization)?;
        for item in &self.items {
            item.validate().map_err(RepoError::serialization)?;
        }
        Ok((InMemoryItemStore::from_items(self.items), catalog))
    }
}
