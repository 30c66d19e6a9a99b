//! Transfer item use case.
//!
//! Moves an item directly from one container into another. The item is
//! written once, so there is no moment in which it sits in neither.

use holdfast_domain::{Item, ItemId};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::commit::commit_mutation;
use super::error::ContainmentError;
use super::store_item::PlaceItem;
use super::ContainmentPorts;

/// Transfer item use case.
pub struct TransferItem {
    ports: ContainmentPorts,
}

impl TransferItem {
    pub fn new(ports: ContainmentPorts) -> Self {
        Self { ports }
    }

    /// Move `item_id` from `source_id` into `target_id`.
    ///
    /// # Returns
    /// * `Ok(Item)` - The item as committed inside `target_id`
    /// * `Err(ContainmentError::NotInSourceContainer)` - The item is not directly inside `source_id`
    /// * `Err(ContainmentError)` - Any rejection a plain store would give for `target_id`
    #[instrument(
        skip(self, cancel),
        fields(item_id = %item_id, source_id = %source_id, target_id = %target_id)
    )]
    pub async fn execute(
        &self,
        item_id: ItemId,
        source_id: ItemId,
        target_id: ItemId,
        cancel: &CancellationToken,
    ) -> Result<Item, ContainmentError> {
        let request = PlaceItem {
            item_id,
            container_id: target_id,
            expected_source: Some(source_id),
            now: self.ports.clock.now(),
        };
        let item = commit_mutation(&self.ports, cancel, &request).await?;

        tracing::info!("Item transferred between containers");
        Ok(item)
    }
}
