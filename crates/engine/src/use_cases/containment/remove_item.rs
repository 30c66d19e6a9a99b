//! Remove item use case.
//!
//! Takes an item out of its container. The item ends up carried by its
//! owner, or unplaced when nobody owns it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use holdfast_domain::{Item, ItemId};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::commit::{commit_mutation, Mutation, Planned};
use super::error::ContainmentError;
use super::view::StoreView;
use super::ContainmentPorts;

struct TakeOut {
    item_id: ItemId,
    now: DateTime<Utc>,
}

#[async_trait]
impl Mutation for TakeOut {
    type Outcome = (Item, ItemId);

    fn name(&self) -> &'static str {
        "remove"
    }

    async fn plan(
        &self,
        view: &mut StoreView<'_>,
    ) -> Result<Planned<(Item, ItemId)>, ContainmentError> {
        let mut item = view
            .item(self.item_id)
            .await?
            .ok_or(ContainmentError::NotFound {
                item_id: self.item_id,
            })?;
        let Some(container_id) = item.container_parent() else {
            return Err(ContainmentError::NotInContainer {
                item_id: self.item_id,
            });
        };
        // Pin the parent's version so a concurrent empty of the same
        // container conflicts with this removal.
        view.item(container_id).await?;

        item.placement = item.loose_placement();
        item.touch(self.now);
        Ok(Planned {
            writes: vec![item.clone()],
            outcome: (item, container_id),
        })
    }
}

/// Remove item use case.
pub struct RemoveItem {
    ports: ContainmentPorts,
}

impl RemoveItem {
    pub fn new(ports: ContainmentPorts) -> Self {
        Self { ports }
    }

    #[instrument(skip(self, cancel), fields(item_id = %item_id))]
    pub async fn execute(
        &self,
        item_id: ItemId,
        cancel: &CancellationToken,
    ) -> Result<Item, ContainmentError> {
        let request = TakeOut {
            item_id,
            now: self.ports.clock.now(),
        };
        let (item, container_id) = commit_mutation(&self.ports, cancel, &request).await?;

        tracing::info!(container_id = %container_id, placement = %item.placement, "Item removed from container");
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::ContainmentWorld;
    use crate::use_cases::containment::store_item::StoreItem;
    use crate::use_cases::containment::ContainmentErrorKind;
    use holdfast_domain::{ContainerSpec, OwnerId, Placement};

    #[tokio::test]
    async fn removed_item_is_loose_and_unowned() {
        let mut world = ContainmentWorld::new();
        let chest = world.container("Chest", ContainerSpec::default());
        let rock = world.leaf_in("Rock", 1.0, chest);
        let world = world.build();

        let item = RemoveItem::new(world.ports())
            .execute(rock, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(item.placement, Placement::Unplaced);
        assert_eq!(item.last_modified_at, world.now);
        assert!(world.children(chest).await.is_empty());
    }

    #[tokio::test]
    async fn owned_item_goes_back_to_its_owner() {
        let owner = OwnerId::new();
        let mut world = ContainmentWorld::new();
        let pack = world.container("Pack", ContainerSpec::default());
        let ring = world.leaf_in("Ring", 0.1, pack);
        world.edit(ring, |i| i.owner_id = Some(owner));
        let world = world.build();

        let item = RemoveItem::new(world.ports())
            .execute(ring, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(item.placement, Placement::Carried);
        assert_eq!(item.owner_id, Some(owner));
    }

    #[tokio::test]
    async fn loose_item_is_not_in_container() {
        let mut world = ContainmentWorld::new();
        let rock = world.leaf("Rock", 1.0);
        let world = world.build();

        let err = RemoveItem::new(world.ports())
            .execute(rock, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ContainmentErrorKind::NotInContainer);
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let world = ContainmentWorld::new().build();

        let err = RemoveItem::new(world.ports())
            .execute(ItemId::new(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ContainmentErrorKind::NotFound);
    }

    #[tokio::test]
    async fn store_then_remove_restores_the_item() {
        let mut world = ContainmentWorld::new();
        let chest = world.container("Chest", ContainerSpec::default());
        let rock = world.leaf("Rock", 1.0);
        let world = world.build();
        let before = world.item(rock).await;

        StoreItem::new(world.ports())
            .execute(rock, chest, &CancellationToken::new())
            .await
            .unwrap();
        let after = RemoveItem::new(world.ports())
            .execute(rock, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(after.placement, before.placement);
        assert_eq!(after.owner_id, before.owner_id);
        assert_eq!(after.is_bound, before.is_bound);
        assert!(world.children(chest).await.is_empty());
    }
}
