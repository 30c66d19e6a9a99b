//! Store item use case.
//!
//! Puts an item inside a container after full validation plus the
//! equipment and ownership rules. Transfers reuse the same plan with an
//! extra source check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use holdfast_domain::{Item, ItemId, Placement};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::commit::{commit_mutation, Mutation, Planned};
use super::error::ContainmentError;
use super::graph;
use super::validation::{check_placement, PlacementCheck};
use super::view::StoreView;
use super::ContainmentPorts;

/// Move one item into a container.
#[derive(Debug, Clone)]
pub(crate) struct PlaceItem {
    pub item_id: ItemId,
    pub container_id: ItemId,
    /// For transfers: the container the item must currently be in.
    pub expected_source: Option<ItemId>,
    pub now: DateTime<Utc>,
}

#[async_trait]
impl Mutation for PlaceItem {
    type Outcome = Item;

    fn name(&self) -> &'static str {
        if self.expected_source.is_some() {
            "transfer"
        } else {
            "store"
        }
    }

    async fn plan(&self, view: &mut StoreView<'_>) -> Result<Planned<Item>, ContainmentError> {
        if let Some(source_id) = self.expected_source {
            let item = view
                .item(self.item_id)
                .await?
                .ok_or(ContainmentError::NotFound {
                    item_id: self.item_id,
                })?;
            if item.container_parent() != Some(source_id) {
                return Err(ContainmentError::NotInSourceContainer {
                    item_id: self.item_id,
                    source_id,
                });
            }
        }

        let check = check_placement(view, self.container_id, self.item_id).await?;
        ensure_reachable(view, &check).await?;

        let PlacementCheck {
            container,
            mut item,
            item_template,
            ..
        } = check;

        item.placement = Placement::Container(container.id);
        if item.owner_id.is_none() {
            if let Some(owner) = container.owner_id {
                item.owner_id = Some(owner);
                if item_template.bind_on_pickup {
                    item.is_bound = true;
                }
            }
        }
        item.touch(self.now);

        Ok(Planned {
            writes: vec![item.clone()],
            outcome: item,
        })
    }
}

/// Equipment and ownership rules on top of structural validation.
async fn ensure_reachable(
    view: &mut StoreView<'_>,
    check: &PlacementCheck,
) -> Result<(), ContainmentError> {
    let item = &check.item;
    if item.is_equipped {
        return Err(ContainmentError::ItemEquipped { item_id: item.id });
    }

    match (check.container.owner_id, item.owner_id) {
        (Some(container_owner), Some(item_owner)) if container_owner != item_owner => {
            Err(ContainmentError::NotOwned { item_id: item.id })
        }
        (Some(_), _) | (None, Some(_)) => Ok(()),
        (None, None) => {
            let Some(room) = graph::resident_room(view, &check.container).await? else {
                return Ok(());
            };
            if graph::resident_room(view, item).await? == Some(room) {
                Ok(())
            } else {
                Err(ContainmentError::NotAccessible { item_id: item.id })
            }
        }
    }
}

/// Store item use case.
pub struct StoreItem {
    ports: ContainmentPorts,
}

impl StoreItem {
    pub fn new(ports: ContainmentPorts) -> Self {
        Self { ports }
    }

    /// Put `item_id` inside `container_id`.
    ///
    /// Validation is always redone here; an earlier `can_store` answer is
    /// never trusted.
    #[instrument(skip(self, cancel), fields(item_id = %item_id, container_id = %container_id))]
    pub async fn execute(
        &self,
        item_id: ItemId,
        container_id: ItemId,
        cancel: &CancellationToken,
    ) -> Result<Item, ContainmentError> {
        let request = PlaceItem {
            item_id,
            container_id,
            expected_source: None,
            now: self.ports.clock.now(),
        };
        let item = commit_mutation(&self.ports, cancel, &request).await?;

        tracing::info!(owner_id = ?item.owner_id, bound = item.is_bound, "Item stored");
        Ok(item)
    }
}
