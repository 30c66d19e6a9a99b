//! Read-only containment queries: dry-run validation, capacity and contents.
//!
//! Nothing here commits, so a query never conflicts and never retries. Every
//! answer is computed from the store as it is at call time.

use std::sync::Arc;

use holdfast_domain::{ContainerSpec, Item, ItemId, ItemTemplate};
use tracing::instrument;

use super::capacity::{ContentsTree, Measure};
use super::error::ContainmentError;
use super::types::{Capacity, ContentEntry, ProjectedLoad};
use super::validation::check_placement;
use super::view::StoreView;
use super::ContainmentPorts;

/// Containment queries.
pub struct ContainmentQueries {
    ports: ContainmentPorts,
}

impl ContainmentQueries {
    pub fn new(ports: ContainmentPorts) -> Self {
        Self { ports }
    }

    fn view(&self) -> StoreView<'_> {
        StoreView::new(self.ports.items.as_ref(), self.ports.catalog.as_ref())
    }

    /// Structural validation of storing `item_id` in `container_id`.
    ///
    /// Equipment and ownership are only checked by the store itself.
    #[instrument(skip(self), fields(item_id = %item_id, container_id = %container_id))]
    pub async fn can_store(
        &self,
        container_id: ItemId,
        item_id: ItemId,
    ) -> Result<ProjectedLoad, ContainmentError> {
        let mut view = self.view();
        let check = check_placement(&mut view, container_id, item_id).await?;
        Ok(check.projected)
    }

    #[instrument(skip(self), fields(container_id = %container_id))]
    pub async fn get_capacity(&self, container_id: ItemId) -> Result<Capacity, ContainmentError> {
        let mut view = self.view();
        let (container, spec) = load_container(&mut view, container_id).await?;
        let tree = ContentsTree::load(&mut view, &container).await?;

        Ok(Capacity {
            container_id,
            current_weight: tree.contained(container_id, Measure::Weight),
            max_weight: spec.max_weight,
            current_volume: tree.contained(container_id, Measure::Volume),
            max_volume: spec.max_volume,
            item_count: tree.item_count(container_id),
            max_items: spec.max_items,
            allowed_types: spec.allowed_types,
        })
    }

    /// Direct children of a container with their effective contribution.
    #[instrument(skip(self), fields(container_id = %container_id))]
    pub async fn list_contents(
        &self,
        container_id: ItemId,
    ) -> Result<Vec<ContentEntry>, ContainmentError> {
        let mut view = self.view();
        let (container, _) = load_container(&mut view, container_id).await?;
        let tree = ContentsTree::load(&mut view, &container).await?;
        if tree.is_truncated() {
            tracing::warn!("Contents are nested deeper than allowed; listed weights are partial");
        }

        Ok(tree
            .children(container_id)
            .iter()
            .filter_map(|id| {
                let item = tree.item(*id)?;
                let template = tree.template(*id)?;
                Some(ContentEntry {
                    item: item.clone(),
                    template_name: template.name.clone(),
                    effective_weight: tree.contribution(*id, Measure::Weight),
                    effective_volume: tree.contribution(*id, Measure::Volume),
                })
            })
            .collect())
    }
}

async fn load_container(
    view: &mut StoreView<'_>,
    container_id: ItemId,
) -> Result<(Item, ContainerSpec), ContainmentError> {
    let invalid = || ContainmentError::InvalidContainer { container_id };
    let container = view.item(container_id).await?.ok_or_else(invalid)?;
    let spec = view
        .template(container.template_id)
        .await?
        .and_then(|t: Arc<ItemTemplate>| t.container.clone())
        .ok_or_else(invalid)?;
    Ok((container, spec))
}
