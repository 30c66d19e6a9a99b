//! Empty container use case.
//!
//! Moves every direct child of a container out in one commit. Children of an
//! unowned container are dropped in the target room, or else in the room the
//! container's outermost holder stands in, and lose their owner. Otherwise
//! they go back to whoever owns them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use holdfast_domain::{ItemId, Placement, RoomId};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::commit::{commit_mutation, Mutation, Planned};
use super::error::ContainmentError;
use super::graph;
use super::view::StoreView;
use super::ContainmentPorts;

struct EmptyOut {
    container_id: ItemId,
    target_room: Option<RoomId>,
    now: DateTime<Utc>,
}

#[async_trait]
impl Mutation for EmptyOut {
    type Outcome = usize;

    fn name(&self) -> &'static str {
        "empty"
    }

    async fn plan(&self, view: &mut StoreView<'_>) -> Result<Planned<usize>, ContainmentError> {
        let invalid = ContainmentError::InvalidContainer {
            container_id: self.container_id,
        };
        let Some(container) = view.item(self.container_id).await? else {
            return Err(invalid);
        };
        let is_container = view
            .template(container.template_id)
            .await?
            .is_some_and(|t| t.is_container());
        if !is_container {
            return Err(invalid);
        }

        let children = view.children(self.container_id).await?;
        if children.is_empty() {
            return Ok(Planned::nothing(0));
        }

        let drop_room = match (container.owner_id, self.target_room) {
            (Some(_), _) => None,
            (None, Some(room)) => Some(room),
            (None, None) => graph::resident_room(view, &container).await?,
        };

        let writes: Vec<_> = children
            .into_iter()
            .map(|mut child| {
                match drop_room {
                    Some(room) => {
                        child.placement = Placement::Room(room);
                        child.owner_id = None;
                    }
                    None => child.placement = child.loose_placement(),
                }
                child.touch(self.now);
                child
            })
            .collect();
        let moved = writes.len();

        Ok(Planned {
            writes,
            outcome: moved,
        })
    }
}

/// Empty container use case.
pub struct EmptyContainer {
    ports: ContainmentPorts,
}

impl EmptyContainer {
    pub fn new(ports: ContainmentPorts) -> Self {
        Self { ports }
    }

    /// Move every direct child of `container_id` out, returning how many moved.
    ///
    /// `target_room` overrides the container's resident room as the drop point.
    #[instrument(skip(self, cancel), fields(container_id = %container_id, target_room = ?target_room))]
    pub async fn execute(
        &self,
        container_id: ItemId,
        target_room: Option<RoomId>,
        cancel: &CancellationToken,
    ) -> Result<usize, ContainmentError> {
        let request = EmptyOut {
            container_id,
            target_room,
            now: self.ports.clock.now(),
        };
        let moved = commit_mutation(&self.ports, cancel, &request).await?;

        tracing::info!(items_moved = moved, "Container emptied");
        Ok(moved)
    }
}
