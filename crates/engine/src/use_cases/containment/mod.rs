//! Containment use cases.
//!
//! Items nest inside container items to at most [`MAX_NESTING_DEPTH`] levels.
//! Every mutation is validated against the current store state and committed
//! optimistically; the read-only queries share the same validation and
//! capacity code.
//!
//! [`MAX_NESTING_DEPTH`]: holdfast_domain::MAX_NESTING_DEPTH

use std::sync::Arc;

use holdfast_domain::{ItemId, RoomId};
use tokio_util::sync::CancellationToken;

use crate::infrastructure::config::ContainmentConfig;
use crate::infrastructure::ports::{ClockPort, ItemStore, TemplateCatalog};

mod audit;
mod capacity;
mod commit;
mod empty_container;
mod error;
mod graph;
mod queries;
mod remove_item;
mod store_item;
mod transfer_item;
mod types;
mod validation;
mod view;

pub use audit::{AuditReport, ContainmentAudit, InvariantViolation};
pub use empty_container::EmptyContainer;
pub use error::{ContainmentError, ContainmentErrorKind};
pub use queries::ContainmentQueries;
pub use remove_item::RemoveItem;
pub use store_item::StoreItem;
pub use transfer_item::TransferItem;
pub use types::{
    Capacity, ContentEntry, EmptyResult, OperationResult, ProjectedLoad, ValidationResult,
};

/// Ports every containment use case runs against.
#[derive(Clone)]
pub struct ContainmentPorts {
    pub items: Arc<dyn ItemStore>,
    pub catalog: Arc<dyn TemplateCatalog>,
    pub clock: Arc<dyn ClockPort>,
    pub config: ContainmentConfig,
}

/// Containment operations as seen by the game-action layer.
///
/// Rejections come back as unsuccessful result values, never as `Err`.
pub struct ContainmentOps {
    store: StoreItem,
    remove: RemoveItem,
    transfer: TransferItem,
    empty: EmptyContainer,
    queries: ContainmentQueries,
    audit: ContainmentAudit,
}

impl ContainmentOps {
    pub fn new(ports: ContainmentPorts) -> Self {
        Self {
            store: StoreItem::new(ports.clone()),
            remove: RemoveItem::new(ports.clone()),
            transfer: TransferItem::new(ports.clone()),
            empty: EmptyContainer::new(ports.clone()),
            queries: ContainmentQueries::new(ports.clone()),
            audit: ContainmentAudit::new(ports),
        }
    }

    pub async fn store(
        &self,
        item_id: ItemId,
        container_id: ItemId,
        cancel: &CancellationToken,
    ) -> OperationResult {
        let result = self.store.execute(item_id, container_id, cancel).await;
        OperationResult::from_result(result, |_| "Item stored".to_string())
    }

    pub async fn remove(&self, item_id: ItemId, cancel: &CancellationToken) -> OperationResult {
        let result = self.remove.execute(item_id, cancel).await;
        OperationResult::from_result(result, |_| "Item removed from container".to_string())
    }

    pub async fn transfer(
        &self,
        item_id: ItemId,
        source_id: ItemId,
        target_id: ItemId,
        cancel: &CancellationToken,
    ) -> OperationResult {
        let result = self
            .transfer
            .execute(item_id, source_id, target_id, cancel)
            .await;
        OperationResult::from_result(result, |_| "Item transferred".to_string())
    }

    pub async fn empty(
        &self,
        container_id: ItemId,
        target_room: Option<RoomId>,
        cancel: &CancellationToken,
    ) -> EmptyResult {
        self.empty
            .execute(container_id, target_room, cancel)
            .await
            .into()
    }

    pub async fn get_capacity(&self, container_id: ItemId) -> Result<Capacity, ContainmentError> {
        self.queries.get_capacity(container_id).await
    }

    pub async fn can_store(&self, container_id: ItemId, item_id: ItemId) -> ValidationResult {
        self.queries.can_store(container_id, item_id).await.into()
    }

    pub async fn list_contents(
        &self,
        container_id: ItemId,
    ) -> Result<Vec<ContentEntry>, ContainmentError> {
        self.queries.list_contents(container_id).await
    }

    pub async fn audit(&self) -> Result<AuditReport, ContainmentError> {
        self.audit.execute().await
    }
}
