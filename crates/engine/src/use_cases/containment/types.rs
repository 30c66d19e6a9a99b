//! Containment result types handed to the game-action layer.

use holdfast_domain::{Item, ItemId, ItemTypeSet};
use serde::Serialize;

use super::error::{ContainmentError, ContainmentErrorKind};

/// Load of a container after a candidate placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectedLoad {
    pub weight: f64,
    pub volume: f64,
    pub item_count: u32,
}

/// Result of `store`, `remove` and `transfer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    /// The item as committed, on success
    pub affected_item: Option<Item>,
    pub error: Option<ContainmentErrorKind>,
}

impl OperationResult {
    pub(crate) fn from_result(
        result: Result<Item, ContainmentError>,
        success_message: impl FnOnce(&Item) -> String,
    ) -> Self {
        match result {
            Ok(item) => Self {
                success: true,
                message: success_message(&item),
                affected_item: Some(item),
                error: None,
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
                affected_item: None,
                error: Some(err.kind()),
            },
        }
    }
}

/// Result of `empty`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyResult {
    pub success: bool,
    pub items_moved: usize,
    pub message: String,
    pub error: Option<ContainmentErrorKind>,
}

impl From<Result<usize, ContainmentError>> for EmptyResult {
    fn from(result: Result<usize, ContainmentError>) -> Self {
        match result {
            Ok(moved) => Self {
                success: true,
                items_moved: moved,
                message: match moved {
                    0 => "The container is already empty".to_string(),
                    1 => "Moved 1 item out of the container".to_string(),
                    n => format!("Moved {} items out of the container", n),
                },
                error: None,
            },
            Err(err) => Self {
                success: false,
                items_moved: 0,
                message: err.to_string(),
                error: Some(err.kind()),
            },
        }
    }
}

/// Result of the `can_store` dry run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub can_store: bool,
    /// Human readable rejection reason
    pub reason: Option<String>,
    pub rejection: Option<ContainmentErrorKind>,
    /// Load of the target container if the item were stored
    pub projected: Option<ProjectedLoad>,
}

impl From<Result<ProjectedLoad, ContainmentError>> for ValidationResult {
    fn from(result: Result<ProjectedLoad, ContainmentError>) -> Self {
        match result {
            Ok(projected) => Self {
                can_store: true,
                reason: None,
                rejection: None,
                projected: Some(projected),
            },
            Err(err) => Self {
                can_store: false,
                reason: Some(err.to_string()),
                rejection: Some(err.kind()),
                projected: None,
            },
        }
    }
}

/// Read-only capacity projection of a container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capacity {
    pub container_id: ItemId,
    pub current_weight: f64,
    pub max_weight: Option<f64>,
    pub current_volume: f64,
    pub max_volume: Option<f64>,
    pub item_count: u32,
    pub max_items: Option<u32>,
    pub allowed_types: ItemTypeSet,
}

/// One direct child of a container, with what it contributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentEntry {
    pub item: Item,
    pub template_name: String,
    pub effective_weight: f64,
    pub effective_volume: f64,
}
