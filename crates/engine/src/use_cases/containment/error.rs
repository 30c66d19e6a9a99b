//! Containment operation errors.
//!
//! Every expected rejection is a variant here and travels as a plain `Err`.
//! Store failures collapse into [`ContainmentError::TransientStoreFailure`],
//! which carries nothing from the store; the detail is logged instead.

use holdfast_domain::{ItemId, MAX_NESTING_DEPTH};
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::RepoError;

/// Errors that can occur during containment operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContainmentError {
    #[error("Item not found: {item_id}")]
    NotFound { item_id: ItemId },

    #[error("{container_id} is not a container")]
    InvalidContainer { container_id: ItemId },

    #[error("An item cannot be put inside itself")]
    SelfContainment { item_id: ItemId },

    #[error("Cannot put {item_id} inside {container_id}: it already contains that container")]
    CircularReference {
        item_id: ItemId,
        container_id: ItemId,
    },

    #[error("Containers nested too deep ({depth} > {max})")]
    DepthExceeded { depth: usize, max: usize },

    #[error("This container only accepts: {allowed}")]
    TypeNotAllowed {
        item_type: Option<String>,
        allowed: String,
    },

    #[error("too heavy ({projected:.2}/{max:.2})")]
    WeightExceeded {
        container_id: ItemId,
        projected: f64,
        max: f64,
    },

    #[error("too bulky ({projected:.2}/{max:.2})")]
    VolumeExceeded {
        container_id: ItemId,
        projected: f64,
        max: f64,
    },

    #[error("Container full: {current}/{max} items")]
    ContainerFull {
        container_id: ItemId,
        current: u32,
        max: u32,
    },

    #[error("Item is equipped; unequip it first")]
    ItemEquipped { item_id: ItemId },

    #[error("Item belongs to someone else")]
    NotOwned { item_id: ItemId },

    #[error("Item is not within reach of the container")]
    NotAccessible { item_id: ItemId },

    #[error("Item is not in a container")]
    NotInContainer { item_id: ItemId },

    #[error("Item is not in the source container")]
    NotInSourceContainer { item_id: ItemId, source_id: ItemId },

    #[error("Storage is temporarily unavailable, please try again")]
    TransientStoreFailure,

    #[error("Operation cancelled")]
    Cancelled,
}

/// Fieldless discriminant of [`ContainmentError`], for assertions and wire mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentErrorKind {
    NotFound,
    InvalidContainer,
    SelfContainment,
    CircularReference,
    DepthExceeded,
    TypeNotAllowed,
    WeightExceeded,
    VolumeExceeded,
    ContainerFull,
    ItemEquipped,
    NotOwned,
    NotAccessible,
    NotInContainer,
    NotInSourceContainer,
    TransientStoreFailure,
    Cancelled,
}

impl ContainmentError {
    pub fn kind(&self) -> ContainmentErrorKind {
        match self {
            Self::NotFound { .. } => ContainmentErrorKind::NotFound,
            Self::InvalidContainer { .. } => ContainmentErrorKind::InvalidContainer,
            Self::SelfContainment { .. } => ContainmentErrorKind::SelfContainment,
            Self::CircularReference { .. } => ContainmentErrorKind::CircularReference,
            Self::DepthExceeded { .. } => ContainmentErrorKind::DepthExceeded,
            Self::TypeNotAllowed { .. } => ContainmentErrorKind::TypeNotAllowed,
            Self::WeightExceeded { .. } => ContainmentErrorKind::WeightExceeded,
            Self::VolumeExceeded { .. } => ContainmentErrorKind::VolumeExceeded,
            Self::ContainerFull { .. } => ContainmentErrorKind::ContainerFull,
            Self::ItemEquipped { .. } => ContainmentErrorKind::ItemEquipped,
            Self::NotOwned { .. } => ContainmentErrorKind::NotOwned,
            Self::NotAccessible { .. } => ContainmentErrorKind::NotAccessible,
            Self::NotInContainer { .. } => ContainmentErrorKind::NotInContainer,
            Self::NotInSourceContainer { .. } => ContainmentErrorKind::NotInSourceContainer,
            Self::TransientStoreFailure => ContainmentErrorKind::TransientStoreFailure,
            Self::Cancelled => ContainmentErrorKind::Cancelled,
        }
    }

    pub(crate) fn depth_exceeded(depth: usize) -> Self {
        Self::DepthExceeded {
            depth,
            max: MAX_NESTING_DEPTH,
        }
    }

    /// Whether the caller may reasonably retry the same request unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStoreFailure)
    }
}

impl From<RepoError> for ContainmentError {
    fn from(err: RepoError) -> Self {
        // Callers run inside an operation span carrying the ids involved.
        tracing::error!(error = %err, "Item store failure during containment operation");
        Self::TransientStoreFailure
    }
}
