//! Item templates - immutable catalog metadata shared by item instances
//!
//! A template describes what an item *is*: its base weight and volume, its
//! type tag, and, for containers, what it can hold. Instances only reference
//! a template by id; the engine never mutates templates.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{ItemTypeSet, ItemTypeTag, ReductionFactor, TemplateId};

/// Catalog metadata for an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: TemplateId,
    pub name: String,
    /// Type tag checked against container restrictions (e.g. "weapon", "arrow")
    #[serde(default)]
    pub item_type: Option<ItemTypeTag>,
    /// Base weight of a single unit
    #[serde(default)]
    pub weight: f64,
    /// Base volume of a single unit
    #[serde(default)]
    pub volume: f64,
    /// Whether the item binds to the first owner it acquires through placement
    #[serde(default)]
    pub bind_on_pickup: bool,
    /// Present only for items that can hold other items
    #[serde(default)]
    pub container: Option<ContainerSpec>,
}

/// Container capabilities of a template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Maximum summed effective weight of direct children (None = unbounded)
    #[serde(default)]
    pub max_weight: Option<f64>,
    /// Maximum summed effective volume of direct children (None = unbounded)
    #[serde(default)]
    pub max_volume: Option<f64>,
    /// Maximum number of direct children (None = unbounded)
    #[serde(default)]
    pub max_items: Option<u32>,
    /// Accepted child types (empty = anything)
    #[serde(default)]
    pub allowed_types: ItemTypeSet,
    #[serde(default)]
    pub weight_reduction: ReductionFactor,
    #[serde(default)]
    pub volume_reduction: ReductionFactor,
}

impl ItemTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TemplateId::new(),
            name: name.into(),
            item_type: None,
            weight: 0.0,
            volume: 0.0,
            bind_on_pickup: false,
            container: None,
        }
    }

    pub fn with_id(mut self, id: TemplateId) -> Self {
        self.id = id;
        self
    }

    pub fn with_type(mut self, item_type: ItemTypeTag) -> Self {
        self.item_type = Some(item_type);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_bind_on_pickup(mut self, bind_on_pickup: bool) -> Self {
        self.bind_on_pickup = bind_on_pickup;
        self
    }

    pub fn with_container(mut self, container: ContainerSpec) -> Self {
        self.container = Some(container);
        self
    }

    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }

    /// Check numeric fields loaded from external catalog data.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a weight, volume or capacity is
    /// negative or not finite.
    pub fn validate(&self) -> Result<(), DomainError> {
        check_amount(&self.name, "weight", self.weight)?;
        check_amount(&self.name, "volume", self.volume)?;
        if let Some(spec) = &self.container {
            if let Some(max) = spec.max_weight {
                check_amount(&self.name, "max weight", max)?;
            }
            if let Some(max) = spec.max_volume {
                check_amount(&self.name, "max volume", max)?;
            }
        }
        Ok(())
    }
}

fn check_amount(template: &str, field: &str, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "Template '{}' has invalid {}: {}",
            template, field, value
        )));
    }
    Ok(())
}

impl ContainerSpec {
    pub fn with_max_weight(mut self, max: f64) -> Self {
        self.max_weight = Some(max);
        self
    }

    pub fn with_max_volume(mut self, max: f64) -> Self {
        self.max_volume = Some(max);
        self
    }

    pub fn with_max_items(mut self, max: u32) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn with_allowed_types(mut self, allowed: ItemTypeSet) -> Self {
        self.allowed_types = allowed;
        self
    }

    pub fn with_weight_reduction(mut self, factor: ReductionFactor) -> Self {
        self.weight_reduction = factor;
        self
    }

    pub fn with_volume_reduction(mut self, factor: ReductionFactor) -> Self {
        self.volume_reduction = factor;
        self
    }
}
