//! Builder for small containment worlds backed by the in-memory adapters.
//!
//! Items are placed exactly as asked, without validation, so tests can also
//! build the broken shapes the audit is meant to find.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use holdfast_domain::{
    ContainerSpec, Item, ItemId, ItemTemplate, ItemTypeTag, Placement,
};

use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::config::ContainmentConfig;
use crate::infrastructure::memory::{InMemoryCatalog, InMemoryItemStore};
use crate::infrastructure::ports::ItemStore;
use crate::use_cases::containment::{ContainmentOps, ContainmentPorts};

/// Weight and volume of every container template the builder creates.
const CONTAINER_SELF_WEIGHT: f64 = 1.0;

#[derive(Default)]
pub struct ContainmentWorld {
    templates: Vec<ItemTemplate>,
    items: Vec<Item>,
}

impl ContainmentWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn add(&mut self, template: ItemTemplate, placement: Placement) -> ItemId {
        let item = Item::new(template.id, Self::created_at()).with_placement(placement);
        let id = item.id;
        self.templates.push(template);
        self.items.push(item);
        id
    }

    pub fn container(&mut self, name: impl Into<String>, spec: ContainerSpec) -> ItemId {
        self.container_at(name, spec, Placement::Unplaced)
    }

    pub fn container_in(
        &mut self,
        name: impl Into<String>,
        spec: ContainerSpec,
        parent: ItemId,
    ) -> ItemId {
        self.container_at(name, spec, Placement::Container(parent))
    }

    fn container_at(
        &mut self,
        name: impl Into<String>,
        spec: ContainerSpec,
        placement: Placement,
    ) -> ItemId {
        let template = ItemTemplate::new(name)
            .with_weight(CONTAINER_SELF_WEIGHT)
            .with_volume(CONTAINER_SELF_WEIGHT)
            .with_container(spec);
        self.add(template, placement)
    }

    /// A plain item with the given weight and no volume.
    pub fn leaf(&mut self, name: impl Into<String>, weight: f64) -> ItemId {
        self.leaf_with(name, |t| t.with_weight(weight))
    }

    pub fn leaf_in(&mut self, name: impl Into<String>, weight: f64, parent: ItemId) -> ItemId {
        let id = self.leaf(name, weight);
        self.place(id, Placement::Container(parent));
        id
    }

    pub fn typed_leaf(&mut self, name: impl Into<String>, item_type: &str, weight: f64) -> ItemId {
        let tag = ItemTypeTag::new(item_type).unwrap();
        self.leaf_with(name, |t| t.with_type(tag).with_weight(weight))
    }

    pub fn leaf_with(
        &mut self,
        name: impl Into<String>,
        shape: impl FnOnce(ItemTemplate) -> ItemTemplate,
    ) -> ItemId {
        let template = shape(ItemTemplate::new(name));
        self.add(template, Placement::Unplaced)
    }

    pub fn place(&mut self, id: ItemId, placement: Placement) {
        self.edit(id, |item| item.placement = placement);
    }

    pub fn edit(&mut self, id: ItemId, change: impl FnOnce(&mut Item)) {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .unwrap_or_else(|| panic!("no item {} in test world", id));
        change(item);
    }

    pub fn build(self) -> TestWorld {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let store = Arc::new(InMemoryItemStore::from_items(self.items));
        let catalog = Arc::new(InMemoryCatalog::new(self.templates).unwrap());
        let ports = ContainmentPorts {
            items: store.clone(),
            catalog: catalog.clone(),
            clock: Arc::new(FixedClock(now)),
            config: ContainmentConfig::default(),
        };

        TestWorld {
            ops: ContainmentOps::new(ports.clone()),
            ports,
            store,
            catalog,
            now,
        }
    }
}

/// A built world: adapters, the ports over them and a facade.
pub struct TestWorld {
    pub store: Arc<InMemoryItemStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub ops: ContainmentOps,
    /// Time every operation in this world is stamped with
    pub now: DateTime<Utc>,
    ports: ContainmentPorts,
}

impl TestWorld {
    pub fn ports(&self) -> ContainmentPorts {
        self.ports.clone()
    }

    /// Same catalog and clock, different item store.
    pub fn ports_with_store(&self, items: Arc<dyn ItemStore>) -> ContainmentPorts {
        ContainmentPorts {
            items,
            ..self.ports()
        }
    }

    pub async fn item(&self, id: ItemId) -> Item {
        self.store
            .get(id)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("no item {} in test world", id))
            .item
    }

    pub async fn children(&self, id: ItemId) -> Vec<Item> {
        self.store
            .get_children(id)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.item)
            .collect()
    }
}
