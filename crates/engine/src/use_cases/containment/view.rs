//! Read-tracking view over the item store.
//!
//! Each operation attempt reads through one `StoreView`. The view remembers
//! the first version it saw of every item, and that read set becomes the
//! expected versions of the attempt's commit. Any item read during validation
//! that changes before the commit, including a container whose set of
//! children changes, turns the commit into a conflict.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use holdfast_domain::{Item, ItemId, ItemTemplate, TemplateId};

use crate::infrastructure::ports::{
    ChangeSet, ItemStore, RepoError, TemplateCatalog, VersionedItem,
};

pub(crate) struct StoreView<'a> {
    items: &'a dyn ItemStore,
    catalog: &'a dyn TemplateCatalog,
    read_set: BTreeMap<ItemId, u64>,
    templates: HashMap<TemplateId, Arc<ItemTemplate>>,
}

impl<'a> StoreView<'a> {
    pub(crate) fn new(items: &'a dyn ItemStore, catalog: &'a dyn TemplateCatalog) -> Self {
        Self {
            items,
            catalog,
            read_set: BTreeMap::new(),
            templates: HashMap::new(),
        }
    }

    fn record(&mut self, record: VersionedItem) -> Item {
        self.read_set
            .entry(record.item.id)
            .or_insert(record.version);
        record.item
    }

    pub(crate) async fn item(&mut self, id: ItemId) -> Result<Option<Item>, RepoError> {
        let record = self.items.get(id).await?;
        Ok(record.map(|r| self.record(r)))
    }

    pub(crate) async fn children(&mut self, container_id: ItemId) -> Result<Vec<Item>, RepoError> {
        let records = self.items.get_children(container_id).await?;
        Ok(records.into_iter().map(|r| self.record(r)).collect())
    }

    pub(crate) async fn template(
        &mut self,
        id: TemplateId,
    ) -> Result<Option<Arc<ItemTemplate>>, RepoError> {
        if let Some(cached) = self.templates.get(&id) {
            return Ok(Some(Arc::clone(cached)));
        }
        let found = self.catalog.get(id).await?;
        if let Some(template) = &found {
            self.templates.insert(id, Arc::clone(template));
        }
        Ok(found)
    }

    /// Template of an item that is known to exist. A dangling template
    /// reference is corrupt catalog data and surfaces as a store error.
    pub(crate) async fn template_of(&mut self, item: &Item) -> Result<Arc<ItemTemplate>, RepoError> {
        self.template(item.template_id)
            .await?
            .ok_or_else(|| RepoError::not_found("ItemTemplate", item.template_id))
    }

    pub(crate) fn read_set_len(&self) -> usize {
        self.read_set.len()
    }

    pub(crate) fn into_change_set(self, writes: Vec<Item>) -> ChangeSet {
        ChangeSet {
            expected: self.read_set.into_iter().collect(),
            writes,
        }
    }
}
