//! In-memory template catalog.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use holdfast_domain::{DomainError, ItemTemplate, TemplateId};

use crate::infrastructure::ports::{RepoError, TemplateCatalog};

/// Immutable template catalog, validated once at load time
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    templates: HashMap<TemplateId, Arc<ItemTemplate>>,
}

impl InMemoryCatalog {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a template has invalid numbers or
    /// if two templates share an id.
    pub fn new(templates: impl IntoIterator<Item = ItemTemplate>) -> Result<Self, DomainError> {
        let mut map = HashMap::new();
        for template in templates {
            template.validate()?;
            let id = template.id;
            if map.insert(id, Arc::new(template)).is_some() {
                return Err(DomainError::validation(format!(
                    "Duplicate template id {}",
                    id
                )));
            }
        }
        Ok(Self { templates: map })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[async_trait]
impl TemplateCatalog for InMemoryCatalog {
    async fn get(&self, id: TemplateId) -> Result<Option<Arc<ItemTemplate>>, RepoError> {
        Ok(self.templates.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_loaded_templates() {
        let sword = ItemTemplate::new("Sword").with_weight(3.0);
        let id = sword.id;
        let catalog = InMemoryCatalog::new([sword]).unwrap();

        let found = catalog.get(id).await.unwrap().unwrap();
        assert_eq!(found.name, "Sword");
        assert!(catalog.get(TemplateId::new()).await.unwrap().is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let a = ItemTemplate::new("A");
        let b = ItemTemplate::new("B").with_id(a.id);
        assert!(InMemoryCatalog::new([a, b]).is_err());
    }

    #[test]
    fn rejects_invalid_templates() {
        let bad = ItemTemplate::new("Bad").with_volume(-3.0);
        assert!(InMemoryCatalog::new([bad]).is_err());
    }
}
