//! Weight and volume accounting for nested containers.
//!
//! A [`ContentsTree`] is an arena of items keyed by id, each with its template
//! and its direct children. It is loaded fresh from the store for every check
//! and never cached, so concurrent changes to sibling containers cannot leave
//! a stale aggregate behind.
//!
//! Effective weight of an item:
//!
//! ```text
//! weight * stack_size + reduction * sum(effective weight of each child)
//! ```
//!
//! where `reduction` is the item's own container reduction factor. Volume
//! mirrors weight with the volume reduction factor.

use std::collections::HashMap;
use std::sync::Arc;

use holdfast_domain::{
    ContainerSpec, Item, ItemId, ItemTemplate, Placement, ReductionFactor, WALK_LIMIT,
};

use super::view::StoreView;
use crate::infrastructure::ports::RepoError;

/// Slack allowed when comparing accumulated floating point loads to a maximum.
const CAPACITY_EPSILON: f64 = 1e-9;

/// Which quantity a capacity computation aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Measure {
    Weight,
    Volume,
}

impl Measure {
    pub const ALL: [Measure; 2] = [Measure::Weight, Measure::Volume];

    fn base(self, template: &ItemTemplate) -> f64 {
        match self {
            Self::Weight => template.weight,
            Self::Volume => template.volume,
        }
    }

    fn reduction(self, spec: &ContainerSpec) -> ReductionFactor {
        match self {
            Self::Weight => spec.weight_reduction,
            Self::Volume => spec.volume_reduction,
        }
    }

    pub fn max(self, spec: &ContainerSpec) -> Option<f64> {
        match self {
            Self::Weight => spec.max_weight,
            Self::Volume => spec.max_volume,
        }
    }
}

/// Whether `load` is over `max`, allowing for float accumulation error.
pub(crate) fn exceeds(load: f64, max: f64) -> bool {
    load > max + CAPACITY_EPSILON
}

#[derive(Debug, Clone)]
struct Node {
    item: Item,
    template: Arc<ItemTemplate>,
    children: Vec<ItemId>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ContentsTree {
    nodes: HashMap<ItemId, Node>,
    truncated: bool,
}

impl ContentsTree {
    /// Load `root` and everything below it, at most `WALK_LIMIT` levels deep.
    pub async fn load(view: &mut StoreView<'_>, root: &Item) -> Result<Self, RepoError> {
        let mut tree = Self::default();
        tree.graft(view, root).await?;
        Ok(tree)
    }

    /// Add `root`'s subtree unless `root` is already part of this tree.
    pub async fn graft(&mut self, view: &mut StoreView<'_>, root: &Item) -> Result<(), RepoError> {
        if self.nodes.contains_key(&root.id) {
            return Ok(());
        }
        let template = view.template_of(root).await?;
        self.nodes.insert(
            root.id,
            Node {
                item: root.clone(),
                template,
                children: Vec::new(),
            },
        );

        let mut frontier = vec![root.id];
        for _level in 0..WALK_LIMIT {
            let mut next = Vec::new();
            for parent_id in frontier {
                for child in view.children(parent_id).await? {
                    if self.nodes.contains_key(&child.id) {
                        tracing::warn!(
                            item_id = %child.id,
                            parent_id = %parent_id,
                            "Item reached twice while loading contents; skipping"
                        );
                        continue;
                    }
                    let template = view.template_of(&child).await?;
                    if let Some(parent) = self.nodes.get_mut(&parent_id) {
                        parent.children.push(child.id);
                    }
                    next.push(child.id);
                    self.nodes.insert(
                        child.id,
                        Node {
                            item: child,
                            template,
                            children: Vec::new(),
                        },
                    );
                }
            }
            if next.is_empty() {
                return Ok(());
            }
            frontier = next;
        }

        tracing::warn!(
            root_id = %root.id,
            limit = WALK_LIMIT,
            "Contents load hit its level bound; deeper items are not counted"
        );
        self.truncated = true;
        Ok(())
    }

    /// Build a tree from complete item records, linking children through
    /// their parent pointers. Parents missing from `records` are ignored.
    pub fn from_records(records: impl IntoIterator<Item = (Item, Arc<ItemTemplate>)>) -> Self {
        let mut nodes: HashMap<ItemId, Node> = records
            .into_iter()
            .map(|(item, template)| {
                (
                    item.id,
                    Node {
                        item,
                        template,
                        children: Vec::new(),
                    },
                )
            })
            .collect();

        let mut links: Vec<(ItemId, ItemId)> = nodes
            .values()
            .filter_map(|n| n.item.container_parent().map(|p| (p, n.item.id)))
            .collect();
        links.sort();
        for (parent_id, child_id) in links {
            if let Some(parent) = nodes.get_mut(&parent_id) {
                parent.children.push(child_id);
            }
        }

        Self {
            nodes,
            truncated: false,
        }
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.nodes.get(&id).map(|n| &n.item)
    }

    pub fn template(&self, id: ItemId) -> Option<&Arc<ItemTemplate>> {
        self.nodes.get(&id).map(|n| &n.template)
    }

    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Number of direct children.
    pub fn item_count(&self, id: ItemId) -> u32 {
        u32::try_from(self.children(id).len()).unwrap_or(u32::MAX)
    }

    /// Effective weight or volume of `id`, including its reduced contents.
    #[cfg(test)]
    pub fn effective(&self, id: ItemId, measure: Measure) -> f64 {
        self.effective_at(id, measure, 0)
    }

    /// Summed effective weight or volume of the direct children of `id`,
    /// before `id`'s own reduction factor.
    pub fn contained(&self, id: ItemId, measure: Measure) -> f64 {
        self.children(id)
            .iter()
            .map(|child| self.contribution(*child, measure))
            .sum()
    }

    /// What `child` adds to its parent's contents, counted one level below it.
    pub fn contribution(&self, child: ItemId, measure: Measure) -> f64 {
        self.effective_at(child, measure, 1)
    }

    fn effective_at(&self, id: ItemId, measure: Measure, depth: usize) -> f64 {
        let Some(node) = self.nodes.get(&id) else {
            return 0.0;
        };
        let own = measure.base(&node.template) * f64::from(node.item.stack_size);
        let Some(spec) = node.template.container.as_ref() else {
            return own;
        };
        if depth >= WALK_LIMIT {
            return own;
        }
        let inner: f64 = node
            .children
            .iter()
            .map(|child| self.effective_at(*child, measure, depth + 1))
            .sum();
        own + measure.reduction(spec).apply(inner)
    }

    /// Move `id` under `new_parent` inside this tree only (for projections).
    pub fn reparent(&mut self, id: ItemId, new_parent: ItemId) {
        let Some(old_parent) = self.nodes.get(&id).map(|n| n.item.container_parent()) else {
            return;
        };
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children.retain(|c| *c != id);
        }
        if let Some(parent) = self.nodes.get_mut(&new_parent) {
            if !parent.children.contains(&id) {
                parent.children.push(id);
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.item.placement = Placement::Container(new_parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{InMemoryCatalog, InMemoryItemStore};
    use chrono::Utc;

    fn bag(reduction: f64) -> ItemTemplate {
        ItemTemplate::new("Bag")
            .with_weight(1.0)
            .with_volume(2.0)
            .with_container(
                ContainerSpec::default()
                    .with_weight_reduction(ReductionFactor::new(reduction).unwrap())
                    .with_volume_reduction(ReductionFactor::new(reduction).unwrap()),
            )
    }

    fn inside(template: &ItemTemplate, parent: &Item) -> Item {
        Item::new(template.id, Utc::now()).with_placement(Placement::Container(parent.id))
    }

    #[tokio::test]
    async fn stack_size_multiplies_base_weight() {
        let coin = ItemTemplate::new("Coin").with_weight(0.5).with_volume(0.1);
        let pouch = bag(1.0);
        let pouch_item = Item::new(pouch.id, Utc::now());
        let coins = inside(&coin, &pouch_item).with_stack_size(10).unwrap();

        let store = InMemoryItemStore::from_items([pouch_item.clone(), coins]);
        let catalog = InMemoryCatalog::new([coin, pouch]).unwrap();
        let mut view = StoreView::new(&store, &catalog);
        let tree = ContentsTree::load(&mut view, &pouch_item).await.unwrap();

        assert!((tree.contained(pouch_item.id, Measure::Weight) - 5.0).abs() < 1e-9);
        assert!((tree.effective(pouch_item.id, Measure::Weight) - 6.0).abs() < 1e-9);
        assert!((tree.contained(pouch_item.id, Measure::Volume) - 1.0).abs() < 1e-9);
        assert_eq!(tree.item_count(pouch_item.id), 1);
    }

    #[tokio::test]
    async fn reduction_applies_per_container_level() {
        let rock = ItemTemplate::new("Rock").with_weight(8.0);
        let holding = bag(0.5);
        let plain = bag(1.0);

        let outer = Item::new(plain.id, Utc::now());
        let inner = inside(&holding, &outer);
        let stone = inside(&rock, &inner);

        let store = InMemoryItemStore::from_items([outer.clone(), inner.clone(), stone]);
        let catalog = InMemoryCatalog::new([rock, holding, plain]).unwrap();
        let mut view = StoreView::new(&store, &catalog);
        let tree = ContentsTree::load(&mut view, &outer).await.unwrap();

        // inner bag: 1 + 0.5 * 8 = 5
        assert!((tree.effective(inner.id, Measure::Weight) - 5.0).abs() < 1e-9);
        // outer bag contents: just the inner bag
        assert!((tree.contained(outer.id, Measure::Weight) - 5.0).abs() < 1e-9);
        // inner bag's own contents are unreduced from its own point of view
        assert!((tree.contained(inner.id, Measure::Weight) - 8.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn reparent_moves_contribution_between_containers() {
        let rock = ItemTemplate::new("Rock").with_weight(3.0);
        let plain = bag(1.0);
        let left = Item::new(plain.id, Utc::now());
        let right = inside(&plain, &left);
        let stone = inside(&rock, &left);

        let store = InMemoryItemStore::from_items([left.clone(), right.clone(), stone.clone()]);
        let catalog = InMemoryCatalog::new([rock, plain]).unwrap();
        let mut view = StoreView::new(&store, &catalog);
        let mut tree = ContentsTree::load(&mut view, &left).await.unwrap();

        let before = tree.effective(left.id, Measure::Weight);
        tree.reparent(stone.id, right.id);

        assert_eq!(tree.item_count(left.id), 1);
        assert_eq!(tree.item_count(right.id), 1);
        assert!((tree.contained(right.id, Measure::Weight) - 3.0).abs() < 1e-9);
        assert!((tree.effective(left.id, Measure::Weight) - before).abs() < 1e-9);
    }

    #[test]
    fn cyclic_records_are_bounded_by_depth_counter() {
        let plain = Arc::new(bag(1.0));
        let a_id = ItemId::new();
        let b_id = ItemId::new();
        let a = Item::new(plain.id, Utc::now())
            .with_id(a_id)
            .with_placement(Placement::Container(b_id));
        let b = Item::new(plain.id, Utc::now())
            .with_id(b_id)
            .with_placement(Placement::Container(a_id));

        let tree = ContentsTree::from_records([(a, Arc::clone(&plain)), (b, plain)]);
        let weight = tree.effective(a_id, Measure::Weight);
        assert!(weight.is_finite());
        assert!((weight - (WALK_LIMIT as f64 + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn child_contributions_add_up_to_contained_on_deep_chains() {
        let plain = Arc::new(bag(1.0));
        let mut chain: Vec<Item> = Vec::new();
        for level in 0..WALK_LIMIT + 3 {
            let mut item = Item::new(plain.id, Utc::now());
            if level > 0 {
                item.placement = Placement::Container(chain[level - 1].id);
            }
            chain.push(item);
        }
        let root = chain[0].id;
        let tree = ContentsTree::from_records(chain.into_iter().map(|i| (i, Arc::clone(&plain))));

        let listed: f64 = tree
            .children(root)
            .iter()
            .map(|child| tree.contribution(*child, Measure::Weight))
            .sum();
        assert!((listed - tree.contained(root, Measure::Weight)).abs() < 1e-9);
        // Counting stops WALK_LIMIT levels below the root.
        assert!((listed - WALK_LIMIT as f64).abs() < 1e-9);
    }

    #[test]
    fn exceeds_tolerates_float_noise() {
        assert!(!exceeds(0.1 + 0.2, 0.3));
        assert!(exceeds(10.01, 10.0));
        assert!(!exceeds(10.0, 10.0));
    }
}
