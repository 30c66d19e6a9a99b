//! Containment graph queries over the parent-pointer forest.
//!
//! Nothing here materialises the whole forest: upward walks follow single
//! parent pointers and downward walks read one level of children at a time.
//! Every walk counts its steps and stops at [`WALK_LIMIT`], so cyclic or
//! over-deep data cannot make it run forever.

use std::collections::HashSet;

use holdfast_domain::{Item, ItemId, RoomId, WALK_LIMIT};

use super::view::StoreView;
use crate::infrastructure::ports::RepoError;

/// Ancestors of an item, nearest first.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParentChain {
    pub ancestors: Vec<Item>,
    /// The walk hit its step bound with parents still left to visit
    pub saturated: bool,
}

impl ParentChain {
    /// Parent hops to the root, or `WALK_LIMIT` when the walk saturated.
    pub fn depth(&self) -> usize {
        if self.saturated {
            WALK_LIMIT
        } else {
            self.ancestors.len()
        }
    }

    /// Outermost ancestor reached, if the item has any.
    pub fn root(&self) -> Option<&Item> {
        self.ancestors.last()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ancestors.iter().any(|a| a.id == id)
    }
}

/// Walk upward from `node` through its container parents.
pub(crate) async fn parent_chain(
    view: &mut StoreView<'_>,
    node: &Item,
) -> Result<ParentChain, RepoError> {
    let mut chain = ParentChain::default();
    let mut next = node.container_parent();
    let mut steps = 0;

    while let Some(parent_id) = next {
        if steps == WALK_LIMIT {
            tracing::warn!(
                item_id = %node.id,
                limit = WALK_LIMIT,
                "Parent walk hit its step bound; containment data may be cyclic or too deep"
            );
            chain.saturated = true;
            break;
        }
        steps += 1;

        match view.item(parent_id).await? {
            Some(parent) => {
                next = parent.container_parent();
                chain.ancestors.push(parent);
            }
            None => {
                tracing::warn!(
                    item_id = %node.id,
                    parent_id = %parent_id,
                    "Container parent does not exist; treating the walk as rooted"
                );
                break;
            }
        }
    }
    Ok(chain)
}

/// Whether `ancestor_id` appears among the container parents of `node_id`.
pub(crate) async fn is_descendant_of(
    view: &mut StoreView<'_>,
    ancestor_id: ItemId,
    node_id: ItemId,
) -> Result<bool, RepoError> {
    let Some(node) = view.item(node_id).await? else {
        return Ok(false);
    };
    Ok(parent_chain(view, &node).await?.contains(ancestor_id))
}

/// Whether `target_id` sits anywhere below `root_id`.
pub(crate) async fn subtree_contains(
    view: &mut StoreView<'_>,
    root_id: ItemId,
    target_id: ItemId,
) -> Result<bool, RepoError> {
    let mut visited = HashSet::from([root_id]);
    let mut frontier = vec![root_id];

    for _level in 0..WALK_LIMIT {
        let mut next = Vec::new();
        for id in frontier {
            for child in view.children(id).await? {
                if child.id == target_id {
                    return Ok(true);
                }
                if visited.insert(child.id) {
                    next.push(child.id);
                }
            }
        }
        if next.is_empty() {
            return Ok(false);
        }
        frontier = next;
    }
    Ok(false)
}

/// Parent hops from `node` up to a root; `WALK_LIMIT` if the walk saturated.
pub(crate) async fn depth_of(view: &mut StoreView<'_>, node: &Item) -> Result<usize, RepoError> {
    Ok(parent_chain(view, node).await?.depth())
}

/// Levels of items below `node_id` (0 for a leaf), capped at `WALK_LIMIT`.
///
/// Counted from actual children rather than from the template's container
/// flag, so a non-container that somehow holds items still reports them.
pub(crate) async fn height_of(view: &mut StoreView<'_>, node_id: ItemId) -> Result<usize, RepoError> {
    let mut visited = HashSet::from([node_id]);
    let mut frontier = vec![node_id];
    let mut height = 0;

    while height < WALK_LIMIT {
        let mut next = Vec::new();
        for id in frontier {
            for child in view.children(id).await? {
                if visited.insert(child.id) {
                    next.push(child.id);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        height += 1;
        frontier = next;
    }
    Ok(height)
}

/// Room the item sits in, directly or through its outermost container.
pub(crate) async fn resident_room(
    view: &mut StoreView<'_>,
    node: &Item,
) -> Result<Option<RoomId>, RepoError> {
    if !node.placement.is_in_container() {
        return Ok(node.room());
    }
    let chain = parent_chain(view, node).await?;
    Ok(chain.root().and_then(Item::room))
}
