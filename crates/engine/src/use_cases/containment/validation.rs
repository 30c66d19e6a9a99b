//! Placement validation: may `item` go inside `container`?
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. container exists (a missing container is `InvalidContainer`)
//! 2. item is not the container itself (`SelfContainment`)
//! 3. container's template is a container (`InvalidContainer`)
//! 4. item exists (`NotFound`)
//! 5. container is not inside the item (`CircularReference`)
//! 6. `depth(container) + height(item) + 1 <= MAX_NESTING_DEPTH` (`DepthExceeded`)
//! 7. item type is accepted (`TypeNotAllowed`)
//! 8. weight fits the container and every ancestor with a maximum (`WeightExceeded`)
//! 9. volume, likewise (`VolumeExceeded`)
//! 10. direct child count fits (`ContainerFull`)
//!
//! The self-containment test runs before the container flag is inspected so
//! that `store(x, x)` is rejected the same way whether or not `x` is a
//! container.

use std::sync::Arc;

use holdfast_domain::{ContainerSpec, Item, ItemId, ItemTemplate, MAX_NESTING_DEPTH};

use super::capacity::{exceeds, ContentsTree, Measure};
use super::error::ContainmentError;
use super::graph;
use super::types::ProjectedLoad;
use super::view::StoreView;

/// Everything an accepted placement was decided on.
#[derive(Debug, Clone)]
pub(crate) struct PlacementCheck {
    pub container: Item,
    pub item: Item,
    pub item_template: Arc<ItemTemplate>,
    pub projected: ProjectedLoad,
}

pub(crate) async fn check_placement(
    view: &mut StoreView<'_>,
    container_id: ItemId,
    item_id: ItemId,
) -> Result<PlacementCheck, ContainmentError> {
    let container = view
        .item(container_id)
        .await?
        .ok_or(ContainmentError::InvalidContainer { container_id })?;

    if item_id == container_id {
        return Err(ContainmentError::SelfContainment { item_id });
    }

    let container_template = view.template(container.template_id).await?;
    let Some(spec) = container_template
        .as_ref()
        .and_then(|t| t.container.clone())
    else {
        return Err(ContainmentError::InvalidContainer { container_id });
    };

    let item = view
        .item(item_id)
        .await?
        .ok_or(ContainmentError::NotFound { item_id })?;
    let item_template = view.template_of(&item).await?;

    // Both directions of the cycle test; they agree on a well-formed forest.
    if graph::subtree_contains(view, item_id, container_id).await?
        || graph::is_descendant_of(view, item_id, container_id).await?
    {
        return Err(ContainmentError::CircularReference {
            item_id,
            container_id,
        });
    }

    let depth = graph::depth_of(view, &container).await?;
    let height = graph::height_of(view, item_id).await?;
    let combined = depth + height + 1;
    if combined > MAX_NESTING_DEPTH {
        return Err(ContainmentError::depth_exceeded(combined));
    }

    if !spec.allowed_types.permits(item_template.item_type.as_ref()) {
        return Err(ContainmentError::TypeNotAllowed {
            item_type: item_template.item_type.as_ref().map(|t| t.to_string()),
            allowed: spec.allowed_types.to_string(),
        });
    }

    let projected = check_capacity(view, &container, &spec, &item).await?;

    tracing::debug!(
        item_id = %item_id,
        container_id = %container_id,
        depth = combined,
        projected_weight = projected.weight,
        projected_volume = projected.volume,
        "Placement accepted"
    );

    Ok(PlacementCheck {
        container,
        item,
        item_template,
        projected,
    })
}

/// Project the placement onto a fresh contents tree and check every limit
/// on the path from the container to its root.
async fn check_capacity(
    view: &mut StoreView<'_>,
    container: &Item,
    spec: &ContainerSpec,
    item: &Item,
) -> Result<ProjectedLoad, ContainmentError> {
    let chain = graph::parent_chain(view, container).await?;
    let root = chain.root().unwrap_or(container).clone();

    let mut tree = ContentsTree::load(view, &root).await?;
    tree.graft(view, item).await?;
    let current_count = tree.item_count(container.id);
    tree.reparent(item.id, container.id);

    let path: Vec<ItemId> = std::iter::once(container.id)
        .chain(chain.ancestors.iter().map(|a| a.id))
        .collect();

    for measure in Measure::ALL {
        for id in &path {
            let Some(limits) = tree.template(*id).and_then(|t| t.container.as_ref()) else {
                continue;
            };
            let Some(max) = measure.max(limits) else {
                continue;
            };
            let load = tree.contained(*id, measure);
            if exceeds(load, max) {
                return Err(match measure {
                    Measure::Weight => ContainmentError::WeightExceeded {
                        container_id: *id,
                        projected: load,
                        max,
                    },
                    Measure::Volume => ContainmentError::VolumeExceeded {
                        container_id: *id,
                        projected: load,
                        max,
                    },
                });
            }
        }
    }

    let item_count = tree.item_count(container.id);
    if let Some(max) = spec.max_items {
        if item_count > max {
            return Err(ContainmentError::ContainerFull {
                container_id: container.id,
                current: current_count,
                max,
            });
        }
    }

    Ok(ProjectedLoad {
        weight: tree.contained(container.id, Measure::Weight),
        volume: tree.contained(container.id, Measure::Volume),
        item_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockItemStore, MockTemplateCatalog, RepoError, VersionedItem};
    use crate::test_fixtures::{ContainmentWorld, TestWorld};
    use crate::use_cases::containment::ContainmentErrorKind;
    use chrono::Utc;
    use holdfast_domain::{ItemTypeSet, ItemTypeTag, ReductionFactor};

    async fn check(
        world: &TestWorld,
        container_id: ItemId,
        item_id: ItemId,
    ) -> Result<PlacementCheck, ContainmentError> {
        let mut view = StoreView::new(world.store.as_ref(), world.catalog.as_ref());
        check_placement(&mut view, container_id, item_id).await
    }

    fn kind(result: Result<PlacementCheck, ContainmentError>) -> ContainmentErrorKind {
        match result {
            Ok(_) => panic!("expected a rejection"),
            Err(err) => err.kind(),
        }
    }

    #[tokio::test]
    async fn missing_container_is_invalid() {
        let mut world = ContainmentWorld::new();
        let rock = world.leaf("Rock", 1.0);
        let world = world.build();

        assert_eq!(
            kind(check(&world, ItemId::new(), rock).await),
            ContainmentErrorKind::InvalidContainer
        );
    }

    #[tokio::test]
    async fn non_container_target_is_invalid() {
        let mut world = ContainmentWorld::new();
        let rock = world.leaf("Rock", 1.0);
        let pebble = world.leaf("Pebble", 0.1);
        let world = world.build();

        assert_eq!(
            kind(check(&world, rock, pebble).await),
            ContainmentErrorKind::InvalidContainer
        );
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let mut world = ContainmentWorld::new();
        let chest = world.container("Chest", ContainerSpec::default());
        let world = world.build();

        assert_eq!(
            kind(check(&world, chest, ItemId::new()).await),
            ContainmentErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn self_containment_wins_over_container_flag() {
        let mut world = ContainmentWorld::new();
        let chest = world.container("Chest", ContainerSpec::default());
        let rock = world.leaf("Rock", 1.0);
        let world = world.build();

        assert_eq!(
            kind(check(&world, chest, chest).await),
            ContainmentErrorKind::SelfContainment
        );
        assert_eq!(
            kind(check(&world, rock, rock).await),
            ContainmentErrorKind::SelfContainment
        );
    }

    #[tokio::test]
    async fn storing_an_ancestor_inside_its_descendant_is_circular() {
        let mut world = ContainmentWorld::new();
        let outer = world.container("Outer", ContainerSpec::default());
        let middle = world.container_in("Middle", ContainerSpec::default(), outer);
        let inner = world.container_in("Inner", ContainerSpec::default(), middle);
        let world = world.build();

        assert_eq!(
            kind(check(&world, inner, outer).await),
            ContainmentErrorKind::CircularReference
        );
        assert_eq!(
            kind(check(&world, middle, outer).await),
            ContainmentErrorKind::CircularReference
        );
    }

    #[tokio::test]
    async fn depth_limit_is_inclusive() {
        let mut world = ContainmentWorld::new();
        let b1 = world.container("B1", ContainerSpec::default());
        let b2 = world.container_in("B2", ContainerSpec::default(), b1);
        let b3 = world.container_in("B3", ContainerSpec::default(), b2);
        let b4 = world.container_in("B4", ContainerSpec::default(), b3);
        let b5 = world.container_in("B5", ContainerSpec::default(), b4);
        let empty_bag = world.container("Empty", ContainerSpec::default());
        let full_bag = world.container("Full", ContainerSpec::default());
        world.leaf_in("Pebble", 0.1, full_bag);
        let world = world.build();

        let accepted = check(&world, b5, empty_bag).await.unwrap();
        assert_eq!(accepted.projected.item_count, 1);

        let rejected = check(&world, b5, full_bag).await.unwrap_err();
        assert_eq!(rejected, ContainmentError::DepthExceeded { depth: 6, max: 5 });
    }

    #[tokio::test]
    async fn type_restriction_uses_exact_tags() {
        let mut world = ContainmentWorld::new();
        let quiver = world.container(
            "Quiver",
            ContainerSpec::default().with_allowed_types(ItemTypeSet::parse_csv("arrow").unwrap()),
        );
        let arrow = world.typed_leaf("Arrow", "arrow", 0.1);
        let sword = world.typed_leaf("Sword", "weapon", 3.0);
        let rock = world.leaf("Rock", 1.0);
        let world = world.build();

        assert!(check(&world, quiver, arrow).await.is_ok());
        assert_eq!(
            kind(check(&world, quiver, sword).await),
            ContainmentErrorKind::TypeNotAllowed
        );
        assert_eq!(
            kind(check(&world, quiver, rock).await),
            ContainmentErrorKind::TypeNotAllowed
        );
    }

    #[tokio::test]
    async fn too_heavy_is_reported_against_current_contents() {
        let mut world = ContainmentWorld::new();
        let chest = world.container("Chest", ContainerSpec::default().with_max_weight(10.0));
        world.leaf_in("Rock", 5.0, chest);
        let brick = world.leaf("Brick", 6.0);
        let feather = world.leaf("Feather", 5.0);
        let world = world.build();

        let err = check(&world, chest, brick).await.unwrap_err();
        assert!(err.to_string().starts_with("too heavy"));
        assert_eq!(err.kind(), ContainmentErrorKind::WeightExceeded);

        let accepted = check(&world, chest, feather).await.unwrap();
        assert!((accepted.projected.weight - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn volume_is_checked_after_weight() {
        let mut world = ContainmentWorld::new();
        let crate_id = world.container(
            "Crate",
            ContainerSpec::default()
                .with_max_weight(100.0)
                .with_max_volume(2.0),
        );
        let barrel = world.leaf_with("Barrel", |t| t.with_weight(5.0).with_volume(3.0));
        let world = world.build();

        assert_eq!(
            kind(check(&world, crate_id, barrel).await),
            ContainmentErrorKind::VolumeExceeded
        );
    }

    #[tokio::test]
    async fn ancestor_limits_apply_through_reduction() {
        let mut world = ContainmentWorld::new();
        let pack = world.container("Pack", ContainerSpec::default().with_max_weight(10.0));
        let holding = world.container_in(
            "Bag of Holding",
            ContainerSpec::default().with_weight_reduction(ReductionFactor::new(0.5).unwrap()),
            pack,
        );
        let anvil = world.leaf("Anvil", 30.0);
        let ingot = world.leaf("Ingot", 16.0);
        let world = world.build();

        // 30 * 0.5 = 15 lands on the pack
        let err = check(&world, holding, anvil).await.unwrap_err();
        assert!(matches!(
            err,
            ContainmentError::WeightExceeded { container_id, .. } if container_id == pack
        ));
        // 16 * 0.5 = 8 fits
        assert!(check(&world, holding, ingot).await.is_ok());
    }

    #[tokio::test]
    async fn moving_within_one_tree_is_not_double_counted() {
        let mut world = ContainmentWorld::new();
        let chest = world.container("Chest", ContainerSpec::default().with_max_weight(10.0));
        let pouch = world.container_in("Pouch", ContainerSpec::default(), chest);
        let gold = world.leaf_in("Gold", 9.0, chest);
        let world = world.build();

        let accepted = check(&world, pouch, gold).await.unwrap();
        assert!((accepted.projected.weight - 9.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn item_count_limit_rejects_extra_child() {
        let mut world = ContainmentWorld::new();
        let pouch = world.container("Pouch", ContainerSpec::default().with_max_items(1));
        world.leaf_in("Ring", 0.1, pouch);
        let coin = world.leaf("Coin", 0.1);
        let world = world.build();

        assert_eq!(
            check(&world, pouch, coin).await.unwrap_err(),
            ContainmentError::ContainerFull {
                container_id: pouch,
                current: 1,
                max: 1,
            }
        );
    }

    #[tokio::test]
    async fn store_failure_is_transient() {
        let mut items = MockItemStore::new();
        items
            .expect_get()
            .returning(|_| Err(RepoError::database("get", "Database unavailable")));
        let catalog = MockTemplateCatalog::new();

        let mut view = StoreView::new(&items, &catalog);
        let result = check_placement(&mut view, ItemId::new(), ItemId::new()).await;
        assert_eq!(result.unwrap_err(), ContainmentError::TransientStoreFailure);
    }

    #[tokio::test]
    async fn missing_item_template_is_transient() {
        let chest_template = ItemTemplate::new("Chest").with_container(ContainerSpec::default());
        let chest = Item::new(chest_template.id, Utc::now());
        let orphan = Item::new(holdfast_domain::TemplateId::new(), Utc::now());

        let mut items = MockItemStore::new();
        let (chest_for_get, orphan_for_get) = (chest.clone(), orphan.clone());
        items.expect_get().returning(move |id| {
            let found = [&chest_for_get, &orphan_for_get]
                .into_iter()
                .find(|i| i.id == id)
                .map(|i| VersionedItem {
                    item: i.clone(),
                    version: 1,
                });
            Ok(found)
        });
        let chest_template = Arc::new(chest_template);
        let mut catalog = MockTemplateCatalog::new();
        catalog.expect_get().returning(move |id| {
            Ok((id == chest_template.id).then(|| Arc::clone(&chest_template)))
        });

        let mut view = StoreView::new(&items, &catalog);
        let result = check_placement(&mut view, chest.id, orphan.id).await;
        assert_eq!(result.unwrap_err(), ContainmentError::TransientStoreFailure);
    }

    #[test]
    fn tags_are_case_insensitive_in_restrictions() {
        let set = ItemTypeSet::parse_csv("Arrow").unwrap();
        assert!(set.permits(Some(&ItemTypeTag::new("ARROW").unwrap())));
    }
}
