//! Read-only invariant scan over every stored item.
//!
//! Mutations keep the containment forest valid, but data can still arrive
//! broken from snapshots or other writers. The audit reports what it finds
//! and never repairs anything.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use holdfast_domain::{Item, ItemId, ItemTemplate, TemplateId, MAX_NESTING_DEPTH};
use serde::Serialize;
use tracing::instrument;

use super::capacity::{exceeds, ContentsTree, Measure};
use super::error::ContainmentError;
use super::ContainmentPorts;

/// One broken containment invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantViolation {
    /// Items whose parent pointers loop back on themselves
    Cycle { members: Vec<ItemId> },
    DepthExceeded { item_id: ItemId, depth: usize },
    DanglingParent { item_id: ItemId, parent_id: ItemId },
    ParentNotContainer { item_id: ItemId, parent_id: ItemId },
    TypeNotAllowed { item_id: ItemId, container_id: ItemId },
    EquippedInContainer { item_id: ItemId, container_id: ItemId },
    WeightExceeded { container_id: ItemId, current: f64, max: f64 },
    VolumeExceeded { container_id: ItemId, current: f64, max: f64 },
    TooManyItems { container_id: ItemId, count: u32, max: u32 },
    MissingTemplate { item_id: ItemId, template_id: TemplateId },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cycle { members } => write!(f, "containment cycle through {} items", members.len()),
            Self::DepthExceeded { item_id, depth } => {
                write!(f, "{item_id} nested {depth} deep (max {MAX_NESTING_DEPTH})")
            }
            Self::DanglingParent { item_id, parent_id } => {
                write!(f, "{item_id} is inside missing item {parent_id}")
            }
            Self::ParentNotContainer { item_id, parent_id } => {
                write!(f, "{item_id} is inside non-container {parent_id}")
            }
            Self::TypeNotAllowed {
                item_id,
                container_id,
            } => write!(f, "{container_id} does not accept the type of {item_id}"),
            Self::EquippedInContainer {
                item_id,
                container_id,
            } => write!(f, "equipped {item_id} is inside {container_id}"),
            Self::WeightExceeded {
                container_id,
                current,
                max,
            } => write!(f, "{container_id} too heavy ({current:.2}/{max:.2})"),
            Self::VolumeExceeded {
                container_id,
                current,
                max,
            } => write!(f, "{container_id} too bulky ({current:.2}/{max:.2})"),
            Self::TooManyItems {
                container_id,
                count,
                max,
            } => write!(f, "{container_id} holds {count}/{max} items"),
            Self::MissingTemplate {
                item_id,
                template_id,
            } => write!(f, "{item_id} references missing template {template_id}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub items_checked: usize,
    pub violations: Vec<InvariantViolation>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Containment audit use case.
pub struct ContainmentAudit {
    ports: ContainmentPorts,
}

impl ContainmentAudit {
    pub fn new(ports: ContainmentPorts) -> Self {
        Self { ports }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<AuditReport, ContainmentError> {
        let records = self.ports.items.list_all().await?;

        let mut templates: HashMap<TemplateId, Option<Arc<ItemTemplate>>> = HashMap::new();
        let mut violations = Vec::new();
        let mut resolved = Vec::with_capacity(records.len());
        for record in &records {
            let item = &record.item;
            if !templates.contains_key(&item.template_id) {
                let found = self.ports.catalog.get(item.template_id).await?;
                templates.insert(item.template_id, found);
            }
            match templates.get(&item.template_id).cloned().flatten() {
                Some(template) => resolved.push((item.clone(), template)),
                None => violations.push(InvariantViolation::MissingTemplate {
                    item_id: item.id,
                    template_id: item.template_id,
                }),
            }
        }

        let items: HashMap<ItemId, &Item> = records.iter().map(|r| (r.item.id, &r.item)).collect();
        let tree = ContentsTree::from_records(resolved);

        for record in &records {
            check_item(&record.item, &items, &tree, &mut violations);
        }
        for record in &records {
            check_capacity(record.item.id, &tree, &mut violations);
        }

        let report = AuditReport {
            items_checked: records.len(),
            violations,
        };
        if report.is_clean() {
            tracing::info!(items_checked = report.items_checked, "Containment audit clean");
        } else {
            tracing::warn!(
                items_checked = report.items_checked,
                violations = report.violations.len(),
                "Containment audit found violations"
            );
        }
        Ok(report)
    }
}

fn check_item(
    item: &Item,
    items: &HashMap<ItemId, &Item>,
    tree: &ContentsTree,
    violations: &mut Vec<InvariantViolation>,
) {
    let Some(parent_id) = item.container_parent() else {
        return;
    };
    if !items.contains_key(&parent_id) {
        violations.push(InvariantViolation::DanglingParent {
            item_id: item.id,
            parent_id,
        });
        return;
    }

    if let Some(parent_template) = tree.template(parent_id) {
        match &parent_template.container {
            None => violations.push(InvariantViolation::ParentNotContainer {
                item_id: item.id,
                parent_id,
            }),
            Some(spec) => {
                let item_type = tree.template(item.id).and_then(|t| t.item_type.as_ref());
                if tree.contains(item.id) && !spec.allowed_types.permits(item_type) {
                    violations.push(InvariantViolation::TypeNotAllowed {
                        item_id: item.id,
                        container_id: parent_id,
                    });
                }
            }
        }
    }

    if item.is_equipped {
        violations.push(InvariantViolation::EquippedInContainer {
            item_id: item.id,
            container_id: parent_id,
        });
    }

    match walk_up(item, items) {
        Walk::Cycle(mut members) => {
            // Report each cycle once, from its smallest member.
            members.sort();
            if members.first() == Some(&item.id) {
                violations.push(InvariantViolation::Cycle { members });
            }
        }
        Walk::Rooted(depth) if depth > MAX_NESTING_DEPTH => {
            violations.push(InvariantViolation::DepthExceeded {
                item_id: item.id,
                depth,
            });
        }
        // Hangs below a cycle; the cycle itself is reported by its members.
        Walk::BelowCycle | Walk::Rooted(_) => {}
    }
}

enum Walk {
    Rooted(usize),
    BelowCycle,
    Cycle(Vec<ItemId>),
}

/// Parent walk over the loaded records.
///
/// Unlike the store-side walks this one is not bounded by `WALK_LIMIT`: the
/// records are all in memory and the visited set ends any loop.
fn walk_up(item: &Item, items: &HashMap<ItemId, &Item>) -> Walk {
    let mut path = vec![item.id];
    let mut seen = HashSet::from([item.id]);
    let mut next = item.container_parent();

    while let Some(parent_id) = next {
        if parent_id == item.id {
            return Walk::Cycle(path);
        }
        if !seen.insert(parent_id) {
            return Walk::BelowCycle;
        }
        path.push(parent_id);
        next = items.get(&parent_id).and_then(|p| p.container_parent());
    }
    Walk::Rooted(path.len() - 1)
}

fn check_capacity(id: ItemId, tree: &ContentsTree, violations: &mut Vec<InvariantViolation>) {
    let Some(spec) = tree.template(id).and_then(|t| t.container.as_ref()) else {
        return;
    };
    for measure in Measure::ALL {
        let Some(max) = measure.max(spec) else {
            continue;
        };
        let current = tree.contained(id, measure);
        if exceeds(current, max) {
            violations.push(match measure {
                Measure::Weight => InvariantViolation::WeightExceeded {
                    container_id: id,
                    current,
                    max,
                },
                Measure::Volume => InvariantViolation::VolumeExceeded {
                    container_id: id,
                    current,
                    max,
                },
            });
        }
    }
    if let Some(max) = spec.max_items {
        let count = tree.item_count(id);
        if count > max {
            violations.push(InvariantViolation::TooManyItems {
                container_id: id,
                count,
                max,
            });
        }
    }
}
