//! Containment limits shared by every layer that walks the item forest.

/// Maximum number of container hops from any item up to its root.
pub const MAX_NESTING_DEPTH: usize = 5;

/// Step bound for every walk over the forest.
///
/// One more than the nesting limit, so a walk over valid data always finishes
/// before hitting it and a walk over corrupted (cyclic or too deep) data still
/// terminates. Walks that reach it report a saturated result.
pub const WALK_LIMIT: usize = MAX_NESTING_DEPTH + 1;
