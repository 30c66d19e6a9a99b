//! Optimistic validate-then-commit loop shared by every mutating operation.
//!
//! An attempt reads and validates through a fresh [`StoreView`], then commits
//! its writes conditioned on the versions of everything it read. A conflict
//! means another mutation got there first; the attempt is thrown away and the
//! whole operation re-runs against the new state, so the loser of a race sees
//! the winner's effect (usually as a capacity rejection).

use async_trait::async_trait;
use holdfast_domain::Item;
use tokio_util::sync::CancellationToken;

use super::error::ContainmentError;
use super::view::StoreView;
use super::ContainmentPorts;
use crate::infrastructure::ports::RepoError;

/// Writes an attempt wants to commit, and what to report once they land.
#[derive(Debug)]
pub(crate) struct Planned<T> {
    pub writes: Vec<Item>,
    pub outcome: T,
}

impl<T> Planned<T> {
    /// Nothing to write; the outcome stands without a commit.
    pub fn nothing(outcome: T) -> Self {
        Self {
            writes: Vec::new(),
            outcome,
        }
    }
}

/// A containment mutation that can be planned against a store view.
///
/// `plan` must be free of side effects: it may run several times.
#[async_trait]
pub(crate) trait Mutation: Send + Sync {
    type Outcome: Send;

    fn name(&self) -> &'static str;

    async fn plan(
        &self,
        view: &mut StoreView<'_>,
    ) -> Result<Planned<Self::Outcome>, ContainmentError>;
}

pub(crate) async fn commit_mutation<M: Mutation>(
    ports: &ContainmentPorts,
    cancel: &CancellationToken,
    mutation: &M,
) -> Result<M::Outcome, ContainmentError> {
    let attempts = ports.config.max_commit_attempts.max(1);

    for attempt in 1..=attempts {
        let mut view = StoreView::new(ports.items.as_ref(), ports.catalog.as_ref());

        let planned = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ContainmentError::Cancelled),
            planned = mutation.plan(&mut view) => planned,
        };
        let planned = match planned {
            Ok(planned) => planned,
            Err(err) => {
                tracing::debug!(
                    operation = mutation.name(),
                    attempt,
                    error = %err,
                    "Containment request rejected"
                );
                return Err(err);
            }
        };
        if planned.writes.is_empty() {
            return Ok(planned.outcome);
        }
        // Last point at which the caller can still back out.
        if cancel.is_cancelled() {
            return Err(ContainmentError::Cancelled);
        }

        let read_set = view.read_set_len();
        let writes = planned.writes.len();
        match ports.items.commit(view.into_change_set(planned.writes)).await {
            Ok(()) => {
                tracing::debug!(
                    operation = mutation.name(),
                    attempt,
                    read_set,
                    writes,
                    "Containment change committed"
                );
                return Ok(planned.outcome);
            }
            Err(RepoError::Conflict { item_id }) => {
                tracing::warn!(
                    operation = mutation.name(),
                    attempt,
                    conflicting_item = %item_id,
                    "Concurrent modification detected, re-validating"
                );
            }
            Err(err) => return Err(err.into()),
        }
    }

    tracing::warn!(
        operation = mutation.name(),
        attempts,
        "Giving up after repeated commit conflicts"
    );
    Err(ContainmentError::TransientStoreFailure)
}
