// src/dag/propagator.rs

//! Status transitions and blocked-status propagation.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, info, warn};

use crate::dag::graph::ProjectGraph;
use crate::errors::{AssetDagError, Result};
use crate::types::{AssetId, AssetStatus};

/// Applies status changes to a project graph and walks the consequences
/// through its dependents.
pub struct StatusPropagator<'a> {
    graph: &'a mut ProjectGraph,
}

impl<'a> StatusPropagator<'a> {
    pub fn new(graph: &'a mut ProjectGraph) -> Self {
        Self { graph }
    }

    /// Dependencies of `id` that are not yet `Complete`.
    pub fn unmet_dependencies(&self, id: AssetId) -> Vec<AssetId> {
        self.graph.unmet_dependencies(id)
    }

    /// Dependencies of `id` that are `Failed` or `Blocked`.
    pub fn unhealthy_dependencies(&self, id: AssetId) -> Vec<AssetId> {
        self.graph
            .dependencies_of(id)
            .iter()
            .copied()
            .filter(|dep| {
                self.graph.get(*dep).is_some_and(|a| {
                    matches!(a.status, AssetStatus::Failed | AssetStatus::Blocked)
                })
            })
            .collect()
    }

    /// Perform a requested transition and propagate its effects.
    ///
    /// Returns the ids whose status changed as a side effect, in the order
    /// they were reached. The asset itself is not included.
    pub fn update_status(&mut self, id: AssetId, to: AssetStatus) -> Result<Vec<AssetId>> {
        let from = self.graph.require(id)?.status;

        if to == AssetStatus::Complete && !from.is_terminal() {
            let unmet = self.unmet_dependencies(id);
            if !unmet.is_empty() {
                return Err(AssetDagError::DependencyNotSatisfied { asset: id, unmet });
            }
        }

        match (from, to) {
            (AssetStatus::Pending, AssetStatus::InProgress)
            | (AssetStatus::InProgress, AssetStatus::Complete)
            | (AssetStatus::InProgress, AssetStatus::Failed) => {}
            (AssetStatus::Blocked, AssetStatus::Pending) => {
                let unhealthy = self.unhealthy_dependencies(id);
                if !unhealthy.is_empty() {
                    return Err(AssetDagError::DependencyNotSatisfied {
                        asset: id,
                        unmet: unhealthy,
                    });
                }
            }
            _ => return Err(AssetDagError::InvalidTransition { asset: id, from, to }),
        }

        self.set_status(id, to);
        info!(asset = %id, %from, %to, "asset status changed");

        let affected = match to {
            AssetStatus::Failed => self.block_dependents_of(id),
            AssetStatus::Pending
            | AssetStatus::InProgress
            | AssetStatus::Complete
            | AssetStatus::Blocked => Vec::new(),
        };

        if !affected.is_empty() {
            warn!(
                asset = %id,
                blocked = affected.len(),
                "failure propagated; dependents blocked"
            );
        }

        Ok(affected)
    }

    /// Block `id` (if it is not terminal) and everything downstream of it,
    /// when one of its dependencies is `Failed` or `Blocked`.
    ///
    /// Used after a new edge lands on an unhealthy dependency.
    pub fn block_if_upstream_unhealthy(&mut self, id: AssetId) -> Vec<AssetId> {
        if self.unhealthy_dependencies(id).is_empty() {
            return Vec::new();
        }

        let mut changed = Vec::new();
        if self.block(id) {
            changed.push(id);
        }
        changed.extend(self.block_dependents_of(id));
        changed
    }

    /// Breadth-first walk over the transitive dependents of `root`, moving
    /// every `Pending` / `InProgress` asset to `Blocked`.
    ///
    /// `Complete` and `Failed` assets are terminal and keep their state.
    pub fn block_dependents_of(&mut self, root: AssetId) -> Vec<AssetId> {
        let mut queue: VecDeque<AssetId> =
            self.graph.dependents_of(root).iter().copied().collect();
        let mut visited: BTreeSet<AssetId> = BTreeSet::new();
        let mut changed = Vec::new();

        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            if self.block(id) {
                changed.push(id);
            }
            queue.extend(self.graph.dependents_of(id).iter().copied());
        }

        changed
    }

    /// Returns true if the asset moved to `Blocked`.
    fn block(&mut self, id: AssetId) -> bool {
        let Some(asset) = self.graph.get_mut(id) else {
            return false;
        };
        match asset.status {
            AssetStatus::Pending | AssetStatus::InProgress => {
                debug!(asset = %id, from = %asset.status, "blocking asset on upstream failure");
                asset.status = AssetStatus::Blocked;
                true
            }
            AssetStatus::Blocked | AssetStatus::Complete | AssetStatus::Failed => false,
        }
    }

    fn set_status(&mut self, id: AssetId, status: AssetStatus) {
        if let Some(asset) = self.graph.get_mut(id) {
            asset.status = status;
        }
    }
}
