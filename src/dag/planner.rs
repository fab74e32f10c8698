// src/dag/planner.rs

//! Wave planning: Kahn-style topological batching under per-studio
//! capacity limits.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::dag::graph::ProjectGraph;
use crate::errors::{AssetDagError, Result};
use crate::types::{AssetId, AssetStatus, StudioId};

/// Capacity used for studios that are absent from the capacity map.
pub const DEFAULT_STUDIO_CAPACITY: usize = 1;

/// Maximum number of concurrent assets per studio within one wave.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioCapacity {
    limits: BTreeMap<StudioId, usize>,
}

impl StudioCapacity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, studio: impl Into<String>, capacity: usize) -> Self {
        self.set(StudioId::new(studio), capacity);
        self
    }

    pub fn set(&mut self, studio: StudioId, capacity: usize) {
        self.limits.insert(studio, capacity);
    }

    /// Effective limit for a studio. Zero is clamped to one.
    pub fn limit_for(&self, studio: &StudioId) -> usize {
        self.limits
            .get(studio)
            .copied()
            .unwrap_or(DEFAULT_STUDIO_CAPACITY)
            .max(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StudioId, usize)> {
        self.limits.iter().map(|(s, c)| (s, *c))
    }
}

impl FromIterator<(StudioId, usize)> for StudioCapacity {
    fn from_iter<I: IntoIterator<Item = (StudioId, usize)>>(iter: I) -> Self {
        Self {
            limits: iter.into_iter().collect(),
        }
    }
}

/// One asset handed to one studio in a wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub asset: AssetId,
    pub studio: StudioId,
    /// The asset was already `InProgress` when the plan was made, so the
    /// execution layer should not start it again.
    pub already_in_progress: bool,
}

/// A batch of assets with no dependencies on one another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    /// 1-based position in the plan.
    pub index: usize,
    pub assignments: Vec<Assignment>,
}

impl Wave {
    pub fn asset_ids(&self) -> Vec<AssetId> {
        self.assignments.iter().map(|a| a.asset).collect()
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.assignments.iter().any(|a| a.asset == id)
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Selection key: assets already in progress first, then registration order.
type ReadyKey = (bool, AssetId);

fn ready_key(id: AssetId, status: AssetStatus) -> ReadyKey {
    (status != AssetStatus::InProgress, id)
}

/// Compute the wave sequence for the current state of `graph`.
///
/// Only `Pending` and `InProgress` assets are planned; `Blocked` assets are
/// never placed in a wave, and terminal assets are already resolved. The
/// graph is only read.
///
/// Ready assets are taken in ascending id order, except that within a studio
/// assets already `InProgress` come before every `Pending` one regardless of
/// id, since they hold a slot already.
pub fn plan_waves(graph: &ProjectGraph, capacity: &StudioCapacity) -> Result<Vec<Wave>> {
    let mut in_degree: BTreeMap<AssetId, usize> = BTreeMap::new();
    let mut ready: BTreeSet<ReadyKey> = BTreeSet::new();

    for asset in graph.assets() {
        match asset.status {
            AssetStatus::Pending | AssetStatus::InProgress => {}
            AssetStatus::Complete | AssetStatus::Blocked | AssetStatus::Failed => continue,
        }
        let unmet = asset
            .dependencies
            .iter()
            .filter(|dep| {
                graph
                    .get(**dep)
                    .is_none_or(|d| d.status != AssetStatus::Complete)
            })
            .count();
        in_degree.insert(asset.id, unmet);
        if unmet == 0 {
            ready.insert(ready_key(asset.id, asset.status));
        }
    }

    let mut remaining = in_degree.len();
    let mut waves = Vec::new();

    while remaining > 0 {
        if ready.is_empty() {
            let stuck: Vec<AssetId> = in_degree
                .iter()
                .filter(|(_, d)| **d > 0)
                .map(|(id, _)| *id)
                .collect();
            error!(
                project = %graph.project(),
                remaining = ?stuck,
                "wave planning deadlocked; dependency graph is inconsistent"
            );
            return Err(AssetDagError::Deadlock {
                project: graph.project().clone(),
                remaining: stuck,
            });
        }

        let mut load: BTreeMap<&StudioId, usize> = BTreeMap::new();
        let mut assignments = Vec::new();
        let mut spilled = BTreeSet::new();

        for key in std::mem::take(&mut ready) {
            let (_, id) = key;
            let Some(asset) = graph.get(id) else { continue };
            let used = load.entry(&asset.owner).or_insert(0);
            if *used < capacity.limit_for(&asset.owner) {
                *used += 1;
                assignments.push(Assignment {
                    asset: id,
                    studio: asset.owner.clone(),
                    already_in_progress: asset.status == AssetStatus::InProgress,
                });
            } else {
                spilled.insert(key);
            }
        }
        ready = spilled;

        for assignment in &assignments {
            remaining -= 1;
            in_degree.remove(&assignment.asset);
            for &dependent in graph.dependents_of(assignment.asset) {
                if let Some(d) = in_degree.get_mut(&dependent) {
                    *d -= 1;
                    if *d == 0 {
                        if let Some(a) = graph.get(dependent) {
                            ready.insert(ready_key(dependent, a.status));
                        }
                    }
                }
            }
        }

        assignments.sort_by_key(|a| a.asset);
        let index = waves.len() + 1;
        debug!(
            project = %graph.project(),
            wave = index,
            assets = ?assignments.iter().map(|a| a.asset).collect::<Vec<_>>(),
            "planned wave"
        );
        waves.push(Wave { index, assignments });
    }

    Ok(waves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::asset::Asset;
    use crate::types::{AssetType, Metadata, ProjectId};

    fn add(g: &mut ProjectGraph, id: u64, studio: &str) {
        g.insert(Asset::new(
            AssetId(id),
            ProjectId::from("p"),
            format!("a{id}"),
            AssetType::Graphic,
            StudioId::from(studio),
            Metadata::new(),
        ));
    }

    fn ids(waves: &[Wave]) -> Vec<Vec<u64>> {
        waves
            .iter()
            .map(|w| w.asset_ids().into_iter().map(|a| a.0).collect())
            .collect()
    }

    #[test]
    fn capacity_spills_only_the_saturated_studio() {
        let mut g = ProjectGraph::new(ProjectId::from("p"));
        add(&mut g, 1, "gfx");
        add(&mut g, 2, "gfx");
        add(&mut g, 3, "gfx");
        add(&mut g, 4, "audio");
        let cap = StudioCapacity::new().with("gfx", 2).with("audio", 1);

        let waves = plan_waves(&g, &cap).unwrap();
        assert_eq!(ids(&waves), vec![vec![1, 2, 4], vec![3]]);
    }

    #[test]
    fn spilled_asset_does_not_wait_for_unrelated_dependents() {
        // 1, 2 on gfx (cap 1); 3 (audio) depends on 1.
        let mut g = ProjectGraph::new(ProjectId::from("p"));
        add(&mut g, 1, "gfx");
        add(&mut g, 2, "gfx");
        add(&mut g, 3, "audio");
        g.add_edge(AssetId(3), AssetId(1)).unwrap();

        let waves = plan_waves(&g, &StudioCapacity::new()).unwrap();
        assert_eq!(ids(&waves), vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn in_progress_assets_keep_their_slot() {
        let mut g = ProjectGraph::new(ProjectId::from("p"));
        add(&mut g, 1, "gfx");
        add(&mut g, 2, "gfx");
        g.get_mut(AssetId(2)).unwrap().status = AssetStatus::InProgress;

        let waves = plan_waves(&g, &StudioCapacity::new()).unwrap();
        assert_eq!(ids(&waves), vec![vec![2], vec![1]]);
        assert!(waves[0].assignments[0].already_in_progress);
    }

    #[test]
    fn blocked_and_terminal_assets_are_not_planned() {
        let mut g = ProjectGraph::new(ProjectId::from("p"));
        add(&mut g, 1, "gfx");
        add(&mut g, 2, "gfx");
        add(&mut g, 3, "gfx");
        g.get_mut(AssetId(1)).unwrap().status = AssetStatus::Complete;
        g.get_mut(AssetId(2)).unwrap().status = AssetStatus::Blocked;

        let waves = plan_waves(&g, &StudioCapacity::new()).unwrap();
        assert_eq!(ids(&waves), vec![vec![3]]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cap = StudioCapacity::new().with("gfx", 0);
        assert_eq!(cap.limit_for(&StudioId::from("gfx")), 1);
        assert_eq!(cap.limit_for(&StudioId::from("unknown")), DEFAULT_STUDIO_CAPACITY);
    }

    #[test]
    fn inconsistent_snapshot_reports_deadlock() {
        // A pending asset on a failed dependency breaks the blocking
        // invariant; the planner must surface it rather than loop.
        let mut g = ProjectGraph::new(ProjectId::from("p"));
        add(&mut g, 1, "gfx");
        add(&mut g, 2, "gfx");
        g.add_edge(AssetId(2), AssetId(1)).unwrap();
        g.get_mut(AssetId(1)).unwrap().status = AssetStatus::Failed;

        match plan_waves(&g, &StudioCapacity::new()) {
            Err(AssetDagError::Deadlock { remaining, .. }) => assert_eq!(remaining, vec![AssetId(2)]),
            other => panic!("expected deadlock, got {other:?}"),
        }
    }

    #[test]
    fn empty_graph_yields_no_waves() {
        let g = ProjectGraph::new(ProjectId::from("p"));
        assert!(plan_waves(&g, &StudioCapacity::new()).unwrap().is_empty());
    }
}
