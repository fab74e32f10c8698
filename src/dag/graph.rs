// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::dag::asset::{Asset, CrossMediumLink, LinkMetadata};
use crate::errors::{AssetDagError, Result};
use crate::types::{AssetId, AssetStatus, ProjectId};

static NO_ASSETS: BTreeSet<AssetId> = BTreeSet::new();

/// In-memory dependency graph of a single project.
///
/// Edges live in each asset's `dependencies` set; the inverse relation is
/// cached in `dependents` and updated in the same call that changes an edge,
/// so the two never drift. Cross-medium links are kept apart and never take
/// part in reachability or ordering.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    project: ProjectId,
    assets: BTreeMap<AssetId, Asset>,
    dependents: BTreeMap<AssetId, BTreeSet<AssetId>>,
    links: Vec<CrossMediumLink>,
}

impl ProjectGraph {
    pub fn new(project: ProjectId) -> Self {
        Self {
            project,
            assets: BTreeMap::new(),
            dependents: BTreeMap::new(),
            links: Vec::new(),
        }
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.assets.contains_key(&id)
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AssetId) -> Option<&mut Asset> {
        self.assets.get_mut(&id)
    }

    /// Look up an asset or fail with `UnknownAsset`.
    pub fn require(&self, id: AssetId) -> Result<&Asset> {
        self.assets
            .get(&id)
            .ok_or_else(|| AssetDagError::UnknownAsset(format!("{id} in project {}", self.project)))
    }

    /// All assets in registration order.
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn links(&self) -> &[CrossMediumLink] {
        &self.links
    }

    /// Immediate dependencies of an asset.
    pub fn dependencies_of(&self, id: AssetId) -> &BTreeSet<AssetId> {
        self.assets
            .get(&id)
            .map(|a| &a.dependencies)
            .unwrap_or(&NO_ASSETS)
    }

    /// Dependencies of `id` that are not yet `Complete`.
    pub fn unmet_dependencies(&self, id: AssetId) -> Vec<AssetId> {
        self.dependencies_of(id)
            .iter()
            .copied()
            .filter(|dep| {
                self.get(*dep)
                    .is_none_or(|a| a.status != AssetStatus::Complete)
            })
            .collect()
    }

    /// Immediate dependents of an asset (assets listing it as a dependency).
    pub fn dependents_of(&self, id: AssetId) -> &BTreeSet<AssetId> {
        self.dependents.get(&id).unwrap_or(&NO_ASSETS)
    }

    pub(crate) fn insert(&mut self, asset: Asset) {
        self.dependents.entry(asset.id).or_default();
        self.assets.insert(asset.id, asset);
    }

    /// Depth-first search along dependency edges from `start`, returning the
    /// chain `start -> ... -> goal` if `goal` is reachable.
    ///
    /// Visits each node at most once, so the cost is O(V+E) for the project.
    pub fn find_path(&self, start: AssetId, goal: AssetId) -> Option<Vec<AssetId>> {
        let mut parent: HashMap<AssetId, AssetId> = HashMap::new();
        let mut visited: BTreeSet<AssetId> = BTreeSet::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            if node == goal {
                let mut path = vec![goal];
                let mut cur = goal;
                while let Some(&p) = parent.get(&cur) {
                    path.push(p);
                    cur = p;
                }
                path.reverse();
                return Some(path);
            }
            for &dep in self.dependencies_of(node) {
                if !visited.contains(&dep) {
                    parent.entry(dep).or_insert(node);
                    stack.push(dep);
                }
            }
        }

        None
    }

    fn ensure_acyclic_edge(&self, from: AssetId, to: AssetId) -> Result<()> {
        // `from -> to` closes a cycle iff `to` already reaches `from`.
        if let Some(path) = self.find_path(to, from) {
            let rendered = path
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(AssetDagError::Cycle {
                from,
                to,
                path: rendered,
            });
        }
        Ok(())
    }

    /// Record that `from` requires `to`.
    ///
    /// Returns `Ok(false)` when the edge already existed. Nothing changes on
    /// error.
    pub(crate) fn add_edge(&mut self, from: AssetId, to: AssetId) -> Result<bool> {
        self.require(from)?;
        self.require(to)?;

        if self.dependencies_of(from).contains(&to) {
            return Ok(false);
        }
        self.ensure_acyclic_edge(from, to)?;

        if let Some(asset) = self.assets.get_mut(&from) {
            asset.dependencies.insert(to);
        }
        self.dependents.entry(to).or_default().insert(from);

        debug!(project = %self.project, %from, %to, "dependency edge added");
        Ok(true)
    }

    /// Swap the edge `dependent -> old` for `dependent -> new`.
    pub(crate) fn replace_edge(
        &mut self,
        dependent: AssetId,
        old: AssetId,
        new: AssetId,
    ) -> Result<()> {
        self.require(dependent)?;
        self.require(old)?;
        self.require(new)?;

        if !self.dependencies_of(dependent).contains(&old) {
            return Err(AssetDagError::UnknownAsset(format!(
                "{dependent} has no dependency on {old}"
            )));
        }
        if old == new {
            return Err(AssetDagError::SelfSupersession { asset: old });
        }
        self.ensure_acyclic_edge(dependent, new)?;

        if let Some(asset) = self.assets.get_mut(&dependent) {
            asset.dependencies.remove(&old);
            asset.dependencies.insert(new);
        }
        if let Some(set) = self.dependents.get_mut(&old) {
            set.remove(&dependent);
        }
        self.dependents.entry(new).or_default().insert(dependent);

        debug!(project = %self.project, %dependent, %old, %new, "dependency edge re-pointed");
        Ok(())
    }

    /// Add a symmetric cross-medium link. Returns `Ok(false)` if an
    /// identical link (same ends and kind) already exists.
    pub(crate) fn add_link(&mut self, x: AssetId, y: AssetId, meta: LinkMetadata) -> Result<bool> {
        self.require(x)?;
        self.require(y)?;

        let link = CrossMediumLink::canonical(x, y, meta);
        if self
            .links
            .iter()
            .any(|l| l.a == link.a && l.b == link.b && l.kind == link.kind)
        {
            return Ok(false);
        }

        if let Some(asset) = self.assets.get_mut(&x) {
            asset.cross_medium_links.insert(y);
        }
        if let Some(asset) = self.assets.get_mut(&y) {
            asset.cross_medium_links.insert(x);
        }
        self.links.push(link);
        Ok(true)
    }

    /// Recompute the dependents relation from scratch.
    pub fn recompute_dependents(&self) -> BTreeMap<AssetId, BTreeSet<AssetId>> {
        let mut out: BTreeMap<AssetId, BTreeSet<AssetId>> =
            self.assets.keys().map(|&id| (id, BTreeSet::new())).collect();
        for asset in self.assets.values() {
            for &dep in &asset.dependencies {
                out.entry(dep).or_default().insert(asset.id);
            }
        }
        out
    }

    /// Whether the cached dependents relation matches the edge set.
    pub fn dependents_consistent(&self) -> bool {
        self.recompute_dependents() == self.dependents
    }

    /// Topological order (dependencies first), lowest id first among peers.
    pub fn topological_order(&self) -> Vec<AssetId> {
        let mut in_degree: BTreeMap<AssetId, usize> = self
            .assets
            .values()
            .map(|a| (a.id, a.dependencies.len()))
            .collect();
        let mut ready: BTreeSet<AssetId> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut order = Vec::with_capacity(self.assets.len());
        while let Some(id) = ready.pop_first() {
            order.push(id);
            for &dependent in self.dependents_of(id) {
                if let Some(d) = in_degree.get_mut(&dependent) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }
        order
    }

    /// One longest dependency chain, listed dependency-first. Ties resolve to
    /// the lowest ids.
    pub fn critical_path(&self) -> Vec<AssetId> {
        let mut depth: BTreeMap<AssetId, usize> = BTreeMap::new();
        for id in self.topological_order() {
            let d = self
                .dependencies_of(id)
                .iter()
                .filter_map(|dep| depth.get(dep))
                .max()
                .map_or(1, |d| d + 1);
            depth.insert(id, d);
        }

        // Highest depth, lowest id.
        let Some((&tail, _)) = depth
            .iter()
            .max_by(|(ia, da), (ib, db)| da.cmp(db).then(ib.cmp(ia)))
        else {
            return Vec::new();
        };

        let mut path = vec![tail];
        let mut cur = tail;
        loop {
            let next = self
                .dependencies_of(cur)
                .iter()
                .filter_map(|dep| depth.get(dep).map(|d| (*dep, *d)))
                .max_by(|(ia, da), (ib, db)| da.cmp(db).then(ib.cmp(ia)));
            match next {
                Some((dep, _)) => {
                    path.push(dep);
                    cur = dep;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}
