// src/dag/registry.rs

//! Process-wide asset registry.
//!
//! Each project's graph sits behind its own `RwLock`: mutations on a project
//! are serialised by its write lock, while reports and planning clone a
//! point-in-time snapshot under the read lock. Asset ids come from one
//! registry-wide counter, so they are unique across projects and never
//! reused.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::continuity::{ContinuityReport, DimensionScores, Violation, validate_continuity};
use crate::dag::asset::{Asset, LinkMetadata, VersionRecord};
use crate::dag::graph::ProjectGraph;
use crate::dag::planner::{StudioCapacity, Wave, plan_waves};
use crate::dag::propagator::StatusPropagator;
use crate::dag::report::{
    AssetMap, CrossMediumReport, CrossMediumUsage, DependencyReport, ProductionStatus,
};
use crate::errors::{AssetDagError, Result};
use crate::types::{AssetId, AssetStatus, AssetType, Metadata, ProjectId, StudioId};

/// Shared handle to one project's graph.
pub type ProjectHandle = Arc<RwLock<ProjectGraph>>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct AssetRegistry {
    next_id: AtomicU64,
    projects: RwLock<BTreeMap<ProjectId, ProjectHandle>>,
    /// Which project each issued id belongs to.
    index: RwLock<HashMap<AssetId, ProjectId>>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            projects: RwLock::new(BTreeMap::new()),
            index: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new asset. Always succeeds; the project is created on
    /// first use.
    pub fn register_asset(
        &self,
        project: &ProjectId,
        name: impl Into<String>,
        asset_type: AssetType,
        owner: StudioId,
        metadata: Metadata,
    ) -> AssetId {
        let id = AssetId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let name = name.into();
        let handle = self.project_handle_or_create(project);

        {
            let mut graph = write(&handle);
            graph.insert(Asset::new(
                id,
                project.clone(),
                name.clone(),
                asset_type,
                owner.clone(),
                metadata,
            ));
        }
        write(&self.index).insert(id, project.clone());

        info!(%project, asset = %id, %name, %asset_type, %owner, "asset registered");
        id
    }

    /// Declare that `from` requires `to`.
    ///
    /// Returns the ids that became `Blocked` because `to` is already
    /// `Failed` or `Blocked`.
    pub fn add_dependency(&self, from: AssetId, to: AssetId) -> Result<Vec<AssetId>> {
        let project = self.same_project(from, to)?;
        self.write_project(&project, |graph| {
            if graph.dependencies_of(from).contains(&to) {
                return Ok(Vec::new());
            }

            let from_status = graph.require(from)?.status;
            let to_status = graph.require(to)?.status;
            if from_status == AssetStatus::Complete && to_status != AssetStatus::Complete {
                return Err(AssetDagError::DependencyNotSatisfied {
                    asset: from,
                    unmet: vec![to],
                });
            }

            graph.add_edge(from, to)?;
            let blocked = StatusPropagator::new(graph).block_if_upstream_unhealthy(from);
            info!(%project, %from, %to, blocked = blocked.len(), "dependency added");
            Ok(blocked)
        })
    }

    /// Associate two assets across media. Does not affect ordering.
    pub fn link_cross_medium(&self, a: AssetId, b: AssetId, link: LinkMetadata) -> Result<()> {
        let project = self.same_project(a, b)?;
        if a == b {
            debug!(asset = %a, "ignoring cross-medium link of an asset to itself");
            return Ok(());
        }
        self.write_project(&project, |graph| {
            let kind = link.kind;
            if graph.add_link(a, b, link)? {
                info!(%project, %a, %b, ?kind, "cross-medium link recorded");
            }
            Ok(())
        })
    }

    /// Apply a status transition and propagate it.
    pub fn update_status(&self, id: AssetId, status: AssetStatus) -> Result<Vec<AssetId>> {
        let project = self.project_of(id)?;
        self.write_project(&project, |graph| {
            StatusPropagator::new(graph).update_status(id, status)
        })
    }

    /// Supersede a failed or blocked dependency: swap `dependent -> old` for
    /// `dependent -> new` and record `new` as `old`'s successor.
    ///
    /// The dependent keeps its status; returning a blocked dependent to
    /// `Pending` is a separate, explicit `update_status` call.
    pub fn repoint_dependency(
        &self,
        dependent: AssetId,
        old: AssetId,
        new: AssetId,
    ) -> Result<Vec<AssetId>> {
        let project = self.same_project(dependent, old)?;
        if self.project_of(new)? != project {
            return Err(AssetDagError::UnknownAsset(format!(
                "{new} is not registered in project {project}"
            )));
        }
        if old == new {
            return Err(AssetDagError::SelfSupersession { asset: old });
        }

        self.write_project(&project, |graph| {
            let dependent_status = graph.require(dependent)?.status;
            if dependent_status.is_terminal() {
                return Err(AssetDagError::ImmutableAsset {
                    asset: dependent,
                    status: dependent_status,
                });
            }

            let old_status = graph.require(old)?.status;
            match old_status {
                AssetStatus::Failed | AssetStatus::Blocked => {}
                AssetStatus::Pending | AssetStatus::InProgress | AssetStatus::Complete => {
                    return Err(AssetDagError::PermanentEdge {
                        from: dependent,
                        to: old,
                        status: old_status,
                    });
                }
            }

            graph.replace_edge(dependent, old, new)?;
            if let Some(asset) = graph.get_mut(old) {
                asset.superseded_by = Some(new);
            }
            let blocked = StatusPropagator::new(graph).block_if_upstream_unhealthy(dependent);
            info!(%project, %dependent, %old, %new, "dependency re-pointed to replacement");
            Ok(blocked)
        })
    }

    /// Record a content replacement, bumping the asset's version.
    pub fn replace_content(
        &self,
        id: AssetId,
        changes: impl Into<String>,
        payload: Option<&[u8]>,
    ) -> Result<u32> {
        let project = self.project_of(id)?;
        let changes = changes.into();
        self.write_project(&project, |graph| {
            let status = graph.require(id)?.status;
            if status.is_terminal() {
                return Err(AssetDagError::ImmutableAsset { asset: id, status });
            }
            let asset = graph
                .get_mut(id)
                .ok_or_else(|| AssetDagError::UnknownAsset(id.to_string()))?;
            asset.version += 1;
            asset.current_version = asset.version;
            asset.history.push(VersionRecord {
                version: asset.version,
                changes,
                content_hash: payload.map(|bytes| blake3::hash(bytes).to_hex().to_string()),
            });
            info!(asset = %id, version = asset.version, "asset content replaced");
            Ok(asset.version)
        })
    }

    /// Make an earlier version current again.
    ///
    /// History stays append-only: the rollback is recorded as a new entry
    /// carrying the restored version's content hash, and `version` keeps its
    /// high-water mark so later replacements never reuse a number.
    pub fn rollback_version(&self, id: AssetId, target: u32) -> Result<u32> {
        let project = self.project_of(id)?;
        self.write_project(&project, |graph| {
            let status = graph.require(id)?.status;
            if status.is_terminal() {
                return Err(AssetDagError::ImmutableAsset { asset: id, status });
            }
            let asset = graph
                .get_mut(id)
                .ok_or_else(|| AssetDagError::UnknownAsset(id.to_string()))?;
            let restored = asset
                .history
                .iter()
                .find(|r| r.version == target)
                .map(|r| r.content_hash.clone())
                .ok_or(AssetDagError::UnknownVersion {
                    asset: id,
                    version: target,
                })?;

            asset.current_version = target;
            asset.history.push(VersionRecord {
                version: target,
                changes: format!("rolled back to version {target}"),
                content_hash: restored,
            });
            info!(asset = %id, version = target, "asset rolled back");
            Ok(target)
        })
    }

    /// Whether every dependency of `id` is `Complete`, with the ones that
    /// are not.
    pub fn asset_readiness(&self, id: AssetId) -> Result<(bool, Vec<AssetId>)> {
        let project = self.project_of(id)?;
        self.read_project(&project, |graph| {
            graph.require(id)?;
            let missing = graph.unmet_dependencies(id);
            Ok((missing.is_empty(), missing))
        })?
    }

    /// Cross-medium links touching one asset.
    pub fn cross_medium_usage(&self, id: AssetId) -> Result<CrossMediumUsage> {
        let project = self.project_of(id)?;
        self.read_project(&project, |graph| CrossMediumUsage::for_asset(graph, id))?
    }

    pub fn projects(&self) -> Vec<ProjectId> {
        read(&self.projects).keys().cloned().collect()
    }

    /// Project an asset was registered in.
    pub fn project_of(&self, id: AssetId) -> Result<ProjectId> {
        read(&self.index)
            .get(&id)
            .cloned()
            .ok_or_else(|| AssetDagError::UnknownAsset(id.to_string()))
    }

    pub fn asset(&self, id: AssetId) -> Result<Asset> {
        let project = self.project_of(id)?;
        self.read_project(&project, |graph| graph.require(id).cloned())?
    }

    pub fn status_of(&self, id: AssetId) -> Result<AssetStatus> {
        Ok(self.asset(id)?.status)
    }

    /// Point-in-time copy of a project's graph.
    pub fn snapshot(&self, project: &ProjectId) -> Result<ProjectGraph> {
        self.read_project(project, |graph| graph.clone())
    }

    pub fn assets_by_project(&self, project: &ProjectId) -> Result<Vec<Asset>> {
        self.assets_matching(project, |_| true)
    }

    pub fn assets_by_type(&self, project: &ProjectId, asset_type: AssetType) -> Result<Vec<Asset>> {
        self.assets_matching(project, |a| a.asset_type == asset_type)
    }

    pub fn assets_by_owner(&self, project: &ProjectId, owner: &StudioId) -> Result<Vec<Asset>> {
        self.assets_matching(project, |a| &a.owner == owner)
    }

    pub fn assets_by_status(&self, project: &ProjectId, status: AssetStatus) -> Result<Vec<Asset>> {
        self.assets_matching(project, |a| a.status == status)
    }

    fn assets_matching(
        &self,
        project: &ProjectId,
        keep: impl Fn(&Asset) -> bool,
    ) -> Result<Vec<Asset>> {
        self.read_project(project, |graph| {
            graph.assets().filter(|a| keep(a)).cloned().collect()
        })
    }

    pub fn dependency_report(&self, project: &ProjectId) -> Result<DependencyReport> {
        self.read_project(project, DependencyReport::from_graph)
    }

    pub fn cross_medium_report(&self, project: &ProjectId) -> Result<CrossMediumReport> {
        self.read_project(project, CrossMediumReport::from_graph)
    }

    pub fn asset_map(&self, project: &ProjectId) -> Result<AssetMap> {
        self.read_project(project, AssetMap::from_graph)
    }

    pub fn production_status(&self, project: &ProjectId) -> Result<ProductionStatus> {
        self.read_project(project, ProductionStatus::from_graph)
    }

    /// Plan waves against a snapshot; the registry is not modified.
    pub fn plan_waves(&self, project: &ProjectId, capacity: &StudioCapacity) -> Result<Vec<Wave>> {
        let snapshot = self.snapshot(project)?;
        plan_waves(&snapshot, capacity)
    }

    /// Run the continuity gate for a project.
    pub fn validate_continuity(
        &self,
        project: &ProjectId,
        scores: &DimensionScores,
        violations: Vec<Violation>,
    ) -> Result<ContinuityReport> {
        self.read_project(project, |graph| validate_continuity(graph, scores, violations))
    }

    pub fn project_handle(&self, project: &ProjectId) -> Result<ProjectHandle> {
        read(&self.projects)
            .get(project)
            .cloned()
            .ok_or_else(|| AssetDagError::UnknownProject(project.clone()))
    }

    fn project_handle_or_create(&self, project: &ProjectId) -> ProjectHandle {
        if let Some(handle) = read(&self.projects).get(project) {
            return Arc::clone(handle);
        }
        let mut projects = write(&self.projects);
        Arc::clone(projects.entry(project.clone()).or_insert_with(|| {
            debug!(%project, "creating project graph");
            Arc::new(RwLock::new(ProjectGraph::new(project.clone())))
        }))
    }

    fn same_project(&self, a: AssetId, b: AssetId) -> Result<ProjectId> {
        let pa = self.project_of(a)?;
        let pb = self.project_of(b)?;
        if pa != pb {
            return Err(AssetDagError::UnknownAsset(format!(
                "{b} is not registered in project {pa}"
            )));
        }
        Ok(pa)
    }

    fn read_project<R>(&self, project: &ProjectId, f: impl FnOnce(&ProjectGraph) -> R) -> Result<R> {
        let handle = self.project_handle(project)?;
        let graph = read(&handle);
        Ok(f(&graph))
    }

    fn write_project<R>(
        &self,
        project: &ProjectId,
        f: impl FnOnce(&mut ProjectGraph) -> Result<R>,
    ) -> Result<R> {
        let handle = self.project_handle(project)?;
        let mut graph = write(&handle);
        f(&mut graph)
    }
}
