// src/dag/report.rs

//! Plain-data snapshots of a project graph for downstream tools.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dag::asset::{CrossMediumLink, LinkKind};
use crate::dag::graph::ProjectGraph;
use crate::errors::Result;
use crate::types::{AssetId, AssetStatus, AssetType, ProjectId, StudioId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: AssetId,
    pub name: String,
    pub asset_type: AssetType,
    pub owner: StudioId,
    pub status: AssetStatus,
    pub version: u32,
}

/// `from` requires `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    pub from: AssetId,
    pub to: AssetId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub project_id: ProjectId,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    /// Number of assets on the longest dependency chain.
    pub dependency_depth: usize,
    pub critical_path: Vec<AssetId>,
}

impl DependencyReport {
    pub fn from_graph(graph: &ProjectGraph) -> Self {
        let nodes = graph
            .assets()
            .map(|a| NodeView {
                id: a.id,
                name: a.name.clone(),
                asset_type: a.asset_type,
                owner: a.owner.clone(),
                status: a.status,
                version: a.version,
            })
            .collect();
        let edges = graph
            .assets()
            .flat_map(|a| a.dependencies.iter().map(move |&to| EdgeView { from: a.id, to }))
            .collect();
        let critical_path = graph.critical_path();

        Self {
            project_id: graph.project().clone(),
            nodes,
            edges,
            dependency_depth: critical_path.len(),
            critical_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossMediumReport {
    pub project_id: ProjectId,
    pub links: Vec<CrossMediumLink>,
}

impl CrossMediumReport {
    pub fn from_graph(graph: &ProjectGraph) -> Self {
        Self {
            project_id: graph.project().clone(),
            links: graph.links().to_vec(),
        }
    }
}

/// Cross-medium associations of one asset, with partners grouped by link
/// kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossMediumUsage {
    pub asset: AssetId,
    pub by_kind: BTreeMap<LinkKind, Vec<AssetId>>,
    pub links: Vec<CrossMediumLink>,
}

impl CrossMediumUsage {
    pub fn for_asset(graph: &ProjectGraph, id: AssetId) -> Result<Self> {
        graph.require(id)?;
        let mut usage = CrossMediumUsage {
            asset: id,
            by_kind: BTreeMap::new(),
            links: Vec::new(),
        };
        for link in graph.links() {
            if let Some(partner) = link.partner_of(id) {
                usage.by_kind.entry(link.kind).or_default().push(partner);
                usage.links.push(link.clone());
            }
        }
        Ok(usage)
    }
}

/// Asset ids grouped by type, owner and status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetMap {
    pub project_id: ProjectId,
    pub total_assets: usize,
    pub by_type: BTreeMap<AssetType, Vec<AssetId>>,
    pub by_owner: BTreeMap<StudioId, Vec<AssetId>>,
    pub by_status: BTreeMap<AssetStatus, Vec<AssetId>>,
}

impl AssetMap {
    pub fn from_graph(graph: &ProjectGraph) -> Self {
        let mut map = AssetMap {
            project_id: graph.project().clone(),
            total_assets: graph.len(),
            ..Default::default()
        };
        for a in graph.assets() {
            map.by_type.entry(a.asset_type).or_default().push(a.id);
            map.by_owner.entry(a.owner.clone()).or_default().push(a.id);
            map.by_status.entry(a.status).or_default().push(a.id);
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedAsset {
    pub id: AssetId,
    pub name: String,
    /// Direct dependencies that are `Failed` or `Blocked`.
    pub blocked_by: Vec<AssetId>,
}

/// Production radar: where every asset of a project stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionStatus {
    pub project_id: ProjectId,
    pub total_assets: usize,
    pub by_status: BTreeMap<AssetStatus, usize>,
    pub completion_percentage: f64,
    pub ready_for_assembly: Vec<AssetId>,
    pub blocking_issues: Vec<BlockedAsset>,
}

impl ProductionStatus {
    pub fn from_graph(graph: &ProjectGraph) -> Self {
        let mut by_status: BTreeMap<AssetStatus, usize> =
            AssetStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut ready_for_assembly = Vec::new();
        let mut blocking_issues = Vec::new();

        for a in graph.assets() {
            *by_status.entry(a.status).or_default() += 1;
            match a.status {
                AssetStatus::Complete => ready_for_assembly.push(a.id),
                AssetStatus::Blocked => {
                    let blocked_by = a
                        .dependencies
                        .iter()
                        .copied()
                        .filter(|d| {
                            graph.get(*d).is_some_and(|dep| {
                                matches!(dep.status, AssetStatus::Failed | AssetStatus::Blocked)
                            })
                        })
                        .collect();
                    blocking_issues.push(BlockedAsset {
                        id: a.id,
                        name: a.name.clone(),
                        blocked_by,
                    });
                }
                AssetStatus::Pending | AssetStatus::InProgress | AssetStatus::Failed => {}
            }
        }

        let total = graph.len();
        let completion_percentage = if total == 0 {
            0.0
        } else {
            ready_for_assembly.len() as f64 * 100.0 / total as f64
        };

        Self {
            project_id: graph.project().clone(),
            total_assets: total,
            by_status,
            completion_percentage,
            ready_for_assembly,
            blocking_issues,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.by_status
            .iter()
            .all(|(status, count)| *count == 0 || status.is_terminal())
    }
}
