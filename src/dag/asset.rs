// src/dag/asset.rs

//! Asset records and the cross-medium link types stored alongside them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{AssetId, AssetStatus, AssetType, Metadata, ProjectId, StudioId};

/// One entry in an asset's append-only version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: u32,
    pub changes: String,
    /// blake3 hex digest of the replacement payload, if one was supplied.
    pub content_hash: Option<String>,
}

/// A unit of production work tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub project: ProjectId,
    pub name: String,
    pub asset_type: AssetType,
    pub owner: StudioId,
    pub status: AssetStatus,
    /// Highest version ever produced; bumped on every content replacement.
    pub version: u32,
    /// Version currently in effect. Differs from `version` after a rollback.
    pub current_version: u32,
    /// Assets this one requires as inputs.
    pub dependencies: BTreeSet<AssetId>,
    /// Non-ordering relations, maintained symmetrically.
    pub cross_medium_links: BTreeSet<AssetId>,
    pub metadata: Metadata,
    /// Replacement asset recorded when a dependent was re-pointed away
    /// from this one.
    pub superseded_by: Option<AssetId>,
    pub history: Vec<VersionRecord>,
}

impl Asset {
    pub(crate) fn new(
        id: AssetId,
        project: ProjectId,
        name: String,
        asset_type: AssetType,
        owner: StudioId,
        metadata: Metadata,
    ) -> Self {
        Self {
            id,
            project,
            name,
            asset_type,
            owner,
            status: AssetStatus::Pending,
            version: 1,
            current_version: 1,
            dependencies: BTreeSet::new(),
            cross_medium_links: BTreeSet::new(),
            metadata,
            superseded_by: None,
            history: vec![VersionRecord {
                version: 1,
                changes: "initial registration".to_string(),
                content_hash: None,
            }],
        }
    }

    /// Estimated production time, read from the `estimated_hours` metadata
    /// key. Falls back to `default` when missing or unparsable.
    pub fn estimated_hours(&self, default: f64) -> f64 {
        self.metadata
            .get("estimated_hours")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|h| h.is_finite() && *h >= 0.0)
            .unwrap_or(default)
    }
}

/// Family of a cross-medium association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    GraphicInVideo,
    AudioInVideo,
    PaletteUsage,
    CharacterAppearance,
    #[default]
    Other,
}

/// Caller-supplied description of a cross-medium link.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub kind: LinkKind,
    pub context: String,
}

impl LinkMetadata {
    pub fn new(kind: LinkKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }
}

/// Stored cross-medium link. `a` is always the lower id so that the
/// symmetric relation has a single canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossMediumLink {
    pub a: AssetId,
    pub b: AssetId,
    pub kind: LinkKind,
    pub context: String,
}

impl CrossMediumLink {
    pub(crate) fn canonical(x: AssetId, y: AssetId, meta: LinkMetadata) -> Self {
        let (a, b) = if x <= y { (x, y) } else { (y, x) };
        Self {
            a,
            b,
            kind: meta.kind,
            context: meta.context,
        }
    }

    /// The other end of the link, if `id` is one of its ends.
    pub fn partner_of(&self, id: AssetId) -> Option<AssetId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}
