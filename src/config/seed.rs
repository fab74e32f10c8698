// src/config/seed.rs

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::model::Manifest;
use crate::continuity::{DimensionScores, Violation};
use crate::dag::asset::LinkMetadata;
use crate::dag::planner::StudioCapacity;
use crate::dag::registry::AssetRegistry;
use crate::errors::{AssetDagError, Result};
use crate::types::{AssetId, ProjectId, StudioId};

/// Everything the runtime needs once a manifest has been registered.
#[derive(Debug, Clone)]
pub struct SeededProject {
    pub project: ProjectId,
    /// Manifest key -> registry id.
    pub keys: BTreeMap<String, AssetId>,
    pub capacity: StudioCapacity,
    /// Work commands by asset; assets without one complete on dispatch.
    pub commands: BTreeMap<AssetId, String>,
    pub wave_buffer_hours: f64,
    pub scores: DimensionScores,
    pub violations: Vec<Violation>,
}

impl SeededProject {
    pub fn id_of(&self, key: &str) -> Result<AssetId> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| AssetDagError::UnknownAsset(format!("manifest key '{key}'")))
    }

    /// Reverse lookup used for human-readable output.
    pub fn key_of(&self, id: AssetId) -> Option<&str> {
        self.keys
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.as_str())
    }
}

/// Register every asset, dependency and link of `manifest` in `registry`.
///
/// Assets are registered in dependency order so that ids grow along the
/// graph, which keeps wave plans stable across runs of the same manifest.
pub fn seed_registry(registry: &AssetRegistry, manifest: &Manifest) -> Result<SeededProject> {
    let project = ProjectId::new(manifest.project.id.clone());
    let mut keys: BTreeMap<String, AssetId> = BTreeMap::new();
    let mut commands: BTreeMap<AssetId, String> = BTreeMap::new();

    for key in manifest.keys_in_dependency_order() {
        let cfg = &manifest.asset[key];
        let id = registry.register_asset(
            &project,
            cfg.name.clone(),
            cfg.asset_type,
            StudioId::new(cfg.effective_owner()),
            cfg.metadata.clone(),
        );
        if let Some(cmd) = &cfg.cmd {
            commands.insert(id, cmd.clone());
        }
        debug!(%project, key, asset = %id, "manifest asset registered");
        keys.insert(key.to_string(), id);
    }

    let lookup = |key: &str| -> Result<AssetId> {
        keys.get(key)
            .copied()
            .ok_or_else(|| AssetDagError::ConfigError(format!("unknown manifest key '{key}'")))
    };

    for (key, cfg) in manifest.asset.iter() {
        let from = lookup(key)?;
        for dep in cfg.after.iter() {
            registry.add_dependency(from, lookup(dep)?)?;
        }
        for link in cfg.links.iter() {
            registry.link_cross_medium(
                from,
                lookup(&link.to)?,
                LinkMetadata::new(link.kind, link.context.clone()),
            )?;
        }
    }

    let capacity: StudioCapacity = manifest
        .studio
        .iter()
        .map(|(name, s)| (StudioId::new(name.clone()), s.capacity))
        .collect();

    info!(
        %project,
        assets = keys.len(),
        studios = manifest.studio.len(),
        "manifest registered"
    );

    Ok(SeededProject {
        project,
        keys,
        capacity,
        commands,
        wave_buffer_hours: manifest.project.wave_buffer_hours,
        scores: manifest.continuity.scores.clone(),
        violations: manifest.continuity.violations.clone(),
    })
}
