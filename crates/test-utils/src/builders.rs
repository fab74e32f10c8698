#![allow(dead_code)]

use std::collections::BTreeMap;

use assetdag::config::{
    AssetConfig, ContinuityConfig, LinkConfig, Manifest, ProjectSection, RawManifest, StudioConfig,
};
use assetdag::config::model::DEFAULT_WAVE_BUFFER_HOURS;
use assetdag::continuity::{Dimension, Severity, Violation};
use assetdag::dag::LinkKind;
use assetdag::types::AssetType;

/// Builder for `Manifest` to simplify test setup.
pub struct ManifestBuilder {
    manifest: RawManifest,
}

impl ManifestBuilder {
    pub fn new(project: &str) -> Self {
        Self {
            manifest: RawManifest {
                project: ProjectSection {
                    id: project.to_string(),
                    wave_buffer_hours: DEFAULT_WAVE_BUFFER_HOURS,
                },
                studio: BTreeMap::new(),
                asset: BTreeMap::new(),
                continuity: ContinuityConfig::default(),
            },
        }
    }

    pub fn with_asset(mut self, key: &str, asset: AssetConfig) -> Self {
        self.manifest.asset.insert(key.to_string(), asset);
        self
    }

    pub fn with_studio(mut self, name: &str, capacity: usize) -> Self {
        self.manifest
            .studio
            .insert(name.to_string(), StudioConfig { capacity });
        self
    }

    pub fn with_wave_buffer(mut self, hours: f64) -> Self {
        self.manifest.project.wave_buffer_hours = hours;
        self
    }

    pub fn with_score(mut self, dimension: Dimension, score: f64) -> Self {
        self.manifest.continuity.scores.insert(dimension, score);
        self
    }

    pub fn with_violation(mut self, dimension: Dimension, severity: Severity, message: &str) -> Self {
        self.manifest
            .continuity
            .violations
            .push(Violation::new(dimension, severity, message));
        self
    }

    pub fn build_raw(self) -> RawManifest {
        self.manifest
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.manifest).expect("Failed to build valid manifest from builder")
    }
}

/// Builder for `AssetConfig`.
pub struct AssetConfigBuilder {
    asset: AssetConfig,
}

impl AssetConfigBuilder {
    pub fn new(name: &str, asset_type: AssetType) -> Self {
        Self {
            asset: AssetConfig {
                name: name.to_string(),
                asset_type,
                owner: None,
                after: vec![],
                links: vec![],
                cmd: None,
                metadata: BTreeMap::new(),
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.asset.after.push(dep.to_string());
        self
    }

    pub fn owner(mut self, studio: &str) -> Self {
        self.asset.owner = Some(studio.to_string());
        self
    }

    pub fn link(mut self, to: &str, kind: LinkKind, context: &str) -> Self {
        self.asset.links.push(LinkConfig {
            to: to.to_string(),
            kind,
            context: context.to_string(),
        });
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.asset.cmd = Some(cmd.to_string());
        self
    }

    pub fn estimated_hours(mut self, hours: f64) -> Self {
        self.asset
            .metadata
            .insert("estimated_hours".to_string(), hours.to_string());
        self
    }

    pub fn build(self) -> AssetConfig {
        self.asset
    }
}
