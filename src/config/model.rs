// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::continuity::{DimensionScores, Violation};
use crate::dag::asset::LinkKind;
use crate::types::{AssetType, Metadata};

/// Hours inserted between consecutive waves when the manifest is silent.
pub const DEFAULT_WAVE_BUFFER_HOURS: f64 = 2.0;

/// Project manifest as read from TOML, before validation.
///
/// ```toml
/// [project]
/// id = "launch_pack"
///
/// [studio.audio]
/// capacity = 1
///
/// [asset.script]
/// name = "Launch script"
/// type = "script"
///
/// [asset.voiceover]
/// name = "Narration"
/// type = "voiceover"
/// after = ["script"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    pub project: ProjectSection,

    /// `[studio.<name>]` sections, keyed by studio id.
    #[serde(default)]
    pub studio: BTreeMap<String, StudioConfig>,

    /// `[asset.<key>]` sections. Keys are only used to wire `after` and
    /// `links` inside the manifest; the registry assigns real ids.
    #[serde(default)]
    pub asset: BTreeMap<String, AssetConfig>,

    #[serde(default)]
    pub continuity: ContinuityConfig,
}

/// Validated manifest. Only obtainable through `TryFrom<RawManifest>`.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub project: ProjectSection,
    pub studio: BTreeMap<String, StudioConfig>,
    pub asset: BTreeMap<String, AssetConfig>,
    pub continuity: ContinuityConfig,
}

impl Manifest {
    pub(crate) fn new_unchecked(raw: RawManifest) -> Self {
        Self {
            project: raw.project,
            studio: raw.studio,
            asset: raw.asset,
            continuity: raw.continuity,
        }
    }

    /// Manifest keys in dependency order (dependencies first, then by key).
    pub fn keys_in_dependency_order(&self) -> Vec<&str> {
        let mut placed: Vec<&str> = Vec::with_capacity(self.asset.len());
        let mut remaining: Vec<&str> = self.asset.keys().map(String::as_str).collect();

        while !remaining.is_empty() {
            let before = remaining.len();
            remaining.retain(|key| {
                let ready = self.asset[*key]
                    .after
                    .iter()
                    .all(|dep| placed.contains(&dep.as_str()));
                if ready {
                    placed.push(*key);
                }
                !ready
            });
            // Validated manifests are acyclic; this only guards misuse.
            if remaining.len() == before {
                placed.extend(remaining.drain(..));
            }
        }
        placed
    }
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    pub id: String,

    #[serde(default = "default_wave_buffer_hours")]
    pub wave_buffer_hours: f64,
}

fn default_wave_buffer_hours() -> f64 {
    DEFAULT_WAVE_BUFFER_HOURS
}

/// `[studio.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StudioConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    crate::dag::planner::DEFAULT_STUDIO_CAPACITY
}

/// `[asset.<key>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub asset_type: AssetType,

    /// Producing studio. Falls back to [`AssetType::default_studio`].
    #[serde(default)]
    pub owner: Option<String>,

    /// Manifest keys this asset depends on.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub links: Vec<LinkConfig>,

    /// Shell command the executor runs to produce the asset. Assets
    /// without one complete as soon as they are dispatched.
    #[serde(default)]
    pub cmd: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl AssetConfig {
    pub fn effective_owner(&self) -> String {
        self.owner
            .clone()
            .unwrap_or_else(|| self.asset_type.default_studio().to_string())
    }
}

/// Entry of an asset's `links = [...]` list.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    pub to: String,
    #[serde(default)]
    pub kind: LinkKind,
    #[serde(default)]
    pub context: String,
}

/// `[continuity]` section: externally produced quality signals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContinuityConfig {
    #[serde(default)]
    pub scores: DimensionScores,
    #[serde(default)]
    pub violations: Vec<Violation>,
}
