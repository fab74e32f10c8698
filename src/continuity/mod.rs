// src/continuity/mod.rs

//! Continuity gate: turns externally produced quality signals into a
//! pass/fail decision for final assembly.
//!
//! - [`gate`] aggregates dimension scores and violations into a
//!   [`ContinuityReport`].
//! - [`checks`] derives structural violations from the graph itself
//!   (cross-medium partners that did not complete).
//!
//! Nothing here mutates the graph.

pub mod checks;
pub mod gate;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::AssetId;

pub use checks::cross_medium_violations;
pub use gate::{ASSEMBLY_THRESHOLD, ContinuityReport, QualityLevel, validate_continuity};

/// Quality dimension scored by an external reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Style,
    Narrative,
    #[serde(alias = "harmony", alias = "audio_visual_harmony")]
    AudioVisual,
    Brand,
    CrossMedium,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Dimension::Style => "style",
            Dimension::Narrative => "narrative",
            Dimension::AudioVisual => "audio_visual",
            Dimension::Brand => "brand",
            Dimension::CrossMedium => "cross_medium",
        };
        f.write_str(s)
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "style" => Ok(Dimension::Style),
            "narrative" => Ok(Dimension::Narrative),
            "audio_visual" | "harmony" | "audio_visual_harmony" => Ok(Dimension::AudioVisual),
            "brand" => Ok(Dimension::Brand),
            "cross_medium" => Ok(Dimension::CrossMedium),
            other => Err(format!("invalid continuity dimension: {other}")),
        }
    }
}

/// Normalised scores in `[0, 1]`, one per dimension.
pub type DimensionScores = BTreeMap<Dimension, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Must be fixed before release; vetoes assembly.
    Critical,
    Major,
    Minor,
    Suggestion,
}

/// An itemised continuity problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub dimension: Dimension,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub assets: Vec<AssetId>,
}

impl Violation {
    pub fn new(dimension: Dimension, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            dimension,
            severity,
            message: message.into(),
            assets: Vec::new(),
        }
    }

    pub fn with_assets(mut self, assets: impl IntoIterator<Item = AssetId>) -> Self {
        self.assets.extend(assets);
        self
    }
}
