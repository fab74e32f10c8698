// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::{AssetId, AssetStatus, ProjectId};

#[derive(Error, Debug)]
pub enum AssetDagError {
    #[error("Dependency cycle: {from} -> {to} would close a cycle ({path})")]
    Cycle {
        from: AssetId,
        to: AssetId,
        /// Existing chain from `to` back to `from`, rendered for diagnostics.
        path: String,
    },

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Unknown project: {0}")]
    UnknownProject(ProjectId),

    #[error("Dependencies of {asset} not satisfied: {unmet:?}")]
    DependencyNotSatisfied { asset: AssetId, unmet: Vec<AssetId> },

    #[error("Invalid transition for {asset}: {from} -> {to}")]
    InvalidTransition {
        asset: AssetId,
        from: AssetStatus,
        to: AssetStatus,
    },

    #[error("Edge {from} -> {to} is permanent: {to} is {status}")]
    PermanentEdge {
        from: AssetId,
        to: AssetId,
        status: AssetStatus,
    },

    #[error("Asset {asset} is {status} and can no longer change")]
    ImmutableAsset { asset: AssetId, status: AssetStatus },

    #[error("Asset {asset} cannot supersede itself")]
    SelfSupersession { asset: AssetId },

    #[error("Asset {asset} has no version {version}")]
    UnknownVersion { asset: AssetId, version: u32 },

    #[error("Deadlock while planning {project}: no schedulable asset among {remaining:?}")]
    Deadlock {
        project: ProjectId,
        remaining: Vec<AssetId>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AssetDagError>;
