// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Read a manifest from disk without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let contents = fs::read_to_string(path.as_ref())?;
    let manifest: RawManifest = toml::from_str(&contents)?;
    Ok(manifest)
}

/// Parse and validate manifest text.
pub fn parse_manifest(contents: &str) -> Result<Manifest> {
    let raw: RawManifest = toml::from_str(contents)?;
    Manifest::try_from(raw)
}

/// Read a manifest and run validation: unknown references, self
/// dependencies, cycles, studio capacities and score ranges.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw = load_from_path(&path)?;
    Manifest::try_from(raw)
}

/// `Assetdag.toml` in the current working directory.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("Assetdag.toml")
}
