// src/config/mod.rs

//! Project manifest loading and validation.
//!
//! - `model.rs` defines the TOML-backed data model.
//! - `loader.rs` reads a manifest from disk.
//! - `validate.rs` checks references, capacities and acyclicity.
//! - `seed.rs` registers a validated manifest in an [`AssetRegistry`].
//!
//! [`AssetRegistry`]: crate::dag::AssetRegistry

pub mod loader;
pub mod model;
pub mod seed;
pub mod validate;

pub use loader::{default_manifest_path, load_and_validate, load_from_path, parse_manifest};
pub use model::{AssetConfig, ContinuityConfig, LinkConfig, Manifest, ProjectSection, RawManifest, StudioConfig};
pub use seed::{SeededProject, seed_registry};
