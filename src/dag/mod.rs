// src/dag/mod.rs

//! Asset graph and scheduling.
//!
//! - [`asset`] defines asset records and cross-medium links.
//! - [`graph`] holds one project's dependency graph and keeps the
//!   dependents relation in step with every edge change.
//! - [`propagator`] applies status transitions and blocks downstream work
//!   when something fails.
//! - [`planner`] batches schedulable assets into capacity-bounded waves.
//! - [`timeline`] turns waves into an hours estimate.
//! - [`report`] builds read-only views over a project.
//! - [`registry`] is the thread-safe, multi-project front door.

pub mod asset;
pub mod graph;
pub mod planner;
pub mod propagator;
pub mod registry;
pub mod report;
pub mod timeline;

pub use asset::{Asset, CrossMediumLink, LinkKind, LinkMetadata, VersionRecord};
pub use graph::ProjectGraph;
pub use planner::{Assignment, StudioCapacity, Wave, plan_waves};
pub use propagator::StatusPropagator;
pub use registry::AssetRegistry;
pub use report::{AssetMap, CrossMediumReport, CrossMediumUsage, DependencyReport, ProductionStatus};
pub use timeline::{TimelineEstimate, estimate_timeline};
