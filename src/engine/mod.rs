// src/engine/mod.rs

//! Production run engine.
//!
//! The pure state machine lives in [`core`]: it plans waves against the
//! registry, hands one wave at a time to the execution layer and folds
//! outcomes back in as status updates. The async shell in [`runtime`]
//! feeds it events from a channel and forwards its commands to an
//! [`ExecutorBackend`](crate::exec::ExecutorBackend).

use crate::types::{AssetId, StudioId};

/// How one attempt at producing an asset ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    Complete,
    Failed(String),
}

/// An asset handed to the execution layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub asset: AssetId,
    pub name: String,
    pub studio: StudioId,
    /// 1-based index of the wave this item was dispatched in.
    pub wave: usize,
    /// Shell command producing the asset, if any.
    pub cmd: Option<String>,
}

/// Events flowing into the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Plan and dispatch the next wave if nothing is in flight.
    PlanRequested,
    /// The execution layer finished an attempt.
    AssetFinished {
        asset: AssetId,
        outcome: AssetOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::{CoreRuntime, RunSummary};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
