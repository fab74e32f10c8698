// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of a raw mpsc sender,
//! so tests can record dispatched assets and answer with `AssetFinished`
//! events without spawning processes.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::dag::planner::StudioCapacity;
use crate::engine::{RuntimeEvent, WorkItem};
use crate::errors::{Error, Result};
use crate::exec::executor_loop::spawn_executor;

pub trait ExecutorBackend: Send {
    /// Hand the given assets to the execution layer.
    fn dispatch(
        &mut self,
        items: Vec<WorkItem>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: forwards work items to the background executor
/// loop started by [`spawn_executor`].
pub struct ProcessExecutorBackend {
    tx: mpsc::Sender<WorkItem>,
}

impl ProcessExecutorBackend {
    /// Start the executor loop, reporting outcomes to `runtime_tx`.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, capacity: StudioCapacity) -> Self {
        let tx = spawn_executor(runtime_tx, capacity);
        Self { tx }
    }
}

impl ExecutorBackend for ProcessExecutorBackend {
    fn dispatch(
        &mut self,
        items: Vec<WorkItem>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            for item in items {
                tx.send(item).await.map_err(Error::from)?;
            }
            Ok(())
        })
    }
}
