// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::core::{CoreRuntime, RunSummary};
use crate::engine::{CoreCommand, RuntimeEvent, WorkItem};
use crate::errors::Result;
use crate::exec::ExecutorBackend;

/// Async shell around [`CoreRuntime`]: reads events from a channel, feeds
/// them to the core and hands dispatched assets to an `ExecutorBackend`.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop. Returns once the core asks to stop, shutdown is
    /// requested, or every sender is gone.
    pub async fn run(mut self) -> Result<RunSummary> {
        info!(project = %self.core.project(), "assetdag runtime started");

        loop {
            let Some(event) = self.event_rx.recv().await else {
                info!("runtime event channel closed; exiting");
                break;
            };

            debug!(?event, "runtime received event");
            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        let summary = self.core.summary();
        info!(
            waves = summary.waves_dispatched,
            in_flight = summary.in_flight,
            "runtime exiting"
        );
        Ok(summary)
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchAssets(items) => self.dispatch(items).await,
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
                Ok(())
            }
        }
    }

    async fn dispatch(&mut self, items: Vec<WorkItem>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        debug!(assets = ?items.iter().map(|i| i.asset).collect::<Vec<_>>(), "dispatching to executor");
        self.executor.dispatch(items).await
    }
}
