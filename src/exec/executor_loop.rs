// src/exec/executor_loop.rs

//! Executor loop: one Tokio task per work item, gated by a semaphore per
//! studio.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dag::planner::StudioCapacity;
use crate::engine::{AssetOutcome, RuntimeEvent, WorkItem};
use crate::exec::task_runner::run_asset;
use crate::types::{AssetId, StudioId};

/// Spawn the background executor loop and return the sender that feeds it.
///
/// At most `capacity.limit_for(studio)` commands of one studio run at the
/// same time, and an asset is never run twice concurrently.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    capacity: StudioCapacity,
) -> mpsc::Sender<WorkItem> {
    let (tx, mut rx) = mpsc::channel::<WorkItem>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        let mut slots: HashMap<StudioId, Arc<Semaphore>> = HashMap::new();
        let mut active: HashMap<AssetId, JoinHandle<()>> = HashMap::new();

        while let Some(item) = rx.recv().await {
            active.retain(|_, handle| !handle.is_finished());

            if active.contains_key(&item.asset) {
                debug!(asset = %item.asset, "asset already running; ignoring duplicate dispatch");
                continue;
            }

            let semaphore = Arc::clone(
                slots
                    .entry(item.studio.clone())
                    .or_insert_with(|| Arc::new(Semaphore::new(capacity.limit_for(&item.studio)))),
            );
            let rt_tx = runtime_tx.clone();
            let asset = item.asset;

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    warn!(asset = %item.asset, "studio semaphore closed");
                    let _ = rt_tx
                        .send(RuntimeEvent::AssetFinished {
                            asset: item.asset,
                            outcome: AssetOutcome::Failed("executor shut down".to_string()),
                        })
                        .await;
                    return;
                };
                run_asset(item, rt_tx).await;
            });
            active.insert(asset, handle);
        }

        info!("executor loop finished (channel closed)");
    });

    tx
}
