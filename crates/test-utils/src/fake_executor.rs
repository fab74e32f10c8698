use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use assetdag::engine::{AssetOutcome, RuntimeEvent, WorkItem};
use assetdag::errors::Result;
use assetdag::exec::ExecutorBackend;

/// A fake executor that:
/// - records every dispatched work item
/// - immediately reports an outcome: `Failed` for asset names listed in
///   `failing`, `Complete` for everything else.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<WorkItem>>>,
    failing: BTreeSet<String>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<WorkItem>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            failing: BTreeSet::new(),
        }
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn dispatch(
        &mut self,
        items: Vec<WorkItem>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let failing = self.failing.clone();

        Box::pin(async move {
            for item in items {
                executed.lock().unwrap().push(item.clone());

                let outcome = if failing.contains(&item.name) {
                    AssetOutcome::Failed("fake failure".to_string())
                } else {
                    AssetOutcome::Complete
                };
                tx.send(RuntimeEvent::AssetFinished {
                    asset: item.asset,
                    outcome,
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
