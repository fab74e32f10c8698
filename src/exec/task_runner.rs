// src/exec/task_runner.rs

//! Runs the command that produces one asset.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::{AssetOutcome, RuntimeEvent, WorkItem};

/// Run `item`'s command and report the outcome to the runtime.
///
/// Items without a command complete immediately. Spawn or wait errors are
/// reported as failures.
pub async fn run_asset(item: WorkItem, runtime_tx: mpsc::Sender<RuntimeEvent>) {
    let asset = item.asset;
    let outcome = match run_asset_inner(&item).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(%asset, error = %err, "asset execution error");
            AssetOutcome::Failed(format!("{err:#}"))
        }
    };

    if runtime_tx
        .send(RuntimeEvent::AssetFinished { asset, outcome })
        .await
        .is_err()
    {
        debug!(%asset, "runtime gone before outcome could be reported");
    }
}

async fn run_asset_inner(item: &WorkItem) -> Result<AssetOutcome> {
    let Some(cmd_line) = item.cmd.as_deref() else {
        debug!(asset = %item.asset, name = %item.name, "no command; marking complete");
        return Ok(AssetOutcome::Complete);
    };

    info!(
        asset = %item.asset,
        name = %item.name,
        studio = %item.studio,
        wave = item.wave,
        cmd = %cmd_line,
        "starting asset process"
    );

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    cmd.env("ASSETDAG_ASSET_ID", item.asset.0.to_string())
        .env("ASSETDAG_ASSET_NAME", &item.name)
        .env("ASSETDAG_STUDIO", item.studio.as_str())
        .env("ASSETDAG_WAVE", item.wave.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for asset '{}'", item.name))?;

    // Drain both pipes so the child never blocks on a full buffer.
    if let Some(stdout) = child.stdout.take() {
        let asset = item.asset;
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(%asset, "stdout: {}", line);
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        let asset = item.asset;
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(%asset, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of asset '{}'", item.name))?;
    let code = status.code().unwrap_or(-1);

    info!(
        asset = %item.asset,
        exit_code = code,
        success = status.success(),
        "asset process exited"
    );

    Ok(if status.success() {
        AssetOutcome::Complete
    } else {
        AssetOutcome::Failed(format!("exit code {code}"))
    })
}
