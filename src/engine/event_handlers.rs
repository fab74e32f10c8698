// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, error, info, warn};

use crate::dag::planner::StudioCapacity;
use crate::dag::registry::AssetRegistry;
use crate::engine::{AssetOutcome, WorkItem};
use crate::errors::AssetDagError;
use crate::types::{AssetId, AssetStatus, ProjectId};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Send these assets to the executor.
    DispatchAssets(Vec<WorkItem>),
    /// Nothing left to dispatch; the run is over.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn idle() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    pub(crate) fn exit() -> Self {
        Self {
            commands: vec![CoreCommand::RequestExit],
            keep_running: false,
        }
    }
}

/// Read-only inputs the handlers need alongside the registry.
#[derive(Debug)]
pub(crate) struct PlanContext<'a> {
    pub registry: &'a AssetRegistry,
    pub project: &'a ProjectId,
    pub capacity: &'a StudioCapacity,
    pub commands: &'a BTreeMap<AssetId, String>,
}

/// Plan against the current registry state and dispatch the first wave.
///
/// Exits when no wave remains or planning deadlocks.
pub(crate) fn dispatch_next_wave(
    ctx: &PlanContext<'_>,
    in_flight: &mut BTreeSet<AssetId>,
    waves_dispatched: &mut usize,
) -> CoreStep {
    if !in_flight.is_empty() {
        debug!(in_flight = in_flight.len(), "wave still running; not re-planning");
        return CoreStep::idle();
    }

    let waves = match ctx.registry.plan_waves(ctx.project, ctx.capacity) {
        Ok(waves) => waves,
        Err(err) => {
            error!(project = %ctx.project, error = %err, "cannot plan next wave");
            return CoreStep::exit();
        }
    };

    let Some(wave) = waves.into_iter().next() else {
        info!(project = %ctx.project, "no schedulable assets left");
        return CoreStep::exit();
    };

    *waves_dispatched += 1;
    let index = *waves_dispatched;
    let mut items = Vec::with_capacity(wave.assignments.len());

    let mut awaiting = Vec::new();

    for assignment in wave.assignments {
        // Started elsewhere: wait for its outcome, do not run it twice.
        if assignment.already_in_progress {
            in_flight.insert(assignment.asset);
            awaiting.push(assignment.asset);
            continue;
        }
        if let Err(err) = ctx
            .registry
            .update_status(assignment.asset, AssetStatus::InProgress)
        {
            warn!(asset = %assignment.asset, error = %err, "could not start asset");
            continue;
        }
        let name = ctx
            .registry
            .asset(assignment.asset)
            .map(|a| a.name)
            .unwrap_or_default();
        in_flight.insert(assignment.asset);
        items.push(WorkItem {
            asset: assignment.asset,
            name,
            studio: assignment.studio,
            wave: index,
            cmd: ctx.commands.get(&assignment.asset).cloned(),
        });
    }

    if !awaiting.is_empty() {
        info!(
            project = %ctx.project,
            wave = index,
            assets = ?awaiting,
            "waiting on assets already in progress"
        );
    }

    if items.is_empty() {
        if in_flight.is_empty() {
            // Every start was refused; nothing will report back.
            error!(project = %ctx.project, wave = index, "wave could not be started");
            return CoreStep::exit();
        }
        return CoreStep::idle();
    }

    info!(
        project = %ctx.project,
        wave = index,
        assets = ?items.iter().map(|i| i.asset).collect::<Vec<_>>(),
        "dispatching wave"
    );

    CoreStep {
        commands: vec![CoreCommand::DispatchAssets(items)],
        keep_running: true,
    }
}

/// Record an outcome and, once the wave has drained, move to the next one.
pub(crate) fn handle_asset_finished(
    ctx: &PlanContext<'_>,
    in_flight: &mut BTreeSet<AssetId>,
    waves_dispatched: &mut usize,
    asset: AssetId,
    outcome: AssetOutcome,
) -> CoreStep {
    if !in_flight.remove(&asset) {
        warn!(%asset, ?outcome, "outcome for an asset that is not in flight; ignoring");
        return CoreStep::idle();
    }

    let status = match &outcome {
        AssetOutcome::Complete => AssetStatus::Complete,
        AssetOutcome::Failed(reason) => {
            warn!(%asset, %reason, "asset production failed");
            AssetStatus::Failed
        }
    };

    match ctx.registry.update_status(asset, status) {
        Ok(blocked) if !blocked.is_empty() => {
            warn!(%asset, blocked = ?blocked, "dependents blocked by failure");
        }
        Ok(_) => {}
        // Blocked while in flight: the result no longer applies.
        Err(AssetDagError::InvalidTransition { from, .. }) => {
            debug!(%asset, %from, "outcome discarded; asset changed state while running");
        }
        Err(err) => {
            warn!(%asset, error = %err, "could not record outcome");
        }
    }

    dispatch_next_wave(ctx, in_flight, waves_dispatched)
}
