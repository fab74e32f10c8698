// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s and returns [`CoreStep`]s describing
//! what the IO shell should do next. It has no channels and spawns nothing,
//! so it can be driven step by step in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::dag::planner::StudioCapacity;
use crate::dag::registry::AssetRegistry;
use crate::engine::event_handlers::{
    CoreStep, PlanContext, dispatch_next_wave, handle_asset_finished,
};
use crate::engine::RuntimeEvent;
use crate::types::{AssetId, ProjectId};

/// Counters reported once a run is over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub waves_dispatched: usize,
    pub in_flight: usize,
}

#[derive(Debug)]
pub struct CoreRuntime {
    registry: Arc<AssetRegistry>,
    project: ProjectId,
    capacity: StudioCapacity,
    commands: BTreeMap<AssetId, String>,
    in_flight: BTreeSet<AssetId>,
    waves_dispatched: usize,
}

impl CoreRuntime {
    pub fn new(
        registry: Arc<AssetRegistry>,
        project: ProjectId,
        capacity: StudioCapacity,
        commands: BTreeMap<AssetId, String>,
    ) -> Self {
        Self {
            registry,
            project,
            capacity,
            commands,
            in_flight: BTreeSet::new(),
            waves_dispatched: 0,
        }
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn registry(&self) -> &Arc<AssetRegistry> {
        &self.registry
    }

    /// Assets dispatched and not yet reported back.
    pub fn in_flight(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.in_flight.iter().copied()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            waves_dispatched: self.waves_dispatched,
            in_flight: self.in_flight.len(),
        }
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let ctx = PlanContext {
            registry: &self.registry,
            project: &self.project,
            capacity: &self.capacity,
            commands: &self.commands,
        };

        match event {
            RuntimeEvent::PlanRequested => {
                dispatch_next_wave(&ctx, &mut self.in_flight, &mut self.waves_dispatched)
            }
            RuntimeEvent::AssetFinished { asset, outcome } => handle_asset_finished(
                &ctx,
                &mut self.in_flight,
                &mut self.waves_dispatched,
                asset,
                outcome,
            ),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AssetOutcome, CoreCommand, WorkItem};
    use crate::types::{AssetStatus, AssetType, Metadata, StudioId};

    fn chain() -> (Arc<AssetRegistry>, ProjectId, AssetId, AssetId) {
        let registry = Arc::new(AssetRegistry::new());
        let project = ProjectId::from("core");
        let script = registry.register_asset(
            &project,
            "script",
            AssetType::Script,
            StudioId::from("shared"),
            Metadata::new(),
        );
        let vo = registry.register_asset(
            &project,
            "voiceover",
            AssetType::Voiceover,
            StudioId::from("audio"),
            Metadata::new(),
        );
        registry.add_dependency(vo, script).unwrap();
        (registry, project, script, vo)
    }

    fn dispatched(step: &CoreStep) -> Vec<AssetId> {
        let mut out = Vec::new();
        for command in &step.commands {
            if let CoreCommand::DispatchAssets(items) = command {
                out.extend(items.iter().map(|i: &WorkItem| i.asset));
            }
        }
        out
    }

    #[test]
    fn runs_waves_in_dependency_order() {
        let (registry, project, script, vo) = chain();
        let mut core = CoreRuntime::new(
            Arc::clone(&registry),
            project,
            StudioCapacity::new(),
            BTreeMap::new(),
        );

        let step = core.step(RuntimeEvent::PlanRequested);
        assert_eq!(dispatched(&step), vec![script]);
        assert_eq!(registry.status_of(script).unwrap(), AssetStatus::InProgress);

        let step = core.step(RuntimeEvent::AssetFinished {
            asset: script,
            outcome: AssetOutcome::Complete,
        });
        assert_eq!(dispatched(&step), vec![vo]);

        let step = core.step(RuntimeEvent::AssetFinished {
            asset: vo,
            outcome: AssetOutcome::Complete,
        });
        assert!(!step.keep_running);
        assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
        assert_eq!(core.summary().waves_dispatched, 2);
    }

    #[test]
    fn failure_blocks_downstream_and_ends_the_run() {
        let (registry, project, script, vo) = chain();
        let mut core =
            CoreRuntime::new(Arc::clone(&registry), project, StudioCapacity::new(), BTreeMap::new());

        core.step(RuntimeEvent::PlanRequested);
        let step = core.step(RuntimeEvent::AssetFinished {
            asset: script,
            outcome: AssetOutcome::Failed("exit code 1".into()),
        });

        assert!(!step.keep_running);
        assert_eq!(registry.status_of(script).unwrap(), AssetStatus::Failed);
        assert_eq!(registry.status_of(vo).unwrap(), AssetStatus::Blocked);
    }

    #[test]
    fn stray_outcomes_are_ignored() {
        let (registry, project, _script, vo) = chain();
        let mut core =
            CoreRuntime::new(Arc::clone(&registry), project, StudioCapacity::new(), BTreeMap::new());

        core.step(RuntimeEvent::PlanRequested);
        let step = core.step(RuntimeEvent::AssetFinished {
            asset: vo,
            outcome: AssetOutcome::Complete,
        });
        assert!(step.keep_running);
        assert!(step.commands.is_empty());
        assert_eq!(registry.status_of(vo).unwrap(), AssetStatus::Pending);
    }

    #[test]
    fn assets_already_in_progress_are_awaited_not_restarted() {
        let registry = Arc::new(AssetRegistry::new());
        let project = ProjectId::from("core");
        let render = registry.register_asset(
            &project,
            "render",
            AssetType::Graphic,
            StudioId::from("graphics"),
            Metadata::new(),
        );
        let mix = registry.register_asset(
            &project,
            "mix",
            AssetType::AudioMix,
            StudioId::from("audio"),
            Metadata::new(),
        );
        registry.update_status(render, AssetStatus::InProgress).unwrap();

        let commands = BTreeMap::from([
            (render, "render.sh".to_string()),
            (mix, "mix.sh".to_string()),
        ]);
        let mut core =
            CoreRuntime::new(Arc::clone(&registry), project, StudioCapacity::new(), commands);

        let step = core.step(RuntimeEvent::PlanRequested);
        assert_eq!(dispatched(&step), vec![mix]);
        assert_eq!(core.in_flight().collect::<Vec<_>>(), vec![render, mix]);

        let step = core.step(RuntimeEvent::AssetFinished {
            asset: render,
            outcome: AssetOutcome::Complete,
        });
        assert!(step.keep_running);
        assert!(step.commands.is_empty());
        assert_eq!(registry.status_of(render).unwrap(), AssetStatus::Complete);

        let step = core.step(RuntimeEvent::AssetFinished {
            asset: mix,
            outcome: AssetOutcome::Complete,
        });
        assert!(!step.keep_running);
        assert_eq!(core.summary().waves_dispatched, 1);
    }

    #[test]
    fn wave_of_only_running_assets_waits_for_outcomes() {
        let (registry, project, script, _vo) = chain();
        registry.update_status(script, AssetStatus::InProgress).unwrap();
        let mut core =
            CoreRuntime::new(Arc::clone(&registry), project, StudioCapacity::new(), BTreeMap::new());

        let step = core.step(RuntimeEvent::PlanRequested);
        assert!(step.keep_running);
        assert!(step.commands.is_empty());
        assert_eq!(core.summary().in_flight, 1);
    }
}
