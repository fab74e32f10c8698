// src/lib.rs

pub mod cli;
pub mod config;
pub mod continuity;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, OutputFormat};
use crate::config::{SeededProject, load_and_validate, seed_registry};
use crate::continuity::{ContinuityReport, cross_medium_violations};
use crate::dag::{
    AssetRegistry, DependencyReport, ProductionStatus, ProjectGraph, StudioCapacity,
    TimelineEstimate, Wave, estimate_timeline,
};
use crate::engine::{CoreRuntime, RunSummary, Runtime, RuntimeEvent};
use crate::exec::ProcessExecutorBackend;

/// Dry-run output.
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub waves: Vec<Wave>,
    pub timeline: TimelineEstimate,
    pub dependencies: DependencyReport,
}

/// Output of a full run.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub waves_dispatched: usize,
    pub production: ProductionStatus,
    pub continuity: ContinuityReport,
}

/// High-level entry point used by `main.rs`.
///
/// Loads and registers the manifest, then either prints the plan
/// (`--dry-run`) or runs every wave through the process executor and
/// finishes with the continuity gate.
pub async fn run(args: CliArgs) -> Result<()> {
    let manifest = load_and_validate(&args.manifest)?;
    let registry = Arc::new(AssetRegistry::new());
    let seeded = seed_registry(&registry, &manifest)?;

    let mut capacity = seeded.capacity.clone();
    for (studio, n) in args.capacity.iter() {
        capacity.set(studio.clone(), *n);
    }

    if args.dry_run {
        let output = plan_output(&registry, &seeded, &capacity)?;
        print_plan(args.format, &registry.snapshot(&seeded.project)?, &output)?;
        debug!("dry-run complete (no execution)");
        return Ok(());
    }

    let summary = run_production(Arc::clone(&registry), &seeded, capacity).await?;
    let output = gate_output(&registry, &seeded, summary)?;
    print_run(args.format, &output)?;

    if !output.continuity.ready_for_assembly {
        warn!(project = %seeded.project, "final assembly withheld by continuity gate");
    }
    Ok(())
}

/// Plan every remaining wave and estimate the timeline.
pub fn plan_output(
    registry: &AssetRegistry,
    seeded: &SeededProject,
    capacity: &StudioCapacity,
) -> Result<PlanOutput> {
    let snapshot = registry.snapshot(&seeded.project)?;
    let waves = registry.plan_waves(&seeded.project, capacity)?;
    let timeline = estimate_timeline(&snapshot, &waves, seeded.wave_buffer_hours);
    Ok(PlanOutput {
        waves,
        timeline,
        dependencies: DependencyReport::from_graph(&snapshot),
    })
}

/// Drive the project to completion with the process executor.
pub async fn run_production(
    registry: Arc<AssetRegistry>,
    seeded: &SeededProject,
    capacity: StudioCapacity,
) -> Result<RunSummary> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = ProcessExecutorBackend::new(rt_tx.clone(), capacity.clone());

    // Ctrl-C -> graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    rt_tx.send(RuntimeEvent::PlanRequested).await?;

    let core = CoreRuntime::new(
        registry,
        seeded.project.clone(),
        capacity,
        seeded.commands.clone(),
    );
    let summary = Runtime::new(core, rt_rx, executor).run().await?;
    info!(
        project = %seeded.project,
        waves = summary.waves_dispatched,
        "production run finished"
    );
    Ok(summary)
}

/// Apply the continuity gate to the project's current state.
///
/// Violations declared in the manifest are combined with those derived from
/// unresolved cross-medium links.
pub fn gate_output(
    registry: &AssetRegistry,
    seeded: &SeededProject,
    summary: RunSummary,
) -> Result<RunOutput> {
    let snapshot = registry.snapshot(&seeded.project)?;
    let mut violations = seeded.violations.clone();
    violations.extend(cross_medium_violations(&snapshot));

    let continuity = registry.validate_continuity(&seeded.project, &seeded.scores, violations)?;
    let production = registry.production_status(&seeded.project)?;
    Ok(RunOutput {
        waves_dispatched: summary.waves_dispatched,
        production,
        continuity,
    })
}

fn asset_label(graph: &ProjectGraph, id: crate::types::AssetId) -> String {
    match graph.get(id) {
        Some(a) => format!("{} ({id}, {})", a.name, a.asset_type),
        None => id.to_string(),
    }
}

fn print_plan(format: OutputFormat, graph: &ProjectGraph, output: &PlanOutput) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    println!("assetdag dry-run: project {}", graph.project());
    println!("  assets: {}", graph.len());
    println!("  dependency depth: {}", output.dependencies.dependency_depth);
    println!();

    for wave in &output.waves {
        println!("wave {}:", wave.index);
        for a in &wave.assignments {
            let mark = if a.already_in_progress { " [in progress]" } else { "" };
            println!("  - [{}] {}{mark}", a.studio, asset_label(graph, a.asset));
        }
    }
    println!();

    let t = &output.timeline;
    for w in &t.waves {
        println!("  wave {}: {:.1}h{}", w.index, w.hours, if w.parallel { " (parallel)" } else { "" });
    }
    println!(
        "estimated total: {:.1}h ({:.1}h buffer between waves)",
        t.total_hours, t.buffer_hours
    );
    Ok(())
}

fn print_run(format: OutputFormat, output: &RunOutput) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    let p = &output.production;
    let c = &output.continuity;
    println!("assetdag run: project {}", p.project_id);
    println!("  waves dispatched: {}", output.waves_dispatched);
    println!(
        "  complete: {}/{} ({:.1}%)",
        p.ready_for_assembly.len(),
        p.total_assets,
        p.completion_percentage
    );
    for blocked in &p.blocking_issues {
        println!("  blocked: {} ({}) by {:?}", blocked.name, blocked.id, blocked.blocked_by);
    }
    println!(
        "  continuity: {:.3} ({:?}), {} violation(s), {} critical",
        c.overall_score,
        c.quality_level,
        c.violations.len(),
        c.critical_violations()
    );
    for v in &c.violations {
        println!("    [{:?}] {}: {}", v.severity, v.dimension, v.message);
    }
    println!(
        "  ready for assembly: {}",
        if c.ready_for_assembly { "yes" } else { "no" }
    );
    Ok(())
}
