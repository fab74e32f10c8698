// src/dag/timeline.rs

//! Rough schedule estimate for a wave plan.

use serde::{Deserialize, Serialize};

use crate::dag::graph::ProjectGraph;
use crate::dag::planner::Wave;

/// Hours assumed for assets without an `estimated_hours` metadata entry.
pub const DEFAULT_ESTIMATED_HOURS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveEstimate {
    pub index: usize,
    /// Members run concurrently, so a wave lasts as long as its slowest
    /// member.
    pub hours: f64,
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEstimate {
    pub waves: Vec<WaveEstimate>,
    pub buffer_hours: f64,
    pub total_hours: f64,
}

/// Estimate wall-clock hours for `waves`, inserting `buffer_hours` between
/// consecutive waves.
pub fn estimate_timeline(graph: &ProjectGraph, waves: &[Wave], buffer_hours: f64) -> TimelineEstimate {
    let buffer_hours = buffer_hours.max(0.0);
    let estimates: Vec<WaveEstimate> = waves
        .iter()
        .map(|wave| {
            let hours = wave
                .assignments
                .iter()
                .filter_map(|a| graph.get(a.asset))
                .map(|a| a.estimated_hours(DEFAULT_ESTIMATED_HOURS))
                .fold(0.0_f64, f64::max);
            WaveEstimate {
                index: wave.index,
                hours,
                parallel: wave.assignments.len() > 1,
            }
        })
        .collect();

    let work: f64 = estimates.iter().map(|w| w.hours).sum();
    let gaps = estimates.len().saturating_sub(1) as f64;

    TimelineEstimate {
        total_hours: work + gaps * buffer_hours,
        waves: estimates,
        buffer_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::asset::Asset;
    use crate::dag::planner::{plan_waves, StudioCapacity};
    use crate::types::{AssetId, AssetType, Metadata, ProjectId, StudioId};

    fn add(g: &mut ProjectGraph, id: u64, studio: &str, hours: Option<&str>) {
        let mut metadata = Metadata::new();
        if let Some(h) = hours {
            metadata.insert("estimated_hours".into(), h.into());
        }
        g.insert(Asset::new(
            AssetId(id),
            ProjectId::from("p"),
            format!("a{id}"),
            AssetType::Music,
            StudioId::from(studio),
            metadata,
        ));
    }

    #[test]
    fn parallel_wave_takes_its_longest_member() {
        let mut g = ProjectGraph::new(ProjectId::from("p"));
        add(&mut g, 1, "audio", Some("1"));
        add(&mut g, 2, "video", Some("3"));
        add(&mut g, 3, "audio", None);
        g.add_edge(AssetId(3), AssetId(1)).unwrap();

        let waves = plan_waves(&g, &StudioCapacity::new()).unwrap();
        let t = estimate_timeline(&g, &waves, 0.5);

        assert_eq!(t.waves.len(), 2);
        assert_eq!(t.waves[0].hours, 3.0);
        assert!(t.waves[0].parallel);
        assert_eq!(t.waves[1].hours, DEFAULT_ESTIMATED_HOURS);
        assert_eq!(t.total_hours, 3.0 + 0.5 + 2.0);
    }

    #[test]
    fn empty_plan_has_zero_duration() {
        let g = ProjectGraph::new(ProjectId::from("p"));
        let t = estimate_timeline(&g, &[], 2.0);
        assert_eq!(t.total_hours, 0.0);
    }
}
