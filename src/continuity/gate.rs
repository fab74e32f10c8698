// src/continuity/gate.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::continuity::{Dimension, DimensionScores, Severity, Violation};
use crate::dag::graph::ProjectGraph;
use crate::types::{AssetStatus, ProjectId};

/// Minimum mean score for assembly to proceed.
pub const ASSEMBLY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Excellent,
    Good,
    Acceptable,
    NeedsWork,
    Critical,
}

impl QualityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            QualityLevel::Excellent
        } else if score >= 0.7 {
            QualityLevel::Good
        } else if score >= ASSEMBLY_THRESHOLD {
            QualityLevel::Acceptable
        } else if score >= 0.3 {
            QualityLevel::NeedsWork
        } else {
            QualityLevel::Critical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuityReport {
    pub project_id: ProjectId,
    pub overall_score: f64,
    pub quality_level: QualityLevel,
    pub ready_for_assembly: bool,
    pub dimension_scores: DimensionScores,
    pub violations: Vec<Violation>,
    pub violations_by_severity: BTreeMap<Severity, usize>,
    pub total_assets: usize,
    pub complete_assets: usize,
}

impl ContinuityReport {
    pub fn critical_violations(&self) -> usize {
        self.violations_by_severity
            .get(&Severity::Critical)
            .copied()
            .unwrap_or(0)
    }
}

fn normalise(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Aggregate scores and violations for `graph`'s project.
///
/// The overall score is the unweighted mean of the supplied dimensions.
/// Assembly is allowed only when that mean reaches [`ASSEMBLY_THRESHOLD`]
/// and no violation is critical.
pub fn validate_continuity(
    graph: &ProjectGraph,
    scores: &DimensionScores,
    violations: Vec<Violation>,
) -> ContinuityReport {
    let dimension_scores: BTreeMap<Dimension, f64> =
        scores.iter().map(|(d, s)| (*d, normalise(*s))).collect();

    let overall_score = if dimension_scores.is_empty() {
        0.0
    } else {
        dimension_scores.values().sum::<f64>() / dimension_scores.len() as f64
    };

    let mut violations_by_severity: BTreeMap<Severity, usize> = [
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Suggestion,
    ]
    .into_iter()
    .map(|s| (s, 0))
    .collect();
    for v in &violations {
        *violations_by_severity.entry(v.severity).or_default() += 1;
    }

    let critical = violations_by_severity
        .get(&Severity::Critical)
        .copied()
        .unwrap_or(0);
    let ready_for_assembly = overall_score >= ASSEMBLY_THRESHOLD && critical == 0;
    let quality_level = QualityLevel::from_score(overall_score);

    let complete_assets = graph
        .assets()
        .filter(|a| a.status == AssetStatus::Complete)
        .count();

    if ready_for_assembly {
        info!(
            project = %graph.project(),
            overall_score,
            ?quality_level,
            "continuity gate passed"
        );
    } else {
        warn!(
            project = %graph.project(),
            overall_score,
            critical,
            "continuity gate withheld assembly"
        );
    }

    ContinuityReport {
        project_id: graph.project().clone(),
        overall_score,
        quality_level,
        ready_for_assembly,
        dimension_scores,
        violations,
        violations_by_severity,
        total_assets: graph.len(),
        complete_assets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_graph() -> ProjectGraph {
        ProjectGraph::new(ProjectId::from("p"))
    }

    fn scores(pairs: &[(Dimension, f64)]) -> DimensionScores {
        pairs.iter().copied().collect()
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(QualityLevel::from_score(0.9), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(0.7), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(0.5), QualityLevel::Acceptable);
        assert_eq!(QualityLevel::from_score(0.3), QualityLevel::NeedsWork);
        assert_eq!(QualityLevel::from_score(0.29), QualityLevel::Critical);
    }

    #[test]
    fn low_mean_withholds_assembly() {
        let r = validate_continuity(
            &empty_graph(),
            &scores(&[(Dimension::Style, 0.4), (Dimension::Brand, 0.5)]),
            Vec::new(),
        );
        assert!((r.overall_score - 0.45).abs() < 1e-9);
        assert_eq!(r.quality_level, QualityLevel::NeedsWork);
        assert!(!r.ready_for_assembly);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let r = validate_continuity(
            &empty_graph(),
            &scores(&[(Dimension::Style, 1.7), (Dimension::Brand, f64::NAN)]),
            Vec::new(),
        );
        assert_eq!(r.dimension_scores[&Dimension::Style], 1.0);
        assert_eq!(r.dimension_scores[&Dimension::Brand], 0.0);
        assert_eq!(r.overall_score, 0.5);
    }

    #[test]
    fn no_scores_means_not_ready() {
        let r = validate_continuity(&empty_graph(), &DimensionScores::new(), Vec::new());
        assert_eq!(r.overall_score, 0.0);
        assert!(!r.ready_for_assembly);
    }

    #[test]
    fn non_critical_violations_do_not_veto() {
        let r = validate_continuity(
            &empty_graph(),
            &scores(&[(Dimension::Style, 0.8)]),
            vec![
                Violation::new(Dimension::Style, Severity::Major, "kerning"),
                Violation::new(Dimension::Style, Severity::Minor, "margin"),
            ],
        );
        assert!(r.ready_for_assembly);
        assert_eq!(r.violations_by_severity[&Severity::Major], 1);
        assert_eq!(r.critical_violations(), 0);
    }
}
