// src/continuity/checks.rs

use crate::continuity::{Dimension, Severity, Violation};
use crate::dag::graph::ProjectGraph;
use crate::types::AssetStatus;

fn severity_for(status: AssetStatus) -> Option<Severity> {
    match status {
        AssetStatus::Complete => None,
        AssetStatus::Failed => Some(Severity::Critical),
        AssetStatus::Blocked => Some(Severity::Major),
        AssetStatus::Pending | AssetStatus::InProgress => Some(Severity::Minor),
    }
}

/// One violation per cross-medium link whose ends are not both complete.
///
/// The worst end decides the severity: a failed partner is critical, a
/// blocked one major, unfinished work minor.
pub fn cross_medium_violations(graph: &ProjectGraph) -> Vec<Violation> {
    let mut out = Vec::new();

    for link in graph.links() {
        let (Some(a), Some(b)) = (graph.get(link.a), graph.get(link.b)) else {
            continue;
        };
        let worst = [severity_for(a.status), severity_for(b.status)]
            .into_iter()
            .flatten()
            .min();
        let Some(severity) = worst else {
            continue;
        };

        let message = format!(
            "{:?} link '{}' <-> '{}' is not resolved ({} / {}){}",
            link.kind,
            a.name,
            b.name,
            a.status,
            b.status,
            if link.context.is_empty() {
                String::new()
            } else {
                format!(": {}", link.context)
            }
        );
        out.push(
            Violation::new(Dimension::CrossMedium, severity, message).with_assets([a.id, b.id]),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::asset::{Asset, LinkKind, LinkMetadata};
    use crate::types::{AssetId, AssetType, Metadata, ProjectId, StudioId};

    fn graph_with_link(a: AssetStatus, b: AssetStatus) -> ProjectGraph {
        let mut g = ProjectGraph::new(ProjectId::from("p"));
        for (i, status) in [(1, a), (2, b)] {
            let mut asset = Asset::new(
                AssetId(i),
                ProjectId::from("p"),
                format!("a{i}"),
                AssetType::Graphic,
                StudioId::from("graphics"),
                Metadata::new(),
            );
            asset.status = status;
            g.insert(asset);
        }
        g.add_link(
            AssetId(1),
            AssetId(2),
            LinkMetadata::new(LinkKind::GraphicInVideo, "intro"),
        )
        .unwrap();
        g
    }

    #[test]
    fn complete_pairs_are_clean() {
        let g = graph_with_link(AssetStatus::Complete, AssetStatus::Complete);
        assert!(cross_medium_violations(&g).is_empty());
    }

    #[test]
    fn worst_end_decides_severity() {
        let g = graph_with_link(AssetStatus::Pending, AssetStatus::Failed);
        let v = cross_medium_violations(&g);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].severity, Severity::Critical);
        assert_eq!(v[0].assets, vec![AssetId(1), AssetId(2)]);

        let g = graph_with_link(AssetStatus::Complete, AssetStatus::Blocked);
        assert_eq!(cross_medium_violations(&g)[0].severity, Severity::Major);

        let g = graph_with_link(AssetStatus::InProgress, AssetStatus::Complete);
        assert_eq!(cross_medium_violations(&g)[0].severity, Severity::Minor);
    }
}
