// tests/registry_concurrency.rs

mod common;
use crate::common::{init_tracing, register};

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use assetdag::dag::AssetRegistry;
use assetdag::errors::AssetDagError;
use assetdag::types::{AssetId, AssetType, ProjectId};

const WRITERS: usize = 8;
const CHAIN: usize = 25;

#[test]
fn concurrent_writers_keep_ids_unique_and_dependents_consistent() {
    init_tracing();
    let registry = Arc::new(AssetRegistry::new());
    let project = ProjectId::from("shared");
    let root = register(&registry, &project, "brief", AssetType::Brief);

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let registry = Arc::clone(&registry);
            let project = project.clone();
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(CHAIN);
                let mut prev = root;
                for i in 0..CHAIN {
                    let id = register(&registry, &project, &format!("w{w}-{i}"), AssetType::Graphic);
                    registry.add_dependency(id, prev).unwrap();

                    // Every chain leads back to the root, so this closes a loop.
                    assert!(matches!(
                        registry.add_dependency(root, id),
                        Err(AssetDagError::Cycle { .. })
                    ));
                    prev = id;
                    ids.push(id);
                }
                ids
            })
        })
        .collect();

    let mut all: Vec<AssetId> = vec![root];
    for writer in writers {
        all.extend(writer.join().unwrap());
    }

    let unique: BTreeSet<AssetId> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len());
    assert_eq!(all.len(), 1 + WRITERS * CHAIN);

    let snapshot = registry.snapshot(&project).unwrap();
    assert_eq!(snapshot.len(), all.len());
    assert!(snapshot.dependents_consistent());
    assert!(snapshot.dependencies_of(root).is_empty());
    assert_eq!(snapshot.dependents_of(root).len(), WRITERS);

    let report = registry.dependency_report(&project).unwrap();
    assert_eq!(report.edges.len(), WRITERS * CHAIN);
    assert_eq!(report.dependency_depth, CHAIN + 1);
}

#[test]
fn concurrent_registration_across_projects_never_reuses_ids() {
    let registry = Arc::new(AssetRegistry::new());

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let project = ProjectId::new(format!("project-{}", w % 3));
                (0..CHAIN)
                    .map(|i| register(&registry, &project, &format!("a{i}"), AssetType::Music))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = BTreeSet::new();
    for writer in writers {
        for id in writer.join().unwrap() {
            assert!(seen.insert(id), "{id} issued twice");
        }
    }
    assert_eq!(seen.len(), WRITERS * CHAIN);
    assert_eq!(registry.projects().len(), 3);

    let total: usize = registry
        .projects()
        .iter()
        .map(|p| registry.snapshot(p).unwrap().len())
        .sum();
    assert_eq!(total, WRITERS * CHAIN);
}
