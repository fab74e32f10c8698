// tests/error_handling.rs

mod common;
use crate::common::{launch_project, register};

use std::io::Write;

use tempfile::NamedTempFile;

use assetdag::config::load_and_validate;
use assetdag::dag::{AssetRegistry, LinkKind, LinkMetadata};
use assetdag::errors::AssetDagError;
use assetdag::types::{AssetId, AssetStatus, AssetType, ProjectId};

fn manifest_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn manifest_cycle_returns_config_error() {
    let file = manifest_file(
        r#"
[project]
id = "p"

[asset.video]
name = "Video"
type = "video_clip"
after = ["voiceover"]

[asset.voiceover]
name = "Voiceover"
type = "voiceover"
after = ["video"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(AssetDagError::ConfigError(msg)) => {
            assert!(msg.contains("cycle"));
            assert!(msg.contains("video") || msg.contains("voiceover"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_dependency_returns_config_error() {
    let file = manifest_file(
        r#"
[project]
id = "p"

[asset.video]
name = "Video"
type = "video_clip"
after = ["NonExistent"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(AssetDagError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_asset_type_is_a_toml_error() {
    let file = manifest_file(
        r#"
[project]
id = "p"

[asset.x]
name = "X"
type = "hologram"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(AssetDagError::TomlError(_))
    ));
}

#[test]
fn missing_manifest_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Assetdag.toml"));
    assert!(matches!(result, Err(AssetDagError::IoError(_))));
}

#[test]
fn unknown_ids_and_projects_are_rejected() {
    let registry = AssetRegistry::new();
    let project = ProjectId::from("p");
    let a = register(&registry, &project, "a", AssetType::Script);
    let ghost = AssetId(9_999);

    assert!(matches!(
        registry.add_dependency(a, ghost),
        Err(AssetDagError::UnknownAsset(_))
    ));
    assert!(matches!(
        registry.update_status(ghost, AssetStatus::InProgress),
        Err(AssetDagError::UnknownAsset(_))
    ));
    assert!(matches!(
        registry.plan_waves(&ProjectId::from("nope"), &Default::default()),
        Err(AssetDagError::UnknownProject(_))
    ));
    assert!(registry.asset(a).unwrap().dependencies.is_empty());
}

#[test]
fn cross_project_edges_and_links_are_rejected() {
    let registry = AssetRegistry::new();
    let a = register(&registry, &ProjectId::from("one"), "a", AssetType::Script);
    let b = register(&registry, &ProjectId::from("two"), "b", AssetType::Music);

    assert!(matches!(
        registry.add_dependency(a, b),
        Err(AssetDagError::UnknownAsset(_))
    ));
    assert!(matches!(
        registry.link_cross_medium(a, b, LinkMetadata::new(LinkKind::Other, "")),
        Err(AssetDagError::UnknownAsset(_))
    ));
}

#[test]
fn illegal_transitions_leave_state_untouched() {
    let p = launch_project();

    let err = p
        .registry
        .update_status(p.script, AssetStatus::Complete)
        .unwrap_err();
    assert!(matches!(err, AssetDagError::InvalidTransition { .. }));

    let err = p
        .registry
        .update_status(p.script, AssetStatus::Blocked)
        .unwrap_err();
    assert!(matches!(err, AssetDagError::InvalidTransition { .. }));
    assert_eq!(p.registry.status_of(p.script).unwrap(), AssetStatus::Pending);

    // Completion with an unfinished input reports which inputs are missing.
    p.registry
        .update_status(p.voiceover, AssetStatus::InProgress)
        .unwrap();
    match p.registry.update_status(p.voiceover, AssetStatus::Complete) {
        Err(AssetDagError::DependencyNotSatisfied { asset, unmet }) => {
            assert_eq!(asset, p.voiceover);
            assert_eq!(unmet, vec![p.script]);
        }
        other => panic!("expected DependencyNotSatisfied, got {other:?}"),
    }
    assert_eq!(
        p.registry.status_of(p.voiceover).unwrap(),
        AssetStatus::InProgress
    );
}

#[test]
fn terminal_assets_reject_new_content() {
    let p = launch_project();
    p.registry
        .update_status(p.script, AssetStatus::InProgress)
        .unwrap();
    assert_eq!(p.registry.replace_content(p.script, "tightened act two", None).unwrap(), 2);
    p.registry
        .update_status(p.script, AssetStatus::Complete)
        .unwrap();

    assert!(matches!(
        p.registry.replace_content(p.script, "late edit", Some(b"x")),
        Err(AssetDagError::ImmutableAsset { .. })
    ));
    assert_eq!(p.registry.asset(p.script).unwrap().version, 2);
}

#[test]
fn failed_repoints_leave_the_graph_unchanged() {
    let p = launch_project();
    p.registry
        .update_status(p.script, AssetStatus::InProgress)
        .unwrap();
    p.registry
        .update_status(p.script, AssetStatus::Complete)
        .unwrap();
    p.registry
        .update_status(p.voiceover, AssetStatus::InProgress)
        .unwrap();
    p.registry
        .update_status(p.voiceover, AssetStatus::Failed)
        .unwrap();

    // A replacement that itself needs the video would close a loop.
    let looped = register(&p.registry, &p.project, "looped retake", AssetType::Voiceover);
    p.registry.add_dependency(looped, p.video).unwrap();
    let elsewhere = register(&p.registry, &ProjectId::from("other"), "retake", AssetType::Voiceover);
    let before = p.registry.dependency_report(&p.project).unwrap();

    assert!(matches!(
        p.registry.repoint_dependency(p.video, p.voiceover, looped),
        Err(AssetDagError::Cycle { .. })
    ));
    assert!(matches!(
        p.registry.repoint_dependency(p.video, p.voiceover, AssetId(9_999)),
        Err(AssetDagError::UnknownAsset(_))
    ));
    assert!(matches!(
        p.registry.repoint_dependency(p.video, p.voiceover, elsewhere),
        Err(AssetDagError::UnknownAsset(_))
    ));

    assert_eq!(p.registry.dependency_report(&p.project).unwrap(), before);
    assert_eq!(p.registry.asset(p.voiceover).unwrap().superseded_by, None);
    assert!(p.registry.snapshot(&p.project).unwrap().dependents_consistent());
}
