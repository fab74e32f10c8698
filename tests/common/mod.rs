#![allow(dead_code)]

use assetdag::dag::AssetRegistry;
use assetdag::types::{AssetId, AssetType, Metadata, ProjectId, StudioId};

pub use assetdag_test_utils::{init_tracing, with_timeout};

/// Register an asset owned by its type's default studio.
pub fn register(
    registry: &AssetRegistry,
    project: &ProjectId,
    name: &str,
    asset_type: AssetType,
) -> AssetId {
    registry.register_asset(
        project,
        name,
        asset_type,
        StudioId::new(asset_type.default_studio()),
        Metadata::new(),
    )
}

/// The four-asset launch project: script, voiceover, graphic and a video
/// that needs both voiceover and graphic.
pub struct LaunchProject {
    pub registry: AssetRegistry,
    pub project: ProjectId,
    pub script: AssetId,
    pub voiceover: AssetId,
    pub graphic: AssetId,
    pub video: AssetId,
}

pub fn launch_project() -> LaunchProject {
    let registry = AssetRegistry::new();
    let project = ProjectId::from("launch");
    let script = register(&registry, &project, "script", AssetType::Script);
    let voiceover = register(&registry, &project, "voiceover", AssetType::Voiceover);
    let graphic = register(&registry, &project, "graphic", AssetType::Graphic);
    let video = register(&registry, &project, "video", AssetType::VideoClip);

    registry.add_dependency(voiceover, script).unwrap();
    registry.add_dependency(video, voiceover).unwrap();
    registry.add_dependency(video, graphic).unwrap();

    LaunchProject {
        registry,
        project,
        script,
        voiceover,
        graphic,
        video,
    }
}
