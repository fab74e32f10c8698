// src/types.rs

//! Identifier newtypes and the closed enums shared across the crate.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Producer-specific key/value bag. Opaque to the scheduler.
pub type Metadata = BTreeMap<String, String>;

/// Registry-issued asset identifier.
///
/// Ids are handed out from a single monotonically increasing counter, so
/// ordering by id is ordering by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a production unit ("studio") that owns assets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudioId(pub String);

impl StudioId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudioId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lifecycle state of an asset.
///
/// `Complete` and `Failed` are terminal. `Blocked` is only ever entered
/// through propagation from a failed (or blocked) dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Pending,
    InProgress,
    Complete,
    Blocked,
    Failed,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 5] = [
        AssetStatus::Pending,
        AssetStatus::InProgress,
        AssetStatus::Complete,
        AssetStatus::Blocked,
        AssetStatus::Failed,
    ];

    pub fn is_terminal(self) -> bool {
        match self {
            AssetStatus::Complete | AssetStatus::Failed => true,
            AssetStatus::Pending | AssetStatus::InProgress | AssetStatus::Blocked => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetStatus::Pending => "pending",
            AssetStatus::InProgress => "in_progress",
            AssetStatus::Complete => "complete",
            AssetStatus::Blocked => "blocked",
            AssetStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AssetStatus::Pending),
            "in_progress" | "in-progress" => Ok(AssetStatus::InProgress),
            "complete" => Ok(AssetStatus::Complete),
            "blocked" => Ok(AssetStatus::Blocked),
            "failed" => Ok(AssetStatus::Failed),
            other => Err(format!("invalid asset status: {other}")),
        }
    }
}

/// Kind of production asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    // Planning
    Script,
    Storyboard,
    StyleGuide,
    ColorPalette,
    Brief,
    Metadata,
    // Audio
    Voiceover,
    Music,
    SoundEffect,
    AudioMix,
    Podcast,
    // Graphics
    Graphic,
    AnimatedGraphic,
    Logo,
    Icon,
    CharacterArt,
    Background,
    Texture,
    // Video
    VideoClip,
    Animation,
    BRoll,
    Trailer,
    VideoAssembly,
}

impl AssetType {
    /// Studio that produces this kind of asset when the manifest does not
    /// name an owner explicitly.
    pub fn default_studio(self) -> &'static str {
        match self {
            AssetType::Script
            | AssetType::Storyboard
            | AssetType::StyleGuide
            | AssetType::ColorPalette
            | AssetType::Brief
            | AssetType::Metadata => "shared",
            AssetType::Voiceover
            | AssetType::Music
            | AssetType::SoundEffect
            | AssetType::AudioMix
            | AssetType::Podcast => "audio",
            AssetType::Graphic
            | AssetType::AnimatedGraphic
            | AssetType::Logo
            | AssetType::Icon
            | AssetType::CharacterArt
            | AssetType::Background
            | AssetType::Texture => "graphics",
            AssetType::VideoClip
            | AssetType::Animation
            | AssetType::BRoll
            | AssetType::Trailer
            | AssetType::VideoAssembly => "video",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Script => "script",
            AssetType::Storyboard => "storyboard",
            AssetType::StyleGuide => "style_guide",
            AssetType::ColorPalette => "color_palette",
            AssetType::Brief => "brief",
            AssetType::Metadata => "metadata",
            AssetType::Voiceover => "voiceover",
            AssetType::Music => "music",
            AssetType::SoundEffect => "sound_effect",
            AssetType::AudioMix => "audio_mix",
            AssetType::Podcast => "podcast",
            AssetType::Graphic => "graphic",
            AssetType::AnimatedGraphic => "animated_graphic",
            AssetType::Logo => "logo",
            AssetType::Icon => "icon",
            AssetType::CharacterArt => "character_art",
            AssetType::Background => "background",
            AssetType::Texture => "texture",
            AssetType::VideoClip => "video_clip",
            AssetType::Animation => "animation",
            AssetType::BRoll => "b_roll",
            AssetType::Trailer => "trailer",
            AssetType::VideoAssembly => "video_assembly",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
