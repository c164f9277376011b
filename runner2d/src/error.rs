//! Error types for the Runner2D core.

use std::path::PathBuf;

use thiserror::Error;

use crate::animation::AnimationKey;
use crate::world::EntityId;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("frame set `{0}` has no frames")]
    EmptyFrameSet(String),

    #[error("frame set `{name}` has a non-positive frame duration ({duration_ms} ms)")]
    InvalidFrameDuration { name: String, duration_ms: u64 },

    #[error("no frame set registered for {0:?}")]
    MissingAnimation(AnimationKey),

    #[error("entity {entity:?} reached a non-finite state ({what})")]
    NonFinite { entity: EntityId, what: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load level from {}: {}", .path.display(), .reason)]
    LevelLoad { path: PathBuf, reason: String },

    #[error("level data is invalid: {0}")]
    InvalidLevel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
