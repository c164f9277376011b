//! Runner2D - motion, collision and animation core for a side-scrolling platformer.
//!
//! Every frame runs input, body integration, axis-separated collision
//! resolution, animation selection and the camera follow, in that order.
//! Drawing, image decoding and map-file parsing stay behind the
//! [`FrameRenderer`], [`FrameProvider`] and [`LevelLoader`] seams.

pub mod animation;
pub mod assets;
pub mod body;
pub mod camera;
pub mod collision;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod level;
pub mod math;
pub mod runner;
pub mod world;

pub use crate::animation::{AnimationFlags, AnimationKey, AnimationLibrary, Animator, Frame, FrameHandle, FrameSet, Playback};
pub use crate::assets::{FrameCatalog, FrameProvider};
pub use crate::body::{Anchor, KinematicBody, MovementFlags};
pub use crate::camera::Camera;
pub use crate::collision::{CollisionFlags, CollisionMask, Platform, PlatformSet, ResolveOrder, Resolver};
pub use crate::config::{GameConfig, ShotPolicy};
pub use crate::error::{CoreError, Result};
pub use crate::input::{Action, InputSnapshot, InputState, KeyBindings};
pub use crate::level::{JsonLevelLoader, LevelData, LevelLoader, LevelObject, SpawnKind};
pub use crate::math::{Rect, Vec2};
pub use crate::runner::{FramePacer, FrameRenderer, GameLoop, InputSource, RenderFrame, RunSummary, ScriptStep, ScriptedInput};
pub use crate::world::{DrawCommand, EndReason, EntityId, EntityKind, Libraries, RoundState, World};
