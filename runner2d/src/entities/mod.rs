//! Gameplay behaviors built on a [`KinematicBody`].

pub mod enemy;
pub mod pickup;
pub mod player;
pub mod projectile;

pub use enemy::Enemy;
pub use pickup::Pickup;
pub use player::{Player, Weapon};
pub use projectile::{Expiry, Projectile, ProjectileSpawn, Team};

use crate::animation::{AnimationFlags, AnimationLibrary, Animator, Frame};
use crate::assets::PLACEHOLDER_HANDLE;
use crate::body::KinematicBody;
use crate::collision::{PlatformSet, Resolver};
use crate::error::Result;

/// Shared, read-only inputs of one simulation frame.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub resolver: &'a Resolver,
    pub platforms: &'a PlatformSet,
    pub now_ms: u64,
}

/// Advances `animator` for `flags` and fits `body` to the new frame and its
/// mask. Placeholder frames leave the bounds alone.
pub(crate) fn animate(
    animator: &mut Animator,
    library: &AnimationLibrary,
    flags: &AnimationFlags,
    body: &mut KinematicBody,
    ctx: StepContext<'_>,
) -> Result<Option<Frame>> {
    let frame = animator.tick(library, flags.key(), ctx.now_ms)?;
    if let Some(frame) = frame {
        if frame.handle != PLACEHOLDER_HANDLE {
            let mask = library.mask(frame.handle).cloned();
            ctx.resolver.resize(body, ctx.platforms, frame.size, mask);
        }
    }
    Ok(frame)
}
