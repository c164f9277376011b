use crate::animation::{AnimationFlags, AnimationLibrary, Animator};
use crate::body::{Anchor, KinematicBody};
use crate::config::PickupConfig;
use crate::error::Result;
use crate::math::{Rect, Vec2};

use super::StepContext;

/// Static health drop. Loops its own animation until collected.
#[derive(Clone, Debug)]
pub struct Pickup {
    pub body: KinematicBody,
    pub animator: Animator,
    pub heal: i32,
}

impl Pickup {
    pub fn new(spawn: Vec2, config: &PickupConfig) -> Self {
        Self {
            body: KinematicBody::new(spawn, config.size, Anchor::BottomCenter),
            animator: Animator::new(),
            heal: config.heal,
        }
    }

    pub fn animate(&mut self, library: &AnimationLibrary, ctx: StepContext<'_>) -> Result<()> {
        super::animate(&mut self.animator, library, &AnimationFlags::default(), &mut self.body, ctx)?;
        Ok(())
    }

    /// Circle test: each rect gets a radius of half its diagonal scaled by
    /// `ratio`, and they touch when the centers are within the summed radii.
    pub fn collected_by(&self, other: &Rect, ratio: f32) -> bool {
        let mine = self.body.bounds();
        let radius = |r: &Rect| ratio * Vec2::new(r.w, r.h).length() / 2.0;
        mine.center().distance(other.center()) <= radius(&mine) + radius(other)
    }
}
