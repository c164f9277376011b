//! Axis-separated collision resolution against a static platform set.
//!
//! A frame is resolved in two passes: the body first moves and is corrected
//! horizontally, then gravity is applied and it moves and is corrected
//! vertically. Each pass decides which side was hit from the body's movement
//! direction on that axis, never from the overlap geometry.

use serde::{Deserialize, Serialize};

use crate::body::{Horizontal, KinematicBody, Vertical};
use crate::config::PhysicsConfig;
use crate::error::{CoreError, Result};
use crate::math::{Rect, Vec2, SIGN_EPSILON};

/// Order in which several overlapping platforms are resolved on one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveOrder {
    /// Platform set order.
    #[default]
    Insertion,
    /// Smallest penetration depth on the resolving axis first.
    LeastPenetration,
}

/// Static, immutable axis-aligned platform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    rect: Rect,
}

impl Platform {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self { rect }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }
}

/// The platforms of the current level, in load order.
#[derive(Clone, Debug, Default)]
pub struct PlatformSet {
    platforms: Vec<Platform>,
}

impl PlatformSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, platform: Platform) {
        self.platforms.push(platform);
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    /// True if any platform strictly overlaps `rect`.
    pub fn any_intersects(&self, rect: &Rect) -> bool {
        self.platforms.iter().any(|p| p.rect.intersects(rect))
    }
}

impl FromIterator<Platform> for PlatformSet {
    fn from_iter<I: IntoIterator<Item = Platform>>(iter: I) -> Self {
        Self {
            platforms: iter.into_iter().collect(),
        }
    }
}

/// Sides that resolved a platform contact during the last resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionFlags {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Pixel-accurate solidity mask, row-major, aligned to the bounds' top-left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl CollisionMask {
    pub fn new(width: usize, height: usize, bits: Vec<bool>) -> Result<Self> {
        if bits.len() != width * height {
            return Err(CoreError::InvalidConfig(format!(
                "mask of {width}x{height} needs {} cells, got {}",
                width * height,
                bits.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    pub fn solid(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width * height],
        }
    }

    /// Builds a mask from one alpha byte per pixel; cells at or above `threshold` are solid.
    pub fn from_alpha(width: usize, height: usize, alpha: &[u8], threshold: u8) -> Result<Self> {
        Self::new(width, height, alpha.iter().map(|&a| a >= threshold).collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// True if a solid cell of the mask, placed at `origin`, lies inside `rect`.
    pub fn overlaps_rect(&self, origin: Vec2, rect: &Rect) -> bool {
        let mask_rect = Rect::new(origin.x, origin.y, self.width as f32, self.height as f32);
        let Some(overlap) = mask_rect.intersection(rect) else {
            return false;
        };

        let x0 = (overlap.left() - origin.x).floor().max(0.0) as usize;
        let y0 = (overlap.top() - origin.y).floor().max(0.0) as usize;
        let x1 = ((overlap.right() - origin.x).ceil() as usize).min(self.width);
        let y1 = ((overlap.bottom() - origin.y).ceil() as usize).min(self.height);

        (y0..y1).any(|y| (x0..x1).any(|x| self.bits[y * self.width + x]))
    }
}

/// Runs the two-pass motion and collision step for bodies.
#[derive(Clone, Debug)]
pub struct Resolver {
    pub gravity: f32,
    pub friction: f32,
    pub landing_bias: f32,
    pub ceiling_bias: f32,
    pub ground_probe: f32,
    pub max_fall_speed: Option<f32>,
    pub order: ResolveOrder,
}

impl Resolver {
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            gravity: config.gravity,
            friction: config.friction,
            landing_bias: config.landing_bias,
            ceiling_bias: config.ceiling_bias,
            ground_probe: config.ground_probe,
            max_fall_speed: config.max_fall_speed,
            order: config.resolve_order,
        }
    }

    /// Full frame for a body without its own input: friction, horizontal
    /// pass, gravity, vertical pass.
    pub fn step(&self, body: &mut KinematicBody, platforms: &PlatformSet) -> CollisionFlags {
        let mut flags = CollisionFlags::default();
        body.apply_friction(self.friction);
        self.resolve_horizontal(body, platforms, &mut flags);
        self.begin_vertical(body);
        self.resolve_vertical(body, platforms, &mut flags);
        flags
    }

    /// Integrates the horizontal axis and pushes the body out of any wall it
    /// entered. The caller sets `acceleration.x` (input + friction) first.
    pub fn resolve_horizontal(
        &self,
        body: &mut KinematicBody,
        platforms: &PlatformSet,
        flags: &mut CollisionFlags,
    ) {
        body.integrate_x();
        let direction = body.movement.horizontal;
        if direction == Horizontal::Still {
            return;
        }

        let hits = self.ordered_hits(body, platforms, |bounds, p| match direction {
            Horizontal::Right => bounds.right() - p.left(),
            _ => p.right() - bounds.left(),
        });

        let mut hit_any = false;
        for platform in hits {
            // Feet sunk into a floor by the landing bias are not a wall.
            if !self.touches(body, &platform) || self.resting_on(body, &platform) {
                continue;
            }
            match direction {
                Horizontal::Left => {
                    body.set_left(platform.rect.right());
                    flags.left = true;
                }
                Horizontal::Right => {
                    body.set_right(platform.rect.left());
                    flags.right = true;
                }
                Horizontal::Still => continue,
            }
            body.velocity.x = 0.0;
            body.acceleration.x = 0.0;
            hit_any = true;
        }

        if hit_any {
            body.movement.horizontal = Horizontal::Still;
        }
    }

    /// Resets the acceleration to plain gravity for the vertical pass.
    pub fn begin_vertical(&self, body: &mut KinematicBody) {
        let gravity = if body.gravity_exempt { 0.0 } else { self.gravity };
        body.acceleration = Vec2::new(0.0, gravity);
    }

    /// Integrates the vertical axis and lands the body on floors or stops it
    /// under ceilings.
    pub fn resolve_vertical(
        &self,
        body: &mut KinematicBody,
        platforms: &PlatformSet,
        flags: &mut CollisionFlags,
    ) {
        if let Some(max) = self.max_fall_speed {
            if body.acceleration.y > 0.0 {
                body.acceleration.y = body.acceleration.y.min((max - body.velocity.y).max(0.0));
            }
        }
        body.integrate_y();
        let direction = body.movement.vertical;
        if direction == Vertical::Still {
            return;
        }

        let hits = self.ordered_hits(body, platforms, |bounds, p| match direction {
            Vertical::Down => bounds.bottom() - p.top(),
            _ => p.bottom() - bounds.top(),
        });

        let mut hit_any = false;
        for platform in hits {
            if !self.touches(body, &platform) {
                continue;
            }
            match direction {
                Vertical::Down => {
                    body.set_bottom(platform.rect.top() + self.landing_bias);
                    flags.down = true;
                }
                Vertical::Up => {
                    body.set_top(platform.rect.bottom() + self.ceiling_bias);
                    flags.up = true;
                }
                Vertical::Still => continue,
            }
            body.velocity.y = 0.0;
            hit_any = true;
        }

        if hit_any {
            log::trace!("vertical contact resolved at y={:.1}", body.position.y);
            body.movement.vertical = Vertical::Still;
        }
    }

    /// Grounded check: do the bounds, pushed `ground_probe` pixels down, touch a platform?
    pub fn is_grounded(&self, body: &KinematicBody, platforms: &PlatformSet) -> bool {
        let probe = body.bounds().translated(Vec2::new(0.0, self.ground_probe));
        platforms.any_intersects(&probe)
    }

    /// Sets the jump impulse if the body stands on a platform. Returns whether it jumped.
    pub fn jump(&self, body: &mut KinematicBody, platforms: &PlatformSet, impulse: f32) -> bool {
        if self.is_grounded(body, platforms) {
            body.velocity.y = impulse;
            true
        } else {
            false
        }
    }

    /// Resizes the body around its anchor and swaps its mask. If the new
    /// bounds reach into a wall they did not touch before, the body is pushed
    /// back out toward the side the old bounds were on. When that still
    /// leaves it inside a platform the resize is undone. Returns whether the
    /// new size was kept.
    pub fn resize(
        &self,
        body: &mut KinematicBody,
        platforms: &PlatformSet,
        size: Vec2,
        mask: Option<CollisionMask>,
    ) -> bool {
        let old_bounds = body.bounds();
        let old_position = body.position;
        let old_size = body.size();
        let old_mask = body.mask().cloned();

        body.set_size(size);
        body.set_mask(mask);

        let blocking = |body: &KinematicBody, p: &Platform| {
            !old_bounds.intersects(&p.rect) && self.touches(body, p) && !self.resting_on(body, p)
        };
        // Walls level with the old bounds; growing into a ceiling is not pushed sideways.
        let beside = |p: &Platform| {
            old_bounds.top() < p.rect.bottom() && old_bounds.bottom() > p.rect.top() + self.landing_bias
        };

        for platform in platforms.iter() {
            if !blocking(body, platform) || !beside(platform) {
                continue;
            }
            if old_bounds.center().x < platform.rect.center().x {
                body.set_right(platform.rect.left());
            } else {
                body.set_left(platform.rect.right());
            }
        }

        if platforms.iter().any(|p| blocking(body, p)) {
            log::trace!("frame resize to {:?} blocked at x={:.1}", size, old_position.x);
            body.set_size(old_size);
            body.set_mask(old_mask);
            body.position = old_position;
            return false;
        }
        true
    }

    fn touches(&self, body: &KinematicBody, platform: &Platform) -> bool {
        let bounds = body.bounds();
        if !bounds.intersects(&platform.rect) {
            return false;
        }
        match body.mask() {
            Some(mask) => mask.overlaps_rect(Vec2::new(bounds.x, bounds.y), &platform.rect),
            None => true,
        }
    }

    fn resting_on(&self, body: &KinematicBody, platform: &Platform) -> bool {
        body.bounds().bottom() - platform.rect.top() <= self.landing_bias + SIGN_EPSILON
    }

    /// Platforms touching the body, in resolution order. `depth` returns the
    /// penetration on the resolving axis.
    fn ordered_hits<F>(&self, body: &KinematicBody, platforms: &PlatformSet, depth: F) -> Vec<Platform>
    where
        F: Fn(&Rect, &Rect) -> f32,
    {
        let bounds = body.bounds();
        let mut hits: Vec<(f32, Platform)> = platforms
            .iter()
            .filter(|p| self.touches(body, p))
            .map(|p| (depth(&bounds, &p.rect), *p))
            .collect();

        if self.order == ResolveOrder::LeastPenetration {
            hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        }
        hits.into_iter().map(|(_, p)| p).collect()
    }
}

/// Shortens a rising jump: upward speed beyond half the impulse is cut to half.
/// Returns whether the velocity changed.
pub fn jump_cut(body: &mut KinematicBody, impulse: f32) -> bool {
    let half = impulse / 2.0;
    if body.velocity.y < half {
        body.velocity.y = half;
        true
    } else {
        false
    }
}
