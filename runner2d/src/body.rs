//! Kinematic body: position/velocity/acceleration and per-axis integration.
//!
//! The body never stores its bounding rectangle. `bounds()` is derived from
//! `position`, the fixed size and the anchor every time it is asked for, and
//! edge setters (`set_left`, `set_bottom`, ...) write back through `position`.

use crate::collision::CollisionMask;
use crate::math::{Rect, Sign, Vec2};

/// Which point of the bounds `position` refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Feet of a standing character.
    BottomCenter,
    Center,
    TopLeft,
}

impl Anchor {
    /// Offset from the top-left corner of a `size` rect to the anchor point.
    fn offset(self, size: Vec2) -> Vec2 {
        match self {
            Anchor::BottomCenter => Vec2::new(size.x / 2.0, size.y),
            Anchor::Center => Vec2::new(size.x / 2.0, size.y / 2.0),
            Anchor::TopLeft => Vec2::ZERO,
        }
    }
}

/// Net horizontal motion this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Horizontal {
    #[default]
    Still,
    Left,
    Right,
}

/// Net vertical motion this frame. `Up` is against gravity (negative y).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Vertical {
    #[default]
    Still,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementFlags {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl MovementFlags {
    pub fn moving_horizontally(&self) -> bool {
        self.horizontal != Horizontal::Still
    }
}

#[derive(Clone, Debug)]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Skips gravity in the resolver (projectiles).
    pub gravity_exempt: bool,
    pub movement: MovementFlags,
    size: Vec2,
    anchor: Anchor,
    mask: Option<CollisionMask>,
}

impl KinematicBody {
    pub fn new(position: Vec2, size: Vec2, anchor: Anchor) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            gravity_exempt: false,
            movement: MovementFlags::default(),
            size,
            anchor,
            mask: None,
        }
    }

    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    #[must_use]
    pub fn with_mask(mut self, mask: CollisionMask) -> Self {
        self.mask = Some(mask);
        self
    }

    #[must_use]
    pub fn gravity_exempt(mut self) -> Self {
        self.gravity_exempt = true;
        self
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn mask(&self) -> Option<&CollisionMask> {
        self.mask.as_ref()
    }

    pub fn set_mask(&mut self, mask: Option<CollisionMask>) {
        self.mask = mask;
    }

    /// Changes the size while keeping the anchor point where it is.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    pub fn bounds(&self) -> Rect {
        let top_left = self.position - self.anchor.offset(self.size);
        Rect::new(top_left.x, top_left.y, self.size.x, self.size.y)
    }

    /// Moves the body so its bounds have the given top-left corner.
    pub fn set_top_left(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y) + self.anchor.offset(self.size);
    }

    pub fn set_left(&mut self, left: f32) {
        let top = self.bounds().top();
        self.set_top_left(left, top);
    }

    pub fn set_right(&mut self, right: f32) {
        let top = self.bounds().top();
        self.set_top_left(right - self.size.x, top);
    }

    pub fn set_top(&mut self, top: f32) {
        let left = self.bounds().left();
        self.set_top_left(left, top);
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        let left = self.bounds().left();
        self.set_top_left(left, bottom - self.size.y);
    }

    /// Folds velocity-proportional friction into the horizontal acceleration.
    pub fn apply_friction(&mut self, friction: f32) {
        self.acceleration.x += self.velocity.x * friction;
    }

    /// One horizontal step: `v += a; x += v + a/2`. Returns the displacement.
    pub fn integrate_x(&mut self) -> f32 {
        self.velocity.x += self.acceleration.x;
        let dx = self.velocity.x + 0.5 * self.acceleration.x;
        self.position.x += dx;
        self.movement.horizontal = match Sign::of(self.velocity.x) {
            Sign::Positive => Horizontal::Right,
            Sign::Negative => Horizontal::Left,
            Sign::Zero => Horizontal::Still,
        };
        dx
    }

    /// One vertical step, same scheme as [`integrate_x`](Self::integrate_x).
    pub fn integrate_y(&mut self) -> f32 {
        self.velocity.y += self.acceleration.y;
        let dy = self.velocity.y + 0.5 * self.acceleration.y;
        self.position.y += dy;
        self.movement.vertical = match Sign::of(self.velocity.y) {
            Sign::Positive => Vertical::Down,
            Sign::Negative => Vertical::Up,
            Sign::Zero => Vertical::Still,
        };
        dy
    }

    /// Both axes, horizontal first. Used by bodies that skip collision.
    pub fn integrate(&mut self) -> Vec2 {
        let dx = self.integrate_x();
        let dy = self.integrate_y();
        Vec2::new(dx, dy)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn bounds_follow_bottom_center_anchor() {
        let body = KinematicBody::new(Vec2::new(100.0, 400.0), Vec2::new(20.0, 40.0), Anchor::BottomCenter);
        assert_eq!(body.bounds(), Rect::new(90.0, 360.0, 20.0, 40.0));
    }

    #[test]
    fn resize_keeps_anchor_point() {
        let mut body = KinematicBody::new(Vec2::new(50.0, 80.0), Vec2::new(10.0, 10.0), Anchor::BottomCenter);
        body.set_size(Vec2::new(30.0, 60.0));
        let b = body.bounds();
        assert_eq!(b.mid_bottom(), Vec2::new(50.0, 80.0));
        assert_eq!(b.w, 30.0);
    }

    #[test]
    fn zero_motion_is_a_fixed_point() {
        let mut body = KinematicBody::new(Vec2::new(12.5, -3.0), Vec2::new(4.0, 4.0), Anchor::Center);
        for _ in 0..500 {
            body.integrate();
        }
        assert_eq!(body.position, Vec2::new(12.5, -3.0));
        assert_eq!(body.movement, MovementFlags::default());
    }

    #[test]
    fn integration_uses_half_step_term() {
        let mut body = KinematicBody::new(Vec2::ZERO, Vec2::ONE, Anchor::TopLeft);
        body.acceleration = Vec2::new(2.0, 0.0);
        let dx = body.integrate_x();
        assert!(approx_eq(body.velocity.x, 2.0));
        assert!(approx_eq(dx, 3.0));
        assert_eq!(body.movement.horizontal, Horizontal::Right);
    }

    #[test]
    fn friction_opposes_velocity() {
        let mut body = KinematicBody::new(Vec2::ZERO, Vec2::ONE, Anchor::TopLeft).with_velocity(Vec2::new(10.0, 0.0));
        body.apply_friction(-0.12);
        assert!(approx_eq(body.acceleration.x, -1.2));
    }

    #[test]
    fn edge_setters_write_through_position() {
        let mut body = KinematicBody::new(Vec2::new(100.0, 100.0), Vec2::new(20.0, 40.0), Anchor::BottomCenter);
        body.set_right(150.0);
        assert_eq!(body.bounds().right(), 150.0);
        assert_eq!(body.position.x, 140.0);
        body.set_top(10.0);
        assert_eq!(body.bounds().top(), 10.0);
        assert_eq!(body.position.y, 50.0);
    }

    #[test]
    fn tiny_velocity_reads_as_still() {
        let mut body = KinematicBody::new(Vec2::ZERO, Vec2::ONE, Anchor::TopLeft).with_velocity(Vec2::new(0.0001, -0.0001));
        body.integrate();
        assert_eq!(body.movement.horizontal, Horizontal::Still);
        assert_eq!(body.movement.vertical, Vertical::Still);
    }
}
