//! Scroll offset that keeps a tracked position at a fixed screen point.

use glam::{Mat4, Vec3};

use crate::math::{Rect, Vec2};

#[derive(Clone, Debug)]
pub struct Camera {
    view_size: Vec2,
    level_size: Vec2,
    focus_point: Vec2,
    offset: Vec2,
}

impl Camera {
    pub fn new(view_size: Vec2, level_size: Vec2, focus_point: Vec2) -> Self {
        Self {
            view_size,
            level_size,
            focus_point,
            offset: Vec2::ZERO,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn level_size(&self) -> Vec2 {
        self.level_size
    }

    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    pub fn set_level_size(&mut self, level_size: Vec2) {
        self.level_size = level_size;
        self.offset = self.clamp(self.offset);
    }

    /// Re-centers on `target` (world space), clamped to the level edges.
    pub fn update(&mut self, target: Vec2) {
        self.offset = self.clamp(self.focus_point - target);
    }

    /// `offset` per axis in `[min(0, view - level), 0]`. A level smaller than
    /// the view pins the offset at zero.
    pub fn clamp(&self, offset: Vec2) -> Vec2 {
        let min_x = (self.view_size.x - self.level_size.x).min(0.0);
        let min_y = (self.view_size.y - self.level_size.y).min(0.0);
        Vec2::new(offset.x.clamp(min_x, 0.0), offset.y.clamp(min_y, 0.0))
    }

    /// World rect to screen rect.
    pub fn apply(&self, rect: &Rect) -> Rect {
        rect.translated(self.offset)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen - self.offset
    }

    /// The world-space rect currently on screen.
    pub fn viewport(&self) -> Rect {
        Rect::new(-self.offset.x, -self.offset.y, self.view_size.x, self.view_size.y)
    }

    pub fn is_visible(&self, rect: &Rect) -> bool {
        self.viewport().intersects(rect)
    }

    /// Orthographic projection times the scroll translation, for GPU renderers.
    pub fn view_projection(&self) -> Mat4 {
        let projection =
            Mat4::orthographic_rh_gl(0.0, self.view_size.x, self.view_size.y, 0.0, -1.0, 1.0);
        projection * self.view_matrix()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.offset.x, self.offset.y, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    fn camera() -> Camera {
        Camera::new(Vec2::new(1024.0, 640.0), Vec2::new(3000.0, 1000.0), Vec2::new(512.0, 320.0))
    }

    #[test]
    fn centers_target_inside_level() {
        let mut cam = camera();
        cam.update(Vec2::new(1500.0, 600.0));
        assert_eq!(cam.offset(), Vec2::new(-988.0, -280.0));
        let rect = cam.apply(&Rect::new(1500.0, 600.0, 10.0, 10.0));
        assert_eq!((rect.x, rect.y), (512.0, 320.0));
    }

    #[test]
    fn offset_stays_in_bounds_for_any_target() {
        let mut cam = camera();
        let targets = [
            Vec2::new(-5000.0, -5000.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(2999.0, 999.0),
            Vec2::new(1e6, 1e6),
            Vec2::new(700.0, -20.0),
        ];
        for target in targets {
            cam.update(target);
            let off = cam.offset();
            assert!(off.x <= 0.0 && off.x >= -(3000.0 - 1024.0), "{off:?}");
            assert!(off.y <= 0.0 && off.y >= -(1000.0 - 640.0), "{off:?}");
        }
    }

    #[test]
    fn small_level_pins_offset_to_zero() {
        let mut cam = Camera::new(Vec2::new(1024.0, 640.0), Vec2::new(500.0, 300.0), Vec2::new(512.0, 320.0));
        cam.update(Vec2::new(450.0, 250.0));
        assert_eq!(cam.offset(), Vec2::ZERO);
    }

    #[test]
    fn viewport_and_matrix_agree_with_offset() {
        let mut cam = camera();
        cam.update(Vec2::new(2000.0, 900.0));
        let view = cam.viewport();
        assert_eq!(view.x, -cam.offset().x);
        assert!(cam.is_visible(&Rect::new(view.x + 10.0, view.y + 10.0, 5.0, 5.0)));
        assert!(!cam.is_visible(&Rect::new(view.x - 100.0, view.y, 50.0, 50.0)));

        let p = cam.view_matrix().transform_point3(Vec3::new(2000.0, 900.0, 0.0));
        let screen = cam.apply(&Rect::new(2000.0, 900.0, 0.0, 0.0));
        assert!(approx_eq(p.x, screen.x));
        assert!(approx_eq(p.y, screen.y));
        assert_eq!(cam.screen_to_world(Vec2::new(screen.x, screen.y)), Vec2::new(2000.0, 900.0));
    }

    #[test]
    fn view_projection_maps_viewport_to_clip_space() {
        let mut cam = camera();
        cam.update(Vec2::new(1500.0, 600.0));
        let view = cam.viewport();
        let clip = |x: f32, y: f32| cam.view_projection().project_point3(Vec3::new(x, y, 0.0));

        let top_left = clip(view.left(), view.top());
        assert!(approx_eq(top_left.x, -1.0) && approx_eq(top_left.y, 1.0), "{top_left:?}");
        let bottom_right = clip(view.right(), view.bottom());
        assert!(approx_eq(bottom_right.x, 1.0) && approx_eq(bottom_right.y, -1.0), "{bottom_right:?}");
    }
}
