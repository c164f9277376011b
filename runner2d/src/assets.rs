use std::collections::HashMap;

use crate::animation::{Frame, FrameHandle};
use crate::collision::CollisionMask;
use crate::math::Vec2;

/// Source of named frames and optional pixel masks.
///
/// Image decoding lives outside the core; implementors only hand out stable
/// handles and sizes.
pub trait FrameProvider {
    fn frame(&self, name: &str) -> Option<Frame>;

    fn mask(&self, _name: &str) -> Option<&CollisionMask> {
        None
    }
}

/// Handle returned for any name the catalog does not know.
pub const PLACEHOLDER_HANDLE: FrameHandle = FrameHandle(0);

/// Registry of named frames with a placeholder fallback.
pub struct FrameCatalog {
    frames: HashMap<String, Frame>,
    masks: HashMap<String, CollisionMask>,
    next_handle: u32,
    placeholder_size: Vec2,
}

impl FrameCatalog {
    pub fn new() -> Self {
        Self {
            frames: HashMap::new(),
            masks: HashMap::new(),
            next_handle: 1,
            placeholder_size: Vec2::new(32.0, 32.0),
        }
    }

    #[must_use]
    pub fn with_placeholder_size(mut self, size: Vec2) -> Self {
        self.placeholder_size = size;
        self
    }

    /// Register a frame, returning the cached one if the name is already known.
    pub fn register(&mut self, name: &str, width: f32, height: f32) -> Frame {
        if let Some(frame) = self.frames.get(name) {
            return *frame;
        }

        let frame = Frame::new(FrameHandle(self.next_handle), width, height);
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        self.frames.insert(name.to_string(), frame);
        frame
    }

    /// Register `<prefix>_0 .. <prefix>_<count-1>` with a shared size.
    pub fn register_sequence(&mut self, prefix: &str, count: usize, width: f32, height: f32) -> Vec<Frame> {
        (0..count)
            .map(|i| self.register(&format!("{prefix}_{i}"), width, height))
            .collect()
    }

    pub fn insert_mask(&mut self, name: &str, mask: CollisionMask) {
        self.masks.insert(name.to_string(), mask);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.frames.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn placeholder(&self) -> Frame {
        Frame {
            handle: PLACEHOLDER_HANDLE,
            size: self.placeholder_size,
        }
    }

    /// Named frame, or the placeholder (with a warning) when it is missing.
    pub fn get_or_placeholder(&self, name: &str) -> Frame {
        match self.frames.get(name) {
            Some(frame) => *frame,
            None => {
                log::warn!("frame `{name}` not found, using placeholder");
                self.placeholder()
            }
        }
    }

    /// Frames `<prefix>_0 .. <prefix>_<count-1>`, placeholders where missing.
    pub fn sequence(&self, prefix: &str, count: usize) -> Vec<Frame> {
        (0..count)
            .map(|i| self.get_or_placeholder(&format!("{prefix}_{i}")))
            .collect()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.masks.clear();
    }
}

impl Default for FrameCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameProvider for FrameCatalog {
    fn frame(&self, name: &str) -> Option<Frame> {
        self.frames.get(name).copied()
    }

    fn mask(&self, name: &str) -> Option<&CollisionMask> {
        self.masks.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_cached_by_name() {
        let mut catalog = FrameCatalog::new();
        let a = catalog.register("coin_0", 16.0, 16.0);
        let b = catalog.register("coin_0", 99.0, 99.0);
        assert_eq!(a, b);
        assert_ne!(a.handle, PLACEHOLDER_HANDLE);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn missing_names_fall_back_to_placeholder() {
        let mut catalog = FrameCatalog::new().with_placeholder_size(Vec2::new(8.0, 8.0));
        catalog.register_sequence("walk_r", 2, 40.0, 60.0);

        let frames = catalog.sequence("walk_r", 3);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].size, Vec2::new(40.0, 60.0));
        assert_eq!(frames[2].handle, PLACEHOLDER_HANDLE);
        assert_eq!(frames[2].size, Vec2::new(8.0, 8.0));
        assert!(catalog.frame("walk_r_2").is_none());
    }

    #[test]
    fn masks_are_looked_up_by_name() {
        let mut catalog = FrameCatalog::new();
        catalog.insert_mask("enemy", CollisionMask::solid(4, 4));
        assert_eq!(catalog.mask("enemy").map(|m| m.width()), Some(4));
        assert!(catalog.mask("player").is_none());
    }
}
