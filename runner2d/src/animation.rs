//! Sprite-frame animation driven by movement and shooting flags.
//!
//! An [`AnimationLibrary`] maps every (locomotion, shooting, facing)
//! combination to a [`FrameSet`]. The per-entity [`Animator`] picks the key
//! each frame, restarts playback when the key changes and advances frames on
//! a wall-clock interval, so playback speed does not depend on frame rate.

use std::collections::HashMap;
use std::ops::Range;

use crate::assets::{FrameCatalog, FrameProvider};
use crate::body::{Horizontal, MovementFlags, Vertical};
use crate::collision::CollisionMask;
use crate::config::AnimationConfig;
use crate::error::{CoreError, Result};
use crate::math::Vec2;

/// Opaque handle to an image owned by the asset collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u32);

/// A single frame of an animation: what to draw and how big it is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub handle: FrameHandle,
    pub size: Vec2,
}

impl Frame {
    pub fn new(handle: FrameHandle, width: f32, height: f32) -> Self {
        Self {
            handle,
            size: Vec2::new(width, height),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    /// Wraps back to the first frame.
    Looping,
    /// Stops on the last frame.
    Clamped,
}

/// Ordered, non-empty frame sequence with a playback mode and frame interval.
#[derive(Clone, Debug)]
pub struct FrameSet {
    name: String,
    frames: Vec<Frame>,
    playback: Playback,
    frame_duration_ms: u64,
}

impl FrameSet {
    pub fn new(
        name: impl Into<String>,
        frames: Vec<Frame>,
        playback: Playback,
        frame_duration_ms: u64,
    ) -> Result<Self> {
        let name = name.into();
        if frames.is_empty() {
            return Err(CoreError::EmptyFrameSet(name));
        }
        if frame_duration_ms == 0 {
            return Err(CoreError::InvalidFrameDuration {
                name,
                duration_ms: frame_duration_ms,
            });
        }
        Ok(Self {
            name,
            frames,
            playback,
            frame_duration_ms,
        })
    }

    /// A set made of `frames[range]`.
    pub fn from_range(
        name: impl Into<String>,
        frames: &[Frame],
        range: Range<usize>,
        playback: Playback,
        frame_duration_ms: u64,
    ) -> Result<Self> {
        let end = range.end.min(frames.len());
        let start = range.start.min(end);
        Self::new(name, frames[start..end].to_vec(), playback, frame_duration_ms)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn frame_duration_ms(&self) -> u64 {
        self.frame_duration_ms
    }

    pub fn frame(&self, index: usize) -> Frame {
        self.frames[index.min(self.frames.len() - 1)]
    }

    /// Index shown after `index` when the frame timer fires.
    pub fn next_index(&self, index: usize) -> usize {
        match self.playback {
            Playback::Looping => (index + 1) % self.frames.len(),
            Playback::Clamped => (index + 1).min(self.frames.len() - 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Locomotion {
    Idle,
    Walking,
    Jumping,
    Falling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
}

/// Selects one frame set in a library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationKey {
    pub locomotion: Locomotion,
    pub shooting: bool,
    pub facing: Facing,
}

/// Snapshot of what an entity is doing, derived from its movement flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationFlags {
    pub walking: bool,
    pub jumping: bool,
    pub falling: bool,
    pub shooting: bool,
    pub facing_right: bool,
}

impl Default for AnimationFlags {
    fn default() -> Self {
        Self {
            walking: false,
            jumping: false,
            falling: false,
            shooting: false,
            facing_right: true,
        }
    }
}

impl AnimationFlags {
    /// Derives the flags from the resolved movement of this frame. Facing is
    /// kept from `previous` when there is no horizontal motion.
    pub fn derive(movement: &MovementFlags, shooting: bool, previous: &AnimationFlags) -> Self {
        let facing_right = match movement.horizontal {
            Horizontal::Right => true,
            Horizontal::Left => false,
            Horizontal::Still => previous.facing_right,
        };
        let jumping = movement.vertical == Vertical::Up;
        let falling = movement.vertical == Vertical::Down;
        Self {
            walking: movement.moving_horizontally() && !jumping && !falling,
            jumping,
            falling,
            shooting,
            facing_right,
        }
    }

    /// Jumping > Falling > Walking > Idle.
    pub fn locomotion(&self) -> Locomotion {
        if self.jumping {
            Locomotion::Jumping
        } else if self.falling {
            Locomotion::Falling
        } else if self.walking {
            Locomotion::Walking
        } else {
            Locomotion::Idle
        }
    }

    pub fn key(&self) -> AnimationKey {
        AnimationKey {
            locomotion: self.locomotion(),
            shooting: self.shooting,
            facing: if self.facing_right {
                Facing::Right
            } else {
                Facing::Left
            },
        }
    }
}

/// Frame sets for every animation key of one kind of entity, plus the
/// collision masks of the frames that have one.
#[derive(Clone, Debug, Default)]
pub struct AnimationLibrary {
    sets: HashMap<AnimationKey, FrameSet>,
    fallback: Option<FrameSet>,
    masks: HashMap<FrameHandle, CollisionMask>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// A library that plays `set` regardless of the key.
    pub fn uniform(set: FrameSet) -> Self {
        Self {
            fallback: Some(set),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, key: AnimationKey, set: FrameSet) {
        self.sets.insert(key, set);
    }

    /// Mask of the frame behind `handle`, if the provider had one.
    pub fn mask(&self, handle: FrameHandle) -> Option<&CollisionMask> {
        self.masks.get(&handle)
    }

    /// Copies the masks of `<prefix>_0 .. <prefix>_<count-1>` out of `provider`.
    pub fn attach_masks(&mut self, provider: &dyn FrameProvider, prefix: &str, count: usize) {
        for i in 0..count {
            let name = format!("{prefix}_{i}");
            if let (Some(frame), Some(mask)) = (provider.frame(&name), provider.mask(&name)) {
                self.masks.insert(frame.handle, mask.clone());
            }
        }
    }

    pub fn get(&self, key: AnimationKey) -> Result<&FrameSet> {
        self.sets
            .get(&key)
            .or(self.fallback.as_ref())
            .ok_or(CoreError::MissingAnimation(key))
    }

    /// The player's sheet layout: right-facing sequences named `<anim>_r_<i>`
    /// and their mirrored `<anim>_l_<i>` counterparts.
    pub fn player(catalog: &FrameCatalog, config: &AnimationConfig) -> Result<Self> {
        let idle_ms = config.idle_interval_ms;
        let action_ms = config.action_interval_ms;
        let mut library = Self::new();

        for (facing, suffix) in [(Facing::Right, "r"), (Facing::Left, "l")] {
            let mut seq = |name: &str, count: usize| {
                let prefix = format!("{name}_{suffix}");
                library.attach_masks(catalog, &prefix, count);
                catalog.sequence(&prefix, count)
            };
            let key = |locomotion, shooting| AnimationKey {
                locomotion,
                shooting,
                facing,
            };

            let idle = seq("idle", 1);
            let walk = seq("walk", 10);
            let jump = seq("jump", 10);
            let idle_shoot = seq("idle_shoot", 3);
            let walk_shoot = seq("walk_shoot", 10);
            let jump_shoot = seq("jump_shoot", 10);

            use Locomotion::*;
            use Playback::*;
            library.insert(key(Idle, false), FrameSet::new("idle", idle, Looping, idle_ms)?);
            library.insert(key(Walking, false), FrameSet::new("walk", walk, Looping, action_ms)?);
            library.insert(key(Jumping, false), FrameSet::from_range("jump", &jump, 0..6, Clamped, action_ms)?);
            library.insert(key(Falling, false), FrameSet::from_range("fall", &jump, 6..8, Clamped, action_ms)?);
            library.insert(key(Idle, true), FrameSet::new("idle_shoot", idle_shoot, Looping, action_ms)?);
            library.insert(key(Walking, true), FrameSet::new("walk_shoot", walk_shoot, Looping, action_ms)?);
            library.insert(key(Jumping, true), FrameSet::from_range("jump_shoot", &jump_shoot, 0..6, Looping, action_ms)?);
            library.insert(key(Falling, true), FrameSet::from_range("fall_shoot", &jump_shoot, 6..8, Looping, action_ms)?);
        }

        Ok(library)
    }
}

/// Per-entity playback state.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    key: Option<AnimationKey>,
    index: usize,
    last_change_ms: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<AnimationKey> {
        self.key
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Selects `key` and advances playback to `now_ms`. Returns the new frame
    /// when the visible frame changed.
    pub fn tick(&mut self, library: &AnimationLibrary, key: AnimationKey, now_ms: u64) -> Result<Option<Frame>> {
        let set = library.get(key)?;

        if self.key != Some(key) {
            log::trace!("animation -> {} ({:?})", set.name(), key);
            self.key = Some(key);
            self.index = 0;
            self.last_change_ms = now_ms;
            return Ok(Some(set.frame(0)));
        }

        if now_ms.saturating_sub(self.last_change_ms) <= set.frame_duration_ms() {
            return Ok(None);
        }

        self.last_change_ms = now_ms;
        let next = set.next_index(self.index);
        if next == self.index {
            return Ok(None);
        }
        self.index = next;
        Ok(Some(set.frame(next)))
    }

    pub fn current_frame(&self, library: &AnimationLibrary) -> Option<Frame> {
        let key = self.key?;
        library.get(key).ok().map(|set| set.frame(self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(n: u32) -> Vec<Frame> {
        (0..n).map(|i| Frame::new(FrameHandle(i), 10.0 + i as f32, 20.0)).collect()
    }

    fn idle_right() -> AnimationKey {
        AnimationKey {
            locomotion: Locomotion::Idle,
            shooting: false,
            facing: Facing::Right,
        }
    }

    #[test]
    fn empty_frame_set_is_rejected() {
        let err = FrameSet::new("none", Vec::new(), Playback::Looping, 50).unwrap_err();
        assert!(matches!(err, CoreError::EmptyFrameSet(name) if name == "none"));
        assert!(FrameSet::new("zero", frames(1), Playback::Looping, 0).is_err());
    }

    #[test]
    fn looping_wraps_and_clamped_holds() {
        let looping = FrameSet::new("l", frames(3), Playback::Looping, 50).unwrap();
        let clamped = FrameSet::new("c", frames(3), Playback::Clamped, 50).unwrap();
        let (mut a, mut b) = (0, 0);
        for step in 1..=10 {
            a = looping.next_index(a);
            b = clamped.next_index(b);
            assert_eq!(a, step % 3);
            assert!(b <= 2);
        }
        assert_eq!(b, 2);
    }

    #[test]
    fn locomotion_priority() {
        let mut flags = AnimationFlags {
            walking: true,
            falling: true,
            jumping: true,
            ..AnimationFlags::default()
        };
        assert_eq!(flags.locomotion(), Locomotion::Jumping);
        flags.jumping = false;
        assert_eq!(flags.locomotion(), Locomotion::Falling);
        flags.falling = false;
        assert_eq!(flags.locomotion(), Locomotion::Walking);
        flags.walking = false;
        assert_eq!(flags.locomotion(), Locomotion::Idle);
    }

    #[test]
    fn facing_is_sticky_without_horizontal_motion() {
        let previous = AnimationFlags {
            facing_right: false,
            ..AnimationFlags::default()
        };
        let flags = AnimationFlags::derive(&MovementFlags::default(), false, &previous);
        assert!(!flags.facing_right);
        assert_eq!(flags.key().facing, Facing::Left);
    }

    #[test]
    fn animator_advances_on_wall_clock_interval() {
        let library = AnimationLibrary::uniform(FrameSet::new("walk", frames(4), Playback::Looping, 50).unwrap());
        let mut animator = Animator::new();
        let key = idle_right();

        assert_eq!(animator.tick(&library, key, 0).unwrap().unwrap().handle, FrameHandle(0));
        assert_eq!(animator.tick(&library, key, 30).unwrap(), None);
        assert_eq!(animator.tick(&library, key, 50).unwrap(), None);
        assert_eq!(animator.tick(&library, key, 51).unwrap().unwrap().handle, FrameHandle(1));
        assert_eq!(animator.index(), 1);
    }

    #[test]
    fn key_change_restarts_playback() {
        let mut library = AnimationLibrary::new();
        let walk = AnimationKey {
            locomotion: Locomotion::Walking,
            ..idle_right()
        };
        library.insert(idle_right(), FrameSet::new("idle", frames(2), Playback::Looping, 100).unwrap());
        library.insert(walk, FrameSet::new("walk", frames(5), Playback::Looping, 50).unwrap());

        let mut animator = Animator::new();
        animator.tick(&library, walk, 0).unwrap();
        animator.tick(&library, walk, 60).unwrap();
        animator.tick(&library, walk, 120).unwrap();
        assert_eq!(animator.index(), 2);

        let frame = animator.tick(&library, idle_right(), 130).unwrap();
        assert_eq!(frame.map(|f| f.handle), Some(FrameHandle(0)));
        assert_eq!(animator.index(), 0);
    }

    #[test]
    fn missing_key_is_an_error() {
        let library = AnimationLibrary::new();
        let mut animator = Animator::new();
        let err = animator.tick(&library, idle_right(), 0).unwrap_err();
        assert!(matches!(err, CoreError::MissingAnimation(_)));
    }

    #[test]
    fn player_library_covers_every_key() {
        let catalog = FrameCatalog::new();
        let library = AnimationLibrary::player(&catalog, &AnimationConfig::default()).unwrap();
        for locomotion in [Locomotion::Idle, Locomotion::Walking, Locomotion::Jumping, Locomotion::Falling] {
            for shooting in [false, true] {
                for facing in [Facing::Left, Facing::Right] {
                    let key = AnimationKey { locomotion, shooting, facing };
                    assert!(library.get(key).is_ok(), "{key:?}");
                }
            }
        }
        let jump = library
            .get(AnimationKey {
                locomotion: Locomotion::Jumping,
                shooting: false,
                facing: Facing::Right,
            })
            .unwrap();
        assert_eq!(jump.len(), 6);
        assert_eq!(jump.playback(), Playback::Clamped);
    }
}
