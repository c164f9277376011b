use crate::animation::{AnimationFlags, AnimationLibrary, Animator};
use crate::body::{Anchor, KinematicBody, Vertical};
use crate::collision::{jump_cut, CollisionFlags};
use crate::config::{PlayerConfig, ShotPolicy};
use crate::error::Result;
use crate::input::{Action, InputSnapshot};
use crate::math::Vec2;

use super::projectile::{ProjectileSpawn, Team};
use super::StepContext;

/// Re-arm state of the player's gun.
#[derive(Clone, Debug)]
pub struct Weapon {
    policy: ShotPolicy,
    last_shot_ms: Option<u64>,
    armed: bool,
}

impl Weapon {
    pub fn new(policy: ShotPolicy) -> Self {
        Self {
            policy,
            last_shot_ms: None,
            armed: true,
        }
    }

    /// Returns true when a shot should be fired this frame.
    pub fn try_fire(&mut self, input: &InputSnapshot, now_ms: u64) -> bool {
        if !input.is_held(Action::Shoot) {
            self.armed = true;
            return false;
        }

        let ready = match self.policy {
            ShotPolicy::Cooldown { cooldown_ms } => self
                .last_shot_ms
                .map_or(true, |last| now_ms.saturating_sub(last) >= cooldown_ms),
            ShotPolicy::UntilRelease => self.armed,
        };
        if ready {
            self.last_shot_ms = Some(now_ms);
            self.armed = false;
        }
        ready
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: KinematicBody,
    pub flags: AnimationFlags,
    pub collisions: CollisionFlags,
    pub animator: Animator,
    pub weapon: Weapon,
    health: i32,
    last_hit_ms: Option<u64>,
    config: PlayerConfig,
}

impl Player {
    /// `spawn` is where the player's feet go.
    pub fn new(spawn: Vec2, config: &PlayerConfig) -> Self {
        Self {
            body: KinematicBody::new(spawn, config.size, Anchor::BottomCenter),
            flags: AnimationFlags::default(),
            collisions: CollisionFlags::default(),
            animator: Animator::new(),
            weapon: Weapon::new(config.shot_policy),
            health: config.max_health,
            last_hit_ms: None,
            config: config.clone(),
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health < self.config.death_threshold
    }

    pub fn is_invulnerable(&self, now_ms: u64) -> bool {
        self.last_hit_ms
            .is_some_and(|hit| now_ms.saturating_sub(hit) < self.config.invulnerability_ms)
    }

    /// Debits `amount` unless the player was hit within the invulnerability
    /// window. Returns whether damage was taken.
    pub fn take_damage(&mut self, amount: i32, now_ms: u64) -> bool {
        if self.is_invulnerable(now_ms) {
            return false;
        }
        self.health -= amount;
        self.last_hit_ms = Some(now_ms);
        log::debug!("player took {amount} damage, health {}", self.health);
        true
    }

    /// Heals up to max health.
    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.config.max_health);
    }

    /// One frame of player control and motion. Returns a shot request when
    /// the gun fired.
    pub fn update(
        &mut self,
        input: &InputSnapshot,
        ctx: StepContext<'_>,
        library: &AnimationLibrary,
    ) -> Result<Option<ProjectileSpawn>> {
        let StepContext {
            resolver,
            platforms,
            now_ms,
        } = ctx;
        let rising = self.body.movement.vertical == Vertical::Up;
        self.collisions.clear();

        self.body.acceleration = Vec2::new(input.horizontal() * self.config.acceleration, 0.0);
        self.body.apply_friction(resolver.friction);
        resolver.resolve_horizontal(&mut self.body, platforms, &mut self.collisions);

        resolver.begin_vertical(&mut self.body);
        if input.is_held(Action::Jump) && !rising && resolver.jump(&mut self.body, platforms, self.config.jump_impulse) {
            log::debug!("player jumped from y={:.1}", self.body.position.y);
        }
        if input.was_released(Action::Jump) && rising {
            jump_cut(&mut self.body, self.config.jump_impulse);
        }
        resolver.resolve_vertical(&mut self.body, platforms, &mut self.collisions);

        let shooting = input.is_held(Action::Shoot);
        self.flags = AnimationFlags::derive(&self.body.movement, shooting, &self.flags);
        super::animate(&mut self.animator, library, &self.flags, &mut self.body, ctx)?;

        if !self.weapon.try_fire(input, now_ms) {
            return Ok(None);
        }
        let bounds = self.body.bounds();
        let (origin, direction) = if self.flags.facing_right {
            (bounds.mid_right(), 1.0)
        } else {
            (bounds.mid_left(), -1.0)
        };
        Ok(Some(ProjectileSpawn {
            origin,
            velocity: Vec2::new(direction * self.config.shot_speed, 0.0),
            team: Team::Player,
        }))
    }
}
