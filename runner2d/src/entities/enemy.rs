use crate::animation::{AnimationFlags, AnimationLibrary, Animator};
use crate::body::{Anchor, KinematicBody};
use crate::collision::CollisionFlags;
use crate::config::EnemyConfig;
use crate::error::Result;
use crate::math::Vec2;

use super::projectile::{ProjectileSpawn, Team};
use super::StepContext;

/// Stationary shooter: falls under gravity, lands on platforms and fires at
/// the player on a randomized timer.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: KinematicBody,
    pub flags: AnimationFlags,
    pub collisions: CollisionFlags,
    pub animator: Animator,
    health: i32,
    next_shot_ms: u64,
}

impl Enemy {
    pub fn new(spawn: Vec2, config: &EnemyConfig, first_shot_ms: u64) -> Self {
        Self {
            body: KinematicBody::new(spawn, config.size, Anchor::BottomCenter),
            flags: AnimationFlags::default(),
            collisions: CollisionFlags::default(),
            animator: Animator::new(),
            health: config.health,
            next_shot_ms: first_shot_ms,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    pub fn next_shot_ms(&self) -> u64 {
        self.next_shot_ms
    }

    /// Random delay until the next shot, inclusive on both ends.
    pub fn roll_interval(config: &EnemyConfig, rng: &mut fastrand::Rng) -> u64 {
        rng.u64(config.shot_interval_min_ms..=config.shot_interval_max_ms)
    }

    pub fn update(
        &mut self,
        target: Vec2,
        ctx: StepContext<'_>,
        library: &AnimationLibrary,
        config: &EnemyConfig,
        rng: &mut fastrand::Rng,
    ) -> Result<Option<ProjectileSpawn>> {
        let now_ms = ctx.now_ms;
        self.body.acceleration = Vec2::ZERO;
        self.collisions = ctx.resolver.step(&mut self.body, ctx.platforms);

        let mut flags = AnimationFlags::derive(&self.body.movement, false, &self.flags);
        flags.facing_right = target.x > self.body.position.x;
        self.flags = flags;
        super::animate(&mut self.animator, library, &self.flags, &mut self.body, ctx)?;

        if now_ms < self.next_shot_ms {
            return Ok(None);
        }
        self.next_shot_ms = now_ms + Self::roll_interval(config, rng);

        let bounds = self.body.bounds();
        let (origin, direction) = if self.flags.facing_right {
            (bounds.mid_right(), 1.0)
        } else {
            (bounds.mid_left(), -1.0)
        };
        Ok(Some(ProjectileSpawn {
            origin,
            velocity: Vec2::new(direction * config.shot_speed, 0.0),
            team: Team::Enemy,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Frame, FrameHandle, FrameSet, Playback};
    use crate::collision::{Platform, PlatformSet, Resolver};
    use crate::config::PhysicsConfig;
    use crate::math::approx_eq;

    fn library() -> AnimationLibrary {
        let frame = Frame::new(FrameHandle(7), 64.0, 64.0);
        AnimationLibrary::uniform(FrameSet::new("enemy", vec![frame], Playback::Looping, 100).unwrap())
    }

    #[test]
    fn falls_and_lands_on_floor() {
        let config = EnemyConfig::default();
        let resolver = Resolver::from_config(&PhysicsConfig::default());
        let platforms: PlatformSet = [Platform::new(0.0, 500.0, 1000.0, 50.0)].into_iter().collect();
        let mut rng = fastrand::Rng::with_seed(1);
        let mut enemy = Enemy::new(Vec2::new(300.0, 400.0), &config, u64::MAX);

        for frame in 0..120 {
            let ctx = StepContext {
                resolver: &resolver,
                platforms: &platforms,
                now_ms: frame * 16,
            };
            enemy.update(Vec2::ZERO, ctx, &library(), &config, &mut rng).unwrap();
        }
        assert!(approx_eq(enemy.body.bounds().bottom(), 501.0));
        assert_eq!(enemy.body.velocity.y, 0.0);
    }

    #[test]
    fn fires_toward_the_player_and_rerolls() {
        let config = EnemyConfig::default();
        let resolver = Resolver::from_config(&PhysicsConfig::default());
        let platforms = PlatformSet::new();
        let mut rng = fastrand::Rng::with_seed(42);
        let mut enemy = Enemy::new(Vec2::new(300.0, 400.0), &config, 1000);

        let ctx = |now_ms| StepContext {
            resolver: &resolver,
            platforms: &platforms,
            now_ms,
        };
        let target = Vec2::new(0.0, 400.0);

        let none = enemy.update(target, ctx(999), &library(), &config, &mut rng).unwrap();
        assert!(none.is_none());

        let shot = enemy
            .update(target, ctx(1000), &library(), &config, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(shot.team, Team::Enemy);
        assert_eq!(shot.velocity, Vec2::new(-20.0, 0.0));
        let wait = enemy.next_shot_ms() - 1000;
        assert!((1500..=3000).contains(&wait));
    }

    #[test]
    fn dies_at_zero_health() {
        let mut enemy = Enemy::new(Vec2::ZERO, &EnemyConfig::default(), 0);
        enemy.take_damage(5);
        assert!(!enemy.is_dead());
        enemy.take_damage(5);
        assert!(enemy.is_dead());
    }
}
