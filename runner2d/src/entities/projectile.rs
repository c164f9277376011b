use crate::animation::Animator;
use crate::body::{Anchor, KinematicBody};
use crate::config::ProjectileConfig;
use crate::math::{Rect, Vec2};

/// Who fired a projectile, and therefore who it can hurt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Team {
    Player,
    Enemy,
}

/// A shot request emitted by a shooter; the world turns it into a [`Projectile`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSpawn {
    /// Center of the new projectile.
    pub origin: Vec2,
    pub velocity: Vec2,
    pub team: Team,
}

/// Why a projectile was removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    Distance,
    OutOfLevel,
    Lifetime,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub body: KinematicBody,
    pub team: Team,
    pub damage: i32,
    pub animator: Animator,
    spawn_x: f32,
    spawned_ms: u64,
}

impl Projectile {
    pub fn new(spawn: &ProjectileSpawn, config: &ProjectileConfig, now_ms: u64) -> Self {
        let body = KinematicBody::new(spawn.origin, config.size, Anchor::Center)
            .with_velocity(spawn.velocity)
            .gravity_exempt();
        Self {
            body,
            team: spawn.team,
            damage: config.damage,
            animator: Animator::new(),
            spawn_x: spawn.origin.x,
            spawned_ms: now_ms,
        }
    }

    /// Constant velocity, no collision.
    pub fn update(&mut self) {
        self.body.acceleration = Vec2::ZERO;
        self.body.integrate();
    }

    pub fn travelled(&self) -> f32 {
        (self.body.position.x - self.spawn_x).abs()
    }

    pub fn expiry(&self, config: &ProjectileConfig, level: &Rect, now_ms: u64) -> Option<Expiry> {
        if self.travelled() > config.kill_distance {
            return Some(Expiry::Distance);
        }
        if !level.intersects(&self.body.bounds()) {
            return Some(Expiry::OutOfLevel);
        }
        match config.max_lifetime_ms {
            Some(limit) if now_ms.saturating_sub(self.spawned_ms) > limit => Some(Expiry::Lifetime),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(velocity: f32) -> ProjectileSpawn {
        ProjectileSpawn {
            origin: Vec2::new(0.0, 100.0),
            velocity: Vec2::new(velocity, 0.0),
            team: Team::Player,
        }
    }

    #[test]
    fn flies_straight_without_gravity() {
        let mut shot = Projectile::new(&spawn(10.0), &ProjectileConfig::default(), 0);
        for _ in 0..5 {
            shot.update();
        }
        assert_eq!(shot.body.position, Vec2::new(50.0, 100.0));
        assert_eq!(shot.body.velocity, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn lifetime_limit_is_optional() {
        let level = Rect::new(-1000.0, 0.0, 5000.0, 500.0);
        let mut config = ProjectileConfig::default();
        let shot = Projectile::new(&spawn(10.0), &config, 100);
        assert_eq!(shot.expiry(&config, &level, 100_000), None);

        config.max_lifetime_ms = Some(500);
        assert_eq!(shot.expiry(&config, &level, 600), None);
        assert_eq!(shot.expiry(&config, &level, 601), Some(Expiry::Lifetime));
    }

    #[test]
    fn leaving_the_level_expires() {
        let level = Rect::new(0.0, 0.0, 100.0, 500.0);
        let config = ProjectileConfig::default();
        let mut shot = Projectile::new(&spawn(-10.0), &config, 0);
        for _ in 0..3 {
            shot.update();
        }
        assert_eq!(shot.expiry(&config, &level, 0), Some(Expiry::OutOfLevel));
    }
}
