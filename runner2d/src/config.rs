//! Tunable constants for a round, loadable from JSON.
//!
//! Every section uses `#[serde(default)]`, so a config file only needs to
//! mention the values it overrides. Units follow the frame-stepped model:
//! velocities are pixels per frame, accelerations pixels per frame squared.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collision::ResolveOrder;
use crate::error::{CoreError, Result};
use crate::math::Vec2;

/// Window / viewport and frame pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 640,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration added every frame.
    pub gravity: f32,
    /// Velocity-proportional deceleration, must be in `(-1, 0]`.
    pub friction: f32,
    /// A landing body ends up this many pixels inside the platform top.
    pub landing_bias: f32,
    /// Gap left under a ceiling after a head bump.
    pub ceiling_bias: f32,
    /// How far below the feet the grounded probe looks.
    pub ground_probe: f32,
    /// Downward speed limit. `None` lets a fall accelerate without bound.
    pub max_fall_speed: Option<f32>,
    pub resolve_order: ResolveOrder,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            friction: -0.12,
            landing_bias: 1.0,
            ceiling_bias: 1.0,
            ground_probe: 2.0,
            max_fall_speed: None,
            resolve_order: ResolveOrder::Insertion,
        }
    }
}

/// How the player's weapon re-arms after a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShotPolicy {
    /// Holding shoot fires again once `cooldown_ms` has elapsed.
    Cooldown { cooldown_ms: u64 },
    /// One shot per press; re-armed by the shoot release edge.
    UntilRelease,
}

impl Default for ShotPolicy {
    fn default() -> Self {
        ShotPolicy::Cooldown { cooldown_ms: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub acceleration: f32,
    /// Vertical velocity set by a successful jump (negative is up).
    pub jump_impulse: f32,
    pub max_health: i32,
    /// The round ends once health drops below this.
    pub death_threshold: i32,
    pub invulnerability_ms: u64,
    pub shot_speed: f32,
    pub shot_policy: ShotPolicy,
    /// Bounds used until the first animation frame is applied.
    pub size: Vec2,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            acceleration: 0.5,
            jump_impulse: -20.0,
            max_health: 100,
            death_threshold: 10,
            invulnerability_ms: 1000,
            shot_speed: 10.0,
            shot_policy: ShotPolicy::default(),
            size: Vec2::new(120.0, 104.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub health: i32,
    pub shot_interval_min_ms: u64,
    pub shot_interval_max_ms: u64,
    pub shot_speed: f32,
    pub size: Vec2,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            health: 10,
            shot_interval_min_ms: 1500,
            shot_interval_max_ms: 3000,
            shot_speed: 20.0,
            size: Vec2::new(64.0, 64.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Horizontal travel after which a projectile is removed.
    pub kill_distance: f32,
    /// Optional wall-clock lifetime on top of the travel limit.
    pub max_lifetime_ms: Option<u64>,
    pub damage: i32,
    /// Knockback applied to the player is `projectile.velocity / knockback_divisor`.
    pub knockback_divisor: f32,
    pub size: Vec2,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            kill_distance: 600.0,
            max_lifetime_ms: None,
            damage: 10,
            knockback_divisor: 5.0,
            size: Vec2::new(50.0, 20.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub heal: i32,
    /// Fraction of the summed half-extents used as the pickup radius.
    pub radius_ratio: f32,
    pub size: Vec2,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            heal: 10,
            radius_ratio: 0.5,
            size: Vec2::new(32.0, 32.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Screen-space point the tracked entity is kept at. `None` centers it.
    pub focus_point: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub idle_interval_ms: u64,
    pub action_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_interval_ms: 100,
            action_interval_ms: 50,
        }
    }
}

/// Top-level configuration for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub projectile: ProjectileConfig,
    pub pickup: PickupConfig,
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
    /// Seed for enemy fire timing. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.display.width = width;
        self.display.height = height;
        self
    }

    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.display.fps = fps;
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.physics.gravity = gravity;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Screen-space focus point for the camera.
    pub fn focus_point(&self) -> Vec2 {
        self.camera.focus_point.unwrap_or_else(|| {
            Vec2::new(
                self.display.width as f32 / 2.0,
                self.display.height as f32 / 2.0,
            )
        })
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(CoreError::InvalidConfig(msg));

        if self.display.width == 0 || self.display.height == 0 {
            return fail("viewport must be non-empty".into());
        }
        if self.display.fps == 0 {
            return fail("fps must be positive".into());
        }
        if !self.physics.gravity.is_finite() {
            return fail("gravity must be finite".into());
        }
        if !(self.physics.friction > -1.0 && self.physics.friction <= 0.0) {
            return fail(format!(
                "friction must be in (-1, 0], got {}",
                self.physics.friction
            ));
        }
        if self.physics.landing_bias < 0.0 || self.physics.ceiling_bias < 0.0 {
            return fail("collision biases must not be negative".into());
        }
        if self.physics.ground_probe <= 0.0 {
            return fail("ground probe depth must be positive".into());
        }
        if self.physics.max_fall_speed.is_some_and(|max| max.is_nan() || max <= 0.0) {
            return fail("max fall speed must be positive".into());
        }
        if self.player.jump_impulse >= 0.0 {
            return fail("jump impulse must point up (negative)".into());
        }
        if self.player.size.x <= 0.0 || self.player.size.y <= 0.0 {
            return fail("player size must be positive".into());
        }
        if self.enemy.shot_interval_min_ms > self.enemy.shot_interval_max_ms {
            return fail("enemy shot interval min exceeds max".into());
        }
        if self.projectile.kill_distance <= 0.0 {
            return fail("projectile kill distance must be positive".into());
        }
        if self.projectile.knockback_divisor == 0.0 {
            return fail("knockback divisor must be non-zero".into());
        }
        if let ShotPolicy::Cooldown { cooldown_ms: 0 } = self.player.shot_policy {
            return fail("shot cooldown must be positive".into());
        }
        if self.animation.idle_interval_ms == 0 || self.animation.action_interval_ms == 0 {
            return fail("animation intervals must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            GameConfig::from_json_str(r#"{ "physics": { "gravity": 10.0 }, "seed": 7 }"#).unwrap();
        assert_eq!(config.physics.gravity, 10.0);
        assert_eq!(config.physics.friction, -0.12);
        assert_eq!(config.player.jump_impulse, -20.0);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn shot_policy_is_tagged() {
        let config = GameConfig::from_json_str(
            r#"{ "player": { "shot_policy": { "kind": "until_release" } } }"#,
        )
        .unwrap();
        assert_eq!(config.player.shot_policy, ShotPolicy::UntilRelease);
    }

    #[test]
    fn rejects_positive_friction() {
        let err = GameConfig::from_json_str(r#"{ "physics": { "friction": 0.3 } }"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn focus_point_defaults_to_viewport_center() {
        let config = GameConfig::default().with_viewport(800, 600);
        assert_eq!(config.focus_point(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn json_round_trip_keeps_overrides() {
        let config = GameConfig::default().with_gravity(1.5).with_seed(11);
        let parsed = GameConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.physics.gravity, 1.5);
        assert_eq!(parsed.physics.max_fall_speed, None);
    }

    #[test]
    fn rejects_non_positive_fall_speed() {
        let err = GameConfig::from_json_str(r#"{ "physics": { "max_fall_speed": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
        let config = GameConfig::from_json_str(r#"{ "physics": { "max_fall_speed": 18.0 } }"#).unwrap();
        assert_eq!(config.physics.max_fall_speed, Some(18.0));
    }
}
