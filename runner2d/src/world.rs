//! The round: every entity, the level geometry and the camera, stepped in a
//! fixed order once per frame.

use std::collections::BTreeMap;

use crate::animation::{AnimationFlags, AnimationLibrary, Frame, FrameSet, Playback};
use crate::assets::FrameCatalog;
use crate::body::KinematicBody;
use crate::camera::Camera;
use crate::collision::{PlatformSet, Resolver};
use crate::config::{AnimationConfig, GameConfig};
use crate::entities::{Enemy, Pickup, Player, Projectile, ProjectileSpawn, StepContext, Team};
use crate::error::{CoreError, Result};
use crate::input::{Action, InputSnapshot};
use crate::level::{LevelData, SpawnKind};
use crate::math::{Rect, Vec2};

/// Unique identifier for an entity in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Get the underlying integer ID (useful for debugging or serialization).
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The player dropped below the level.
    FellOff,
    /// Health fell under the death threshold.
    Died,
    Quit,
    /// The player's own update failed.
    Fault,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    Playing,
    Over(EndReason),
}

impl RoundState {
    pub fn is_over(self) -> bool {
        matches!(self, RoundState::Over(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Enemy,
    Projectile,
    Pickup,
}

/// One sprite to draw, already in screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub frame: Frame,
    pub rect: Rect,
}

/// Animation libraries per entity kind.
#[derive(Clone, Debug)]
pub struct Libraries {
    pub player: AnimationLibrary,
    pub enemy: AnimationLibrary,
    pub projectile: AnimationLibrary,
    pub pickup: AnimationLibrary,
}

impl Libraries {
    /// Looks up the default frame names: the player sheet (see
    /// [`AnimationLibrary::player`]), `enemy_0`, `projectile_0` and
    /// `health_drop_0..4`.
    pub fn from_catalog(catalog: &FrameCatalog, config: &AnimationConfig) -> Result<Self> {
        let single = |name: &str, count: usize, interval: u64| -> Result<AnimationLibrary> {
            let set = FrameSet::new(name, catalog.sequence(name, count), Playback::Looping, interval)?;
            let mut library = AnimationLibrary::uniform(set);
            library.attach_masks(catalog, name, count);
            Ok(library)
        };
        Ok(Self {
            player: AnimationLibrary::player(catalog, config)?,
            enemy: single("enemy", 1, config.idle_interval_ms)?,
            projectile: single("projectile", 1, config.idle_interval_ms)?,
            pickup: single("health_drop", 4, config.action_interval_ms)?,
        })
    }
}

pub struct World {
    config: GameConfig,
    resolver: Resolver,
    platforms: PlatformSet,
    level_bounds: Rect,
    camera: Camera,
    libraries: Libraries,
    rng: fastrand::Rng,
    next_id: u32,
    player_id: EntityId,
    player: Player,
    enemies: BTreeMap<EntityId, Enemy>,
    projectiles: BTreeMap<EntityId, Projectile>,
    pickups: BTreeMap<EntityId, Pickup>,
    state: RoundState,
}

impl World {
    /// Builds a round from a validated level and config.
    pub fn new(level: &LevelData, config: GameConfig, libraries: Libraries) -> Result<Self> {
        config.validate()?;
        level.validate()?;
        let spawn = level
            .player_spawn()
            .ok_or_else(|| CoreError::InvalidLevel("level has no player spawn".into()))?;

        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let view = Vec2::new(config.display.width as f32, config.display.height as f32);
        let camera = Camera::new(view, level.size(), config.focus_point());

        let mut world = Self {
            resolver: Resolver::from_config(&config.physics),
            platforms: level.platforms(),
            level_bounds: level.bounds(),
            camera,
            libraries,
            rng,
            next_id: 1,
            player_id: EntityId(0),
            player: Player::new(spawn, &config.player),
            enemies: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            pickups: BTreeMap::new(),
            state: RoundState::Playing,
            config,
        };
        world.player_id = world.allocate_id();

        for object in level.objects_of(SpawnKind::BaseEnemy) {
            world.spawn_enemy(object.position(), 0);
        }
        for object in level.objects_of(SpawnKind::Coin) {
            world.spawn_pickup(object.position());
        }
        world.follow_player();

        log::info!(
            "round started: {} platforms, {} enemies, {} pickups",
            world.platforms.len(),
            world.enemies.len(),
            world.pickups.len()
        );
        Ok(world)
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn spawn_enemy(&mut self, position: Vec2, now_ms: u64) -> EntityId {
        let id = self.allocate_id();
        let first_shot = now_ms + Enemy::roll_interval(&self.config.enemy, &mut self.rng);
        self.enemies.insert(id, Enemy::new(position, &self.config.enemy, first_shot));
        log::debug!("spawned enemy {id:?} at ({:.0}, {:.0})", position.x, position.y);
        id
    }

    pub fn spawn_pickup(&mut self, position: Vec2) -> EntityId {
        let id = self.allocate_id();
        self.pickups.insert(id, Pickup::new(position, &self.config.pickup));
        id
    }

    pub fn spawn_projectile(&mut self, spawn: &ProjectileSpawn, now_ms: u64) -> EntityId {
        let id = self.allocate_id();
        self.projectiles
            .insert(id, Projectile::new(spawn, &self.config.projectile, now_ms));
        log::trace!("spawned {:?} projectile {id:?}", spawn.team);
        id
    }

    /// Removes a non-player entity. Returns false if it was not alive.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.enemies.remove(&entity).is_some()
            || self.projectiles.remove(&entity).is_some()
            || self.pickups.remove(&entity).is_some()
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        entity == self.player_id
            || self.enemies.contains_key(&entity)
            || self.projectiles.contains_key(&entity)
            || self.pickups.contains_key(&entity)
    }

    /// Number of alive entities, the player included.
    pub fn entity_count(&self) -> usize {
        1 + self.enemies.len() + self.projectiles.len() + self.pickups.len()
    }

    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> impl Iterator<Item = (EntityId, &Enemy)> {
        self.enemies.iter().map(|(id, e)| (*id, e))
    }

    pub fn projectiles(&self) -> impl Iterator<Item = (EntityId, &Projectile)> {
        self.projectiles.iter().map(|(id, p)| (*id, p))
    }

    pub fn pickups(&self) -> impl Iterator<Item = (EntityId, &Pickup)> {
        self.pickups.iter().map(|(id, p)| (*id, p))
    }

    pub fn platforms(&self) -> &PlatformSet {
        &self.platforms
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Runs one frame: player, enemies, projectiles, pickups, interactions,
    /// camera, end-of-round checks.
    pub fn step(&mut self, input: &InputSnapshot, now_ms: u64) -> RoundState {
        if self.state.is_over() {
            return self.state;
        }
        if input.is_held(Action::Quit) || input.was_pressed(Action::Quit) {
            return self.end(EndReason::Quit);
        }

        let mut shots = Vec::new();
        match self.update_player(input, now_ms) {
            Ok(shot) => shots.extend(shot),
            Err(err) => {
                log::error!("player update failed: {err}");
                return self.end(EndReason::Fault);
            }
        }

        shots.extend(self.update_enemies(now_ms));
        for shot in &shots {
            self.spawn_projectile(shot, now_ms);
        }
        self.update_projectiles(now_ms);
        self.animate_pickups(now_ms);

        self.collect_pickups();
        self.hit_player(now_ms);
        self.hit_enemies();

        self.follow_player();

        if self.player.body.bounds().bottom() > self.level_bounds.bottom() {
            return self.end(EndReason::FellOff);
        }
        if self.player.is_dead() {
            return self.end(EndReason::Died);
        }
        self.state
    }

    fn end(&mut self, reason: EndReason) -> RoundState {
        log::info!("round over: {reason:?} (health {})", self.player.health());
        self.state = RoundState::Over(reason);
        self.state
    }

    fn update_player(&mut self, input: &InputSnapshot, now_ms: u64) -> Result<Option<ProjectileSpawn>> {
        let ctx = StepContext {
            resolver: &self.resolver,
            platforms: &self.platforms,
            now_ms,
        };
        let shot = self.player.update(input, ctx, &self.libraries.player)?;
        ensure_finite(self.player_id, &self.player.body, "player body")?;
        Ok(shot)
    }

    fn update_enemies(&mut self, now_ms: u64) -> Vec<ProjectileSpawn> {
        let target = self.player.body.position;
        let ctx = StepContext {
            resolver: &self.resolver,
            platforms: &self.platforms,
            now_ms,
        };

        let mut shots = Vec::new();
        let mut failed = Vec::new();
        for (id, enemy) in self.enemies.iter_mut() {
            let result = enemy
                .update(target, ctx, &self.libraries.enemy, &self.config.enemy, &mut self.rng)
                .and_then(|shot| ensure_finite(*id, &enemy.body, "enemy body").map(|()| shot));
            match result {
                Ok(shot) => shots.extend(shot),
                Err(err) => {
                    log::warn!("deactivating enemy {id:?}: {err}");
                    failed.push(*id);
                }
            }
        }
        for id in failed {
            self.enemies.remove(&id);
        }
        shots
    }

    fn update_projectiles(&mut self, now_ms: u64) {
        let config = &self.config.projectile;
        let library = &self.libraries.projectile;
        let level = self.level_bounds;
        let key = AnimationFlags::default().key();

        self.projectiles.retain(|id, shot| {
            shot.update();
            if let Err(err) = ensure_finite(*id, &shot.body, "projectile body") {
                log::warn!("removing projectile {id:?}: {err}");
                return false;
            }
            if let Err(err) = shot.animator.tick(library, key, now_ms) {
                log::warn!("removing projectile {id:?}: {err}");
                return false;
            }
            match shot.expiry(config, &level, now_ms) {
                Some(reason) => {
                    log::trace!("projectile {id:?} expired: {reason:?}");
                    false
                }
                None => true,
            }
        });
    }

    fn animate_pickups(&mut self, now_ms: u64) {
        let library = &self.libraries.pickup;
        let ctx = StepContext {
            resolver: &self.resolver,
            platforms: &self.platforms,
            now_ms,
        };
        self.pickups.retain(|id, pickup| match pickup.animate(library, ctx) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("removing pickup {id:?}: {err}");
                false
            }
        });
    }

    fn collect_pickups(&mut self) {
        let bounds = self.player.body.bounds();
        let ratio = self.config.pickup.radius_ratio;
        let player = &mut self.player;
        self.pickups.retain(|id, pickup| {
            if !pickup.collected_by(&bounds, ratio) {
                return true;
            }
            player.heal(pickup.heal);
            log::debug!("picked up {id:?}, health {}", player.health());
            false
        });
    }

    /// Enemy shots touching the player are consumed; the first one knocks the
    /// player back and deals damage.
    fn hit_player(&mut self, now_ms: u64) {
        let bounds = self.player.body.bounds();
        let mut first_hit: Option<(Vec2, i32)> = None;
        self.projectiles.retain(|_, shot| {
            if shot.team != Team::Enemy || !shot.body.bounds().intersects(&bounds) {
                return true;
            }
            first_hit.get_or_insert((shot.body.velocity, shot.damage));
            false
        });

        if let Some((velocity, damage)) = first_hit {
            self.player.body.velocity += velocity / self.config.projectile.knockback_divisor;
            self.player.take_damage(damage, now_ms);
        }
    }

    /// Player shots damage every enemy they touch and are consumed.
    fn hit_enemies(&mut self) {
        let enemies = &mut self.enemies;
        self.projectiles.retain(|_, shot| {
            if shot.team != Team::Player {
                return true;
            }
            let bounds = shot.body.bounds();
            let mut hit = false;
            for enemy in enemies.values_mut() {
                if enemy.body.bounds().intersects(&bounds) {
                    enemy.take_damage(shot.damage);
                    hit = true;
                }
            }
            !hit
        });

        self.enemies.retain(|id, enemy| {
            if enemy.is_dead() {
                log::debug!("enemy {id:?} destroyed");
                false
            } else {
                true
            }
        });
    }

    fn follow_player(&mut self) {
        let bounds = self.player.body.bounds();
        self.camera.update(Vec2::new(bounds.x, bounds.y));
    }

    /// Screen-space draw commands for everything on screen, player last.
    pub fn draw_list(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::new();
        let mut push = |entity, kind, body: &KinematicBody, frame: Option<Frame>| {
            let bounds = body.bounds();
            if let Some(frame) = frame {
                if self.camera.is_visible(&bounds) {
                    commands.push(DrawCommand {
                        entity,
                        kind,
                        frame,
                        rect: self.camera.apply(&bounds),
                    });
                }
            }
        };

        for (id, pickup) in &self.pickups {
            push(*id, EntityKind::Pickup, &pickup.body, pickup.animator.current_frame(&self.libraries.pickup));
        }
        for (id, enemy) in &self.enemies {
            push(*id, EntityKind::Enemy, &enemy.body, enemy.animator.current_frame(&self.libraries.enemy));
        }
        for (id, shot) in &self.projectiles {
            push(*id, EntityKind::Projectile, &shot.body, shot.animator.current_frame(&self.libraries.projectile));
        }
        push(
            self.player_id,
            EntityKind::Player,
            &self.player.body,
            self.player.animator.current_frame(&self.libraries.player),
        );
        commands
    }

    /// Platforms currently on screen, in screen space.
    pub fn visible_platforms(&self) -> Vec<Rect> {
        self.platforms
            .iter()
            .map(|p| *p.rect())
            .filter(|r| self.camera.is_visible(r))
            .map(|r| self.camera.apply(&r))
            .collect()
    }
}

fn ensure_finite(entity: EntityId, body: &KinematicBody, what: &'static str) -> Result<()> {
    if body.is_finite() {
        Ok(())
    } else {
        Err(CoreError::NonFinite { entity, what })
    }
}
