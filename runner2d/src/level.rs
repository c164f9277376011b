//! Level description handed over by a map-loading collaborator.
//!
//! A level is its pixel size plus a flat list of named objects, the same
//! shape an object layer in a map editor exports. Objects named `platform`
//! become collision geometry; `player`, `base_enemy` and `coin` are spawn
//! points. Unknown names are kept but ignored by the world.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collision::{Platform, PlatformSet};
use crate::error::{CoreError, Result};
use crate::math::{Rect, Vec2};

/// What a named level object spawns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnKind {
    Player,
    BaseEnemy,
    Coin,
    Platform,
}

impl SpawnKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "player" => Some(SpawnKind::Player),
            "base_enemy" => Some(SpawnKind::BaseEnemy),
            "coin" => Some(SpawnKind::Coin),
            "platform" => Some(SpawnKind::Platform),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpawnKind::Player => "player",
            SpawnKind::BaseEnemy => "base_enemy",
            SpawnKind::Coin => "coin",
            SpawnKind::Platform => "platform",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl LevelObject {
    pub fn new(kind: SpawnKind, x: f32, y: f32) -> Self {
        Self {
            name: kind.name().to_string(),
            x,
            y,
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn platform(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            name: SpawnKind::Platform.name().to_string(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn kind(&self) -> Option<SpawnKind> {
        SpawnKind::from_name(&self.name)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub objects: Vec<LevelObject>,
}

impl LevelData {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            objects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_object(mut self, object: LevelObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn platforms(&self) -> PlatformSet {
        self.objects_of(SpawnKind::Platform)
            .map(|o| Platform::from_rect(o.rect()))
            .collect()
    }

    pub fn objects_of(&self, kind: SpawnKind) -> impl Iterator<Item = &LevelObject> {
        self.objects.iter().filter(move |o| o.kind() == Some(kind))
    }

    pub fn player_spawn(&self) -> Option<Vec2> {
        self.objects_of(SpawnKind::Player).next().map(LevelObject::position)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite()) || self.width <= 0.0 || self.height <= 0.0 {
            return Err(CoreError::InvalidLevel(format!(
                "level size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        for object in &self.objects {
            if !(object.x.is_finite() && object.y.is_finite()) {
                return Err(CoreError::InvalidLevel(format!(
                    "object `{}` has a non-finite position",
                    object.name
                )));
            }
            if object.kind() == Some(SpawnKind::Platform) && (object.width <= 0.0 || object.height <= 0.0) {
                return Err(CoreError::InvalidLevel(format!(
                    "platform at ({}, {}) has an empty size",
                    object.x, object.y
                )));
            }
        }
        if self.player_spawn().is_none() {
            return Err(CoreError::InvalidLevel("level has no player spawn".into()));
        }
        Ok(())
    }

    /// Builds a level from an ASCII grid. `1` and `2` are solid tiles
    /// (consecutive tiles on a row merge into one platform), `P` spawns the
    /// player, `E` an enemy and `C` a coin, all standing on the cell's bottom
    /// edge. Any other character is empty space.
    pub fn from_tile_rows<S: AsRef<str>>(rows: &[S], tile_size: Vec2) -> Result<Self> {
        if tile_size.x <= 0.0 || tile_size.y <= 0.0 {
            return Err(CoreError::InvalidLevel("tile size must be positive".into()));
        }

        let columns = rows.iter().map(|r| r.as_ref().chars().count()).max().unwrap_or(0);
        let mut level = LevelData::new(columns as f32 * tile_size.x, rows.len() as f32 * tile_size.y);

        for (row, line) in rows.iter().enumerate() {
            let top = row as f32 * tile_size.y;
            let mut run_start: Option<usize> = None;

            for (col, ch) in line.as_ref().chars().chain(std::iter::once(' ')).enumerate() {
                let solid = matches!(ch, '1' | '2');
                match (solid, run_start) {
                    (true, None) => run_start = Some(col),
                    (false, Some(start)) => {
                        level.objects.push(LevelObject::platform(
                            start as f32 * tile_size.x,
                            top,
                            (col - start) as f32 * tile_size.x,
                            tile_size.y,
                        ));
                        run_start = None;
                    }
                    _ => {}
                }

                let kind = match ch {
                    'P' => SpawnKind::Player,
                    'E' => SpawnKind::BaseEnemy,
                    'C' => SpawnKind::Coin,
                    _ => continue,
                };
                let x = col as f32 * tile_size.x + tile_size.x / 2.0;
                level.objects.push(LevelObject::new(kind, x, top + tile_size.y));
            }
        }

        Ok(level)
    }

    /// A single-screen starter level: a floor, four ledges, three coins and
    /// one enemy.
    pub fn starter() -> Self {
        let (w, h) = (1024.0, 640.0);
        let mut level = LevelData::new(w, h);
        let platforms = [
            (0.0, h - 40.0, w, 40.0),
            (w / 2.0 - 200.0, h * 3.0 / 4.0 - 50.0, 100.0, 20.0),
            (125.0, h - 350.0, 100.0, 20.0),
            (350.0, 200.0, 100.0, 20.0),
            (175.0, 100.0, 50.0, 20.0),
        ];
        for (x, y, pw, ph) in platforms {
            level.objects.push(LevelObject::platform(x, y, pw, ph));
        }
        for (x, y) in [(50.0, h - 100.0), (125.0, h - 400.0), (350.0, 250.0)] {
            level.objects.push(LevelObject::new(SpawnKind::Coin, x, y));
        }
        level.objects.push(LevelObject::new(SpawnKind::Player, w / 2.0, h - 40.0));
        level.objects.push(LevelObject::new(SpawnKind::BaseEnemy, w - 150.0, h - 40.0));
        level
    }
}

/// Map-loading collaborator.
pub trait LevelLoader {
    fn load(&self, path: &Path) -> Result<LevelData>;
}

/// Reads [`LevelData`] from a JSON file.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLevelLoader;

impl JsonLevelLoader {
    pub fn parse(json: &str) -> Result<LevelData> {
        let level: LevelData = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }
}

impl LevelLoader for JsonLevelLoader {
    fn load(&self, path: &Path) -> Result<LevelData> {
        let fail = |reason: String| CoreError::LevelLoad {
            path: path.to_path_buf(),
            reason,
        };

        let json = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let level = Self::parse(&json).map_err(|e| fail(e.to_string()))?;
        log::info!(
            "loaded level {} ({}x{}, {} objects)",
            path.display(),
            level.width,
            level.height,
            level.objects.len()
        );
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn starter_level_is_valid() {
        let level = LevelData::starter();
        level.validate().unwrap();
        assert_eq!(level.platforms().len(), 5);
        assert_eq!(level.objects_of(SpawnKind::Coin).count(), 3);
        assert_eq!(level.player_spawn(), Some(Vec2::new(512.0, 600.0)));
    }

    #[test]
    fn tile_rows_merge_runs_and_place_spawns() {
        let rows = ["....", ".P.E", "1122", "1.C1"];
        let level = LevelData::from_tile_rows(&rows, Vec2::new(32.0, 32.0)).unwrap();
        assert_eq!(level.size(), Vec2::new(128.0, 128.0));

        let platforms: Vec<Rect> = level.platforms().iter().map(|p| *p.rect()).collect();
        assert_eq!(
            platforms,
            vec![
                Rect::new(0.0, 64.0, 128.0, 32.0),
                Rect::new(0.0, 96.0, 32.0, 32.0),
                Rect::new(96.0, 96.0, 32.0, 32.0),
            ]
        );
        assert_eq!(level.player_spawn(), Some(Vec2::new(48.0, 64.0)));
        assert_eq!(level.objects_of(SpawnKind::BaseEnemy).count(), 1);
        assert_eq!(level.objects_of(SpawnKind::Coin).next().map(|c| c.position()), Some(Vec2::new(80.0, 128.0)));
    }

    #[test]
    fn json_loader_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&LevelData::starter()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let level = JsonLevelLoader.load(file.path()).unwrap();
        assert_eq!(level, LevelData::starter());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = JsonLevelLoader.load(&path).unwrap_err();
        assert!(matches!(err, CoreError::LevelLoad { path: p, .. } if p == path));
    }

    #[test]
    fn level_without_player_is_rejected() {
        let json = r#"{ "width": 100, "height": 100, "objects": [
            { "name": "platform", "x": 0, "y": 90, "width": 100, "height": 10 }
        ] }"#;
        let err = JsonLevelLoader::parse(json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLevel(_)));
    }
}
