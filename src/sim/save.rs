/// Save and load a single in-progress game.
///
/// ## File format
///   TOML (`savegame.toml` in the data directory). Scalars first, then the
///   food cell, the snake (head first), the obstacle rectangles and the
///   active effect. Power-ups on the board and special food are not kept.
///
/// ## Restore
///   The level is reloaded from the catalog so walls and boundary policy
///   match the saved theme, then the saved runtime state overwrites it. The
///   session comes back Paused; the menu's Resume starts a countdown.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entity::{ActiveEffect, Obstacle, Snake};
use crate::domain::grid::{Direction, Pos, Rect};
use crate::domain::level::MAX_LEVEL;
use crate::domain::rules;
use crate::domain::theme::find_theme;
use crate::sim::level::load_level;
use crate::sim::world::{Phase, WorldState};

const SAVE_FILE: &str = "savegame.toml";

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encode: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("decode: {0}")]
    Decode(#[from] toml::de::Error),
    #[error("invalid save: {0}")]
    Invalid(String),
}

/// Everything needed to resume a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub level: u32,
    pub theme_name: String,
    pub score: u32,
    pub direction: Direction,
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub score_at_level_start: u32,
    #[serde(default)]
    pub foods_eaten: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<Pos>,
    pub snake: Vec<Pos>,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    /// Effect in force, so a Slow/Speed interval can expire after a load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_effect: Option<ActiveEffect>,
}

// ══════════════════════════════════════════════════════════════
// Capture / restore (WorldState ↔ SavedGame)
// ══════════════════════════════════════════════════════════════

pub fn capture(w: &WorldState) -> SavedGame {
    SavedGame {
        level: w.level,
        theme_name: w.theme().name.to_string(),
        score: w.score,
        direction: w.direction,
        tick_interval_ms: w.tick_interval_ms,
        score_at_level_start: w.score_at_level_start,
        foods_eaten: w.foods_eaten,
        food: w.food,
        snake: w.snake.to_vec(),
        obstacles: w.obstacles.iter().map(|o| o.area).collect(),
        active_effect: w.active_effect,
    }
}

/// Put a saved game into `w`. Validation happens before anything changes,
/// so a bad save leaves the session untouched.
pub fn restore(w: &mut WorldState, saved: &SavedGame) -> Result<(), PersistError> {
    if !(1..=MAX_LEVEL).contains(&saved.level) {
        return Err(PersistError::Invalid(format!("level {} out of range", saved.level)));
    }
    let theme_idx = find_theme(&saved.theme_name)
        .ok_or_else(|| PersistError::Invalid(format!("unknown theme {:?}", saved.theme_name)))?;
    let snake = Snake::from_cells(&saved.snake)
        .ok_or_else(|| PersistError::Invalid("empty snake".into()))?;
    if let Some(p) = saved.snake.iter().find(|p| !p.in_bounds()) {
        return Err(PersistError::Invalid(format!("snake cell {p:?} off grid")));
    }
    if saved.tick_interval_ms == 0 {
        return Err(PersistError::Invalid("zero tick interval".into()));
    }

    w.theme_idx = theme_idx;
    w.score = saved.score_at_level_start;
    load_level(w, saved.level);

    w.score = saved.score;
    w.foods_eaten = saved.foods_eaten;
    w.snake = snake;
    w.direction = saved.direction;
    w.pending_direction = saved.direction;
    w.obstacles = saved.obstacles.iter().copied().map(Obstacle::fixed).collect();
    w.power_ups.clear();
    w.active_effect = saved.active_effect.filter(|e| e.remaining > 0);
    w.tick_interval_ms = if w.active_effect.is_some() {
        saved.tick_interval_ms
    } else {
        rules::base_interval_ms(saved.level, &w.speed)
    };
    w.food = None;
    w.food = saved.food.filter(|&p| p.in_bounds() && w.occupancy().is_free(p));
    if w.food.is_none() {
        w.food = w.random_empty_cell();
    }
    w.session_live = true;
    w.phase = Phase::Paused;
    Ok(())
}

pub fn encode(saved: &SavedGame) -> Result<String, PersistError> {
    Ok(toml::to_string(saved)?)
}

pub fn decode(text: &str) -> Result<SavedGame, PersistError> {
    Ok(toml::from_str(text)?)
}

// ══════════════════════════════════════════════════════════════
// Store
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(dir: &Path) -> Self {
        SaveStore { path: dir.join(SAVE_FILE) }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn save(&self, w: &WorldState) -> Result<(), PersistError> {
        let text = encode(&capture(w))?;
        std::fs::write(&self.path, text)
            .map_err(|source| PersistError::Io { path: self.path.clone(), source })?;
        info!("saved level {} score {} to {}", w.level, w.score, self.path.display());
        Ok(())
    }

    /// None when there is no save or it cannot be read.
    pub fn load(&self) -> Option<SavedGame> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("could not read {}: {e}", self.path.display());
                }
                return None;
            }
        };
        match decode(&text) {
            Ok(saved) => Some(saved),
            Err(e) => {
                warn!("ignoring corrupt save {}: {e}", self.path.display());
                None
            }
        }
    }

    /// Load straight into `w`. Returns false if nothing usable was found.
    pub fn load_into(&self, w: &mut WorldState) -> bool {
        let Some(saved) = self.load() else { return false };
        match restore(w, &saved) {
            Ok(()) => {
                info!("loaded level {} score {}", w.level, w.score);
                true
            }
            Err(e) => {
                warn!("ignoring save {}: {e}", self.path.display());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PowerUpKind;
    use crate::sim::level::new_game;
    use crate::sim::step::advance_tick;
    use crate::sim::world::test_world;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("snakearcade_save_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn mid_game() -> WorldState {
        let mut w = test_world(21);
        new_game(&mut w, 4, 2);
        w.phase = Phase::Running;
        w.score = 260;
        w.score_at_level_start = 200;
        w.foods_eaten = 3;
        w.direction = Direction::Up;
        w.pending_direction = Direction::Up;
        w.snake = Snake::from_cells(&[Pos::new(9, 18), Pos::new(9, 19), Pos::new(8, 19), Pos::new(7, 19)]).unwrap();
        w.food = Some(Pos::new(22, 3));
        w.active_effect = Some(ActiveEffect { kind: PowerUpKind::Slow, remaining: 10 });
        w.tick_interval_ms = 195;
        w
    }

    #[test]
    fn round_trip_resumes_the_same_session() {
        let dir = temp_dir("roundtrip");
        let store = SaveStore::new(&dir);
        assert!(!store.exists());

        let before = mid_game();
        store.save(&before).unwrap();
        assert!(store.exists());

        let mut after = test_world(99);
        assert!(store.load_into(&mut after));
        assert_eq!(after.level, 4);
        assert_eq!(after.theme().name, before.theme().name);
        assert_eq!(after.score, 260);
        assert_eq!(after.score_at_level_start, 200);
        assert_eq!(after.foods_eaten, 3);
        assert_eq!(after.snake, before.snake);
        assert_eq!(after.food, Some(Pos::new(22, 3)));
        assert_eq!(after.direction, Direction::Up);
        assert_eq!(after.pending_direction, Direction::Up);
        assert_eq!(after.obstacles, before.obstacles);
        assert_eq!(after.tick_interval_ms, 195);
        assert_eq!(after.active_effect, before.active_effect);
        assert_eq!(after.walls, before.walls);
        assert_eq!(after.phase, Phase::Paused);
        assert!(after.session_live);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_file_is_no_save() {
        let dir = temp_dir("corrupt");
        std::fs::write(dir.join(SAVE_FILE), "level = \"ten\"\n[[snake").unwrap();
        let store = SaveStore::new(&dir);
        assert!(store.load().is_none());
        let mut w = test_world(1);
        let level = w.level;
        assert!(!store.load_into(&mut w));
        assert_eq!(w.level, level);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_contents_are_rejected_untouched() {
        let mut saved = capture(&mid_game());
        let mut w = test_world(1);

        saved.theme_name = "Lava".into();
        assert!(matches!(restore(&mut w, &saved), Err(PersistError::Invalid(_))));

        saved.theme_name = "Neon Loop".into();
        saved.snake.clear();
        assert!(matches!(restore(&mut w, &saved), Err(PersistError::Invalid(_))));

        saved.snake = vec![Pos::new(40, 2)];
        assert!(matches!(restore(&mut w, &saved), Err(PersistError::Invalid(_))));

        saved.snake = vec![Pos::new(4, 2)];
        saved.level = 0;
        assert!(matches!(restore(&mut w, &saved), Err(PersistError::Invalid(_))));

        assert!(!w.session_live);
        assert_eq!(w.score, 0);
    }

    #[test]
    fn missing_food_is_respawned() {
        let mut saved = capture(&mid_game());
        saved.food = None;
        let text = encode(&saved).unwrap();
        assert!(!text.contains("[food]"));
        let decoded = decode(&text).unwrap();
        let mut w = test_world(5);
        restore(&mut w, &decoded).unwrap();
        let food = w.food.unwrap();
        assert!(!w.snake.contains(food));
    }

    #[test]
    fn speed_effect_expires_after_load() {
        let mut w = test_world(14);
        new_game(&mut w, 1, 0);
        w.active_effect = Some(ActiveEffect { kind: PowerUpKind::Speed, remaining: 2 });
        w.tick_interval_ms = rules::interval_with_effect(1, Some(PowerUpKind::Speed), &w.speed);
        let base = rules::base_interval_ms(1, &w.speed);
        assert!(w.tick_interval_ms < base);

        let decoded = decode(&encode(&capture(&w)).unwrap()).unwrap();
        let mut after = test_world(15);
        restore(&mut after, &decoded).unwrap();
        assert_eq!(after.active_effect, Some(ActiveEffect { kind: PowerUpKind::Speed, remaining: 2 }));

        after.phase = Phase::Running;
        let mut scores: Vec<u32> = Vec::new();
        for _ in 0..3 {
            advance_tick(&mut after, &mut scores);
        }
        assert_eq!(after.phase, Phase::Running);
        assert_eq!(after.active_effect, None);
        assert_eq!(after.tick_interval_ms, base);
    }

    #[test]
    fn leftover_interval_without_effect_is_reset() {
        let mut saved = capture(&mid_game());
        saved.active_effect = None;
        saved.tick_interval_ms = 7;
        let mut w = test_world(2);
        restore(&mut w, &saved).unwrap();
        assert_eq!(w.tick_interval_ms, rules::base_interval_ms(4, &w.speed));
    }

    #[test]
    fn food_on_the_snake_is_moved() {
        let mut saved = capture(&mid_game());
        saved.food = Some(saved.snake[2]);
        let mut w = test_world(6);
        restore(&mut w, &saved).unwrap();
        let food = w.food.unwrap();
        assert!(!w.snake.contains(food));
        assert!(!w.obstacles.iter().any(|o| o.contains(food)));
    }
}
