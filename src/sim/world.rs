/// WorldState: the complete snapshot of a running game.
///
/// ## Ownership
///
/// The engine (`sim::step`, `sim::control`, `sim::level`) is the only writer.
/// The renderer reads a `Frame` captured from it; persistence reads and
/// writes through `sim::save` between ticks.
///
/// ## Derived layers
///
///   - `level_def` : the catalog record for `level`, kept so boundary policy
///     is read from data instead of level numbers.
///   - `walls`     : wall cells in force for `level_def` under the current
///     theme. Empty whenever the head wraps.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameConfig, RulesConfig, SpeedConfig};
use crate::domain::collision::Occupancy;
use crate::domain::entity::{
    ActiveEffect, Obstacle, Particle, PowerUp, PowerUpKind, Snake, SpecialFood,
};
use crate::domain::grid::{Direction, Pos};
use crate::domain::level::{get_level, LevelDef};
use crate::domain::rules;
use crate::domain::theme::{Theme, THEMES};

pub const INITIAL_SNAKE_LEN: usize = 3;
/// First number shown by a countdown; it then runs down to the "Start" stage.
pub const COUNTDOWN_FROM: u8 = 3;
/// Render frames a HUD message stays up.
pub const MESSAGE_FRAMES: u32 = 120;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CountdownKind {
    LevelStart,
    Resume,
}

/// A running countdown. `remaining` goes 3, 2, 1, then 0 ("Start").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Countdown {
    pub kind: CountdownKind,
    pub remaining: u8,
}

impl Countdown {
    pub fn new(kind: CountdownKind) -> Self {
        Countdown { kind, remaining: COUNTDOWN_FROM }
    }

    pub fn label(&self) -> String {
        if self.remaining == 0 { "Start".into() } else { self.remaining.to_string() }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    Paused,
    Countdown(Countdown),
    GameOver,
    /// Quota cleared on the last level.
    Victory,
}

#[derive(Clone, Debug)]
pub struct WorldState {
    // ── Tunables ──
    pub speed: SpeedConfig,
    pub rules: RulesConfig,
    pub rng: StdRng,

    // ── Progress ──
    pub phase: Phase,
    pub level: u32,
    pub level_def: LevelDef,
    pub theme_idx: usize,
    /// A run has been started (menu offers Resume/Save only then).
    pub session_live: bool,

    // ── Board ──
    pub snake: Snake,
    pub direction: Direction,
    pub pending_direction: Direction,
    pub food: Option<Pos>,
    pub special_food: Option<SpecialFood>,
    pub obstacles: Vec<Obstacle>,
    pub walls: HashSet<Pos>,
    pub power_ups: Vec<PowerUp>,
    pub active_effect: Option<ActiveEffect>,

    // ── Scoring / pacing ──
    pub tick_interval_ms: u64,
    pub score: u32,
    pub score_at_level_start: u32,
    pub foods_eaten: u32,
    pub foods_to_next_level: u32,

    // ── Cosmetic ──
    pub particles: Vec<Particle>,
    pub tick: u64,
    pub message: Option<String>,
    pub message_timer: u32,
}

impl WorldState {
    /// Idle world on the configured start level, paused, no run yet.
    pub fn new(cfg: &GameConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let level_def = get_level(cfg.start_level);
        let spawn = level_def.spawn;
        let mut w = WorldState {
            speed: cfg.speed.clone(),
            rules: cfg.rules.clone(),
            rng,
            phase: Phase::Paused,
            level: level_def.number,
            level_def,
            theme_idx: cfg.start_theme.min(THEMES.len() - 1),
            session_live: false,
            snake: Snake::spawn(spawn.head, spawn.heading, INITIAL_SNAKE_LEN),
            direction: spawn.heading,
            pending_direction: spawn.heading,
            food: None,
            special_food: None,
            obstacles: vec![],
            walls: HashSet::new(),
            power_ups: vec![],
            active_effect: None,
            tick_interval_ms: rules::base_interval_ms(1, &cfg.speed),
            score: 0,
            score_at_level_start: 0,
            foods_eaten: 0,
            foods_to_next_level: rules::food_quota(1, &cfg.rules),
            particles: vec![],
            tick: 0,
            message: None,
            message_timer: 0,
        };
        crate::sim::level::load_level(&mut w, cfg.start_level);
        w
    }

    pub fn theme(&self) -> &'static Theme {
        &THEMES[self.theme_idx]
    }

    /// Does the head wrap at the grid edge right now?
    pub fn wraps(&self) -> bool {
        self.level_def.wraps(self.theme())
    }

    pub fn active_kind(&self) -> Option<PowerUpKind> {
        self.active_effect.map(|e| e.kind)
    }

    pub fn countdown(&self) -> Option<Countdown> {
        match self.phase {
            Phase::Countdown(c) => Some(c),
            _ => None,
        }
    }

    /// Run started and not yet over.
    pub fn is_live(&self) -> bool {
        self.session_live && !matches!(self.phase, Phase::GameOver | Phase::Victory)
    }

    pub fn occupancy(&self) -> Occupancy<'_> {
        Occupancy {
            snake: &self.snake,
            food: self.food,
            special_food: self.special_food.map(|s| s.pos),
            obstacles: &self.obstacles,
            power_ups: &self.power_ups,
            walls: &self.walls,
            enforce_walls: !self.wraps(),
        }
    }

    /// Free cell for a new spawn, or None when the board is saturated.
    pub fn random_empty_cell(&mut self) -> Option<Pos> {
        let enforce_walls = !self.wraps();
        let occ = Occupancy {
            snake: &self.snake,
            food: self.food,
            special_food: self.special_food.map(|s| s.pos),
            obstacles: &self.obstacles,
            power_ups: &self.power_ups,
            walls: &self.walls,
            enforce_walls,
        };
        occ.find_empty_cell(&mut self.rng)
    }

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(text.into());
        self.message_timer = MESSAGE_FRAMES;
    }

    /// Age the HUD message by one render frame.
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_world(seed: u64) -> WorldState {
    WorldState::new(&GameConfig { seed: Some(seed), ..GameConfig::default() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_is_idle_on_level_one() {
        let w = test_world(1);
        assert_eq!(w.phase, Phase::Paused);
        assert!(!w.session_live);
        assert!(!w.is_live());
        assert_eq!(w.level, 1);
        assert_eq!(w.snake.len(), INITIAL_SNAKE_LEN);
        assert_eq!(w.snake.head(), Pos::new(7, 12));
        assert_eq!(w.tick_interval_ms, 180);
        assert_eq!(w.foods_to_next_level, 10);
        assert!(w.food.is_some());
    }

    #[test]
    fn walled_theme_on_level_one_enforces_border() {
        let w = test_world(1);
        assert_eq!(w.theme().name, "Classic Wall");
        assert!(!w.wraps());
        assert!(w.walls.contains(&Pos::new(0, 0)));
        assert!(!w.occupancy().is_free(Pos::new(0, 5)));
    }

    #[test]
    fn countdown_labels() {
        let mut c = Countdown::new(CountdownKind::Resume);
        assert_eq!(c.label(), "3");
        c.remaining = 0;
        assert_eq!(c.label(), "Start");
    }

    #[test]
    fn message_fades_after_frames() {
        let mut w = test_world(1);
        w.set_message("Saved");
        for _ in 0..MESSAGE_FRAMES - 1 {
            w.tick_message();
        }
        assert!(w.message.is_some());
        w.tick_message();
        assert!(w.message.is_none());
    }
}
