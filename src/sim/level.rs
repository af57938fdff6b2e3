/// Level loading and progression.
///
/// `load_level` rebuilds every per-level layer of the session from the
/// catalog record; score and theme carry over. The other entry points are
/// the three ways a level gets entered: a new run, the next level, and a
/// restart after game over.

use log::{debug, info, warn};
use rand::Rng;

use crate::domain::entity::{Obstacle, PowerUp, PowerUpKind, Snake};
use crate::domain::grid::{Direction, Pos, GRID_H, GRID_W};
use crate::domain::level::{get_level, LevelDef, MAX_LEVEL};
use crate::domain::rules;
use crate::domain::theme::THEMES;
use crate::sim::control;
use crate::sim::event::GameEvent;
use crate::sim::world::{Phase, WorldState, INITIAL_SNAKE_LEN};

/// Reset the board for `number` (unknown numbers load level 1).
/// Leaves `phase` alone; callers decide whether a countdown follows.
pub fn load_level(w: &mut WorldState, number: u32) {
    let def = get_level(number);
    let theme = w.theme();

    w.level = def.number;
    w.walls = def.wall_cells(theme);
    w.obstacles = def.obstacles.iter().copied().map(Obstacle::fixed).collect();

    let (snake, heading) = safe_spawn(&def, w);
    w.snake = snake;
    w.direction = heading;
    w.pending_direction = heading;

    w.food = None;
    w.special_food = None;
    w.power_ups.clear();
    w.active_effect = None;
    w.particles.clear();

    w.tick_interval_ms = rules::base_interval_ms(w.level, &w.speed);
    w.foods_eaten = 0;
    w.foods_to_next_level = rules::food_quota(w.level, &w.rules);
    w.score_at_level_start = w.score;
    w.level_def = def;

    w.food = w.random_empty_cell();
    if w.food.is_none() {
        warn!("level {}: no free cell for food", w.level);
    }
    spawn_power_up(w);

    info!("entered level {} ({}), theme {}", w.level, w.level_def.name, theme.name);
}

/// Start a fresh run at `level` with `theme_idx`, score 0.
pub fn new_game(w: &mut WorldState, level: u32, theme_idx: usize) {
    w.score = 0;
    w.theme_idx = theme_idx.min(THEMES.len() - 1);
    w.session_live = true;
    w.tick = 0;
    load_level(w, level.clamp(1, MAX_LEVEL));
    control::start_level_countdown(w);
}

/// Replay the current level from its starting score.
pub fn restart_after_game_over(w: &mut WorldState) {
    w.score = w.score_at_level_start;
    w.session_live = true;
    load_level(w, w.level);
    control::start_level_countdown(w);
}

/// Quota met: advance, or finish the run on the last level.
pub fn next_level(w: &mut WorldState) -> Vec<GameEvent> {
    if w.level >= MAX_LEVEL {
        w.phase = Phase::Victory;
        info!("all levels cleared, score {}", w.score);
        w.set_message("All levels cleared!");
        return vec![GameEvent::AllLevelsCleared { score: w.score }];
    }

    w.theme_idx = other_theme(w);
    load_level(w, w.level + 1);
    control::start_level_countdown(w);
    w.set_message(format!("Level {}", w.level));
    vec![GameEvent::LevelUp { level: w.level, theme: w.theme().name }]
}

/// A theme different from the current one, chosen uniformly.
fn other_theme(w: &mut WorldState) -> usize {
    let pick = w.rng.gen_range(0..THEMES.len() - 1);
    if pick >= w.theme_idx { pick + 1 } else { pick }
}

fn spawn_power_up(w: &mut WorldState) {
    if !w.rng.gen_bool(w.rules.power_up_chance) {
        return;
    }
    let kind = PowerUpKind::random(&mut w.rng);
    match w.random_empty_cell() {
        Some(pos) => {
            debug!("power-up {:?} at {:?}", kind, pos);
            w.power_ups.push(PowerUp::new(pos, kind, w.rules.power_up_ticks));
        }
        None => warn!("level {}: no free cell for power-up", w.level),
    }
}

// ── Spawn placement ──

fn spawn_is_clear(snake: &Snake, def: &LevelDef, w: &WorldState) -> bool {
    snake.iter().all(|&p| {
        p.in_bounds()
            && !w.walls.contains(&p)
            && !def.obstacles.iter().any(|r| r.contains(p))
    })
}

/// The catalog spawn, or the first clear row (horizontal heading) or
/// column (vertical heading) through it when that is blocked.
fn safe_spawn(def: &LevelDef, w: &WorldState) -> (Snake, Direction) {
    let heading = def.spawn.heading;
    let preferred = Snake::spawn(def.spawn.head, heading, INITIAL_SNAKE_LEN);
    if spawn_is_clear(&preferred, def, w) {
        return (preferred, heading);
    }

    let candidates: Vec<Pos> = if heading.is_horizontal() {
        (0..GRID_H).map(|y| Pos::new(def.spawn.head.x, y)).collect()
    } else {
        (0..GRID_W).map(|x| Pos::new(x, def.spawn.head.y)).collect()
    };
    for head in candidates {
        let snake = Snake::spawn(head, heading, INITIAL_SNAKE_LEN);
        if spawn_is_clear(&snake, def, w) {
            warn!("level {}: spawn blocked, using {:?}", def.number, head);
            return (snake, heading);
        }
    }

    warn!("level {}: no clear spawn line, keeping catalog spawn", def.number);
    (preferred, heading)
}
