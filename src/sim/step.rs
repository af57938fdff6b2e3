/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Obstacle movement hook
///   2. Commit the queued heading
///   3. New head + boundary policy (wrap, or wall = death)
///   4. Body / obstacle collision (skipped while Invincible)
///   5. Grow: push the new head
///   6. Cell content: food > special food > plain move (tail drop, Shrink)
///   7. Quota check (level up / victory ends the tick)
///   8. Power-up pickup
///   9. Effect timer, special-food timer, particles
///
/// Collision queries go through `WorldState::occupancy`.

use log::{debug, info, warn};

use crate::domain::collision::Hit;
use crate::domain::entity::{ActiveEffect, Particle, ParticleSource, PowerUpKind, SpecialFood};
use crate::domain::grid::Pos;
use crate::domain::rules;
use crate::sim::event::{DeathCause, GameEvent};
use crate::sim::level;
use crate::sim::scores::ScoreRecorder;
use crate::sim::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn advance_tick<S: ScoreRecorder + ?Sized>(world: &mut WorldState, scores: &mut S) -> Vec<GameEvent> {
    if world.phase != Phase::Running { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    for o in &mut world.obstacles {
        o.advance();
    }
    world.direction = world.pending_direction;

    let head = match resolve_boundary(world) {
        Some(p) => p,
        None => {
            game_over(world, scores, DeathCause::Wall, &mut events);
            return events;
        }
    };

    if world.active_kind() != Some(PowerUpKind::Invincibility) {
        let hit = world.occupancy().head_hit(head);
        if hit != Hit::Clear {
            game_over(world, scores, hit.into(), &mut events);
            return events;
        }
    }

    world.snake.push_head(head);

    if world.food == Some(head) {
        if eat_food(world, head, &mut events) {
            if world.phase == Phase::Victory {
                scores.record_score(world.score);
            }
            return events;
        }
    } else if world.special_food.map(|s| s.pos) == Some(head) {
        eat_special_food(world, head, &mut events);
    } else {
        move_tail(world);
    }

    resolve_power_up(world, head, &mut events);
    resolve_timers(world, &mut events);
    world.particles.retain_mut(|p| p.update());

    events
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

/// New head cell, or None if it runs into a wall.
fn resolve_boundary(world: &WorldState) -> Option<Pos> {
    let stepped = world.snake.head().step(world.direction);
    if world.wraps() {
        return Some(stepped.wrapped());
    }
    // Off-grid without a wall cell only happens on a wall-less layout.
    if world.walls.contains(&stepped) || !stepped.in_bounds() {
        return None;
    }
    Some(stepped)
}

/// No growth this tick: drop the tail, twice under Shrink above the floor.
fn move_tail(world: &mut WorldState) {
    world.snake.pop_tail();
    if world.active_kind() == Some(PowerUpKind::Shrink) && world.snake.len() > world.rules.min_snake_len {
        world.snake.pop_tail();
    }
}

// ══════════════════════════════════════════════════════════════
// Food
// ══════════════════════════════════════════════════════════════

/// Returns true when the quota was met and the tick must stop here.
fn eat_food(world: &mut WorldState, at: Pos, events: &mut Vec<GameEvent>) -> bool {
    let points = rules::food_points(world.level, world.active_kind(), &world.rules);
    world.score += points;
    world.foods_eaten += 1;
    let burst = Particle::burst(&mut world.rng, at, ParticleSource::Food);
    world.particles.extend(burst);
    events.push(GameEvent::FoodEaten { at, points });

    world.food = None;
    world.food = world.random_empty_cell();
    if world.food.is_none() {
        warn!("no free cell for food, skipping respawn");
        events.push(GameEvent::SpawnSkipped { what: "food" });
    }

    if world.special_food.is_none() && rules::earns_special_food(world.score, &world.rules) {
        match world.random_empty_cell() {
            Some(pos) => {
                world.special_food = Some(SpecialFood { pos, ticks_left: world.rules.special_food_ticks });
                debug!("special food at {:?}", pos);
                events.push(GameEvent::SpecialFoodSpawned { at: pos });
            }
            None => {
                warn!("no free cell for special food");
                events.push(GameEvent::SpawnSkipped { what: "special food" });
            }
        }
    }

    if world.foods_eaten >= world.foods_to_next_level {
        info!("level {} cleared with score {}", world.level, world.score);
        events.extend(level::next_level(world));
        return true;
    }
    false
}

fn eat_special_food(world: &mut WorldState, at: Pos, events: &mut Vec<GameEvent>) {
    let points = world.rules.special_food_bonus;
    world.score += points;
    world.special_food = None;
    let burst = Particle::burst(&mut world.rng, at, ParticleSource::SpecialFood);
    world.particles.extend(burst);
    events.push(GameEvent::SpecialFoodEaten { at, points });
}

// ══════════════════════════════════════════════════════════════
// Power-ups and timers
// ══════════════════════════════════════════════════════════════

fn resolve_power_up(world: &mut WorldState, head: Pos, events: &mut Vec<GameEvent>) {
    let Some(up) = world.power_ups.iter_mut().find(|u| !u.consumed && u.pos == head) else {
        return;
    };
    up.consumed = true;
    let (kind, duration) = (up.kind, up.duration);

    world.active_effect = Some(ActiveEffect { kind, remaining: duration });
    world.tick_interval_ms = rules::interval_with_effect(world.level, Some(kind), &world.speed);
    let burst = Particle::burst(&mut world.rng, head, ParticleSource::PowerUp);
    world.particles.extend(burst);
    debug!("power-up {:?} collected, {} ticks", kind, duration);
    events.push(GameEvent::PowerUpCollected { kind });
}

fn resolve_timers(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if let Some(effect) = world.active_effect.as_mut() {
        if effect.tick() {
            let kind = effect.kind;
            world.active_effect = None;
            world.tick_interval_ms = rules::base_interval_ms(world.level, &world.speed);
            debug!("effect {:?} expired", kind);
            events.push(GameEvent::EffectExpired { kind });
        }
    }

    if let Some(special) = world.special_food.as_mut() {
        special.ticks_left = special.ticks_left.saturating_sub(1);
        if special.ticks_left == 0 {
            world.special_food = None;
            debug!("special food expired");
            events.push(GameEvent::SpecialFoodExpired);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Game over
// ══════════════════════════════════════════════════════════════

fn game_over<S: ScoreRecorder + ?Sized>(
    world: &mut WorldState,
    scores: &mut S,
    cause: DeathCause,
    events: &mut Vec<GameEvent>,
) {
    world.phase = Phase::GameOver;
    info!("game over on level {} ({:?}), score {}", world.level, cause, world.score);
    scores.record_score(world.score);
    events.push(GameEvent::GameOver { score: world.score, cause });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Obstacle, PowerUp, Snake};
    use crate::domain::grid::{Direction, Rect};
    use crate::domain::level::MAX_LEVEL;
    use crate::domain::theme::find_theme;
    use crate::sim::control::request_turn;
    use crate::sim::world::test_world;

    impl ScoreRecorder for Vec<u32> {
        fn record_score(&mut self, score: u32) {
            self.push(score);
        }
    }

    fn cells(list: &[(i32, i32)]) -> Snake {
        let v: Vec<Pos> = list.iter().map(|&(x, y)| Pos::new(x, y)).collect();
        Snake::from_cells(&v).unwrap()
    }

    /// Running session on `level` under `theme`, with no power-ups and the
    /// food parked far from the action.
    fn setup(level_no: u32, theme: &str) -> WorldState {
        let mut w = test_world(42);
        level::new_game(&mut w, level_no, find_theme(theme).unwrap());
        w.phase = Phase::Running;
        w.power_ups.clear();
        w.food = Some(Pos::new(30, 2));
        w
    }

    fn tick(w: &mut WorldState) -> Vec<GameEvent> {
        advance_tick(w, &mut Vec::<u32>::new())
    }

    fn set_heading(w: &mut WorldState, d: Direction) {
        w.direction = d;
        w.pending_direction = d;
    }

    #[test]
    fn plain_move_keeps_length() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(5, 12), (6, 12), (7, 12)]);
        set_heading(&mut w, Direction::Left);
        let mut scores: Vec<u32> = vec![];
        let events = advance_tick(&mut w, &mut scores);
        assert!(events.is_empty());
        assert_eq!(w.snake.to_vec(), vec![Pos::new(4, 12), Pos::new(5, 12), Pos::new(6, 12)]);
        assert_eq!(w.phase, Phase::Running);
    }

    #[test]
    fn loop_theme_wraps_right_edge() {
        let mut w = setup(1, "Neon Loop");
        w.snake = cells(&[(35, 12), (34, 12), (33, 12)]);
        set_heading(&mut w, Direction::Right);
        tick(&mut w);
        assert_eq!(w.snake.head(), Pos::new(0, 12));
        assert_eq!(w.phase, Phase::Running);
    }

    #[test]
    fn forced_wrap_level_ignores_walled_theme() {
        let mut w = setup(3, "Classic Wall");
        w.snake = cells(&[(5, 0), (5, 1), (5, 2)]);
        set_heading(&mut w, Direction::Up);
        tick(&mut w);
        assert_eq!(w.snake.head(), Pos::new(5, 23));
        assert_eq!(w.phase, Phase::Running);
    }

    #[test]
    fn wall_is_fatal_and_records_score() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(1, 5), (2, 5), (3, 5)]);
        set_heading(&mut w, Direction::Left);
        w.score = 70;
        let mut scores: Vec<u32> = vec![];
        let events = advance_tick(&mut w, &mut scores);
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(scores, vec![70]);
        assert_eq!(events, vec![GameEvent::GameOver { score: 70, cause: DeathCause::Wall }]);
        // frozen
        assert_eq!(w.snake.head(), Pos::new(1, 5));
        assert!(advance_tick(&mut w, &mut scores).is_empty());
    }

    #[test]
    fn walls_stay_fatal_while_invincible() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(1, 5), (2, 5), (3, 5)]);
        set_heading(&mut w, Direction::Left);
        w.active_effect = Some(ActiveEffect { kind: PowerUpKind::Invincibility, remaining: 50 });
        tick(&mut w);
        assert_eq!(w.phase, Phase::GameOver);
    }

    #[test]
    fn self_bite_is_fatal() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(10, 10), (11, 10), (11, 11), (10, 11), (9, 11)]);
        set_heading(&mut w, Direction::Down);
        let events = tick(&mut w);
        assert_eq!(events, vec![GameEvent::GameOver { score: 0, cause: DeathCause::Body }]);
    }

    #[test]
    fn obstacle_is_fatal() {
        let mut w = setup(2, "Classic Wall");
        // Level 2 bar at y=5, x=10..20
        w.snake = cells(&[(12, 6), (12, 7), (12, 8)]);
        set_heading(&mut w, Direction::Up);
        let events = tick(&mut w);
        assert_eq!(events, vec![GameEvent::GameOver { score: 0, cause: DeathCause::Obstacle }]);
    }

    #[test]
    fn invincible_head_passes_through_body() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(10, 10), (11, 10), (11, 11), (10, 11), (9, 11)]);
        set_heading(&mut w, Direction::Down);
        w.active_effect = Some(ActiveEffect { kind: PowerUpKind::Invincibility, remaining: 50 });
        tick(&mut w);
        assert_eq!(w.phase, Phase::Running);
        assert_eq!(w.snake.head(), Pos::new(10, 11));
        assert_eq!(w.snake.len(), 5);
    }

    #[test]
    fn food_grows_and_scores_by_level() {
        let mut w = setup(4, "Classic Wall");
        w.snake = cells(&[(8, 20), (7, 20), (6, 20)]);
        set_heading(&mut w, Direction::Right);
        w.food = Some(Pos::new(9, 20));
        let events = tick(&mut w);
        assert_eq!(w.snake.len(), 4);
        assert_eq!(w.score, 40);
        assert_eq!(w.foods_eaten, 1);
        assert_eq!(events[0], GameEvent::FoodEaten { at: Pos::new(9, 20), points: 40 });
        let food = w.food.unwrap();
        assert!(!w.snake.contains(food));
        assert!(!w.walls.contains(&food));
        assert_eq!(w.particles.len(), crate::domain::entity::PARTICLE_BURST);
    }

    #[test]
    fn score_multiplier_doubles_food() {
        let mut w = setup(2, "Classic Wall");
        w.snake = cells(&[(8, 20), (7, 20), (6, 20)]);
        set_heading(&mut w, Direction::Right);
        w.food = Some(Pos::new(9, 20));
        w.active_effect = Some(ActiveEffect { kind: PowerUpKind::ScoreMultiplier, remaining: 50 });
        tick(&mut w);
        assert_eq!(w.score, 40);
    }

    #[test]
    fn fifty_points_spawns_special_food() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(8, 12), (7, 12), (6, 12)]);
        set_heading(&mut w, Direction::Right);
        w.score = 40;
        w.food = Some(Pos::new(9, 12));
        let events = tick(&mut w);
        assert_eq!(w.score, 50);
        let special = w.special_food.expect("special food");
        // spawned, then aged by this same tick
        assert_eq!(special.ticks_left, 49);
        assert!(events.contains(&GameEvent::SpecialFoodSpawned { at: special.pos }));
        assert!(!w.snake.contains(special.pos));
        assert_ne!(w.food, Some(special.pos));
    }

    #[test]
    fn special_food_not_stacked() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(8, 12), (7, 12), (6, 12)]);
        set_heading(&mut w, Direction::Right);
        w.score = 40;
        w.food = Some(Pos::new(9, 12));
        let existing = SpecialFood { pos: Pos::new(20, 20), ticks_left: 7 };
        w.special_food = Some(existing);
        tick(&mut w);
        assert_eq!(w.special_food.map(|s| s.pos), Some(existing.pos));
        assert_eq!(w.special_food.map(|s| s.ticks_left), Some(6));
    }

    #[test]
    fn special_food_pays_bonus_without_respawn() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(8, 12), (7, 12), (6, 12)]);
        set_heading(&mut w, Direction::Right);
        w.special_food = Some(SpecialFood { pos: Pos::new(9, 12), ticks_left: 20 });
        let events = tick(&mut w);
        assert_eq!(w.score, 50);
        assert!(w.special_food.is_none());
        assert_eq!(w.snake.len(), 4);
        assert_eq!(events, vec![GameEvent::SpecialFoodEaten { at: Pos::new(9, 12), points: 50 }]);
    }

    #[test]
    fn special_food_expires() {
        let mut w = setup(1, "Classic Wall");
        w.special_food = Some(SpecialFood { pos: Pos::new(20, 20), ticks_left: 2 });
        assert!(tick(&mut w).is_empty());
        assert_eq!(tick(&mut w), vec![GameEvent::SpecialFoodExpired]);
        assert!(w.special_food.is_none());
    }

    #[test]
    fn shrink_drops_two_above_minimum() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(10, 12), (9, 12), (8, 12), (7, 12), (6, 12)]);
        set_heading(&mut w, Direction::Right);
        w.active_effect = Some(ActiveEffect { kind: PowerUpKind::Shrink, remaining: 50 });
        tick(&mut w);
        assert_eq!(w.snake.len(), 4);
        tick(&mut w);
        assert_eq!(w.snake.len(), 3);
        tick(&mut w);
        assert_eq!(w.snake.len(), 3);
    }

    #[test]
    fn power_up_pickup_sets_effect_and_interval() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(8, 12), (7, 12), (6, 12)]);
        set_heading(&mut w, Direction::Right);
        w.power_ups.push(PowerUp::new(Pos::new(9, 12), PowerUpKind::Slow, 3));
        let events = tick(&mut w);
        assert!(events.contains(&GameEvent::PowerUpCollected { kind: PowerUpKind::Slow }));
        assert!(w.power_ups[0].consumed);
        assert_eq!(w.active_kind(), Some(PowerUpKind::Slow));
        assert_eq!(w.tick_interval_ms, 220);
        // picked up and first tick burnt in the same step
        assert_eq!(w.active_effect.map(|e| e.remaining), Some(2));
        // HUD text comes from the event consumer
        assert_eq!(w.message, None);
    }

    #[test]
    fn effect_expiry_restores_level_interval() {
        let mut w = setup(1, "Classic Wall");
        w.active_effect = Some(ActiveEffect { kind: PowerUpKind::Speed, remaining: 2 });
        w.tick_interval_ms = 150;
        tick(&mut w);
        assert_eq!(w.tick_interval_ms, 150);
        let events = tick(&mut w);
        assert_eq!(events, vec![GameEvent::EffectExpired { kind: PowerUpKind::Speed }]);
        assert!(w.active_effect.is_none());
        assert_eq!(w.tick_interval_ms, 180);
    }

    #[test]
    fn replacing_an_effect() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(8, 12), (7, 12), (6, 12)]);
        set_heading(&mut w, Direction::Right);
        w.active_effect = Some(ActiveEffect { kind: PowerUpKind::Slow, remaining: 80 });
        w.power_ups.push(PowerUp::new(Pos::new(9, 12), PowerUpKind::Speed, 100));
        tick(&mut w);
        assert_eq!(w.active_effect, Some(ActiveEffect { kind: PowerUpKind::Speed, remaining: 99 }));
        assert_eq!(w.tick_interval_ms, 150);
    }

    #[test]
    fn quota_triggers_next_level() {
        let mut w = setup(1, "Classic Wall");
        w.snake = cells(&[(8, 12), (7, 12), (6, 12)]);
        set_heading(&mut w, Direction::Right);
        w.foods_eaten = w.foods_to_next_level - 1;
        w.score = 90;
        w.food = Some(Pos::new(9, 12));
        let events = tick(&mut w);
        assert!(matches!(events.last(), Some(GameEvent::LevelUp { level: 2, .. })));
        assert_eq!(w.level, 2);
        assert_eq!(w.foods_eaten, 0);
        assert_eq!(w.score, 100);
        assert_eq!(w.score_at_level_start, 100);
        assert_ne!(w.theme().name, "Classic Wall");
        assert!(matches!(w.phase, Phase::Countdown(_)));
    }

    #[test]
    fn clearing_last_level_records_victory() {
        let mut w = setup(MAX_LEVEL, "Classic Wall");
        w.snake = cells(&[(8, 12), (7, 12), (6, 12)]);
        set_heading(&mut w, Direction::Right);
        w.foods_eaten = w.foods_to_next_level - 1;
        w.food = Some(Pos::new(9, 12));
        let mut scores: Vec<u32> = vec![];
        let events = advance_tick(&mut w, &mut scores);
        assert_eq!(w.phase, Phase::Victory);
        assert_eq!(scores, vec![w.score]);
        assert!(events.contains(&GameEvent::AllLevelsCleared { score: w.score }));
    }

    #[test]
    fn moving_obstacle_advances_each_tick() {
        let mut w = setup(1, "Neon Loop");
        w.obstacles.push(Obstacle { area: Rect::new(20, 3, 1, 1), moving: true, heading: Direction::Down });
        tick(&mut w);
        assert_eq!(w.obstacles[0].area, Rect::new(20, 4, 1, 1));
    }

    #[test]
    fn head_always_one_step_along_committed_heading() {
        let mut w = setup(1, "Forest Loop");
        let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right, Direction::Down];
        for (i, &t) in turns.iter().cycle().take(60).enumerate() {
            if i % 3 == 0 {
                request_turn(&mut w, t);
            }
            let before = w.snake.head();
            let len = w.snake.len();
            tick(&mut w);
            if w.phase != Phase::Running {
                break;
            }
            assert_eq!(w.snake.head(), before.step(w.direction).wrapped());
            assert!(w.snake.len() == len || w.snake.len() == len + 1);
        }
    }
}
