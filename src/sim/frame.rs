/// Frame: read-only copy of everything the renderer draws.
///
/// Captured once per loop iteration after all updates, so a draw never
/// sees a half-applied tick.

use crate::domain::entity::{ActiveEffect, Particle, PowerUpKind, SpecialFood};
use crate::domain::grid::{Pos, Rect, GRID_H, GRID_W};
use crate::domain::theme::Theme;
use crate::sim::world::{Phase, WorldState};

#[derive(Clone, Debug)]
pub struct Frame {
    pub width: i32,
    pub height: i32,
    /// Head first.
    pub snake: Vec<Pos>,
    pub food: Option<Pos>,
    pub special_food: Option<SpecialFood>,
    pub obstacles: Vec<Rect>,
    pub walls: Vec<Pos>,
    /// Uncollected only.
    pub power_ups: Vec<(Pos, PowerUpKind)>,
    pub particles: Vec<Particle>,
    pub score: u32,
    pub level: u32,
    pub level_name: &'static str,
    pub theme: &'static Theme,
    pub foods_eaten: u32,
    pub foods_to_next_level: u32,
    pub effect: Option<ActiveEffect>,
    pub phase: Phase,
    pub countdown_text: Option<String>,
    pub message: Option<String>,
}

impl Frame {
    pub fn capture(w: &WorldState) -> Self {
        let mut walls: Vec<Pos> = w.walls.iter().copied().collect();
        walls.sort_by_key(|p| (p.y, p.x));
        Frame {
            width: GRID_W,
            height: GRID_H,
            snake: w.snake.to_vec(),
            food: w.food,
            special_food: w.special_food,
            obstacles: w.obstacles.iter().map(|o| o.area).collect(),
            walls,
            power_ups: w.power_ups.iter().filter(|u| !u.consumed).map(|u| (u.pos, u.kind)).collect(),
            particles: w.particles.clone(),
            score: w.score,
            level: w.level,
            level_name: w.level_def.name,
            theme: w.theme(),
            foods_eaten: w.foods_eaten,
            foods_to_next_level: w.foods_to_next_level,
            effect: w.active_effect,
            phase: w.phase,
            countdown_text: w.countdown().map(|c| c.label()),
            message: w.message.clone(),
        }
    }

    /// Level progress in 0.0..=1.0.
    pub fn progress(&self) -> f32 {
        if self.foods_to_next_level == 0 {
            return 1.0;
        }
        (self.foods_eaten as f32 / self.foods_to_next_level as f32).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PowerUp;
    use crate::sim::control::start_level_countdown;
    use crate::sim::world::test_world;

    #[test]
    fn consumed_power_ups_are_hidden() {
        let mut w = test_world(8);
        w.power_ups = vec![
            PowerUp::new(Pos::new(3, 3), PowerUpKind::Ghost, 10),
            PowerUp { consumed: true, ..PowerUp::new(Pos::new(4, 4), PowerUpKind::Slow, 10) },
        ];
        let f = Frame::capture(&w);
        assert_eq!(f.power_ups, vec![(Pos::new(3, 3), PowerUpKind::Ghost)]);
    }

    #[test]
    fn carries_countdown_text_and_progress() {
        let mut w = test_world(8);
        w.foods_eaten = 5;
        start_level_countdown(&mut w);
        let f = Frame::capture(&w);
        assert_eq!(f.countdown_text.as_deref(), Some("3"));
        assert_eq!(f.progress(), 0.5);
        assert_eq!(f.snake[0], w.snake.head());
        assert_eq!(f.walls.len(), w.walls.len());
        assert_eq!((f.width, f.height), (36, 24));
    }
}
