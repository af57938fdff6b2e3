/// Collision and occupancy queries (single source of truth).
///
/// `Occupancy` borrows the pieces of a session that can block a cell and
/// answers "is this cell taken?" for both the engine (fatal collisions) and
/// the spawner (empty-cell search). It owns nothing.

use std::collections::HashSet;

use rand::Rng;

use crate::domain::entity::{Obstacle, PowerUp, Snake};
use crate::domain::grid::{Pos, GRID_H, GRID_W};

/// Random probes before falling back to a full scan.
pub const SPAWN_ATTEMPTS: usize = (GRID_W * GRID_H) as usize * 4;

/// Result of the head-vs-board check for a new head cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Hit {
    Clear,
    Body,
    Obstacle,
}

pub struct Occupancy<'a> {
    pub snake: &'a Snake,
    pub food: Option<Pos>,
    pub special_food: Option<Pos>,
    pub obstacles: &'a [Obstacle],
    pub power_ups: &'a [PowerUp],
    pub walls: &'a HashSet<Pos>,
    pub enforce_walls: bool,
}

impl Occupancy<'_> {
    /// Fatal-collision test for a prospective head. Walls are handled by the
    /// boundary policy, not here.
    pub fn head_hit(&self, head: Pos) -> Hit {
        if self.snake.contains(head) {
            Hit::Body
        } else if in_obstacle(self.obstacles, head) {
            Hit::Obstacle
        } else {
            Hit::Clear
        }
    }

    /// Can something be spawned at `p`?
    pub fn is_free(&self, p: Pos) -> bool {
        p.in_bounds()
            && !self.snake.contains(p)
            && self.food != Some(p)
            && self.special_food != Some(p)
            && !in_obstacle(self.obstacles, p)
            && !self.power_ups.iter().any(|u| u.pos == p)
            && !(self.enforce_walls && self.walls.contains(&p))
    }

    /// Uniform rejection sampling, bounded. When the probes run out, a
    /// row-major scan picks the first free cell; None means the board is full.
    pub fn find_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Pos> {
        for _ in 0..SPAWN_ATTEMPTS {
            let p = Pos::new(rng.gen_range(0..GRID_W), rng.gen_range(0..GRID_H));
            if self.is_free(p) {
                return Some(p);
            }
        }
        (0..GRID_H)
            .flat_map(|y| (0..GRID_W).map(move |x| Pos::new(x, y)))
            .find(|&p| self.is_free(p))
    }
}

#[inline]
pub fn in_obstacle(obstacles: &[Obstacle], p: Pos) -> bool {
    obstacles.iter().any(|o| o.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PowerUpKind;
    use crate::domain::grid::{border_ring, Direction, Rect};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snake() -> Snake {
        Snake::spawn(Pos::new(7, 12), Direction::Right, 3)
    }

    #[test]
    fn head_hit_reports_body_and_obstacle() {
        let s = snake();
        let obstacles = vec![Obstacle::fixed(Rect::new(10, 10, 2, 2))];
        let walls = HashSet::new();
        let occ = Occupancy {
            snake: &s, food: None, special_food: None,
            obstacles: &obstacles, power_ups: &[], walls: &walls, enforce_walls: false,
        };
        assert_eq!(occ.head_hit(Pos::new(6, 12)), Hit::Body);
        assert_eq!(occ.head_hit(Pos::new(11, 11)), Hit::Obstacle);
        assert_eq!(occ.head_hit(Pos::new(8, 12)), Hit::Clear);
    }

    #[test]
    fn free_cell_respects_every_layer() {
        let s = snake();
        let obstacles = vec![Obstacle::fixed(Rect::new(10, 10, 2, 2))];
        let ups = vec![PowerUp::new(Pos::new(20, 20), PowerUpKind::Slow, 100)];
        let walls: HashSet<Pos> = border_ring().into_iter().collect();
        let occ = Occupancy {
            snake: &s, food: Some(Pos::new(1, 1)), special_food: Some(Pos::new(2, 2)),
            obstacles: &obstacles, power_ups: &ups, walls: &walls, enforce_walls: true,
        };
        assert!(!occ.is_free(Pos::new(5, 12)));
        assert!(!occ.is_free(Pos::new(1, 1)));
        assert!(!occ.is_free(Pos::new(2, 2)));
        assert!(!occ.is_free(Pos::new(10, 11)));
        assert!(!occ.is_free(Pos::new(20, 20)));
        assert!(!occ.is_free(Pos::new(0, 5)));
        assert!(!occ.is_free(Pos::new(-1, 5)));
        assert!(occ.is_free(Pos::new(3, 3)));

        let open = Occupancy { enforce_walls: false, ..occ };
        assert!(open.is_free(Pos::new(0, 5)));
    }

    #[test]
    fn random_cell_is_always_free() {
        let s = snake();
        let walls: HashSet<Pos> = border_ring().into_iter().collect();
        let occ = Occupancy {
            snake: &s, food: None, special_food: None,
            obstacles: &[], power_ups: &[], walls: &walls, enforce_walls: true,
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let p = occ.find_empty_cell(&mut rng).unwrap();
            assert!(occ.is_free(p));
        }
    }

    #[test]
    fn saturated_board_finds_last_cell_or_none() {
        let s = snake();
        // Cover everything except (35, 23) with one obstacle set.
        let mut obstacles = vec![Obstacle::fixed(Rect::new(0, 0, GRID_W, GRID_H - 1))];
        obstacles.push(Obstacle::fixed(Rect::new(0, GRID_H - 1, GRID_W - 1, 1)));
        let walls = HashSet::new();
        let mut rng = StdRng::seed_from_u64(3);
        {
            let occ = Occupancy {
                snake: &s, food: None, special_food: None,
                obstacles: &obstacles, power_ups: &[], walls: &walls, enforce_walls: false,
            };
            assert_eq!(occ.find_empty_cell(&mut rng), Some(Pos::new(GRID_W - 1, GRID_H - 1)));
        }

        obstacles.push(Obstacle::fixed(Rect::new(GRID_W - 1, GRID_H - 1, 1, 1)));
        let full = Occupancy {
            snake: &s, food: None, special_food: None,
            obstacles: &obstacles, power_ups: &[], walls: &walls, enforce_walls: false,
        };
        assert_eq!(full.find_empty_cell(&mut rng), None);
    }
}
