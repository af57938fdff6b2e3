/// Level catalog: ten hand-authored layouts.
///
/// Each level is one record carrying everything the engine needs to know
/// about it: obstacle rectangles, wall layout, boundary policy and the
/// snake's starting position. The engine never branches on level numbers.
///
///   1  open field (also the fallback for unknown numbers)
///   2  three scattered bars
///   3  cross, forced wrap
///   4  zig-zag columns
///   5  central box and four corners
///   6  cross with two blocks, forced wrap
///   7  diagonal chain, forced wrap
///   8  four vertical bars
///   9  spiral with an exit gap
///  10  checkerboard

use std::collections::HashSet;

use crate::domain::grid::{border_ring, Direction, Pos, Rect, GRID_H};
use crate::domain::theme::Theme;

pub const MAX_LEVEL: u32 = 10;

/// How the grid edge behaves.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoundaryPolicy {
    /// Wrap on every edge regardless of theme.
    Wrap,
    /// Walls when the theme has them, otherwise wrap.
    Bounded,
}

/// Which wall cells the level contributes when the theme enforces walls.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WallLayout {
    None,
    Border,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SnakeSpawn {
    pub head: Pos,
    pub heading: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDef {
    pub number: u32,
    pub name: &'static str,
    pub obstacles: Vec<Rect>,
    pub walls: WallLayout,
    pub boundary: BoundaryPolicy,
    pub spawn: SnakeSpawn,
}

impl LevelDef {
    /// Wall cells in force for this level under `theme`.
    pub fn wall_cells(&self, theme: &Theme) -> HashSet<Pos> {
        if !theme.has_walls || self.boundary == BoundaryPolicy::Wrap {
            return HashSet::new();
        }
        match self.walls {
            WallLayout::None => HashSet::new(),
            WallLayout::Border => border_ring().into_iter().collect(),
        }
    }

    /// Does the head wrap at the grid edge under `theme`?
    pub fn wraps(&self, theme: &Theme) -> bool {
        self.boundary == BoundaryPolicy::Wrap || !theme.has_walls
    }
}

const SPAWN_CENTER: SnakeSpawn = SnakeSpawn { head: Pos::new(7, GRID_H / 2), heading: Direction::Right };
const SPAWN_LOW: SnakeSpawn = SnakeSpawn { head: Pos::new(7, GRID_H - 4), heading: Direction::Right };

/// Look up a level. Numbers outside 1..=10 fall back to level 1.
pub fn get_level(number: u32) -> LevelDef {
    match number {
        2 => LevelDef {
            number: 2,
            name: "Scattered Bars",
            obstacles: vec![
                Rect::new(10, 5, 10, 1),
                Rect::new(5, 10, 1, 5),
                Rect::new(20, 15, 5, 1),
            ],
            walls: WallLayout::Border,
            boundary: BoundaryPolicy::Bounded,
            spawn: SPAWN_LOW,
        },
        3 => LevelDef {
            number: 3,
            name: "Crossroads",
            obstacles: vec![Rect::new(0, 8, 36, 1), Rect::new(18, 0, 1, 24)],
            walls: WallLayout::None,
            boundary: BoundaryPolicy::Wrap,
            spawn: SPAWN_CENTER,
        },
        4 => LevelDef {
            number: 4,
            name: "Zig-Zag",
            obstacles: vec![
                Rect::new(5, 4, 2, 12),
                Rect::new(10, 8, 2, 10),
                Rect::new(15, 2, 2, 14),
                Rect::new(20, 10, 2, 10),
                Rect::new(25, 6, 2, 12),
                Rect::new(30, 3, 2, 14),
            ],
            walls: WallLayout::Border,
            boundary: BoundaryPolicy::Bounded,
            spawn: SPAWN_LOW,
        },
        5 => LevelDef {
            number: 5,
            name: "Central Box",
            obstacles: vec![
                Rect::new(14, 7, 8, 10),
                Rect::new(0, 0, 2, 2),
                Rect::new(34, 0, 2, 2),
                Rect::new(0, 22, 2, 2),
                Rect::new(34, 22, 2, 2),
            ],
            walls: WallLayout::Border,
            boundary: BoundaryPolicy::Bounded,
            spawn: SPAWN_LOW,
        },
        6 => LevelDef {
            number: 6,
            name: "Quadrants",
            obstacles: vec![
                Rect::new(17, 0, 2, 24),
                Rect::new(0, 11, 36, 2),
                Rect::new(5, 5, 3, 3),
                Rect::new(28, 16, 3, 3),
            ],
            walls: WallLayout::None,
            boundary: BoundaryPolicy::Wrap,
            spawn: SnakeSpawn { head: Pos::new(3, 3), heading: Direction::Up },
        },
        7 => LevelDef {
            number: 7,
            name: "Diagonal Chain",
            obstacles: diagonal_chain(),
            walls: WallLayout::None,
            boundary: BoundaryPolicy::Wrap,
            spawn: SnakeSpawn { head: Pos::new(11, 6), heading: Direction::Up },
        },
        8 => LevelDef {
            number: 8,
            name: "Four Bars",
            obstacles: vec![
                Rect::new(6, 2, 2, 20),
                Rect::new(14, 2, 2, 20),
                Rect::new(22, 2, 2, 20),
                Rect::new(30, 2, 2, 20),
            ],
            walls: WallLayout::Border,
            boundary: BoundaryPolicy::Bounded,
            spawn: SnakeSpawn { head: Pos::new(18, 4), heading: Direction::Down },
        },
        9 => LevelDef {
            number: 9,
            name: "Spiral",
            obstacles: vec![
                // outer ring, bottom edge split to leave a gap at x=17..19
                Rect::new(2, 2, 32, 1),
                Rect::new(33, 2, 1, 20),
                Rect::new(3, 21, 14, 1),
                Rect::new(20, 21, 14, 1),
                Rect::new(2, 3, 1, 18),
                // inner turn
                Rect::new(4, 4, 28, 1),
                Rect::new(31, 5, 1, 14),
                Rect::new(5, 18, 25, 1),
                Rect::new(4, 5, 1, 13),
            ],
            walls: WallLayout::Border,
            boundary: BoundaryPolicy::Bounded,
            spawn: SPAWN_CENTER,
        },
        10 => LevelDef {
            number: 10,
            name: "Checkerboard",
            obstacles: checkerboard(),
            walls: WallLayout::Border,
            boundary: BoundaryPolicy::Bounded,
            spawn: SPAWN_CENTER,
        },
        _ => LevelDef {
            number: 1,
            name: "Open Field",
            obstacles: vec![],
            walls: WallLayout::Border,
            boundary: BoundaryPolicy::Bounded,
            spawn: SPAWN_CENTER,
        },
    }
}

/// 2×2 blocks stepping down-right then back up to the right edge.
fn diagonal_chain() -> Vec<Rect> {
    let mut out = Vec::with_capacity(18);
    for i in 0..12 {
        out.push(Rect::new(i * 2, i * 2, 2, 2));
    }
    for i in 0..6 {
        out.push(Rect::new(24 + i * 2, 20 - i * 2, 2, 2));
    }
    out
}

/// 2×2 blocks every 4 cells, alternate rows shifted by 2.
fn checkerboard() -> Vec<Rect> {
    let mut out = vec![];
    for y in (2..22).step_by(4) {
        let start = if y % 8 == 2 { 2 } else { 4 };
        for x in (start..34).step_by(4) {
            out.push(Rect::new(x, y, 2, 2));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::theme::THEMES;

    const INITIAL_LEN: usize = 3;

    fn spawn_cells(def: &LevelDef) -> Vec<Pos> {
        let back = def.spawn.heading.opposite();
        let mut cells = vec![def.spawn.head];
        for _ in 1..INITIAL_LEN {
            let last = *cells.last().unwrap();
            cells.push(last.step(back));
        }
        cells
    }

    #[test]
    fn unknown_numbers_fall_back_to_level_one() {
        assert_eq!(get_level(0).number, 1);
        assert_eq!(get_level(11).number, 1);
        assert_eq!(get_level(1), get_level(42));
    }

    #[test]
    fn every_spawn_is_clear_under_every_theme() {
        for n in 1..=MAX_LEVEL {
            let def = get_level(n);
            assert_eq!(def.number, n);
            for theme in THEMES.iter() {
                let walls = def.wall_cells(theme);
                for c in spawn_cells(&def) {
                    assert!(c.in_bounds(), "level {n}: spawn {c:?} off grid");
                    assert!(!walls.contains(&c), "level {n}: spawn {c:?} on wall");
                    assert!(!def.obstacles.iter().any(|r| r.contains(c)), "level {n}: spawn {c:?} in obstacle");
                }
            }
        }
    }

    #[test]
    fn forced_wrap_levels_ignore_theme_walls() {
        let walled = &THEMES[0];
        for n in [3, 6, 7] {
            let def = get_level(n);
            assert!(def.wraps(walled));
            assert!(def.wall_cells(walled).is_empty());
        }
        for n in [1, 2, 4, 5, 8, 9, 10] {
            let def = get_level(n);
            assert!(!def.wraps(walled));
            assert_eq!(def.wall_cells(walled).len(), border_ring().len());
        }
    }

    #[test]
    fn loop_theme_wraps_and_drops_walls() {
        let looped = &THEMES[1];
        for n in 1..=MAX_LEVEL {
            let def = get_level(n);
            assert!(def.wraps(looped));
            assert!(def.wall_cells(looped).is_empty());
        }
    }

    #[test]
    fn spiral_bottom_edge_has_exit_gap() {
        let def = get_level(9);
        for x in 17..20 {
            assert!(!def.obstacles.iter().any(|r| r.contains(Pos::new(x, 21))));
        }
        assert!(def.obstacles.iter().any(|r| r.contains(Pos::new(16, 21))));
    }

    #[test]
    fn generated_patterns() {
        assert_eq!(diagonal_chain().len(), 18);
        assert_eq!(diagonal_chain().last(), Some(&Rect::new(34, 10, 2, 2)));
        let board = checkerboard();
        assert!(board.contains(&Rect::new(2, 2, 2, 2)));
        assert!(board.contains(&Rect::new(4, 6, 2, 2)));
        assert!(!board.contains(&Rect::new(2, 6, 2, 2)));
    }
}
