/// Grid geometry: cell positions, headings, and obstacle rectangles.
///
/// The playfield is a fixed 36×24 grid. Positions are signed so that a
/// freshly stepped head can sit one cell outside the grid until the
/// boundary policy decides whether it wraps or dies.

use serde::{Deserialize, Serialize};

pub const GRID_W: i32 = 36;
pub const GRID_H: i32 = 24;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    /// One cell in `dir`, without any boundary handling.
    pub fn step(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        Pos { x: self.x + dx, y: self.y + dy }
    }

    pub fn in_bounds(self) -> bool {
        self.x >= 0 && self.x < GRID_W && self.y >= 0 && self.y < GRID_H
    }

    /// Wrap all four edges modulo the grid size.
    pub fn wrapped(self) -> Pos {
        Pos {
            x: self.x.rem_euclid(GRID_W),
            y: self.y.rem_euclid(GRID_H),
        }
    }
}

/// Heading of the snake. Discriminants follow the clockwise order
/// Right, Down, Left, Up, so opposites differ by two.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down  => (0, 1),
            Direction::Left  => (-1, 0),
            Direction::Up    => (0, -1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down  => Direction::Up,
            Direction::Left  => Direction::Right,
            Direction::Up    => Direction::Down,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Right
    }
}

/// Axis-aligned rectangle of cells, `x..x+w` × `y..y+h`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn contains(&self, p: Pos) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    /// All cells covered by the rectangle, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (self.y..self.y + self.h)
            .flat_map(move |y| (self.x..self.x + self.w).map(move |x| Pos::new(x, y)))
    }
}

/// The one-cell ring around the grid edge.
pub fn border_ring() -> Vec<Pos> {
    let mut ring = Vec::with_capacity((2 * GRID_W + 2 * (GRID_H - 2)) as usize);
    for x in 0..GRID_W {
        ring.push(Pos::new(x, 0));
        ring.push(Pos::new(x, GRID_H - 1));
    }
    for y in 1..GRID_H - 1 {
        ring.push(Pos::new(0, y));
        ring.push(Pos::new(GRID_W - 1, y));
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_are_two_apart() {
        for d in [Direction::Right, Direction::Down, Direction::Left, Direction::Up] {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
            assert_eq!(((d as i32) - (d.opposite() as i32)).abs(), 2);
        }
    }

    #[test]
    fn wrap_each_edge() {
        assert_eq!(Pos::new(36, 12).wrapped(), Pos::new(0, 12));
        assert_eq!(Pos::new(-1, 12).wrapped(), Pos::new(35, 12));
        assert_eq!(Pos::new(4, -1).wrapped(), Pos::new(4, 23));
        assert_eq!(Pos::new(4, 24).wrapped(), Pos::new(4, 0));
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10, 5, 10, 1);
        assert!(r.contains(Pos::new(10, 5)));
        assert!(r.contains(Pos::new(19, 5)));
        assert!(!r.contains(Pos::new(20, 5)));
        assert!(!r.contains(Pos::new(10, 6)));
        assert_eq!(r.cells().count(), 10);
    }

    #[test]
    fn border_ring_has_no_duplicates() {
        let ring = border_ring();
        let set: std::collections::HashSet<_> = ring.iter().copied().collect();
        assert_eq!(set.len(), ring.len());
        assert_eq!(ring.len(), (2 * 36 + 2 * 22) as usize);
        assert!(ring.iter().all(|p| p.in_bounds()));
    }
}
