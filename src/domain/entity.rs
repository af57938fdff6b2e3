/// Entities: Snake, food, power-ups, obstacles, particles.
/// Everything here is plain data plus small self-contained state machines;
/// the rules that tie them together live in `sim::step`.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::grid::{Direction, Pos, Rect, GRID_H, GRID_W};

/// Player intent, already decoded from keyboard or gamepad.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Turn(Direction),
    TogglePause,
    Menu,
    Confirm,
    Quit,
}

// ══════════════════════════════════════════════════════════════
// Snake
// ══════════════════════════════════════════════════════════════

/// Ordered body cells, head at index 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    cells: VecDeque<Pos>,
}

impl Snake {
    /// Lay out `len` cells starting at `head`, trailing opposite `heading`.
    pub fn spawn(head: Pos, heading: Direction, len: usize) -> Self {
        let back = heading.opposite();
        let mut cells = VecDeque::with_capacity(len.max(1));
        let mut p = head;
        for _ in 0..len.max(1) {
            cells.push_back(p);
            p = p.step(back);
        }
        Snake { cells }
    }

    /// Rebuild from stored cells. Returns None for an empty body.
    pub fn from_cells(cells: &[Pos]) -> Option<Self> {
        if cells.is_empty() { return None; }
        Some(Snake { cells: cells.iter().copied().collect() })
    }

    pub fn head(&self) -> Pos {
        self.cells[0]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, p: Pos) -> bool {
        self.cells.contains(&p)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pos> {
        self.cells.iter()
    }

    pub fn to_vec(&self) -> Vec<Pos> {
        self.cells.iter().copied().collect()
    }

    pub fn push_head(&mut self, p: Pos) {
        self.cells.push_front(p);
    }

    /// Drop the tail cell. The head is never removed.
    pub fn pop_tail(&mut self) -> Option<Pos> {
        if self.cells.len() <= 1 { return None; }
        self.cells.pop_back()
    }
}

// ══════════════════════════════════════════════════════════════
// Food
// ══════════════════════════════════════════════════════════════

/// Time-boxed bonus food.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecialFood {
    pub pos: Pos,
    pub ticks_left: u32,
}

// ══════════════════════════════════════════════════════════════
// Power-ups
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PowerUpKind {
    Invincibility,
    /// Reserved: collected and timed like the others, no rule consults it.
    Ghost,
    ScoreMultiplier,
    Slow,
    Speed,
    Shrink,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 6] = [
        PowerUpKind::Invincibility,
        PowerUpKind::Ghost,
        PowerUpKind::ScoreMultiplier,
        PowerUpKind::Slow,
        PowerUpKind::Speed,
        PowerUpKind::Shrink,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Invincibility   => "Invincible",
            PowerUpKind::Ghost           => "Ghost",
            PowerUpKind::ScoreMultiplier => "Score x2",
            PowerUpKind::Slow            => "Slow",
            PowerUpKind::Speed           => "Speed",
            PowerUpKind::Shrink          => "Shrink",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerUp {
    pub pos: Pos,
    pub kind: PowerUpKind,
    pub duration: u32,   // ticks the effect lasts once collected
    pub consumed: bool,
}

impl PowerUp {
    pub fn new(pos: Pos, kind: PowerUpKind, duration: u32) -> Self {
        PowerUp { pos, kind, duration, consumed: false }
    }
}

/// The single effect currently in force.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub remaining: u32,
}

impl ActiveEffect {
    /// Burn one tick. Returns true once the effect has run out.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

// ══════════════════════════════════════════════════════════════
// Obstacles
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obstacle {
    pub area: Rect,
    pub moving: bool,
    pub heading: Direction,
}

impl Obstacle {
    pub fn fixed(area: Rect) -> Self {
        Obstacle { area, moving: false, heading: Direction::Right }
    }

    pub fn contains(&self, p: Pos) -> bool {
        self.area.contains(p)
    }

    /// Per-tick movement hook. Static obstacles stay put; a moving one
    /// shifts a cell along its heading, wrapping around the grid.
    pub fn advance(&mut self) {
        if !self.moving { return; }
        let origin = Pos::new(self.area.x, self.area.y).step(self.heading).wrapped();
        self.area.x = origin.x;
        self.area.y = origin.y;
    }
}

// ══════════════════════════════════════════════════════════════
// Particles (cosmetic)
// ══════════════════════════════════════════════════════════════

pub const PARTICLE_LIFE: u32 = 20;
pub const PARTICLE_BURST: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: u32,
    pub source: ParticleSource,
}

/// What emitted the particle; the renderer picks a color from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleSource {
    Food,
    SpecialFood,
    PowerUp,
}

impl Particle {
    /// Burst of particles from the center of `at` with random headings.
    pub fn burst<R: Rng + ?Sized>(rng: &mut R, at: Pos, source: ParticleSource) -> Vec<Particle> {
        (0..PARTICLE_BURST)
            .map(|_| {
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                let speed = rng.gen::<f32>() * 0.5 + 0.5;
                Particle {
                    x: at.x as f32 + 0.5,
                    y: at.y as f32 + 0.5,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    life: PARTICLE_LIFE,
                    source,
                }
            })
            .collect()
    }

    /// Advance one tick. Returns false once the particle is spent.
    pub fn update(&mut self) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        self.life = self.life.saturating_sub(1);
        self.life > 0
    }

    /// Grid cell the particle currently covers, if on the board.
    pub fn cell(&self) -> Option<Pos> {
        let p = Pos::new(self.x.floor() as i32, self.y.floor() as i32);
        if p.x >= 0 && p.x < GRID_W && p.y >= 0 && p.y < GRID_H { Some(p) } else { None }
    }
}
