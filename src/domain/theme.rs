/// Theme catalog: five fixed cosmetic profiles, each also deciding whether
/// border walls are enforced.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WallStyle {
    Solid,
    Dot,
    Dash,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgb,
    pub has_walls: bool,
    pub head: Rgb,
    pub body: Rgb,
    pub food: Rgb,
    pub wall: Rgb,
    pub wall_style: WallStyle,
}

const SADDLE_BROWN: Rgb = Rgb(139, 69, 19);

pub static THEMES: [Theme; 5] = [
    Theme {
        name: "Classic Wall",
        background: Rgb(0, 0, 0),
        has_walls: true,
        head: Rgb(154, 205, 50),
        body: Rgb(50, 205, 50),
        food: Rgb(255, 0, 0),
        wall: Rgb(220, 120, 60),
        wall_style: WallStyle::Solid,
    },
    Theme {
        name: "Neon Loop",
        background: Rgb(20, 20, 40),
        has_walls: false,
        head: Rgb(0, 255, 255),
        body: Rgb(0, 191, 255),
        food: Rgb(255, 0, 255),
        wall: SADDLE_BROWN,
        wall_style: WallStyle::Solid,
    },
    Theme {
        name: "Desert Wall",
        background: Rgb(222, 184, 135),
        has_walls: true,
        head: SADDLE_BROWN,
        body: Rgb(205, 133, 63),
        food: Rgb(255, 165, 0),
        wall: Rgb(255, 69, 0),
        wall_style: WallStyle::Dot,
    },
    Theme {
        name: "Forest Loop",
        background: Rgb(85, 107, 47),
        has_walls: false,
        head: Rgb(34, 139, 34),
        body: Rgb(0, 128, 0),
        food: Rgb(255, 215, 0),
        wall: SADDLE_BROWN,
        wall_style: WallStyle::Solid,
    },
    Theme {
        name: "Ice Wall",
        background: Rgb(173, 216, 230),
        has_walls: true,
        head: Rgb(255, 255, 255),
        body: Rgb(224, 255, 255),
        food: Rgb(138, 43, 226),
        wall: Rgb(0, 191, 255),
        wall_style: WallStyle::Dash,
    },
];

/// Index of the theme called `name` (case-insensitive).
pub fn find_theme(name: &str) -> Option<usize> {
    THEMES.iter().position(|t| t.name.eq_ignore_ascii_case(name.trim()))
}
