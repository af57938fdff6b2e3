/// Gamepad input using gilrs (behind the `gamepad` feature).
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Turn
///   Start                 →  Pause
///   Select                →  Menu
///   A / X                 →  Confirm
///
/// Every input is edge-triggered: a press (or a stick crossing the dead
/// zone) yields one intent.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::Intent;
use crate::domain::grid::Direction;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.trim().to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East  => Some(Btn::B),
            Button::West  => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start  => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Clone, Debug, PartialEq, Eq)]
struct ActionMap {
    pause: Vec<Btn>,
    menu: Vec<Btn>,
    confirm: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            pause:   vec![Btn::Start],
            menu:    vec![Btn::Select],
            confirm: vec![Btn::A, Btn::X],
        }
    }
}

impl ActionMap {
    /// Unknown names are dropped; an empty list keeps the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let list: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if list.is_empty() { fallback } else { list }
        }
        let defaults = ActionMap::default();
        ActionMap {
            pause: parse_list(&cfg.pause, defaults.pause),
            menu: parse_list(&cfg.menu, defaults.menu),
            confirm: parse_list(&cfg.confirm, defaults.confirm),
        }
    }

    fn intent_for(&self, btn: Btn) -> Option<Intent> {
        if self.pause.contains(&btn) {
            Some(Intent::TogglePause)
        } else if self.menu.contains(&btn) {
            Some(Intent::Menu)
        } else if self.confirm.contains(&btn) {
            Some(Intent::Confirm)
        } else {
            None
        }
    }
}

/// Stick position to a heading once outside the dead zone. The dominant
/// axis wins; gilrs reports up as positive Y.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
fn stick_direction(x: f32, y: f32) -> Option<Direction> {
    if x.abs() <= STICK_DEADZONE && y.abs() <= STICK_DEADZONE {
        return None;
    }
    Some(if x.abs() >= y.abs() {
        if x < 0.0 { Direction::Left } else { Direction::Right }
    } else if y > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    })
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    action_map: ActionMap,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,
    /// Heading the stick pointed at after the previous poll.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_dir: Option<Direction>,
    pending: Vec<Intent>,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    log::warn!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            action_map: ActionMap::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            stick_dir: None,
            pending: Vec::with_capacity(4),
            connected,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    /// Poll the pad. Call once per frame.
    pub fn update(&mut self) {
        self.pending.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// Intents gathered by the last `update()`.
    pub fn intents(&self) -> &[Intent] {
        &self.pending
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        let dir = stick_direction(self.stick_x, self.stick_y);
        if dir != self.stick_dir {
            if let Some(d) = dir {
                self.pending.push(Intent::Turn(d));
            }
            self.stick_dir = dir;
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        let intent = match btn {
            Button::DPadUp    => Some(Intent::Turn(Direction::Up)),
            Button::DPadDown  => Some(Intent::Turn(Direction::Down)),
            Button::DPadLeft  => Some(Intent::Turn(Direction::Left)),
            Button::DPadRight => Some(Intent::Turn(Direction::Right)),
            other => Btn::from_gilrs(other).and_then(|b| self.action_map.intent_for(b)),
        };
        if let Some(i) = intent {
            self.pending.push(i);
        }
    }
}
