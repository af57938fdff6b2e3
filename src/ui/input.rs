/// Keyboard input: drains crossterm events once per frame and turns fresh
/// key presses into `Intent`s.
///
/// Only Press/Repeat events count; Release events (sent by terminals with
/// keyboard enhancement) are dropped. Turning is edge-triggered, so the
/// hold tracking a platformer needs is not kept here.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Intent;
use crate::domain::grid::Direction;

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_QUIT_MENU: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Press/Repeat events from the most recent drain, in arrival order.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the drivers run.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind != KeyEventKind::Release {
                    self.presses.push(key);
                }
            }
        }
    }

    /// Intents for this frame, in key order.
    pub fn intents(&self, menu_open: bool) -> Vec<Intent> {
        self.presses.iter().filter_map(|k| intent_for(k, menu_open)).collect()
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(is_ctrl_c)
    }
}

fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL)
        && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
}

/// Translate one key press. `Q` only quits from the menu, where no letter
/// key steers.
pub fn intent_for(key: &KeyEvent, menu_open: bool) -> Option<Intent> {
    let code = key.code;
    if is_ctrl_c(key) {
        Some(Intent::Quit)
    } else if KEYS_UP.contains(&code) {
        Some(Intent::Turn(Direction::Up))
    } else if KEYS_DOWN.contains(&code) {
        Some(Intent::Turn(Direction::Down))
    } else if KEYS_LEFT.contains(&code) {
        Some(Intent::Turn(Direction::Left))
    } else if KEYS_RIGHT.contains(&code) {
        Some(Intent::Turn(Direction::Right))
    } else if KEYS_PAUSE.contains(&code) {
        Some(Intent::TogglePause)
    } else if code == KeyCode::Esc {
        Some(Intent::Menu)
    } else if KEYS_CONFIRM.contains(&code) {
        Some(Intent::Confirm)
    } else if menu_open && KEYS_QUIT_MENU.contains(&code) {
        Some(Intent::Quit)
    } else {
        None
    }
}
