/// Start / pause menu model. Pure state; the renderer draws it and `main`
/// carries out the returned `MenuAction`.

use crate::domain::entity::Intent;
use crate::domain::grid::Direction;
use crate::domain::level::MAX_LEVEL;
use crate::domain::theme::THEMES;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuItem {
    Resume,
    StartGame,
    Level,
    Theme,
    SaveGame,
    LoadGame,
    Quit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuAction {
    None,
    Resume,
    StartGame { level: u32, theme_idx: usize },
    Save,
    Load,
    Quit,
}

#[derive(Clone, Debug)]
pub struct MenuState {
    pub open: bool,
    pub cursor: usize,
    pub level: u32,
    pub theme_idx: usize,
    pub items: Vec<MenuItem>,
    /// One-line feedback under the items (save result etc).
    pub status: Option<String>,
}

impl MenuState {
    pub fn new(level: u32, theme_idx: usize) -> Self {
        let mut m = MenuState {
            open: true,
            cursor: 0,
            level: level.clamp(1, MAX_LEVEL),
            theme_idx: theme_idx.min(THEMES.len() - 1),
            items: vec![],
            status: None,
        };
        m.refresh(false, false);
        m
    }

    /// Rebuild the item list for the current session. `live` = a run is in
    /// progress and can be resumed or saved.
    pub fn refresh(&mut self, live: bool, has_save: bool) {
        let current = self.items.get(self.cursor).copied();
        let mut items = Vec::with_capacity(7);
        if live {
            items.push(MenuItem::Resume);
        }
        items.push(MenuItem::StartGame);
        items.push(MenuItem::Level);
        items.push(MenuItem::Theme);
        if live {
            items.push(MenuItem::SaveGame);
        }
        if has_save {
            items.push(MenuItem::LoadGame);
        }
        items.push(MenuItem::Quit);
        self.cursor = current
            .and_then(|c| items.iter().position(|&i| i == c))
            .unwrap_or(0);
        self.items = items;
    }

    /// Open with the cursor on the first item.
    pub fn show(&mut self, live: bool, has_save: bool) {
        self.open = true;
        self.cursor = 0;
        self.status = None;
        self.refresh(live, has_save);
    }

    pub fn selected(&self) -> Option<MenuItem> {
        self.items.get(self.cursor).copied()
    }

    pub fn label(&self, item: MenuItem) -> String {
        match item {
            MenuItem::Resume => "Resume".into(),
            MenuItem::StartGame => "Start Game".into(),
            MenuItem::Level => format!("Level      < {:>2} >", self.level),
            MenuItem::Theme => format!("Theme      < {} >", THEMES[self.theme_idx].name),
            MenuItem::SaveGame => "Save Game".into(),
            MenuItem::LoadGame => "Load Game".into(),
            MenuItem::Quit => "Quit".into(),
        }
    }

    pub fn handle(&mut self, intent: Intent) -> MenuAction {
        match intent {
            Intent::Turn(Direction::Up) => {
                self.move_cursor(-1);
                MenuAction::None
            }
            Intent::Turn(Direction::Down) => {
                self.move_cursor(1);
                MenuAction::None
            }
            Intent::Turn(Direction::Left) => {
                self.adjust(-1);
                MenuAction::None
            }
            Intent::Turn(Direction::Right) => {
                self.adjust(1);
                MenuAction::None
            }
            Intent::Confirm => self.activate(),
            // Esc / pause close the menu back into a live run
            Intent::Menu | Intent::TogglePause => {
                if self.items.contains(&MenuItem::Resume) { MenuAction::Resume } else { MenuAction::None }
            }
            Intent::Quit => MenuAction::Quit,
        }
    }

    fn move_cursor(&mut self, delta: i32) {
        let n = self.items.len() as i32;
        if n == 0 { return; }
        self.cursor = (self.cursor as i32 + delta).rem_euclid(n) as usize;
    }

    fn adjust(&mut self, delta: i32) {
        match self.selected() {
            Some(MenuItem::Level) => {
                let lv = self.level as i32 - 1 + delta;
                self.level = lv.rem_euclid(MAX_LEVEL as i32) as u32 + 1;
            }
            Some(MenuItem::Theme) => {
                let n = THEMES.len() as i32;
                self.theme_idx = (self.theme_idx as i32 + delta).rem_euclid(n) as usize;
            }
            _ => {}
        }
    }

    fn activate(&mut self) -> MenuAction {
        match self.selected() {
            Some(MenuItem::Resume) => MenuAction::Resume,
            Some(MenuItem::StartGame) => MenuAction::StartGame { level: self.level, theme_idx: self.theme_idx },
            Some(MenuItem::Level) => {
                self.adjust(1);
                MenuAction::None
            }
            Some(MenuItem::Theme) => {
                self.adjust(1);
                MenuAction::None
            }
            Some(MenuItem::SaveGame) => MenuAction::Save,
            Some(MenuItem::LoadGame) => MenuAction::Load,
            Some(MenuItem::Quit) => MenuAction::Quit,
            None => MenuAction::None,
        }
    }
}
