/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Input is a `Frame` (the session snapshot) plus the menu model, so the
/// renderer never touches live session state.

use std::io::{self, BufWriter, Write};
use std::mem::{discriminant, Discriminant};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{ParticleSource, PowerUpKind};
use crate::domain::grid::Pos;
use crate::domain::theme::{Rgb, WallStyle};
use crate::sim::frame::Frame;
use crate::sim::world::Phase;
use crate::ui::menu::MenuState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all terminal cells outside the board.
    /// Using the same RGB for `Clear` and every cell keeps VTE terminals
    /// from showing seams between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so every cell has an explicit
    /// background.
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::new(' ', Color::White, bg));
            }
        }
    }
}

// ── Layout ──

/// Each game cell is 2 terminal columns wide so cells look square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const PROGRESS_ROW: usize = 1;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const PANEL_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };
const HDR: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const KEY_C: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const DESC_C: Color = Color::Rgb { r: 180, g: 180, b: 180 };
const OBSTACLE_C: Color = Color::Rgb { r: 128, g: 128, b: 128 };
const SPECIAL_C: Color = Color::Rgb { r: 255, g: 215, b: 0 };

fn rgb(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

fn power_up_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::Invincibility   => Color::Rgb { r: 255, g: 215, b: 0 },
        PowerUpKind::Ghost           => Color::Rgb { r: 230, g: 230, b: 250 },
        PowerUpKind::ScoreMultiplier => Color::Rgb { r: 255, g: 0, b: 255 },
        PowerUpKind::Slow            => Color::Rgb { r: 30, g: 144, b: 255 },
        PowerUpKind::Speed           => Color::Rgb { r: 255, g: 69, b: 0 },
        PowerUpKind::Shrink          => Color::Rgb { r: 50, g: 205, b: 50 },
    }
}

fn power_up_glyph(kind: PowerUpKind) -> char {
    match kind {
        PowerUpKind::Invincibility   => 'I',
        PowerUpKind::Ghost           => 'G',
        PowerUpKind::ScoreMultiplier => 'M',
        PowerUpKind::Slow            => 'S',
        PowerUpKind::Speed           => 'F',
        PowerUpKind::Shrink          => 'K',
    }
}

fn particle_color(src: ParticleSource, f: &Frame) -> Color {
    match src {
        ParticleSource::Food => rgb(f.theme.food),
        ParticleSource::SpecialFood => SPECIAL_C,
        ParticleSource::PowerUp => Color::White,
    }
}

/// True when `phase` is a different kind of phase than the last frame's.
fn phase_kind_changed(last: Option<Discriminant<Phase>>, phase: &Phase) -> bool {
    last != Some(discriminant(phase))
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Phase kind only; countdown beats must not force a full clear.
    last_phase: Option<Discriminant<Phase>>,
    last_menu_open: bool,
    anim_tick: u32,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            last_menu_open: false,
            anim_tick: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 30));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, f: &Frame, menu: &MenuState, high_scores: &[u32]) -> io::Result<()> {
        self.anim_tick = self.anim_tick.wrapping_add(1);

        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 30));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase or menu change → clear for a clean transition
        let phase_kind = discriminant(&f.phase);
        if phase_kind_changed(self.last_phase, &f.phase) || self.last_menu_open != menu.open {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(phase_kind);
            self.last_menu_open = menu.open;
        }

        self.front.clear();
        self.compose_hud(f, high_scores.first().copied());
        self.compose_board(f);
        self.compose_status(f);

        if menu.open {
            self.compose_menu(menu, high_scores);
        } else {
            match f.phase {
                Phase::Countdown(_) => self.compose_countdown(f),
                Phase::Paused => self.compose_banner(f, "PAUSED", "P: continue   Esc: menu", HDR),
                Phase::GameOver => {
                    let sub = format!("Score {}   Enter: retry   Esc: menu", f.score);
                    self.compose_banner(f, "GAME OVER", &sub, Color::Rgb { r: 255, g: 60, b: 60 });
                }
                Phase::Victory => {
                    let sub = format!("Final score {}   Enter: menu", f.score);
                    self.compose_banner(f, "ALL LEVELS CLEARED", &sub, Color::Rgb { r: 80, g: 255, b: 80 });
                }
                Phase::Running => {}
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Left edge of the board, centered in the terminal.
    fn board_x(&self, f: &Frame) -> usize {
        let board_cols = f.width as usize * CELL_W;
        self.front.width.saturating_sub(board_cols) / 2
    }

    // ── HUD ──

    fn compose_hud(&mut self, f: &Frame, best: Option<u32>) {
        let effect = match f.effect {
            Some(e) => format!("  {} {}", e.kind.label(), e.remaining),
            None => String::new(),
        };
        let hud = format!(
            " Score {:<6} Best {:<6} Level {:>2} {:<15} {}{}",
            f.score,
            best.unwrap_or(0).max(f.score),
            f.level,
            f.level_name,
            f.theme.name,
            effect,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // Level progress bar
        let bar_w = 20;
        let filled = (f.progress() * bar_w as f32).round() as usize;
        let mut bar = String::with_capacity(bar_w + 24);
        bar.push_str(" Progress [");
        for i in 0..bar_w {
            bar.push(if i < filled { '█' } else { '·' });
        }
        bar.push_str(&format!("] {}/{}", f.foods_eaten, f.foods_to_next_level));
        self.front.put_str(0, PROGRESS_ROW, &bar, rgb(f.theme.head), Color::Reset);
    }

    // ── Board ──

    fn compose_board(&mut self, f: &Frame) {
        let x0 = self.board_x(f);
        let bg = rgb(f.theme.background);

        for gy in 0..f.height as usize {
            for gx in 0..f.width as usize {
                self.put_cell(x0, gx, gy, ' ', Color::White, bg);
            }
        }

        let (wall_ch, wall_fg, wall_bg) = match f.theme.wall_style {
            WallStyle::Solid => (' ', Color::White, rgb(f.theme.wall)),
            WallStyle::Dot => ('•', rgb(f.theme.wall), bg),
            WallStyle::Dash => ('━', rgb(f.theme.wall), bg),
        };
        for &p in &f.walls {
            self.put_pos(x0, p, wall_ch, wall_fg, wall_bg);
        }

        for r in &f.obstacles {
            for p in r.cells() {
                self.put_pos(x0, p, '▓', OBSTACLE_C, bg);
            }
        }

        for p in &f.particles {
            if let Some(cell) = p.cell() {
                self.put_pos(x0, cell, '·', particle_color(p.source, f), bg);
            }
        }

        if let Some(p) = f.food {
            self.put_pos(x0, p, '●', rgb(f.theme.food), bg);
        }
        if let Some(s) = f.special_food {
            // Blink during the last 10 ticks
            let visible = s.ticks_left > 10 || (self.anim_tick / 6) % 2 == 0;
            if visible {
                self.put_pos(x0, s.pos, '◆', SPECIAL_C, bg);
            }
        }
        for &(p, kind) in &f.power_ups {
            self.put_pos(x0, p, power_up_glyph(kind), Color::Black, power_up_color(kind));
        }

        let body = rgb(f.theme.body);
        for &p in f.snake.iter().skip(1) {
            self.put_pos(x0, p, ' ', Color::White, body);
        }
        if let Some(&head) = f.snake.first() {
            let head_bg = match f.effect.map(|e| e.kind) {
                Some(PowerUpKind::Invincibility) if (self.anim_tick / 4) % 2 == 0 => Color::White,
                _ => rgb(f.theme.head),
            };
            self.put_pos(x0, head, ' ', Color::White, head_bg);
        }
    }

    fn put_pos(&mut self, x0: usize, p: Pos, ch: char, fg: Color, bg: Color) {
        if p.in_bounds() {
            self.put_cell(x0, p.x as usize, p.y as usize, ch, fg, bg);
        }
    }

    /// Fill one game cell (two columns). The glyph goes in the left column.
    fn put_cell(&mut self, x0: usize, gx: usize, gy: usize, ch: char, fg: Color, bg: Color) {
        let col = x0 + gx * CELL_W;
        let row = MAP_ROW + gy;
        self.front.set(col, row, Cell::new(ch, fg, bg));
        let right = if ch == ' ' || ch.is_ascii_alphabetic() { ' ' } else { ch };
        self.front.set(col + 1, row, Cell::new(right, fg, bg));
    }

    // ── Message + help ──

    fn compose_status(&mut self, f: &Frame) {
        let msg_row = MAP_ROW + f.height as usize + 1;
        if let Some(msg) = &f.message {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &format!(" ◈ {msg} "), Color::Black, MSG_BG);
        }
        let help = " Arrows/WASD: steer   P: pause   Esc: menu   Enter: confirm   Ctrl+C: quit";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, Color::Reset);
    }

    // ── Overlays ──

    fn compose_countdown(&mut self, f: &Frame) {
        let Some(text) = &f.countdown_text else { return };
        let label = format!("  {text}  ");
        let x0 = self.board_x(f);
        let x = x0 + (f.width as usize * CELL_W).saturating_sub(label.chars().count()) / 2;
        let y = MAP_ROW + f.height as usize / 2;
        self.front.fill_rect(x, y - 1, label.chars().count(), 3, PANEL_BG);
        self.front.put_str(x, y, &label, HDR, PANEL_BG);
    }

    fn compose_banner(&mut self, f: &Frame, title: &str, sub: &str, color: Color) {
        let box_w = sub.chars().count().max(title.chars().count()) + 6;
        let x0 = self.board_x(f);
        let x = x0 + (f.width as usize * CELL_W).saturating_sub(box_w) / 2;
        let y = MAP_ROW + f.height as usize / 2 - 2;
        self.front.fill_rect(x, y, box_w, 5, PANEL_BG);
        let tx = x + (box_w - title.chars().count()) / 2;
        self.front.put_str(tx, y + 1, title, color, PANEL_BG);
        self.front.put_str(x + 3, y + 3, sub, DESC_C, PANEL_BG);
    }

    fn compose_menu(&mut self, menu: &MenuState, high_scores: &[u32]) {
        let box_w = 44_usize.min(self.front.width);
        let box_h = 22_usize.min(self.front.height.saturating_sub(MAP_ROW));
        let x = self.front.width.saturating_sub(box_w) / 2;
        let y = MAP_ROW + 1;
        self.front.fill_rect(x, y, box_w, box_h, PANEL_BG);

        self.front.put_str(x + 2, y + 1, "S N A K E   A R C A D E", HDR, PANEL_BG);

        let mut row = y + 3;
        for (i, &item) in menu.items.iter().enumerate() {
            let selected = i == menu.cursor;
            let marker = if selected { "▸ " } else { "  " };
            let fg = if selected { KEY_C } else { DESC_C };
            self.front.put_str(x + 2, row, &format!("{marker}{}", menu.label(item)), fg, PANEL_BG);
            row += 1;
        }

        if let Some(status) = &menu.status {
            self.front.put_str(x + 2, row + 1, status, MSG_BG, PANEL_BG);
        }

        let hs_row = y + 13;
        self.front.put_str(x + 2, hs_row, "High Scores", HDR, PANEL_BG);
        if high_scores.is_empty() {
            self.front.put_str(x + 4, hs_row + 1, "(none yet)", DESC_C, PANEL_BG);
        }
        for (i, s) in high_scores.iter().enumerate() {
            // two columns of five
            let (cx, cy) = if i < 5 { (x + 4, hs_row + 1 + i) } else { (x + 22, hs_row + 1 + i - 5) };
            self.front.put_str(cx, cy, &format!("{:>2}. {:>6}", i + 1, s), DESC_C, PANEL_BG);
        }
    }

    // ── Diff flush ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}
