/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Scale the world (1000×1000 by default) onto the terminal grid
///   2. Paint the frame's `DrawCommand`s into the `front` buffer
///   3. Compare each cell with `back` buffer (previous frame)
///   4. Only emit terminal commands for cells that changed, batched with
///      `queue!` and flushed once at the end
///   5. Swap front/back
///
/// Screen layout:
///   row 0        HUD (level, health, stamina)
///   row 1        dialogue line
///   rows 2..h-1  playfield
///   row h-1      key help

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::WorldSize;
use crate::domain::physics::Rect;
use crate::sim::frame::{Banner, DrawCommand};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" cell, so the gap between
    /// rows matches the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    const fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: Cell::BASE_BG }
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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        self.put_str(self.width.saturating_sub(len) / 2, y, s, fg);
    }

    fn fill(&mut self, area: CellRect, cell: Cell) {
        for y in area.row..area.row + area.rows {
            for x in area.col..area.col + area.cols {
                self.set(x, y, cell);
            }
        }
    }
}

// ── Viewport: world units → terminal cells ──

const HUD_ROW: usize = 0;
const DIALOGUE_ROW: usize = 1;
const FIELD_ROW: usize = 2;
/// HUD + dialogue + help line.
const RESERVED_ROWS: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct CellRect {
    col: usize,
    row: usize,
    cols: usize,
    rows: usize,
}

#[derive(Clone, Copy, Debug)]
struct Viewport {
    world: WorldSize,
    cols: usize,
    rows: usize,
}

impl Viewport {
    fn new(world: WorldSize, term_w: usize, term_h: usize) -> Self {
        Viewport {
            world,
            cols: term_w.max(1),
            rows: term_h.saturating_sub(RESERVED_ROWS).max(1),
        }
    }

    fn col(&self, x: f64) -> usize {
        (x / self.world.width * self.cols as f64).floor().max(0.0) as usize
    }

    fn row(&self, y: f64) -> usize {
        (y / self.world.height * self.rows as f64).floor().max(0.0) as usize
    }

    /// Every rect covers at least one cell, clipped to the playfield.
    fn project(&self, r: &Rect) -> CellRect {
        let col = self.col(r.x).min(self.cols - 1);
        let row = self.row(r.y).min(self.rows - 1);
        let right = ((r.right() / self.world.width) * self.cols as f64).ceil() as usize;
        let bottom = ((r.bottom() / self.world.height) * self.rows as f64).ceil() as usize;
        CellRect {
            col,
            row: FIELD_ROW + row,
            cols: right.clamp(col + 1, self.cols) - col,
            rows: bottom.clamp(row + 1, self.rows) - row,
        }
    }
}

// ── Renderer ──

const HELP: &str = " A/D move · Shift dash · W climb · Enter/click continue · R restart · Esc quit";

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            enhanced_keys: false,
        }
    }

    /// Enter the alternate screen. Returns whether the terminal reports
    /// key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }
        tracing::debug!(enhanced_keys = self.enhanced_keys, "terminal initialised");

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, commands: &[DrawCommand], world: WorldSize) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        compose(&mut self.front, &Viewport::new(world, self.term_w, self.term_h), commands);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors, never ResetColor: the terminal default may
        // differ from BASE_BG.
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

// ── Compose: paint draw commands into a buffer ──

fn compose(buf: &mut FrameBuffer, view: &Viewport, commands: &[DrawCommand]) {
    // Notices stack upward from the actor's head
    let mut notice_row = FIELD_ROW;
    let mut notices = 0;

    for cmd in commands {
        match cmd {
            DrawCommand::Spike(r) => buf.fill(view.project(r), Cell::new('^', Color::Red)),
            DrawCommand::DropSpike { rect, landed: false } => {
                buf.fill(view.project(rect), Cell::new('v', Color::Magenta));
            }
            DrawCommand::DropSpike { rect, landed: true } => {
                buf.fill(view.project(rect), Cell::new('^', Color::DarkMagenta));
            }
            DrawCommand::Ladder(r) => buf.fill(view.project(r), Cell::new('H', Color::Yellow)),
            DrawCommand::Floor(r) => buf.fill(view.project(r), Cell::new('=', Color::Grey)),
            DrawCommand::Goal(r) => buf.fill(view.project(r), Cell::new('▓', Color::Green)),
            DrawCommand::Actor { rect, acting } => {
                let area = view.project(rect);
                let glyph = if *acting { '█' } else { '▒' };
                buf.fill(area, Cell::new(glyph, Color::Cyan));
                notice_row = area.row;
            }
            DrawCommand::Hud { level, health, stamina } => {
                let hud = format!(" Level {level}   Health {health}   Stamina {stamina}");
                buf.put_str(0, HUD_ROW, &hud, Color::White);
            }
            DrawCommand::Dialogue(line) => buf.put_str(1, DIALOGUE_ROW, line, Color::Yellow),
            DrawCommand::Notice { x, text } => {
                notices += 1;
                let row = notice_row.saturating_sub(notices).max(FIELD_ROW);
                buf.put_str(view.col(*x), row, text, Color::White);
            }
            DrawCommand::Banner(banner) => {
                let (text, fg) = match banner {
                    Banner::Cleared => ("Level cleared! Press R to continue.", Color::Green),
                    Banner::Stalled => ("Too weak to move. Press R to restart.", Color::Red),
                    Banner::BeyondLastLevel => ("No more levels. Thanks for playing!", Color::Cyan),
                };
                let mid = FIELD_ROW + view.rows / 2;
                buf.put_centered(mid, text, fg);
            }
        }
    }

    buf.put_str(0, buf.height.saturating_sub(1), HELP, Color::DarkGrey);
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: WorldSize = WorldSize { width: 1000.0, height: 1000.0 };

    #[test]
    fn projects_into_playfield() {
        // 100 cols × 50 playfield rows
        let view = Viewport::new(WORLD, 100, 53);
        let actor = view.project(&Rect::new(0.0, 850.0, 100.0, 150.0));
        assert_eq!(actor, CellRect { col: 0, row: FIELD_ROW + 42, cols: 10, rows: 8 });
    }

    #[test]
    fn tiny_rect_still_visible() {
        let view = Viewport::new(WORLD, 40, 20);
        let r = view.project(&Rect::new(500.0, 500.0, 1.0, 1.0));
        assert_eq!((r.cols, r.rows), (1, 1));
    }

    #[test]
    fn offscreen_rect_is_clipped() {
        let view = Viewport::new(WORLD, 40, 20);
        let r = view.project(&Rect::new(990.0, 990.0, 100.0, 100.0));
        assert!(r.col + r.cols <= 40);
        assert!(r.row + r.rows <= FIELD_ROW + view.rows);
    }

    #[test]
    fn hud_and_banner_are_painted() {
        let view = Viewport::new(WORLD, 80, 24);
        let mut buf = FrameBuffer::new(80, 24);
        compose(&mut buf, &view, &[
            DrawCommand::Hud { level: 2, health: 3.5, stamina: 97.0 },
            DrawCommand::Banner(Banner::Cleared),
        ]);
        let row = |y: usize| (0..80).map(|x| buf.get(x, y).ch).collect::<String>();
        assert!(row(HUD_ROW).contains("Level 2   Health 3.5   Stamina 97 "));
        assert!(!row(HUD_ROW).contains("97.00"));
        assert!(row(FIELD_ROW + view.rows / 2).contains("Level cleared!"));
        assert!(row(23).contains("R restart"));
    }

    #[test]
    fn notice_sits_above_actor() {
        let view = Viewport::new(WORLD, 100, 53);
        let mut buf = FrameBuffer::new(100, 53);
        compose(&mut buf, &view, &[
            DrawCommand::Actor { rect: Rect::new(0.0, 850.0, 100.0, 150.0), acting: true },
            DrawCommand::Notice { x: 0.0, text: "Ouch!".into() },
        ]);
        assert_eq!(buf.get(0, FIELD_ROW + 41).ch, 'O');
        assert_eq!(buf.get(0, FIELD_ROW + 42).ch, '█');
    }
}
