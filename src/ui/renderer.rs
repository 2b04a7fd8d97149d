/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the frame (HUD, border, cells, help line) into the
///      `front` buffer
///   2. Compare each cell with `back` (the previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// Terminal acquisition is scoped: raw mode, alternate screen and
/// cursor-hide are taken in `init()`, released in `cleanup()`, and
/// `Drop` re-runs the release so every exit path (quit, error, panic)
/// leaves the terminal usable.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
    tty::IsTty,
};

use crate::config::DisplayConfig;
use crate::domain::grid::Grid;
use crate::sim::world::{Display, HudInfo};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::Reset };

    /// Sentinel used to invalidate the back buffer: differs from any
    /// real cell, so every position will be diff'd on the next frame.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell { ch, fg });
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Vertical layout: HUD on row 0, a blank row, then the bordered field,
/// another blank row, then the key help line.
const FIELD_ROW: usize = 2;
/// Left margin in terminal columns.
const MARGIN: usize = 1;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    alive_ch: char,
    dead_ch: char,
    /// Raw mode currently held; makes cleanup idempotent.
    acquired: bool,
}

impl Renderer {
    pub fn new(display: &DisplayConfig) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            alive_ch: display.alive,
            dead_ch: display.dead,
            acquired: false,
        }
    }

    /// Acquire the terminal. Refuses to start when stdout is not a
    /// terminal — the loop must never run against a pipe.
    pub fn init(&mut self) -> io::Result<()> {
        if !io::stdout().is_tty() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdout is not a terminal",
            ));
        }

        terminal::enable_raw_mode()?;
        self.acquired = true;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    /// Release the terminal. Safe to call more than once.
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.acquired {
            return Ok(());
        }
        self.acquired = false;
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, grid: &Grid, hud: &HudInfo) {
        let w = grid.width();
        let h = grid.height();

        // ── HUD row ──
        let hud_line = format!(
            " Game of Life   gen {:<6}  alive {:<5}  delay {}ms",
            hud.generation,
            hud.population,
            hud.delay_us / 1000,
        );
        self.front.put_str(0, 0, &hud_line, Color::White);
        if hud.paused {
            self.front.put_str(hud_line.chars().count() + 2, 0, "PAUSED", Color::Yellow);
        }

        // ── Bordered field ──
        let horizontal: String = "-".repeat(w);
        let top = format!("+{horizontal}+");
        self.front.put_str(MARGIN, FIELD_ROW, &top, Color::DarkGrey);
        for row in 0..h {
            let y = FIELD_ROW + 1 + row;
            self.front.put_str(MARGIN, y, "|", Color::DarkGrey);
            for col in 0..w {
                let cell = if grid.get(row, col) {
                    Cell { ch: self.alive_ch, fg: Color::Green }
                } else {
                    Cell { ch: self.dead_ch, fg: Color::Reset }
                };
                self.front.set(MARGIN + 1 + col, y, cell);
            }
            self.front.put_str(MARGIN + 1 + w, y, "|", Color::DarkGrey);
        }
        self.front.put_str(MARGIN, FIELD_ROW + 1 + h, &top, Color::DarkGrey);

        // ── Help line ──
        self.front.put_str(
            MARGIN,
            FIELD_ROW + h + 3,
            "[p]ause  [n]ew seed  [+/-] delay  [q]uit",
            Color::DarkGrey,
        );
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::Reset;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, SetForegroundColor(Color::Reset))?;

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

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

impl Display for Renderer {
    fn render(&mut self, grid: &Grid, hud: &HudInfo) -> io::Result<()> {
        // Detect terminal resize → full repaint.
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose(grid, hud);
        self.flush_diff()?;

        // Swap: current front becomes next back.
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }
}

impl Drop for Renderer {
    /// Last-chance terminal restore; covers panics and early returns.
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
