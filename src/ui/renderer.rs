/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the session; it never mutates game state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::entity::Position;
use crate::domain::tile::Tile;
use crate::sim::session::{Session, Stage};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };
const CRIMSON: Color = Color::Rgb { r: 122, g: 31, b: 43 };
const CRIMSON_TEXT: Color = Color::Rgb { r: 190, g: 60, b: 75 };
const WALL_BG: Color = Color::Rgb { r: 42, g: 0, b: 6 };
const PATH_BG: Color = Color::Rgb { r: 17, g: 17, b: 17 };
const DIM: Color = Color::Rgb { r: 170, g: 170, b: 170 };

const PLAYER_GLYPH: char = '👧';
const GOAL_GLYPH: char = '🏰';
const TRAP_GLYPH: &str = "🧛\u{200d}♀\u{fe0f}";

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 16], // up to 16 bytes (fits ZWJ emoji sequences)
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // occupies 2 terminal columns
    cont: bool, // right half of a wide char (skip when printing)
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 16],
        ch_len: 0,
        fg: Color::White,
        bg: BASE_BG,
        wide: false,
        cont: true,
    };

    /// Differs from every real cell, so a back buffer filled with it
    /// forces a full repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = bg;
        cell
    }

    fn from_char_wide(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::from_char(c, fg, bg);
        cell.wide = true;
        cell
    }

    /// Wide cell from a multi-codepoint string (ZWJ emoji).
    fn from_str_wide(s: &str, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let bytes = s.as_bytes();
        let len = bytes.len().min(16);
        cell.ch[..len].copy_from_slice(&bytes[..len]);
        cell.ch_len = len as u8;
        cell.bg = bg;
        cell.wide = true;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("?")
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

    /// Place a wide glyph and its continuation cell.
    fn set_wide(&mut self, x: usize, y: usize, cell: Cell) {
        if x + 1 < self.width {
            self.set(x, y, cell);
            self.set(x + 1, y, Cell::WIDE_CONT);
        }
    }

    /// Cells of `self` that differ from `prev`, row-major. Continuation
    /// cells are never yielded; a wide cell is yielded when either of its
    /// halves changed.
    fn changes<'a>(&'a self, prev: &'a FrameBuffer) -> impl Iterator<Item = (usize, usize, Cell)> + 'a {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter_map(move |(x, y)| {
                let cell = self.get(x, y);
                if cell.cont {
                    return None;
                }
                let dirty = cell != prev.get(x, y)
                    || (cell.wide && self.get(x + 1, y) != prev.get(x + 1, y));
                dirty.then_some((x, y, cell))
            })
    }

    /// Write a string at (x, y). Hangul and other East Asian wide chars
    /// take two columns; zero-width chars are dropped.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut col = x;
        for ch in s.chars() {
            match ch.width() {
                Some(2) => {
                    if col + 1 >= self.width { break; }
                    self.set_wide(col, y, Cell::from_char_wide(ch, fg, bg));
                    col += 2;
                }
                Some(1) => {
                    if col >= self.width { break; }
                    self.set(col, y, Cell::from_char(ch, fg, bg));
                    col += 1;
                }
                _ => {}
            }
        }
    }

    /// Write a string horizontally centered on row `y`.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.width()) / 2;
        self.put_str(x, y, s, fg, bg);
    }
}

// ── Renderer ──

/// Each maze cell is 2 terminal columns wide so emoji fit.
const CELL_W: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_stage: Option<Stage>,
    ticket_url: String,
}

impl Renderer {
    pub fn new(ticket_url: &str) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_stage: None,
            ticket_url: ticket_url.to_string(),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Forget the previous frame so the next render repaints everything.
    /// Call after a new session replaces the old one.
    pub fn invalidate(&mut self) {
        self.last_stage = None;
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        // Stage change: clear for a clean transition
        if self.last_stage != Some(session.stage()) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
            self.last_stage = Some(session.stage());
        }

        self.front.clear();
        match session.stage() {
            Stage::Intro => self.compose_intro(session),
            Stage::Maze => self.compose_maze(session),
            Stage::Result => self.compose_result(session),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.cells.fill(Cell::INVALID);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        // Where the terminal cursor sits after the last print.
        let mut cursor: Option<(usize, usize)> = None;
        let mut fg = Color::White;
        let mut bg = BASE_BG;

        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer, SetForegroundColor(fg), SetBackgroundColor(bg))?;

        for (x, y, cell) in self.front.changes(&self.back) {
            if cursor != Some((x, y)) {
                queue!(self.writer, MoveTo(x as u16, y as u16))?;
            }
            if cell.fg != fg {
                fg = cell.fg;
                queue!(self.writer, SetForegroundColor(fg))?;
            }
            if cell.bg != bg {
                bg = cell.bg;
                queue!(self.writer, SetBackgroundColor(bg))?;
            }
            queue!(self.writer, Print(cell.as_str()))?;
            cursor = Some((x + if cell.wide { 2 } else { 1 }, y));
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_intro(&mut self, s: &Session) {
        // Lay out against the full text so lines don't shift while typing.
        let full_lines = s.full_narration().lines().count().max(1);
        let block_h = full_lines + 3;
        let top = self.front.height.saturating_sub(block_h) / 2;
        let widest = s.full_narration().lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let left = self.front.width.saturating_sub(widest) / 2;

        for (i, line) in s.narration().split('\n').enumerate() {
            self.front.put_str(left, top + i, line, CRIMSON_TEXT, BASE_BG);
        }

        if s.can_proceed() {
            let button = "  저택으로 가기  [Enter]  ";
            self.front.put_centered(top + full_lines + 2, button, Color::Black, CRIMSON);
        }
    }

    fn compose_maze(&mut self, s: &Session) {
        let maze = s.maze();
        let grid_w = maze.width() * CELL_W;
        let block_h = maze.height() + 5; // HUD + gap + grid + gap + help
        let top = self.front.height.saturating_sub(block_h) / 2;
        let left = self.front.width.saturating_sub(grid_w) / 2;

        let hud = format!("시간: {:>3}초    함정: {}", s.elapsed_secs(), s.trap_count());
        self.front.put_centered(top, &hud, Color::White, BASE_BG);

        let grid_top = top + 2;
        for y in 0..maze.height() {
            for x in 0..maze.width() {
                let col = left + x * CELL_W;
                self.compose_cell(s, Position::new(x, y), col, grid_top + y);
            }
        }

        let help_row = grid_top + maze.height() + 1;
        self.front.put_centered(help_row, "방향키 / WASD / 패드로 이동", DIM, BASE_BG);
        self.front.put_centered(help_row + 1, "Esc: 종료", DIM, BASE_BG);
    }

    /// One maze cell (2 columns). A sprung trap shows over the player
    /// standing on it.
    fn compose_cell(&mut self, s: &Session, p: Position, col: usize, row: usize) {
        let bg = match s.maze().tile_at(p) {
            Tile::Wall => WALL_BG,
            Tile::Path => PATH_BG,
        };

        if s.is_revealed(p) {
            self.front.set_wide(col, row, Cell::from_str_wide(TRAP_GLYPH, bg));
        } else if s.player() == p {
            self.front.set_wide(col, row, Cell::from_char_wide(PLAYER_GLYPH, Color::White, bg));
        } else if s.maze().goal() == p {
            self.front.set_wide(col, row, Cell::from_char_wide(GOAL_GLYPH, Color::White, bg));
        } else {
            self.front.set(col, row, Cell::from_char(' ', Color::White, bg));
            self.front.set(col + 1, row, Cell::from_char(' ', Color::White, bg));
        }
    }

    fn compose_result(&mut self, s: &Session) {
        let lines: [(String, Color); 12] = [
            ("저택에 도착하셨습니다".into(), Color::White),
            (String::new(), Color::White),
            (format!("소요 시간: {}초", s.elapsed_secs()), Color::White),
            (format!("함정 밟은 횟수: {}", s.trap_count()), Color::White),
            (String::new(), Color::White),
            ("무사히 뱀파이어의 저택을 방문하고 나서".into(), DIM),
            ("벌어지는 일이 궁금하다면?".into(), DIM),
            ("연극 [뱀파이어를 이해하는 특별한 방법]".into(), Color::White),
            ("많은 관심 부탁드립니다.".into(), DIM),
            (String::new(), Color::White),
            (format!("예매: {}", self.ticket_url), CRIMSON_TEXT),
            (String::new(), Color::White),
        ];

        let top = self.front.height.saturating_sub(lines.len() + 1) / 2;
        for (i, (text, fg)) in lines.iter().enumerate() {
            if !text.is_empty() {
                self.front.put_centered(top + i, text, *fg, BASE_BG);
            }
        }
        self.front.put_centered(top + lines.len(), "[Enter] 다시 하기    [Esc] 종료", DIM, BASE_BG);
    }
}
