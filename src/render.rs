use crate::assets::Sprite;
use crate::config::Settings;
use crate::model::{Point, Rect, Rgb};
use crate::sim::Game;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

const LETTERBOX: Rgb = Rgb::new(0, 0, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

/* -----------------------------
   Pixel canvas: the drawing surface
------------------------------ */

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Rgb>,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![LETTERBOX; (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn get(&self, x: u32, y: u32) -> Rgb {
        self.px[self.idx(x, y)]
    }
    pub(crate) fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    /// Pixel index range covered by `[a, b)` in canvas units, clipped to `[lo, hi)`.
    fn span(a: f32, b: f32, lo: i64, hi: i64) -> std::ops::Range<u32> {
        let start = (a.round() as i64).max(lo).max(0);
        let end = (b.round() as i64).min(hi);
        if end <= start {
            return 0..0;
        }
        start as u32..end as u32
    }

    /// Fills every pixel whose centre lies in `r` (canvas units), within `clip`.
    pub(crate) fn fill_rect(&mut self, r: Rect, clip: Rect, c: Rgb) {
        let (xs, ys) = self.clip_spans(r, clip);
        for y in ys {
            for x in xs.clone() {
                let i = self.idx(x, y);
                self.px[i] = c;
            }
        }
    }

    pub(crate) fn fill_circle(&mut self, center: Point, radius: f32, clip: Rect, c: Rgb) {
        if radius <= 0.0 {
            return;
        }
        let bbox = Rect::centered(center, radius * 2.0, radius * 2.0);
        let (xs, ys) = self.clip_spans(bbox, clip);
        let r2 = radius * radius;
        for y in ys {
            let dy = y as f32 + 0.5 - center.y;
            for x in xs.clone() {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= r2 {
                    let i = self.idx(x, y);
                    self.px[i] = c;
                }
            }
        }
    }

    /// Nearest-neighbour scaled draw of `sprite` into `dest`, alpha over.
    pub(crate) fn blit(&mut self, sprite: &Sprite, dest: Rect, clip: Rect) {
        if dest.w <= 0.0 || dest.h <= 0.0 || sprite.width() == 0 || sprite.height() == 0 {
            return;
        }
        let (xs, ys) = self.clip_spans(dest, clip);
        let sx_scale = sprite.width() as f32 / dest.w;
        let sy_scale = sprite.height() as f32 / dest.h;
        for y in ys {
            let sy = ((y as f32 + 0.5 - dest.top) * sy_scale) as u32;
            for x in xs.clone() {
                let sx = ((x as f32 + 0.5 - dest.left) * sx_scale) as u32;
                let [r, g, b, a] = sprite.texel(sx, sy);
                if a == 0 {
                    continue;
                }
                let i = self.idx(x, y);
                self.px[i] = blend_over(self.px[i], Rgb::new(r, g, b), a);
            }
        }
    }

    fn clip_spans(&self, r: Rect, clip: Rect) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let xs = Self::span(
            r.left.max(clip.left),
            r.right().min(clip.right()),
            0,
            self.w as i64,
        );
        let ys = Self::span(
            r.top.max(clip.top),
            r.bottom().min(clip.bottom()),
            0,
            self.h as i64,
        );
        (xs, ys)
    }
}

fn blend_over(dst: Rgb, src: Rgb, alpha: u8) -> Rgb {
    let a = alpha as u32;
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
    Rgb::new(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b))
}

/* -----------------------------
   World <-> canvas mapping
------------------------------ */

/// Uniform scale of the play area onto the canvas, centred.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    pub(crate) world_w: f32,
    pub(crate) world_h: f32,
    pub(crate) scale: f32,
    pub(crate) ox: f32,
    pub(crate) oy: f32,
}

impl Viewport {
    pub(crate) fn fit(world_w: f32, world_h: f32, canvas_w: u32, canvas_h: u32) -> Self {
        let scale = (canvas_w as f32 / world_w).min(canvas_h as f32 / world_h);
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            0.0
        };
        Self {
            world_w,
            world_h,
            scale,
            ox: (canvas_w as f32 - world_w * scale) / 2.0,
            oy: (canvas_h as f32 - world_h * scale) / 2.0,
        }
    }

    pub(crate) fn to_canvas(&self, p: Point) -> Point {
        Point::new(self.ox + p.x * self.scale, self.oy + p.y * self.scale)
    }

    pub(crate) fn rect_to_canvas(&self, r: Rect) -> Rect {
        let tl = self.to_canvas(Point::new(r.left, r.top));
        Rect {
            left: tl.x,
            top: tl.y,
            w: r.w * self.scale,
            h: r.h * self.scale,
        }
    }

    /// The play area in canvas units.
    pub(crate) fn area(&self) -> Rect {
        self.rect_to_canvas(Rect {
            left: 0.0,
            top: 0.0,
            w: self.world_w,
            h: self.world_h,
        })
    }

    /// Canvas point back to the play area; `None` in the letterbox.
    pub(crate) fn to_world(&self, p: Point) -> Option<Point> {
        if self.scale <= 0.0 {
            return None;
        }
        let w = Point::new((p.x - self.ox) / self.scale, (p.y - self.oy) / self.scale);
        let inside = Rect {
            left: 0.0,
            top: 0.0,
            w: self.world_w,
            h: self.world_h,
        }
        .contains(w);
        inside.then_some(w)
    }

    /// Terminal cell to the play-area point under the cell's centre.
    pub(crate) fn cell_to_world(&self, column: u16, row: u16) -> Option<Point> {
        let px = column as f32 * 2.0 + 1.0;
        let py = row as f32 * 4.0 + 2.0;
        self.to_world(Point::new(px, py))
    }
}

/* -----------------------------
   Scene
------------------------------ */

pub(crate) fn draw_scene(canvas: &mut PixelCanvas, game: &Game, settings: &Settings, vp: Viewport) {
    canvas.clear(LETTERBOX);
    let area = vp.area();

    canvas.fill_rect(area, area, settings.background);

    let bar = Rect {
        left: 0.0,
        top: 0.0,
        w: settings.width,
        h: settings.menu_bar_height,
    };
    canvas.fill_rect(vp.rect_to_canvas(bar), area, settings.menu_bar_colour);

    for b in &game.buttons {
        let sprite = game.assets().sprite(b.kind());
        canvas.blit(sprite, vp.rect_to_canvas(b.bounds()), area);
    }

    if let Some(item) = &game.item {
        let sprite = game.assets().sprite(item.kind());
        canvas.blit(sprite, vp.rect_to_canvas(item.bounds()), area);
    }

    let pet = &game.pet;
    canvas.fill_circle(
        vp.to_canvas(pet.pos()),
        pet.health() as f32 * vp.scale,
        area,
        pet.color(),
    );
}

/* -----------------------------
   Two-tone braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

fn term_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Each cell takes its most common pixel colour as background; the other
/// pixels become braille dots in their average colour.
pub(crate) fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer) {
    let cols = out.w as u32;
    let rows = out.h as u32;

    for cy in 0..rows {
        for cx in 0..cols {
            let mut block: [Option<Rgb>; 8] = [None; 8];
            for dy in 0..4 {
                for dx in 0..2 {
                    let (x, y) = (cx * 2 + dx, cy * 4 + dy);
                    if x < canvas.w && y < canvas.h {
                        block[(dy * 2 + dx) as usize] = Some(canvas.get(x, y));
                    }
                }
            }

            let base = dominant(&block).unwrap_or(LETTERBOX);

            let mut mask: u8 = 0;
            let (mut sr, mut sg, mut sb, mut n) = (0u32, 0u32, 0u32, 0u32);
            for (i, p) in block.iter().enumerate() {
                let Some(p) = p else { continue };
                if *p == base {
                    continue;
                }
                mask |= braille_bit(i as u32 % 2, i as u32 / 2);
                sr += p.r as u32;
                sg += p.g as u32;
                sb += p.b as u32;
                n += 1;
            }

            let cell = if n == 0 {
                Cell {
                    ch: ' ',
                    fg: Color::White,
                    bg: term_color(base),
                }
            } else {
                Cell {
                    ch: char::from_u32(0x2800 + mask as u32).unwrap_or(' '),
                    fg: term_color(Rgb::new((sr / n) as u8, (sg / n) as u8, (sb / n) as u8)),
                    bg: term_color(base),
                }
            };
            out.set(cx as u16, cy as u16, cell);
        }
    }
}

fn dominant(block: &[Option<Rgb>; 8]) -> Option<Rgb> {
    let mut best: Option<(Rgb, usize)> = None;
    for p in block.iter().flatten() {
        let count = block.iter().flatten().filter(|q| *q == p).count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((*p, count));
        }
    }
    best.map(|(p, _)| p)
}

/* -----------------------------
   Terminal
------------------------------ */

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
}

impl Terminal {
    /// The returned value owns the terminal state; if setup fails part way,
    /// the partially built guard is dropped and restores the screen.
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let mut term = Self::with_size(io::stdout(), cols, rows);
        terminal::enable_raw_mode()?;
        execute!(
            term.out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        Ok(term)
    }

    fn with_size(out: io::Stdout, cols: u16, rows: u16) -> Self {
        Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            // Braille: 2×4 pixels per cell
            canvas: PixelCanvas::new(cols as u32 * 2, rows as u32 * 4),
        }
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        log::debug!("terminal resized to {c}x{r}");
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.canvas = PixelCanvas::new(c as u32 * 2, r as u32 * 4);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn viewport(&self, settings: &Settings) -> Viewport {
        Viewport::fit(settings.width, settings.height, self.canvas.w, self.canvas.h)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        canvas_to_cells(&self.canvas, &mut self.cur);

        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            DisableMouseCapture,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
