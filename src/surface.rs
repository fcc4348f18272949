//! Render targets. The simulation draws in virtual pixels; the terminal canvas packs two
//! square dots into each cell with the lower half block character.

use crate::Rgb;
use std::io::{self, Write};

/// Virtual pixels covered by one dot, on each axis.
pub const DOT_SIZE: f32 = 8.0;

/// Anything the field can draw itself onto.
pub trait Canvas {
    /// Fill the whole canvas with one colour.
    fn clear(&mut self, colour: Rgb);

    /// Blend a filled circle over the canvas. Coordinates and radius are virtual pixels.
    /// An `alpha` of 0 draws nothing.
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, colour: Rgb, alpha: u8);
}

/// Mix `over` onto `under` with `alpha` in 0..=255.
pub fn blend(under: Rgb, over: Rgb, alpha: u8) -> Rgb {
    let a = u16::from(alpha);
    let inv = 255 - a;
    let mix = |u: u8, o: u8| ((u16::from(u) * inv + u16::from(o) * a + 127) / 255) as u8;
    (mix(under.0, over.0), mix(under.1, over.1), mix(under.2, over.2))
}

pub struct HalfBlockCanvas {
    width: usize,
    height: usize,
    dots: Vec<Rgb>,
    output_buf: Vec<u8>,
}

impl HalfBlockCanvas {
    /// A canvas covering `cols` by `rows` terminal cells.
    pub fn new(cols: usize, rows: usize) -> Self {
        let width = cols;
        let height = rows * 2;
        Self {
            width,
            height,
            dots: vec![(0, 0, 0); width * height],
            output_buf: Vec::with_capacity(width * height * 25),
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.width = cols;
        self.height = rows * 2;
        self.dots = vec![(0, 0, 0); self.width * self.height];
    }

    /// Width in dots.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in dots.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of the virtual screen in pixels.
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * DOT_SIZE
    }

    /// Height of the virtual screen in pixels.
    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * DOT_SIZE
    }

    pub fn dot(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.dots[y * self.width + x])
        } else {
            None
        }
    }

    fn blend_dot(&mut self, x: i64, y: i64, colour: Rgb, alpha: u8) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        let idx = y as usize * self.width + x as usize;
        self.dots[idx] = blend(self.dots[idx], colour, alpha);
        true
    }

    /// Write the frame to `out` as rows of half blocks: the top dot of each cell is the
    /// background colour and the bottom dot the foreground colour.
    pub fn present<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        for y in (0..self.height).step_by(2) {
            let mut prev_top: Option<Rgb> = None;
            let mut prev_bot: Option<Rgb> = None;

            for x in 0..self.width {
                let top = self.dots[y * self.width + x];
                let bot = if y + 1 < self.height {
                    self.dots[(y + 1) * self.width + x]
                } else {
                    top
                };

                if prev_top != Some(top) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = Some(top);
                }
                if prev_bot != Some(bot) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = Some(bot);
                }

                self.output_buf.extend_from_slice("▄".as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            if y + 2 < self.height {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        out.write_all(&self.output_buf)?;
        out.flush()
    }
}

impl Canvas for HalfBlockCanvas {
    fn clear(&mut self, colour: Rgb) {
        self.dots.fill(colour);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, colour: Rgb, alpha: u8) {
        if alpha == 0 || !x.is_finite() || !y.is_finite() {
            return;
        }

        let cx = x / DOT_SIZE;
        let cy = y / DOT_SIZE;
        let r = radius.max(0.0) / DOT_SIZE;
        let r2 = r * r;

        let x0 = ((cx - r).floor() as i64).max(0);
        let x1 = ((cx + r).ceil() as i64).min(self.width as i64 - 1);
        let y0 = ((cy - r).floor() as i64).max(0);
        let y1 = ((cy + r).ceil() as i64).min(self.height as i64 - 1);

        let mut touched = false;
        for dy in y0..=y1 {
            for dx in x0..=x1 {
                let px = dx as f32 + 0.5 - cx;
                let py = dy as f32 + 0.5 - cy;
                if px * px + py * py <= r2 {
                    touched |= self.blend_dot(dx, dy, colour, alpha);
                }
            }
        }

        // Circles smaller than a dot still light the dot they sit in
        if !touched {
            self.blend_dot(cx.floor() as i64, cy.floor() as i64, colour, alpha);
        }
    }
}
