//! Bitmap text rendering for decoy canvases.
//!
//! Text is drawn with the 8x8 glyphs from `font8x8`, scaled up by an integer
//! factor, word-wrapped to 95% of the canvas width and centered as a block.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

/// Glyph cell size in font pixels.
const GLYPH: u32 = 8;

/// Vertical distance between consecutive lines, in font pixels.
const LINE_PITCH: u32 = 10;

pub const INK: Rgb<u8> = Rgb([0, 0, 0]);
pub const PAPER: Rgb<u8> = Rgb([255, 255, 255]);

/// Preferred glyph scale for a text of `chars` characters.
///
/// Long texts get smaller letters: the font height is `1000 / chars^0.45 + 1`
/// pixels.
pub fn glyph_scale(chars: usize) -> u32 {
    if chars == 0 {
        return 3;
    }
    let font_px = 1000.0 / (chars as f64).powf(0.45) + 1.0;
    ((font_px / GLYPH as f64) as u32).max(1)
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut used = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        if used > 0 && used + 1 + chars.len() <= width {
            current.push(' ');
            current.extend(chars);
            used = current.chars().count();
            continue;
        }
        if used > 0 {
            lines.push(std::mem::take(&mut current));
        }

        while chars.len() > width {
            lines.push(chars.drain(..width).collect());
        }
        used = chars.len();
        current = chars.into_iter().collect();
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Characters per line at `scale` on a canvas `width` pixels wide.
fn line_capacity(width: u32, scale: u32) -> usize {
    ((width as u64 * 95 / 100) / u64::from(GLYPH * scale)).max(1) as usize
}

fn block_height(lines: usize, scale: u32) -> u64 {
    if lines == 0 {
        return 0;
    }
    (lines as u64 * u64::from(LINE_PITCH) - u64::from(LINE_PITCH - GLYPH)) * u64::from(scale)
}

/// Picks the glyph scale and line breaks for `text` on a `width` x `height`
/// canvas, shrinking the preferred scale until the block fits vertically.
pub fn layout(text: &str, width: u32, height: u32) -> (u32, Vec<String>) {
    let widest = (width * 95 / 100 / GLYPH).max(1);
    let mut scale = glyph_scale(text.chars().count()).min(widest);

    loop {
        let lines = wrap_text(text, line_capacity(width, scale));
        if scale == 1 || block_height(lines.len(), scale) <= u64::from(height) {
            return (scale, lines);
        }
        scale -= 1;
    }
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or_default()
}

fn fill_cell(image: &mut RgbImage, x: i64, y: i64, scale: u32, color: Rgb<u8>) {
    for dy in 0..i64::from(scale) {
        for dx in 0..i64::from(scale) {
            let (px, py) = (x + dx, y + dy);
            if px >= 0 && py >= 0 && px < i64::from(image.width()) && py < i64::from(image.height()) {
                image.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// Draws one line with its top-left corner at (x, y). Pixels falling outside
/// the canvas are clipped.
fn draw_line(image: &mut RgbImage, line: &str, x: i64, y: i64, scale: u32) {
    let cell = i64::from(GLYPH * scale);
    for (i, ch) in line.chars().enumerate() {
        let left = x + i as i64 * cell;
        for (row, &bits) in glyph(ch).iter().enumerate() {
            // Bit 0 is the leftmost column
            for col in 0..GLYPH {
                if (bits >> col) & 1 == 1 {
                    let s = i64::from(scale);
                    fill_cell(image, left + i64::from(col) * s, y + row as i64 * s, scale, INK);
                }
            }
        }
    }
}

/// Renders `text` centered on `image`.
pub fn render_text(image: &mut RgbImage, text: &str) {
    let (width, height) = image.dimensions();
    let (scale, lines) = layout(text, width, height);

    let top = (i64::from(height) - block_height(lines.len(), scale) as i64) / 2;
    let pitch = i64::from(LINE_PITCH * scale);

    for (n, line) in lines.iter().enumerate() {
        let line_width = (line.chars().count() as u64 * u64::from(GLYPH * scale)) as i64;
        let left = (i64::from(width) - line_width) / 2;
        draw_line(image, line, left, top + n as i64 * pitch, scale);
    }
}

/// A white canvas with `text` rendered on it.
pub fn text_canvas(width: u32, height: u32, text: &str) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, PAPER);
    render_text(&mut image, text);
    image
}
