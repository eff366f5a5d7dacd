//! Glyph sources and single-line text rendering for template construction.

use image::{GrayImage, Luma};

/// Supplies monochrome glyph cells for rendering reference text.
pub trait GlyphSource {
    /// Width and height of one glyph cell in font units.
    fn cell_size(&self) -> (u32, u32);

    /// Blank columns between neighbouring cells.
    fn spacing(&self) -> u32 {
        1
    }

    /// Whether the cell for `c` is inked at `(col, row)`.
    fn ink(&self, c: char, col: u32, row: u32) -> bool;
}

/// Built-in 5x7 bitmap font covering upper-case ASCII letters, digits and
/// common punctuation. Lower-case letters render as upper-case; anything
/// else renders as a blank cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitmapFont;

/// Rows top to bottom, bit 4 is the leftmost column.
fn glyph_rows(c: char) -> Option<[u8; 7]> {
    let rows = match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        _ => return None,
    };
    Some(rows)
}

impl GlyphSource for BitmapFont {
    fn cell_size(&self) -> (u32, u32) {
        (5, 7)
    }

    fn ink(&self, c: char, col: u32, row: u32) -> bool {
        match glyph_rows(c) {
            Some(rows) if row < 7 && col < 5 => rows[row as usize] & (0x10 >> col) != 0,
            _ => false,
        }
    }
}

/// Width and height in pixels of `text` rendered at `scale`.
pub fn text_extent<G: GlyphSource + ?Sized>(font: &G, text: &str, scale: u32) -> (u32, u32) {
    let (cw, ch) = font.cell_size();
    let n = text.chars().count() as u32;
    if n == 0 {
        return (0, 0);
    }
    ((n * (cw + font.spacing()) - font.spacing()) * scale, ch * scale)
}

/// Renders one line of text onto a fresh `canvas`-sized buffer.
///
/// Ink is drawn with brightness `fg` over `bg`, each font unit becoming a
/// `scale` x `scale` block with its top-left at `origin`. Anything falling
/// outside the canvas is dropped.
pub fn render_text<G: GlyphSource + ?Sized>(
    font: &G,
    text: &str,
    scale: u32,
    canvas: (u32, u32),
    origin: (u32, u32),
    bg: u8,
    fg: u8,
) -> GrayImage {
    let mut img = GrayImage::from_pixel(canvas.0, canvas.1, Luma([bg]));
    let (cw, ch) = font.cell_size();
    let advance = (cw + font.spacing()) * scale;

    for (i, c) in text.chars().enumerate() {
        let cell_x = origin.0 + i as u32 * advance;
        for row in 0..ch {
            for col in 0..cw {
                if !font.ink(c, col, row) {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = cell_x + col * scale + dx;
                        let y = origin.1 + row * scale + dy;
                        if x < canvas.0 && y < canvas.1 {
                            img.put_pixel(x, y, Luma([fg]));
                        }
                    }
                }
            }
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent() {
        assert_eq!(text_extent(&BitmapFont, "ONE", 2), ((3 * 6 - 1) * 2, 14));
        assert_eq!(text_extent(&BitmapFont, "", 3), (0, 0));
    }

    #[test]
    fn test_render_letter_t() {
        let img = render_text(&BitmapFont, "T", 1, (7, 9), (1, 1), 0, 255);
        // Top bar spans all five columns
        for x in 1..6 {
            assert_eq!(img.get_pixel(x, 1)[0], 255);
        }
        // Stem is the middle column only
        assert_eq!(img.get_pixel(3, 5)[0], 255);
        assert_eq!(img.get_pixel(2, 5)[0], 0);
        assert_eq!(img.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_lowercase_matches_uppercase() {
        let a = render_text(&BitmapFont, "abc", 2, (40, 20), (1, 1), 10, 200);
        let b = render_text(&BitmapFont, "ABC", 2, (40, 20), (1, 1), 10, 200);
        assert_eq!(a, b);
    }

    #[test]
    fn test_overflow_is_clipped() {
        let img = render_text(&BitmapFont, "WWWW", 3, (20, 10), (0, 0), 0, 255);
        assert_eq!(img.dimensions(), (20, 10));
    }
}
