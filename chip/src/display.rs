//! The monochrome bitmap the programs draw onto.
use crate::definitions::display::{HEIGHT, WIDTH};

/// The amount the sprite byte has to be shifted so that its most
/// significant bit lands on column zero.
const SPRITE_SHIFT: u32 = (WIDTH - 8) as u32;

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`. Every row is stored as a single `u64`, the leftmost column is the
/// most significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Framebuffer {
    rows: [u64; HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Will turn every pixel off
    pub fn clear(&mut self) {
        self.rows = [0; HEIGHT];
    }

    /// The raw row masks
    pub fn rows(&self) -> &[u64; HEIGHT] {
        &self.rows
    }

    /// Will return the state of the pixel at the given coordinate,
    /// any coordinate outside of the display is off.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        (self.rows[y] >> (WIDTH - 1 - x)) & 1 == 1
    }

    /// Will expand the bitmap into rows of pixel states
    pub fn to_pixels(&self) -> Vec<Vec<bool>> {
        (0..HEIGHT)
            .map(|y| (0..WIDTH).map(|x| self.pixel(x, y)).collect())
            .collect()
    }

    /// XORs the sprite rows into the display with the top left corner at `(x, y)`.
    ///
    /// Rows below the display are clipped and columns right of the display are
    /// dropped, nothing wraps around. Returns true if any pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;

        for (offset, &line) in sprite.iter().enumerate() {
            let row = y as usize + offset;
            if row >= HEIGHT {
                break;
            }

            let mask = Self::row_mask(line, x);
            collision |= self.rows[row] & mask != 0;
            self.rows[row] ^= mask;
        }

        collision
    }

    /// Moves the sprite byte to start at column `x`
    fn row_mask(line: u8, x: u8) -> u64 {
        let line = line as u64;
        let x = x as u32;
        if x <= SPRITE_SHIFT {
            line << (SPRITE_SHIFT - x)
        } else {
            // bits beyond the last column are dropped
            line.checked_shr(x - SPRITE_SHIFT).unwrap_or(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_GLYPH: [u8; 5] = [0xF0, 0x90, 0x90, 0x90, 0xF0];

    #[test]
    fn test_draw_glyph_top_left() {
        let mut display = Framebuffer::new();
        assert!(!display.draw_sprite(0, 0, &ZERO_GLYPH));

        for (row, expected) in ZERO_GLYPH.iter().enumerate() {
            assert_eq!(display.rows()[row] >> 56, *expected as u64);
            assert_eq!(display.rows()[row] & 0x00FF_FFFF_FFFF_FFFF, 0);
        }
        assert!(display.pixel(0, 0));
        assert!(!display.pixel(1, 1));
        assert!(display.pixel(3, 4));
    }

    #[test]
    fn test_draw_twice_erases() {
        let mut display = Framebuffer::new();
        display.draw_sprite(10, 3, &ZERO_GLYPH);
        assert!(display.draw_sprite(10, 3, &ZERO_GLYPH));
        assert_eq!(display, Framebuffer::new());
    }

    #[test]
    fn test_columns_are_clipped() {
        let mut display = Framebuffer::new();
        display.draw_sprite(60, 0, &[0xFF]);
        assert_eq!(display.rows()[0], 0x0F);
        // nothing leaks into the next row
        assert_eq!(display.rows()[1], 0);

        let mut display = Framebuffer::new();
        display.draw_sprite(200, 0, &[0xFF]);
        assert_eq!(display.rows()[0], 0);
    }

    #[test]
    fn test_rows_are_clipped() {
        let mut display = Framebuffer::new();
        display.draw_sprite(0, 30, &ZERO_GLYPH);
        assert_eq!(display.rows()[30] >> 56, 0xF0);
        assert_eq!(display.rows()[31] >> 56, 0x90);
        // no wrap to the top
        assert_eq!(display.rows()[0], 0);
        assert_eq!(display.rows()[1], 0);
    }

    #[test]
    fn test_clear() {
        let mut display = Framebuffer::new();
        display.draw_sprite(5, 5, &[0xAA, 0x55]);
        display.clear();
        assert_eq!(display, Framebuffer::new());
        display.clear();
        assert_eq!(display, Framebuffer::new());
    }

    #[test]
    fn test_to_pixels() {
        let mut display = Framebuffer::new();
        display.draw_sprite(62, 31, &[0xC0]);
        let pixels = display.to_pixels();
        assert_eq!(pixels.len(), HEIGHT);
        assert_eq!(pixels[0].len(), WIDTH);
        assert!(pixels[31][62] && pixels[31][63]);
        assert_eq!(pixels.iter().flatten().filter(|p| **p).count(), 2);
    }
}
