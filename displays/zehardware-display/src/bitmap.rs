//! Two-tone bitmaps
//!
//! A [`Bitmap`] always has the resolution of the panel it is shown on. Pixels
//! hold a palette index (0 or 1); the [`Palette`] maps indices to colors.

use alloc::vec;
use alloc::vec::Vec;

use embedded_graphics::pixelcolor::{BinaryColor, Rgb888, RgbColor};

/// Pixel dimensions of a display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
}

impl Resolution {
    /// Create a resolution
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Whether rows pack into whole bytes
    pub const fn is_byte_aligned(&self) -> bool {
        self.width % 8 == 0
    }

    /// Bytes per row of an MSB-first packed image
    pub const fn row_stride(&self) -> usize {
        (self.width as usize + 7) / 8
    }

    /// Bytes of an MSB-first packed image
    pub const fn packed_len(&self) -> usize {
        self.row_stride() * self.height as usize
    }
}

/// Two-entry color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb888; 2],
}

impl Palette {
    /// Index 0 black, index 1 white
    pub const TWO_TONE: Palette = Palette {
        colors: [Rgb888::BLACK, Rgb888::WHITE],
    };

    /// Create a palette from the off (index 0) and on (index 1) colors
    pub const fn new(off: Rgb888, on: Rgb888) -> Self {
        Self { colors: [off, on] }
    }

    /// Color for a palette index (any non-zero index selects entry 1)
    pub fn color(&self, index: u8) -> Rgb888 {
        self.colors[usize::from(index != 0)]
    }

    /// Color for a palette index as seen on a monochrome panel
    pub fn binary(&self, index: u8) -> BinaryColor {
        let color = self.color(index);
        let luma = (u32::from(color.r()) * 299
            + u32::from(color.g()) * 587
            + u32::from(color.b()) * 114)
            / 1000;
        if luma >= 128 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::TWO_TONE
    }
}

/// 1-bit image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    resolution: Resolution,
    /// Packed pixels, row-major, most significant bit first
    bits: Vec<u8>,
    palette: Palette,
}

impl Bitmap {
    /// Create an all-zero bitmap
    pub fn new(resolution: Resolution, palette: Palette) -> Self {
        Self {
            resolution,
            bits: vec![0; resolution.packed_len()],
            palette,
        }
    }

    /// Image dimensions
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Image palette
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn locate(&self, x: u16, y: u16) -> Option<(usize, u8)> {
        if x >= self.resolution.width || y >= self.resolution.height {
            return None;
        }
        let index = y as usize * self.resolution.row_stride() + x as usize / 8;
        let mask = 0x80 >> (x % 8);
        Some((index, mask))
    }

    /// Palette index at `(x, y)`, or `None` outside the image
    pub fn get(&self, x: u16, y: u16) -> Option<u8> {
        self.locate(x, y)
            .map(|(index, mask)| u8::from(self.bits[index] & mask != 0))
    }

    /// Set the palette index at `(x, y)`; out-of-range writes are ignored
    pub fn set(&mut self, x: u16, y: u16, value: u8) {
        if let Some((index, mask)) = self.locate(x, y) {
            if value != 0 {
                self.bits[index] |= mask;
            } else {
                self.bits[index] &= !mask;
            }
        }
    }

    /// Palette indices in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = u8> + '_ {
        let Resolution { width, height } = self.resolution;
        (0..height).flat_map(move |y| (0..width).map(move |x| self.get(x, y).unwrap_or(0)))
    }

    /// Packed rows (MSB first, `row_stride` bytes per row)
    pub fn as_packed(&self) -> &[u8] {
        &self.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut bitmap = Bitmap::new(Resolution::new(16, 2), Palette::TWO_TONE);
        bitmap.set(0, 0, 1);
        bitmap.set(9, 1, 1);
        assert_eq!(bitmap.get(0, 0), Some(1));
        assert_eq!(bitmap.get(1, 0), Some(0));
        assert_eq!(bitmap.get(9, 1), Some(1));
        assert_eq!(bitmap.as_packed(), &[0x80, 0x00, 0x00, 0x40]);

        bitmap.set(0, 0, 0);
        assert_eq!(bitmap.get(0, 0), Some(0));
    }

    #[test]
    fn test_out_of_range_access() {
        let mut bitmap = Bitmap::new(Resolution::new(8, 1), Palette::TWO_TONE);
        bitmap.set(8, 0, 1);
        assert_eq!(bitmap.get(8, 0), None);
        assert_eq!(bitmap.get(0, 1), None);
        assert_eq!(bitmap.as_packed(), &[0x00]);
    }

    #[test]
    fn test_resolution_packing() {
        let res = Resolution::new(128, 64);
        assert!(res.is_byte_aligned());
        assert_eq!(res.row_stride(), 16);
        assert_eq!(res.packed_len(), 1024);

        let odd = Resolution::new(12, 3);
        assert!(!odd.is_byte_aligned());
        assert_eq!(odd.row_stride(), 2);
    }

    #[test]
    fn test_two_tone_palette() {
        let palette = Palette::TWO_TONE;
        assert_eq!(palette.color(0), Rgb888::BLACK);
        assert_eq!(palette.color(1), Rgb888::WHITE);
        assert_eq!(palette.binary(0), BinaryColor::Off);
        assert_eq!(palette.binary(1), BinaryColor::On);
    }

    #[test]
    fn test_pixels_row_major() {
        let mut bitmap = Bitmap::new(Resolution::new(8, 2), Palette::TWO_TONE);
        bitmap.set(7, 0, 1);
        bitmap.set(0, 1, 1);
        let pixels: Vec<u8> = bitmap.pixels().collect();
        assert_eq!(pixels.len(), 16);
        assert_eq!(pixels[7], 1);
        assert_eq!(pixels[8], 1);
        assert_eq!(pixels.iter().filter(|&&p| p == 1).count(), 2);
    }
}
