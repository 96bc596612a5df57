//! Page-organized frame buffer
//!
//! SH1106/SSD1306 style controllers address their RAM in pages: each page
//! is a horizontal band 8 pixels tall, and each byte in a page is one
//! column of that band with the top pixel in bit 0.
//!
//! ```text
//!          x=0   x=1   x=2  ...
//! page 0  [b0]  [b0]  [b0]      y=0
//!         [b1]  [b1]  [b1]      y=1
//!          ...                  ...
//!         [b7]  [b7]  [b7]      y=7
//! page 1  [b0]  ...             y=8
//! ```

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

/// 1-bit frame buffer with `PAGES` pages of `WIDTH` columns
pub struct PageBuffer<const WIDTH: usize, const PAGES: usize> {
    pages: [[u8; WIDTH]; PAGES],
}

impl<const WIDTH: usize, const PAGES: usize> Default for PageBuffer<WIDTH, PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const WIDTH: usize, const PAGES: usize> PageBuffer<WIDTH, PAGES> {
    pub const HEIGHT: usize = PAGES * 8;

    /// Create a cleared buffer
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    /// Column bytes of one page
    pub fn page(&self, page: usize) -> &[u8; WIDTH] {
        &self.pages[page]
    }

    /// Whether the pixel at `(x, y)` is lit
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < Self::HEIGHT && self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }

    fn set(&mut self, x: usize, y: usize, on: bool) {
        let mask = 1 << (y % 8);
        let column = &mut self.pages[y / 8][x];
        if on {
            *column |= mask;
        } else {
            *column &= !mask;
        }
    }
}

impl<const WIDTH: usize, const PAGES: usize> OriginDimensions for PageBuffer<WIDTH, PAGES> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, Self::HEIGHT as u32)
    }
}

impl<const WIDTH: usize, const PAGES: usize> DrawTarget for PageBuffer<WIDTH, PAGES> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x < WIDTH && y < Self::HEIGHT {
                self.set(x, y, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        for page in self.pages.iter_mut() {
            page.fill(fill);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Frame;
    use crate::bitmap::{Bitmap, Palette, Resolution};
    use crate::render::render;

    type Oled = PageBuffer<128, 8>;

    #[test]
    fn test_pixel_to_page_bit() {
        let mut buffer = Oled::new();
        Pixel(Point::new(5, 0), BinaryColor::On).draw(&mut buffer).unwrap();
        Pixel(Point::new(5, 9), BinaryColor::On).draw(&mut buffer).unwrap();

        assert_eq!(buffer.page(0)[5], 0b0000_0001);
        assert_eq!(buffer.page(1)[5], 0b0000_0010);
        assert!(buffer.is_set(5, 9));
        assert!(!buffer.is_set(5, 8));
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut buffer = Oled::new();
        Pixel(Point::new(-1, 3), BinaryColor::On).draw(&mut buffer).unwrap();
        Pixel(Point::new(128, 3), BinaryColor::On).draw(&mut buffer).unwrap();
        Pixel(Point::new(3, 64), BinaryColor::On).draw(&mut buffer).unwrap();
        assert!((0..8).all(|p| buffer.page(p).iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_clear() {
        let mut buffer = Oled::new();
        buffer.clear(BinaryColor::On).unwrap();
        assert!(buffer.is_set(127, 63));
        buffer.clear(BinaryColor::Off).unwrap();
        assert!(!buffer.is_set(127, 63));
    }

    #[test]
    fn test_rendered_bitmap_matches_pixels() {
        let mut bitmap = Bitmap::new(Resolution::new(128, 64), Palette::TWO_TONE);
        bitmap.set(0, 0, 1);
        bitmap.set(127, 63, 1);
        bitmap.set(64, 17, 1);

        let mut buffer = Oled::new();
        render(Frame::Image(&bitmap), &mut buffer).unwrap();

        for y in 0..64u16 {
            for x in 0..128u16 {
                assert_eq!(
                    buffer.is_set(x.into(), y.into()),
                    bitmap.get(x, y) == Some(1),
                    "pixel ({}, {})",
                    x,
                    y
                );
            }
        }
    }
}
