//! Shared frame renderer
//!
//! Draws a [`Frame`] onto any monochrome embedded-graphics target. Panel
//! drivers render into their own frame buffer and flush it afterwards.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

use crate::backend::Frame;
use crate::bitmap::Bitmap;
use crate::terminal::Terminal;

/// Pixel height of one terminal row
pub const LINE_HEIGHT: i32 = 10;

/// Clear `target` and draw `frame` on it
pub fn render<D>(frame: Frame<'_>, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;
    match frame {
        Frame::Blank => Ok(()),
        Frame::Terminal(terminal) => draw_terminal(terminal, target),
        Frame::Image(bitmap) => draw_bitmap(bitmap, target),
    }
}

fn draw_terminal<D>(terminal: &Terminal, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    for (row, line) in terminal.lines().enumerate() {
        let origin = Point::new(0, row as i32 * LINE_HEIGHT);
        Text::with_baseline(line, origin, style, Baseline::Top).draw(target)?;
    }
    Ok(())
}

fn draw_bitmap<D>(bitmap: &Bitmap, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let resolution = bitmap.resolution();
    let area = Rectangle::new(
        Point::zero(),
        Size::new(u32::from(resolution.width), u32::from(resolution.height)),
    );
    let palette = bitmap.palette();
    target.fill_contiguous(&area, bitmap.pixels().map(|index| palette.binary(index)))
}
