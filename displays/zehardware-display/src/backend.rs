//! Display panel trait
//!
//! Defines the interface the agent uses to put a frame on the physical
//! display.

use core::fmt;

use crate::bitmap::{Bitmap, Resolution};
use crate::terminal::Terminal;

/// Display panel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Display not initialized
    NotInitialized,
    /// Image does not match the panel resolution
    ResolutionMismatch,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DisplayError::Communication => "display communication failed",
            DisplayError::NotInitialized => "display not initialized",
            DisplayError::ResolutionMismatch => "image does not match panel resolution",
        };
        f.write_str(text)
    }
}

/// Content for one refresh
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    /// Nothing on screen
    Blank,
    /// Diagnostic text view
    Terminal(&'a Terminal),
    /// Two-tone image
    Image(&'a Bitmap),
}

impl Frame<'_> {
    /// Check that the frame can be drawn on a panel of `resolution`
    pub fn fits(&self, resolution: Resolution) -> Result<(), DisplayError> {
        match self {
            Frame::Image(bitmap) if bitmap.resolution() != resolution => {
                Err(DisplayError::ResolutionMismatch)
            }
            _ => Ok(()),
        }
    }
}

/// Physical display panel
///
/// Refreshing is slow on most panels (and very slow on e-paper), so the
/// agent calls [`DisplayPanel::refresh`] only on its refresh cadence.
pub trait DisplayPanel {
    /// Pixel resolution of the panel
    fn resolution(&self) -> Resolution;

    /// Draw `frame` and push it to the hardware
    fn refresh(
        &mut self,
        frame: Frame<'_>,
    ) -> impl core::future::Future<Output = Result<(), DisplayError>>;
}
