//! Display surfaces and panel abstraction for zehardware
//!
//! This crate provides:
//! - `Bitmap` and `Palette` for two-tone images at panel resolution
//! - `Terminal`, the scrollback text surface used as the diagnostic view
//! - `DisplayPanel` trait for the physical display
//! - `render`, which draws any [`Frame`] onto an embedded-graphics target
//! - `PageBuffer`, the frame buffer layout of SH1106-class OLED controllers
//!
//! # Architecture
//!
//! The agent decides *what* is on screen (a [`Frame`]); panel drivers only
//! know how to push pixels. Drivers implement `DrawTarget<Color = BinaryColor>`
//! for their frame buffer and call [`render`] from `DisplayPanel::refresh`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod backend;
pub mod bitmap;
pub mod page;
pub mod render;
pub mod terminal;

// Re-export key types
pub use backend::{DisplayError, DisplayPanel, Frame};
pub use bitmap::{Bitmap, Palette, Resolution};
pub use page::PageBuffer;
pub use render::render;
pub use terminal::{Terminal, TERMINAL_COLS, TERMINAL_ROWS};
