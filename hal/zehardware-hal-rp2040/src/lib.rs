//! RP2040-specific HAL for the zehardware agent
//!
//! This crate provides RP2040 implementations of the `zehardware-hal` and
//! `zehardware-display` traits:
//!
//! - Flash-backed file store (implements `zehardware_hal::FileStore`)
//! - USB CDC-ACM command link (implements `zehardware_hal::SerialLink`)
//! - Onboard LED output
//! - SH1106 I2C OLED panel (implements `zehardware_display::DisplayPanel`)
//! - Embassy-backed clock and tick source

#![no_std]

pub mod flash;
pub mod gpio;
pub mod sh1106;
pub mod time;
pub mod usb;

// Re-export shared traits from zehardware-hal for convenience
pub use zehardware_hal::{FileKey, FileStore};
