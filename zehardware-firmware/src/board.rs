//! Raspberry Pi Pico wiring
//!
//! ```text
//!  USB         CDC-ACM         command link
//!  GP4 / GP5   I2C0 SDA / SCL  SH1106 128x64 OLED
//!  GP25        LED             indicator
//!  flash       last 256K       slot files
//! ```

use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;

use zehardware_core::Board;
use zehardware_hal_rp2040::flash::FlashFiles;
use zehardware_hal_rp2040::gpio::Led;
use zehardware_hal_rp2040::sh1106::Sh1106;
use zehardware_hal_rp2040::time::UptimeClock;
use zehardware_hal_rp2040::usb::UsbLink;

/// Pico with an SH1106 OLED on I2C0
pub struct PicoBoard;

impl Board for PicoBoard {
    type Serial = UsbLink;
    type Led = Led<'static>;
    type Panel = Sh1106<I2c<'static, I2C0, Async>>;
    type Files = FlashFiles<'static>;
    type Clock = UptimeClock;
}
