//! Onboard LED

use embassy_rp::gpio::Output;

use zehardware_hal::OutputPin;

/// Indicator LED on a push-pull output
pub struct Led<'d> {
    pin: Output<'d>,
}

impl<'d> Led<'d> {
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl OutputPin for Led<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn toggle(&mut self) {
        self.pin.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
