//! Console logging
//!
//! Human-readable messages go to two places: the diagnostic [`Terminal`]
//! scrollback (what the `terminal` command puts on screen) and, with the
//! `defmt` feature, the RTT log at the same level.
//!
//! ```text
//! log_info!(console, ...) ──► format once ──┬──► Terminal scrollback
//!                                           └──► defmt::info! (feature)
//! ```

use core::fmt::{self, Write};

use heapless::String;
use zehardware_display::Terminal;

use crate::config::DIAGNOSTIC;

/// Longest message kept; the rest is cut off
pub const MAX_MESSAGE_LEN: usize = 160;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

/// Log sink backed by the diagnostic terminal
#[derive(Debug, Default)]
pub struct Console {
    terminal: Terminal,
}

impl Console {
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
        }
    }

    /// Record a message
    ///
    /// Debug messages are dropped unless the build is diagnostic.
    pub fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        if level == Level::Debug && !DIAGNOSTIC {
            return;
        }

        let mut message: String<MAX_MESSAGE_LEN> = String::new();
        // Truncating never fails
        let _ = Truncating(&mut message).write_fmt(args);

        #[cfg(feature = "defmt")]
        match level {
            Level::Debug => defmt::debug!("{=str}", message.as_str()),
            Level::Info => defmt::info!("{=str}", message.as_str()),
            Level::Warn => defmt::warn!("{=str}", message.as_str()),
            Level::Error => defmt::error!("{=str}", message.as_str()),
        }

        self.terminal.push_line(&message);
    }

    /// Scrollback shown by the terminal view
    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }
}

/// Writer that stops at capacity instead of failing
struct Truncating<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}

macro_rules! log_debug {
    ($console:expr, $($arg:tt)*) => {
        $console.log($crate::console::Level::Debug, format_args!($($arg)*))
    };
}

macro_rules! log_info {
    ($console:expr, $($arg:tt)*) => {
        $console.log($crate::console::Level::Info, format_args!($($arg)*))
    };
}

macro_rules! log_warn {
    ($console:expr, $($arg:tt)*) => {
        $console.log($crate::console::Level::Warn, format_args!($($arg)*))
    };
}

macro_rules! log_error {
    ($console:expr, $($arg:tt)*) => {
        $console.log($crate::console::Level::Error, format_args!($($arg)*))
    };
}
