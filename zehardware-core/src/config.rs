//! Agent configuration
//!
//! All timing is expressed in milliseconds and converted to whole loop ticks
//! once, at startup. The firmware generates its [`AgentConfig`] from
//! `agent.toml` at build time; [`AgentConfig::DEFAULT`] mirrors the values
//! shipped there.

use core::fmt;

use zehardware_display::Resolution;

/// Whether this build carries the diagnostic surface
pub const DIAGNOSTIC: bool = cfg!(feature = "diagnostic");

/// Timing and display settings for the agent loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AgentConfig {
    /// Longest wait for the terminator of a partial line
    pub read_timeout_ms: u32,
    /// Loop tick period
    pub tick_period_ms: u32,
    /// Interval between keep-alive messages
    pub keep_alive_ms: u32,
    /// Interval between display refresh opportunities
    pub refresh_ms: u32,
    /// Characters kept when logging untrusted text
    pub preview_len: usize,
    /// Pause before acting on `reload` and `exit`
    pub exit_delay_ms: u32,
    /// Display resolution in pixels
    pub resolution: Resolution,
}

impl AgentConfig {
    pub const DEFAULT: AgentConfig = AgentConfig {
        read_timeout_ms: 2000,
        tick_period_ms: 300,
        keep_alive_ms: 5000,
        refresh_ms: 3000,
        preview_len: 10,
        exit_delay_ms: 500,
        resolution: Resolution::new(128, 64),
    };

    /// Check the configuration for values the loop cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.keep_alive_ms == 0 || self.refresh_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.preview_len <= zehardware_protocol::ELLIPSIS.len() {
            return Err(ConfigError::PreviewTooShort(self.preview_len));
        }
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(ConfigError::EmptyResolution);
        }
        if !self.resolution.is_byte_aligned() {
            return Err(ConfigError::UnalignedWidth(self.resolution.width));
        }
        Ok(())
    }

    /// Ticks between keep-alive messages
    pub const fn keep_alive_ticks(&self) -> u32 {
        interval_ticks(self.keep_alive_ms, self.tick_period_ms)
    }

    /// Ticks between refresh opportunities
    pub const fn refresh_ticks(&self) -> u32 {
        interval_ticks(self.refresh_ms, self.tick_period_ms)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whole ticks per interval, never less than one
const fn interval_ticks(interval_ms: u32, period_ms: u32) -> u32 {
    if period_ms == 0 {
        return 1;
    }
    let ticks = interval_ms / period_ms;
    if ticks == 0 {
        1
    } else {
        ticks
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Tick period is zero
    ZeroTickPeriod,
    /// Keep-alive or refresh interval is zero
    ZeroInterval,
    /// Preview length leaves no room around the ellipsis
    PreviewTooShort(usize),
    /// Width or height is zero
    EmptyResolution,
    /// Width is not a multiple of 8
    UnalignedWidth(u16),
    /// Panel resolution differs from the configured one
    PanelMismatch,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTickPeriod => f.write_str("tick period must be non-zero"),
            ConfigError::ZeroInterval => f.write_str("intervals must be non-zero"),
            ConfigError::PreviewTooShort(len) => {
                write!(f, "preview length {} must exceed 3", len)
            }
            ConfigError::EmptyResolution => f.write_str("resolution must be non-zero"),
            ConfigError::UnalignedWidth(width) => {
                write!(f, "width {} is not a multiple of 8", width)
            }
            ConfigError::PanelMismatch => {
                f.write_str("panel resolution differs from configuration")
            }
        }
    }
}
