//! Cooperative agent loop
//!
//! One task, one fixed-period loop. Every tick runs the same steps in
//! order:
//!
//! ```text
//!  ┌──────────────┐   ┌──────────┐   ┌─────────────────┐   ┌──────────┐
//!  │ keep-alive   │──►│ LED step │──►│ read + dispatch │──►│ refresh  │──► tick += 1
//!  │ (cadence)    │   │          │   │ (≤ 1 command)   │   │ (if due) │
//!  └──────────────┘   └──────────┘   └─────────────────┘   └──────────┘
//! ```
//!
//! All mutable state lives in the [`Agent`], so handlers never share data
//! with anything else and no locking is involved.

use alloc::string::String;

use embedded_hal_async::delay::DelayNs;
use zehardware_display::DisplayPanel;
use zehardware_hal::{Clock, FileStore, OutputPin, SerialLink, Ticker};

use crate::config::{AgentConfig, ConfigError, DIAGNOSTIC};
use crate::console::Console;
use crate::display::{DisplayManager, RootContent};
use crate::reader::LineReader;
use crate::storage::SlotStorage;

/// Hardware a board provides to the agent
pub trait Board {
    type Serial: SerialLink;
    type Led: OutputPin;
    type Panel: DisplayPanel;
    type Files: FileStore;
    type Clock: Clock;
}

/// Board peripherals handed to [`Agent::new`]
pub struct Peripherals<B: Board> {
    pub serial: B::Serial,
    pub led: B::Led,
    pub panel: B::Panel,
    pub files: B::Files,
    pub clock: B::Clock,
}

/// Snapshot of the loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerState {
    pub tick: u32,
    pub refresh_due: bool,
    pub blink_enabled: bool,
    pub led_on: bool,
}

/// What the loop does after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flow {
    Continue,
    Reload,
    Exit,
}

/// Why [`Agent::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Termination {
    /// Restart the firmware
    Reload,
    /// Stop and idle
    Exit,
}

/// The agent: loop state plus every peripheral it drives
pub struct Agent<B: Board> {
    pub(crate) config: AgentConfig,
    pub(crate) tick: u32,
    pub(crate) blink_enabled: bool,
    keep_alive_ticks: u32,
    pub(crate) console: Console,
    reader: LineReader,
    pub(crate) display: DisplayManager<B::Panel>,
    pub(crate) storage: SlotStorage<B::Files>,
    serial: B::Serial,
    led: B::Led,
    clock: B::Clock,
}

impl<B: Board> Agent<B> {
    /// Validate `config` against the board and boot the agent
    pub fn new(config: AgentConfig, peripherals: Peripherals<B>) -> Result<Self, ConfigError> {
        config.validate()?;
        if peripherals.panel.resolution() != config.resolution {
            return Err(ConfigError::PanelMismatch);
        }

        let root = if DIAGNOSTIC {
            RootContent::Terminal
        } else {
            RootContent::Blank
        };

        let mut console = Console::new();
        log_info!(console, "-----");
        log_info!(console, "Running in serial mode.");

        Ok(Self {
            config,
            tick: 0,
            blink_enabled: false,
            keep_alive_ticks: config.keep_alive_ticks(),
            console,
            reader: LineReader::new(config.read_timeout_ms),
            display: DisplayManager::new(peripherals.panel, root, config.refresh_ticks()),
            storage: SlotStorage::new(peripherals.files),
            serial: peripherals.serial,
            led: peripherals.led,
            clock: peripherals.clock,
        })
    }

    /// Run ticks until a command ends the loop
    ///
    /// `ticker` paces the loop; `delay` provides the pause before
    /// returning.
    pub async fn run<T, D>(&mut self, ticker: &mut T, delay: &mut D) -> Termination
    where
        T: Ticker,
        D: DelayNs,
    {
        loop {
            ticker.next().await;
            let termination = match self.tick().await {
                Flow::Continue => continue,
                Flow::Reload => Termination::Reload,
                Flow::Exit => Termination::Exit,
            };
            delay.delay_ms(self.config.exit_delay_ms).await;
            return termination;
        }
    }

    /// Run one loop iteration
    pub async fn tick(&mut self) -> Flow {
        if self.tick % self.keep_alive_ticks == 0 {
            self.keep_alive();
        }
        self.blink_step();

        if let Some(line) = self.read_line() {
            let flow = self.dispatch_line(&line).await;
            if flow != Flow::Continue {
                return flow;
            }
        }

        self.display
            .refresh_if_due(self.tick, &mut self.console)
            .await;
        self.tick = self.tick.wrapping_add(1);
        Flow::Continue
    }

    fn keep_alive(&mut self) {
        let seconds = self.clock.now_ms() / 1000;
        log_info!(
            self.console,
            "Awaiting commands... (--:{:02}:{:02})",
            (seconds / 60) % 60,
            seconds % 60
        );
    }

    fn blink_step(&mut self) {
        if self.blink_enabled {
            self.led.toggle();
        } else {
            self.led.set_low();
        }
    }

    fn read_line(&mut self) -> Option<String> {
        if !self.serial.is_connected() {
            log_debug!(self.console, "No serial connection, skipping read");
            return None;
        }
        match self.reader.poll(&mut self.serial, &self.clock) {
            Ok(line) => line,
            Err(e) => {
                log_warn!(self.console, "Failed to read command. Reason: {}", e);
                None
            }
        }
    }

    /// Current loop state
    pub fn state(&self) -> SchedulerState {
        SchedulerState {
            tick: self.tick,
            refresh_due: self.display.refresh_due(),
            blink_enabled: self.blink_enabled,
            led_on: self.led.is_set_high(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn display(&self) -> &DisplayManager<B::Panel> {
        &self.display
    }

    pub fn storage(&self) -> &SlotStorage<B::Files> {
        &self.storage
    }

    pub fn serial_mut(&mut self) -> &mut B::Serial {
        &mut self.serial
    }

    pub fn clock(&self) -> &B::Clock {
        &self.clock
    }
}
