//! Board-agnostic core logic for the zehardware agent
//!
//! This crate contains everything that does not depend on a specific board:
//!
//! - Agent configuration and validation
//! - Console logging into the diagnostic terminal
//! - Image codec (base64 + zlib + MSB-first bit unpacking)
//! - Display manager with refresh cadence tracking
//! - Slot storage adapter
//! - Command dispatcher and the cooperative scheduler loop

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
pub mod console;

pub mod codec;
pub mod config;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod reader;
pub mod scheduler;
pub mod storage;

#[cfg(test)]
mod mock;

pub use config::{AgentConfig, ConfigError, DIAGNOSTIC};
pub use console::{Console, Level};
pub use display::{DisplayManager, RootContent};
pub use error::Error;
pub use scheduler::{Agent, Board, Flow, Peripherals, SchedulerState, Termination};
pub use storage::{SlotStorage, StorageError};
pub use zehardware_display::Resolution;
