//! zehardware Hardware Abstraction Layer
//!
//! This crate defines the narrow hardware interfaces the command agent
//! talks to. Chip-specific crates implement them, and the core crate is
//! tested against in-memory implementations of the same traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  zehardware-core (agent, scheduler)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  zehardware-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ zehardware-   │
//!             │  hal-rp2040   │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Indicator LED
//! - [`serial::SerialLink`] - Command line transport
//! - [`storage::FileStore`] - Persistent named blobs
//! - [`time::Clock`], [`time::Ticker`] - Uptime and loop cadence

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod serial;
pub mod storage;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use serial::{SerialError, SerialLink};
pub use storage::{FileError, FileKey, FileStore, MAX_FILE_NAME_LEN};
pub use time::{Clock, Ticker};
