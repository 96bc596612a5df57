//! Serial Line Command Protocol
//!
//! This crate defines the text protocol spoken between a host and the
//! zehardware agent over a serial link. Every command is one line.
//!
//! # Protocol Overview
//!
//! A line carries a `name:metadata:payload` triple, wrapped in standard
//! base64 for transport:
//! ```text
//! base64( <name> ":" <metadata> ":" <payload> ) CR LF
//! ```
//!
//! Builds with the `diagnostic` feature also accept the unencoded form
//! `debug:<name>:<metadata>:<payload>`, which is convenient from a terminal.
//!
//! The name must belong to a closed vocabulary ([`CommandName`]); anything
//! else is rejected when the triple is turned into a [`Command`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod command;
pub mod line;
pub mod preview;
pub mod transport;

pub use command::{Command, CommandName, Slot, UnknownCommand, VOCABULARY};
pub use line::{LineBuffer, LineError, MAX_LINE_LEN};
pub use preview::{preview, Preview, ELLIPSIS};
pub use transport::{decode, DecodeError, RawCommand, DEBUG_MARKER, DELIMITER};
