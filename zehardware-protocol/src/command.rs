//! Command vocabulary
//!
//! The agent understands a closed set of command names. Names are
//! resolved through [`VOCABULARY`]; a triple whose name is not listed
//! never becomes a [`Command`].

use alloc::string::String;
use core::fmt;

use crate::transport::RawCommand;

/// Named image storage slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    A,
    B,
    C,
    Up,
    Down,
}

impl Slot {
    /// Slot identifier as used in command names and file names
    pub const fn as_str(self) -> &'static str {
        match self {
            Slot::A => "a",
            Slot::B => "b",
            Slot::C => "c",
            Slot::Up => "up",
            Slot::Down => "down",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command names the agent accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandName {
    Reload,
    Exit,
    Blink,
    Terminal,
    Preview,
    Refresh,
    Store(Slot),
    Show(Slot),
}

/// Lookup table of every accepted command name
pub const VOCABULARY: [CommandName; 16] = [
    CommandName::Reload,
    CommandName::Exit,
    CommandName::Blink,
    CommandName::Terminal,
    CommandName::Preview,
    CommandName::Refresh,
    CommandName::Store(Slot::A),
    CommandName::Store(Slot::B),
    CommandName::Store(Slot::C),
    CommandName::Store(Slot::Up),
    CommandName::Store(Slot::Down),
    CommandName::Show(Slot::A),
    CommandName::Show(Slot::B),
    CommandName::Show(Slot::C),
    CommandName::Show(Slot::Up),
    CommandName::Show(Slot::Down),
];

impl CommandName {
    /// Wire name of the command
    pub const fn as_str(self) -> &'static str {
        match self {
            CommandName::Reload => "reload",
            CommandName::Exit => "exit",
            CommandName::Blink => "blink",
            CommandName::Terminal => "terminal",
            CommandName::Preview => "preview",
            CommandName::Refresh => "refresh",
            CommandName::Store(Slot::A) => "store-a",
            CommandName::Store(Slot::B) => "store-b",
            CommandName::Store(Slot::C) => "store-c",
            CommandName::Store(Slot::Up) => "store-up",
            CommandName::Store(Slot::Down) => "store-down",
            CommandName::Show(Slot::A) => "show-a",
            CommandName::Show(Slot::B) => "show-b",
            CommandName::Show(Slot::C) => "show-c",
            CommandName::Show(Slot::Up) => "show-up",
            CommandName::Show(Slot::Down) => "show-down",
        }
    }

    /// Resolve a wire name against [`VOCABULARY`]
    pub fn lookup(name: &str) -> Option<Self> {
        VOCABULARY.iter().copied().find(|cmd| cmd.as_str() == name)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated command, ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Restart the firmware
    Reload,
    /// Stop the agent loop
    Exit,
    /// Toggle LED blinking
    Blink,
    /// Switch the display to the diagnostic terminal
    Terminal,
    /// Request a display refresh
    Refresh,
    /// Decode and show an image without storing it
    Preview { payload: String },
    /// Persist metadata and image payload into a slot
    Store {
        slot: Slot,
        metadata: String,
        payload: String,
    },
    /// Show the image stored in a slot
    Show { slot: Slot },
}

impl Command {
    /// Name this command was sent under
    pub fn name(&self) -> CommandName {
        match self {
            Command::Reload => CommandName::Reload,
            Command::Exit => CommandName::Exit,
            Command::Blink => CommandName::Blink,
            Command::Terminal => CommandName::Terminal,
            Command::Refresh => CommandName::Refresh,
            Command::Preview { .. } => CommandName::Preview,
            Command::Store { slot, .. } => CommandName::Store(*slot),
            Command::Show { slot } => CommandName::Show(*slot),
        }
    }
}

/// Name outside the command vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand {
    /// The rejected name
    pub name: String,
}

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown command '{}'", self.name)
    }
}

impl TryFrom<RawCommand> for Command {
    type Error = UnknownCommand;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        let Some(name) = CommandName::lookup(&raw.name) else {
            return Err(UnknownCommand { name: raw.name });
        };

        Ok(match name {
            CommandName::Reload => Command::Reload,
            CommandName::Exit => Command::Exit,
            CommandName::Blink => Command::Blink,
            CommandName::Terminal => Command::Terminal,
            CommandName::Refresh => Command::Refresh,
            CommandName::Preview => Command::Preview {
                payload: raw.payload,
            },
            CommandName::Store(slot) => Command::Store {
                slot,
                metadata: raw.metadata,
                payload: raw.payload,
            },
            CommandName::Show(slot) => Command::Show { slot },
        })
    }
}
