//! Aggregate error type for command handlers

use core::fmt;

use zehardware_display::DisplayError;
use zehardware_protocol::DecodeError;

use crate::codec::CodecError;
use crate::reader::ReadError;
use crate::storage::StorageError;

/// Any failure that ends the handling of one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Serial line could not be read
    Read(ReadError),
    /// Line is not a well-formed command
    Decode(DecodeError),
    /// Image payload could not be decoded
    Codec(CodecError),
    /// Slot files could not be read or written
    Storage(StorageError),
    /// Panel refresh failed
    Display(DisplayError),
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Error::Read(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Error::Display(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Read(e) => write!(f, "read: {}", e),
            Error::Decode(e) => write!(f, "decode: {}", e),
            Error::Codec(e) => write!(f, "image: {}", e),
            Error::Storage(e) => write!(f, "storage: {}", e),
            Error::Display(e) => write!(f, "display: {}", e),
        }
    }
}
