//! Serial link abstractions
//!
//! Commands arrive as text lines on a byte stream. The agent never waits
//! for bytes: each tick it drains whatever the driver has buffered.

/// Errors from the serial link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Host went away; bytes in flight were lost
    Disconnected,
}

impl core::fmt::Display for SerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SerialError::Disconnected => f.write_str("host disconnected"),
        }
    }
}

/// Non-blocking serial receiver
pub trait SerialLink {
    /// Whether a host is attached to the other end of the link
    fn is_connected(&self) -> bool;

    /// Whether bytes are buffered and can be read without waiting
    fn bytes_available(&mut self) -> bool;

    /// Read buffered bytes into `buf`
    ///
    /// Returns the number of bytes copied. Must not block when
    /// [`SerialLink::bytes_available`] returned `true`.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;
}
