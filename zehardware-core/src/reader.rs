//! Serial line reader
//!
//! Drains whatever the serial driver has buffered into a [`LineBuffer`]
//! and returns the next complete line. A line that is still arriving stays
//! buffered across ticks until its terminator shows up; if that takes
//! longer than the read timeout the partial line is dropped.

use alloc::string::String;
use core::fmt;

use zehardware_hal::{Clock, SerialError, SerialLink};
use zehardware_protocol::{LineBuffer, LineError};

/// Bytes moved per driver read
const CHUNK_LEN: usize = 64;

/// Line reading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// Driver reported an error; the partial line is dropped
    Serial(SerialError),
    /// Received bytes do not form a usable line
    Line(LineError),
    /// Line terminator did not arrive within the read timeout
    Timeout,
}

impl From<SerialError> for ReadError {
    fn from(e: SerialError) -> Self {
        ReadError::Serial(e)
    }
}

impl From<LineError> for ReadError {
    fn from(e: LineError) -> Self {
        ReadError::Line(e)
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Serial(e) => write!(f, "{}", e),
            ReadError::Line(e) => write!(f, "{}", e),
            ReadError::Timeout => f.write_str("line not terminated in time"),
        }
    }
}

/// Per-tick line reader
pub struct LineReader {
    buffer: LineBuffer,
    timeout_ms: u64,
    /// Uptime at which the buffered partial line started arriving
    pending_since: Option<u64>,
}

impl LineReader {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            buffer: LineBuffer::new(),
            timeout_ms: u64::from(timeout_ms),
            pending_since: None,
        }
    }

    /// Whether part of a line is buffered
    pub fn is_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending_since = None;
    }

    /// Read until one complete line is available, or the link runs dry
    ///
    /// Returns `Ok(None)` when no complete line has arrived yet. Bytes past
    /// the first line are kept for the next call.
    pub fn poll<S, C>(&mut self, link: &mut S, clock: &C) -> Result<Option<String>, ReadError>
    where
        S: SerialLink,
        C: Clock,
    {
        let started = clock.now_ms();
        let mut chunk = [0u8; CHUNK_LEN];

        while !self.buffer.has_line() && link.bytes_available() {
            let count = match link.read_available(&mut chunk) {
                Ok(count) => count,
                Err(e) => {
                    self.reset();
                    return Err(e.into());
                }
            };
            if count == 0 {
                break;
            }
            self.pending_since.get_or_insert(started);
            if let Err(e) = self.buffer.extend(&chunk[..count]) {
                self.restart_pending(started);
                return Err(e.into());
            }

            if clock.now_ms().saturating_sub(started) >= self.timeout_ms {
                break;
            }
        }

        match self.buffer.take_line() {
            Ok(Some(line)) => {
                self.restart_pending(started);
                Ok(Some(line))
            }
            Ok(None) => self.expire(clock),
            Err(e) => {
                self.restart_pending(started);
                Err(e.into())
            }
        }
    }

    /// Leftover bytes belong to a new line that started at `now`
    fn restart_pending(&mut self, now: u64) {
        self.pending_since = if self.buffer.is_empty() {
            None
        } else {
            Some(now)
        };
    }

    fn expire<C: Clock>(&mut self, clock: &C) -> Result<Option<String>, ReadError> {
        let Some(since) = self.pending_since else {
            return Ok(None);
        };
        if self.buffer.is_empty() {
            self.pending_since = None;
            return Ok(None);
        }
        if clock.now_ms().saturating_sub(since) >= self.timeout_ms {
            self.reset();
            return Err(ReadError::Timeout);
        }
        Ok(None)
    }
}
