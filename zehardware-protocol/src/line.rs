//! Line accumulation and normalization
//!
//! Bytes drained from the serial link are collected in a [`LineBuffer`]
//! until a CR or LF arrives, which may take several ticks for long lines.
//! Taking a line replaces every whitespace character with a space and trims
//! both ends. Bytes after the terminator stay buffered as the start of the
//! next line.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Maximum number of bytes accepted for a single line
pub const MAX_LINE_LEN: usize = 8 * 1024;

/// Errors that can occur while assembling a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line grew past [`MAX_LINE_LEN`] bytes without a terminator
    Overflow,
    /// Line is not valid UTF-8
    Utf8,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::Overflow => write!(f, "line longer than {} bytes", MAX_LINE_LEN),
            LineError::Utf8 => f.write_str("line is not valid UTF-8"),
        }
    }
}

fn is_terminator(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

/// Byte accumulator for incoming lines
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    /// Dropping the rest of an overlong line up to its terminator
    discarding: bool,
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            discarding: false,
        }
    }

    /// Append received bytes
    ///
    /// Fails with [`LineError::Overflow`] once the unterminated line exceeds
    /// [`MAX_LINE_LEN`]. The collected part is dropped and so is everything
    /// up to the next terminator.
    pub fn extend(&mut self, chunk: &[u8]) -> Result<(), LineError> {
        let mut chunk = chunk;
        if self.discarding {
            match chunk.iter().position(|&b| is_terminator(b)) {
                Some(end) => {
                    self.discarding = false;
                    chunk = &chunk[end..];
                }
                None => return Ok(()),
            }
        }
        self.bytes.extend_from_slice(chunk);

        let pending = self
            .bytes
            .iter()
            .position(|&b| is_terminator(b))
            .unwrap_or(self.bytes.len());
        if pending > MAX_LINE_LEN {
            if pending == self.bytes.len() {
                self.bytes.clear();
                self.discarding = true;
            } else {
                self.bytes.drain(..pending);
            }
            return Err(LineError::Overflow);
        }
        Ok(())
    }

    /// Whether a terminated line is waiting to be taken
    pub fn has_line(&self) -> bool {
        self.bytes.iter().any(|&b| is_terminator(b))
    }

    /// Whether no bytes are held
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && !self.discarding
    }

    /// Reset the buffer
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.discarding = false;
    }

    /// Take the next terminated line, normalized
    ///
    /// Blank lines are skipped. Returns `Ok(None)` while no complete line
    /// with content has arrived; an unterminated tail stays buffered.
    pub fn take_line(&mut self) -> Result<Option<String>, LineError> {
        while let Some(end) = self.bytes.iter().position(|&b| is_terminator(b)) {
            let rest = self.bytes.split_off(end + 1);
            let mut line = core::mem::replace(&mut self.bytes, rest);
            line.truncate(end);

            let text = String::from_utf8(line).map_err(|_| LineError::Utf8)?;
            if let Some(line) = normalize(&text) {
                // LF of a CR LF pair
                let blank = self.bytes.iter().take_while(|&&b| is_terminator(b)).count();
                self.bytes.drain(..blank);
                return Ok(Some(line));
            }
        }
        Ok(None)
    }
}

/// Replace whitespace with spaces and trim
///
/// Returns `None` if nothing is left.
pub fn normalize(text: &str) -> Option<String> {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(String::from(trimmed))
    }
}
