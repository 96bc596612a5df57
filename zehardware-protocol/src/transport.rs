//! Transport encoding for command lines
//!
//! Line format:
//! - transport mode: standard base64 (padded) of `name:metadata:payload`
//! - debug mode (`diagnostic` builds): `debug:name:metadata:payload`
//!
//! Both modes require exactly three `:`-separated parts. Debug parts are
//! trimmed; transport parts are taken verbatim.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Separator between name, metadata and payload
pub const DELIMITER: char = ':';

/// Prefix of the unencoded debug form
pub const DEBUG_MARKER: &str = "debug:";

/// Number of parts in a command triple
pub const PART_COUNT: usize = 3;

/// Errors that can occur while decoding a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Nothing to decode
    Empty,
    /// Line is not valid base64
    Base64,
    /// Decoded bytes are not valid UTF-8
    Utf8,
    /// Decoded text does not split into exactly three parts
    PartCount(usize),
    /// Debug line does not split into exactly three parts
    DebugPartCount(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => f.write_str("empty command"),
            DecodeError::Base64 => f.write_str("invalid base64"),
            DecodeError::Utf8 => f.write_str("invalid UTF-8"),
            DecodeError::PartCount(n) => {
                write!(f, "invalid command format, expected 3 parts, got {}", n)
            }
            DecodeError::DebugPartCount(n) => {
                write!(f, "invalid debug command, expected 3 parts, got {}", n)
            }
        }
    }
}

/// An undecoded `name:metadata:payload` triple
///
/// The name is not validated here; see [`crate::Command`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCommand {
    /// Command name
    pub name: String,
    /// Free-form metadata (base64 text for `store-*`)
    pub metadata: String,
    /// Payload (base64 text for `preview` and `store-*`)
    pub payload: String,
}

impl RawCommand {
    /// Create a triple from its parts
    pub fn new(name: &str, metadata: &str, payload: &str) -> Self {
        Self {
            name: name.to_string(),
            metadata: metadata.to_string(),
            payload: payload.to_string(),
        }
    }

    /// Encode this triple in transport form (for host tools and testing)
    pub fn encode(&self) -> String {
        let mut plain = String::with_capacity(
            self.name.len() + self.metadata.len() + self.payload.len() + 2,
        );
        plain.push_str(&self.name);
        plain.push(DELIMITER);
        plain.push_str(&self.metadata);
        plain.push(DELIMITER);
        plain.push_str(&self.payload);
        STANDARD.encode(plain.as_bytes())
    }
}

/// Decode one normalized line into a command triple
///
/// The debug form is only recognized in `diagnostic` builds; in other
/// builds a `debug:` line is treated as (invalid) base64.
pub fn decode(line: &str) -> Result<RawCommand, DecodeError> {
    if line.is_empty() {
        return Err(DecodeError::Empty);
    }

    #[cfg(feature = "diagnostic")]
    if let Some(rest) = line.strip_prefix(DEBUG_MARKER) {
        return decode_debug(rest);
    }

    decode_transport(line)
}

/// Decode the base64 transport form
pub fn decode_transport(line: &str) -> Result<RawCommand, DecodeError> {
    let bytes = STANDARD
        .decode(line.as_bytes())
        .map_err(|_| DecodeError::Base64)?;
    let plain = String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)?;

    let parts: Vec<&str> = plain.split(DELIMITER).collect();
    match parts.as_slice() {
        [name, metadata, payload] => Ok(RawCommand::new(name, metadata, payload)),
        _ => Err(DecodeError::PartCount(parts.len())),
    }
}

/// Decode the unencoded debug form (marker already stripped)
#[cfg(any(feature = "diagnostic", test))]
pub fn decode_debug(rest: &str) -> Result<RawCommand, DecodeError> {
    let parts: Vec<&str> = rest.split(DELIMITER).collect();
    match parts.as_slice() {
        [name, metadata, payload] => Ok(RawCommand::new(
            name.trim(),
            metadata.trim(),
            payload.trim(),
        )),
        _ => Err(DecodeError::DebugPartCount(parts.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_transport_line() {
        // base64("blink::")
        let raw = decode("Ymxpbms6Og==").unwrap();
        assert_eq!(raw, RawCommand::new("blink", "", ""));
    }

    #[test]
    fn test_decode_keeps_parts_verbatim() {
        let line = RawCommand::new(" store-a", "bWV0YQ==", "cGF5 ").encode();
        let raw = decode(&line).unwrap();
        assert_eq!(raw.name, " store-a");
        assert_eq!(raw.payload, "cGF5 ");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
    }

    #[test]
    fn test_decode_bad_base64() {
        assert_eq!(decode("not base64!"), Err(DecodeError::Base64));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let line = STANDARD.encode([0xFFu8, 0xFE, b':', b':']);
        assert_eq!(decode(&line), Err(DecodeError::Utf8));
    }

    #[test]
    fn test_decode_wrong_part_count() {
        let two = STANDARD.encode("blink:");
        assert_eq!(decode(&two), Err(DecodeError::PartCount(2)));

        let four = STANDARD.encode("store-a:m:p:extra");
        assert_eq!(decode(&four), Err(DecodeError::PartCount(4)));
    }

    #[test]
    fn test_decode_debug_trims_parts() {
        let raw = decode_debug(" show-up : : ").unwrap();
        assert_eq!(raw, RawCommand::new("show-up", "", ""));
    }

    #[test]
    fn test_decode_debug_requires_three_parts() {
        assert_eq!(decode_debug("refresh"), Err(DecodeError::DebugPartCount(1)));
        assert_eq!(decode_debug("a:b:c:d"), Err(DecodeError::DebugPartCount(4)));
    }

    #[cfg(feature = "diagnostic")]
    #[test]
    fn test_debug_marker_accepted_in_diagnostic_builds() {
        let raw = decode("debug:terminal::").unwrap();
        assert_eq!(raw, RawCommand::new("terminal", "", ""));
    }

    #[cfg(not(feature = "diagnostic"))]
    #[test]
    fn test_debug_marker_rejected_in_release_builds() {
        assert_eq!(decode("debug:terminal::"), Err(DecodeError::Base64));
    }

    proptest! {
        #[test]
        fn prop_transport_roundtrip(
            name in "[a-z-]{0,12}",
            metadata in "[A-Za-z0-9+/=]{0,40}",
            payload in "[A-Za-z0-9+/= ]{0,200}",
        ) {
            let original = RawCommand::new(&name, &metadata, &payload);
            let decoded = decode(&original.encode());
            prop_assert_eq!(decoded, Ok(original));
        }

        #[test]
        fn prop_decode_never_panics(line in "\\PC{0,120}") {
            let _ = decode(&line);
        }

        #[test]
        fn prop_wrong_delimiter_count_rejected(parts in proptest::collection::vec("[a-z]{0,6}", 1..8)) {
            prop_assume!(parts.len() != PART_COUNT);
            let line = STANDARD.encode(parts.join(":"));
            prop_assume!(!line.is_empty());
            prop_assert_eq!(decode(&line), Err(DecodeError::PartCount(parts.len())));
        }
    }
}
