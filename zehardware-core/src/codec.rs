//! Image codec
//!
//! Payloads travel as text and are stored compressed. Decoding runs three
//! stages:
//!
//! ```text
//! base64 text ──► zlib stream ──► packed rows ──► Bitmap
//!   (STANDARD)     (inflate)       (1 bpp, MSB first)
//! ```
//!
//! Packed rows are `width / 8` bytes each; pixel `(x, y)` is bit
//! `7 - x % 8` of byte `y * (width / 8) + x / 8`. Bytes past the last row
//! are ignored.

use alloc::string::String;
use core::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use miniz_oxide::deflate::compress_to_vec_zlib;
use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;
use zehardware_display::{Bitmap, Palette, Resolution};

/// Upper bound on inflated payload size
pub const MAX_INFLATED_LEN: usize = 64 * 1024;

/// Compression level used by [`encode`]
const COMPRESSION_LEVEL: u8 = 9;

/// Image decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Payload is not valid base64
    Base64,
    /// Payload is not a valid zlib stream (or inflates past the limit)
    Inflate,
    /// Inflated data is shorter than one full image
    Undersized { expected: usize, actual: usize },
    /// Width is not a multiple of 8
    UnalignedWidth(u16),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Base64 => f.write_str("invalid base64"),
            CodecError::Inflate => f.write_str("invalid zlib data"),
            CodecError::Undersized { expected, actual } => {
                write!(f, "expected {} bytes, got {}", expected, actual)
            }
            CodecError::UnalignedWidth(width) => {
                write!(f, "width {} is not a multiple of 8", width)
            }
        }
    }
}

/// Decode a transport payload into a two-tone bitmap
pub fn decode(payload: &str, resolution: Resolution) -> Result<Bitmap, CodecError> {
    if !resolution.is_byte_aligned() {
        return Err(CodecError::UnalignedWidth(resolution.width));
    }
    let compressed = STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| CodecError::Base64)?;
    let packed = decompress_to_vec_zlib_with_limit(&compressed, MAX_INFLATED_LEN)
        .map_err(|_| CodecError::Inflate)?;
    unpack(&packed, resolution)
}

/// Turn packed rows into a bitmap
pub fn unpack(packed: &[u8], resolution: Resolution) -> Result<Bitmap, CodecError> {
    if !resolution.is_byte_aligned() {
        return Err(CodecError::UnalignedWidth(resolution.width));
    }
    let stride = resolution.width as usize / 8;
    let required = stride * resolution.height as usize;
    if packed.len() < required {
        return Err(CodecError::Undersized {
            expected: required,
            actual: packed.len(),
        });
    }

    let mut bitmap = Bitmap::new(resolution, Palette::TWO_TONE);
    for y in 0..resolution.height {
        for x in 0..resolution.width {
            let byte = packed[y as usize * stride + x as usize / 8];
            let bit_index = 7 - (x % 8);
            bitmap.set(x, y, (byte >> bit_index) & 1);
        }
    }
    Ok(bitmap)
}

/// Encode a bitmap into a transport payload
///
/// Inverse of [`decode`] for host tools and tests.
pub fn encode(bitmap: &Bitmap) -> String {
    let compressed = compress_to_vec_zlib(bitmap.as_packed(), COMPRESSION_LEVEL);
    STANDARD.encode(compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn zlib_base64(raw: &[u8]) -> String {
        STANDARD.encode(compress_to_vec_zlib(raw, 6))
    }

    #[test]
    fn test_bit_layout() {
        // 16x2: row 0 = 0b1000_0000 0b0000_0001, row 1 = 0b0100_0000 0x00
        let payload = zlib_base64(&[0x80, 0x01, 0x40, 0x00]);
        let bitmap = decode(&payload, Resolution::new(16, 2)).unwrap();

        assert_eq!(bitmap.get(0, 0), Some(1));
        assert_eq!(bitmap.get(1, 0), Some(0));
        assert_eq!(bitmap.get(15, 0), Some(1));
        assert_eq!(bitmap.get(1, 1), Some(1));
        assert_eq!(bitmap.pixels().filter(|&p| p == 1).count(), 3);
        assert_eq!(*bitmap.palette(), Palette::TWO_TONE);
    }

    #[test]
    fn test_surplus_bytes_ignored() {
        let payload = zlib_base64(&[0xFF, 0x00, 0xAA]);
        let bitmap = decode(&payload, Resolution::new(8, 2)).unwrap();
        assert_eq!(bitmap.as_packed(), &[0xFF, 0x00]);
    }

    #[test]
    fn test_undersized_buffer_fails() {
        let payload = zlib_base64(&[0u8; 1023]);
        assert_eq!(
            decode(&payload, Resolution::new(128, 64)),
            Err(CodecError::Undersized {
                expected: 1024,
                actual: 1023
            })
        );
    }

    #[test]
    fn test_invalid_base64() {
        assert_eq!(
            decode("not base64!", Resolution::new(8, 1)),
            Err(CodecError::Base64)
        );
    }

    #[test]
    fn test_invalid_zlib() {
        // Valid base64, not a zlib stream
        let payload = STANDARD.encode(b"plain bytes");
        assert_eq!(
            decode(&payload, Resolution::new(8, 1)),
            Err(CodecError::Inflate)
        );
    }

    #[test]
    fn test_oversized_inflate_rejected() {
        let payload = zlib_base64(&std::vec![0u8; MAX_INFLATED_LEN + 1]);
        assert_eq!(
            decode(&payload, Resolution::new(8, 1)),
            Err(CodecError::Inflate)
        );
    }

    #[test]
    fn test_unaligned_width() {
        let payload = zlib_base64(&[0u8; 64]);
        assert_eq!(
            decode(&payload, Resolution::new(12, 4)),
            Err(CodecError::UnalignedWidth(12))
        );
    }

    proptest! {
        #[test]
        fn prop_encode_decode_round_trip(
            (resolution, pixels) in (1u16..8, 1u16..16).prop_flat_map(|(stride, height)| {
                let resolution = Resolution::new(stride * 8, height);
                let len = usize::from(resolution.width) * usize::from(height);
                (Just(resolution), proptest::collection::vec(any::<bool>(), len))
            }),
        ) {
            let mut bitmap = Bitmap::new(resolution, Palette::TWO_TONE);
            for (i, &on) in pixels.iter().enumerate() {
                let x = (i % resolution.width as usize) as u16;
                let y = (i / resolution.width as usize) as u16;
                bitmap.set(x, y, u8::from(on));
            }

            let decoded = decode(&encode(&bitmap), resolution).unwrap();
            prop_assert_eq!(decoded, bitmap);
        }

        #[test]
        fn prop_short_buffers_fail(len in 0usize..1024) {
            let payload = zlib_base64(&std::vec![0x55u8; len]);
            let is_undersized = matches!(
                decode(&payload, Resolution::new(128, 64)),
                Err(CodecError::Undersized { .. })
            );
            prop_assert!(is_undersized);
        }
    }
}
