//! Persistent file storage abstractions
//!
//! Image slots are persisted as small named files. The backing store is
//! free to be a real filesystem or a key-value map in flash; the agent only
//! needs whole-file reads and destructive overwrites.

use core::fmt;

use heapless::String;

/// Longest file name a [`FileKey`] can hold
pub const MAX_FILE_NAME_LEN: usize = 24;

/// Largest file the agent will read or write
///
/// Sized so one file fits a single 4 KiB flash page together with the
/// map bookkeeping.
pub const MAX_FILE_SIZE: usize = 3840;

/// Name of a stored file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    name: String<MAX_FILE_NAME_LEN>,
}

impl FileKey {
    /// Create a key from a file name
    ///
    /// Returns `None` if the name is empty or longer than
    /// [`MAX_FILE_NAME_LEN`] bytes.
    pub fn new(name: &str) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        let mut key = String::new();
        key.push_str(name).ok()?;
        Some(Self { name: key })
    }

    /// The file name
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FileKey {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str());
    }
}

/// Errors from file storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FileError {
    /// Underlying flash operation failed
    Flash,
    /// Storage bookkeeping failed
    Storage,
    /// File does not exist
    NotFound,
    /// Buffer too small for the file contents
    BufferTooSmall,
    /// File contents exceed [`MAX_FILE_SIZE`]
    TooLarge,
    /// Storage is full
    Full,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FileError::Flash => "flash operation failed",
            FileError::Storage => "storage operation failed",
            FileError::NotFound => "file not found",
            FileError::BufferTooSmall => "buffer too small",
            FileError::TooLarge => "file too large",
            FileError::Full => "storage full",
        };
        f.write_str(text)
    }
}

/// Whole-file storage
pub trait FileStore {
    /// Read a file into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(
        &mut self,
        key: &FileKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FileError>>;

    /// Replace the contents of a file, creating it if needed
    fn write(
        &mut self,
        key: &FileKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FileError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for FileKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        let name = self.name.as_bytes();
        let len = 1 + name.len();
        if buffer.len() < len {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = name.len() as u8;
        buffer[1..len].copy_from_slice(name);
        Ok(len)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        let (&name_len, rest) = buffer
            .split_first()
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        let name_len = name_len as usize;
        let name = rest
            .get(..name_len)
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        let key = core::str::from_utf8(name)
            .ok()
            .and_then(FileKey::new)
            .ok_or(sequential_storage::map::SerializationError::InvalidFormat)?;
        Ok((key, 1 + name_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_key_accepts_slot_names() {
        let key = FileKey::new("down.metadata.base64").unwrap();
        assert_eq!(key.as_str(), "down.metadata.base64");
    }

    #[test]
    fn test_file_key_rejects_empty_and_long_names() {
        assert!(FileKey::new("").is_none());
        assert!(FileKey::new("a-very-long-file-name.bin.gz.base64").is_none());
    }
}
