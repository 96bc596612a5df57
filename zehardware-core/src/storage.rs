//! Slot storage adapter
//!
//! Each image slot is a pair of files:
//!
//! ```text
//! <slot>.metadata.base64    metadata bytes
//! <slot>.bin.gz.base64      zlib-compressed packed image
//! ```
//!
//! Files hold the raw bytes behind the base64 text the host sent. Writing
//! decodes the text, reading encodes the bytes again, so the rest of the
//! agent only ever sees the transport form.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use core::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zehardware_hal::storage::MAX_FILE_SIZE;
use zehardware_hal::{FileError, FileKey, FileStore};
use zehardware_protocol::Slot;

/// Storage adapter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Text to be stored is not valid base64
    Base64,
    /// File name does not fit a [`FileKey`]
    FileName,
    /// Underlying file operation failed
    File(FileError),
}

impl From<FileError> for StorageError {
    fn from(e: FileError) -> Self {
        StorageError::File(e)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Base64 => f.write_str("invalid base64"),
            StorageError::FileName => f.write_str("invalid file name"),
            StorageError::File(e) => write!(f, "{}", e),
        }
    }
}

/// The two files backing a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotFile {
    Metadata,
    Payload,
}

impl SlotFile {
    const fn suffix(self) -> &'static str {
        match self {
            SlotFile::Metadata => "metadata.base64",
            SlotFile::Payload => "bin.gz.base64",
        }
    }

    /// File key for this file of `slot`
    pub fn key(self, slot: Slot) -> Result<FileKey, StorageError> {
        let name = format!("{}.{}", slot.as_str(), self.suffix());
        FileKey::new(&name).ok_or(StorageError::FileName)
    }
}

/// Base64 view over a [`FileStore`]
pub struct SlotStorage<F> {
    files: F,
}

impl<F: FileStore> SlotStorage<F> {
    pub fn new(files: F) -> Self {
        Self { files }
    }

    /// Decode `text` and overwrite `key` with the raw bytes
    pub async fn write(&mut self, key: &FileKey, text: &str) -> Result<(), StorageError> {
        let bytes = STANDARD
            .decode(text.as_bytes())
            .map_err(|_| StorageError::Base64)?;
        self.files.write(key, &bytes).await?;
        Ok(())
    }

    /// Read `key` and return its bytes as base64 text
    pub async fn read(&mut self, key: &FileKey) -> Result<String, StorageError> {
        let mut buffer = vec![0u8; MAX_FILE_SIZE];
        let len = self.files.read(key, &mut buffer).await?;
        Ok(STANDARD.encode(&buffer[..len]))
    }

    /// Persist a slot
    ///
    /// Both texts are decoded and size-checked before anything is written,
    /// so malformed or oversized input never touches flash. A flash failure
    /// between the two writes leaves the new metadata next to the old
    /// payload.
    pub async fn store(
        &mut self,
        slot: Slot,
        metadata: &str,
        payload: &str,
    ) -> Result<(), StorageError> {
        let metadata = STANDARD
            .decode(metadata.as_bytes())
            .map_err(|_| StorageError::Base64)?;
        let payload = STANDARD
            .decode(payload.as_bytes())
            .map_err(|_| StorageError::Base64)?;
        if metadata.len() > MAX_FILE_SIZE || payload.len() > MAX_FILE_SIZE {
            return Err(FileError::TooLarge.into());
        }

        self.files
            .write(&SlotFile::Metadata.key(slot)?, &metadata)
            .await?;
        self.files
            .write(&SlotFile::Payload.key(slot)?, &payload)
            .await?;
        Ok(())
    }

    /// Read one file of a slot as base64 text
    pub async fn load(&mut self, slot: Slot, file: SlotFile) -> Result<String, StorageError> {
        let key = file.key(slot)?;
        self.read(&key).await
    }

    /// The underlying file store
    pub fn files(&self) -> &F {
        &self.files
    }
}
