//! Flash file store for RP2040
//!
//! Slot files live in a wear-leveled key-value map (sequential-storage)
//! in the last 256KB of flash. One file is one map item keyed by its
//! [`FileKey`], so an item must fit in a single 4KB flash page.
//!
//! Implements the `FileStore` trait from `zehardware-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use zehardware_hal::storage::MAX_FILE_SIZE;
use zehardware_hal::{FileError, FileKey, FileStore};

/// Flash layout
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const FILES_PARTITION_SIZE: usize = 256 * 1024;
pub const FILES_PARTITION_START: usize = FLASH_SIZE - FILES_PARTITION_SIZE;

/// Flash range for the files partition
pub const FILES_RANGE: core::ops::Range<u32> =
    (FILES_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch space for one serialized item (key, value and alignment)
const ITEM_BUFFER_LEN: usize = MAX_FILE_SIZE + 64;

/// RP2040 flash file store
pub struct FlashFiles<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
    buffer: [u8; ITEM_BUFFER_LEN],
}

impl<'d> FlashFiles<'d> {
    /// Create a new file store
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
            buffer: [0; ITEM_BUFFER_LEN],
        }
    }
}

impl FileStore for FlashFiles<'_> {
    async fn read(&mut self, key: &FileKey, buffer: &mut [u8]) -> Result<usize, FileError> {
        let result = map::fetch_item::<FileKey, &[u8], _>(
            &mut self.flash,
            FILES_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            key,
        )
        .await;

        match result {
            Ok(Some(data)) => {
                let len = data.len();
                if buffer.len() < len {
                    return Err(FileError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(data);
                Ok(len)
            }
            Ok(None) => Err(FileError::NotFound),
            Err(_) => Err(FileError::Storage),
        }
    }

    async fn write(&mut self, key: &FileKey, data: &[u8]) -> Result<(), FileError> {
        if data.len() > MAX_FILE_SIZE {
            return Err(FileError::TooLarge);
        }

        map::store_item(
            &mut self.flash,
            FILES_RANGE,
            &mut NoCache::new(),
            &mut self.buffer,
            key,
            &data,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => FileError::Full,
            sequential_storage::Error::Storage { .. } => FileError::Flash,
            _ => FileError::Storage,
        })
    }
}
