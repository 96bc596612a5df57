//! In-memory board for host tests

use std::cell::Cell;
use std::collections::{BTreeMap, VecDeque};
use std::string::String;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use zehardware_display::{Bitmap, DisplayError, DisplayPanel, Frame, Resolution};
use zehardware_hal::storage::MAX_FILE_SIZE;
use zehardware_hal::{
    Clock, FileError, FileKey, FileStore, OutputPin, SerialError, SerialLink, Ticker,
};

use crate::scheduler::{Board, Peripherals};

pub struct MockBoard;

impl Board for MockBoard {
    type Serial = MockSerial;
    type Led = MockLed;
    type Panel = MockPanel;
    type Files = MockFiles;
    type Clock = MockClock;
}

pub fn peripherals(resolution: Resolution) -> Peripherals<MockBoard> {
    Peripherals {
        serial: MockSerial::default(),
        led: MockLed::default(),
        panel: MockPanel::new(resolution),
        files: MockFiles::default(),
        clock: MockClock::default(),
    }
}

/// Serial link fed from queued chunks
pub struct MockSerial {
    chunks: VecDeque<Vec<u8>>,
    reads: u32,
    pub connected: bool,
    /// Fail the n-th read (0-based) and drop everything queued
    pub fail_at: Option<(u32, SerialError)>,
}

impl Default for MockSerial {
    fn default() -> Self {
        Self {
            chunks: VecDeque::new(),
            reads: 0,
            connected: true,
            fail_at: None,
        }
    }
}

impl MockSerial {
    pub fn push(&mut self, bytes: &[u8]) {
        self.chunks.push_back(bytes.to_vec());
    }

    pub fn has_pending(&self) -> bool {
        !self.chunks.is_empty()
    }
}

impl SerialLink for MockSerial {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn bytes_available(&mut self) -> bool {
        self.has_pending()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let read = self.reads;
        self.reads += 1;
        if let Some((at, error)) = self.fail_at {
            if at == read {
                self.fail_at = None;
                self.chunks.clear();
                return Err(error);
            }
        }

        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        let count = chunk.len().min(buf.len());
        buf[..count].copy_from_slice(&chunk[..count]);
        if count < chunk.len() {
            self.chunks.push_front(chunk.split_off(count));
        }
        Ok(count)
    }
}

#[derive(Debug, Default)]
pub struct MockLed {
    high: bool,
}

impl OutputPin for MockLed {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// What a refresh put on the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Blank,
    Terminal,
    Image(Bitmap),
}

pub struct MockPanel {
    resolution: Resolution,
    pub shown: Vec<Shown>,
    pub fail: bool,
}

impl MockPanel {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            shown: Vec::new(),
            fail: false,
        }
    }
}

impl DisplayPanel for MockPanel {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    async fn refresh(&mut self, frame: Frame<'_>) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Communication);
        }
        frame.fits(self.resolution)?;
        self.shown.push(match frame {
            Frame::Blank => Shown::Blank,
            Frame::Terminal(_) => Shown::Terminal,
            Frame::Image(bitmap) => Shown::Image(bitmap.clone()),
        });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockFiles {
    files: BTreeMap<String, Vec<u8>>,
    pub fail_writes: bool,
    /// Fail only writes to this file
    pub fail_write_to: Option<&'static str>,
}

impl MockFiles {
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileStore for MockFiles {
    async fn read(&mut self, key: &FileKey, buffer: &mut [u8]) -> Result<usize, FileError> {
        let data = self.files.get(key.as_str()).ok_or(FileError::NotFound)?;
        if data.len() > buffer.len() {
            return Err(FileError::BufferTooSmall);
        }
        buffer[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    async fn write(&mut self, key: &FileKey, data: &[u8]) -> Result<(), FileError> {
        if self.fail_writes || self.fail_write_to == Some(key.as_str()) {
            return Err(FileError::Flash);
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(FileError::TooLarge);
        }
        self.files.insert(key.as_str().into(), data.to_vec());
        Ok(())
    }
}

/// Clock that advances by `step` every time it is read
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<u64>,
    step: u64,
}

impl MockClock {
    pub fn stepping(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

#[derive(Debug, Default)]
pub struct MockTicker {
    pub ticks: u32,
}

impl Ticker for MockTicker {
    async fn next(&mut self) {
        self.ticks += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
