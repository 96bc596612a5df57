//! USB CDC-ACM command link
//!
//! The host sees a virtual serial port. [`UsbService`] runs as its own task:
//! it moves received packets into a pipe and follows the host's DTR line.
//! The agent drains the pipe once per tick through [`UsbLink`] without
//! waiting.
//!
//! ```text
//!  host ──► CDC OUT endpoint ──► UsbService ──► RX_PIPE ──► UsbLink ──► agent
//!                 DTR ──────────► HOST_CONNECTED ──────────────┘
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_futures::join::join;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_time::Timer;
use embassy_usb::class::cdc_acm::{CdcAcmClass, Receiver, Sender};

use zehardware_hal::{SerialError, SerialLink};

/// USB driver type used by the command link
pub type UsbDriver = Driver<'static, USB>;

/// Full-speed bulk packet size
pub const MAX_PACKET_SIZE: u16 = 64;

/// Received bytes not yet drained by the agent
const PIPE_LEN: usize = 2048;

/// How often the DTR line is sampled
const DTR_POLL_MS: u64 = 100;

static RX_PIPE: Pipe<CriticalSectionRawMutex, PIPE_LEN> = Pipe::new();
static HOST_CONNECTED: AtomicBool = AtomicBool::new(false);
/// Set when the host goes away, cleared by the next link read
static LINK_DROPPED: AtomicBool = AtomicBool::new(false);

/// Agent side of the CDC-ACM port
pub struct UsbLink {
    _private: (),
}

/// Background half of the CDC-ACM port
pub struct UsbService {
    sender: Sender<'static, UsbDriver>,
    receiver: Receiver<'static, UsbDriver>,
}

impl UsbLink {
    /// Split `class` into the agent link and the service that feeds it
    ///
    /// The service must be run (usually in its own task) for the link to
    /// receive anything.
    pub fn new(class: CdcAcmClass<'static, UsbDriver>) -> (Self, UsbService) {
        let (sender, receiver) = class.split();
        (Self { _private: () }, UsbService { sender, receiver })
    }
}

impl SerialLink for UsbLink {
    fn is_connected(&self) -> bool {
        HOST_CONNECTED.load(Ordering::Acquire)
    }

    fn bytes_available(&mut self) -> bool {
        LINK_DROPPED.load(Ordering::Acquire) || !RX_PIPE.is_empty()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        if LINK_DROPPED.load(Ordering::Acquire) {
            LINK_DROPPED.store(false, Ordering::Release);
            return Err(SerialError::Disconnected);
        }
        Ok(RX_PIPE.try_read(buf).unwrap_or(0))
    }
}

impl UsbService {
    /// Serve the port forever
    pub async fn run(self) -> ! {
        let Self {
            sender,
            mut receiver,
        } = self;
        let (never, _) = join(watch_host(&sender), pump(&mut receiver)).await;
        never
    }
}

/// Track DTR, which terminals raise while the port is open
async fn watch_host(sender: &Sender<'static, UsbDriver>) -> ! {
    loop {
        let connected = sender.dtr();
        if HOST_CONNECTED.load(Ordering::Acquire) && !connected {
            drop_link();
        }
        HOST_CONNECTED.store(connected, Ordering::Release);
        Timer::after_millis(DTR_POLL_MS).await;
    }
}

/// Copy OUT packets into the pipe, waiting while the agent catches up
async fn pump(receiver: &mut Receiver<'static, UsbDriver>) -> ! {
    let mut packet = [0u8; MAX_PACKET_SIZE as usize];
    loop {
        receiver.wait_connection().await;
        while let Ok(count) = receiver.read_packet(&mut packet).await {
            RX_PIPE.write_all(&packet[..count]).await;
        }
        HOST_CONNECTED.store(false, Ordering::Release);
        drop_link();
    }
}

/// Forget bytes of a session that ended
fn drop_link() {
    RX_PIPE.clear();
    LINK_DROPPED.store(true, Ordering::Release);
}
