//! zehardware - Serial Command Agent Firmware
//!
//! Main firmware binary for RP2040 boards with a small OLED. The agent
//! listens for line commands on a USB serial port, keeps images in flash
//! slots and shows them on the panel, all from one cooperative loop.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, USB};
use embassy_rp::usb::{self, Driver};
use embassy_time::Delay;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config as UsbConfig, UsbDevice};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use zehardware_core::{Agent, Peripherals, Termination};
use zehardware_hal_rp2040::flash::FlashFiles;
use zehardware_hal_rp2040::gpio::Led;
use zehardware_hal_rp2040::sh1106::Sh1106;
use zehardware_hal_rp2040::time::{LoopTicker, UptimeClock};
use zehardware_hal_rp2040::usb::{UsbDriver, UsbLink, UsbService, MAX_PACKET_SIZE};

use crate::board::PicoBoard;

mod board;

include!(concat!(env!("OUT_DIR"), "/agent_config.rs"));

// Heap for line, payload and inflate buffers
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 96KB
const HEAP_SIZE: usize = 96 * 1024;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => usb::InterruptHandler<USB>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// Static cells for USB descriptors and class state (must live forever)
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State<'static>> = StaticCell::new();

/// USB device stack
#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    device.run().await
}

/// CDC-ACM receive pump
#[embassy_executor::task]
async fn link_task(service: UsbService) -> ! {
    service.run().await
}

fn usb_config() -> UsbConfig<'static> {
    let mut config = UsbConfig::new(0x16c0, 0x27dd);
    config.manufacturer = Some("zehardware");
    config.product = Some("zehardware agent");
    config.serial_number = Some("zehardware-0001");
    config.max_power = 100;
    config.max_packet_size_0 = 64;
    config
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("zehardware agent starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Command link
    let driver = Driver::new(p.USB, Irqs);
    let mut builder = Builder::new(
        driver,
        usb_config(),
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), MAX_PACKET_SIZE);
    let (link, service) = UsbLink::new(class);
    spawner.spawn(usb_task(builder.build()).unwrap());
    spawner.spawn(link_task(service).unwrap());
    info!("USB serial initialized");

    // Display
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default());
    let mut panel = Sh1106::new(i2c);
    match panel.init().await {
        Ok(()) => info!("Display initialized"),
        Err(e) => warn!("Display init failed: {}", e),
    }

    let peripherals = Peripherals::<PicoBoard> {
        serial: link,
        led: Led::new(Output::new(p.PIN_25, Level::Low)),
        panel,
        files: FlashFiles::new(p.FLASH, p.DMA_CH0),
        clock: UptimeClock,
    };

    let mut agent = match Agent::new(AGENT_CONFIG, peripherals) {
        Ok(agent) => agent,
        Err(e) => {
            error!("Invalid agent configuration: {}", e);
            halt();
        }
    };
    info!("Agent ready, tick period {} ms", AGENT_CONFIG.tick_period_ms);

    let mut ticker = LoopTicker::every_ms(AGENT_CONFIG.tick_period_ms);
    match agent.run(&mut ticker, &mut Delay).await {
        Termination::Reload => {
            info!("Restarting");
            cortex_m::peripheral::SCB::sys_reset();
        }
        Termination::Exit => {
            info!("Agent stopped");
            halt();
        }
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Idle forever
fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
