//! Embassy time sources

use embassy_time::{Duration, Instant, Ticker};

use zehardware_hal::{Clock, Ticker as TickSource};

/// Uptime clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Fixed-period loop ticker
pub struct LoopTicker {
    ticker: Ticker,
}

impl LoopTicker {
    pub fn every_ms(period_ms: u32) -> Self {
        Self {
            ticker: Ticker::every(Duration::from_millis(u64::from(period_ms))),
        }
    }
}

impl TickSource for LoopTicker {
    async fn next(&mut self) {
        self.ticker.next().await;
    }
}
