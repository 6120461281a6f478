//! Heartbeat monitor
//!
//! Lives inside the socket loop of the connection it belongs to, so a ping
//! can never be written to a socket other than the one that started it.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Periodic keepalive timer, active only while sessioned
#[derive(Debug)]
pub struct HeartbeatMonitor {
    interval: Interval,
}

impl HeartbeatMonitor {
    /// Start the timer; the first beat fires one full period from now
    #[must_use]
    pub fn start(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Wait for the next beat
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Wait for the next beat of an optional monitor
///
/// Never completes while the monitor is stopped, which keeps the heartbeat
/// branch of a `select!` idle.
pub async fn next_beat(monitor: &mut Option<HeartbeatMonitor>) {
    match monitor {
        Some(monitor) => monitor.tick().await,
        None => std::future::pending().await,
    }
}
