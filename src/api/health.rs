//! Shared health state for the /health endpoint.
//! Updated by the gateway client and the command worker.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Shared health counters. Written by bot components, read by the API.
#[derive(Default)]
pub struct HealthState {
    /// True while the gateway session is identified and in its main loop.
    gateway_connected: AtomicBool,
    /// Commands that got their reply (including refusals such as an empty wheel).
    commands_handled: AtomicU64,
    /// Commands that ended in a storage, renderer or platform failure.
    commands_failed: AtomicU64,
    /// Nanosecond timestamp of the last finished command (0 = none).
    last_command_at_ns: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_gateway_connected(&self, v: bool) {
        self.gateway_connected.store(v, Ordering::Relaxed);
    }

    pub fn record_command(&self, failed: bool) {
        if failed {
            self.commands_failed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.commands_handled.fetch_add(1, Ordering::Relaxed);
        }
        self.last_command_at_ns.store(now_ns(), Ordering::Relaxed);
    }

    pub fn gateway_connected(&self) -> bool {
        self.gateway_connected.load(Ordering::Relaxed)
    }

    pub fn commands_handled(&self) -> u64 {
        self.commands_handled.load(Ordering::Relaxed)
    }

    pub fn commands_failed(&self) -> u64 {
        self.commands_failed.load(Ordering::Relaxed)
    }

    pub fn last_command_at_ns(&self) -> u64 {
        self.last_command_at_ns.load(Ordering::Relaxed)
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_handled_and_failed_separately() {
        let health = HealthState::new();
        health.record_command(false);
        health.record_command(false);
        health.record_command(true);
        assert_eq!(health.commands_handled(), 2);
        assert_eq!(health.commands_failed(), 1);
        assert!(health.last_command_at_ns() > 0);
    }
}
