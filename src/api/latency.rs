//! In-memory latency histogram for command handling.
//! Records time from receiving an interaction to the last reply sent for it.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;
use tracing::warn;

/// Shared latency stats. The command worker records, the API reads.
/// Values stored in microseconds.
pub struct LatencyStats {
    inner: Mutex<Option<Histogram<u64>>>,
}

impl LatencyStats {
    /// Tracks 1us to 10 minutes, 3 significant figures. A spin includes the reveal delay.
    pub fn new() -> Self {
        let histogram = match Histogram::new_with_bounds(1, 600_000_000, 3) {
            Ok(h) => Some(h),
            Err(e) => {
                warn!("latency histogram disabled: {e}");
                None
            }
        };
        Self { inner: Mutex::new(histogram) }
    }

    pub fn record_us(&self, us: u64) {
        if let Ok(mut guard) = self.inner.lock() {
            if let Some(h) = guard.as_mut() {
                let _ = h.saturating_record(us.max(1));
            }
        }
    }

    pub fn record(&self, d: Duration) {
        let us = d.as_micros().min(u128::from(u64::MAX)) as u64;
        self.record_us(us);
    }

    /// Return (p50_ms, p95_ms, p99_ms). None if no samples.
    pub fn percentiles_ms(&self) -> (Option<f64>, Option<f64>, Option<f64>) {
        let Ok(guard) = self.inner.lock() else {
            return (None, None, None);
        };
        let Some(h) = guard.as_ref().filter(|h| h.len() > 0) else {
            return (None, None, None);
        };
        let ms = |q: f64| Some(h.value_at_quantile(q) as f64 / 1_000.0);
        (ms(0.5), ms(0.95), ms(0.99))
    }

    /// Sample count.
    pub fn len(&self) -> u64 {
        self.inner
            .lock()
            .ok()
            .and_then(|g| g.as_ref().map(|h| h.len()))
            .unwrap_or(0)
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_has_no_percentiles() {
        let stats = LatencyStats::new();
        assert_eq!(stats.percentiles_ms(), (None, None, None));
        assert_eq!(stats.len(), 0);
    }

    #[test]
    fn percentiles_are_reported_in_ms() {
        let stats = LatencyStats::new();
        for ms in 1..=100u64 {
            stats.record(Duration::from_millis(ms));
        }
        let (p50, p95, p99) = stats.percentiles_ms();
        assert!((p50.unwrap() - 50.0).abs() < 1.0);
        assert!((p95.unwrap() - 95.0).abs() < 1.0);
        assert!((p99.unwrap() - 99.0).abs() < 1.0);
        assert_eq!(stats.len(), 100);
    }
}
