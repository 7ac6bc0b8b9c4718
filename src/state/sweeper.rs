use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::CACHE_SWEEP_INTERVAL_SECS;
use crate::db::WheelRepository;
use crate::state::WheelStore;

/// Background task that evicts idle wheels every 60 seconds
/// and trims the cache back to capacity.
pub struct CacheSweeper<R> {
    store: Arc<WheelStore<R>>,
}

impl<R: WheelRepository> CacheSweeper<R> {
    pub fn new(store: Arc<WheelStore<R>>) -> Self {
        Self { store }
    }

    pub async fn run(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(CACHE_SWEEP_INTERVAL_SECS));
        interval.tick().await; // consume immediate first tick

        loop {
            interval.tick().await;
            self.sweep(Instant::now());
        }
    }

    /// Returns the number of wheels evicted.
    fn sweep(&self, now: Instant) -> usize {
        let idle = self.store.evict_idle(now);
        let over_capacity = self.store.enforce_capacity();
        let evicted = idle + over_capacity;

        if evicted > 0 {
            info!(
                idle,
                over_capacity,
                cached = self.store.cached_count(),
                "Cache sweep evicted {evicted} wheels",
            );
        } else {
            debug!(cached = self.store.cached_count(), "Cache sweep: nothing to evict");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::memory::MemoryWheelRepository;
    use crate::types::ChannelKey;

    #[tokio::test]
    async fn sweep_drops_idle_and_excess_entries() {
        let store =
            WheelStore::with_limits(MemoryWheelRepository::default(), Duration::from_secs(1800), 1);
        let sweeper = CacheSweeper::new(Arc::clone(&store));

        for name in ["wheel-a", "wheel-b"] {
            let key = ChannelKey::new(Some("g"), name).unwrap();
            drop(store.checkout(&key).await.unwrap());
        }
        assert_eq!(store.cached_count(), 1, "checkout already trims to capacity");

        assert_eq!(sweeper.sweep(Instant::now()), 0);
        assert_eq!(sweeper.sweep(Instant::now() + Duration::from_secs(3600)), 1);
        assert_eq!(store.cached_count(), 0);
    }
}
