use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::config::{CACHE_CAPACITY, CACHE_IDLE_TTL_SECS};
use crate::db::WheelRepository;
use crate::error::Result;
use crate::types::ChannelKey;
use crate::wheel::OptionList;

// ---------------------------------------------------------------------------
// CacheEntry
// ---------------------------------------------------------------------------

/// Options plus the durable version they were loaded at (`None` = no record yet).
#[derive(Debug, Default)]
struct LoadedWheel {
    options: OptionList,
    version: Option<i64>,
}

/// One cached channel. The async mutex serializes get → mutate → save for the key;
/// the slot is `None` until loaded, and again after an unpersisted mutation.
struct CacheEntry {
    slot: Arc<Mutex<Option<LoadedWheel>>>,
    /// Milliseconds since the store's epoch of the last checkout.
    last_access_ms: AtomicU64,
}

impl CacheEntry {
    fn new() -> Self {
        Self { slot: Arc::new(Mutex::new(None)), last_access_ms: AtomicU64::new(0) }
    }
}

// ---------------------------------------------------------------------------
// WheelStore
// ---------------------------------------------------------------------------

/// Read-through/write-through cache of wheels over a [`WheelRepository`].
pub struct WheelStore<R> {
    repo: R,
    /// channel key → cached wheel
    entries: DashMap<ChannelKey, Arc<CacheEntry>>,
    idle_ttl: Duration,
    capacity: usize,
    epoch: Instant,
}

impl<R: WheelRepository> WheelStore<R> {
    pub fn new(repo: R) -> Arc<Self> {
        Self::with_limits(repo, Duration::from_secs(CACHE_IDLE_TTL_SECS), CACHE_CAPACITY)
    }

    pub fn with_limits(repo: R, idle_ttl: Duration, capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            repo,
            entries: DashMap::new(),
            idle_ttl,
            capacity,
            epoch: Instant::now(),
        })
    }

    #[cfg(test)]
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lock the wheel for `key`, loading it from durable storage on a cache miss.
    /// An absent record yields an empty wheel; a storage failure is returned as-is
    /// and the slot stays unloaded so the next call retries.
    pub async fn checkout(&self, key: &ChannelKey) -> Result<WheelGuard<'_, R>> {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(CacheEntry::new()))
            .clone();
        entry.last_access_ms.store(self.millis_since_epoch(Instant::now()), Ordering::Relaxed);

        if self.entries.len() > self.capacity {
            self.enforce_capacity();
        }

        let mut slot = Arc::clone(&entry.slot).lock_owned().await;
        let wheel = match slot.take() {
            Some(wheel) => wheel,
            None => match self.repo.load(key).await? {
                Some(record) => {
                    debug!(
                        key = %key,
                        count = record.options.len(),
                        version = record.version,
                        updated_at_ms = record.updated_at_ms,
                        "wheel loaded into cache"
                    );
                    LoadedWheel { options: OptionList::new(record.options), version: Some(record.version) }
                }
                None => {
                    debug!(key = %key, "no stored wheel, starting empty");
                    LoadedWheel::default()
                }
            }
        };

        Ok(WheelGuard { repo: &self.repo, key: key.clone(), _entry: entry, slot, wheel, dirty: false })
    }

    /// Current options for `key` without holding the lock afterwards.
    pub async fn snapshot(&self, key: &ChannelKey) -> Result<Vec<String>> {
        let guard = self.checkout(key).await?;
        Ok(guard.options().as_slice().to_vec())
    }

    /// Drop entries idle for longer than the TTL. Entries in use are kept.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let now_ms = self.millis_since_epoch(now);
        let ttl_ms = self.idle_ttl.as_millis() as u64;
        let before = self.entries.len();
        // strong_count > 1 means a command holds or is waiting on the entry
        self.entries.retain(|_, entry| {
            let idle_ms = now_ms.saturating_sub(entry.last_access_ms.load(Ordering::Relaxed));
            Arc::strong_count(entry) > 1 || idle_ms <= ttl_ms
        });
        before.saturating_sub(self.entries.len())
    }

    /// Drop least-recently-used idle entries until the cache is within capacity.
    pub fn enforce_capacity(&self) -> usize {
        let excess = self.entries.len().saturating_sub(self.capacity);
        if excess == 0 {
            return 0;
        }

        let mut candidates: Vec<(ChannelKey, u64)> = self
            .entries
            .iter()
            .filter(|e| Arc::strong_count(e.value()) == 1)
            .map(|e| (e.key().clone(), e.value().last_access_ms.load(Ordering::Relaxed)))
            .collect();
        candidates.sort_by_key(|(_, last)| *last);

        let mut evicted = 0;
        for (key, _) in candidates.into_iter().take(excess) {
            if self.entries.remove_if(&key, |_, e| Arc::strong_count(e) == 1).is_some() {
                evicted += 1;
            }
        }
        evicted
    }

    pub fn cached_count(&self) -> usize {
        self.entries.len()
    }

    fn millis_since_epoch(&self, at: Instant) -> u64 {
        at.saturating_duration_since(self.epoch).as_millis() as u64
    }
}

// ---------------------------------------------------------------------------
// WheelGuard
// ---------------------------------------------------------------------------

/// Exclusive access to one channel's wheel. Dropping it without `commit` after a
/// mutation discards the change and invalidates the cached copy.
pub struct WheelGuard<'a, R: WheelRepository> {
    repo: &'a R,
    key: ChannelKey,
    /// Keeps the entry pinned in the cache while the guard is alive.
    _entry: Arc<CacheEntry>,
    slot: OwnedMutexGuard<Option<LoadedWheel>>,
    wheel: LoadedWheel,
    dirty: bool,
}

impl<R: WheelRepository> WheelGuard<'_, R> {
    pub fn options(&self) -> &OptionList {
        &self.wheel.options
    }

    pub fn options_mut(&mut self) -> &mut OptionList {
        self.dirty = true;
        &mut self.wheel.options
    }

    /// Apply a change that may be refused; the wheel only counts as modified on success.
    pub fn try_mutate<T>(&mut self, f: impl FnOnce(&mut OptionList) -> Result<T>) -> Result<T> {
        let mut options = self.wheel.options.clone();
        let value = f(&mut options)?;
        self.wheel.options = options;
        self.dirty = true;
        Ok(value)
    }

    /// Write the options through to durable storage.
    pub async fn commit(mut self) -> Result<()> {
        let version = self
            .repo
            .save(&self.key, self.wheel.options.as_slice(), self.wheel.version)
            .await?;
        self.wheel.version = Some(version);
        self.dirty = false;
        Ok(())
    }
}

impl<R: WheelRepository> Drop for WheelGuard<'_, R> {
    fn drop(&mut self) {
        if self.dirty {
            warn!(key = %self.key, "wheel changed without being persisted, invalidating cached copy");
            return;
        }
        *self.slot = Some(std::mem::take(&mut self.wheel));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
