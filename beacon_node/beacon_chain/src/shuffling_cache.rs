use crate::{metrics, BeaconChainError};
use itertools::Itertools;
use oneshot_broadcast::{oneshot, Receiver, Sender};
use parking_lot::Mutex;
use slog::{debug, Logger};
use std::collections::HashMap;
use std::sync::Arc;
use types::{beacon_state::CommitteeCache, Epoch, ShufflingId};

/// The size of the cache that stores committee caches for quicker verification.
///
/// Each entry should be `8 + 800,000 = 800,008` bytes in size with 100k validators. (8-byte hash +
/// 100k indices). Therefore, this cache should be approx `16 * 800,008 = 12.8 MB`. (Note: this
/// ignores a few extra bytes in the caches that should be insignificant compared to the indices).
pub const DEFAULT_CACHE_SIZE: usize = 16;

/// The outcome of a shuffling computation, as delivered to every caller waiting on it.
pub type PromiseResult = Result<Arc<CommitteeCache>, BeaconChainError>;

#[derive(Clone)]
pub enum CacheItem {
    /// A committee.
    Committee(Arc<CommitteeCache>),
    /// A promise for a future committee, or for the error that prevented computing it.
    Promise(Receiver<PromiseResult>),
}

impl CacheItem {
    pub fn is_promise(&self) -> bool {
        matches!(self, CacheItem::Promise(_))
    }

    /// Block until the committee is available.
    ///
    /// The outer error means the computing thread went away without producing any result.
    pub fn wait(self) -> Result<PromiseResult, oneshot_broadcast::Error> {
        match self {
            CacheItem::Committee(cache) => Ok(Ok(cache)),
            CacheItem::Promise(receiver) => receiver.recv(),
        }
    }
}

impl std::fmt::Debug for CacheItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheItem::Committee(cache) => write!(f, "Committee({:?})", cache.initialized_epoch()),
            CacheItem::Promise(_) => write!(f, "Promise(..)"),
        }
    }
}

enum Lookup {
    Cached(CacheItem),
    Compute(Sender<PromiseResult>),
}

struct Inner {
    cache: HashMap<ShufflingId, CacheItem>,
    capacity: usize,
    head_epoch: Epoch,
}

/// Provides a bounded cache for `CommitteeCache`, keyed by `ShufflingId`.
///
/// It has been named `ShufflingCache` because `CommitteeCacheCache` is a bit weird and looks like
/// a find/replace error.
///
/// Concurrent requests for the same missing shuffling are served by a single computation. The
/// first caller leaves a promise in the cache and every later caller blocks on it, receiving the
/// same committee or the same error.
///
/// Shufflings older than `head_epoch - live_epochs` are pruned and never recomputed here; such
/// requests fail with `EpochBelowRetention`.
pub struct ShufflingCache {
    inner: Mutex<Inner>,
    live_epochs: u64,
    log: Logger,
}

impl ShufflingCache {
    pub fn new(capacity: usize, live_epochs: u64, log: Logger) -> Self {
        Self {
            inner: Mutex::new(Inner {
                cache: HashMap::new(),
                capacity,
                head_epoch: Epoch::new(0),
            }),
            live_epochs,
            log,
        }
    }

    /// Returns the committee cache for `key`, computing it with `compute` if it is not cached.
    ///
    /// If another thread is already computing the same key, this blocks until it finishes and
    /// returns its result, including its error. A failed computation is not cached; the next call
    /// computes afresh.
    pub fn get_or_compute<F>(&self, key: &ShufflingId, compute: F) -> PromiseResult
    where
        F: FnOnce() -> Result<CommitteeCache, BeaconChainError>,
    {
        self.check_retention(key.shuffling_epoch)?;

        loop {
            // The lookup and the promise creation happen under one lock so that only one caller
            // can ever be computing a given key.
            let lookup = {
                let mut inner = self.inner.lock();
                match inner.get(key, self.live_epochs) {
                    Some(item) => Lookup::Cached(item),
                    None => Lookup::Compute(inner.create_promise(key.clone(), self.live_epochs)),
                }
            };

            match lookup {
                Lookup::Cached(CacheItem::Committee(committee_cache)) => return Ok(committee_cache),
                Lookup::Cached(CacheItem::Promise(receiver)) => {
                    debug!(
                        self.log,
                        "Waiting for shuffling";
                        "shuffling_epoch" => key.shuffling_epoch,
                        "decision_block" => ?key.shuffling_decision_block,
                    );
                    match receiver.recv() {
                        Ok(result) => return result,
                        // The computing thread died without sending. Its promise is dead and
                        // will be discarded by the next lookup.
                        Err(oneshot_broadcast::Error::SenderDropped) => {
                            metrics::inc_counter(&metrics::SHUFFLING_CACHE_PROMISE_FAILS);
                            continue;
                        }
                    }
                }
                Lookup::Compute(sender) => {
                    let result = self.compute(key, compute);
                    self.resolve_promise(sender, key.clone(), result.clone());
                    return result;
                }
            }
        }
    }

    fn compute<F>(&self, key: &ShufflingId, compute: F) -> PromiseResult
    where
        F: FnOnce() -> Result<CommitteeCache, BeaconChainError>,
    {
        let timer = metrics::start_timer(&metrics::SHUFFLING_COMPUTATION_TIMES);
        let committee_cache = compute()?;
        metrics::stop_timer(timer);

        if !committee_cache.is_initialized_at(key.shuffling_epoch) {
            return Err(BeaconChainError::ShufflingCacheEpochMismatch {
                expected: key.shuffling_epoch,
                found: committee_cache.initialized_epoch(),
            });
        }

        Ok(Arc::new(committee_cache))
    }

    /// Returns the cached item for `key`, if any.
    ///
    /// A resolved promise is replaced with its value. A failed promise, or one whose sender has
    /// been dropped, is removed and `None` is returned so the caller can compute the value itself.
    pub fn get(&self, key: &ShufflingId) -> Option<CacheItem> {
        self.inner.lock().get(key, self.live_epochs)
    }

    pub fn contains(&self, key: &ShufflingId) -> bool {
        self.inner.lock().cache.contains_key(key)
    }

    /// Insert a committee cache computed elsewhere. An existing committee is never replaced.
    pub fn insert_committee_cache(&self, key: ShufflingId, committee_cache: &Arc<CommitteeCache>) {
        let mut inner = self.inner.lock();
        if inner
            .cache
            .get(&key)
            // Replace the committee if it's not present or if it's a promise. A bird in the hand is
            // worth two in the promise-bush!
            .map_or(true, CacheItem::is_promise)
        {
            inner.insert_cache_item(
                key,
                CacheItem::Committee(committee_cache.clone()),
                self.live_epochs,
            );
        }
    }

    #[cfg(test)]
    fn create_promise(&self, key: ShufflingId) -> Sender<PromiseResult> {
        self.inner.lock().create_promise(key, self.live_epochs)
    }

    /// Take care of resolving a promise by ensuring the result is made available:
    ///
    /// 1. To all waiting thread that are holding a `Receiver`.
    /// 2. In the cache itself for future callers, if it is a committee.
    fn resolve_promise(
        &self,
        sender: Sender<PromiseResult>,
        key: ShufflingId,
        result: PromiseResult,
    ) {
        // Use the sender to notify all actively waiting receivers.
        sender.send(result.clone());

        match result {
            // Re-insert the committee into the cache. The promise may have been evicted in the
            // meantime, but we probably want to keep this committee (which resolved recently) over
            // other older cache entries.
            Ok(committee_cache) => self.insert_committee_cache(key, &committee_cache),
            Err(e) => {
                debug!(
                    self.log,
                    "Shuffling computation failed";
                    "shuffling_epoch" => key.shuffling_epoch,
                    "error" => ?e,
                );
                let mut inner = self.inner.lock();
                if inner.cache.get(&key).map_or(false, CacheItem::is_promise) {
                    inner.cache.remove(&key);
                }
            }
        }
    }

    /// Inform the cache of the current head epoch, dropping every shuffling which is now below
    /// the live window.
    pub fn update_head_epoch(&self, head_epoch: Epoch) {
        let mut inner = self.inner.lock();
        inner.head_epoch = head_epoch;

        let live_epochs = self.live_epochs;
        let before = inner.cache.len();
        inner
            .cache
            .retain(|key, _| is_retained(key.shuffling_epoch, head_epoch, live_epochs));
        let pruned = before - inner.cache.len();

        if pruned > 0 {
            debug!(
                self.log,
                "Pruned shuffling cache";
                "head_epoch" => head_epoch,
                "pruned" => pruned,
            );
        }
        metrics::set_gauge(&metrics::SHUFFLING_CACHE_SIZE, inner.cache.len() as i64);
    }

    pub fn head_epoch(&self) -> Epoch {
        self.inner.lock().head_epoch
    }

    /// Remove every entry, including unresolved promises.
    pub fn clear(&self) {
        self.inner.lock().cache.clear();
        metrics::set_gauge(&metrics::SHUFFLING_CACHE_SIZE, 0);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_retention(&self, epoch: Epoch) -> Result<(), BeaconChainError> {
        // Overflow here means the epoch is beyond anything the chain could reach.
        epoch
            .safe_add(self.live_epochs)
            .map_err(|_| BeaconChainError::ShufflingCacheEpochOverflow(epoch))?;

        let head_epoch = self.head_epoch();
        if is_retained(epoch, head_epoch, self.live_epochs) {
            Ok(())
        } else {
            metrics::inc_counter(&metrics::SHUFFLING_CACHE_RETENTION_REJECTS);
            Err(BeaconChainError::EpochBelowRetention { epoch, head_epoch })
        }
    }
}

impl Inner {
    fn get(&mut self, key: &ShufflingId, live_epochs: u64) -> Option<CacheItem> {
        match self.cache.get(key) {
            // The cache contained the committee, return it.
            item @ Some(CacheItem::Committee(_)) => {
                metrics::inc_counter(&metrics::SHUFFLING_CACHE_HITS);
                item.cloned()
            }
            // The cache contains a promise for the committee. Check to see if the promise has
            // already been resolved, without waiting for it.
            item @ Some(CacheItem::Promise(receiver)) => match receiver.try_recv() {
                // The promise has already been resolved. Replace the entry in the cache with a
                // `Committee` entry and then return the committee.
                Ok(Some(Ok(committee))) => {
                    metrics::inc_counter(&metrics::SHUFFLING_CACHE_PROMISE_HITS);
                    metrics::inc_counter(&metrics::SHUFFLING_CACHE_HITS);
                    let ready = CacheItem::Committee(committee);
                    self.insert_cache_item(key.clone(), ready.clone(), live_epochs);
                    Some(ready)
                }
                // The promise has not yet been resolved. Return the promise so the caller can
                // await it.
                Ok(None) => {
                    metrics::inc_counter(&metrics::SHUFFLING_CACHE_PROMISE_HITS);
                    metrics::inc_counter(&metrics::SHUFFLING_CACHE_HITS);
                    item.cloned()
                }
                // The computation failed, or the sender has been dropped without sending anything.
                // Drop the key from the cache and return `None` so the caller can recompute the
                // committee.
                Ok(Some(Err(_))) | Err(oneshot_broadcast::Error::SenderDropped) => {
                    metrics::inc_counter(&metrics::SHUFFLING_CACHE_PROMISE_FAILS);
                    metrics::inc_counter(&metrics::SHUFFLING_CACHE_MISSES);
                    self.cache.remove(key);
                    None
                }
            },
            // The cache does not have this committee and it's not already promised to be computed.
            None => {
                metrics::inc_counter(&metrics::SHUFFLING_CACHE_MISSES);
                None
            }
        }
    }

    /// Leave a promise for `key` in the cache and return its sender.
    ///
    /// There is no limit on outstanding promises. Each one stands for a computation that every
    /// concurrent caller for the same key would otherwise repeat.
    fn create_promise(&mut self, key: ShufflingId, live_epochs: u64) -> Sender<PromiseResult> {
        let (sender, receiver) = oneshot();
        self.insert_cache_item(key, CacheItem::Promise(receiver), live_epochs);
        sender
    }

    /// Prunes the cache first before inserting a new item.
    fn insert_cache_item(&mut self, key: ShufflingId, cache_item: CacheItem, live_epochs: u64) {
        if !is_retained(key.shuffling_epoch, self.head_epoch, live_epochs) {
            return;
        }
        self.prune_cache();
        self.cache.insert(key, cache_item);
        metrics::set_gauge(&metrics::SHUFFLING_CACHE_SIZE, self.cache.len() as i64);
    }

    /// Evict the oldest shufflings until there is room for one more. Promises and shufflings at
    /// or beyond the head epoch are never evicted.
    fn prune_cache(&mut self) {
        let target_cache_size = self.capacity.saturating_sub(1);
        if let Some(prune_count) = self.cache.len().checked_sub(target_cache_size) {
            let head_epoch = self.head_epoch;
            let keys_to_prune = self
                .cache
                .iter()
                .filter(|(key, item)| !item.is_promise() && key.shuffling_epoch < head_epoch)
                .map(|(key, _)| key)
                .sorted_by_key(|key| key.shuffling_epoch)
                .take(prune_count)
                .cloned()
                .collect::<Vec<_>>();

            for key in &keys_to_prune {
                self.cache.remove(key);
            }
        }
    }
}

fn is_retained(epoch: Epoch, head_epoch: Epoch, live_epochs: u64) -> bool {
    epoch.saturating_add(live_epochs) >= head_epoch
}
