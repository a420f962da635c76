/*!
 * Delay Map
 *
 * Key-value store whose readers may ask for a key before it is written and
 * wait, up to a timeout, for a writer to produce it.
 *
 * # Design: One Guard, Shared Per-Key Signals
 *
 * The store and the wait registry sit behind a single `parking_lot::Mutex`
 * so "look up, then register a wait" is atomic against writers. A miss joins
 * the key's `WaitSignal` (creating it if none is live), the lock is released,
 * and the reader parks on the signal. `set` fires and unregisters the signal
 * in the same critical section that stores the value, so every reader joined
 * to it wakes together. Woken readers always re-read the store under the
 * lock; the wake itself proves nothing about the value.
 *
 * A reader that gives up (timeout, or a dropped async read) leaves the
 * signal under the lock and discards it when it was the last one joined, so
 * sustained misses do not grow the registry.
 */

use super::stats::AtomicDelayMapStats;
use super::types::DelayMapStats;
use crate::core::errors::{WaitError, WaitResult};
use crate::core::sync::{DelayMapConfig, WaitSignal, WakeReason};
use ahash::RandomState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Store and wait registry, only ever touched under the map's lock
struct Shared<K, V> {
    store: HashMap<K, V, RandomState>,
    waiting: HashMap<K, Arc<WaitSignal>, RandomState>,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            store: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            waiting: HashMap::with_hasher(RandomState::new()),
        }
    }
}

/// Outcome of the locked lookup that starts every read
enum Lookup<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    Ready(V),
    Expired,
    Pending(Registration<'a, K, V>),
}

/// A reader joined to a key's wait signal
///
/// Dropping it without `complete` leaves the signal the same way a timeout
/// does, which is what keeps cancelled async reads from leaking.
struct Registration<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    map: &'a DelayMap<K, V>,
    key: &'a K,
    signal: Arc<WaitSignal>,
    active: bool,
}

impl<'a, K, V> Registration<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn complete(mut self, woken: Option<WakeReason>) -> WaitResult<V> {
        self.active = false;
        self.map.finish_wait(self.key, &self.signal, woken)
    }
}

impl<'a, K, V> Drop for Registration<'a, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn drop(&mut self) {
        if self.active {
            let mut shared = self.map.shared.lock();
            self.map.leave(&mut shared, self.key, &self.signal);
            self.map.stats.inc_cancelled_waits();
            trace!("abandoned wait deregistered");
        }
    }
}

/// Concurrent map with blocking, time-bounded reads
///
/// Share it between threads or tasks by wrapping it in an `Arc`.
///
/// # Examples
///
/// ```
/// use delay_map::DelayMap;
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
///
/// let map = Arc::new(DelayMap::<&str, u32>::new(Duration::from_millis(500)));
///
/// let writer = map.clone();
/// let handle = thread::spawn(move || {
///     thread::sleep(Duration::from_millis(20));
///     writer.set("reply", 7);
/// });
///
/// // Blocks until the writer delivers the value
/// assert_eq!(map.get(&"reply"), Some(7));
/// handle.join().unwrap();
/// ```
pub struct DelayMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    shared: Mutex<Shared<K, V>>,
    config: DelayMapConfig,
    stats: AtomicDelayMapStats,
}

impl<K, V> DelayMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty map whose reads wait at most `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self::with_config(DelayMapConfig::default().with_timeout(timeout))
    }

    /// Create an empty map from a configuration
    pub fn with_config(config: DelayMapConfig) -> Self {
        debug!(
            timeout_ms = config.timeout.as_millis() as u64,
            initial_capacity = config.initial_capacity,
            "delay map created"
        );
        Self {
            shared: Mutex::new(Shared::with_capacity(config.initial_capacity)),
            config,
            stats: AtomicDelayMapStats::new(),
        }
    }

    /// Default wait timeout for `get`
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    #[inline]
    pub fn config(&self) -> &DelayMapConfig {
        &self.config
    }

    /// Insert or overwrite `key`, waking every reader waiting on it
    pub fn set(&self, key: K, value: V) {
        let mut shared = self.shared.lock();
        let signal = shared.waiting.remove(&key);
        shared.store.insert(key, value);
        self.stats.inc_sets();

        if let Some(signal) = signal {
            let woken = signal.fire(WakeReason::Ready);
            self.stats.add_signals_retired(1);
            trace!(woken = woken.count(), "set woke waiting readers");
        }
    }

    /// Read `key`, waiting up to the configured timeout if it is absent
    ///
    /// Returns `None` if no value was set before the deadline, or if the
    /// map was closed while waiting.
    #[inline]
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_timeout(key, self.config.timeout)
    }

    /// Like `get`, with a per-call timeout
    #[inline]
    pub fn get_timeout(&self, key: &K, timeout: Duration) -> Option<V> {
        self.wait_for_timeout(key, timeout).ok()
    }

    /// Read `key` without waiting
    pub fn try_get(&self, key: &K) -> Option<V> {
        let value = self.shared.lock().store.get(key).cloned();
        if value.is_some() {
            self.stats.inc_fast_path_hits();
        }
        value
    }

    /// Like `get`, reporting why no value was obtained
    #[inline]
    pub fn wait_for(&self, key: &K) -> WaitResult<V> {
        self.wait_for_timeout(key, self.config.timeout)
    }

    /// Like `wait_for`, with a per-call timeout
    pub fn wait_for_timeout(&self, key: &K, timeout: Duration) -> WaitResult<V> {
        let deadline = Instant::now().checked_add(timeout);
        let registration = match self.lookup(key, timeout) {
            Lookup::Ready(value) => return Ok(value),
            Lookup::Expired => return Err(WaitError::Timeout),
            Lookup::Pending(registration) => registration,
        };

        let woken = registration.signal.wait_until(deadline);
        registration.complete(woken)
    }

    /// Async `get` for tokio tasks, waiting up to the configured timeout
    ///
    /// # Panics
    ///
    /// Panics on a miss if polled outside a tokio runtime with the time
    /// driver enabled. The reader is still deregistered.
    #[inline]
    pub async fn get_async(&self, key: &K) -> Option<V> {
        self.get_async_timeout(key, self.config.timeout).await
    }

    /// Async `get` with a per-call timeout
    ///
    /// # Panics
    ///
    /// Same runtime requirement as `get_async`.
    #[inline]
    pub async fn get_async_timeout(&self, key: &K, timeout: Duration) -> Option<V> {
        self.wait_for_async(key, timeout).await.ok()
    }

    /// Async `wait_for_timeout`
    ///
    /// Dropping the future before it resolves deregisters the reader.
    ///
    /// # Panics
    ///
    /// Panics on a miss with a finite deadline if polled outside a tokio
    /// runtime with the time driver enabled. The reader is still
    /// deregistered.
    pub async fn wait_for_async(&self, key: &K, timeout: Duration) -> WaitResult<V> {
        let deadline = Instant::now().checked_add(timeout);
        let registration = match self.lookup(key, timeout) {
            Lookup::Ready(value) => return Ok(value),
            Lookup::Expired => return Err(WaitError::Timeout),
            Lookup::Pending(registration) => registration,
        };

        let woken = registration.signal.wait_async(deadline).await;
        registration.complete(woken)
    }

    /// Remove `key` from the store
    ///
    /// Readers already waiting on the key are not woken.
    #[inline]
    pub fn delete(&self, key: &K) {
        self.remove(key);
    }

    /// Remove `key`, returning its value if it was present
    pub fn remove(&self, key: &K) -> Option<V> {
        self.shared.lock().store.remove(key)
    }

    /// Wake every waiting reader and empty the map
    ///
    /// The map stays usable and behaves as freshly constructed afterwards.
    pub fn close(&self) {
        let mut shared = self.shared.lock();
        let signals = shared.waiting.len();
        let entries = shared.store.len();

        let mut woken = 0;
        for (_, signal) in shared.waiting.drain() {
            woken += signal.fire(WakeReason::Closed).count();
        }
        *shared = Shared::with_capacity(self.config.initial_capacity);
        drop(shared);

        self.stats.add_signals_retired(signals as u64);
        self.stats.inc_closes();
        debug!(entries, signals, woken, "delay map closed");
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.shared.lock().store.contains_key(key)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.shared.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().store.is_empty()
    }

    /// Readers currently waiting on `key`
    pub fn waiter_count(&self, key: &K) -> usize {
        self.shared
            .lock()
            .waiting
            .get(key)
            .map_or(0, |signal| signal.waiters())
    }

    /// Keys with at least one waiting reader
    pub fn pending_keys(&self) -> usize {
        self.shared.lock().waiting.len()
    }

    /// Snapshot of the map's counters
    #[inline]
    pub fn stats(&self) -> DelayMapStats {
        self.stats.snapshot()
    }

    /// Fast path, or join the key's wait signal, in one critical section
    fn lookup<'a>(&'a self, key: &'a K, timeout: Duration) -> Lookup<'a, K, V> {
        let mut shared = self.shared.lock();

        if let Some(value) = shared.store.get(key) {
            self.stats.inc_fast_path_hits();
            return Lookup::Ready(value.clone());
        }

        if timeout.is_zero() {
            return Lookup::Expired;
        }

        let signal = match shared.waiting.get(key).cloned() {
            Some(signal) => signal,
            None => {
                let signal = Arc::new(WaitSignal::new());
                shared.waiting.insert(key.clone(), signal.clone());
                self.stats.inc_signals_created();
                signal
            }
        };
        let waiters = signal.join();
        drop(shared);

        self.stats.inc_waits_started();
        trace!(waiters, timeout_ms = timeout.as_millis() as u64, "waiting for key");

        Lookup::Pending(Registration {
            map: self,
            key,
            signal,
            active: true,
        })
    }

    /// Resolve a woken or timed-out reader under the lock
    fn finish_wait(
        &self,
        key: &K,
        signal: &Arc<WaitSignal>,
        woken: Option<WakeReason>,
    ) -> WaitResult<V> {
        let mut shared = self.shared.lock();
        self.leave(&mut shared, key, signal);
        let value = woken.and_then(|_| shared.store.get(key).cloned());
        drop(shared);

        let Some(reason) = woken else {
            self.stats.inc_timeouts();
            trace!("wait timed out");
            return Err(WaitError::Timeout);
        };

        match value {
            Some(value) => {
                self.stats.inc_waits_fulfilled();
                Ok(value)
            }
            None => {
                self.stats.inc_cancelled_waits();
                trace!(?reason, "woken without a value");
                Err(match reason {
                    WakeReason::Closed => WaitError::Closed,
                    WakeReason::Ready => WaitError::Removed,
                })
            }
        }
    }

    /// Deregister from `signal`, discarding it if it is still the key's
    /// live signal and nobody else is joined
    fn leave(&self, shared: &mut Shared<K, V>, key: &K, signal: &Arc<WaitSignal>) {
        if signal.leave() > 0 {
            return;
        }

        let is_live = shared
            .waiting
            .get(key)
            .is_some_and(|live| Arc::ptr_eq(live, signal));
        if is_live {
            shared.waiting.remove(key);
            self.stats.add_signals_retired(1);
            trace!("idle wait signal discarded");
        }
    }
}

impl<K, V> Default for DelayMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::with_config(DelayMapConfig::default())
    }
}

impl<K, V> std::fmt::Debug for DelayMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("DelayMap")
            .field("timeout", &self.config.timeout)
            .field("entries", &shared.store.len())
            .field("pending_keys", &shared.waiting.len())
            .finish()
    }
}
