// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The public cache facade.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::debug;
use parking_lot::Mutex;

use crate::bidi::{BidiEngine, UnicodeBidiEngine};
use crate::font::FontConfig;
use crate::key::{Direction, LookupKey, ShapeKey};
use crate::result::ShapeResult;
use crate::shaper::Shaper;
use crate::store::LruStore;

/// Default byte budget: 0.25 MiB.
pub const DEFAULT_MAX_BYTES: usize = 256 * 1024;

const DEFAULT_DUMP_INTERVAL: u32 = 100;

/// Construction-time settings for a [`ShapeCache`].
#[derive(Clone, Debug)]
pub struct CacheOptions {
    /// Upper bound on the summed byte size of admitted entries.
    pub max_bytes: usize,
    /// Enables hit/miss traces and the periodic statistics dump.
    pub debug_stats: bool,
    /// A statistics dump is emitted every `dump_interval`th hit.
    pub dump_interval: u32,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            debug_stats: std::env::var_os("SHAPECACHE_DEBUG").is_some(),
            dump_interval: DEFAULT_DUMP_INTERVAL,
        }
    }
}

/// Point-in-time view of the cache's counters.
///
/// The hit and saved-time counters only advance while
/// [`CacheOptions::debug_stats`] is enabled.
#[derive(Clone, Copy, Debug)]
pub struct CacheStats {
    pub entries: usize,
    pub max_bytes: usize,
    pub current_bytes: usize,
    pub hits: u32,
    pub nanos_saved: i64,
}

/// Memoizes shaping results under a byte budget.
///
/// All state sits behind a single mutex that is held for the whole of
/// [`get_or_compute`](Self::get_or_compute), including the shaping work on
/// a miss. A second caller requesting the same key during a miss therefore
/// waits and then hits: concurrent requests never compute the same entry
/// twice. The cache is shared across threads by reference (or inside an
/// `Arc`); results are handed out as `Arc<ShapeResult>` and stay alive for
/// as long as the cache or any caller holds them.
pub struct ShapeCache<S, B = UnicodeBidiEngine> {
    inner: Mutex<Inner<S, B>>,
}

struct Inner<S, B> {
    store: LruStore<ShapeKey<'static>, Arc<ShapeResult>>,
    /// Shared with the store's removal listener, which decrements it as
    /// entries are evicted.
    current_bytes: Arc<AtomicUsize>,
    max_bytes: usize,
    shaper: S,
    bidi: B,
    debug_stats: bool,
    dump_interval: u32,
    start_time: Instant,
    hits: u32,
    nanos_saved: i64,
}

impl<S: Shaper> ShapeCache<S> {
    /// Creates a cache over `shaper` with default options and the
    /// `unicode-bidi` resolver.
    pub fn new(shaper: S) -> Self {
        Self::with_engine(shaper, UnicodeBidiEngine::new(), CacheOptions::default())
    }

    pub fn with_options(shaper: S, options: CacheOptions) -> Self {
        Self::with_engine(shaper, UnicodeBidiEngine::new(), options)
    }
}

impl<S: Shaper, B: BidiEngine> ShapeCache<S, B> {
    /// Creates a cache over `shaper` with a caller-supplied bidi engine.
    pub fn with_engine(shaper: S, bidi: B, options: CacheOptions) -> Self {
        let current_bytes = Arc::new(AtomicUsize::new(0));
        let mut store: LruStore<ShapeKey<'static>, Arc<ShapeResult>> = LruStore::new();
        let evicted = Arc::clone(&current_bytes);
        let debug_stats = options.debug_stats;
        store.set_on_removed(Box::new(move |_key, _value, weight| {
            evicted.fetch_sub(weight, Ordering::Relaxed);
            if debug_stats {
                debug!("shaping cache entry removed, size = {weight}");
            }
        }));
        Self {
            inner: Mutex::new(Inner {
                store,
                current_bytes,
                max_bytes: options.max_bytes,
                shaper,
                bidi,
                debug_stats,
                dump_interval: options.dump_interval.max(1),
                start_time: Instant::now(),
                hits: 0,
                nanos_saved: 0,
            }),
        }
    }

    /// Returns the shaped form of `text` under `font` and `direction`,
    /// computing it on a miss and admitting the entry if it fits the byte
    /// budget.
    ///
    /// An entry larger than the whole budget is computed and returned but
    /// never admitted.
    pub fn get_or_compute(
        &self,
        font: &FontConfig,
        text: &[u16],
        direction: Direction,
    ) -> Arc<ShapeResult> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;
        let start = Instant::now();

        let key = ShapeKey::new(font, text, direction);
        if let Some(value) = inner.store.get(&LookupKey(&key)) {
            let value = Arc::clone(value);
            inner.record_hit(&value, start);
            return value;
        }

        let mut result = ShapeResult::new();
        result.compute(&mut inner.shaper, &mut inner.bidi, font, text, direction);
        result.set_elapsed(start.elapsed().as_nanos() as u64);
        let value = Arc::new(result);

        let entry_bytes = key.size() + value.size();
        if entry_bytes > inner.max_bytes {
            // Computed but too big to hold; the caller still gets it.
            if inner.debug_stats {
                debug!(
                    "shaping miss, entry of {entry_bytes} bytes exceeds the {} byte budget",
                    inner.max_bytes
                );
            }
            return value;
        }

        inner.shrink_to(inner.max_bytes - entry_bytes);
        inner.current_bytes.fetch_add(entry_bytes, Ordering::Relaxed);
        inner.store.put(key.into_owned(), Arc::clone(&value), entry_bytes);

        if inner.debug_stats {
            debug!(
                "shaping miss, added entry of {entry_bytes} bytes, {} bytes remaining",
                inner.max_bytes - inner.current_bytes.load(Ordering::Relaxed)
            );
        }
        value
    }

    /// The configured byte budget.
    pub fn max_bytes(&self) -> usize {
        self.inner.lock().max_bytes
    }

    /// Reconfigures the byte budget, evicting oldest entries until the
    /// held entries fit.
    pub fn set_max_bytes(&self, max_bytes: usize) {
        let mut inner = self.inner.lock();
        inner.max_bytes = max_bytes;
        inner.shrink_to(max_bytes);
    }

    /// Summed byte size of the held entries.
    pub fn current_bytes(&self) -> usize {
        self.inner.lock().current_bytes.load(Ordering::Relaxed)
    }

    /// Number of held entries.
    pub fn len(&self) -> usize {
        self.inner.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry, releasing the cache's references to the held
    /// results. Results still held by callers stay alive.
    pub fn clear(&self) {
        self.inner.lock().store.clear();
    }

    /// Emits the statistics block to the log, regardless of the debug
    /// setting.
    pub fn dump_stats(&self) {
        self.inner.lock().dump_stats();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.store.len(),
            max_bytes: inner.max_bytes,
            current_bytes: inner.current_bytes.load(Ordering::Relaxed),
            hits: inner.hits,
            nanos_saved: inner.nanos_saved,
        }
    }
}

impl<S, B> Inner<S, B> {
    /// Evicts oldest entries until the held bytes are at or under
    /// `budget`.
    fn shrink_to(&mut self, budget: usize) {
        while self.current_bytes.load(Ordering::Relaxed) > budget {
            if !self.store.remove_oldest() {
                break;
            }
        }
    }

    fn record_hit(&mut self, value: &Arc<ShapeResult>, start: Instant) {
        if !self.debug_stats {
            return;
        }
        let through_get = start.elapsed().as_nanos() as i64;
        self.nanos_saved += value.elapsed() as i64 - through_get;
        self.hits += 1;
        if value.elapsed() > 0 {
            debug!(
                "shaping hit #{}, compute took {}ns, lookup took {through_get}ns",
                self.hits,
                value.elapsed()
            );
        }
        if self.hits % self.dump_interval == 0 {
            self.dump_stats();
        }
    }

    fn dump_stats(&self) {
        let current = self.current_bytes.load(Ordering::Relaxed);
        let remaining = self.max_bytes.saturating_sub(current);
        let remaining_percent = if self.max_bytes == 0 {
            0.0
        } else {
            100.0 * remaining as f32 / self.max_bytes as f32
        };
        debug!("------------------------------------------------");
        debug!("shaping cache stats");
        debug!("------------------------------------------------");
        debug!("pid       : {}", std::process::id());
        debug!("running   : {:.0} seconds", self.start_time.elapsed().as_secs_f32());
        debug!("entries   : {}", self.store.len());
        debug!("size      : {} bytes", self.max_bytes);
        debug!("remaining : {remaining} bytes or {remaining_percent:2.2} percent");
        debug!("hits      : {}", self.hits);
        debug!("saved     : {} milliseconds", self.nanos_saved / 1_000_000);
        debug!("------------------------------------------------");
    }
}
