//! Analysis cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;

use crate::detector::Detector;
use crate::fingerprint::Fingerprint;
use crate::store::{AnalysisRecord, RecordStore};
use crate::types::config::CacheConfig;
use crate::types::grid::Grid;
use crate::types::requests::DnaRequest;
use crate::types::responses::Verdict;
use crate::{ScanError, ScanResult};

/// Cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Answers served from the hot layer or the store.
    pub hits: u64,

    /// Grids seen for the first time.
    pub misses: u64,

    /// Detector runs. Equals `misses` unless another writer raced us.
    pub computations: u64,

    /// Malformed grids turned away before fingerprinting.
    pub rejected: u64,

    /// Verdicts currently in the hot layer.
    pub hot_entries: usize,

    /// Hot layer capacity (0 when disabled).
    pub hot_capacity: usize,
}

impl CacheStats {
    /// Fraction of well-formed lookups answered without scanning.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner {
    store: Arc<dyn RecordStore>,
    detector: Detector,
    hot: Option<Mutex<LruCache<Fingerprint, bool>>>,
    in_flight: Mutex<HashMap<Fingerprint, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
    rejected: AtomicU64,
}

/// Memoizing front end to the [`Detector`].
///
/// Cheap to clone; clones share the store, hot layer and counters.
#[derive(Clone)]
pub struct AnalysisCache {
    inner: Arc<Inner>,
}

impl AnalysisCache {
    /// Creates a cache over `store`.
    pub fn new(store: Arc<dyn RecordStore>, config: &CacheConfig) -> Self {
        let hot = if config.hot_enabled {
            NonZeroUsize::new(config.hot_capacity).map(|cap| Mutex::new(LruCache::new(cap)))
        } else {
            None
        };

        Self {
            inner: Arc::new(Inner {
                store,
                detector: Detector::new(),
                hot,
                in_flight: Mutex::new(HashMap::new()),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                computations: AtomicU64::new(0),
                rejected: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a cache with default settings.
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        Self::new(store, &CacheConfig::default())
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.inner.store
    }

    /// Whether `rows` is a mutant. Malformed input yields `Ok(false)` and
    /// leaves the store and tally untouched.
    pub async fn analyze<S: AsRef<str>>(&self, rows: &[S]) -> ScanResult<bool> {
        Ok(self.analyze_verdict(rows).await?.is_mutant())
    }

    /// Like [`analyze`](Self::analyze) but keeps malformed input apart.
    pub async fn analyze_verdict<S: AsRef<str>>(&self, rows: &[S]) -> ScanResult<Verdict> {
        match Grid::parse(rows) {
            Ok(grid) => Ok(Verdict::from_mutant(self.analyze_grid(grid).await?)),
            Err(reason) => Ok(self.reject(reason)),
        }
    }

    /// Analyzes a transport request, where rows may be null.
    pub async fn analyze_request(&self, request: &DnaRequest) -> ScanResult<Verdict> {
        match request.grid() {
            Ok(grid) => Ok(Verdict::from_mutant(self.analyze_grid(grid).await?)),
            Err(reason) => {
                tracing::debug!(request_id = %request.request_id, "Rejected DNA request");
                Ok(self.reject(reason))
            }
        }
    }

    /// Analyzes a validated grid.
    ///
    /// The miss path runs on its own task: if the caller goes away the
    /// computation still commits, so the work is never repeated.
    pub async fn analyze_grid(&self, grid: Grid) -> ScanResult<bool> {
        let fingerprint = Fingerprint::of(&grid);

        if let Some(mutant) = self.hot_get(&fingerprint).await {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(fingerprint = %fingerprint.short(), mutant, "Hot cache hit");
            return Ok(mutant);
        }

        let cache = self.clone();
        tokio::spawn(async move { cache.resolve_exclusive(grid, fingerprint).await })
            .await
            .map_err(|e| ScanError::other(format!("analysis task failed: {}", e)))?
    }

    /// Returns cache counters.
    pub async fn stats(&self) -> CacheStats {
        let (hot_entries, hot_capacity) = match &self.inner.hot {
            Some(hot) => {
                let hot = hot.lock().await;
                (hot.len(), hot.cap().get())
            }
            None => (0, 0),
        };

        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            computations: self.inner.computations.load(Ordering::Relaxed),
            rejected: self.inner.rejected.load(Ordering::Relaxed),
            hot_entries,
            hot_capacity,
        }
    }

    fn reject(&self, reason: crate::types::grid::GridError) -> Verdict {
        self.inner.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(reason = %reason, "Malformed DNA grid, not analyzed");
        Verdict::Invalid(reason)
    }

    /// Holds the per-fingerprint lock for the lookup, scan and commit.
    async fn resolve_exclusive(&self, grid: Grid, fingerprint: Fingerprint) -> ScanResult<bool> {
        let key_lock = {
            let mut in_flight = self.inner.in_flight.lock().await;
            Arc::clone(
                in_flight
                    .entry(fingerprint.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };

        let result = {
            let _guard = key_lock.lock().await;
            self.resolve(&grid, &fingerprint).await
        };

        self.release(&fingerprint, key_lock).await;
        result
    }

    async fn resolve(&self, grid: &Grid, fingerprint: &Fingerprint) -> ScanResult<bool> {
        let store = &self.inner.store;

        if let Some(record) = store.get(fingerprint).await? {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(fingerprint = %fingerprint.short(), mutant = record.mutant, "Store hit");
            self.hot_put(fingerprint, record.mutant).await;
            return Ok(record.mutant);
        }

        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        self.inner.computations.fetch_add(1, Ordering::Relaxed);
        let mutant = self.inner.detector.is_mutant_grid(grid);

        let record = AnalysisRecord::new(fingerprint.clone(), mutant);
        let mutant = if store.insert_and_tally(fingerprint, &record).await? {
            tracing::info!(
                fingerprint = %fingerprint.short(),
                size = grid.size(),
                mutant,
                store = store.name(),
                "New DNA analyzed"
            );
            mutant
        } else {
            // another process sharing the store committed first; its record wins
            let stored = store
                .get(fingerprint)
                .await?
                .map(|r| r.mutant)
                .ok_or_else(|| ScanError::store("record vanished after a rejected insert"))?;
            tracing::warn!(fingerprint = %fingerprint.short(), "Lost insert race to another writer");
            stored
        };

        self.hot_put(fingerprint, mutant).await;
        Ok(mutant)
    }

    /// Drops the per-key lock entry once nobody else is waiting on it.
    async fn release(&self, fingerprint: &Fingerprint, key_lock: Arc<Mutex<()>>) {
        let mut in_flight = self.inner.in_flight.lock().await;
        // one reference in the map, one held here
        if Arc::strong_count(&key_lock) <= 2 {
            in_flight.remove(fingerprint);
        }
    }

    async fn hot_get(&self, fingerprint: &Fingerprint) -> Option<bool> {
        match &self.inner.hot {
            Some(hot) => hot.lock().await.get(fingerprint).copied(),
            None => None,
        }
    }

    async fn hot_put(&self, fingerprint: &Fingerprint, mutant: bool) {
        if let Some(hot) = &self.inner.hot {
            hot.lock().await.put(fingerprint.clone(), mutant);
        }
    }
}
