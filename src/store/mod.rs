//! Record store for analysis verdicts.
//!
//! The cache only needs an associative store with an atomic
//! insert-if-absent and two counters. Two backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local, lost on exit
//! - [`SqliteStore`]: durable, one SQLite file (feature `sqlite`)

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::types::config::{StoreBackend, StoreConfig};
use crate::ScanResult;

/// Persisted verdict for one grid content.
///
/// Created once at the first miss and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Content key.
    pub fingerprint: Fingerprint,

    /// Detector verdict.
    pub mutant: bool,

    /// When the verdict was first computed.
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// Creates a record stamped with the current time.
    pub fn new(fingerprint: Fingerprint, mutant: bool) -> Self {
        Self {
            fingerprint,
            mutant,
            created_at: Utc::now(),
        }
    }

    /// Counter this record is tallied under.
    pub fn counter(&self) -> TallyCounter {
        TallyCounter::for_verdict(self.mutant)
    }
}

/// Name of a tally counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyCounter {
    Mutant,
    Human,
}

impl TallyCounter {
    /// Counter for a verdict.
    pub fn for_verdict(mutant: bool) -> Self {
        if mutant {
            TallyCounter::Mutant
        } else {
            TallyCounter::Human
        }
    }

    /// Stable key used by durable backends.
    pub fn as_str(&self) -> &'static str {
        match self {
            TallyCounter::Mutant => "mutant",
            TallyCounter::Human => "human",
        }
    }
}

impl std::fmt::Display for TallyCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of both counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyCounters {
    pub mutant: u64,
    pub human: u64,
}

/// Associative store backing the analysis cache.
///
/// `put_if_absent` must be atomic with respect to the existence check:
/// of any number of concurrent calls for one fingerprint, exactly one
/// returns `true`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Looks up a record.
    async fn get(&self, fingerprint: &Fingerprint) -> ScanResult<Option<AnalysisRecord>>;

    /// Inserts `record` unless the key exists. Returns `true` if inserted.
    async fn put_if_absent(
        &self,
        fingerprint: &Fingerprint,
        record: &AnalysisRecord,
    ) -> ScanResult<bool>;

    /// Adds one to a counter.
    async fn increment(&self, counter: TallyCounter) -> ScanResult<()>;

    /// Inserts `record` and, only if it was new, bumps its counter.
    ///
    /// Backends that can do both in one transaction override this so a
    /// crash never leaves a record without its tally.
    async fn insert_and_tally(
        &self,
        fingerprint: &Fingerprint,
        record: &AnalysisRecord,
    ) -> ScanResult<bool> {
        let inserted = self.put_if_absent(fingerprint, record).await?;
        if inserted {
            self.increment(record.counter()).await?;
        }
        Ok(inserted)
    }

    /// Reads both counters.
    async fn counters(&self) -> ScanResult<TallyCounters>;

    /// Number of stored records.
    async fn len(&self) -> ScanResult<usize>;

    /// Whether the store holds no records.
    async fn is_empty(&self) -> ScanResult<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Opens the backend selected in `config`.
pub fn open_store(config: &StoreConfig) -> ScanResult<Arc<dyn RecordStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&config.db_path)?)),
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => Err(crate::ScanError::config(
            "sqlite backend requested but the `sqlite` feature is disabled",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_for_verdict() {
        assert_eq!(TallyCounter::for_verdict(true), TallyCounter::Mutant);
        assert_eq!(TallyCounter::for_verdict(false), TallyCounter::Human);
        assert_eq!(TallyCounter::Human.to_string(), "human");
    }

    #[test]
    fn test_record_counter() {
        let fp = Fingerprint::of_rows(&["A"]);
        assert_eq!(AnalysisRecord::new(fp.clone(), true).counter(), TallyCounter::Mutant);
        assert_eq!(AnalysisRecord::new(fp, false).counter(), TallyCounter::Human);
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..StoreConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.name(), "memory");
        assert!(store.is_empty().await.unwrap());
    }
}
