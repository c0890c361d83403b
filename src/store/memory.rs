//! In-memory record store.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::fingerprint::Fingerprint;
use crate::ScanResult;

use super::{AnalysisRecord, RecordStore, TallyCounter, TallyCounters};

/// Process-local store. Unbounded; nothing is ever evicted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Fingerprint, AnalysisRecord>>,
    mutant: AtomicU64,
    human: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, counter: TallyCounter) -> &AtomicU64 {
        match counter {
            TallyCounter::Mutant => &self.mutant,
            TallyCounter::Human => &self.human,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, fingerprint: &Fingerprint) -> ScanResult<Option<AnalysisRecord>> {
        Ok(self.records.read().await.get(fingerprint).cloned())
    }

    async fn put_if_absent(
        &self,
        fingerprint: &Fingerprint,
        record: &AnalysisRecord,
    ) -> ScanResult<bool> {
        // write lock covers both the existence check and the insert
        match self.records.write().await.entry(fingerprint.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(true)
            }
        }
    }

    async fn increment(&self, counter: TallyCounter) -> ScanResult<()> {
        self.counter(counter).fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn insert_and_tally(
        &self,
        fingerprint: &Fingerprint,
        record: &AnalysisRecord,
    ) -> ScanResult<bool> {
        let mut records = self.records.write().await;
        if records.contains_key(fingerprint) {
            return Ok(false);
        }
        records.insert(fingerprint.clone(), record.clone());
        // bumped before the lock drops so readers never see one without the other
        self.counter(record.counter()).fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn counters(&self) -> ScanResult<TallyCounters> {
        Ok(TallyCounters {
            mutant: self.mutant.load(Ordering::SeqCst),
            human: self.human.load(Ordering::SeqCst),
        })
    }

    async fn len(&self) -> ScanResult<usize> {
        Ok(self.records.read().await.len())
    }
}
