//! Tally reporting.
//!
//! The counters are maintained by the analysis cache on first-time
//! computations only; this module just reads and reports them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::{RecordStore, TallyCounters};
use crate::ScanResult;

/// Mutant vs. human tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub count_mutant_dna: u64,
    pub count_human_dna: u64,
    pub ratio: f64,
}

impl StatsReport {
    /// Builds a report, computing `ratio = mutant / human`.
    ///
    /// With no humans the ratio is the mutant count itself (so `0.0` when
    /// both are zero), not a division by zero.
    pub fn from_counts(mutant: u64, human: u64) -> Self {
        let ratio = if human == 0 {
            mutant as f64
        } else {
            mutant as f64 / human as f64
        };

        Self {
            count_mutant_dna: mutant,
            count_human_dna: human,
            ratio,
        }
    }
}

impl From<TallyCounters> for StatsReport {
    fn from(counters: TallyCounters) -> Self {
        Self::from_counts(counters.mutant, counters.human)
    }
}

/// Reads the tally from a record store.
#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn RecordStore>,
}

impl StatsService {
    /// Creates a service over `store`.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Current tally.
    pub async fn get_stats(&self) -> ScanResult<StatsReport> {
        let counters = self.store.counters().await?;
        tracing::debug!(mutant = counters.mutant, human = counters.human, "Stats read");
        Ok(counters.into())
    }
}
