//! Integration tests for the analysis cache and tally.

use std::sync::Arc;

use mutant_scan::cache::AnalysisCache;
use mutant_scan::stats::{StatsReport, StatsService};
use mutant_scan::store::{MemoryStore, RecordStore, SqliteStore, TallyCounter};
use mutant_scan::types::config::CacheConfig;
use mutant_scan::Verdict;
use tempfile::TempDir;

const MUTANT: [&str; 4] = ["AAAA", "CCCC", "TTAT", "AGAC"];
const HUMAN: [&str; 4] = ["ATGC", "CAGT", "TTAT", "AGAT"];

fn memory_cache() -> (AnalysisCache, StatsService) {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    (
        AnalysisCache::with_store(Arc::clone(&store)),
        StatsService::new(store),
    )
}

mod memoization_tests {
    use super::*;

    #[tokio::test]
    async fn test_repeat_is_answered_without_scanning() {
        let (cache, _) = memory_cache();

        let first = cache.analyze(&MUTANT).await.unwrap();
        let second = cache.analyze(&MUTANT).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.stats().await.computations, 1);
    }

    #[tokio::test]
    async fn test_one_mutant_one_human() {
        let (cache, stats) = memory_cache();

        assert!(cache.analyze(&MUTANT).await.unwrap());
        assert!(!cache.analyze(&HUMAN).await.unwrap());

        let report = stats.get_stats().await.unwrap();
        assert_eq!(report, StatsReport::from_counts(1, 1));
        assert_eq!(report.ratio, 1.0);
    }

    #[tokio::test]
    async fn test_hits_do_not_move_the_tally() {
        let (cache, stats) = memory_cache();

        for _ in 0..5 {
            cache.analyze(&MUTANT).await.unwrap();
        }
        cache.analyze(&HUMAN).await.unwrap();
        for _ in 0..3 {
            cache.analyze(&HUMAN).await.unwrap();
        }

        let report = stats.get_stats().await.unwrap();
        assert_eq!(report.count_mutant_dna, 1);
        assert_eq!(report.count_human_dna, 1);
    }

    #[tokio::test]
    async fn test_mutants_without_humans_ratio() {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..5 {
            store.increment(TallyCounter::Mutant).await.unwrap();
        }

        let report = StatsService::new(store).get_stats().await.unwrap();
        assert_eq!(report.count_mutant_dna, 5);
        assert_eq!(report.count_human_dna, 0);
        assert_eq!(report.ratio, 5.0);
    }

    #[tokio::test]
    async fn test_malformed_inputs_leave_no_trace() {
        let (cache, stats) = memory_cache();
        let empty: [&str; 0] = [];

        assert!(!cache.analyze(&empty).await.unwrap());
        assert!(!cache.analyze(&["ATGCGA", "CAGTGC", "TTATGT"]).await.unwrap());
        assert!(matches!(
            cache.analyze_verdict(&["ATGC", "CAGT", "TTAN", "AGAT"]).await.unwrap(),
            Verdict::Invalid(_)
        ));

        assert!(cache.store().is_empty().await.unwrap());
        assert_eq!(stats.get_stats().await.unwrap(), StatsReport::from_counts(0, 0));
    }
}

mod concurrency_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_racing_first_use_counts_once() {
        let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::in_memory().unwrap());
        let config = CacheConfig {
            hot_enabled: false,
            ..CacheConfig::default()
        };
        let cache = AnalysisCache::new(Arc::clone(&store), &config);

        let mut handles = Vec::new();
        for i in 0..40 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    cache.analyze(&MUTANT).await
                } else {
                    cache.analyze(&HUMAN).await
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let counters = store.counters().await.unwrap();
        assert_eq!(counters.mutant, 1);
        assert_eq!(counters.human, 1);
        assert_eq!(store.len().await.unwrap(), 2);
        assert_eq!(cache.stats().await.computations, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_caches_sharing_one_store() {
        // two front ends over one store behave like two processes
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let a = AnalysisCache::with_store(Arc::clone(&store));
        let b = AnalysisCache::with_store(Arc::clone(&store));

        let (ra, rb) = tokio::join!(a.analyze(&MUTANT), b.analyze(&MUTANT));
        assert!(ra.unwrap());
        assert!(rb.unwrap());

        assert_eq!(store.counters().await.unwrap().mutant, 1);
        assert_eq!(store.len().await.unwrap(), 1);
    }
}

mod persistence_tests {
    use super::*;

    #[tokio::test]
    async fn test_verdicts_survive_restart() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("records.db");

        {
            let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(&db_path).unwrap());
            let cache = AnalysisCache::with_store(store);
            assert!(cache.analyze(&MUTANT).await.unwrap());
            assert!(!cache.analyze(&HUMAN).await.unwrap());
        }

        let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(&db_path).unwrap());
        let cache = AnalysisCache::with_store(Arc::clone(&store));
        assert!(cache.analyze(&MUTANT).await.unwrap());
        assert_eq!(cache.stats().await.computations, 0);

        let report = StatsService::new(store).get_stats().await.unwrap();
        assert_eq!(report, StatsReport::from_counts(1, 1));
    }
}
