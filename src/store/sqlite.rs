//! SQLite-backed record store.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tokio::sync::Mutex;

use crate::fingerprint::Fingerprint;
use crate::ScanResult;

use super::{AnalysisRecord, RecordStore, TallyCounter, TallyCounters};

/// How long a writer waits for another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS dna_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dna_hash TEXT NOT NULL UNIQUE,
        is_mutant BOOLEAN NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS tally (
        name TEXT PRIMARY KEY,
        count INTEGER NOT NULL DEFAULT 0
    );

    INSERT OR IGNORE INTO tally (name, count) VALUES ('mutant', 0);
    INSERT OR IGNORE INTO tally (name, count) VALUES ('human', 0);
"#;

/// Durable store in a single SQLite database.
///
/// The `UNIQUE` constraint on `dna_hash` makes `INSERT OR IGNORE` the
/// insert-if-absent primitive, so two processes sharing the file still
/// agree on a single record per fingerprint. Writers wait up to
/// [`BUSY_TIMEOUT`] for each other's locks; past that the write fails with
/// `SQLITE_BUSY`.
pub struct SqliteStore {
    // Mutex rather than RwLock: rusqlite::Connection is not Sync
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `db_path`.
    pub fn open(db_path: &Path) -> ScanResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::info!("Directory created: {}", parent.display());
            }
        }
        let conn = Connection::open(db_path)?;
        tracing::debug!(path = %db_path.display(), "Opened SQLite record store");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> ScanResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> ScanResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn insert(conn: &Connection, record: &AnalysisRecord) -> rusqlite::Result<bool> {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO dna_records (dna_hash, is_mutant, created_at)
             VALUES (?1, ?2, ?3)",
            params![
                record.fingerprint.as_str(),
                record.mutant,
                record.created_at.to_rfc3339()
            ],
        )?;
        Ok(changed == 1)
    }

    fn bump(conn: &Connection, counter: TallyCounter) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO tally (name, count) VALUES (?1, 1)
             ON CONFLICT(name) DO UPDATE SET count = count + 1",
            params![counter.as_str()],
        )?;
        Ok(())
    }

    fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, fingerprint: &Fingerprint) -> ScanResult<Option<AnalysisRecord>> {
        let conn = self.conn.lock().await;
        let record = conn
            .query_row(
                "SELECT dna_hash, is_mutant, created_at FROM dna_records WHERE dna_hash = ?1",
                params![fingerprint.as_str()],
                |row| {
                    let fingerprint = Fingerprint::parse(&row.get::<_, String>(0)?)
                        .map_err(|e| Self::conversion_error(0, e))?;
                    let created_at = row
                        .get::<_, String>(2)?
                        .parse::<DateTime<Utc>>()
                        .map_err(|e| Self::conversion_error(2, e))?;
                    Ok(AnalysisRecord {
                        fingerprint,
                        mutant: row.get(1)?,
                        created_at,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    async fn put_if_absent(
        &self,
        _fingerprint: &Fingerprint,
        record: &AnalysisRecord,
    ) -> ScanResult<bool> {
        let conn = self.conn.lock().await;
        Ok(Self::insert(&conn, record)?)
    }

    async fn increment(&self, counter: TallyCounter) -> ScanResult<()> {
        let conn = self.conn.lock().await;
        Ok(Self::bump(&conn, counter)?)
    }

    async fn insert_and_tally(
        &self,
        _fingerprint: &Fingerprint,
        record: &AnalysisRecord,
    ) -> ScanResult<bool> {
        let mut conn = self.conn.lock().await;
        // take the write lock up front so the busy handler covers it
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = Self::insert(&tx, record)?;
        if inserted {
            Self::bump(&tx, record.counter())?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    async fn counters(&self) -> ScanResult<TallyCounters> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT name, count FROM tally")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counters = TallyCounters::default();
        for row in rows {
            let (name, count) = row?;
            let count = count.max(0) as u64;
            match name.as_str() {
                "mutant" => counters.mutant = count,
                "human" => counters.human = count,
                other => tracing::warn!(counter = other, "Ignoring unknown tally counter"),
            }
        }
        Ok(counters)
    }

    async fn len(&self) -> ScanResult<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM dna_records", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}
