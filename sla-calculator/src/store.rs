//! Append-only persistence of SLA indicators.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::SecondsFormat;
use oncall_primitives::SlaIndicator;
use rusqlite::{Connection, params};
use thiserror::Error;
use tokio::sync::Mutex;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS indicators (
    datetime TEXT NOT NULL,
    name TEXT NOT NULL,
    slo REAL NOT NULL,
    value REAL NOT NULL,
    is_bad INTEGER NOT NULL
)";

const INSERT_INDICATOR: &str =
    "INSERT INTO indicators (datetime, name, slo, value, is_bad) VALUES (?1, ?2, ?3, ?4, ?5)";

const SELECT_INDICATORS: &str =
    "SELECT datetime, name, slo, value, is_bad FROM indicators ORDER BY rowid";

/// Errors raised by indicator stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected a statement or could not be opened.
    #[error("sqlite error: {source}")]
    Sqlite {
        /// Source [`rusqlite::Error`].
        #[from]
        source: rusqlite::Error,
    },
    /// The database directory could not be prepared.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// One persisted indicator row.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    /// Snapshot instant, RFC 3339 in UTC.
    pub datetime: String,
    /// Indicator name.
    pub name: String,
    /// Objective threshold.
    pub slo: f64,
    /// Measured value.
    pub value: f64,
    /// Whether the value violated the objective.
    pub is_bad: bool,
}

/// Destination for computed indicators.
#[async_trait]
pub trait IndicatorStore: Send + Sync {
    /// Appends one indicator as its own row.
    async fn save(&self, indicator: &SlaIndicator) -> StoreResult<()>;
}

/// SQLite-backed store writing to the `indicators` table.
pub struct SqliteIndicatorStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteIndicatorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteIndicatorStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteIndicatorStore {
    /// Opens (or creates) the database at `path` and ensures the table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the parent directory cannot be created or
    /// the database cannot be opened or initialised.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        Self::init(conn, Some(path))
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the table cannot be created.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StoreResult<Self> {
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Database file, `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads every row in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] when the query fails.
    pub async fn rows(&self) -> StoreResult<Vec<IndicatorRow>> {
        let conn = self.conn.lock().await;
        let mut statement = conn.prepare(SELECT_INDICATORS)?;
        let rows = statement
            .query_map([], |row| {
                Ok(IndicatorRow {
                    datetime: row.get(0)?,
                    name: row.get(1)?,
                    slo: row.get(2)?,
                    value: row.get(3)?,
                    is_bad: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[async_trait]
impl IndicatorStore for SqliteIndicatorStore {
    async fn save(&self, indicator: &SlaIndicator) -> StoreResult<()> {
        let datetime = indicator
            .timestamp()
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        let conn = self.conn.lock().await;
        conn.execute(
            INSERT_INDICATOR,
            params![
                datetime,
                indicator.name(),
                indicator.slo(),
                indicator.value(),
                indicator.is_bad()
            ],
        )?;
        Ok(())
    }
}
