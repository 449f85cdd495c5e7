use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use r2d2::{ManageConnection, Pool, PooledConnection};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Params, Row};
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::logging::OperationTimer;
use crate::metrics;

/// Opens SQLite connections for the pool
#[derive(Debug, Clone)]
pub struct SqliteConnectionManager {
    path: PathBuf,
    foreign_keys: bool,
}

impl SqliteConnectionManager {
    /// Manager for the database file at `path`
    #[must_use]
    pub fn file(path: impl Into<PathBuf>, foreign_keys: bool) -> Self {
        Self {
            path: path.into(),
            foreign_keys,
        }
    }
}

impl ManageConnection for SqliteConnectionManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    fn connect(&self) -> std::result::Result<Connection, rusqlite::Error> {
        let conn = Connection::open(&self.path)?;
        if self.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        Ok(conn)
    }

    fn is_valid(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch("SELECT 1;")
    }

    fn has_broken(&self, _conn: &mut Connection) -> bool {
        false
    }
}

/// Pool of SQLite connections
pub type DbPool = Pool<SqliteConnectionManager>;
/// A connection checked out of [`DbPool`]
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Result of a raw statement run through [`Database::execute_query`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A read returned these rows
    Rows {
        /// Column names in select order
        columns: Vec<String>,
        /// Row values, one vector per row
        rows: Vec<Vec<Value>>,
    },
    /// A write was committed, touching this many rows
    Committed(usize),
    /// The statement failed; the error has been logged
    Failed,
}

impl QueryOutcome {
    /// True unless the statement failed
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Database manager for handling connections and statements
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (creating if needed) the clinic database and apply migrations
    pub fn new(database_url: &str) -> Result<Self> {
        Self::with_config(&DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 1,
            connection_timeout_secs: 30,
            foreign_keys: true,
        })
    }

    /// Open the database described by a config section
    pub fn with_config(config: &DatabaseConfig) -> Result<Self> {
        let timer = OperationTimer::new("open_database");
        let path = database_path(&config.url);

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Idle connections are never reaped, so a pool of one is the single
        // long-lived connection for the whole process.
        let manager = SqliteConnectionManager::file(&path, config.foreign_keys);
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;

        let conn = pool.get()?;
        Self::run_migrations(&conn)?;
        drop(conn);

        info!(path = %path.display(), "Database ready");
        timer.finish();
        Ok(Self { pool })
    }

    /// Run database migrations
    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!(
            "../migrations/2026-10-19-000000_create_clinic_tables/up.sql"
        ))?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Run a select and map every row
    pub fn query_rows<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.timed("select", sql, |conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params, map)?;
            rows.collect::<rusqlite::Result<Vec<T>>>()
        })
    }

    /// Run a select expected to return at most one row
    pub fn query_optional<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.timed("select", sql, |conn| conn.query_row(sql, params, map).optional())
    }

    /// Run an update or delete, returning the number of affected rows
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize> {
        self.timed("write", sql, |conn| conn.execute(sql, params))
    }

    /// Run an insert, returning the new row id
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        self.timed("insert", sql, |conn| {
            conn.execute(sql, params)?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Execute one statement with positional parameters.
    ///
    /// Reads (`wants_rows`) return every row; writes are committed and
    /// report the affected row count. Any error is logged and reported as
    /// [`QueryOutcome::Failed`] rather than returned.
    pub fn execute_query(&self, sql: &str, params: &[Value], wants_rows: bool) -> QueryOutcome {
        let outcome = if wants_rows {
            self.timed("select", sql, |conn| {
                let mut stmt = conn.prepare(sql)?;
                let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
                let width = columns.len();
                let mut rows = stmt.query(params_from_iter(params.iter()))?;
                let mut values = Vec::new();
                while let Some(row) = rows.next()? {
                    let mut record = Vec::with_capacity(width);
                    for index in 0..width {
                        record.push(row.get::<_, Value>(index)?);
                    }
                    values.push(record);
                }
                Ok(QueryOutcome::Rows { columns, rows: values })
            })
        } else {
            self.timed("write", sql, |conn| {
                conn.execute(sql, params_from_iter(params.iter()))
                    .map(QueryOutcome::Committed)
            })
        };

        outcome.unwrap_or_else(|err| {
            error!(error = %err, sql, "Query failed");
            QueryOutcome::Failed
        })
    }

    fn timed<T, F>(&self, kind: &'static str, sql: &str, run: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        debug!(kind, sql, "Executing statement");
        let started = Instant::now();
        let result = self
            .get_connection()
            .and_then(|conn| run(&*conn).map_err(Into::into));
        metrics::record_query(kind, started.elapsed(), result.is_ok());
        result
    }
}

/// Strip an optional `sqlite:` / `sqlite://` scheme from a database URL
#[must_use]
pub fn database_path(url: &str) -> PathBuf {
    let trimmed = url.trim();
    let path = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    Path::new(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_strips_scheme() {
        assert_eq!(database_path("sqlite:data/clinic.db"), PathBuf::from("data/clinic.db"));
        assert_eq!(database_path("sqlite:///tmp/c.db"), PathBuf::from("/tmp/c.db"));
        assert_eq!(database_path("clinic.db"), PathBuf::from("clinic.db"));
    }

    #[test]
    fn execute_query_reports_rows_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("exec.db").to_str().unwrap()).unwrap();

        let outcome = db.execute_query(
            "SELECT ?1 + 1 AS answer",
            &[Value::Integer(41)],
            true,
        );
        assert_eq!(
            outcome,
            QueryOutcome::Rows {
                columns: vec!["answer".to_string()],
                rows: vec![vec![Value::Integer(42)]],
            }
        );

        assert_eq!(db.execute_query("SELECT * FROM NoSuchTable", &[], true), QueryOutcome::Failed);
        assert!(!db.execute_query("DELETE FROM NoSuchTable", &[], false).succeeded());
        assert_eq!(db.execute_query("DELETE FROM Bill", &[], false), QueryOutcome::Committed(0));
    }
}
