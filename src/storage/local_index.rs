// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local proof index
//!
//! Durable fingerprint → (content address, created_at) mapping. This table is
//! the only local record that a proof exists. Writes are single-statement
//! SQLite upserts, so a row is always replaced whole; the last committed
//! write for a fingerprint wins.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

use super::content_store::ContentAddress;
use crate::fingerprint::Fingerprint;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("index connection poisoned")]
    Poisoned,
    #[error("index task failed: {0}")]
    Task(String),
}

/// One row of the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub fingerprint: Fingerprint,
    pub address: ContentAddress,
    /// Unix seconds
    pub created_at: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalIndex: Send + Sync {
    /// Insert or fully replace the entry for `entry.fingerprint`
    ///
    /// Returns only after the write is durable.
    async fn upsert(&self, entry: IndexEntry) -> Result<(), IndexError>;

    /// Point lookup by fingerprint
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<IndexEntry>, IndexError>;

    /// Number of entries
    async fn count(&self) -> Result<u64, IndexError>;
}

/// SQLite-backed index
///
/// Table layout matches the `vault` table of existing deployments
/// (`image_hash`, `cid`, `created_at`) so an old `vault.db` opens as is.
#[derive(Clone)]
pub struct SqliteIndex {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteIndex {
    /// Open or create the index at `path` and run migrations
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        info!(
            "Opened proof index at {} (journal_mode={})",
            path.display(),
            journal_mode
        );
        Self::from_connection(conn)
    }

    /// Non-durable index for tests and dry runs
    pub fn open_in_memory() -> Result<Self, IndexError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, IndexError> {
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate(conn: &Connection) -> Result<(), IndexError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vault (
                image_hash TEXT PRIMARY KEY,
                cid TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Run `f` against the connection on the blocking pool
    ///
    /// The closure runs to completion even if the awaiting future is dropped.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, IndexError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| IndexError::Poisoned)?;
            f(&guard).map_err(IndexError::from)
        })
        .await
        .map_err(|e| IndexError::Task(e.to_string()))?
    }
}

#[async_trait]
impl LocalIndex for SqliteIndex {
    async fn upsert(&self, entry: IndexEntry) -> Result<(), IndexError> {
        debug!(
            "Index upsert {} -> {}",
            entry.fingerprint.short(),
            entry.address
        );
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO vault (image_hash, cid, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(image_hash) DO UPDATE SET cid = excluded.cid, created_at = excluded.created_at",
                params![
                    entry.fingerprint.as_str(),
                    entry.address.as_str(),
                    entry.created_at
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<IndexEntry>, IndexError> {
        let fingerprint = fingerprint.clone();
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    "SELECT cid, created_at FROM vault WHERE image_hash = ?1",
                    params![fingerprint.as_str()],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;

            Ok(row.map(|(cid, created_at)| IndexEntry {
                fingerprint,
                address: ContentAddress::new(cid),
                created_at,
            }))
        })
        .await
    }

    async fn count(&self) -> Result<u64, IndexError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM vault", [], |row| row.get::<_, i64>(0))
                .map(|n| n as u64)
        })
        .await
    }
}
