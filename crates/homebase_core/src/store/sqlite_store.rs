//! SQLite-backed collection store.
//!
//! Each domain is one row in `collections`; the body column holds the full
//! JSON document and `revision` counts successful writes.

use super::{ensure_domain, CollectionStore, Document, Domain, StoreError, StoreResult};
use crate::db::migrations::{current_user_version, latest_version};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Collection store over a migrated SQLite connection.
pub struct SqliteCollectionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollectionStore<'conn> {
    /// Wraps a connection opened through `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `StoreError::NotReady` when the schema has not been migrated.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let version = current_user_version(conn)?;
        let latest = latest_version();
        if version < latest {
            return Err(StoreError::NotReady(format!(
                "schema version {version} is older than {latest}; open the connection with open_db"
            )));
        }
        Ok(Self { conn })
    }

    /// Number of writes applied to `domain`; zero when never written.
    pub fn revision(&self, domain: Domain) -> StoreResult<u64> {
        let revision = self
            .conn
            .query_row(
                "SELECT revision FROM collections WHERE name = ?1;",
                [domain.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(revision.map_or(0, |value| u64::try_from(value).unwrap_or(0)))
    }
}

impl CollectionStore for SqliteCollectionStore<'_> {
    fn read(&self, domain: Domain) -> StoreResult<Document> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM collections WHERE name = ?1;",
                [domain.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match body {
            Some(body) => Document::from_json_str(domain, &body),
            None => {
                debug!(
                    "event=store_read module=store status=missing backend=sqlite domain={}",
                    domain
                );
                Ok(Document::empty(domain))
            }
        }
    }

    fn write(&self, domain: Domain, document: &Document) -> StoreResult<()> {
        ensure_domain(domain, document)?;
        let body = document.to_json_string()?;

        self.conn.execute(
            "INSERT INTO collections (name, body, updated_at, revision)
             VALUES (?1, ?2, CAST(strftime('%s','now') AS INTEGER) * 1000, 1)
             ON CONFLICT(name) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at,
                revision = collections.revision + 1;",
            params![domain.as_str(), body],
        )?;

        debug!(
            "event=store_write module=store status=ok backend=sqlite domain={} bytes={}",
            domain,
            body.len()
        );
        Ok(())
    }
}
