//! SQLite connection for the jumper background state.
//!
//! [`Database`] runs migrations on open and exposes the keyed JSON backup rows
//! that the viewer store writes through to.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::migrations;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file and brings the schema up to date.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open(path)?)
    }

    /// In-memory database, discarded on drop. Used by tests and the demo.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Serialized backup stored under `key`, if any.
    pub fn read_backup(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT data FROM viewer_backup WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    /// Replaces the backup stored under `key`.
    pub fn write_backup(&self, key: &str, data: &str, updated_at: i64) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO viewer_backup (key, data, updated_at) VALUES (?1, ?2, ?3)",
            params![key, data, updated_at],
        )?;
        Ok(())
    }

    /// Drops the backup under `key`. Returns whether a row existed.
    pub fn clear_backup(&self, key: &str) -> Result<bool, rusqlite::Error> {
        let removed = self
            .conn
            .execute("DELETE FROM viewer_backup WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }
}
