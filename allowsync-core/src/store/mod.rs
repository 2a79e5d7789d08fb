//! Remote store
//!
//! The shared SQLite database both tables live in. Every server instance
//! pointed at the same file sees the same authoritative lists. All
//! statements are parameterized and each upsert is atomic per record;
//! there is deliberately no pass-wide transaction (see the sync module).

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};

mod error;

pub use error::StoreError;

use crate::model::{MembershipRecord, OpRecord, DEFAULT_OP_LEVEL};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS whitelist (
        uuid TEXT NOT NULL PRIMARY KEY,
        name TEXT,
        whitelisted INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS op (
        uuid TEXT NOT NULL PRIMARY KEY,
        name TEXT,
        level INTEGER,
        bypassesPlayerLimit INTEGER,
        isOp INTEGER NOT NULL
    );
";

/// Handle to the shared database.
///
/// Cheap to clone; every clone shares the same connection pool. Each
/// reconciliation task checks a connection out of the pool for the
/// duration of its statements.
#[derive(Clone)]
pub struct RemoteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl RemoteStore {
    /// Open (creating if absent) the database at `path` and make sure
    /// both tables exist. Safe to call on every startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path.as_ref())
            .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
        let pool = Pool::builder().max_size(8).build(manager)?;

        let store = Self { pool };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create both tables if absent. Idempotent.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert or replace a whitelist row by primary key. A prior
    /// logical delete or name is fully overwritten, not merged.
    pub fn upsert_membership(&self, record: &MembershipRecord) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO whitelist (uuid, name, whitelisted) VALUES (?1, ?2, ?3)",
            params![record.uuid, record.name, record.whitelisted as i64],
        )?;
        Ok(())
    }

    /// Insert or replace an op row by primary key.
    pub fn upsert_op(&self, record: &OpRecord) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT OR REPLACE INTO op (uuid, name, level, bypassesPlayerLimit, isOp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.uuid,
                record.name,
                record.level,
                record.bypasses_player_limit as i64,
                record.is_op as i64,
            ],
        )?;
        Ok(())
    }

    /// Logically delete an op row: flip `isOp` to 0 while leaving
    /// `level` and `bypassesPlayerLimit` untouched on an existing row,
    /// so a later re-add can pick the attributes back up.
    pub fn remove_op(&self, uuid: &str, name: &str) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO op (uuid, name, isOp) VALUES (?1, ?2, 0)
             ON CONFLICT(uuid) DO UPDATE SET name = excluded.name, isOp = 0",
            params![uuid, name],
        )?;
        Ok(())
    }

    /// Every whitelist row, in storage order. Storage order is not
    /// guaranteed to reflect local list ordering; callers filter by the
    /// membership column.
    pub fn membership_rows(&self) -> Result<Vec<MembershipRecord>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT uuid, name, whitelisted FROM whitelist")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MembershipRecord {
                    uuid: row.get(0)?,
                    name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    whitelisted: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every op row, in storage order.
    pub fn op_rows(&self) -> Result<Vec<OpRecord>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT uuid, name, level, bypassesPlayerLimit, isOp FROM op")?;
        let rows = stmt
            .query_map([], map_op_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Look up a single op row by case-insensitive uuid match. Used by
    /// the add-op fast path to preserve a player's stored attributes.
    pub fn find_op(&self, uuid: &str) -> Result<Option<OpRecord>, StoreError> {
        let conn = self.pool.get()?;
        let record = conn
            .query_row(
                "SELECT uuid, name, level, bypassesPlayerLimit, isOp FROM op
                 WHERE uuid = ?1 COLLATE NOCASE",
                params![uuid],
                map_op_row,
            )
            .optional()?;
        Ok(record)
    }
}

fn map_op_row(row: &Row<'_>) -> Result<OpRecord, rusqlite::Error> {
    Ok(OpRecord {
        uuid: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        level: row.get::<_, Option<i64>>(2)?.unwrap_or(DEFAULT_OP_LEVEL),
        bypasses_player_limit: row.get::<_, Option<i64>>(3)?.unwrap_or(0) != 0,
        is_op: row.get::<_, i64>(4)? != 0,
    })
}
