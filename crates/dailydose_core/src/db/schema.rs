//! Dose store schema and its upgrade path.
//!
//! `SCHEMA_STEPS[n]` upgrades a database from schema version `n` to `n + 1`.
//! The version reached is stored in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

const SCHEMA_STEPS: &[&str] = &[include_str!("schema_v1.sql")];

/// Schema version a freshly opened database ends up at.
pub const SCHEMA_VERSION: u32 = SCHEMA_STEPS.len() as u32;

/// Versions before and after [`upgrade_schema`] ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaUpgrade {
    pub from_version: u32,
    pub to_version: u32,
}

impl SchemaUpgrade {
    pub fn is_noop(&self) -> bool {
        self.from_version == self.to_version
    }
}

/// Reads the stored schema version.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the `tags`, `doses` and `history` tables up to [`SCHEMA_VERSION`].
///
/// A database written by a newer build is refused rather than downgraded.
/// All steps and the version bump commit together.
pub fn upgrade_schema(conn: &mut Connection) -> DbResult<SchemaUpgrade> {
    let from_version = schema_version(conn)?;
    if from_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let upgrade = SchemaUpgrade {
        from_version,
        to_version: SCHEMA_VERSION,
    };
    if upgrade.is_noop() {
        return Ok(upgrade);
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    for step in &SCHEMA_STEPS[from_version as usize..] {
        tx.execute_batch(step)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        upgrade.from_version, upgrade.to_version
    );
    Ok(upgrade)
}
