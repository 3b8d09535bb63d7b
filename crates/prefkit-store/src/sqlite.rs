// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Durable preference backend backed by SQLite.
//
// Schema:
//   prefs(
//     key        TEXT PRIMARY KEY,
//     kind       TEXT NOT NULL,   -- "string" | "string_set" | "int" | "bool"
//     value      TEXT NOT NULL,   -- encoded per kind, see `encode_value`
//     updated_at TEXT NOT NULL    -- RFC 3339
//   )
//
// Every statement runs in autocommit mode, so a write has been committed
// (and, with `synchronous = FULL`, flushed) by the time the call returns.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use prefkit_core::error::{PrefsError, Result};
use prefkit_core::{PrefKind, PrefValue, PrefsBackend, StoreConfig};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};

/// SQLite schema for the prefs table.
const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS prefs (
        key TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

/// Convert a `rusqlite::Error` into a `PrefsError::Database`.
fn db_err(context: &str, e: rusqlite::Error) -> PrefsError {
    PrefsError::Database(format!("{context}: {e}"))
}

/// Preference backend stored in a single SQLite file.
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so it lives behind a
/// mutex. Contention is negligible: every operation is one short statement.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) the store at `path`, creating parent directories.
    ///
    /// Enables WAL journal mode and applies the durability and busy-timeout
    /// settings from `config`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| db_err("open", e))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| db_err("WAL pragma", e))?;

        let synchronous = if config.synchronous_full { "FULL" } else { "NORMAL" };
        conn.pragma_update(None, "synchronous", synchronous)
            .map_err(|e| db_err("synchronous pragma", e))?;

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|e| db_err("busy timeout", e))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| db_err("create table", e))?;

        info!(synchronous, "preference store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| db_err("open in-memory", e))?;

        conn.execute_batch(CREATE_TABLE_SQL)
            .map_err(|e| db_err("create table", e))?;

        debug!("in-memory preference store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PrefsError::Database("connection lock poisoned".into()))
    }
}

impl PrefsBackend for SqliteBackend {
    fn backend_name(&self) -> &str {
        "SQLite"
    }

    fn load(&self, key: &str) -> Result<Option<PrefValue>> {
        let row: Option<(String, String)> = self
            .conn()?
            .query_row(
                "SELECT kind, value FROM prefs WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| db_err("load", e))?;

        match row {
            Some((kind, value)) => decode_value(key, &kind, &value).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, value), fields(kind = %value.kind()))]
    fn store(&self, key: &str, value: &PrefValue) -> Result<()> {
        let encoded = encode_value(value)?;
        let now = Utc::now().to_rfc3339();

        self.conn()?
            .execute(
                "INSERT INTO prefs (key, kind, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                    kind = excluded.kind,
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                params![key, value.kind().as_str(), encoded, now],
            )
            .map_err(|e| db_err("store", e))?;

        debug!("preference stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&self, key: &str) -> Result<()> {
        let rows = self
            .conn()?
            .execute("DELETE FROM prefs WHERE key = ?1", params![key])
            .map_err(|e| db_err("remove", e))?;

        debug!(removed = rows, "preference removed");
        Ok(())
    }

    #[instrument(skip(self))]
    fn clear(&self) -> Result<()> {
        let rows = self
            .conn()?
            .execute("DELETE FROM prefs", [])
            .map_err(|e| db_err("clear", e))?;

        info!(removed = rows, "preference store cleared");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT key FROM prefs ORDER BY key ASC")
            .map_err(|e| db_err("prepare keys", e))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| db_err("query keys", e))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(|e| db_err("read key", e))?);
        }
        Ok(keys)
    }
}

/// Encode a value into the text stored in the `value` column.
///
/// Strings are stored raw, integers as decimal, booleans as `true`/`false`,
/// and string sets as a sorted JSON array.
fn encode_value(value: &PrefValue) -> Result<String> {
    Ok(match value {
        PrefValue::String(s) => s.clone(),
        PrefValue::StringSet(set) => serde_json::to_string(set)?,
        PrefValue::Int(n) => n.to_string(),
        PrefValue::Bool(b) => b.to_string(),
    })
}

fn decode_value(key: &str, kind: &str, raw: &str) -> Result<PrefValue> {
    let corrupt = |reason: String| PrefsError::CorruptValue {
        key: key.to_owned(),
        reason,
    };

    let kind: PrefKind = kind.parse().map_err(corrupt)?;
    match kind {
        PrefKind::String => Ok(PrefValue::String(raw.to_owned())),
        PrefKind::StringSet => serde_json::from_str::<BTreeSet<String>>(raw)
            .map(PrefValue::StringSet)
            .map_err(|e| corrupt(format!("bad string set: {e}"))),
        PrefKind::Int => raw
            .parse::<i32>()
            .map(PrefValue::Int)
            .map_err(|e| corrupt(format!("bad int {raw:?}: {e}"))),
        PrefKind::Bool => match raw {
            "true" => Ok(PrefValue::Bool(true)),
            "false" => Ok(PrefValue::Bool(false)),
            other => Err(corrupt(format!("bad bool {other:?}"))),
        },
    }
}
