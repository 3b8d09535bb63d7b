// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic contract for the durable key-value store that sits
// behind the settings facade.

use crate::error::Result;
use crate::types::PrefValue;

/// Durable mapping from string key to [`PrefValue`].
///
/// Every mutating method must have committed the change to persistent
/// storage by the time it returns. Implementations serialize their own
/// access; the facade adds no locking of its own.
pub trait PrefsBackend: Send + Sync {
    /// Human-readable backend name (e.g. "SQLite", "Android SharedPreferences").
    fn backend_name(&self) -> &str;

    /// Load the value stored under `key`. Returns `None` if absent.
    fn load(&self, key: &str) -> Result<Option<PrefValue>>;

    /// Store `value` under `key`, replacing any previous value of any kind.
    fn store(&self, key: &str, value: &PrefValue) -> Result<()>;

    /// Delete `key`. Succeeds if the key does not exist.
    fn remove(&self, key: &str) -> Result<()>;

    /// Delete every entry.
    fn clear(&self) -> Result<()>;

    /// All stored keys, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}
