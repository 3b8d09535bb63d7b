// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed settings facade over a durable preference backend.
//
// Reads of a key that was never written resolve to the caller's default.
// Reads through an accessor whose kind differs from the stored value fail
// with `PrefsError::TypeMismatch`; nothing is ever coerced.

use std::collections::{BTreeMap, BTreeSet};

use prefkit_core::error::{PrefsError, Result};
use prefkit_core::{InitContext, PrefKind, PrefValue, PrefsBackend, StoreConfig};
use tracing::{debug, info, instrument};

use crate::memory::MemoryBackend;
use crate::sqlite::SqliteBackend;

/// Typed access to one durable key-value mapping.
///
/// A composition root normally builds exactly one of these and hands out
/// `Arc<SettingsStore>`; [`crate::instance`] offers the same guarantee as a
/// lazily-initialised process-wide slot.
pub struct SettingsStore {
    backend: Box<dyn PrefsBackend>,
}

impl SettingsStore {
    /// Wrap an already-open backend.
    pub fn new(backend: Box<dyn PrefsBackend>) -> Self {
        Self { backend }
    }

    /// Open the SQLite store described by `ctx`.
    ///
    /// Reads `prefkit.json` from the context's data directory (defaults if
    /// absent) and fails if the store file cannot be opened.
    #[instrument(skip_all, fields(namespace = %ctx.namespace))]
    pub fn open(ctx: &InitContext) -> Result<Self> {
        let config = StoreConfig::load(&ctx.data_dir);
        Self::open_with_config(ctx, &config)
    }

    /// Open the SQLite store described by `ctx` with an explicit configuration.
    pub fn open_with_config(ctx: &InitContext, config: &StoreConfig) -> Result<Self> {
        let path = ctx.store_path(config);
        let backend = SqliteBackend::open(&path, config)?;
        info!(path = %path.display(), "settings store ready");
        Ok(Self::new(Box::new(backend)))
    }

    /// A store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.backend_name()
    }

    // -- Strings -------------------------------------------------------------

    pub fn save_string(&self, key: &str, value: &str) -> Result<()> {
        self.save(key, PrefValue::String(value.to_owned()))
    }

    pub fn get_string(&self, key: &str, default: &str) -> Result<String> {
        match self.backend.load(key)? {
            None => Ok(default.to_owned()),
            Some(PrefValue::String(s)) => Ok(s),
            Some(other) => Err(mismatch(key, PrefKind::String, &other)),
        }
    }

    // -- String sets ---------------------------------------------------------

    pub fn save_string_set<I, S>(&self, key: &str, value: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = value.into_iter().map(Into::into).collect();
        self.save(key, PrefValue::StringSet(set))
    }

    pub fn get_string_set(&self, key: &str, default: BTreeSet<String>) -> Result<BTreeSet<String>> {
        match self.backend.load(key)? {
            None => Ok(default),
            Some(PrefValue::StringSet(set)) => Ok(set),
            Some(other) => Err(mismatch(key, PrefKind::StringSet, &other)),
        }
    }

    // -- Integers ------------------------------------------------------------

    pub fn save_int(&self, key: &str, value: i32) -> Result<()> {
        self.save(key, PrefValue::Int(value))
    }

    pub fn get_int(&self, key: &str, default: i32) -> Result<i32> {
        match self.backend.load(key)? {
            None => Ok(default),
            Some(PrefValue::Int(n)) => Ok(n),
            Some(other) => Err(mismatch(key, PrefKind::Int, &other)),
        }
    }

    // -- Booleans ------------------------------------------------------------

    pub fn save_bool(&self, key: &str, value: bool) -> Result<()> {
        self.save(key, PrefValue::Bool(value))
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.backend.load(key)? {
            None => Ok(default),
            Some(PrefValue::Bool(b)) => Ok(b),
            Some(other) => Err(mismatch(key, PrefKind::Bool, &other)),
        }
    }

    // -- Untyped access ------------------------------------------------------

    /// Store any value. The previous value's kind, if any, does not matter.
    pub fn save(&self, key: &str, value: PrefValue) -> Result<()> {
        debug!(key, kind = %value.kind(), "saving preference");
        self.backend.store(key, &value)
    }

    /// The stored value, whatever its kind.
    pub fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        self.backend.load(key)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.backend.load(key)?.is_some())
    }

    /// Kind of the value stored under `key`, if any.
    pub fn kind_of(&self, key: &str) -> Result<Option<PrefKind>> {
        Ok(self.backend.load(key)?.map(|v| v.kind()))
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = self.backend.keys()?;
        keys.sort();
        Ok(keys)
    }

    /// Every entry currently stored.
    pub fn snapshot(&self) -> Result<BTreeMap<String, PrefValue>> {
        let mut entries = BTreeMap::new();
        for key in self.backend.keys()? {
            // A concurrent remove between listing and loading just drops the key.
            if let Some(value) = self.backend.load(&key)? {
                entries.insert(key, value);
            }
        }
        Ok(entries)
    }

    // -- Removal -------------------------------------------------------------

    /// Delete `key`. Absent keys are not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        debug!(key, "removing preference");
        self.backend.remove(key)
    }

    pub fn clear(&self) -> Result<()> {
        info!(backend = self.backend_name(), "clearing all preferences");
        self.backend.clear()
    }
}

fn mismatch(key: &str, expected: PrefKind, found: &PrefValue) -> PrefsError {
    PrefsError::TypeMismatch {
        key: key.to_owned(),
        expected,
        found: found.kind(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stores() -> Vec<SettingsStore> {
        vec![
            SettingsStore::in_memory(),
            SettingsStore::new(Box::new(
                SqliteBackend::open_in_memory().expect("open in-memory sqlite"),
            )),
        ]
    }

    fn set_of(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unwritten_keys_return_defaults() {
        for store in stores() {
            assert_eq!(store.get_string("nope", "d").unwrap(), "d");
            assert_eq!(store.get_int("nope", 42).unwrap(), 42);
            assert!(store.get_bool("nope", true).unwrap());
            assert_eq!(
                store.get_string_set("nope", set_of(&["x"])).unwrap(),
                set_of(&["x"])
            );
        }
    }

    #[test]
    fn written_values_ignore_default() {
        for store in stores() {
            store.save_string("name", "looper").unwrap();
            store.save_int("count", -17).unwrap();
            store.save_bool("enabled", false).unwrap();

            assert_eq!(store.get_string("name", "other").unwrap(), "looper");
            assert_eq!(store.get_int("count", 0).unwrap(), -17);
            assert!(!store.get_bool("enabled", true).unwrap());
        }
    }

    #[test]
    fn string_set_keeps_exact_membership() {
        for store in stores() {
            store.save_string_set("letters", ["c", "a", "b"]).unwrap();
            let read = store.get_string_set("letters", BTreeSet::new()).unwrap();
            assert_eq!(read, set_of(&["a", "b", "c"]));
        }
    }

    #[test]
    fn duplicate_set_members_collapse() {
        let store = SettingsStore::in_memory();
        store.save_string_set("dup", ["a", "a", "b"]).unwrap();
        assert_eq!(store.get_string_set("dup", BTreeSet::new()).unwrap().len(), 2);
    }

    #[test]
    fn remove_restores_default() {
        for store in stores() {
            store.save_int("retries", 3).unwrap();
            assert_eq!(store.get_int("retries", 0).unwrap(), 3);

            store.remove("retries").unwrap();
            assert_eq!(store.get_int("retries", 0).unwrap(), 0);
        }
    }

    #[test]
    fn remove_absent_key_is_noop() {
        for store in stores() {
            store.remove("never-written").expect("remove absent key");
        }
    }

    #[test]
    fn clear_restores_defaults_for_every_key() {
        for store in stores() {
            store.save_string("a", "1").unwrap();
            store.save_int("b", 2).unwrap();
            store.save_bool("c", true).unwrap();
            store.save_string_set("d", ["x"]).unwrap();

            store.clear().unwrap();

            assert_eq!(store.get_string("a", "none").unwrap(), "none");
            assert_eq!(store.get_int("b", 0).unwrap(), 0);
            assert!(!store.get_bool("c", false).unwrap());
            assert!(store.get_string_set("d", BTreeSet::new()).unwrap().is_empty());
            assert!(store.keys().unwrap().is_empty());
        }
    }

    #[test]
    fn wrong_accessor_is_type_mismatch() {
        for store in stores() {
            store.save_bool("flag", true).unwrap();
            match store.get_string("flag", "x") {
                Err(PrefsError::TypeMismatch {
                    key,
                    expected,
                    found,
                }) => {
                    assert_eq!(key, "flag");
                    assert_eq!(expected, PrefKind::String);
                    assert_eq!(found, PrefKind::Bool);
                }
                other => panic!("expected TypeMismatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn every_cross_kind_read_fails() {
        let store = SettingsStore::in_memory();
        store.save_string("s", "v").unwrap();
        store.save_int("i", 1).unwrap();

        assert!(store.get_int("s", 0).is_err());
        assert!(store.get_bool("s", false).is_err());
        assert!(store.get_string_set("s", BTreeSet::new()).is_err());
        assert!(store.get_string("i", "").is_err());
    }

    // Overwriting with a different kind is allowed; the last write decides
    // which accessor succeeds.
    #[test]
    fn last_write_kind_wins() {
        for store in stores() {
            store.save_int("mode", 1).unwrap();
            store.save_string("mode", "dark").unwrap();

            assert_eq!(store.kind_of("mode").unwrap(), Some(PrefKind::String));
            assert_eq!(store.get_string("mode", "").unwrap(), "dark");
            assert!(store.get_int("mode", 0).is_err());
        }
    }

    #[test]
    fn untyped_views() {
        let store = SettingsStore::in_memory();
        store.save_int("b", 2).unwrap();
        store.save_string("a", "1").unwrap();

        assert!(store.contains("a").unwrap());
        assert!(!store.contains("z").unwrap());
        assert_eq!(store.kind_of("z").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), Some(PrefValue::Int(2)));
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["a"], PrefValue::from("1"));
    }

    #[test]
    fn open_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = InitContext::new(dir.path(), "demo");

        {
            let store = SettingsStore::open(&ctx).expect("open");
            store.save_string_set("langs", ["rust", "kotlin"]).unwrap();
            store.save_bool("first_run", false).unwrap();
        }

        let store = SettingsStore::open(&ctx).expect("reopen");
        assert_eq!(store.backend_name(), "SQLite");
        assert_eq!(
            store.get_string_set("langs", BTreeSet::new()).unwrap(),
            set_of(&["kotlin", "rust"])
        );
        assert!(!store.get_bool("first_run", true).unwrap());
        assert!(dir.path().join("demo_preferences.db").exists());
    }

    #[test]
    fn open_honours_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        StoreConfig {
            file_name: Some("custom.db".into()),
            ..StoreConfig::default()
        }
        .persist(dir.path())
        .expect("persist config");

        let ctx = InitContext::new(dir.path(), "demo");
        let store = SettingsStore::open(&ctx).expect("open");
        store.save_int("x", 1).unwrap();
        assert!(dir.path().join("custom.db").exists());
    }

    #[test]
    fn open_fails_when_store_path_is_unusable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let ctx = InitContext::new(&blocker, "demo");
        assert!(SettingsStore::open_with_config(&ctx, &StoreConfig::default()).is_err());
    }
}
