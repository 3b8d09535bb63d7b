// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Store configuration and the initialization context used to locate it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Name of the optional configuration file inside the data directory.
pub const CONFIG_FILE: &str = "prefkit.json";

/// Tunables for the on-disk store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store file name inside the data directory. When unset the name is
    /// derived from the namespace as `<namespace>_preferences.db`.
    pub file_name: Option<String>,
    /// Run SQLite with `synchronous = FULL` so every commit reaches disk
    /// before the call returns.
    pub synchronous_full: bool,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_name: None,
            synchronous_full: true,
            busy_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    /// Load `prefkit.json` from `dir`, or defaults if it is absent or unreadable.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(_) => {
                debug!(path = %path.display(), "no store config, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable store config, using defaults");
                Self::default()
            }
        }
    }

    /// Write this configuration to `prefkit.json` in `dir`.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }

    /// The store file name for `namespace`, honouring an explicit override.
    pub fn file_name_for(&self, namespace: &str) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| format!("{namespace}_preferences.db"))
    }
}

/// Handle supplied once, at first construction, to locate the persistent store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitContext {
    /// Directory that holds the store file and its configuration.
    pub data_dir: PathBuf,
    /// Application namespace; names the default store file.
    pub namespace: String,
}

impl InitContext {
    pub fn new(data_dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            namespace: namespace.into(),
        }
    }

    /// Resolve the conventional per-user data directory for `namespace`.
    ///
    /// Uses an absolute `$XDG_DATA_HOME`, then `$HOME/.local/share`, then `/tmp`. The
    /// directory is not created here; opening the store does that.
    pub fn from_env(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let data_dir = base_data_dir().join(&namespace);
        Self {
            data_dir,
            namespace,
        }
    }

    /// Full path of the store file under this context.
    pub fn store_path(&self, config: &StoreConfig) -> PathBuf {
        self.data_dir.join(config.file_name_for(&self.namespace))
    }
}

fn base_data_dir() -> PathBuf {
    resolve_data_dir(
        std::env::var("XDG_DATA_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

/// Empty values are treated as unset, and a relative `XDG_DATA_HOME` is
/// ignored.
fn resolve_data_dir(xdg_data_home: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(xdg) = xdg_data_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
    {
        return xdg;
    }
    if let Some(home) = home.filter(|h| !h.is_empty()) {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_name_follows_namespace() {
        let config = StoreConfig::default();
        assert_eq!(config.file_name_for("demo"), "demo_preferences.db");

        let ctx = InitContext::new("/data", "demo");
        assert_eq!(ctx.store_path(&config), PathBuf::from("/data/demo_preferences.db"));
    }

    #[test]
    fn data_dir_prefers_absolute_xdg() {
        assert_eq!(
            resolve_data_dir(Some("/xdg".into()), Some("/home/u".into())),
            PathBuf::from("/xdg")
        );
        assert_eq!(
            resolve_data_dir(None, Some("/home/u".into())),
            PathBuf::from("/home/u/.local/share")
        );
    }

    #[test]
    fn data_dir_ignores_empty_and_relative_values() {
        assert_eq!(
            resolve_data_dir(Some(String::new()), Some("/home/u".into())),
            PathBuf::from("/home/u/.local/share")
        );
        assert_eq!(
            resolve_data_dir(Some("rel/data".into()), Some("/home/u".into())),
            PathBuf::from("/home/u/.local/share")
        );
        assert_eq!(
            resolve_data_dir(Some(String::new()), Some(String::new())),
            PathBuf::from("/tmp")
        );
        assert_eq!(resolve_data_dir(None, None), PathBuf::from("/tmp"));
    }

    #[test]
    fn explicit_file_name_wins() {
        let config = StoreConfig {
            file_name: Some("custom.db".into()),
            ..StoreConfig::default()
        };
        assert_eq!(config.file_name_for("demo"), "custom.db");
    }

    #[test]
    fn missing_config_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(StoreConfig::load(dir.path()), StoreConfig::default());
    }

    #[test]
    fn persisted_config_is_reloaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StoreConfig {
            file_name: Some("settings.db".into()),
            synchronous_full: false,
            busy_timeout_ms: 250,
        };
        config.persist(dir.path()).expect("persist");
        assert_eq!(StoreConfig::load(dir.path()), config);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{"busy_timeout_ms": 10}"#)
            .expect("write config");
        let config = StoreConfig::load(dir.path());
        assert_eq!(config.busy_timeout_ms, 10);
        assert!(config.synchronous_full);
        assert_eq!(config.file_name, None);
    }

    #[test]
    fn garbage_config_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "not json").expect("write config");
        assert_eq!(StoreConfig::load(dir.path()), StoreConfig::default());
    }
}
