// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Volatile preference backend for tests and throwaway sessions.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use prefkit_core::error::{PrefsError, Result};
use prefkit_core::{PrefValue, PrefsBackend};

/// In-memory preference map. Nothing survives the process.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, PrefValue>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, BTreeMap<String, PrefValue>>> {
        self.entries
            .lock()
            .map_err(|_| PrefsError::Database("memory store lock poisoned".into()))
    }
}

impl PrefsBackend for MemoryBackend {
    fn backend_name(&self) -> &str {
        "Memory"
    }

    fn load(&self, key: &str) -> Result<Option<PrefValue>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn store(&self, key: &str, value: &PrefValue) -> Result<()> {
        self.entries()?.insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries()?.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.keys().cloned().collect())
    }
}
