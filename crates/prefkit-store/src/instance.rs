// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process-wide settings store, created on first access.
//
// The first successful construction wins and is kept until process exit.
// Construction runs under a mutex, so concurrent first callers never build
// two stores. A failed construction leaves the slot empty and the error is
// returned to that caller; the next caller tries again.

use std::sync::{Arc, Mutex, OnceLock};

use prefkit_core::InitContext;
use prefkit_core::error::Result;
use tracing::{debug, info};

use crate::settings::SettingsStore;

/// A lazily filled, at-most-once slot for a [`SettingsStore`].
pub struct InstanceSlot {
    store: OnceLock<Arc<SettingsStore>>,
    init_lock: Mutex<()>,
}

impl InstanceSlot {
    pub const fn new() -> Self {
        Self {
            store: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Return the stored instance, building it with `init` if the slot is empty.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<Arc<SettingsStore>>
    where
        F: FnOnce() -> Result<SettingsStore>,
    {
        if let Some(store) = self.store.get() {
            return Ok(Arc::clone(store));
        }

        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(store) = self.store.get() {
            debug!("settings store initialised by another caller");
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(init()?);
        // Cannot already be set: every writer holds `init_lock`.
        let _ = self.store.set(Arc::clone(&store));
        info!(backend = store.backend_name(), "settings store instance created");
        Ok(store)
    }

    /// The instance, if one has been created.
    pub fn get(&self) -> Option<Arc<SettingsStore>> {
        self.store.get().cloned()
    }
}

impl Default for InstanceSlot {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: InstanceSlot = InstanceSlot::new();

/// Process-wide settings store, opened from `ctx` on first call.
///
/// Later calls return the same instance and ignore `ctx`.
pub fn get_instance(ctx: &InitContext) -> Result<Arc<SettingsStore>> {
    GLOBAL.get_or_try_init(|| SettingsStore::open(ctx))
}

/// Like [`get_instance`], but with a caller-supplied constructor for the
/// first call (e.g. a native platform backend).
pub fn get_instance_with<F>(init: F) -> Result<Arc<SettingsStore>>
where
    F: FnOnce() -> Result<SettingsStore>,
{
    GLOBAL.get_or_try_init(init)
}

/// The process-wide instance, if it has been created.
pub fn try_instance() -> Option<Arc<SettingsStore>> {
    GLOBAL.get()
}
