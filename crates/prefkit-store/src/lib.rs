// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! prefkit-store — Typed settings store and its built-in backends.
//!
//! [`SettingsStore`] is the typed facade: string, string-set, integer and
//! boolean accessors with caller-supplied defaults and strict kind checks.
//! [`SqliteBackend`] gives it durable, synchronously committed storage;
//! [`MemoryBackend`] is for tests. [`instance`] holds the optional
//! process-wide store.

pub mod instance;
pub mod memory;
pub mod settings;
pub mod sqlite;

pub use instance::{InstanceSlot, get_instance, get_instance_with, try_instance};
pub use memory::MemoryBackend;
pub use settings::SettingsStore;
pub use sqlite::SqliteBackend;
