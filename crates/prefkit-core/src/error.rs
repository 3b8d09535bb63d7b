// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for prefkit.

use thiserror::Error;

use crate::types::PrefKind;

/// Top-level error type for all prefkit operations.
#[derive(Debug, Error)]
pub enum PrefsError {
    // -- Access errors --
    #[error("type mismatch for key {key:?}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: PrefKind,
        found: PrefKind,
    },

    #[error("stored value for key {key:?} is corrupt: {reason}")]
    CorruptValue { key: String, reason: String },

    #[error("unsupported value type {type_name} stored under key {key:?}")]
    UnsupportedValue { key: String, type_name: String },

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("native preference store not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrefsError>;
