// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// prefkit — Core value types, backend contract, and errors shared across all crates.

pub mod backend;
pub mod config;
pub mod error;
pub mod types;

pub use backend::PrefsBackend;
pub use config::{InitContext, StoreConfig};
pub use error::PrefsError;
pub use types::*;
