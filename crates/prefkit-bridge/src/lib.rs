// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! prefkit-bridge — Native platform preference backends.
//!
//! On Android the settings store can sit directly on the platform's
//! `SharedPreferences`, reached through JNI. Other targets get a stub whose
//! every operation fails with `PrefsError::PlatformUnavailable`, so callers
//! can detect the missing backend and fall back to SQLite.

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use prefkit_core::PrefsBackend;
use prefkit_core::error::Result;

/// Open the native preference backend for the target operating system.
///
/// `store_name` selects the native store (the `SharedPreferences` file on
/// Android). `None` selects the platform default store.
///
/// The store is reached once before returning, so a missing platform or an
/// unreachable store fails here rather than on the first read or write.
pub fn platform_backend(store_name: Option<&str>) -> Result<Box<dyn PrefsBackend>> {
    #[cfg(target_os = "android")]
    {
        Ok(Box::new(android::AndroidPrefsBackend::open(store_name)?))
    }
    #[cfg(not(target_os = "android"))]
    {
        Ok(Box::new(stub::StubBackend::open(store_name)?))
    }
}

/// Whether this build has a working native backend.
pub const fn has_native_backend() -> bool {
    cfg!(target_os = "android")
}
