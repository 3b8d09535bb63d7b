// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub backend for desktop/CI builds where no native preference store exists.
//
// Every operation returns `PlatformUnavailable`; the real implementation
// lives in the `android` module.

use prefkit_core::error::{PrefsError, Result};
use prefkit_core::{PrefValue, PrefsBackend};

/// Placeholder for platforms without a native preference store.
pub struct StubBackend;

impl StubBackend {
    /// Always fails: there is no native store to open on this platform.
    pub fn open(store_name: Option<&str>) -> Result<Self> {
        tracing::warn!(?store_name, "no native preference store on this platform");
        Err(PrefsError::PlatformUnavailable)
    }
}

impl PrefsBackend for StubBackend {
    fn backend_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn load(&self, _key: &str) -> Result<Option<PrefValue>> {
        tracing::warn!("PrefsBackend::load called on stub backend");
        Err(PrefsError::PlatformUnavailable)
    }

    fn store(&self, _key: &str, _value: &PrefValue) -> Result<()> {
        tracing::warn!("PrefsBackend::store called on stub backend");
        Err(PrefsError::PlatformUnavailable)
    }

    fn remove(&self, _key: &str) -> Result<()> {
        tracing::warn!("PrefsBackend::remove called on stub backend");
        Err(PrefsError::PlatformUnavailable)
    }

    fn clear(&self) -> Result<()> {
        tracing::warn!("PrefsBackend::clear called on stub backend");
        Err(PrefsError::PlatformUnavailable)
    }

    fn keys(&self) -> Result<Vec<String>> {
        tracing::warn!("PrefsBackend::keys called on stub backend");
        Err(PrefsError::PlatformUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{has_native_backend, platform_backend};

    #[test]
    fn stub_refuses_every_operation() {
        let backend = StubBackend;
        assert!(matches!(backend.load("k"), Err(PrefsError::PlatformUnavailable)));
        assert!(matches!(
            backend.store("k", &PrefValue::Int(1)),
            Err(PrefsError::PlatformUnavailable)
        ));
        assert!(matches!(backend.remove("k"), Err(PrefsError::PlatformUnavailable)));
        assert!(matches!(backend.clear(), Err(PrefsError::PlatformUnavailable)));
        assert!(matches!(backend.keys(), Err(PrefsError::PlatformUnavailable)));
    }

    #[test]
    fn platform_backend_fails_to_open_off_android() {
        assert!(!has_native_backend());
        assert!(matches!(
            platform_backend(Some("ignored")),
            Err(PrefsError::PlatformUnavailable)
        ));
        assert!(matches!(
            StubBackend::open(None),
            Err(PrefsError::PlatformUnavailable)
        ));
    }
}
