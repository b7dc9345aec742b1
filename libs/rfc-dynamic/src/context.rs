use std::fmt;

use rfc_api::RfcInterop;

use crate::config::ExtractConfig;

static DEFAULT_CONFIG: ExtractConfig = ExtractConfig::DEFAULT;

/// Native library plus extraction settings, carried by every view.
///
/// Cheap to copy. The lifetime `'a` is the lifetime of the session that owns
/// the native handles; nothing built from a context can outlive it.
#[derive(Clone, Copy)]
pub struct RfcContext<'a> {
    interop: &'a dyn RfcInterop,
    config: &'a ExtractConfig,
}

impl<'a> RfcContext<'a> {
    pub fn new(interop: &'a dyn RfcInterop, config: &'a ExtractConfig) -> Self {
        Self { interop, config }
    }

    /// Context with [`ExtractConfig::DEFAULT`].
    pub fn with_defaults(interop: &'a dyn RfcInterop) -> Self {
        Self::new(interop, &DEFAULT_CONFIG)
    }

    #[inline]
    pub fn interop(&self) -> &'a dyn RfcInterop {
        self.interop
    }

    #[inline]
    pub fn config(&self) -> &'a ExtractConfig {
        self.config
    }
}

impl fmt::Debug for RfcContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RfcContext").field("config", self.config).finish()
    }
}
