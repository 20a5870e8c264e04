//! Module configuration handed over at `init`.

use super::error::{ModuleError, ModuleResult};
use serde::de::DeserializeOwned;

/// Configuration for a module.
///
/// Modules are normally constructed with a typed configuration taken from
/// the gateway file. A raw TOML fragment passed here overrides it.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    /// Raw TOML string (if available).
    raw: Option<String>,
}

impl ModuleConfig {
    /// Creates an empty configuration (keep the module's current settings).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from a raw TOML fragment.
    #[must_use]
    pub fn from_toml(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// Returns the raw TOML fragment, if any.
    #[must_use]
    pub fn raw_config(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Deserializes the raw fragment into a typed configuration.
    ///
    /// Returns `Ok(None)` when no fragment was supplied.
    pub fn parse<T: DeserializeOwned>(&self) -> ModuleResult<Option<T>> {
        match self.raw.as_deref() {
            Some(raw) => toml::from_str(raw)
                .map(Some)
                .map_err(|e| ModuleError::ConfigError(format!("failed to parse config: {e}"))),
            None => Ok(None),
        }
    }
}
