//! Configuration type definitions.

use crate::modules::login_guard::{LoginGuardConfig, SiteUrls};
use crate::modules::route_filter::RouteFilterConfig;
use crate::pipeline::DEFAULT_API_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Protected site URLs and routing prefixes.
    pub site: SiteSection,

    /// Policy store location.
    pub store: StoreSection,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Login guard module.
    pub login_guard: LoginGuardConfig,

    /// Route filter module.
    pub route_filter: RouteFilterConfig,
}

/// Site section configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteSection {
    /// Base URLs and the legacy login filename.
    #[serde(flatten)]
    pub urls: SiteUrls,

    /// Path prefix under which API routes are served.
    pub api_prefix: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            urls: SiteUrls::default(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
        }
    }
}

/// Store section configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StoreSection {
    /// JSON file holding the policy. In-memory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: LogLevel,

    /// Log format (json, pretty, compact).
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose).
    Trace,
    /// Debug level.
    Debug,
    /// Info level (default).
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level (least verbose).
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (machine-readable).
    Json,
    /// Pretty format with colors (default).
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
}
