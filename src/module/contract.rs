//! The core Module Contract trait.

use super::{ModuleConfig, ModuleManifest, ModuleResult, ModuleStatus};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Metrics payload containing module-specific metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricsPayload {
    /// Counter metrics (monotonically increasing).
    pub counters: BTreeMap<String, u64>,

    /// Gauge metrics (can go up and down).
    pub gauges: BTreeMap<String, f64>,
}

impl MetricsPayload {
    /// Creates a new empty metrics payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a counter metric.
    pub fn counter(&mut self, name: impl Into<String>, value: u64) {
        self.counters.insert(name.into(), value);
    }

    /// Adds a gauge metric.
    pub fn gauge(&mut self, name: impl Into<String>, value: f64) {
        self.gauges.insert(name.into(), value);
    }

    /// Formats metrics in Prometheus text format.
    #[must_use]
    pub fn to_prometheus(&self, prefix: &str) -> String {
        let mut output = String::new();

        for (name, value) in &self.counters {
            let _ = writeln!(output, "{prefix}_{name} {value}");
        }

        for (name, value) in &self.gauges {
            let _ = writeln!(output, "{prefix}_{name} {value}");
        }

        output
    }
}

/// The contract every interceptor module implements.
///
/// # Lifecycle
///
/// 1. `manifest()` - identity and capabilities
/// 2. `init()` - apply configuration
/// 3. `start()` - build the interceptor and begin deciding
/// 4. `status()` / `metrics()` - ongoing monitoring
/// 5. `stop()` - drop the interceptor
pub trait ModuleContract: Send + Sync {
    /// Returns the module's manifest describing its identity and capabilities.
    fn manifest(&self) -> ModuleManifest;

    /// Initializes the module with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::ConfigError` if the configuration is invalid.
    fn init(&mut self, config: ModuleConfig) -> ModuleResult<()>;

    /// Starts the module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::InvalidState` if called before `init()`.
    fn start(&mut self) -> ModuleResult<()>;

    /// Stops the module.
    ///
    /// # Errors
    ///
    /// Implementations may refuse to stop from an unexpected state.
    fn stop(&mut self) -> ModuleResult<()>;

    /// Returns the current status of the module.
    fn status(&self) -> ModuleStatus;

    /// Returns the current metrics from the module.
    fn metrics(&self) -> MetricsPayload;

    /// Liveness check; `true` while the module is operational.
    fn heartbeat(&self) -> bool {
        self.status().is_operational()
    }
}
