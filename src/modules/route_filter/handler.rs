//! Route filter handler implementing ModuleContract.

use super::config::RouteFilterConfig;
use super::filter::{HiddenRoutesTransform, RouteVisibilityFilter};
use crate::module::{
    Capability, MetricsPayload, ModuleConfig, ModuleContract, ModuleError, ModuleManifest,
    ModuleResult, ModuleStatus,
};
use crate::store::PolicyStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Statistics for the route filter.
#[derive(Debug, Default)]
pub struct RouteFilterStats {
    /// API dispatches looked at.
    pub dispatches_checked: AtomicU64,
    /// Dispatches rejected as hidden.
    pub rejections: AtomicU64,
    /// Lookups that could not read the store.
    pub store_errors: AtomicU64,
}

impl RouteFilterStats {
    /// Create new stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Route filter module.
pub struct RouteFilterHandler {
    config: RouteFilterConfig,
    store: Arc<dyn PolicyStore>,
    transform: Option<Arc<dyn HiddenRoutesTransform>>,
    filter: Option<Arc<RouteVisibilityFilter>>,
    status: ModuleStatus,
    stats: Arc<RouteFilterStats>,
    // store_errors as of the previous status poll
    errors_at_last_poll: AtomicU64,
    started_at: Option<Instant>,
}

impl std::fmt::Debug for RouteFilterHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteFilterHandler")
            .field("config", &self.config)
            .field("filter", &self.filter.is_some())
            .field("status", &self.status)
            .field("stats", &self.stats)
            .finish()
    }
}

impl RouteFilterHandler {
    /// Create a route filter handler with default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self::with_config(RouteFilterConfig::default(), store)
    }

    /// Create a route filter handler with custom configuration.
    #[must_use]
    pub fn with_config(config: RouteFilterConfig, store: Arc<dyn PolicyStore>) -> Self {
        Self {
            config,
            store,
            transform: None,
            filter: None,
            status: ModuleStatus::Stopped,
            stats: Arc::new(RouteFilterStats::new()),
            errors_at_last_poll: AtomicU64::new(0),
            started_at: None,
        }
    }

    /// Install a hidden-route transform for filters built by `start`.
    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn HiddenRoutesTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// The running filter, if the module is started and enabled.
    #[must_use]
    pub fn filter(&self) -> Option<Arc<RouteVisibilityFilter>> {
        self.filter.clone()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &RouteFilterConfig {
        &self.config
    }

    /// Get statistics.
    #[must_use]
    pub fn stats(&self) -> &RouteFilterStats {
        &self.stats
    }
}

impl ModuleContract for RouteFilterHandler {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::builder("route_filter")
            .description("Rejects dispatch of hidden API routes")
            .version(1, 0, 0)
            .capability(Capability::RouteFiltering)
            .build()
    }

    fn init(&mut self, config: ModuleConfig) -> ModuleResult<()> {
        if self.status != ModuleStatus::Stopped {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "Stopped".to_string(),
            });
        }

        info!("Initializing route filter module");

        if let Some(config) = config.parse::<RouteFilterConfig>()? {
            self.config = config;
        }

        self.config.validate().map_err(ModuleError::ConfigError)?;

        self.status = ModuleStatus::Initializing;
        info!("Route filter module initialized");
        Ok(())
    }

    fn start(&mut self) -> ModuleResult<()> {
        if self.status != ModuleStatus::Initializing {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "Initializing".to_string(),
            });
        }

        debug!("Starting route filter module");

        if self.config.enabled {
            let mut filter = RouteVisibilityFilter::new(Arc::clone(&self.store))
                .with_priority(self.config.priority)
                .with_stats(Arc::clone(&self.stats));
            if let Some(ref transform) = self.transform {
                filter = filter.with_transform(Arc::clone(transform));
            }
            self.filter = Some(Arc::new(filter));
            debug!(priority = self.config.priority, "Route visibility filter built");
        }

        self.status = ModuleStatus::Running;
        self.started_at = Some(Instant::now());

        info!("Route filter module started");
        Ok(())
    }

    fn stop(&mut self) -> ModuleResult<()> {
        debug!("Stopping route filter module");

        self.filter = None;
        self.status = ModuleStatus::Stopped;
        self.started_at = None;

        info!("Route filter module stopped");
        Ok(())
    }

    /// `Degraded` when lookups failed to read the store since the previous
    /// poll. Each poll consumes the failures it reports.
    fn status(&self) -> ModuleStatus {
        let errors = self.stats.store_errors.load(Ordering::Relaxed);
        let previous = self.errors_at_last_poll.fetch_max(errors, Ordering::Relaxed);

        if self.status == ModuleStatus::Running && errors > previous {
            return ModuleStatus::Degraded {
                reason: format!("{} hidden-route lookups failed", errors - previous),
            };
        }
        self.status.clone()
    }

    fn metrics(&self) -> MetricsPayload {
        let mut metrics = MetricsPayload::new();

        metrics.counter(
            "dispatches_checked",
            self.stats.dispatches_checked.load(Ordering::Relaxed),
        );
        metrics.counter("rejections", self.stats.rejections.load(Ordering::Relaxed));
        metrics.counter(
            "store_errors",
            self.stats.store_errors.load(Ordering::Relaxed),
        );

        if let Some(started) = self.started_at {
            metrics.gauge("uptime_secs", started.elapsed().as_secs_f64());
        }

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Interceptor, Outcome, RequestDescriptor, Stage};
    use crate::store::{MemoryPolicyStore, RouteMap, StoreError, StoreResult};

    #[test]
    fn test_handler_lifecycle() {
        let mut handler = RouteFilterHandler::new(Arc::new(MemoryPolicyStore::new()));
        assert_eq!(handler.manifest().name, "route_filter");

        handler.init(ModuleConfig::default()).unwrap();
        assert_eq!(handler.status(), ModuleStatus::Initializing);

        handler.start().unwrap();
        assert_eq!(handler.status(), ModuleStatus::Running);

        let filter = handler.filter().unwrap();
        assert_eq!(filter.stage(), Stage::ApiDispatch);
        assert_eq!(filter.priority(), 0);

        handler.stop().unwrap();
        assert!(handler.filter().is_none());
        assert_eq!(handler.status(), ModuleStatus::Stopped);
    }

    #[test]
    fn test_double_init_rejected() {
        let mut handler = RouteFilterHandler::new(Arc::new(MemoryPolicyStore::new()));
        handler.init(ModuleConfig::default()).unwrap();
        assert!(matches!(
            handler.init(ModuleConfig::default()),
            Err(ModuleError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_init_override() {
        let mut handler = RouteFilterHandler::new(Arc::new(MemoryPolicyStore::new()));
        handler
            .init(ModuleConfig::from_toml("priority = 10"))
            .unwrap();
        handler.start().unwrap();
        assert_eq!(handler.filter().unwrap().priority(), 10);
    }

    #[derive(Debug)]
    struct UnreadableStore;

    impl PolicyStore for UnreadableStore {
        fn get_string(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Poisoned)
        }

        fn set_string(
            &self,
            _key: &str,
            _value: &str,
            _sanitizer: &dyn Fn(&str) -> String,
        ) -> StoreResult<bool> {
            Err(StoreError::Poisoned)
        }

        fn get_map(&self, _key: &str, _default: &RouteMap) -> StoreResult<RouteMap> {
            Err(StoreError::Poisoned)
        }

        fn set_map(&self, _key: &str, _value: &RouteMap) -> StoreResult<bool> {
            Err(StoreError::Poisoned)
        }

        fn contains(&self, _key: &str) -> StoreResult<bool> {
            Err(StoreError::Poisoned)
        }
    }

    #[test]
    fn test_unreadable_store_fails_open_and_degrades() {
        let mut handler = RouteFilterHandler::new(Arc::new(UnreadableStore));
        handler.init(ModuleConfig::default()).unwrap();
        handler.start().unwrap();

        let filter = handler.filter().unwrap();
        let mut request = RequestDescriptor::builder()
            .target("/wp-json/wp/v2/users")
            .build();
        request.set_route(Some("/wp/v2/users".to_string()));

        assert_eq!(filter.intercept(&request), Outcome::Pass);
        assert!(matches!(handler.status(), ModuleStatus::Degraded { .. }));
        assert!(handler.status().is_operational());
        assert_eq!(handler.metrics().counters["store_errors"], 1);
    }

    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryPolicyStore,
        failing: std::sync::atomic::AtomicBool,
    }

    impl FlakyStore {
        fn check(&self) -> StoreResult<()> {
            if self.failing.load(Ordering::Relaxed) {
                return Err(StoreError::Poisoned);
            }
            Ok(())
        }
    }

    impl PolicyStore for FlakyStore {
        fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
            self.check()?;
            self.inner.get_string(key)
        }

        fn set_string(
            &self,
            key: &str,
            value: &str,
            sanitizer: &dyn Fn(&str) -> String,
        ) -> StoreResult<bool> {
            self.check()?;
            self.inner.set_string(key, value, sanitizer)
        }

        fn get_map(&self, key: &str, default: &RouteMap) -> StoreResult<RouteMap> {
            self.check()?;
            self.inner.get_map(key, default)
        }

        fn set_map(&self, key: &str, value: &RouteMap) -> StoreResult<bool> {
            self.check()?;
            self.inner.set_map(key, value)
        }

        fn contains(&self, key: &str) -> StoreResult<bool> {
            self.check()?;
            self.inner.contains(key)
        }
    }

    #[test]
    fn test_degraded_until_failures_reported() {
        let store = Arc::new(FlakyStore::default());
        let mut handler = RouteFilterHandler::new(Arc::clone(&store) as Arc<dyn PolicyStore>);
        handler.init(ModuleConfig::default()).unwrap();
        handler.start().unwrap();
        let filter = handler.filter().unwrap();

        // A later successful lookup does not hide the earlier failure.
        store.failing.store(true, Ordering::Relaxed);
        assert!(!filter.is_hidden("/wp/v2/users"));
        store.failing.store(false, Ordering::Relaxed);
        assert!(!filter.is_hidden("/wp/v2/users"));

        assert!(matches!(handler.status(), ModuleStatus::Degraded { .. }));
        assert_eq!(handler.status(), ModuleStatus::Running);

        let lookups: Vec<_> = (0..4)
            .map(|_| {
                let filter = Arc::clone(&filter);
                std::thread::spawn(move || filter.is_hidden("/wp/v2/media"))
            })
            .collect();
        for lookup in lookups {
            assert!(!lookup.join().unwrap());
        }
        assert_eq!(handler.status(), ModuleStatus::Running);
    }
}
