//! Login guard handler implementing ModuleContract.

use super::config::{LoginGuardConfig, SiteUrls};
use super::guard::LoginPathGuard;
use crate::module::{
    Capability, MetricsPayload, ModuleConfig, ModuleContract, ModuleError, ModuleManifest,
    ModuleResult, ModuleStatus,
};
use crate::store::PolicyStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Statistics for the login guard.
#[derive(Debug, Default)]
pub struct LoginGuardStats {
    /// Legacy login requests evaluated while relocation was active.
    pub requests_checked: AtomicU64,
    /// Legacy login requests redirected away.
    pub redirects: AtomicU64,
    /// Legacy login POSTs let through.
    pub passthroughs: AtomicU64,
    /// Custom slug requests handed to the login page.
    pub delegations: AtomicU64,
    /// Generated URLs rewritten to the custom slug.
    pub urls_rewritten: AtomicU64,
    /// Policy reads that failed.
    pub store_errors: AtomicU64,
}

impl LoginGuardStats {
    /// Create new stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Login guard module.
pub struct LoginGuardHandler {
    /// Configuration.
    config: LoginGuardConfig,

    /// Site URLs handed to the guard.
    urls: SiteUrls,

    /// Policy source.
    store: Arc<dyn PolicyStore>,

    /// Guard (while running).
    guard: Option<Arc<LoginPathGuard>>,

    /// Current status.
    status: ModuleStatus,

    /// Statistics.
    stats: Arc<LoginGuardStats>,

    /// Start time for uptime calculation.
    started_at: Option<Instant>,
}

impl std::fmt::Debug for LoginGuardHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGuardHandler")
            .field("config", &self.config)
            .field("urls", &self.urls)
            .field("guard", &self.guard.is_some())
            .field("status", &self.status)
            .field("stats", &self.stats)
            .finish()
    }
}

impl LoginGuardHandler {
    /// Create a login guard handler with default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn PolicyStore>, urls: SiteUrls) -> Self {
        Self::with_config(LoginGuardConfig::default(), store, urls)
    }

    /// Create a login guard handler with custom configuration.
    #[must_use]
    pub fn with_config(
        config: LoginGuardConfig,
        store: Arc<dyn PolicyStore>,
        urls: SiteUrls,
    ) -> Self {
        Self {
            config,
            urls,
            store,
            guard: None,
            status: ModuleStatus::Stopped,
            stats: Arc::new(LoginGuardStats::new()),
            started_at: None,
        }
    }

    /// The running guard, if the module is started and enabled.
    #[must_use]
    pub fn guard(&self) -> Option<Arc<LoginPathGuard>> {
        self.guard.clone()
    }

    /// Get statistics.
    #[must_use]
    pub fn stats(&self) -> &LoginGuardStats {
        &self.stats
    }
}

impl ModuleContract for LoginGuardHandler {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::builder("login_guard")
            .description("Relocates the login entry point behind a custom slug")
            .version(1, 0, 0)
            .capability(Capability::LoginRelocation)
            .capability(Capability::UrlRewriting)
            .build()
    }

    fn init(&mut self, config: ModuleConfig) -> ModuleResult<()> {
        if self.status != ModuleStatus::Stopped {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "Stopped".to_string(),
            });
        }

        info!("Initializing login guard module");

        if let Some(config) = config.parse::<LoginGuardConfig>()? {
            self.config = config;
        }

        self.urls.validate().map_err(ModuleError::ConfigError)?;

        self.status = ModuleStatus::Initializing;
        info!("Login guard module initialized");
        Ok(())
    }

    fn start(&mut self) -> ModuleResult<()> {
        if self.status != ModuleStatus::Initializing {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "Initializing".to_string(),
            });
        }

        debug!("Starting login guard module");

        if self.config.enabled {
            let guard = LoginPathGuard::new(Arc::clone(&self.store), self.urls.clone())
                .with_priority(self.config.priority)
                .with_stats(Arc::clone(&self.stats));
            self.guard = Some(Arc::new(guard));
            debug!(priority = self.config.priority, "Login path guard built");
        }

        self.status = ModuleStatus::Running;
        self.started_at = Some(Instant::now());

        info!("Login guard module started");
        Ok(())
    }

    fn stop(&mut self) -> ModuleResult<()> {
        debug!("Stopping login guard module");

        self.guard = None;
        self.status = ModuleStatus::Stopped;
        self.started_at = None;

        info!("Login guard module stopped");
        Ok(())
    }

    fn status(&self) -> ModuleStatus {
        self.status.clone()
    }

    fn metrics(&self) -> MetricsPayload {
        let mut metrics = MetricsPayload::new();

        metrics.counter(
            "requests_checked",
            self.stats.requests_checked.load(Ordering::Relaxed),
        );
        metrics.counter("redirects", self.stats.redirects.load(Ordering::Relaxed));
        metrics.counter(
            "passthroughs",
            self.stats.passthroughs.load(Ordering::Relaxed),
        );
        metrics.counter(
            "delegations",
            self.stats.delegations.load(Ordering::Relaxed),
        );
        metrics.counter(
            "urls_rewritten",
            self.stats.urls_rewritten.load(Ordering::Relaxed),
        );
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
    use crate::store::{MemoryPolicyStore, LOGIN_PAGE_URL_KEY};

    fn handler() -> (Arc<MemoryPolicyStore>, LoginGuardHandler) {
        let store = Arc::new(MemoryPolicyStore::new());
        let handler = LoginGuardHandler::new(store.clone(), SiteUrls::new("https://example.com"));
        (store, handler)
    }

    #[test]
    fn test_handler_creation() {
        let (_, handler) = handler();
        assert_eq!(handler.status(), ModuleStatus::Stopped);

        let manifest = handler.manifest();
        assert_eq!(manifest.name, "login_guard");
        assert!(manifest.has_capability(&Capability::LoginRelocation));
    }

    #[test]
    fn test_handler_lifecycle() {
        let (_, mut handler) = handler();

        handler.init(ModuleConfig::default()).unwrap();
        assert_eq!(handler.status(), ModuleStatus::Initializing);
        assert!(handler.guard().is_none());

        handler.start().unwrap();
        assert_eq!(handler.status(), ModuleStatus::Running);
        assert!(handler.heartbeat());

        let guard = handler.guard().unwrap();
        assert_eq!(guard.stage(), Stage::Early);
        assert_eq!(guard.priority(), 100);

        handler.stop().unwrap();
        assert_eq!(handler.status(), ModuleStatus::Stopped);
        assert!(handler.guard().is_none());
    }

    #[test]
    fn test_start_before_init() {
        let (_, mut handler) = handler();
        assert!(matches!(
            handler.start(),
            Err(ModuleError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_init_override_disables() {
        let (_, mut handler) = handler();
        handler
            .init(ModuleConfig::from_toml("enabled = false"))
            .unwrap();
        handler.start().unwrap();
        assert!(handler.guard().is_none());
    }

    #[test]
    fn test_init_rejects_bad_urls() {
        let store = Arc::new(MemoryPolicyStore::new());
        let mut handler = LoginGuardHandler::new(store, SiteUrls::new("example.com"));
        assert!(matches!(
            handler.init(ModuleConfig::default()),
            Err(ModuleError::ConfigError(_))
        ));
    }

    #[test]
    fn test_metrics_track_guard() {
        let (store, mut handler) = handler();
        store
            .set_string(LOGIN_PAGE_URL_KEY, "secure-entry", &|v: &str| v.to_string())
            .unwrap();
        handler.init(ModuleConfig::default()).unwrap();
        handler.start().unwrap();

        let guard = handler.guard().unwrap();
        let request = RequestDescriptor::builder().target("/wp-login.php").build();
        assert!(matches!(guard.intercept(&request), Outcome::Redirect(_)));

        let text = handler.metrics().to_prometheus("login_guard");
        assert!(text.contains("login_guard_redirects 1"));
        assert!(text.contains("login_guard_requests_checked 1"));
    }
}
