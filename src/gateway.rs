//! Assembly of the store, the interceptor modules and the pipeline.

use crate::activation::activate;
use crate::config::{GatewayConfig, StoreSection};
use crate::module::{ModuleConfig, ModuleContract, ModuleError, ModuleStatus};
use crate::modules::login_guard::{LoginGuardHandler, LoginPathGuard, LoginSettings};
use crate::modules::route_filter::{
    HiddenRoutesTransform, RouteFilterHandler, RouteVisibilityFilter,
};
use crate::pipeline::{
    DefaultHandler, PipelineError, RequestDescriptor, RequestPipeline, Response,
    LOGIN_PAGE_HANDLER,
};
use crate::store::{FilePolicyStore, MemoryPolicyStore, PolicyStore, StoreError, StoreResult};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while assembling or running the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A module refused its configuration or lifecycle transition.
    #[error("module error: {0}")]
    Module(#[from] ModuleError),

    /// The policy store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A request could not be parsed or answered.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Open the store described by `section`: file-backed when a path is set,
/// in-memory otherwise.
pub fn open_store(section: &StoreSection) -> StoreResult<Arc<dyn PolicyStore>> {
    match section.path {
        Some(ref path) => {
            info!(path = %path.display(), "Opening policy store");
            Ok(Arc::new(FilePolicyStore::open(path)?))
        },
        None => {
            info!("Using in-memory policy store");
            Ok(Arc::new(MemoryPolicyStore::new()))
        },
    }
}

/// A running gateway: both modules started and registered.
pub struct Gateway {
    store: Arc<dyn PolicyStore>,
    login_guard: LoginGuardHandler,
    route_filter: RouteFilterHandler,
    pipeline: RequestPipeline,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("store", &self.store)
            .field("login_guard", &self.login_guard)
            .field("route_filter", &self.route_filter)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl Gateway {
    /// Start building a gateway.
    #[must_use]
    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    /// Run a request through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if an interceptor delegates to an unknown handler or
    /// a rejection cannot be encoded.
    pub fn handle(&self, request: RequestDescriptor) -> GatewayResult<Response> {
        Ok(self.pipeline.handle(request)?)
    }

    /// Parse raw HTTP/1.x bytes and run the request through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is malformed or incomplete.
    pub fn handle_bytes(&self, raw: &[u8]) -> GatewayResult<Response> {
        let (request, consumed) = RequestDescriptor::parse(raw)?;
        debug!(consumed, method = %request.method(), path = request.path(), "Parsed request");
        self.handle(request)
    }

    /// The policy store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn PolicyStore> {
        &self.store
    }

    /// The login settings write points.
    #[must_use]
    pub fn settings(&self) -> LoginSettings {
        LoginSettings::new(Arc::clone(&self.store))
    }

    /// The running login guard, if enabled.
    #[must_use]
    pub fn login_guard(&self) -> Option<Arc<LoginPathGuard>> {
        self.login_guard.guard()
    }

    /// The running route filter, if enabled.
    #[must_use]
    pub fn route_filter(&self) -> Option<Arc<RouteVisibilityFilter>> {
        self.route_filter.filter()
    }

    /// The request pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Status of each module, by name.
    #[must_use]
    pub fn status(&self) -> Vec<(String, ModuleStatus)> {
        vec![
            (self.login_guard.manifest().name, self.login_guard.status()),
            (self.route_filter.manifest().name, self.route_filter.status()),
        ]
    }

    /// Metrics of both modules in Prometheus text format.
    #[must_use]
    pub fn metrics_text(&self) -> String {
        let mut text = self.login_guard.metrics().to_prometheus("lockdown_login_guard");
        text.push_str(
            &self
                .route_filter
                .metrics()
                .to_prometheus("lockdown_route_filter"),
        );
        text
    }

    /// Stop both modules.
    ///
    /// # Errors
    ///
    /// Returns an error if a module fails to stop.
    pub fn shutdown(&mut self) -> GatewayResult<()> {
        self.login_guard.stop()?;
        self.route_filter.stop()?;
        info!("Gateway stopped");
        Ok(())
    }
}

/// Builder for [`Gateway`].
pub struct GatewayBuilder {
    config: GatewayConfig,
    store: Option<Arc<dyn PolicyStore>>,
    dispatch: Option<Arc<dyn DefaultHandler>>,
    login_page: Option<Arc<dyn DefaultHandler>>,
    transform: Option<Arc<dyn HiddenRoutesTransform>>,
}

impl GatewayBuilder {
    /// Create a builder from configuration.
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            store: None,
            dispatch: None,
            login_page: None,
            transform: None,
        }
    }

    /// Use an already opened store instead of the configured one.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn PolicyStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the normal dispatch handler.
    #[must_use]
    pub fn dispatch(mut self, handler: Arc<dyn DefaultHandler>) -> Self {
        self.dispatch = Some(handler);
        self
    }

    /// Set the login page handler the custom slug delegates to.
    #[must_use]
    pub fn login_page(mut self, handler: Arc<dyn DefaultHandler>) -> Self {
        self.login_page = Some(handler);
        self
    }

    /// Install a hidden-route transform.
    #[must_use]
    pub fn transform(mut self, transform: Arc<dyn HiddenRoutesTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Open the store, seed it, start both modules and register them.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or seeded, or a module
    /// rejects its configuration.
    pub fn build(self) -> GatewayResult<Gateway> {
        let config = self.config;
        let store = match self.store {
            Some(store) => store,
            None => open_store(&config.store)?,
        };

        activate(store.as_ref(), &config.route_filter.default_hidden)?;

        let mut login_guard = LoginGuardHandler::with_config(
            config.login_guard.clone(),
            Arc::clone(&store),
            config.site.urls.clone(),
        );
        login_guard.init(ModuleConfig::default())?;
        login_guard.start()?;

        let mut route_filter =
            RouteFilterHandler::with_config(config.route_filter.clone(), Arc::clone(&store));
        if let Some(transform) = self.transform {
            route_filter = route_filter.with_transform(transform);
        }
        route_filter.init(ModuleConfig::default())?;
        route_filter.start()?;

        let dispatch: Arc<dyn DefaultHandler> = match self.dispatch {
            Some(handler) => handler,
            None => Arc::new(|_: &RequestDescriptor| Response::ok().build()),
        };
        let mut pipeline =
            RequestPipeline::new(dispatch).with_api_prefix(config.site.api_prefix.clone());

        if let Some(guard) = login_guard.guard() {
            pipeline.register(guard);
        }
        if let Some(filter) = route_filter.filter() {
            pipeline.register(filter);
        }

        let login_page: Arc<dyn DefaultHandler> = match self.login_page {
            Some(handler) => handler,
            None => Arc::new(|_: &RequestDescriptor| Response::ok().build()),
        };
        pipeline.register_handler(LOGIN_PAGE_HANDLER, login_page);

        info!(
            api_prefix = %config.site.api_prefix,
            login_guard = config.login_guard.enabled,
            route_filter = config.route_filter.enabled,
            "Gateway started"
        );

        Ok(Gateway {
            store,
            login_guard,
            route_filter,
            pipeline,
        })
    }
}
