//! The ordered interceptor pipeline.

use super::error::{PipelineError, PipelineResult};
use super::interceptor::{Interceptor, Outcome, Stage};
use super::request::RequestDescriptor;
use super::response::Response;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Name under which the stock login page handler is registered.
pub const LOGIN_PAGE_HANDLER: &str = "login_page";

/// Default API mount point.
pub const DEFAULT_API_PREFIX: &str = "/wp-json";

/// Query parameter that addresses an API route without pretty permalinks.
const ROUTE_QUERY_PARAM: &str = "rest_route";

/// An existing handler the pipeline can hand a request to.
pub trait DefaultHandler: Send + Sync {
    /// Produce the response for `request`.
    fn handle(&self, request: &RequestDescriptor) -> Response;
}

impl<F> DefaultHandler for F
where
    F: Fn(&RequestDescriptor) -> Response + Send + Sync,
{
    fn handle(&self, request: &RequestDescriptor) -> Response {
        self(request)
    }
}

/// Runs registered interceptors in front of normal dispatch.
///
/// Ordering: within a stage interceptors run by descending priority, ties
/// in registration order. The first terminal outcome wins and nothing after
/// it runs, so an interceptor never overrides a decision made upstream of
/// it. The `Early` stage always completes before route resolution and the
/// `ApiDispatch` stage.
pub struct RequestPipeline {
    early: Vec<Arc<dyn Interceptor>>,
    api: Vec<Arc<dyn Interceptor>>,
    handlers: HashMap<String, Arc<dyn DefaultHandler>>,
    dispatch: Arc<dyn DefaultHandler>,
    api_prefix: String,
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("early", &self.names(Stage::Early))
            .field("api", &self.names(Stage::ApiDispatch))
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("api_prefix", &self.api_prefix)
            .finish()
    }
}

impl RequestPipeline {
    /// Create a pipeline whose normal dispatch goes to `dispatch`.
    #[must_use]
    pub fn new(dispatch: Arc<dyn DefaultHandler>) -> Self {
        Self {
            early: Vec::new(),
            api: Vec::new(),
            handlers: HashMap::new(),
            dispatch,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
        }
    }

    /// Set the path prefix under which API routes are mounted.
    #[must_use]
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.api_prefix = prefix.trim_end_matches('/').to_string();
        self
    }

    /// Register an interceptor in its stage.
    pub fn register(&mut self, interceptor: Arc<dyn Interceptor>) {
        debug!(
            interceptor = interceptor.name(),
            stage = %interceptor.stage(),
            priority = interceptor.priority(),
            "Registering interceptor"
        );
        let slot = match interceptor.stage() {
            Stage::Early => &mut self.early,
            Stage::ApiDispatch => &mut self.api,
        };
        slot.push(interceptor);
        // stable sort keeps registration order among equal priorities
        slot.sort_by_key(|i| std::cmp::Reverse(i.priority()));
    }

    /// Register a named default handler that interceptors may delegate to.
    pub fn register_handler(&mut self, name: impl Into<String>, handler: Arc<dyn DefaultHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Interceptor names of a stage, in execution order.
    #[must_use]
    pub fn names(&self, stage: Stage) -> Vec<&str> {
        self.stage(stage).iter().map(|i| i.name()).collect()
    }

    fn stage(&self, stage: Stage) -> &[Arc<dyn Interceptor>] {
        match stage {
            Stage::Early => &self.early,
            Stage::ApiDispatch => &self.api,
        }
    }

    /// Run one stage and return its first terminal outcome, or `Pass`.
    #[must_use]
    pub fn run_stage(&self, stage: Stage, request: &RequestDescriptor) -> Outcome {
        for interceptor in self.stage(stage) {
            let outcome = interceptor.intercept(request);
            if outcome.is_terminal() {
                debug!(
                    stage = %stage,
                    interceptor = interceptor.name(),
                    outcome = %outcome,
                    path = request.path(),
                    "Request short-circuited"
                );
                return outcome;
            }
            trace!(stage = %stage, interceptor = interceptor.name(), "Passed");
        }
        Outcome::Pass
    }

    /// Resolve the API route addressed by `request`, if any.
    ///
    /// `{prefix}/wp/v2/users/` and `?rest_route=/wp/v2/users` both resolve
    /// to `/wp/v2/users`; the trailing slash is dropped except for the root
    /// route `/`.
    #[must_use]
    pub fn resolve_route(&self, request: &RequestDescriptor) -> Option<String> {
        let path = request.path();
        let raw = match path.strip_prefix(self.api_prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.to_string(),
            _ => request.query_param(ROUTE_QUERY_PARAM)?.to_string(),
        };

        let trimmed = raw.trim_end_matches('/');
        if trimmed.is_empty() {
            Some("/".to_string())
        } else if trimmed.starts_with('/') {
            Some(trimmed.to_string())
        } else {
            Some(format!("/{trimmed}"))
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// Fails if an interceptor delegates to an unregistered handler or a
    /// rejection body cannot be encoded.
    pub fn handle(&self, mut request: RequestDescriptor) -> PipelineResult<Response> {
        let outcome = self.run_stage(Stage::Early, &request);
        if outcome.is_terminal() {
            return self.respond(outcome, &request);
        }

        let route = self.resolve_route(&request);
        let is_api = route.is_some();
        request.set_route(route);

        if is_api {
            let outcome = self.run_stage(Stage::ApiDispatch, &request);
            if outcome.is_terminal() {
                return self.respond(outcome, &request);
            }
        }

        Ok(self.dispatch.handle(&request))
    }

    fn respond(&self, outcome: Outcome, request: &RequestDescriptor) -> PipelineResult<Response> {
        match outcome {
            Outcome::Redirect(location) => Ok(Response::redirect(&location)),
            Outcome::Reject(rejection) => Response::rejection(&rejection),
            Outcome::Delegate(name) => {
                let handler = self
                    .handlers
                    .get(&name)
                    .ok_or(PipelineError::UnknownHandler(name))?;
                Ok(handler.handle(request))
            },
            Outcome::Pass => Ok(self.dispatch.handle(request)),
        }
    }
}
