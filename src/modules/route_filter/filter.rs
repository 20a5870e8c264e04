//! Hidden API route lookup and rejection.

use super::handler::RouteFilterStats;
use crate::pipeline::{Interceptor, Outcome, Rejection, RequestDescriptor, Stage};
use crate::store::{PolicyStore, RouteMap, StoreError, StoreResult, HIDDEN_ENDPOINTS_KEY};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Machine-readable code of the rejection for a hidden route.
pub const FORBIDDEN_CODE: &str = "rest_hider_forbidden";

/// Message of the rejection for a hidden route.
pub const FORBIDDEN_MESSAGE: &str = "This REST endpoint is not available.";

/// Rewrites the effective hidden-route map before each lookup.
///
/// The result is only used for the lookup at hand and is never persisted.
pub trait HiddenRoutesTransform: Send + Sync {
    /// Produce the effective map from the stored one.
    fn transform(&self, routes: RouteMap) -> RouteMap;
}

impl<F> HiddenRoutesTransform for F
where
    F: Fn(RouteMap) -> RouteMap + Send + Sync,
{
    fn transform(&self, routes: RouteMap) -> RouteMap {
        self(routes)
    }
}

/// Rejects dispatch of API routes an administrator has hidden.
///
/// Lookups are exact and case-sensitive. A route is hidden only when it is
/// present in the effective map with value `true`. An unreadable store hides
/// nothing.
pub struct RouteVisibilityFilter {
    store: Arc<dyn PolicyStore>,
    transform: Option<Arc<dyn HiddenRoutesTransform>>,
    priority: i32,
    stats: Arc<RouteFilterStats>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for RouteVisibilityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteVisibilityFilter")
            .field("transform", &self.transform.is_some())
            .field("priority", &self.priority)
            .finish()
    }
}

impl RouteVisibilityFilter {
    /// Create a filter reading hidden routes from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self {
            store,
            transform: None,
            priority: 0,
            stats: Arc::new(RouteFilterStats::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Install a read-through transform of the hidden-route map.
    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn HiddenRoutesTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Set the priority within the API dispatch stage.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Share a stats block with the owning handler.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<RouteFilterStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Get statistics.
    #[must_use]
    pub fn stats(&self) -> &RouteFilterStats {
        &self.stats
    }

    /// The effective hidden-route map, after any transform.
    pub fn hidden_routes(&self) -> StoreResult<RouteMap> {
        let stored = self.store.get_map(HIDDEN_ENDPOINTS_KEY, &RouteMap::new())?;
        Ok(match self.transform {
            Some(ref transform) => transform.transform(stored),
            None => stored,
        })
    }

    /// Whether `route` is hidden.
    pub fn is_hidden(&self, route: &str) -> bool {
        match self.hidden_routes() {
            Ok(routes) => routes.get(route).copied().unwrap_or(false),
            Err(e) => {
                self.stats.store_errors.fetch_add(1, Ordering::Relaxed);
                warn!(route = %route, error = %e, "Hidden routes unreadable, route allowed");
                false
            },
        }
    }

    /// Hide or reveal `route`. Revealing removes the entry entirely.
    ///
    /// Returns whether the stored map changed.
    pub fn set_hidden(&self, route: &str, hidden: bool) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut routes = self.store.get_map(HIDDEN_ENDPOINTS_KEY, &RouteMap::new())?;
        if hidden {
            routes.insert(route.to_string(), true);
        } else {
            routes.remove(route);
        }

        let changed = self.store.set_map(HIDDEN_ENDPOINTS_KEY, &routes)?;
        if changed {
            info!(route = %route, hidden, "Route visibility updated");
        }
        Ok(changed)
    }
}

impl Interceptor for RouteVisibilityFilter {
    fn name(&self) -> &str {
        "route_visibility_filter"
    }

    fn stage(&self) -> Stage {
        Stage::ApiDispatch
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn intercept(&self, request: &RequestDescriptor) -> Outcome {
        let Some(route) = request.route() else {
            return Outcome::Pass;
        };

        self.stats.dispatches_checked.fetch_add(1, Ordering::Relaxed);
        if !self.is_hidden(route) {
            return Outcome::Pass;
        }

        self.stats.rejections.fetch_add(1, Ordering::Relaxed);
        debug!(route = %route, "Hidden route rejected");
        Outcome::Reject(Rejection::forbidden(FORBIDDEN_CODE, FORBIDDEN_MESSAGE))
    }
}
