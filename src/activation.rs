//! First-install seeding of the policy store.

use crate::store::{PolicyStore, RouteMap, StoreResult, HIDDEN_ENDPOINTS_KEY};
use tracing::info;

/// Seed the hidden-route map with `defaults`, all hidden.
///
/// Only a store that has never held a route map is seeded, so routes an
/// administrator revealed stay revealed across restarts. Returns whether
/// anything was written.
pub fn activate<S: AsRef<str>>(store: &dyn PolicyStore, defaults: &[S]) -> StoreResult<bool> {
    if store.contains(HIDDEN_ENDPOINTS_KEY)? {
        return Ok(false);
    }

    let routes: RouteMap = defaults
        .iter()
        .map(|route| (route.as_ref().to_string(), true))
        .collect();
    store.set_map(HIDDEN_ENDPOINTS_KEY, &routes)?;

    info!(routes = routes.len(), "Seeded hidden API routes");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::route_filter::DEFAULT_HIDDEN_ROUTES;
    use crate::store::MemoryPolicyStore;

    #[test]
    fn test_activate_seeds_defaults() {
        let store = MemoryPolicyStore::new();
        assert!(activate(&store, &DEFAULT_HIDDEN_ROUTES).unwrap());

        let routes = store.get_map(HIDDEN_ENDPOINTS_KEY, &RouteMap::new()).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes.get("/wp/v2/users"), Some(&true));
        assert_eq!(routes.get("/wp/v2/media"), Some(&true));
    }

    #[test]
    fn test_activate_keeps_existing_map() {
        let store = MemoryPolicyStore::new();
        store.set_map(HIDDEN_ENDPOINTS_KEY, &RouteMap::new()).unwrap();

        assert!(!activate(&store, &DEFAULT_HIDDEN_ROUTES).unwrap());
        assert!(store
            .get_map(HIDDEN_ENDPOINTS_KEY, &RouteMap::new())
            .unwrap()
            .is_empty());
    }
}
