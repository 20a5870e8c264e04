//! In-memory policy store.

use super::entries::{PolicyEntries, PolicyValue};
use super::error::{StoreError, StoreResult};
use super::{PolicyStore, RouteMap};
use std::sync::RwLock;

/// Process-local [`PolicyStore`].
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    entries: RwLock<PolicyEntries>,
}

impl MemoryPolicyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        self.entries
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .get_string(key)
    }

    fn set_string(
        &self,
        key: &str,
        value: &str,
        sanitizer: &dyn Fn(&str) -> String,
    ) -> StoreResult<bool> {
        let value = PolicyValue::Text(sanitizer(value));
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.put(key, value))
    }

    fn get_map(&self, key: &str, default: &RouteMap) -> StoreResult<RouteMap> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get_map(key)?.unwrap_or_else(|| default.clone()))
    }

    fn set_map(&self, key: &str, value: &RouteMap) -> StoreResult<bool> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.put(key, PolicyValue::Routes(value.clone())))
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self
            .entries
            .read()
            .map_err(|_| StoreError::Poisoned)?
            .contains(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_round_trip_applies_sanitizer() {
        let store = MemoryPolicyStore::new();
        assert!(store
            .set_string("login_page_url", "  Entry ", &|v: &str| v.trim().to_lowercase())
            .unwrap());
        assert_eq!(
            store.get_string("login_page_url").unwrap(),
            Some("entry".to_string())
        );
        assert!(store.get_string("redirect_url").unwrap().is_none());
    }

    #[test]
    fn test_map_default_when_absent() {
        let store = MemoryPolicyStore::new();
        let mut default = RouteMap::new();
        default.insert("/x".to_string(), true);

        assert_eq!(store.get_map("hidden_endpoints", &default).unwrap(), default);
        assert!(!store.contains("hidden_endpoints").unwrap());

        store.set_map("hidden_endpoints", &RouteMap::new()).unwrap();
        assert!(store.contains("hidden_endpoints").unwrap());
        assert!(store
            .get_map("hidden_endpoints", &default)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unchanged_write_returns_false() {
        let store = MemoryPolicyStore::new();
        let mut routes = RouteMap::new();
        routes.insert("/wp/v2/users".to_string(), true);
        assert!(store.set_map("hidden_endpoints", &routes).unwrap());
        assert!(!store.set_map("hidden_endpoints", &routes).unwrap());
    }

    #[test]
    fn test_reads_see_latest_write_across_threads() {
        use std::sync::Arc;

        let store = Arc::new(MemoryPolicyStore::new());
        let writer = Arc::clone(&store);
        std::thread::spawn(move || {
            writer
                .set_string("redirect_url", "404", &|v: &str| v.to_string())
                .unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(
            store.get_string("redirect_url").unwrap(),
            Some("404".to_string())
        );
    }
}
