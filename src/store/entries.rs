//! Key/value entries shared by the store backends.

use super::error::{StoreError, StoreResult};
use super::RouteMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single stored setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum PolicyValue {
    /// Path-like string setting.
    Text(String),
    /// Route → flag mapping.
    Routes(RouteMap),
}

/// The full key space of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct PolicyEntries {
    values: BTreeMap<String, PolicyValue>,
}

impl PolicyEntries {
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub(crate) fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(PolicyValue::Text(value)) => Ok(Some(value.clone())),
            Some(PolicyValue::Routes(_)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    pub(crate) fn get_map(&self, key: &str) -> StoreResult<Option<RouteMap>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(PolicyValue::Routes(routes)) => Ok(Some(routes.clone())),
            Some(PolicyValue::Text(_)) => Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: "route map",
            }),
        }
    }

    /// Stores `value` under `key`; returns whether anything changed.
    pub(crate) fn put(&mut self, key: &str, value: PolicyValue) -> bool {
        if self.values.get(key) == Some(&value) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_reports_change() {
        let mut entries = PolicyEntries::default();
        assert!(entries.put("login_page_url", PolicyValue::Text("a".to_string())));
        assert!(!entries.put("login_page_url", PolicyValue::Text("a".to_string())));
        assert!(entries.put("login_page_url", PolicyValue::Text("b".to_string())));
    }

    #[test]
    fn test_shape_mismatch() {
        let mut entries = PolicyEntries::default();
        entries.put("hidden_endpoints", PolicyValue::Routes(RouteMap::new()));
        assert!(matches!(
            entries.get_string("hidden_endpoints"),
            Err(StoreError::TypeMismatch { .. })
        ));
        assert!(entries.get_map("missing").unwrap().is_none());
    }

    #[test]
    fn test_json_shape() {
        let mut entries = PolicyEntries::default();
        entries.put("login_page_url", PolicyValue::Text("secure-entry".to_string()));
        let mut routes = RouteMap::new();
        routes.insert("/wp/v2/users".to_string(), true);
        entries.put("hidden_endpoints", PolicyValue::Routes(routes));

        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(
            json,
            r#"{"hidden_endpoints":{"/wp/v2/users":true},"login_page_url":"secure-entry"}"#
        );

        let back: PolicyEntries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entries);
    }
}
