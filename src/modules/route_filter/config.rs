//! Configuration for the route filter.

use serde::{Deserialize, Serialize};

/// Routes hidden on first activation.
pub const DEFAULT_HIDDEN_ROUTES: [&str; 2] = ["/wp/v2/users", "/wp/v2/media"];

/// Route filter module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteFilterConfig {
    /// Whether the filter is registered at all.
    pub enabled: bool,

    /// Priority within the API dispatch stage (higher = runs first).
    pub priority: i32,

    /// Routes seeded as hidden when the store has never held a route map.
    pub default_hidden: Vec<String>,
}

impl Default for RouteFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: 0,
            default_hidden: DEFAULT_HIDDEN_ROUTES.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl RouteFilterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        for route in &self.default_hidden {
            if !route.starts_with('/') {
                return Err(format!(
                    "route_filter.default_hidden: '{route}' must start with '/'"
                ));
            }
        }
        Ok(())
    }
}
