//! # Policy Store
//!
//! Persisted key/value settings consulted by the interceptors on every
//! request. Two backends are provided:
//!
//! - [`MemoryPolicyStore`] - process-local, for tests and ephemeral setups
//! - [`FilePolicyStore`] - JSON file, survives restarts
//!
//! Reads always observe the latest committed write; nothing above the store
//! caches policy across requests.

mod entries;
mod error;
mod file;
mod memory;

use std::collections::BTreeMap;
use std::fmt;

pub use error::{StoreError, StoreResult};
pub use file::FilePolicyStore;
pub use memory::MemoryPolicyStore;

/// Key holding the custom login path segment.
pub const LOGIN_PAGE_URL_KEY: &str = "login_page_url";

/// Key holding the redirect path used for rejected legacy-login requests.
pub const REDIRECT_URL_KEY: &str = "redirect_url";

/// Key holding the hidden route map.
pub const HIDDEN_ENDPOINTS_KEY: &str = "hidden_endpoints";

/// Route → hidden flag.
pub type RouteMap = BTreeMap<String, bool>;

/// Persisted settings consulted by the interceptors.
///
/// Writers report `Ok(true)` when the stored value changed and `Ok(false)`
/// when it already held the same value.
pub trait PolicyStore: fmt::Debug + Send + Sync {
    /// Reads a string setting.
    fn get_string(&self, key: &str) -> StoreResult<Option<String>>;

    /// Runs `value` through `sanitizer` and stores the result.
    fn set_string(
        &self,
        key: &str,
        value: &str,
        sanitizer: &dyn Fn(&str) -> String,
    ) -> StoreResult<bool>;

    /// Reads a route map, falling back to `default` when the key is absent.
    fn get_map(&self, key: &str, default: &RouteMap) -> StoreResult<RouteMap>;

    /// Stores a route map.
    fn set_map(&self, key: &str, value: &RouteMap) -> StoreResult<bool>;

    /// Checks whether a key has ever been written.
    fn contains(&self, key: &str) -> StoreResult<bool>;
}
