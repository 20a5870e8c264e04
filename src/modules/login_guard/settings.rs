//! Write points for the login settings.

use super::sanitize::sanitize_path_setting;
use crate::store::{PolicyStore, StoreResult, LOGIN_PAGE_URL_KEY, REDIRECT_URL_KEY};
use std::sync::Arc;
use tracing::info;

/// The two administrator-facing login fields.
///
/// Every write goes through [`sanitize_path_setting`]; an input that
/// sanitizes to nothing is stored as empty and disables the setting.
#[derive(Debug, Clone)]
pub struct LoginSettings {
    store: Arc<dyn PolicyStore>,
}

impl LoginSettings {
    /// Create settings backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }

    /// The stored login slug, if any.
    pub fn login_page_url(&self) -> StoreResult<Option<String>> {
        self.store.get_string(LOGIN_PAGE_URL_KEY)
    }

    /// The stored redirect target for turned-away visitors, if any.
    pub fn redirect_url(&self) -> StoreResult<Option<String>> {
        self.store.get_string(REDIRECT_URL_KEY)
    }

    /// Store a new login slug. Returns whether the stored value changed.
    pub fn set_login_page_url(&self, value: &str) -> StoreResult<bool> {
        let changed = self
            .store
            .set_string(LOGIN_PAGE_URL_KEY, value, &sanitize_path_setting)?;
        if changed {
            info!(key = LOGIN_PAGE_URL_KEY, "Login slug updated");
        }
        Ok(changed)
    }

    /// Store a new redirect target. Returns whether the stored value changed.
    pub fn set_redirect_url(&self, value: &str) -> StoreResult<bool> {
        let changed = self
            .store
            .set_string(REDIRECT_URL_KEY, value, &sanitize_path_setting)?;
        if changed {
            info!(key = REDIRECT_URL_KEY, "Legacy login redirect updated");
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPolicyStore;

    fn settings() -> LoginSettings {
        LoginSettings::new(Arc::new(MemoryPolicyStore::new()))
    }

    #[test]
    fn test_writes_are_sanitized() {
        let settings = settings();
        assert!(settings.set_login_page_url("/secure-entry/?x=1").unwrap());
        assert_eq!(
            settings.login_page_url().unwrap().as_deref(),
            Some("secure-entry")
        );

        assert!(settings.set_redirect_url(" /not-found# ").unwrap());
        assert_eq!(settings.redirect_url().unwrap().as_deref(), Some("not-found"));
    }

    #[test]
    fn test_unchanged_write() {
        let settings = settings();
        assert!(settings.set_login_page_url("entry").unwrap());
        assert!(!settings.set_login_page_url("/entry/").unwrap());
    }

    #[test]
    fn test_empty_disables() {
        let settings = settings();
        settings.set_login_page_url("entry").unwrap();
        assert!(settings.set_login_page_url("///").unwrap());
        assert_eq!(settings.login_page_url().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_unset_reads_none() {
        let settings = settings();
        assert!(settings.login_page_url().unwrap().is_none());
        assert!(settings.redirect_url().unwrap().is_none());
    }
}
