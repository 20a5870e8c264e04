//! Configuration for the login guard.

use serde::{Deserialize, Serialize};
use url::Url;

/// Base URLs of the protected site, used to build redirect targets and to
/// recognize legacy login links in outbound messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteUrls {
    /// Where the application itself is installed.
    pub site_url: String,

    /// Public front page of the site.
    pub home_url: String,

    /// Login-context URL of the network root on multi-site installs.
    /// Falls back to `site_url` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_site_url: Option<String>,

    /// Filename of the legacy login entry point.
    pub legacy_login: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            site_url: "http://localhost".to_string(),
            home_url: "http://localhost".to_string(),
            network_site_url: None,
            legacy_login: "wp-login.php".to_string(),
        }
    }
}

impl SiteUrls {
    /// Create site URLs where site and home share one base.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            site_url: base.clone(),
            home_url: base,
            ..Self::default()
        }
    }

    /// Override the home URL.
    #[must_use]
    pub fn with_home_url(mut self, home_url: impl Into<String>) -> Self {
        self.home_url = home_url.into();
        self
    }

    /// Override the network login-context URL.
    #[must_use]
    pub fn with_network_site_url(mut self, url: impl Into<String>) -> Self {
        self.network_site_url = Some(url.into());
        self
    }

    /// `path` under the home URL; the bare home URL for an empty path.
    #[must_use]
    pub fn home_url(&self, path: &str) -> String {
        join(&self.home_url, path)
    }

    /// `path` under the site URL.
    #[must_use]
    pub fn site_url(&self, path: &str) -> String {
        join(&self.site_url, path)
    }

    /// `path` under the network login-context URL.
    #[must_use]
    pub fn network_site_url(&self, path: &str) -> String {
        join(
            self.network_site_url.as_deref().unwrap_or(&self.site_url),
            path,
        )
    }

    /// Every fully-qualified spelling of the legacy login URL, deduplicated,
    /// in site / network / home order.
    #[must_use]
    pub fn legacy_login_urls(&self) -> Vec<String> {
        let mut urls = Vec::with_capacity(3);
        for url in [
            self.site_url(&self.legacy_login),
            self.network_site_url(&self.legacy_login),
            self.home_url(&self.legacy_login),
        ] {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        check_base("site.site_url", &self.site_url)?;
        check_base("site.home_url", &self.home_url)?;
        if let Some(ref network) = self.network_site_url {
            check_base("site.network_site_url", network)?;
        }

        if self.legacy_login.is_empty() || self.legacy_login.contains(['/', '?', '#']) {
            return Err(format!(
                "site.legacy_login: '{}' must be a single path segment",
                self.legacy_login
            ));
        }

        Ok(())
    }
}

fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{}", path.trim_start_matches('/'))
    }
}

fn check_base(field: &str, value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("{field}: invalid URL '{value}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("{field}: unsupported scheme '{}'", url.scheme()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(format!("{field}: base URL must not carry a query or fragment"));
    }
    Ok(())
}

/// Login guard module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginGuardConfig {
    /// Whether the guard is registered at all.
    pub enabled: bool,

    /// Priority within the early stage (higher = runs first).
    pub priority: i32,
}

impl Default for LoginGuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_url_join() {
        let urls = SiteUrls::new("https://example.com/");
        assert_eq!(urls.home_url(""), "https://example.com");
        assert_eq!(urls.home_url("/"), "https://example.com/");
        assert_eq!(urls.home_url("/404"), "https://example.com/404");
        assert_eq!(urls.home_url("secure-entry"), "https://example.com/secure-entry");
    }

    #[test]
    fn test_legacy_login_urls_dedup() {
        let urls = SiteUrls::new("https://example.com");
        assert_eq!(
            urls.legacy_login_urls(),
            vec!["https://example.com/wp-login.php".to_string()]
        );

        let urls = SiteUrls::new("https://example.com/wp")
            .with_home_url("https://example.com")
            .with_network_site_url("https://network.example.com");
        assert_eq!(
            urls.legacy_login_urls(),
            vec![
                "https://example.com/wp/wp-login.php".to_string(),
                "https://network.example.com/wp-login.php".to_string(),
                "https://example.com/wp-login.php".to_string(),
            ]
        );
    }

    #[test]
    fn test_validate() {
        assert!(SiteUrls::new("https://example.com").validate().is_ok());
        assert!(SiteUrls::new("not a url").validate().is_err());
        assert!(SiteUrls::new("ftp://example.com").validate().is_err());
        assert!(SiteUrls::new("https://example.com/?x=1").validate().is_err());

        let mut urls = SiteUrls::new("https://example.com");
        urls.legacy_login = "auth/login.php".to_string();
        assert!(urls.validate().is_err());
    }

    #[test]
    fn test_parse_config() {
        let config: LoginGuardConfig = toml::from_str("priority = 5").unwrap();
        assert!(config.enabled);
        assert_eq!(config.priority, 5);
    }
}
