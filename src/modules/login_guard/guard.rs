//! Legacy login relocation.

use super::config::SiteUrls;
use super::handler::LoginGuardStats;
use super::rewrite::{replace_legacy_urls, replace_login_segment};
use crate::pipeline::{Interceptor, Outcome, RequestDescriptor, Stage, LOGIN_PAGE_HANDLER};
use crate::store::{PolicyStore, StoreResult, LOGIN_PAGE_URL_KEY, REDIRECT_URL_KEY};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// `action` values that belong to the password reset flow.
pub const RESET_ACTIONS: [&str; 3] = ["lostpassword", "rp", "resetpass"];

/// Query key the reset confirmation screen carries.
pub const CHECKEMAIL_PARAM: &str = "checkemail";

const ACTION_PARAM: &str = "action";

/// The login settings as currently stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPolicy {
    /// Slug the login page is served under. `None` disables relocation.
    pub custom_login_path: Option<String>,
    /// Where turned-away legacy visitors go. `None` means the site root.
    pub redirect_path: Option<String>,
}

impl LoginPolicy {
    /// Read both settings. Empty values count as unset.
    pub fn load(store: &dyn PolicyStore) -> StoreResult<Self> {
        Ok(Self {
            custom_login_path: non_empty(store.get_string(LOGIN_PAGE_URL_KEY)?),
            redirect_path: non_empty(store.get_string(REDIRECT_URL_KEY)?),
        })
    }

    /// Whether login relocation is in effect.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.custom_login_path.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Hides the legacy login entry point behind an administrator-chosen slug.
///
/// As an [`Interceptor`] it runs in the early stage: legacy login requests
/// from anonymous visitors are redirected away, and requests for the custom
/// slug are delegated to the login page handler. The remaining methods are
/// hooks for URL builders and outbound mail.
pub struct LoginPathGuard {
    store: Arc<dyn PolicyStore>,
    urls: SiteUrls,
    legacy_needle: String,
    priority: i32,
    stats: Arc<LoginGuardStats>,
}

impl std::fmt::Debug for LoginPathGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginPathGuard")
            .field("urls", &self.urls)
            .field("priority", &self.priority)
            .finish()
    }
}

impl LoginPathGuard {
    /// Create a guard reading its policy from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PolicyStore>, urls: SiteUrls) -> Self {
        let legacy_needle = format!("/{}", urls.legacy_login.to_ascii_lowercase());
        Self {
            store,
            urls,
            legacy_needle,
            priority: 0,
            stats: Arc::new(LoginGuardStats::new()),
        }
    }

    /// Set the priority within the early stage.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Share a stats block with the owning handler.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<LoginGuardStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Get statistics.
    #[must_use]
    pub fn stats(&self) -> &LoginGuardStats {
        &self.stats
    }

    /// Site URLs this guard builds targets from.
    #[must_use]
    pub fn urls(&self) -> &SiteUrls {
        &self.urls
    }

    /// Current policy. A store failure disables relocation for this call.
    #[must_use]
    pub fn policy(&self) -> LoginPolicy {
        match LoginPolicy::load(self.store.as_ref()) {
            Ok(policy) => policy,
            Err(e) => {
                self.stats.store_errors.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Login policy unreadable, relocation disabled");
                LoginPolicy::default()
            },
        }
    }

    /// Whether the request path names the legacy login file. The query is
    /// not consulted, so `redirect_to=/wp-login.php` never matches.
    #[must_use]
    pub fn is_legacy_login(&self, request: &RequestDescriptor) -> bool {
        request
            .path()
            .to_ascii_lowercase()
            .contains(&self.legacy_needle)
    }

    /// Decide a request against an explicit policy.
    pub fn decide(&self, request: &RequestDescriptor, policy: &LoginPolicy) -> Outcome {
        let Some(custom) = policy.custom_login_path.as_deref() else {
            return Outcome::Pass;
        };
        if request.is_admin_area() {
            return Outcome::Pass;
        }

        if is_custom_path(request.path(), custom) {
            self.stats.delegations.fetch_add(1, Ordering::Relaxed);
            debug!(path = %request.path(), "Serving login page at custom path");
            return Outcome::Delegate(LOGIN_PAGE_HANDLER.to_string());
        }

        if !request.is_authenticated() && self.is_legacy_login(request) {
            return self.turn_away(request, custom, policy.redirect_path.as_deref());
        }

        Outcome::Pass
    }

    fn turn_away(
        &self,
        request: &RequestDescriptor,
        custom: &str,
        redirect_path: Option<&str>,
    ) -> Outcome {
        self.stats.requests_checked.fetch_add(1, Ordering::Relaxed);

        let action = request
            .query_param(ACTION_PARAM)
            .or_else(|| request.form_param(ACTION_PARAM));
        let reset_flow = action.is_some_and(|a| RESET_ACTIONS.contains(&a))
            || request.has_query_param(CHECKEMAIL_PARAM);

        if request.is_post() {
            self.stats.passthroughs.fetch_add(1, Ordering::Relaxed);
            trace!(reset_flow, "Legacy login POST passed through");
            return Outcome::Pass;
        }

        let target = if reset_flow {
            let mut url = self.urls.home_url(&format!("/{custom}"));
            if !request.query().is_empty() {
                url.push('?');
                url.push_str(request.query());
            }
            url
        } else {
            match redirect_path {
                Some(path) => self.urls.home_url(&format!("/{path}")),
                None => self.urls.home_url(""),
            }
        };

        self.stats.redirects.fetch_add(1, Ordering::Relaxed);
        debug!(reset_flow, location = %target, "Legacy login request redirected");
        Outcome::Redirect(target)
    }

    /// Rewrite a URL produced by the site URL builder.
    #[must_use]
    pub fn rewrite_site_url(&self, url: &str) -> String {
        self.rewrite_url(url)
    }

    /// Rewrite a URL produced by the login URL builder, including any
    /// redirect-back target it carries in the query.
    #[must_use]
    pub fn rewrite_login_url(&self, url: &str) -> String {
        self.rewrite_url(url)
    }

    fn rewrite_url(&self, url: &str) -> String {
        let Some(custom) = self.policy().custom_login_path else {
            return url.to_string();
        };

        let rewritten = replace_login_segment(url, &self.urls.legacy_login, &custom);
        if rewritten != url {
            self.stats.urls_rewritten.fetch_add(1, Ordering::Relaxed);
        }
        rewritten.into_owned()
    }

    /// Point every legacy login link in a password reset message at the
    /// custom slug.
    #[must_use]
    pub fn rewrite_reset_message(&self, message: &str) -> String {
        let Some(custom) = self.policy().custom_login_path else {
            return message.to_string();
        };

        let custom_url = self.urls.home_url(&format!("/{custom}"));
        replace_legacy_urls(message, &self.urls.legacy_login_urls(), &custom_url)
    }

    /// Where to send the user after a successful password reset.
    #[must_use]
    pub fn after_password_reset(&self) -> Outcome {
        match self.policy().custom_login_path {
            Some(custom) => {
                Outcome::Redirect(self.urls.home_url(&format!("/{custom}?reset=true")))
            },
            None => Outcome::Pass,
        }
    }
}

fn is_custom_path(path: &str, custom: &str) -> bool {
    path.strip_prefix('/')
        .map(|rest| rest.strip_suffix('/').unwrap_or(rest))
        .is_some_and(|slug| slug == custom)
}

impl Interceptor for LoginPathGuard {
    fn name(&self) -> &str {
        "login_path_guard"
    }

    fn stage(&self) -> Stage {
        Stage::Early
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn intercept(&self, request: &RequestDescriptor) -> Outcome {
        self.decide(request, &self.policy())
    }
}
