//! # Login Guard Module
//!
//! Moves the login entry point of the site behind an administrator-chosen
//! slug. Anonymous visitors who ask for the legacy login file are sent
//! elsewhere; the custom slug serves the login page instead.
//!
//! ## Features
//!
//! - **Legacy Redirect**: Non-POST legacy login requests are turned away,
//!   password reset links are forwarded to the custom slug
//! - **Custom Slug Serving**: `/{slug}` and `/{slug}/` reach the login page
//! - **URL Rewriting**: Generated login URLs and reset mails point at the slug
//! - **Sanitized Settings**: Slug and redirect target never carry boundary
//!   slashes, queries, or fragments
//!
//! ## Usage
//!
//! ```ignore
//! use lockdown_gateway::modules::login_guard::{LoginGuardHandler, LoginSettings, SiteUrls};
//!
//! let settings = LoginSettings::new(store.clone());
//! settings.set_login_page_url("secure-entry")?;
//!
//! let mut handler = LoginGuardHandler::new(store, SiteUrls::new("https://example.com"));
//! handler.init(ModuleConfig::default())?;
//! handler.start()?;
//! pipeline.register(handler.guard().unwrap());
//! ```

mod config;
mod guard;
mod handler;
mod rewrite;
mod sanitize;
mod settings;

pub use config::{LoginGuardConfig, SiteUrls};
pub use guard::{LoginPathGuard, LoginPolicy, CHECKEMAIL_PARAM, RESET_ACTIONS};
pub use handler::{LoginGuardHandler, LoginGuardStats};
pub use rewrite::{replace_legacy_urls, replace_login_segment};
pub use sanitize::{sanitize_path_setting, sanitize_text_field};
pub use settings::LoginSettings;
