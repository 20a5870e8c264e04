//! # Configuration System
//!
//! TOML-based configuration for the gateway: site URLs, the policy store
//! location, logging, and the two interceptor modules.
//!
//! ## Example Configuration
//!
//! ```toml
//! [site]
//! site_url = "https://example.com"
//! home_url = "https://example.com"
//! legacy_login = "wp-login.php"
//! api_prefix = "/wp-json"
//!
//! [store]
//! path = "/var/lib/lockdown/policy.json"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [login_guard]
//! priority = 100
//!
//! [route_filter]
//! default_hidden = ["/wp/v2/users", "/wp/v2/media"]
//! ```

mod error;
mod loader;
mod types;
mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use types::{GatewayConfig, LogFormat, LogLevel, LoggingConfig, SiteSection, StoreSection};
pub use validation::{
    BasicValidator, StoreValidator, ValidationError, ValidationResult, ValidationSeverity,
    Validator,
};
