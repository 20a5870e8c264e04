//! Configuration validation system.

use super::types::GatewayConfig;

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `site.home_url`.
    pub field: String,
    /// Error message.
    pub message: String,
    /// Severity level.
    pub severity: ValidationSeverity,
}

impl ValidationError {
    /// Create a finding that rejects the configuration.
    #[must_use]
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    /// Create a finding that is only logged.
    #[must_use]
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }
}

/// Severity of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// The configuration is rejected.
    Error,
    /// The configuration loads, but the finding is logged.
    Warning,
}

/// Findings collected by one validator.
#[derive(Debug, Default)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new empty (valid) result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Check if the validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self
            .errors
            .iter()
            .any(|e| e.severity == ValidationSeverity::Error)
    }

    /// All findings, errors and warnings alike.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Get only errors (not warnings).
    #[must_use]
    pub fn errors_only(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Error)
            .collect()
    }

    /// Get only warnings.
    #[must_use]
    pub fn warnings(&self) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ValidationSeverity::Warning)
            .collect()
    }

    /// Merge another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}

/// Trait for configuration validators.
pub trait Validator: std::fmt::Debug + Send + Sync {
    /// Validate a configuration and return any errors.
    fn validate(&self, config: &GatewayConfig) -> ValidationResult;
}

/// Built-in validator for site and module settings.
#[derive(Debug, Default)]
pub struct BasicValidator;

impl BasicValidator {
    /// Create a new basic validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator for BasicValidator {
    fn validate(&self, config: &GatewayConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Err(message) = config.site.urls.validate() {
            result.add_error(ValidationError::error("site", message));
        }

        if !config.site.api_prefix.starts_with('/') || config.site.api_prefix.len() < 2 {
            result.add_error(ValidationError::error(
                "site.api_prefix",
                format!(
                    "API prefix '{}' must start with '/' and name a path",
                    config.site.api_prefix
                ),
            ));
        }

        if let Err(message) = config.route_filter.validate() {
            result.add_error(ValidationError::error("route_filter", message));
        }

        if !config.login_guard.enabled && !config.route_filter.enabled {
            result.add_error(ValidationError::warning(
                "modules",
                "Both login_guard and route_filter are disabled",
            ));
        }

        result
    }
}

/// Validator for the policy store location.
#[derive(Debug, Default)]
pub struct StoreValidator;

impl StoreValidator {
    /// Create a new store validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator for StoreValidator {
    fn validate(&self, config: &GatewayConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        match config.store.path {
            None => {
                result.add_error(ValidationError::warning(
                    "store.path",
                    "No store path set, policy changes are lost on restart",
                ));
            },
            Some(ref path) if path.file_name().is_none() || path.is_dir() => {
                result.add_error(ValidationError::error(
                    "store.path",
                    format!("Store path '{}' must name a file", path.display()),
                ));
            },
            Some(_) => {},
        }

        result
    }
}
