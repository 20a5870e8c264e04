//! Pre-dispatch interceptors and their outcomes.

use super::request::RequestDescriptor;
use http::StatusCode;
use std::fmt;

/// Where in the request path an interceptor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Before routing, for every inbound request.
    Early,
    /// After API route resolution, before the route handler.
    ApiDispatch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Early => write!(f, "early"),
            Self::ApiDispatch => write!(f, "api_dispatch"),
        }
    }
}

/// Category of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The caller may never reach this resource.
    Forbidden,
}

/// A structured, terminal error for an API dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Category.
    pub kind: RejectionKind,
    /// HTTP status to emit.
    pub status: StatusCode,
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl Rejection {
    /// A `403 Forbidden` rejection.
    #[must_use]
    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: RejectionKind::Forbidden,
            status: StatusCode::FORBIDDEN,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// What an interceptor decided for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not my concern; keep going.
    Pass,
    /// Send the client elsewhere and stop.
    Redirect(String),
    /// Short-circuit with a structured error.
    Reject(Rejection),
    /// Hand the request to a named default handler, then stop.
    Delegate(String),
}

impl Outcome {
    /// Whether the pipeline should stop here.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pass)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Redirect(url) => write!(f, "redirect({url})"),
            Self::Reject(r) => write!(f, "reject({} {})", r.status.as_u16(), r.code),
            Self::Delegate(name) => write!(f, "delegate({name})"),
        }
    }
}

/// A pre-dispatch hook.
///
/// Interceptors are shared across concurrent requests and must not keep
/// per-request state.
pub trait Interceptor: Send + Sync {
    /// Interceptor name, used in logs.
    fn name(&self) -> &str;

    /// The stage this interceptor belongs to.
    fn stage(&self) -> Stage;

    /// Priority within the stage (higher = runs first).
    fn priority(&self) -> i32 {
        0
    }

    /// Decide what happens to `request`.
    fn intercept(&self, request: &RequestDescriptor) -> Outcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_terminal() {
        assert!(!Outcome::Pass.is_terminal());
        assert!(Outcome::Redirect("/".to_string()).is_terminal());
        assert!(Outcome::Delegate("login_page".to_string()).is_terminal());
    }

    #[test]
    fn test_outcome_display() {
        let outcome = Outcome::Reject(Rejection::forbidden("code", "msg"));
        assert_eq!(outcome.to_string(), "reject(403 code)");
    }
}
