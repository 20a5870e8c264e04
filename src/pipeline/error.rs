//! Error types for the request pipeline.

use thiserror::Error;

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// HTTP parsing error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid HTTP method.
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// An interceptor delegated to a handler nobody registered.
    #[error("No default handler registered under '{0}'")]
    UnknownHandler(String),

    /// Building the terminal response failed.
    #[error("Response error: {0}")]
    Response(String),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<httparse::Error> for PipelineError {
    fn from(err: httparse::Error) -> Self {
        PipelineError::Parse(err.to_string())
    }
}

impl From<http::method::InvalidMethod> for PipelineError {
    fn from(err: http::method::InvalidMethod) -> Self {
        PipelineError::InvalidMethod(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Response(err.to_string())
    }
}
