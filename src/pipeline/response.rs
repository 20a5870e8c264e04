//! HTTP responses emitted for terminal outcomes.

use super::error::PipelineResult;
use super::interceptor::Rejection;
use bytes::{Bytes, BytesMut};
use http::StatusCode;
use serde::Serialize;
use std::collections::HashMap;

/// HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    status: StatusCode,
    /// Response headers.
    headers: HashMap<String, String>,
    /// Response body.
    body: Bytes,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    data: ErrorData,
}

#[derive(Serialize)]
struct ErrorData {
    status: u16,
}

impl Response {
    /// Create a new response builder.
    #[must_use]
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    /// Create an OK (200) response.
    #[must_use]
    pub fn ok() -> ResponseBuilder {
        ResponseBuilder::new().status(StatusCode::OK)
    }

    /// A `302 Found` pointing at `location`.
    #[must_use]
    pub fn redirect(location: &str) -> Self {
        ResponseBuilder::new()
            .status(StatusCode::FOUND)
            .header("Location", location)
            .build()
    }

    /// A structured JSON error for a rejected API dispatch.
    pub fn rejection(rejection: &Rejection) -> PipelineResult<Self> {
        let body = serde_json::to_vec(&ErrorBody {
            code: &rejection.code,
            message: &rejection.message,
            data: ErrorData {
                status: rejection.status.as_u16(),
            },
        })?;

        Ok(ResponseBuilder::new()
            .status(rejection.status)
            .header("Content-Type", "application/json; charset=UTF-8")
            .body(body)
            .build())
    }

    /// Get the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Get the response body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Set a header value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_lowercase(), value.into());
    }

    /// Serialize the response as HTTP/1.1.
    #[must_use]
    pub fn serialize(&self) -> BytesMut {
        let mut buf = BytesMut::new();

        buf.extend_from_slice(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status.as_u16(),
                self.status.canonical_reason().unwrap_or("")
            )
            .as_bytes(),
        );

        let mut names: Vec<_> = self.headers.keys().collect();
        names.sort();
        for name in names {
            buf.extend_from_slice(format!("{}: {}\r\n", name, self.headers[name]).as_bytes());
        }

        if !self.headers.contains_key("content-length") {
            buf.extend_from_slice(format!("content-length: {}\r\n", self.body.len()).as_bytes());
        }

        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&self.body);

        buf
    }
}

/// Builder for HTTP responses.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl ResponseBuilder {
    /// Create a new response builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Set the status code.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the response.
    #[must_use]
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
