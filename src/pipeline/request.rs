//! Inbound request descriptor.

use super::error::{PipelineError, PipelineResult};
use bytes::Bytes;
use http::Method;
use std::collections::HashMap;
use std::str::FromStr;

/// Maximum number of headers to parse.
const MAX_HEADERS: usize = 100;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Everything the interceptors may look at for one inbound request.
///
/// Missing pieces default to safe values: `GET`, empty query, no form data.
/// Query and form parameters keep the last value when a key repeats.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    target: String,
    path: String,
    query: String,
    query_params: HashMap<String, String>,
    form_params: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Bytes,
    authenticated: bool,
    admin_area: bool,
    route: Option<String>,
}

impl RequestDescriptor {
    /// Create a new descriptor builder.
    #[must_use]
    pub fn builder() -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::new()
    }

    /// Parse a raw HTTP/1.x request.
    ///
    /// Returns the descriptor and the number of bytes consumed. The body is
    /// taken from whatever follows the header block, bounded by
    /// `Content-Length` when present.
    pub fn parse(data: &[u8]) -> PipelineResult<(Self, usize)> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);

        let body_offset = match req.parse(data)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => {
                return Err(PipelineError::Parse("Incomplete request".to_string()))
            },
        };

        let mut builder = RequestDescriptorBuilder::new()
            .method(Method::from_str(req.method.unwrap_or("GET"))?)
            .target(req.path.unwrap_or("/"));

        for header in req.headers.iter() {
            builder = builder.header(header.name, String::from_utf8_lossy(header.value));
        }

        let remaining = &data[body_offset..];
        let body_len = builder
            .headers
            .get("content-length")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map_or(remaining.len(), |len| len.min(remaining.len()));
        let request = builder
            .body(Bytes::copy_from_slice(&remaining[..body_len]))
            .build();

        Ok((request, body_offset + body_len))
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Whether this is a form submission.
    #[must_use]
    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// The raw request target (path plus query).
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The path component, never empty.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// A decoded query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Whether the query carries `name`, with or without a value.
    #[must_use]
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }

    /// A decoded form body parameter.
    #[must_use]
    pub fn form_param(&self, name: &str) -> Option<&str> {
        self.form_params.get(name).map(String::as_str)
    }

    /// A header value (case-insensitive name).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// The request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether the host application already authenticated the caller.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Whether the request targets the administration area.
    #[must_use]
    pub fn is_admin_area(&self) -> bool {
        self.admin_area
    }

    /// The resolved API route, set by the pipeline before API dispatch.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub(crate) fn set_route(&mut self, route: Option<String>) {
        self.route = route;
    }
}

/// Builder for [`RequestDescriptor`].
#[derive(Debug, Default)]
pub struct RequestDescriptorBuilder {
    method: Option<Method>,
    target: Option<String>,
    headers: HashMap<String, String>,
    form_params: HashMap<String, String>,
    body: Bytes,
    authenticated: bool,
    admin_area: bool,
}

impl RequestDescriptorBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the request target (path plus optional query).
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    /// Add a decoded form parameter.
    #[must_use]
    pub fn form_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_params.insert(name.into(), value.into());
        self
    }

    /// Set the raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Mark the caller as authenticated.
    #[must_use]
    pub fn authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Mark the request as targeting the administration area.
    #[must_use]
    pub fn admin_area(mut self, admin_area: bool) -> Self {
        self.admin_area = admin_area;
        self
    }

    /// Build the descriptor.
    #[must_use]
    pub fn build(self) -> RequestDescriptor {
        let method = self.method.unwrap_or(Method::GET);
        let target = self.target.unwrap_or_else(|| "/".to_string());
        let (path, query) = split_target(&target);
        let (path, query) = (path.to_string(), query.to_string());

        let mut form_params = self.form_params;
        let is_form = self
            .headers
            .get("content-type")
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(FORM_CONTENT_TYPE));
        if form_params.is_empty() && method == Method::POST && is_form {
            form_params = parse_params(&self.body);
        }

        RequestDescriptor {
            query_params: parse_params(query.as_bytes()),
            method,
            target,
            path,
            query,
            form_params,
            headers: self.headers,
            body: self.body,
            authenticated: self.authenticated,
            admin_area: self.admin_area,
            route: None,
        }
    }
}

/// Splits a request target into path and raw query, dropping any fragment
/// and any `scheme://authority` prefix of an absolute-form target.
fn split_target(target: &str) -> (&str, &str) {
    let target = target.split('#').next().unwrap_or_default();
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    let path = match path
        .strip_prefix("http://")
        .or_else(|| path.strip_prefix("https://"))
    {
        Some(rest) => rest.find('/').map_or("/", |i| &rest[i..]),
        None => path,
    };

    (if path.is_empty() { "/" } else { path }, query)
}

fn parse_params(raw: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw).into_owned().collect()
}
