//! # Request Pipeline
//!
//! Explicit, ordered pre-dispatch interception. Interceptors are registered
//! against a [`RequestPipeline`] at startup; each inbound request flows
//! through the `Early` stage, then route resolution, then the `ApiDispatch`
//! stage for API routes, and finally normal dispatch. Any interceptor may end
//! the request with a redirect, a rejection, or a delegation to a named
//! default handler.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lockdown_gateway::pipeline::{RequestDescriptor, RequestPipeline, Response};
//! use std::sync::Arc;
//!
//! let mut pipeline = RequestPipeline::new(Arc::new(|_: &RequestDescriptor| {
//!     Response::ok().build()
//! }));
//! pipeline.register(guard);
//! let response = pipeline.handle(RequestDescriptor::builder().target("/wp-login.php").build())?;
//! ```

pub mod chain;
pub mod error;
pub mod interceptor;
pub mod request;
pub mod response;

pub use chain::{DefaultHandler, RequestPipeline, DEFAULT_API_PREFIX, LOGIN_PAGE_HANDLER};
pub use error::{PipelineError, PipelineResult};
pub use interceptor::{Interceptor, Outcome, Rejection, RejectionKind, Stage};
pub use request::{RequestDescriptor, RequestDescriptorBuilder};
pub use response::{Response, ResponseBuilder};
