//! # Route Filter Module
//!
//! Hides API routes from dispatch. An administrator marks routes hidden;
//! dispatching one of them yields a `403` structured error instead of
//! reaching the route handler.
//!
//! ## Usage
//!
//! ```ignore
//! use lockdown_gateway::modules::route_filter::RouteFilterHandler;
//!
//! let mut handler = RouteFilterHandler::new(store);
//! handler.init(ModuleConfig::default())?;
//! handler.start()?;
//!
//! let filter = handler.filter().unwrap();
//! filter.set_hidden("/wp/v2/comments", true)?;
//! pipeline.register(filter);
//! ```

mod config;
mod filter;
mod handler;

pub use config::{RouteFilterConfig, DEFAULT_HIDDEN_ROUTES};
pub use filter::{HiddenRoutesTransform, RouteVisibilityFilter, FORBIDDEN_CODE, FORBIDDEN_MESSAGE};
pub use handler::{RouteFilterHandler, RouteFilterStats};
