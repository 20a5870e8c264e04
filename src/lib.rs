//! # Lockdown Gateway
//!
//! Request-path access control for a web application: the login entry
//! point is moved behind an administrator-chosen slug, and selected API
//! routes are hidden from dispatch.
//!
//! ## Features
//!
//! - Legacy login redirect with password reset forwarding
//! - Custom login slug served by the existing login page
//! - Login URL and reset mail rewriting
//! - Per-route API hiding with structured `403` errors
//! - JSON-file or in-memory policy storage
//! - Prometheus-compatible module metrics
//!
//! ## Architecture
//!
//! Each component implements the [`module::ModuleContract`] trait for
//! uniform lifecycle management. Started modules register interceptors on a
//! [`pipeline::RequestPipeline`], which runs them in an explicit order in
//! front of normal dispatch. Policy lives behind the [`store::PolicyStore`]
//! trait and is re-read on every decision.

pub mod activation;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod module;
pub mod modules;
pub mod pipeline;
pub mod store;

pub use gateway::{open_store, Gateway, GatewayBuilder, GatewayError, GatewayResult};
