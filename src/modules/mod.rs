//! # Gateway Modules
//!
//! The interceptor modules. Each one implements the [`ModuleContract`]
//! trait for uniform lifecycle management and hands the pipeline an
//! [`Interceptor`](crate::pipeline::Interceptor) once started.
//!
//! ## Available Modules
//!
//! - [`login_guard`] - Relocates the login entry point behind a custom slug
//! - [`route_filter`] - Rejects dispatch of hidden API routes
//!
//! [`ModuleContract`]: crate::module::ModuleContract

pub mod login_guard;
pub mod route_filter;
