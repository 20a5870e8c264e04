//! # Module Contract
//!
//! The contract shared by the gateway's interceptor modules. Each module is
//! driven through `init` → `start` → `stop` by the [`crate::gateway::Gateway`]
//! and reports its counters through [`ModuleContract::metrics`].

mod config;
mod contract;
mod error;
mod manifest;
mod status;

pub use config::ModuleConfig;
pub use contract::{MetricsPayload, ModuleContract};
pub use error::{ModuleError, ModuleResult};
pub use manifest::{Capability, ModuleManifest, SemVer};
pub use status::ModuleStatus;
