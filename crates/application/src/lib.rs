//! Application layer - Use cases and orchestration
//!
//! Contains the provider fallback orchestrator, the cached aggregate
//! service and the port definitions the infrastructure layer implements.

pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
