//! Domain layer for the weather orchestrator
//!
//! Contains the location value objects, the `LocationWeather` aggregate and
//! domain errors. Every constructor validates; invalid values never exist.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
