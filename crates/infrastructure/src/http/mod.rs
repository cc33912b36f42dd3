//! HTTP clients for weather providers
//!
//! Each provider gets its own `reqwest` client with a fixed timeout, the
//! crate's user agent and a retry/circuit-breaker policy.

mod client_factory;

pub use client_factory::{ProviderClientFactory, ProviderHttpClient, USER_AGENT};
