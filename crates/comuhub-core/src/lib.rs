//! Shared plumbing for Comuhub services: env configuration, tracing setup,
//! request-id middleware and health probes.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
