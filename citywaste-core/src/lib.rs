//! Core types and fetcher wiring for the citywaste household discharge sensors.

/// Configuration schema and validation.
pub mod config;
/// Domain models shared by the fetcher, the provider, and the sensors.
pub mod model;
/// Traits describing the remote discharge service.
pub mod ports;
/// Read-only sensor views over the latest snapshot.
pub mod sensor;
/// Throttled multi-page fetcher that owns the snapshot.
pub mod service;

pub use config::*;
pub use model::*;
pub use ports::*;
pub use sensor::*;
pub use service::*;
