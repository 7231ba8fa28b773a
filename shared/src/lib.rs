//! Shared types for the Reserva booking engine
//!
//! Common types used across crates: table catalog and reservation
//! models, API payloads, and small utility functions.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
