//! Core modules: configuration, shared state, HTTP server

pub mod config;
pub mod server;
pub mod state;

pub use config::{Config, ServiceWindow};
pub use server::Server;
pub use state::ServerState;
