//! Availability scan routes

use axum::{Router, routing::get};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/availability", get(handler::scan))
}
