//! Dining table catalog routes

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/tables", get(handler::list).post(handler::create))
        .route(
            "/api/tables/{id}",
            put(handler::update).get(handler::get_by_id).delete(handler::delete),
        )
}
