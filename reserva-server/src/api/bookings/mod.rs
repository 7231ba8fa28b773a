//! Booking routes

use axum::{Router, routing::get};

use crate::core::ServerState;

pub mod handler;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/bookings", get(handler::list).post(handler::create))
        .route(
            "/api/bookings/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::cancel),
        )
}
