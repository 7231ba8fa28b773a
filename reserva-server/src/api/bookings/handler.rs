//! Booking API Handlers
//!
//! The HTTP boundary of the engine: local date + clock time arrive here,
//! get resolved to absolute instants in the business timezone, and only
//! `i64` millis travel further down.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::booking::coordinator;
use crate::core::ServerState;
use crate::utils::time::{date_time_to_millis, parse_date, parse_hhmm};
use crate::utils::{AppError, AppResult};
use shared::models::{BookingRequest, Reservation};

/// Create booking payload
#[derive(Debug, Deserialize)]
pub struct BookingCreate {
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    /// Start clock time in the business timezone, HH:MM
    pub time: String,
    pub party_size: i32,
    /// Optional override of the configured default duration
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub status: &'static str,
}

/// Day listing query
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: String,
}

/// 解析 payload → 绝对毫秒请求 (业务时区)
fn to_request(state: &ServerState, payload: &BookingCreate) -> Result<BookingRequest, AppError> {
    let config = &state.config;
    let date = parse_date(&payload.date)?;
    let time = parse_hhmm(&payload.time)?;

    let duration_minutes = payload
        .duration_minutes
        .unwrap_or(config.booking_duration_minutes);
    if duration_minutes <= 0 {
        return Err(AppError::validation(format!(
            "Duration must be positive: {duration_minutes}"
        )));
    }

    let start_time = date_time_to_millis(date, time, config.timezone);
    Ok(BookingRequest {
        date,
        start_time,
        end_time: start_time + duration_minutes * 60_000,
        party_size: payload.party_size,
    })
}

/// POST /api/bookings - 创建预订
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BookingCreate>,
) -> AppResult<Json<Reservation>> {
    let request = to_request(&state, &payload)?;
    let windows = state.config.service_windows_millis(request.date);

    let reservation = coordinator::create_booking(state.pool(), &request, &windows).await?;
    Ok(Json(reservation))
}

/// PUT /api/bookings/:id - 改期/改人数 (取消并重建，单事务)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<BookingCreate>,
) -> AppResult<Json<Reservation>> {
    let request = to_request(&state, &payload)?;
    let windows = state.config.service_windows_millis(request.date);

    let reservation = coordinator::update_booking(state.pool(), id, &request, &windows).await?;
    Ok(Json(reservation))
}

/// GET /api/bookings?date=YYYY-MM-DD - 某日预订列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Reservation>>> {
    let date = parse_date(&query.date)?;
    let reservations = coordinator::list_day(state.pool(), date).await?;
    Ok(Json(reservations))
}

/// GET /api/bookings/:id - 查询预订
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let reservation = coordinator::get_reservation(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Reservation {} not found", id)))?;
    Ok(Json(reservation))
}

/// DELETE /api/bookings/:id - 取消预订 (幂等)
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CancelResponse>> {
    coordinator::cancel_booking(state.pool(), id).await?;
    Ok(Json(CancelResponse {
        status: "cancelled",
    }))
}
