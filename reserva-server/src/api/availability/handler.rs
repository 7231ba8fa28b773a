//! Availability API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::booking::coordinator;
use crate::core::ServerState;
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult};
use shared::models::Slot;

/// Availability scan query
#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    pub party_size: i32,
}

/// GET /api/availability?date=YYYY-MM-DD&party_size=N - 扫描可预订时段
pub async fn scan(
    State(state): State<ServerState>,
    Query(query): Query<ScanQuery>,
) -> AppResult<Json<Vec<Slot>>> {
    if query.party_size <= 0 {
        return Err(AppError::validation(format!(
            "Party size must be positive: {}",
            query.party_size
        )));
    }
    let config = &state.config;
    let date = parse_date(&query.date)?;
    let windows = config.service_windows_millis(date);

    let slots = coordinator::scan_day(
        state.pool(),
        query.party_size,
        &windows,
        config.slot_granularity_ms(),
        config.booking_duration_ms(),
        config.timezone,
    )
    .await?;
    Ok(Json(slots))
}
