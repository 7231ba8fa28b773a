//! Booking Coordinator
//!
//! The only component that owns a transaction boundary. A booking attempt
//! runs `BEGIN IMMEDIATE` so the availability read and the reservation
//! insert form one isolated unit against the calendar: two racing requests
//! for the same tables serialize at the write lock, and the loser re-reads
//! a calendar that already contains the winner's row.
//!
//! SQLITE_BUSY is an expected side effect of that discipline, not a bug, so
//! the coordinator retries it a bounded number of times with backoff before
//! surfacing a storage fault. Rejections never retry.

use chrono::NaiveDate;
use chrono_tz::Tz;
use sqlx::SqlitePool;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::Sqlite;
use std::time::Duration;

use shared::models::{BookingRequest, Reservation, ReservationStatus, Slot};
use shared::util::{now_millis, snowflake_id};

use crate::db::repository::{RepoError, dining_table, reservation};
use crate::utils::time::millis_to_hhmm;

use super::catalog::Catalog;
use super::{EngineError, RejectReason, conflict, matcher, scanner};

/// 写冲突重试预算
const TX_RETRY_LIMIT: u32 = 3;
const TX_RETRY_BACKOFF_MS: u64 = 50;

/// Outcome distinguishing a serialization conflict (retryable) from a final
/// engine result
enum TxError {
    Busy(String),
    Engine(EngineError),
}

impl From<RepoError> for TxError {
    fn from(err: RepoError) -> Self {
        let msg = err.to_string();
        if is_busy_message(&msg) {
            TxError::Busy(msg)
        } else {
            TxError::Engine(EngineError::Database(msg))
        }
    }
}

impl From<EngineError> for TxError {
    fn from(err: EngineError) -> Self {
        TxError::Engine(err)
    }
}

/// Only the exact SQLITE_BUSY/SQLITE_LOCKED message texts count; anything
/// broader would retry unrelated storage faults.
fn is_busy_message(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    msg.contains("database is locked") || msg.contains("database table is locked")
}

fn is_busy_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.code().as_deref(), Some("5") | Some("6") | Some("261") | Some("517"))
                || is_busy_message(db.message())
        }
        _ => false,
    }
}

/// Create a booking for the requested window.
///
/// `service_windows` are the day's spans in absolute millis (half-open);
/// when non-empty, the requested window must fit inside one of them.
pub async fn create_booking(
    pool: &SqlitePool,
    request: &BookingRequest,
    service_windows: &[(i64, i64)],
) -> Result<Reservation, EngineError> {
    if request.end_time <= request.start_time || request.party_size <= 0 {
        return Err(EngineError::rejected(RejectReason::InvalidWindow));
    }
    if !service_windows.is_empty()
        && !service_windows
            .iter()
            .any(|&(ws, we)| ws <= request.start_time && request.end_time <= we)
    {
        return Err(EngineError::rejected(RejectReason::InvalidWindow));
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        match try_create(pool, request).await {
            Ok(reservation) => {
                tracing::info!(
                    reservation_id = reservation.id,
                    table_ids = ?reservation.table_ids,
                    party_size = reservation.party_size,
                    "Booking confirmed"
                );
                return Ok(reservation);
            }
            Err(TxError::Engine(e)) => return Err(e),
            Err(TxError::Busy(msg)) => {
                if attempt > TX_RETRY_LIMIT {
                    return Err(EngineError::Database(format!(
                        "transaction conflict after {TX_RETRY_LIMIT} retries: {msg}"
                    )));
                }
                tracing::warn!(attempt, "Booking transaction busy, retrying: {msg}");
                tokio::time::sleep(Duration::from_millis(TX_RETRY_BACKOFF_MS * attempt as u64))
                    .await;
            }
        }
    }
}

/// One booking attempt inside a single immediate transaction
async fn try_create(pool: &SqlitePool, request: &BookingRequest) -> Result<Reservation, TxError> {
    let mut conn = acquire(pool).await?;

    // IMMEDIATE: take the write lock before reading, so the availability
    // snapshot cannot go stale between the check and the insert
    if let Err(e) = sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await {
        return Err(classify(e));
    }

    match assign_and_insert(&mut conn, request, None).await {
        Ok(reservation) => match sqlx::query("COMMIT").execute(&mut *conn).await {
            Ok(_) => Ok(reservation),
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(classify(e))
            }
        },
        Err(e) => {
            let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
            Err(e)
        }
    }
}

/// Find an assignment and insert the row. `replaces` excludes an existing
/// reservation from the conflict snapshot so a reschedule does not collide
/// with the booking it is about to supersede.
async fn assign_and_insert(
    conn: &mut PoolConnection<Sqlite>,
    request: &BookingRequest,
    replaces: Option<i64>,
) -> Result<Reservation, TxError> {
    let tables = dining_table::find_catalog(&mut **conn).await?;
    let catalog = Catalog::from_tables(tables)?;
    let mut snapshot =
        reservation::find_confirmed_overlapping(&mut **conn, request.start_time, request.end_time)
            .await?;
    if let Some(old_id) = replaces {
        snapshot.retain(|r| r.id != old_id);
    }

    let assignment = matcher::find_assignment(
        &catalog,
        &snapshot,
        request.start_time,
        request.end_time,
        request.party_size,
    )
    .map_err(|no_match| EngineError::rejected(no_match.into()))?;

    // The snapshot was read under the write lock, so the matcher's choice is
    // already conflict-checked; this guard only exists so a matcher
    // regression can never commit a double booking.
    if !conflict::is_free(
        &snapshot,
        &assignment.table_ids,
        request.start_time,
        request.end_time,
    ) {
        return Err(TxError::Engine(EngineError::Database(
            "assignment conflicted inside its own transaction".into(),
        )));
    }

    let record = Reservation {
        id: snowflake_id(),
        table_ids: assignment.table_ids,
        date: request.date,
        start_time: request.start_time,
        end_time: request.end_time,
        party_size: request.party_size,
        status: ReservationStatus::Confirmed,
        created_at: now_millis(),
    };
    reservation::insert_confirmed(&mut **conn, &record).await?;
    Ok(record)
}

/// Reschedule or resize an existing booking.
///
/// Runs as cancel-and-recreate inside one immediate transaction: the old row
/// flips to cancelled and a fresh confirmed row is inserted, with the old
/// reservation excluded from the conflict snapshot so moving within its own
/// window works. All-or-nothing; the returned reservation carries a new id.
pub async fn update_booking(
    pool: &SqlitePool,
    id: i64,
    request: &BookingRequest,
    service_windows: &[(i64, i64)],
) -> Result<Reservation, EngineError> {
    if request.end_time <= request.start_time || request.party_size <= 0 {
        return Err(EngineError::rejected(RejectReason::InvalidWindow));
    }
    if !service_windows.is_empty()
        && !service_windows
            .iter()
            .any(|&(ws, we)| ws <= request.start_time && request.end_time <= we)
    {
        return Err(EngineError::rejected(RejectReason::InvalidWindow));
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        match try_update(pool, id, request).await {
            Ok(reservation) => {
                tracing::info!(
                    old_reservation_id = id,
                    reservation_id = reservation.id,
                    table_ids = ?reservation.table_ids,
                    "Booking rescheduled"
                );
                return Ok(reservation);
            }
            Err(TxError::Engine(e)) => return Err(e),
            Err(TxError::Busy(msg)) => {
                if attempt > TX_RETRY_LIMIT {
                    return Err(EngineError::Database(format!(
                        "transaction conflict after {TX_RETRY_LIMIT} retries: {msg}"
                    )));
                }
                tracing::warn!(attempt, "Reschedule transaction busy, retrying: {msg}");
                tokio::time::sleep(Duration::from_millis(TX_RETRY_BACKOFF_MS * attempt as u64))
                    .await;
            }
        }
    }
}

async fn try_update(
    pool: &SqlitePool,
    id: i64,
    request: &BookingRequest,
) -> Result<Reservation, TxError> {
    let mut conn = acquire(pool).await?;

    if let Err(e) = sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await {
        return Err(classify(e));
    }

    let result = async {
        // Only a confirmed booking can move; a cancelled or unknown one has
        // nothing to release
        let flipped = reservation::mark_cancelled(&mut *conn, id).await?;
        if flipped == 0 {
            return Err(TxError::Engine(EngineError::rejected(
                RejectReason::ReservationNotFound,
            )));
        }
        assign_and_insert(&mut conn, request, Some(id)).await
    }
    .await;

    match result {
        Ok(reservation) => match sqlx::query("COMMIT").execute(&mut *conn).await {
            Ok(_) => Ok(reservation),
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(classify(e))
            }
        },
        Err(e) => {
            let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
            Err(e)
        }
    }
}

async fn acquire(pool: &SqlitePool) -> Result<PoolConnection<Sqlite>, TxError> {
    pool.acquire().await.map_err(classify)
}

fn classify(err: sqlx::Error) -> TxError {
    if is_busy_error(&err) {
        TxError::Busy(err.to_string())
    } else {
        TxError::Engine(EngineError::Database(err.to_string()))
    }
}

/// Cancel a reservation, releasing all of its tables for the interval.
///
/// Idempotent: cancelling an already-cancelled reservation succeeds.
pub async fn cancel_booking(pool: &SqlitePool, id: i64) -> Result<(), EngineError> {
    let flipped = reservation::mark_cancelled(pool, id).await?;
    if flipped > 0 {
        tracing::info!(reservation_id = id, "Booking cancelled");
        return Ok(());
    }
    // Nothing flipped: either already cancelled (fine) or unknown id
    match reservation::find_by_id(pool, id).await? {
        Some(_) => Ok(()),
        None => Err(EngineError::rejected(RejectReason::ReservationNotFound)),
    }
}

/// Fetch one reservation
pub async fn get_reservation(pool: &SqlitePool, id: i64) -> Result<Option<Reservation>, EngineError> {
    Ok(reservation::find_by_id(pool, id).await?)
}

/// All reservations booked for a calendar date (front-desk day listing)
pub async fn list_day(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<Reservation>, EngineError> {
    Ok(reservation::find_by_date(pool, date).await?)
}

/// Scan a day's service windows for bookable slots.
///
/// Loads the catalog and the day's confirmed reservations once, then
/// evaluates every candidate slot against that snapshot. Plain pool reads;
/// never takes the write lock.
pub async fn scan_day(
    pool: &SqlitePool,
    party_size: i32,
    service_windows: &[(i64, i64)],
    granularity_ms: i64,
    duration_ms: i64,
    tz: Tz,
) -> Result<Vec<Slot>, EngineError> {
    if service_windows.is_empty() {
        return Ok(Vec::new());
    }
    let range_start = service_windows.iter().map(|w| w.0).min().unwrap_or(0);
    let range_end = service_windows.iter().map(|w| w.1).max().unwrap_or(0);

    let tables = dining_table::find_catalog(pool).await?;
    let catalog = Catalog::from_tables(tables)?;
    let snapshot = reservation::find_confirmed_overlapping(pool, range_start, range_end).await?;

    let slots = scanner::scan_windows(
        &catalog,
        &snapshot,
        service_windows,
        granularity_ms,
        duration_ms,
        party_size,
    );
    Ok(slots
        .into_iter()
        .map(|(time, bookable)| Slot {
            time,
            label: millis_to_hhmm(time, tz),
            bookable,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_classification_only_matches_lock_messages() {
        assert!(is_busy_message("database is locked"));
        assert!(is_busy_message("error returned from database: database table is locked"));
        // unrelated faults must surface, not retry
        assert!(!is_busy_message("disk I/O error"));
        assert!(!is_busy_message("UNIQUE constraint failed: reservation.id"));
        assert!(!is_busy_message("busy signal from somewhere else"));
    }
}
