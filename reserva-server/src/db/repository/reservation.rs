//! Reservation Repository
//!
//! One row per logical booking: `table_ids` is a JSON array column holding
//! the full table set, so a combined booking can never be half-visible.
//! Functions take `impl SqliteExecutor` where the coordinator must run them
//! inside its transaction.

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{Reservation, ReservationStatus};
use sqlx::sqlite::SqliteExecutor;

/// Raw row shape; `table_ids` and `status` decode in [`to_reservation`]
#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    table_ids: String,
    date: String,
    start_time: i64,
    end_time: i64,
    party_size: i32,
    status: String,
    created_at: i64,
}

fn to_reservation(row: ReservationRow) -> RepoResult<Reservation> {
    let table_ids: Vec<i64> = serde_json::from_str(&row.table_ids).map_err(|e| {
        RepoError::Database(format!(
            "Corrupt table_ids on reservation {}: {e}",
            row.id
        ))
    })?;
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
        .map_err(|e| RepoError::Database(format!("Corrupt date on reservation {}: {e}", row.id)))?;
    let status: ReservationStatus = row.status.parse().map_err(RepoError::Database)?;
    Ok(Reservation {
        id: row.id,
        table_ids,
        date,
        start_time: row.start_time,
        end_time: row.end_time,
        party_size: row.party_size,
        status,
        created_at: row.created_at,
    })
}

/// Find reservation by id
pub async fn find_by_id<'e>(
    db: impl SqliteExecutor<'e>,
    id: i64,
) -> RepoResult<Option<Reservation>> {
    let row = sqlx::query_as::<_, ReservationRow>(
        "SELECT id, table_ids, date, start_time, end_time, party_size, status, created_at FROM reservation WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    row.map(to_reservation).transpose()
}

/// All confirmed reservations overlapping `[start, end)` (half-open).
///
/// This is the single calendar read both the coordinator and the scanner
/// snapshot from; per-table filtering happens in memory in `booking::conflict`.
pub async fn find_confirmed_overlapping<'e>(
    db: impl SqliteExecutor<'e>,
    start: i64,
    end: i64,
) -> RepoResult<Vec<Reservation>> {
    let rows = sqlx::query_as::<_, ReservationRow>(
        "SELECT id, table_ids, date, start_time, end_time, party_size, status, created_at FROM reservation WHERE status = 'confirmed' AND start_time < ? AND end_time > ? ORDER BY start_time",
    )
    .bind(end)
    .bind(start)
    .fetch_all(db)
    .await?;
    rows.into_iter().map(to_reservation).collect()
}

/// All reservations (any status) booked for a calendar date, newest last
pub async fn find_by_date<'e>(
    db: impl SqliteExecutor<'e>,
    date: NaiveDate,
) -> RepoResult<Vec<Reservation>> {
    let rows = sqlx::query_as::<_, ReservationRow>(
        "SELECT id, table_ids, date, start_time, end_time, party_size, status, created_at FROM reservation WHERE date = ? ORDER BY start_time",
    )
    .bind(date.format("%Y-%m-%d").to_string())
    .fetch_all(db)
    .await?;
    rows.into_iter().map(to_reservation).collect()
}

/// Insert a confirmed reservation. Caller owns the transaction.
pub async fn insert_confirmed<'e>(
    db: impl SqliteExecutor<'e>,
    reservation: &Reservation,
) -> RepoResult<()> {
    let table_ids = serde_json::to_string(&reservation.table_ids)
        .map_err(|e| RepoError::Database(format!("Failed to encode table_ids: {e}")))?;
    sqlx::query(
        "INSERT INTO reservation (id, table_ids, date, start_time, end_time, party_size, status, created_at) VALUES (?, ?, ?, ?, ?, ?, 'confirmed', ?)",
    )
    .bind(reservation.id)
    .bind(table_ids)
    .bind(reservation.date.format("%Y-%m-%d").to_string())
    .bind(reservation.start_time)
    .bind(reservation.end_time)
    .bind(reservation.party_size)
    .bind(reservation.created_at)
    .execute(db)
    .await?;
    Ok(())
}

/// Flip a reservation's status to cancelled.
///
/// Returns the number of rows flipped (0 when already cancelled or absent);
/// idempotency is decided by the coordinator, which re-reads the row.
pub async fn mark_cancelled<'e>(db: impl SqliteExecutor<'e>, id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("UPDATE reservation SET status = 'cancelled' WHERE id = ? AND status = 'confirmed'")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected())
}
