//! Conflict Resolver
//!
//! Pure half-open interval logic over a snapshot of confirmed reservations.
//! The snapshot must come from the same transaction as any subsequent write;
//! the coordinator owns that rule.

use shared::models::Reservation;

/// Half-open overlap: `[a_start, a_end)` intersects `[b_start, b_end)`.
///
/// Back-to-back intervals (one ending exactly when the other starts) do NOT
/// overlap.
pub fn overlaps(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start < b_end && b_start < a_end
}

/// Whether every table in `table_ids` is free for `[start, end)`.
///
/// False iff any confirmed reservation sharing at least one id overlaps the
/// window. Cancelled reservations never block.
pub fn is_free(reservations: &[Reservation], table_ids: &[i64], start: i64, end: i64) -> bool {
    debug_assert!(end > start);
    debug_assert!(!table_ids.is_empty());
    !reservations.iter().any(|r| {
        r.blocks()
            && overlaps(r.start_time, r.end_time, start, end)
            && r.table_ids.iter().any(|id| table_ids.contains(id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::ReservationStatus;

    const HOUR: i64 = 3_600_000;

    fn reservation(table_ids: Vec<i64>, start: i64, end: i64, status: ReservationStatus) -> Reservation {
        Reservation {
            id: 1,
            table_ids,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: start,
            end_time: end,
            party_size: 2,
            status,
            created_at: 0,
        }
    }

    #[test]
    fn overlap_is_half_open() {
        // touching endpoints do not overlap
        assert!(!overlaps(0, HOUR, HOUR, 2 * HOUR));
        assert!(!overlaps(HOUR, 2 * HOUR, 0, HOUR));
        // containment and partial overlap do
        assert!(overlaps(0, 2 * HOUR, HOUR, 3 * HOUR));
        assert!(overlaps(0, 3 * HOUR, HOUR, 2 * HOUR));
        assert!(overlaps(HOUR, 2 * HOUR, HOUR, 2 * HOUR));
    }

    #[test]
    fn busy_table_is_not_free() {
        let calendar = vec![reservation(vec![3], 0, 2 * HOUR, ReservationStatus::Confirmed)];
        assert!(!is_free(&calendar, &[3], HOUR, 3 * HOUR));
        // disjoint table set stays free
        assert!(is_free(&calendar, &[1, 2], HOUR, 3 * HOUR));
    }

    #[test]
    fn back_to_back_bookings_are_permitted() {
        let calendar = vec![reservation(vec![3], 0, HOUR, ReservationStatus::Confirmed)];
        assert!(is_free(&calendar, &[3], HOUR, 2 * HOUR));
    }

    #[test]
    fn cancelled_reservations_never_block() {
        let calendar = vec![reservation(vec![3], 0, 2 * HOUR, ReservationStatus::Cancelled)];
        assert!(is_free(&calendar, &[3], HOUR, 3 * HOUR));
    }

    #[test]
    fn combined_reservation_blocks_each_member() {
        let calendar = vec![reservation(vec![1, 2], 0, 2 * HOUR, ReservationStatus::Confirmed)];
        assert!(!is_free(&calendar, &[2], 0, HOUR));
        assert!(!is_free(&calendar, &[1], HOUR, 2 * HOUR));
    }
}
