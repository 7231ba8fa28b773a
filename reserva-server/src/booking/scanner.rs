//! Slot Scanner
//!
//! Enumerates candidate start instants inside the configured service
//! windows and asks the matcher whether each one is bookable. Works
//! entirely on one in-memory snapshot: the caller loads the catalog and the
//! day's confirmed reservations once, and no further queries happen per
//! candidate slot.

use shared::models::Reservation;

use super::catalog::Catalog;
use super::matcher;

/// Scan the given service windows (absolute millis, half-open).
///
/// A slot is offered only when a full booking of `duration_ms` still fits
/// inside its window. Deterministic for fixed inputs; read-only.
/// Non-positive step or duration yields no slots: the loop must always
/// advance.
pub fn scan_windows(
    catalog: &Catalog,
    reservations: &[Reservation],
    windows: &[(i64, i64)],
    granularity_ms: i64,
    duration_ms: i64,
    party_size: i32,
) -> Vec<(i64, bool)> {
    if granularity_ms <= 0 || duration_ms <= 0 {
        return Vec::new();
    }

    let mut slots = Vec::new();
    for &(window_start, window_end) in windows {
        let mut t = window_start;
        while t + duration_ms <= window_end {
            let bookable =
                matcher::find_assignment(catalog, reservations, t, t + duration_ms, party_size)
                    .is_ok();
            slots.push((t, bookable));
            t += granularity_ms;
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::{DiningTable, ReservationStatus};

    const MIN: i64 = 60_000;
    const HOUR: i64 = 60 * MIN;

    fn catalog() -> Catalog {
        Catalog::from_tables(vec![
            DiningTable {
                id: 1,
                name: "T1".into(),
                capacity: 2,
                pair_group: None,
                is_active: true,
            },
            DiningTable {
                id: 2,
                name: "T2".into(),
                capacity: 4,
                pair_group: None,
                is_active: true,
            },
        ])
        .unwrap()
    }

    fn booked(table_ids: Vec<i64>, start: i64, end: i64) -> Reservation {
        Reservation {
            id: 7,
            table_ids,
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: start,
            end_time: end,
            party_size: 2,
            status: ReservationStatus::Confirmed,
            created_at: 0,
        }
    }

    #[test]
    fn empty_day_is_fully_bookable() {
        // dinner window 20:00-23:00, 30 min steps, 90 min bookings
        let windows = [(20 * HOUR, 23 * HOUR)];
        let slots = scan_windows(&catalog(), &[], &windows, 30 * MIN, 90 * MIN, 4);
        // last offered start is 21:30 (21:30 + 1:30 = 23:00)
        assert_eq!(slots.len(), 4);
        assert!(slots.iter().all(|&(_, bookable)| bookable));
        assert_eq!(slots.last().unwrap().0, 21 * HOUR + 30 * MIN);
    }

    #[test]
    fn slot_that_would_overrun_the_window_is_not_offered() {
        let windows = [(20 * HOUR, 21 * HOUR)];
        let slots = scan_windows(&catalog(), &[], &windows, 30 * MIN, 90 * MIN, 2);
        assert!(slots.is_empty());
    }

    #[test]
    fn booked_span_turns_slots_unbookable() {
        let windows = [(20 * HOUR, 23 * HOUR)];
        // the only 4-top is taken 20:00-22:00
        let calendar = vec![booked(vec![2], 20 * HOUR, 22 * HOUR)];
        let slots = scan_windows(&catalog(), &calendar, &windows, 30 * MIN, 90 * MIN, 4);
        let by_time: Vec<bool> = slots.iter().map(|&(_, b)| b).collect();
        // 20:00, 20:30, 21:00, 21:30 -> blocked until the booking ends;
        // 21:30 still collides (21:30 < 22:00)
        assert_eq!(by_time, vec![false, false, false, false]);
    }

    #[test]
    fn party_that_fits_smaller_table_scans_around_conflicts() {
        let windows = [(20 * HOUR, 23 * HOUR)];
        let calendar = vec![booked(vec![2], 20 * HOUR, 22 * HOUR)];
        let slots = scan_windows(&catalog(), &calendar, &windows, 30 * MIN, 90 * MIN, 2);
        // party of 2 fits T1 the whole evening
        assert!(slots.iter().all(|&(_, bookable)| bookable));
    }

    #[test]
    fn non_positive_step_or_duration_yields_no_slots() {
        let windows = [(20 * HOUR, 23 * HOUR)];
        assert!(scan_windows(&catalog(), &[], &windows, 0, 90 * MIN, 2).is_empty());
        assert!(scan_windows(&catalog(), &[], &windows, -30 * MIN, 90 * MIN, 2).is_empty());
        assert!(scan_windows(&catalog(), &[], &windows, 30 * MIN, 0, 2).is_empty());
    }

    #[test]
    fn multiple_windows_are_scanned_in_order() {
        let windows = [(13 * HOUR, 15 * HOUR), (20 * HOUR, 22 * HOUR)];
        let slots = scan_windows(&catalog(), &[], &windows, 60 * MIN, 60 * MIN, 2);
        let times: Vec<i64> = slots.iter().map(|&(t, _)| t).collect();
        assert_eq!(times, vec![13 * HOUR, 14 * HOUR, 20 * HOUR, 21 * HOUR]);
    }
}
