//! Table Matcher
//!
//! Picks the best free single table, then the best free pair group, in the
//! documented priority order: standalone tables first (minimal
//! fragmentation), smallest sufficient capacity wins, lowest id breaks ties.
//! Paired tables are only ever offered as a whole group.

use shared::models::Reservation;

use super::catalog::Catalog;
use super::conflict;

/// Chosen table set for one booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// 1 element for a single table, 2 (ascending) for a combined booking
    pub table_ids: Vec<i64>,
    pub total_capacity: i32,
}

/// Why no assignment exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
    /// No candidate can seat the party regardless of time
    InsufficientCapacity,
    /// Candidates exist but every one is time-conflicted
    FullyBooked,
}

/// Find the best assignment for `party_size` over `[start, end)`.
///
/// `reservations` is the caller's snapshot of confirmed bookings overlapping
/// the window (or a superset of it, e.g. a whole day).
pub fn find_assignment(
    catalog: &Catalog,
    reservations: &[Reservation],
    start: i64,
    end: i64,
    party_size: i32,
) -> Result<Assignment, NoMatch> {
    let mut capacity_exists = false;

    // 1. Smallest sufficient standalone table
    let mut best_single: Option<(i32, i64)> = None;
    for table in catalog.standalone() {
        if table.capacity < party_size {
            continue;
        }
        capacity_exists = true;
        if !conflict::is_free(reservations, &[table.id], start, end) {
            continue;
        }
        let key = (table.capacity, table.id);
        if best_single.is_none_or(|best| key < best) {
            best_single = Some(key);
        }
    }
    if let Some((capacity, id)) = best_single {
        return Ok(Assignment {
            table_ids: vec![id],
            total_capacity: capacity,
        });
    }

    // 2. Smallest sufficient pair group, both members free
    let mut best_pair: Option<(i32, i64, [i64; 2])> = None;
    for pair in catalog.usable_pairs() {
        let total = pair.total_capacity();
        if total < party_size {
            continue;
        }
        capacity_exists = true;
        let ids = pair.table_ids();
        if !conflict::is_free(reservations, &ids, start, end) {
            continue;
        }
        let key = (total, pair.min_id(), ids);
        if best_pair.is_none_or(|(c, id, _)| (key.0, key.1) < (c, id)) {
            best_pair = Some(key);
        }
    }
    if let Some((total, _, ids)) = best_pair {
        return Ok(Assignment {
            table_ids: ids.to_vec(),
            total_capacity: total,
        });
    }

    // 3. Nothing fits
    Err(if capacity_exists {
        NoMatch::FullyBooked
    } else {
        NoMatch::InsufficientCapacity
    })
}
