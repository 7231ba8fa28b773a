//! Concurrency stress: racing `create_booking` calls must never produce two
//! confirmed reservations sharing a table over overlapping windows.

use chrono::NaiveDate;
use chrono_tz::Europe::Madrid;
use rand::Rng;
use tempfile::TempDir;

use reserva_server::booking::coordinator;
use reserva_server::booking::{EngineError, RejectReason};
use reserva_server::db::DbService;
use reserva_server::db::repository::dining_table;
use reserva_server::utils::time::{date_time_to_millis, parse_hhmm};
use shared::models::{BookingRequest, DiningTableCreate, Reservation};

const MIN: i64 = 60_000;

async fn setup_two_four_tops() -> (TempDir, DbService) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("race-test.db");
    let db = DbService::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("open db");
    for name in ["A", "B"] {
        dining_table::create(
            &db.pool,
            DiningTableCreate {
                name: name.into(),
                capacity: Some(4),
                pair_group: None,
            },
        )
        .await
        .expect("seed");
    }
    (dir, db)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

fn at(hhmm: &str) -> i64 {
    date_time_to_millis(date(), parse_hhmm(hhmm).expect("valid time"), Madrid)
}

fn request(start_time: i64, duration_minutes: i64, party_size: i32) -> BookingRequest {
    BookingRequest {
        date: date(),
        start_time,
        end_time: start_time + duration_minutes * MIN,
        party_size,
    }
}

/// The invariant the whole engine exists to protect
fn assert_no_double_booking(reservations: &[Reservation]) {
    let confirmed: Vec<&Reservation> = reservations.iter().filter(|r| r.blocks()).collect();
    for (i, a) in confirmed.iter().enumerate() {
        for b in confirmed.iter().skip(i + 1) {
            let share_table = a.table_ids.iter().any(|id| b.table_ids.contains(id));
            let overlap = a.start_time < b.end_time && b.start_time < a.end_time;
            assert!(
                !(share_table && overlap),
                "double booking: {:?} vs {:?}",
                a,
                b
            );
        }
    }
}

#[tokio::test]
async fn racing_requests_for_one_slot_never_both_win() {
    let (_dir, db) = setup_two_four_tops().await;
    let start = at("20:00");

    // 16 callers race for a slot only two tables can serve
    let mut handles = Vec::new();
    for _ in 0..16 {
        let pool = db.pool.clone();
        handles.push(tokio::spawn(async move {
            coordinator::create_booking(&pool, &request(start, 90, 4), &[]).await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.expect("task") {
            Ok(_) => wins += 1,
            Err(EngineError::Rejected(RejectReason::FullyBooked)) => {}
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }
    assert_eq!(wins, 2, "exactly one booking per table");

    let day = coordinator::list_day(&db.pool, date()).await.expect("list");
    assert_eq!(day.len(), 2);
    assert_no_double_booking(&day);
}

#[tokio::test]
async fn random_concurrent_load_preserves_the_calendar_invariant() {
    let (_dir, db) = setup_two_four_tops().await;
    let opening = at("19:00");

    let mut handles = Vec::new();
    for _ in 0..48 {
        let pool = db.pool.clone();
        let (slot, duration, party) = {
            let mut rng = rand::thread_rng();
            (
                rng.gen_range(0..8) * 30 * MIN,
                *[60, 90].get(rng.gen_range(0..2)).expect("duration"),
                rng.gen_range(1..=4),
            )
        };
        handles.push(tokio::spawn(async move {
            coordinator::create_booking(&pool, &request(opening + slot, duration, party), &[]).await
        }));
    }

    for handle in handles {
        match handle.await.expect("task") {
            Ok(_) | Err(EngineError::Rejected(_)) => {}
            Err(fault) => panic!("unexpected fault under load: {fault}"),
        }
    }

    let day = coordinator::list_day(&db.pool, date()).await.expect("list");
    assert!(!day.is_empty(), "some bookings should have landed");
    assert_no_double_booking(&day);
}
