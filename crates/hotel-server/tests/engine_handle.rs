// crates/hotel-server/tests/engine_handle.rs
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use hotel_core::{
    Command, HotelEngine, HotelError, InventoryStore, NewGuest, NewReservation, Reply,
    ReservationStatus, RoomType,
};
use hotel_server::config::InventoryEntry;
use hotel_server::engine_task::run_engine_loop;
use hotel_server::snapshot::SnapshotFile;
use hotel_server::{load_engine, spawn_engine, Config, EngineHandle};
use tokio::sync::mpsc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn guest() -> NewGuest {
    NewGuest {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "555-0100".to_string(),
    }
}

fn engine_with(room_type: RoomType, count: u32) -> HotelEngine {
    let mut store = InventoryStore::new();
    store.provision(room_type, count);
    HotelEngine::new(store, 1_000)
}

fn temp_snapshot(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "hotel-server-{}-{}.json",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_never_share_a_room() {
    let config = Config::default();
    let (handle, _task) = spawn_engine(engine_with(RoomType::Single, 5), None, &config);
    let guest_id = handle.register_guest(guest()).await.unwrap();

    let new = NewReservation {
        guest_id,
        check_in: date(2024, 6, 1),
        check_out: date(2024, 6, 5),
        party_size: 1,
        status: ReservationStatus::Confirmed,
    };

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let handle = handle.clone();
        let new = new.clone();
        tasks.push(tokio::spawn(async move {
            handle.create_reservation(&new, RoomType::Single).await
        }));
    }

    let mut booked = Vec::new();
    let mut short = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(id) => booked.push(id),
            Err(HotelError::InsufficientInventory { .. }) => short += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(booked.len(), 5);
    assert_eq!(short, 15);

    let mut rooms = BTreeSet::new();
    for id in booked {
        let reservation = handle.reservation(id).await.unwrap();
        for room in reservation.room_ids() {
            assert!(rooms.insert(room), "room {} booked twice", room);
        }
    }
    assert_eq!(rooms.len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn last_room_has_exactly_one_winner() {
    let config = Config::default();
    let (handle, _task) = spawn_engine(engine_with(RoomType::Double, 1), None, &config);
    let guest_id = handle.register_guest(guest()).await.unwrap();

    let new = NewReservation {
        guest_id,
        check_in: date(2024, 7, 1),
        check_out: date(2024, 7, 3),
        party_size: 2,
        status: ReservationStatus::Pending,
    };

    let (a, b) = tokio::join!(
        handle.create_reservation(&new, RoomType::Double),
        handle.create_reservation(&new, RoomType::Double),
    );
    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results.iter().filter(|r| matches!(r, Err(HotelError::InsufficientInventory { .. }))).count(),
        1
    );
}

#[tokio::test]
async fn kiosk_flow_through_the_handle() {
    let config = Config::default();
    let (handle, _task) = spawn_engine(engine_with(RoomType::Double, 2), None, &config);
    let guest_id = handle.register_guest(guest()).await.unwrap();

    let new = NewReservation {
        guest_id,
        check_in: date(2024, 6, 1),
        check_out: date(2024, 6, 3),
        party_size: 3,
        status: ReservationStatus::Pending,
    };
    let mut rooms = std::collections::BTreeMap::new();
    rooms.insert(RoomType::Double, 2);
    let id = handle.create_reservation_with_rooms(&new, rooms).await.unwrap();

    assert_eq!(handle.confirm(id).await, Ok(ReservationStatus::Confirmed));
    assert_eq!(
        handle.check_in(id, date(2024, 6, 1)).await,
        Ok(ReservationStatus::CheckedIn)
    );
    let bill = handle.check_out(id).await.unwrap();
    assert_eq!(bill.subtotal, 2 * 2 * 15_000);
    assert_eq!(
        handle.cancel(id).await,
        Err(HotelError::InvalidTransition {
            from: ReservationStatus::CheckedOut,
            to: ReservationStatus::Cancelled,
        })
    );

    let report = handle.report(date(2024, 6, 1)).await.unwrap();
    assert_eq!(report.total_occupied(), 0);
    assert_eq!(report.billed_outstanding, bill.amount);
}

#[tokio::test]
async fn oversized_booking_leaves_the_engine_running() {
    let mut store = InventoryStore::new();
    store.provision(RoomType::Single, 1);
    store.provision(RoomType::PentHouse, 1);
    let config = Config::default();
    let (handle, _task) = spawn_engine(HotelEngine::new(store, 1_000), None, &config);
    let guest_id = handle.register_guest(guest()).await.unwrap();

    let new = NewReservation {
        guest_id,
        check_in: date(2024, 6, 1),
        check_out: date(2024, 6, 2),
        party_size: 1,
        status: ReservationStatus::Confirmed,
    };
    let mut rooms = std::collections::BTreeMap::new();
    rooms.insert(RoomType::PentHouse, 1_000_000_000);
    assert!(matches!(
        handle.create_reservation_with_rooms(&new, rooms).await,
        Err(HotelError::Validation(_))
    ));

    assert!(handle.create_reservation(&new, RoomType::Single).await.is_ok());
}

async fn reservation_count(handle: &EngineHandle) -> usize {
    match handle
        .execute(Command::ListReservations { guest_id: None })
        .await
        .unwrap()
    {
        Reply::Reservations(list) => list.len(),
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test]
async fn timed_out_bookings_are_not_committed() {
    let path = temp_snapshot("timeout");
    let snapshot = SnapshotFile::new(&path);
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run_engine_loop(
        engine_with(RoomType::Single, 10),
        rx,
        Some(SnapshotFile::new(&path)),
    ));
    let patient = EngineHandle::new(tx.clone(), Duration::from_secs(5));
    let hasty = EngineHandle::new(tx, Duration::ZERO);

    let guest_id = patient.register_guest(guest()).await.unwrap();
    let new = NewReservation {
        guest_id,
        check_in: date(2024, 6, 1),
        check_out: date(2024, 6, 2),
        party_size: 1,
        status: ReservationStatus::Confirmed,
    };

    // Each attempt either answers or leaves nothing behind.
    let mut answered = 0;
    for _ in 0..5 {
        match hasty.create_reservation(&new, RoomType::Single).await {
            Ok(_) => answered += 1,
            Err(e) => assert!(e.is_retryable(), "unexpected error: {}", e),
        }
    }
    assert_eq!(reservation_count(&patient).await, answered);

    patient.create_reservation(&new, RoomType::Single).await.unwrap();
    assert_eq!(reservation_count(&patient).await, answered + 1);

    drop(patient);
    drop(hasty);
    task.await.unwrap();

    let saved = snapshot.load().await.unwrap().unwrap();
    assert_eq!(saved.reservations().count(), answered + 1);
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn silent_engine_times_out_as_unavailable() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let handle = EngineHandle::new(tx, Duration::from_millis(50));

    let err = handle.register_guest(guest()).await.unwrap_err();
    assert!(matches!(err, HotelError::StoreUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn stopped_engine_is_unavailable() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    let handle = EngineHandle::new(tx, Duration::from_millis(50));

    assert!(matches!(
        handle.report(date(2024, 6, 1)).await,
        Err(HotelError::StoreUnavailable(_))
    ));
}

#[tokio::test]
async fn snapshot_survives_restart() {
    let path = temp_snapshot("restart");
    let config = Config {
        data_file: Some(path.clone()),
        inventory: vec![InventoryEntry {
            room_type: RoomType::Deluxe,
            count: 1,
        }],
        ..Config::default()
    };

    let engine = load_engine(&config).await.unwrap();
    assert_eq!(engine.store().rooms().count(), 1);
    let (handle, task) = spawn_engine(engine, Some(SnapshotFile::new(&path)), &config);

    let guest_id = handle.register_guest(guest()).await.unwrap();
    let new = NewReservation {
        guest_id,
        check_in: date(2024, 6, 1),
        check_out: date(2024, 6, 2),
        party_size: 3,
        status: ReservationStatus::Confirmed,
    };
    let id = handle.create_reservation(&new, RoomType::Deluxe).await.unwrap();

    drop(handle);
    task.await.unwrap();

    let restored = load_engine(&config).await.unwrap();
    let reservation = restored.store().reservation(id).unwrap();
    assert_eq!(reservation.status, ReservationStatus::Confirmed);
    assert_eq!(restored.store().guest(guest_id).unwrap().first_name, "Ada");

    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn corrupt_snapshot_is_an_error() {
    let path = temp_snapshot("corrupt");
    std::fs::write(&path, b"not json").unwrap();
    let config = Config {
        data_file: Some(path.clone()),
        ..Config::default()
    };

    assert!(load_engine(&config).await.is_err());
    std::fs::remove_file(&path).ok();
}

#[test]
fn config_from_toml_fills_defaults() {
    let config = Config::from_toml_str(
        r#"
        port = 7000
        max_clients = 2

        [[admins]]
        username = "night"
        password = "shift"

        [[inventory]]
        room_type = "PentHouse"
        count = 3
        "#,
    )
    .unwrap();

    assert_eq!(config.port, 7000);
    assert_eq!(config.max_clients, 2);
    assert_eq!(config.max_queued, Config::default().max_queued);
    assert!(config.authenticate("night", "shift"));
    assert!(!config.authenticate("admin", "admin"));
    assert_eq!(config.inventory.len(), 1);
    assert_eq!(config.store_timeout(), Duration::from_millis(2_000));
    assert!(!format!("{:?}", config).contains("shift"));
}
