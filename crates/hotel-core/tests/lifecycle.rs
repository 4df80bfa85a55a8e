// crates/hotel-core/tests/lifecycle.rs
use chrono::NaiveDate;
use hotel_core::{
    Command, GuestId, HotelEngine, HotelError, InventoryStore, NewGuest, NewReservation, Reply,
    ReservationId, ReservationStatus, RoomId, RoomType, StayRange,
};

use ReservationStatus::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (HotelEngine, GuestId) {
    let mut store = InventoryStore::new();
    store.provision(RoomType::Single, 1);
    store.provision(RoomType::Double, 1);
    let mut engine = HotelEngine::new(store, 1_000);
    let guest = engine.register_guest(NewGuest {
        first_name: "Margaret".to_string(),
        last_name: "Hamilton".to_string(),
        email: "margaret@example.com".to_string(),
        phone: "555-0199".to_string(),
    });
    (engine, guest)
}

fn book(
    engine: &mut HotelEngine,
    guest_id: GuestId,
    status: ReservationStatus,
    from: NaiveDate,
    to: NaiveDate,
) -> ReservationId {
    let new = NewReservation {
        guest_id,
        check_in: from,
        check_out: to,
        party_size: 1,
        status,
    };
    engine.create_reservation(&new, RoomType::Single).unwrap()
}

fn status_of(engine: &HotelEngine, id: ReservationId) -> ReservationStatus {
    engine.store().reservation(id).unwrap().status
}

#[test]
fn transition_table_is_closed() {
    let all = [Pending, Confirmed, CheckedIn, CheckedOut, Cancelled];
    let allowed = [
        (Pending, Confirmed),
        (Pending, Cancelled),
        (Confirmed, CheckedIn),
        (Confirmed, Cancelled),
        (CheckedIn, CheckedOut),
    ];

    for from in all {
        for to in all {
            let expected = allowed.contains(&(from, to));
            assert_eq!(from.can_transition_to(to), expected, "{} -> {}", from, to);
            match from.transition(to) {
                Ok(next) => assert_eq!(next, to),
                Err(e) => assert_eq!(e, HotelError::InvalidTransition { from, to }),
            }
        }
    }

    assert!(CheckedOut.is_terminal() && Cancelled.is_terminal());
    assert!(!CheckedOut.is_active() && !Cancelled.is_active());
    assert!(Pending.is_active() && Confirmed.is_active() && CheckedIn.is_active());
}

#[test]
fn pending_cannot_skip_confirmation() {
    let (mut engine, g) = setup();
    let day = date(2024, 6, 1);
    let id = book(&mut engine, g, Pending, day, date(2024, 6, 3));

    assert_eq!(
        engine.check_in(id, day),
        Err(HotelError::InvalidTransition {
            from: Pending,
            to: CheckedIn,
        })
    );
    assert_eq!(status_of(&engine, id), Pending);

    assert_eq!(engine.confirm(id), Ok(Pending));
    assert_eq!(engine.check_in(id, day), Ok(Confirmed));
    assert_eq!(status_of(&engine, id), CheckedIn);
}

#[test]
fn check_out_releases_room_for_later_dates() {
    let (mut engine, g) = setup();
    let id = book(&mut engine, g, Confirmed, date(2024, 6, 1), date(2024, 6, 4));
    engine.check_in(id, date(2024, 6, 1)).unwrap();

    // Still held while checked in.
    let blocked = NewReservation {
        guest_id: g,
        check_in: date(2024, 6, 2),
        check_out: date(2024, 6, 5),
        party_size: 1,
        status: Confirmed,
    };
    assert!(matches!(
        engine.create_reservation(&blocked, RoomType::Single),
        Err(HotelError::InsufficientInventory { .. })
    ));

    engine.check_out(id).unwrap();
    assert_eq!(status_of(&engine, id), CheckedOut);

    let next = book(&mut engine, g, Confirmed, date(2024, 6, 4), date(2024, 6, 6));
    let rooms: Vec<_> = engine.store().reservation(next).unwrap().room_ids().collect();
    assert_eq!(rooms, vec![RoomId(1)]);
}

#[test]
fn early_check_in_is_rejected_without_state_change() {
    let (mut engine, g) = setup();
    let id = book(&mut engine, g, Confirmed, date(2024, 6, 10), date(2024, 6, 12));

    assert!(matches!(
        engine.check_in(id, date(2024, 6, 9)),
        Err(HotelError::Validation(_))
    ));
    assert_eq!(status_of(&engine, id), Confirmed);

    // Late arrival is fine.
    assert!(engine.check_in(id, date(2024, 6, 11)).is_ok());
}

#[test]
fn cancel_twice_only_succeeds_once() {
    let (mut engine, g) = setup();
    let id = book(&mut engine, g, Pending, date(2024, 6, 1), date(2024, 6, 2));

    assert_eq!(engine.cancel(id), Ok(Pending));
    assert_eq!(
        engine.cancel(id),
        Err(HotelError::InvalidTransition {
            from: Cancelled,
            to: Cancelled,
        })
    );
    assert_eq!(status_of(&engine, id), Cancelled);

    // Cancelled bookings free their rooms.
    book(&mut engine, g, Confirmed, date(2024, 6, 1), date(2024, 6, 2));
}

#[test]
fn check_out_twice_only_bills_once() {
    let (mut engine, g) = setup();
    let id = book(&mut engine, g, Confirmed, date(2024, 6, 1), date(2024, 6, 2));
    engine.check_in(id, date(2024, 6, 1)).unwrap();

    engine.check_out(id).unwrap();
    assert_eq!(
        engine.check_out(id),
        Err(HotelError::InvalidTransition {
            from: CheckedOut,
            to: CheckedOut,
        })
    );
    assert_eq!(engine.store().bills().count(), 1);
}

#[test]
fn checked_in_reservation_cannot_be_cancelled() {
    let (mut engine, g) = setup();
    let id = book(&mut engine, g, Confirmed, date(2024, 6, 1), date(2024, 6, 2));
    engine.check_in(id, date(2024, 6, 1)).unwrap();

    assert_eq!(
        engine.cancel(id),
        Err(HotelError::InvalidTransition {
            from: CheckedIn,
            to: Cancelled,
        })
    );
    assert_eq!(status_of(&engine, id), CheckedIn);
}

#[test]
fn unknown_reservation_is_not_found() {
    let (mut engine, _) = setup();
    assert_eq!(
        engine.confirm(ReservationId(42)),
        Err(HotelError::NotFound {
            entity: "reservation",
            id: 42,
        })
    );
}

#[test]
fn commands_report_status_changes() {
    let (mut engine, g) = setup();
    let id = book(&mut engine, g, Pending, date(2024, 6, 1), date(2024, 6, 2));

    let reply = engine.process_command(Command::Confirm(id)).unwrap();
    assert_eq!(
        reply,
        Reply::StatusChanged {
            reservation_id: id,
            from: Pending,
            to: Confirmed,
        }
    );

    let reply = engine
        .process_command(Command::CheckIn {
            reservation_id: id,
            today: date(2024, 6, 1),
        })
        .unwrap();
    assert!(matches!(reply, Reply::StatusChanged { to: CheckedIn, .. }));

    match engine.process_command(Command::CheckOut(id)).unwrap() {
        Reply::CheckedOut { reservation_id, bill } => {
            assert_eq!(reservation_id, id);
            assert_eq!(bill.reservation_id, id);
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[test]
fn modify_stay_moves_dates_when_rooms_are_free() {
    let (mut engine, g) = setup();
    let id = book(&mut engine, g, Confirmed, date(2024, 6, 1), date(2024, 6, 3));
    let other = book(&mut engine, g, Confirmed, date(2024, 6, 10), date(2024, 6, 12));

    // Overlapping its own dates is fine.
    let shifted = StayRange::new(date(2024, 6, 2), date(2024, 6, 5)).unwrap();
    engine.modify_stay(id, shifted).unwrap();
    assert_eq!(engine.store().reservation(id).unwrap().stay, shifted);

    // Colliding with the other booking is not.
    let clash = StayRange::new(date(2024, 6, 9), date(2024, 6, 11)).unwrap();
    assert!(matches!(
        engine.modify_stay(id, clash),
        Err(HotelError::InsufficientInventory {
            room_type: RoomType::Single,
            ..
        })
    ));
    assert_eq!(engine.store().reservation(id).unwrap().stay, shifted);

    engine.check_in(other, date(2024, 6, 10)).unwrap();
    let later = StayRange::new(date(2024, 7, 1), date(2024, 7, 2)).unwrap();
    assert!(matches!(
        engine.modify_stay(other, later),
        Err(HotelError::Validation(_))
    ));
}
