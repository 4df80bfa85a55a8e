//! Overlap checker.
//!
//! A room is free for a stay iff no *active* reservation (Pending,
//! Confirmed or CheckedIn) links that room for an overlapping stay.
//! Terminal reservations keep their links for history but no longer
//! block anything.
//!
//! These functions only read the store. They are safe against
//! concurrent bookings because the store has a single writer and each
//! allocation runs check-then-commit inside one `&mut` borrow.

use std::collections::BTreeMap;

use crate::ids::{ReservationId, RoomId};
use crate::room_type::RoomType;
use crate::store::InventoryStore;
use crate::stay::StayRange;

/// Returns `true` if `room_id` is not held by any active reservation
/// overlapping `stay`.
///
/// `exclude` ignores one reservation, for re-checking an existing
/// booking against new dates.
pub fn is_room_free(
    store: &InventoryStore,
    room_id: RoomId,
    stay: &StayRange,
    exclude: Option<ReservationId>,
) -> bool {
    !store
        .reservations()
        .filter(|r| Some(r.id) != exclude)
        .any(|r| r.holds(room_id, stay))
}

/// Rooms of `room_type` that are structurally available and free for
/// `stay`, in ascending id order.
pub fn free_rooms(store: &InventoryStore, room_type: RoomType, stay: &StayRange) -> Vec<RoomId> {
    store
        .rooms_of_type(room_type)
        .filter(|room| room.structurally_available)
        .filter(|room| is_room_free(store, room.id, stay, None))
        .map(|room| room.id)
        .collect()
}

/// Number of free rooms per type for `stay`.
pub fn availability(store: &InventoryStore, stay: &StayRange) -> BTreeMap<RoomType, usize> {
    RoomType::ALL
        .into_iter()
        .map(|t| (t, free_rooms(store, t, stay).len()))
        .collect()
}
