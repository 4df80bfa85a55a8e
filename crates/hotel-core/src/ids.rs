//! Identifier newtypes for store records.
//!
//! All ids are allocated sequentially (starting at 1) by the
//! [`InventoryStore`](crate::store::InventoryStore), so ascending id
//! order is also creation order.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Physical room number.
    RoomId
);
record_id!(
    /// Reservation identifier.
    ReservationId
);
record_id!(
    /// Guest identifier.
    GuestId
);
record_id!(
    /// Identifier of a single reservation-room link.
    LinkId
);
record_id!(
    /// Bill identifier.
    BillId
);
