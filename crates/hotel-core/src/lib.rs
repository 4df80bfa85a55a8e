//! hotel-core
//!
//! Pure reservation engine logic:
//! - room types and reservation lifecycle
//! - inventory store (rooms, reservations, links, guests, bills)
//! - overlap checker and allocation engine
//! - single-threaded `HotelEngine` command processor

pub mod ids;
pub mod room_type;
pub mod status;
pub mod stay;
pub mod model;
pub mod store;
pub mod overlap;
pub mod allocation;
pub mod billing;
pub mod report;
pub mod messages;
pub mod hotel_engine;
pub mod error;

pub use ids::{BillId, GuestId, LinkId, ReservationId, RoomId};
pub use room_type::RoomType;
pub use status::ReservationStatus;
pub use stay::StayRange;

pub use model::{Bill, Guest, NewGuest, NewReservation, Reservation, ReservationRoom, Room};
pub use store::InventoryStore;

pub use allocation::{AllocatedRoom, Allocation, AllocationRequest, RoomRequest};
pub use report::{OccupancyReport, TypeOccupancy};

pub use messages::{Command, Reply};

pub use hotel_engine::HotelEngine;
pub use error::{HotelError, HotelResult};
