//! Occupancy report for a single night.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::HotelResult;
use crate::overlap::is_room_free;
use crate::room_type::RoomType;
use crate::status::ReservationStatus;
use crate::stay::StayRange;
use crate::store::InventoryStore;

/// Room counts for one type on the report night.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeOccupancy {
    pub room_type: RoomType,
    pub total: usize,
    pub occupied: usize,
    pub out_of_service: usize,
    pub free: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyReport {
    pub date: NaiveDate,
    pub by_type: Vec<TypeOccupancy>,
    pub reservations_by_status: BTreeMap<ReservationStatus, usize>,

    /// Sum of bill amounts already paid.
    pub billed_paid: u64,
    /// Sum of bill amounts still open.
    pub billed_outstanding: u64,
}

impl OccupancyReport {
    pub fn total_occupied(&self) -> usize {
        self.by_type.iter().map(|t| t.occupied).sum()
    }
}

/// Build the report for the night of `date`.
pub fn occupancy_report(store: &InventoryStore, date: NaiveDate) -> HotelResult<OccupancyReport> {
    let night = StayRange::night_of(date)?;

    let by_type = RoomType::ALL
        .into_iter()
        .map(|room_type| {
            let mut row = TypeOccupancy {
                room_type,
                total: 0,
                occupied: 0,
                out_of_service: 0,
                free: 0,
            };
            for room in store.rooms_of_type(room_type) {
                row.total += 1;
                if !is_room_free(store, room.id, &night, None) {
                    row.occupied += 1;
                } else if !room.structurally_available {
                    row.out_of_service += 1;
                } else {
                    row.free += 1;
                }
            }
            row
        })
        .collect();

    let mut reservations_by_status = BTreeMap::new();
    for reservation in store.reservations() {
        *reservations_by_status.entry(reservation.status).or_insert(0) += 1;
    }

    let (paid, open): (Vec<_>, Vec<_>) = store.bills().partition(|b| b.paid);

    Ok(OccupancyReport {
        date,
        by_type,
        reservations_by_status,
        billed_paid: paid.iter().map(|b| b.amount).sum(),
        billed_outstanding: open.iter().map(|b| b.amount).sum(),
    })
}
