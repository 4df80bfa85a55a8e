//! Bill arithmetic.
//!
//! Amounts are integer cents; the tax rate is in basis points
//! (`1000` = 10 %).

use crate::model::Reservation;

/// Subtotal and tax for a reservation, before any discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillAmounts {
    pub subtotal: u64,
    pub tax: u64,
}

/// Room subtotal (captured nightly prices × nights) and tax.
pub fn compute(reservation: &Reservation, tax_rate_bp: u32) -> BillAmounts {
    let subtotal = reservation
        .nightly_total()
        .saturating_mul(u64::from(reservation.stay.nights()));
    BillAmounts {
        subtotal,
        tax: tax_on(subtotal, tax_rate_bp),
    }
}

pub fn tax_on(subtotal: u64, tax_rate_bp: u32) -> u64 {
    subtotal.saturating_mul(u64::from(tax_rate_bp)) / 10_000
}

/// `subtotal + tax - discount`, never below zero.
pub fn amount_due(subtotal: u64, tax: u64, discount: u64) -> u64 {
    subtotal.saturating_add(tax).saturating_sub(discount)
}
