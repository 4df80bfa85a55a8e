//! Room categories (Single / Double / Deluxe / PentHouse).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HotelError;

/// Room category.
///
/// Each variant carries its display name, base nightly price and
/// maximum occupancy, so no external lookup table is needed. The
/// derived `Ord` follows declaration order, which is also the order
/// the allocation engine serves the types of a mixed request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Single,
    Double,
    Deluxe,
    PentHouse,
}

impl RoomType {
    /// Every room type, in declaration order.
    pub const ALL: [RoomType; 4] = [
        RoomType::Single,
        RoomType::Double,
        RoomType::Deluxe,
        RoomType::PentHouse,
    ];

    /// Human readable name, also the accepted wire spelling.
    pub fn display_name(self) -> &'static str {
        match self {
            RoomType::Single => "Single",
            RoomType::Double => "Double",
            RoomType::Deluxe => "Deluxe",
            RoomType::PentHouse => "PentHouse",
        }
    }

    /// Base nightly price in cents.
    pub fn base_price(self) -> u64 {
        match self {
            RoomType::Single => 10_000,
            RoomType::Double => 15_000,
            RoomType::Deluxe => 25_000,
            RoomType::PentHouse => 50_000,
        }
    }

    /// Maximum number of guests a room of this type can hold.
    pub fn max_occupancy(self) -> u32 {
        match self {
            RoomType::Single => 1,
            RoomType::Double => 2,
            RoomType::Deluxe => 3,
            RoomType::PentHouse => 6,
        }
    }

    /// Floor rooms of this type are provisioned on by default.
    pub fn default_floor(self) -> u16 {
        match self {
            RoomType::Single => 1,
            RoomType::Double => 2,
            RoomType::Deluxe => 3,
            RoomType::PentHouse => 4,
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        RoomType::ALL
            .into_iter()
            .find(|t| t.display_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for RoomType {
    type Err = HotelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::from_name(s)
            .ok_or_else(|| HotelError::validation(format!("unknown room type '{}'", s.trim())))
    }
}
