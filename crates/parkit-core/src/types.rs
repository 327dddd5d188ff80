//! # Domain Types
//!
//! Core domain types used throughout Park'it.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌───────────────┐    │
//! │  │  ParkingSpot    │   │       Ticket         │   │  VehicleType  │    │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ───────────  │    │
//! │  │  number (key)   │◄──│  spot (snapshot)     │   │  Car          │    │
//! │  │  vehicle_type   │   │  vehicle_reg_number  │   │  Bike         │    │
//! │  │  available      │   │  price               │   └───────────────┘    │
//! │  └─────────────────┘   │  in_time / out_time  │                        │
//! │                        └──────────────────────┘                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A ticket owns a copy of the spot it was issued for. Releasing or
//! re-allocating the live spot never changes a ticket already issued.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::money::Price;

/// Ledger-assigned ticket identity.
pub type TicketId = i64;

// =============================================================================
// Vehicle Type
// =============================================================================

/// The kind of vehicle a spot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleType {
    Car,
    Bike,
}

impl VehicleType {
    /// All known vehicle types, in menu order.
    pub const ALL: [VehicleType; 2] = [VehicleType::Car, VehicleType::Bike];

    /// Storage code ("CAR" / "BIKE").
    pub const fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "CAR",
            VehicleType::Bike => "BIKE",
        }
    }

    /// Maps a menu selection (1 = CAR, 2 = BIKE) to a vehicle type.
    pub fn from_selection(selection: u32) -> CoreResult<Self> {
        match selection {
            1 => Ok(VehicleType::Car),
            2 => Ok(VehicleType::Bike),
            other => Err(CoreError::InvalidSelection {
                input: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CAR" => Ok(VehicleType::Car),
            "BIKE" => Ok(VehicleType::Bike),
            _ => Err(CoreError::UnknownVehicleType(s.to_string())),
        }
    }
}

// =============================================================================
// Parking Spot
// =============================================================================

/// A numbered parking location typed for one vehicle type.
///
/// Identity is the spot number alone: two values with the same number are
/// the same spot regardless of availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSpot {
    number: u32,
    vehicle_type: VehicleType,
    available: bool,
}

impl ParkingSpot {
    pub fn new(number: u32, vehicle_type: VehicleType, available: bool) -> Self {
        ParkingSpot {
            number,
            vehicle_type,
            available,
        }
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn vehicle_type(&self) -> VehicleType {
        self.vehicle_type
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

impl PartialEq for ParkingSpot {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for ParkingSpot {}

impl Hash for ParkingSpot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.number.hash(state);
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// One parking session.
///
/// ## Lifecycle
/// ```text
/// Ticket::open()        id: None,    out_time: None, price: 0
///      │ ledger.save()
///      ▼
/// assign_id()           id: Some(n), out_time: None, price: 0
///      │ exit workflow
///      ▼
/// close(out, price)     id: Some(n), out_time: Some, price: fare
///      │ ledger.update()
///      ▼
/// closed ticket (counts towards recurrence)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    id: Option<TicketId>,
    spot: ParkingSpot,
    vehicle_reg_number: String,
    price: Price,
    in_time: DateTime<Utc>,
    out_time: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Builds a new open ticket for a vehicle entering now.
    pub fn open(
        spot: ParkingSpot,
        vehicle_reg_number: impl Into<String>,
        in_time: DateTime<Utc>,
    ) -> Self {
        Ticket {
            id: None,
            spot,
            vehicle_reg_number: vehicle_reg_number.into(),
            price: Price::zero(),
            in_time,
            out_time: None,
        }
    }

    /// Rebuilds a ticket loaded from storage.
    ///
    /// ## Returns
    /// * `Err(CoreError::InvalidStay)` - stored out-time precedes in-time
    pub fn restore(
        id: TicketId,
        spot: ParkingSpot,
        vehicle_reg_number: impl Into<String>,
        price: Price,
        in_time: DateTime<Utc>,
        out_time: Option<DateTime<Utc>>,
    ) -> CoreResult<Self> {
        if let Some(out) = out_time {
            if out < in_time {
                return Err(CoreError::invalid_stay(format!(
                    "ticket {} has out-time {} before in-time {}",
                    id, out, in_time
                )));
            }
        }

        Ok(Ticket {
            id: Some(id),
            spot,
            vehicle_reg_number: vehicle_reg_number.into(),
            price,
            in_time,
            out_time,
        })
    }

    #[inline]
    pub fn id(&self) -> Option<TicketId> {
        self.id
    }

    /// Records the identity the ledger assigned on save.
    pub fn assign_id(&mut self, id: TicketId) {
        self.id = Some(id);
    }

    #[inline]
    pub fn spot(&self) -> &ParkingSpot {
        &self.spot
    }

    #[inline]
    pub fn vehicle_reg_number(&self) -> &str {
        &self.vehicle_reg_number
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn in_time(&self) -> DateTime<Utc> {
        self.in_time
    }

    #[inline]
    pub fn out_time(&self) -> Option<DateTime<Utc>> {
        self.out_time
    }

    /// True while the vehicle is still parked.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.out_time.is_none()
    }

    /// Stamps the exit and the fare charged.
    ///
    /// Leaves the ticket untouched when `out_time` precedes the in-time.
    pub fn close(&mut self, out_time: DateTime<Utc>, price: Price) -> CoreResult<()> {
        if out_time < self.in_time {
            return Err(CoreError::invalid_stay(format!(
                "out-time {} is before in-time {}",
                out_time, self.in_time
            )));
        }

        self.out_time = Some(out_time);
        self.price = price;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
