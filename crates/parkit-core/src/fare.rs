//! # Fare Calculator
//!
//! Pure, deterministic price computation for a parking stay.
//!
//! ## Pricing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Fare Computation                                │
//! │                                                                         │
//! │  hours = exact(out_time - in_time) / 1h      (prorated, never rounded) │
//! │       │                                                                 │
//! │       ├── hours < 0.5 ?  ──► 0              (free tier, any vehicle)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price = hours × rate(type) × (1 - discount)                           │
//! │                                                                         │
//! │  rate(CAR)  = 1.5 / hour                                               │
//! │  rate(BIKE) = 1.0 / hour                                               │
//! │  discount   = 0.05 for recurring users, 0 otherwise                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator knows nothing about recurrence; callers pass the
//! discount rate in.
//!
//! ## Example
//! ```rust
//! use chrono::{Duration, Utc};
//! use parkit_core::fare::compute_fare;
//! use parkit_core::VehicleType;
//!
//! let in_time = Utc::now();
//! let out_time = in_time + Duration::minutes(45);
//! let fare = compute_fare(in_time, Some(out_time), VehicleType::Bike, 0.0).unwrap();
//! assert!((fare.amount() - 0.75).abs() < 1e-9);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Price;
use crate::types::VehicleType;
use crate::validation::is_valid_discount_rate;

/// Hourly rate for cars.
pub const CAR_RATE_PER_HOUR: f64 = 1.5;

/// Hourly rate for bikes.
pub const BIKE_RATE_PER_HOUR: f64 = 1.0;

/// Discount rate granted to recurring users.
pub const RECURRING_DISCOUNT: f64 = 0.05;

/// Stays shorter than this are free.
pub const FREE_PARKING_MINUTES: u32 = 30;

/// A vehicle is recurring once it has more than one closed ticket.
pub const RECURRING_MIN_CLOSED_TICKETS: u64 = 2;

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

// =============================================================================
// Fare Schedule
// =============================================================================

/// Tariff parameters used by the calculator.
///
/// `Default` yields the standard tariff. The shell may override values
/// from its configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FareSchedule {
    pub car_rate_per_hour: f64,
    pub bike_rate_per_hour: f64,
    pub recurring_discount: f64,
    pub free_minutes: u32,
    pub recurring_min_closed_tickets: u64,
}

impl Default for FareSchedule {
    fn default() -> Self {
        FareSchedule {
            car_rate_per_hour: CAR_RATE_PER_HOUR,
            bike_rate_per_hour: BIKE_RATE_PER_HOUR,
            recurring_discount: RECURRING_DISCOUNT,
            free_minutes: FREE_PARKING_MINUTES,
            recurring_min_closed_tickets: RECURRING_MIN_CLOSED_TICKETS,
        }
    }
}

impl FareSchedule {
    /// Hourly rate for a vehicle type.
    #[inline]
    pub fn rate_per_hour(&self, vehicle_type: VehicleType) -> f64 {
        match vehicle_type {
            VehicleType::Car => self.car_rate_per_hour,
            VehicleType::Bike => self.bike_rate_per_hour,
        }
    }

    /// Discount rate for a user, given recurrence.
    #[inline]
    pub fn discount_for(&self, recurring: bool) -> f64 {
        if recurring {
            self.recurring_discount
        } else {
            0.0
        }
    }

    /// Applies the recurrence rule to a closed-ticket count.
    #[inline]
    pub fn is_recurring(&self, closed_tickets: u64) -> bool {
        closed_tickets >= self.recurring_min_closed_tickets
    }

    /// Checks rates are finite and non-negative, the discount lies in `[0, 1]`
    /// and the recurrence threshold is at least one closed ticket.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, rate) in [
            ("car", self.car_rate_per_hour),
            ("bike", self.bike_rate_per_hour),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(CoreError::Validation(
                    crate::error::ValidationError::InvalidFormat {
                        field: format!("{} rate per hour", name),
                        reason: format!("{} is not a non-negative amount", rate),
                    },
                ));
            }
        }

        if !is_valid_discount_rate(self.recurring_discount) {
            return Err(CoreError::InvalidDiscount(self.recurring_discount));
        }

        // Zero would make every vehicle recurring, first visit included.
        if self.recurring_min_closed_tickets == 0 {
            return Err(CoreError::Validation(
                crate::error::ValidationError::OutOfRange {
                    field: "recurring min closed tickets".to_string(),
                    min: 1,
                    max: i64::MAX,
                },
            ));
        }

        Ok(())
    }

    /// Computes the fare for a stay.
    ///
    /// ## Arguments
    /// * `in_time` - Entry timestamp
    /// * `out_time` - Exit timestamp; `None` means the vehicle is still parked
    /// * `vehicle_type` - Type of the spot the ticket was issued for
    /// * `discount_rate` - Fraction taken off the fare, `0.0..=1.0`
    ///
    /// ## Returns
    /// * `Ok(Price)` - Fare, zero inside the free tier
    /// * `Err(CoreError::InvalidStay)` - missing out-time or out before in
    /// * `Err(CoreError::InvalidDiscount)` - discount outside `[0, 1]`
    pub fn compute(
        &self,
        in_time: DateTime<Utc>,
        out_time: Option<DateTime<Utc>>,
        vehicle_type: VehicleType,
        discount_rate: f64,
    ) -> CoreResult<Price> {
        let out_time = out_time.ok_or_else(|| CoreError::invalid_stay("out-time is missing"))?;

        if out_time < in_time {
            return Err(CoreError::invalid_stay(format!(
                "out-time {} is before in-time {}",
                out_time, in_time
            )));
        }

        if !is_valid_discount_rate(discount_rate) {
            return Err(CoreError::InvalidDiscount(discount_rate));
        }

        let hours = stay_hours(in_time, out_time);
        if hours < self.free_hours() {
            return Ok(Price::zero());
        }

        let fare = hours * self.rate_per_hour(vehicle_type) * (1.0 - discount_rate);
        Ok(Price::new(fare))
    }

    fn free_hours(&self) -> f64 {
        f64::from(self.free_minutes) / 60.0
    }
}

// =============================================================================
// Free Functions
// =============================================================================

/// Computes a fare with the standard tariff.
///
/// Unrecognised vehicle type codes never reach this function: they fail
/// with [`CoreError::UnknownVehicleType`] when parsed into [`VehicleType`].
pub fn compute_fare(
    in_time: DateTime<Utc>,
    out_time: Option<DateTime<Utc>>,
    vehicle_type: VehicleType,
    discount_rate: f64,
) -> CoreResult<Price> {
    FareSchedule::default().compute(in_time, out_time, vehicle_type, discount_rate)
}

/// Exact elapsed time between two instants, in fractional hours.
pub fn stay_hours(in_time: DateTime<Utc>, out_time: DateTime<Utc>) -> f64 {
    let elapsed = out_time - in_time;
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / MICROS_PER_HOUR,
        None => elapsed.num_seconds() as f64 / 3600.0,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
