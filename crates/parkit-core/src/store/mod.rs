//! # Store Traits
//!
//! The two collaborators the session orchestrator writes to.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ParkingService                                                        │
//! │       │                                                                 │
//! │       ├──► SpotDirectory   find / claim / release spots                │
//! │       │     ├── InMemorySpotDirectory   (memory.rs, tests)             │
//! │       │     └── SpotRepository          (parkit-db, SQLite)            │
//! │       │                                                                 │
//! │       └──► TicketLedger    save / find latest / update / count         │
//! │             ├── InMemoryTicketLedger    (memory.rs, tests)             │
//! │             └── TicketRepository        (parkit-db, SQLite)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stores are independent: no transaction spans a spot write and a
//! ticket write. The orchestrator performs both writes per transition.

pub mod memory;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{ParkingSpot, Ticket, TicketId, VehicleType};

/// Allocates and releases parking spots by type.
#[async_trait]
pub trait SpotDirectory: Send + Sync {
    /// Returns the lowest-numbered available spot of the type, if any.
    async fn find_next_available(&self, vehicle_type: VehicleType) -> CoreResult<Option<u32>>;

    /// Sets a spot's availability. Returns false when no spot matched.
    async fn set_availability(&self, spot_number: u32, available: bool) -> CoreResult<bool>;

    /// Finds the next available spot of the type and marks it unavailable.
    ///
    /// The default composes [`find_next_available`](Self::find_next_available)
    /// and [`set_availability`](Self::set_availability); two callers racing
    /// through it can be handed the same spot. Implementations shared
    /// between threads override it with a single atomic step.
    async fn claim_next_available(
        &self,
        vehicle_type: VehicleType,
    ) -> CoreResult<Option<ParkingSpot>> {
        let number = match self.find_next_available(vehicle_type).await? {
            Some(number) if number > 0 => number,
            _ => return Ok(None),
        };

        if !self.set_availability(number, false).await? {
            return Ok(None);
        }

        Ok(Some(ParkingSpot::new(number, vehicle_type, false)))
    }
}

/// Persists tickets and answers recurrence questions.
#[async_trait]
pub trait TicketLedger: Send + Sync {
    /// Inserts a new ticket and returns the id assigned to it.
    async fn save(&self, ticket: &Ticket) -> CoreResult<TicketId>;

    /// Most recent ticket for a registration number.
    ///
    /// Open tickets rank before closed ones; closed tickets rank by latest
    /// out-time; ties go to the highest id.
    async fn find_latest_by_registration(&self, vehicle_reg_number: &str)
        -> CoreResult<Option<Ticket>>;

    /// Writes price and out-time by ticket id. Returns false when no row matched.
    async fn update(&self, ticket: &Ticket) -> CoreResult<bool>;

    /// Number of closed tickets (out-time set) for a registration number.
    async fn count_closed_tickets(&self, vehicle_reg_number: &str) -> CoreResult<u64>;
}
