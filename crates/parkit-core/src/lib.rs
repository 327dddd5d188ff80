//! # parkit-core: Fare and Ticket Lifecycle for Park'it
//!
//! This crate holds the parking domain: vehicle types, spots, tickets, the
//! fare calculator and the entry/exit orchestrator. Storage and terminal
//! I/O sit behind traits so the same workflows run against SQLite in the
//! shell and against in-memory stores in tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Park'it Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    parkit shell (apps/shell)                    │   │
//! │  │    menu loop ──► 1 entering / 2 exiting / 3 shutdown           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ parkit-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   fare    │  │  service  │  │  console  │  │   │
//! │  │   │  Ticket   │  │ Schedule  │  │  entry    │  │  prompts  │  │   │
//! │  │   │  Spot     │  │  Price    │  │  exit     │  │  parsing  │  │   │
//! │  │   └───────────┘  └───────────┘  └─────┬─────┘  └───────────┘  │   │
//! │  │                                       │ store traits           │   │
//! │  └───────────────────────────────────────┼─────────────────────────┘   │
//! │                                          │                              │
//! │  ┌───────────────────────────────────────▼─────────────────────────┐   │
//! │  │                  parkit-db (Database Layer)                     │   │
//! │  │         SpotRepository, TicketRepository over SQLite            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (VehicleType, ParkingSpot, Ticket)
//! - [`fare`] - Fare schedule and computation
//! - [`money`] - Price amounts
//! - [`service`] - Entry/exit orchestrator
//! - [`store`] - Spot directory and ticket ledger traits, in-memory impls
//! - [`console`] - Operator prompts and input parsing
//! - [`clock`] - Time source
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use parkit_core::{FareSchedule, VehicleType};
//!
//! let schedule = FareSchedule::default();
//! let in_time = Utc::now();
//!
//! // One hour in a car spot, recurring user
//! let fare = schedule
//!     .compute(in_time, Some(in_time + Duration::hours(1)), VehicleType::Car, 0.05)
//!     .unwrap();
//! assert!((fare.amount() - 1.425).abs() < 1e-9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod console;
pub mod error;
pub mod fare;
pub mod money;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use console::{Console, ScriptedConsole};
pub use error::{CoreError, CoreResult, ValidationError};
pub use fare::{compute_fare, FareSchedule};
pub use money::Price;
pub use service::{EntryReceipt, ExitReceipt, ParkingService, ServiceOptions};
pub use store::memory::{InMemorySpotDirectory, InMemoryTicketLedger};
pub use store::{SpotDirectory, TicketLedger};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a vehicle registration number, after trimming.
pub const MAX_REG_NUMBER_LEN: usize = 8;
