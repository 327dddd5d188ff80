//! # Repository Module
//!
//! SQLite implementations of the orchestrator's store traits.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ParkingService                                                        │
//! │       │                                                                 │
//! │       │  spots.claim_next_available(CAR)                               │
//! │       ▼                                                                 │
//! │  SpotRepository    (impl SpotDirectory)                                │
//! │  ├── find_next_available / set_availability / claim_next_available     │
//! │  └── get / list / count_available / provision                          │
//! │                                                                         │
//! │  TicketRepository  (impl TicketLedger)                                 │
//! │  ├── save / find_latest_by_registration / update / count_closed        │
//! │  └── get / history                                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (parking, ticket)                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SpotRepository`] - Spot lookup, claiming and provisioning
//! - [`TicketRepository`] - Ticket persistence and recurrence counts

pub mod spot;
pub mod ticket;

pub use spot::SpotRepository;
pub use ticket::TicketRepository;
