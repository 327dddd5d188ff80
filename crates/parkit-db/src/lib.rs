//! # parkit-db: Database Layer for Park'it
//!
//! SQLite storage for spots and tickets, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Park'it Data Flow                                │
//! │                                                                         │
//! │  ParkingService (parkit-core)                                          │
//! │       │  dyn SpotDirectory / dyn TicketLedger                          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     parkit-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ SpotRepository │   │ 001_schema   │   │   │
//! │  │   │ SqlitePool    │◄───│ TicketRepo...  │   │ 002_spots    │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/parkit/parkit.db                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parkit_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("parkit.db")).await?;
//!
//! let service = ParkingService::new(
//!     Arc::new(db.spots()),
//!     Arc::new(db.tickets()),
//!     console,
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{SpotRepository, TicketRepository};
