//! # Error Types
//!
//! Domain-specific error types for parkit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  parkit-core errors (this file)                                        │
//! │  ├── CoreError        - Workflow and fare failures                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  parkit-db errors (separate crate)                                     │
//! │  └── DbError          - Database failures, surfaced here as            │
//! │                         CoreError::StoreUnavailable                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → menu loop prints message          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expected failures (no spot, no ticket, bad input) and unexpected ones
//! (store outage) travel through the same `Result` path and differ only in
//! kind. See [`CoreError::is_expected`].

use thiserror::Error;

use crate::types::VehicleType;

// =============================================================================
// Core Error
// =============================================================================

/// Parking workflow and fare errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Menu selection did not name a known vehicle type.
    #[error("Invalid selection: {input}")]
    InvalidSelection { input: String },

    /// Registration number was empty, missing, or too long.
    #[error("Invalid registration number: {0}")]
    InvalidRegistration(#[source] ValidationError),

    /// Every spot of the requested type is occupied.
    ///
    /// ## User Workflow
    /// ```text
    /// Select vehicle type: CAR
    ///      │
    ///      ▼
    /// claim_next_available(CAR) → None
    ///      │
    ///      ▼
    /// NoAvailableSpot { vehicle_type: Car }
    ///      │
    ///      ▼
    /// Shell shows: "No available CAR spot, parking might be full"
    /// ```
    #[error("No available {vehicle_type} spot, parking might be full")]
    NoAvailableSpot { vehicle_type: VehicleType },

    /// No open ticket exists for the registration number.
    #[error("No open ticket for vehicle {vehicle_reg_number}")]
    TicketNotFound { vehicle_reg_number: String },

    /// Out-time is missing or precedes in-time.
    #[error("Invalid stay: {reason}")]
    InvalidStay { reason: String },

    /// Vehicle type code is not CAR or BIKE.
    #[error("Unknown vehicle type: {0}")]
    UnknownVehicleType(String),

    /// Discount rate outside `[0, 1]`.
    #[error("Discount rate {0} must be between 0 and 1")]
    InvalidDiscount(f64),

    /// The ledger matched no row when closing a ticket.
    #[error("Unable to update ticket {ticket_id}")]
    UpdateFailed { ticket_id: String },

    /// A collaborator store (spot directory, ticket ledger, console) failed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a StoreUnavailable error from any displayable cause.
    pub fn store(cause: impl std::fmt::Display) -> Self {
        CoreError::StoreUnavailable(cause.to_string())
    }

    /// Creates an InvalidStay error.
    pub fn invalid_stay(reason: impl Into<String>) -> Self {
        CoreError::InvalidStay {
            reason: reason.into(),
        }
    }

    /// Returns true for domain failures the operator can act on.
    ///
    /// Store outages and failed updates are unexpected; everything else is
    /// a consequence of input or lot state.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            CoreError::StoreUnavailable(_) | CoreError::UpdateFailed { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-numeric selection).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
