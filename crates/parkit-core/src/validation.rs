//! # Validation Module
//!
//! Input validation for values typed at the parking console.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console (console.rs)                                         │
//! │  └── Prompts and reads raw lines                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Menu selections (numeric, in range)                               │
//! │  └── Registration numbers (non-empty, bounded length)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key from ticket to parking spot                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use parkit_core::validation::{parse_selection, validate_registration_number};
//!
//! assert_eq!(parse_selection("2", 3).unwrap(), 2);
//! assert_eq!(validate_registration_number(" AB125XY ").unwrap(), "AB125XY");
//! ```

use crate::error::ValidationError;
use crate::MAX_REG_NUMBER_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const REG_FIELD: &str = "vehicle registration number";

/// Validates a vehicle registration number.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must not be empty
/// - Must be at most [`MAX_REG_NUMBER_LEN`] characters
///
/// ## Returns
/// The trimmed registration number.
///
/// ## Example
/// ```rust
/// use parkit_core::validation::validate_registration_number;
///
/// assert!(validate_registration_number("AB125XY").is_ok());
/// assert!(validate_registration_number("   ").is_err());
/// assert!(validate_registration_number("ABCDEFGHIJ").is_err());
/// ```
pub fn validate_registration_number(input: &str) -> ValidationResult<String> {
    let reg = input.trim();

    if reg.is_empty() {
        return Err(ValidationError::Required {
            field: REG_FIELD.to_string(),
        });
    }

    if reg.chars().count() > MAX_REG_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: REG_FIELD.to_string(),
            max: MAX_REG_NUMBER_LEN,
        });
    }

    Ok(reg.to_string())
}

/// Parses a numeric menu selection.
///
/// ## Rules
/// - Must parse as an integer
/// - Must be between 1 and `max` inclusive
pub fn parse_selection(input: &str, max: u32) -> ValidationResult<u32> {
    let trimmed = input.trim();

    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "selection".to_string(),
            reason: format!("'{}' is not a number", trimmed),
        })?;

    if value < 1 || value > i64::from(max) {
        return Err(ValidationError::OutOfRange {
            field: "selection".to_string(),
            min: 1,
            max: i64::from(max),
        });
    }

    Ok(value as u32)
}

/// Checks a discount rate lies in `[0, 1]`.
pub fn is_valid_discount_rate(rate: f64) -> bool {
    rate.is_finite() && (0.0..=1.0).contains(&rate)
}

// =============================================================================
// Unit Tests
// =============================================================================
