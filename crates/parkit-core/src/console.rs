//! # Console
//!
//! Line-oriented operator I/O as seen by the orchestrator.
//!
//! The shell implements [`Console`] over stdin/stdout; tests use
//! [`ScriptedConsole`], which replays canned input and records output.
//!
//! ## Prompt Sequence (entry)
//! ```text
//! Please select vehicle type from menu
//! 1 CAR
//! 2 BIKE
//! > 1                                   read_vehicle_type()
//! Please type the vehicle registration number and press enter key
//! > AB125XY                             read_registration_number()
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::warn;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::VehicleType;
use crate::validation::{parse_selection, validate_registration_number};

/// Operator terminal.
pub trait Console: Send + Sync {
    /// Reads one line without its terminator. `None` at end of input.
    fn read_line(&self) -> CoreResult<Option<String>>;

    /// Writes one line.
    fn write_line(&self, line: &str);
}

/// Reads a menu selection in `1..=max`.
///
/// End of input and unparsable or out-of-range values yield `None`.
pub fn read_selection(console: &dyn Console, max: u32) -> CoreResult<Option<u32>> {
    let Some(line) = console.read_line()? else {
        return Ok(None);
    };

    match parse_selection(&line, max) {
        Ok(selection) => Ok(Some(selection)),
        Err(e) => {
            warn!(input = %line, error = %e, "Unusable menu selection");
            Ok(None)
        }
    }
}

/// Prompts for and reads the vehicle type.
///
/// ## Returns
/// * `Err(CoreError::InvalidSelection)` - anything other than 1 or 2
pub fn read_vehicle_type(console: &dyn Console) -> CoreResult<VehicleType> {
    console.write_line("Please select vehicle type from menu");
    for (idx, vehicle_type) in VehicleType::ALL.iter().enumerate() {
        console.write_line(&format!("{} {}", idx + 1, vehicle_type));
    }

    let line = console.read_line()?.unwrap_or_default();
    let selection = parse_selection(&line, VehicleType::ALL.len() as u32).map_err(|_| {
        console.write_line("Incorrect input provided");
        CoreError::InvalidSelection {
            input: line.trim().to_string(),
        }
    })?;

    VehicleType::from_selection(selection)
}

/// Prompts for and reads a registration number.
///
/// ## Returns
/// * `Ok(String)` - trimmed registration number
/// * `Err(CoreError::InvalidRegistration)` - empty, missing, or too long
pub fn read_registration_number(console: &dyn Console) -> CoreResult<String> {
    console.write_line("Please type the vehicle registration number and press enter key");

    let line = console.read_line()?.ok_or_else(|| {
        CoreError::InvalidRegistration(ValidationError::Required {
            field: "vehicle registration number".to_string(),
        })
    })?;

    validate_registration_number(&line).map_err(CoreError::InvalidRegistration)
}

// =============================================================================
// Scripted Console
// =============================================================================

/// Console that replays canned input lines and records every output line.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: Mutex<VecDeque<String>>,
    output: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            input: Mutex::new(lines.into_iter().map(Into::into).collect()),
            output: Mutex::new(Vec::new()),
        }
    }

    /// Queues more input.
    pub fn push_lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Ok(mut input) = self.input.lock() {
            input.extend(lines.into_iter().map(Into::into));
        }
    }

    /// Everything written so far.
    pub fn output(&self) -> Vec<String> {
        self.output
            .lock()
            .map(|out| out.clone())
            .unwrap_or_default()
    }

    /// True when some output line contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.output().iter().any(|line| line.contains(needle))
    }

    /// Discards recorded output.
    pub fn clear_output(&self) {
        if let Ok(mut out) = self.output.lock() {
            out.clear();
        }
    }
}

impl Console for ScriptedConsole {
    fn read_line(&self) -> CoreResult<Option<String>> {
        let mut input = self
            .input
            .lock()
            .map_err(|_| CoreError::store("scripted console lock poisoned"))?;
        Ok(input.pop_front())
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut out) = self.output.lock() {
            out.push(line.to_string());
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
