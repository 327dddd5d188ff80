//! # Menu Loop
//!
//! ```text
//! Please select an option. Simply enter the number to choose an action
//! 1 New Vehicle Entering - Allocate Parking Space     → entry workflow
//! 2 Vehicle Exiting - Generate Ticket Price           → exit workflow
//! 3 Shutdown System                                   → return
//! ```
//!
//! Anything else re-displays the menu. End of input shuts down. A failed
//! workflow is reported on the console and the loop carries on.

use parkit_core::validation::parse_selection;
use parkit_core::{Console, CoreResult, ParkingService};
use tracing::{debug, info};

/// Top-level menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    IncomingVehicle,
    ExitingVehicle,
    Shutdown,
}

impl MenuOption {
    pub const COUNT: u32 = 3;

    pub fn from_selection(selection: u32) -> Option<Self> {
        match selection {
            1 => Some(MenuOption::IncomingVehicle),
            2 => Some(MenuOption::ExitingVehicle),
            3 => Some(MenuOption::Shutdown),
            _ => None,
        }
    }
}

fn show_menu(console: &dyn Console) {
    console.write_line("Please select an option. Simply enter the number to choose an action");
    console.write_line("1 New Vehicle Entering - Allocate Parking Space");
    console.write_line("2 Vehicle Exiting - Generate Ticket Price");
    console.write_line("3 Shutdown System");
}

/// Runs the menu until shutdown or end of input.
///
/// ## Returns
/// * `Ok(())` - operator chose shutdown, or input ended
/// * `Err(CoreError)` - the console itself failed
pub async fn run(service: &ParkingService, console: &dyn Console) -> CoreResult<()> {
    console.write_line("Welcome to Parking System!");

    loop {
        show_menu(console);

        let Some(line) = console.read_line()? else {
            info!("Input closed, shutting down");
            console.write_line("Exiting from the system!");
            return Ok(());
        };

        let option = parse_selection(&line, MenuOption::COUNT)
            .ok()
            .and_then(MenuOption::from_selection);
        debug!(input = %line, ?option, "Menu selection");

        match option {
            Some(MenuOption::IncomingVehicle) => {
                if let Err(e) = service.process_incoming_vehicle().await {
                    console.write_line(&format!("Unable to process incoming vehicle: {}", e));
                }
            }
            Some(MenuOption::ExitingVehicle) => {
                if let Err(e) = service.process_exiting_vehicle().await {
                    console.write_line(&format!("Unable to process exiting vehicle: {}", e));
                }
            }
            Some(MenuOption::Shutdown) => {
                console.write_line("Exiting from the system!");
                return Ok(());
            }
            None => console.write_line(
                "Unsupported option. Please enter a number corresponding to the provided menu",
            ),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parkit_core::{InMemorySpotDirectory, InMemoryTicketLedger, ScriptedConsole};
    use std::sync::Arc;

    struct Shell {
        spots: Arc<InMemorySpotDirectory>,
        tickets: Arc<InMemoryTicketLedger>,
        console: Arc<ScriptedConsole>,
        service: ParkingService,
    }

    fn shell(input: &[&str]) -> Shell {
        let spots = Arc::new(InMemorySpotDirectory::standard_layout());
        let tickets = Arc::new(InMemoryTicketLedger::new());
        let console = Arc::new(ScriptedConsole::new(input.iter().copied()));
        let service = ParkingService::new(spots.clone(), tickets.clone(), console.clone());

        Shell {
            spots,
            tickets,
            console,
            service,
        }
    }

    #[test]
    fn test_menu_option_mapping() {
        assert_eq!(MenuOption::from_selection(1), Some(MenuOption::IncomingVehicle));
        assert_eq!(MenuOption::from_selection(2), Some(MenuOption::ExitingVehicle));
        assert_eq!(MenuOption::from_selection(3), Some(MenuOption::Shutdown));
        assert_eq!(MenuOption::from_selection(4), None);
    }

    #[tokio::test]
    async fn test_enter_exit_shutdown() {
        let s = shell(&["1", "1", "AB125XY", "2", "AB125XY", "3"]);

        run(&s.service, s.console.as_ref()).await.unwrap();

        let stored = s.tickets.tickets();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].is_open());
        assert!(s.spots.spot(1).unwrap().is_available());
        assert!(s.console.printed("Please pay the parking fare"));
        assert!(s.console.printed("Exiting from the system!"));
    }

    #[tokio::test]
    async fn test_unsupported_option_redisplays_menu() {
        let s = shell(&["9", "hello", "3"]);

        run(&s.service, s.console.as_ref()).await.unwrap();

        let unsupported = s
            .console
            .output()
            .iter()
            .filter(|line| line.starts_with("Unsupported option"))
            .count();
        let menus = s
            .console
            .output()
            .iter()
            .filter(|line| line.as_str() == "3 Shutdown System")
            .count();
        assert_eq!(unsupported, 2);
        assert_eq!(menus, 3);
    }

    #[tokio::test]
    async fn test_end_of_input_shuts_down() {
        let s = shell(&["1", "2", "BIKE01"]);

        run(&s.service, s.console.as_ref()).await.unwrap();

        assert_eq!(s.tickets.tickets().len(), 1);
        assert!(s.console.printed("Exiting from the system!"));
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_loop_continues() {
        let s = shell(&["2", "NOPE", "1", "1", "AB125XY", "3"]);

        run(&s.service, s.console.as_ref()).await.unwrap();

        assert!(s
            .console
            .printed("Unable to process exiting vehicle: No open ticket for vehicle NOPE"));
        assert_eq!(s.tickets.tickets().len(), 1);
    }

    #[tokio::test]
    async fn test_full_lot_is_reported() {
        let s = shell(&["1", "2", "B1", "1", "2", "B2", "1", "2", "B3", "3"]);

        run(&s.service, s.console.as_ref()).await.unwrap();

        assert!(s.console.printed("No available BIKE spot"));
        assert_eq!(s.tickets.tickets().len(), 2);
    }
}
