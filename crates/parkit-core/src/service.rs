//! # Parking Session Orchestrator
//!
//! Sequences the entry and exit workflows. [`ParkingService`] is the only
//! code that mutates tickets and spot availability.
//!
//! ## Entry Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process_incoming_vehicle()                                            │
//! │                                                                         │
//! │  1. read vehicle type          ── bad input ──► InvalidSelection       │
//! │  2. claim next spot of type    ── none ───────► NoAvailableSpot        │
//! │     (find + mark unavailable, write #1)                                │
//! │  3. read registration number   ── bad input ──► InvalidRegistration    │
//! │  4. build open ticket (in_time = now - in_time_offset)                 │
//! │  5. ledger.save(ticket)        (write #2)                              │
//! │  6. recurrence check → "welcome back" notice (never fails the entry)   │
//! │  7. report spot number + in-time                                       │
//! │                                                                         │
//! │  Failure after step 2 releases the spot again when                     │
//! │  ServiceOptions::release_spot_on_failure is set.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exit Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process_exiting_vehicle()                                             │
//! │                                                                         │
//! │  1. read registration number   ── bad input ──► InvalidRegistration    │
//! │  2. latest ticket, must be open ── none ──────► TicketNotFound         │
//! │  3. out_time = now                                                     │
//! │  4. discount = recurring ? 5% : 0                                      │
//! │  5. fare = FareSchedule::compute(...)                                  │
//! │  6. ledger.update(ticket)      ── 0 rows ─────► UpdateFailed           │
//! │  7. release spot                                                       │
//! │  8. report fare + out-time                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is logged here and returned to the caller as a typed
//! error; nothing panics and nothing is retried.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::console::{read_registration_number, read_vehicle_type, Console};
use crate::error::{CoreError, CoreResult};
use crate::fare::FareSchedule;
use crate::money::Price;
use crate::store::{SpotDirectory, TicketLedger};
use crate::types::{ParkingSpot, Ticket, TicketId, VehicleType};

// =============================================================================
// Options and Receipts
// =============================================================================

/// Workflow policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    /// Give a claimed spot back when the entry fails after claiming it
    /// (bad registration number, ticket save failure).
    pub release_spot_on_failure: bool,

    /// Subtracted from the clock when stamping the in-time. Zero by default.
    pub in_time_offset: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        ServiceOptions {
            release_spot_on_failure: true,
            in_time_offset: Duration::zero(),
        }
    }
}

/// Outcome of a successful entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryReceipt {
    pub ticket_id: TicketId,
    pub spot_number: u32,
    pub vehicle_type: VehicleType,
    pub vehicle_reg_number: String,
    pub in_time: DateTime<Utc>,
    pub recurring: bool,
}

/// Outcome of a successful exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitReceipt {
    pub ticket_id: TicketId,
    pub spot_number: u32,
    pub vehicle_reg_number: String,
    pub in_time: DateTime<Utc>,
    pub out_time: DateTime<Utc>,
    pub discount_rate: f64,
    pub fare: Price,
}

// =============================================================================
// Parking Service
// =============================================================================

/// Entry/exit orchestrator over injected collaborators.
///
/// ## Usage
/// ```rust,ignore
/// let service = ParkingService::new(spots, tickets, console)
///     .with_schedule(schedule)
///     .with_options(ServiceOptions::default());
///
/// let receipt = service.process_incoming_vehicle().await?;
/// ```
pub struct ParkingService {
    spots: Arc<dyn SpotDirectory>,
    tickets: Arc<dyn TicketLedger>,
    console: Arc<dyn Console>,
    clock: Arc<dyn Clock>,
    schedule: FareSchedule,
    options: ServiceOptions,
}

impl ParkingService {
    /// Creates a service with the wall clock, standard tariff and default options.
    pub fn new(
        spots: Arc<dyn SpotDirectory>,
        tickets: Arc<dyn TicketLedger>,
        console: Arc<dyn Console>,
    ) -> Self {
        ParkingService {
            spots,
            tickets,
            console,
            clock: Arc::new(SystemClock),
            schedule: FareSchedule::default(),
            options: ServiceOptions::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_schedule(mut self, schedule: FareSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_options(mut self, options: ServiceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schedule(&self) -> &FareSchedule {
        &self.schedule
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    // -------------------------------------------------------------------------
    // Caller-facing workflows
    // -------------------------------------------------------------------------

    /// Runs the entry workflow for one vehicle.
    pub async fn process_incoming_vehicle(&self) -> CoreResult<EntryReceipt> {
        let result = self.enter().await;
        if let Err(e) = &result {
            report_failure("Unable to process incoming vehicle", e);
        }
        result
    }

    /// Runs the exit workflow for one vehicle.
    pub async fn process_exiting_vehicle(&self) -> CoreResult<ExitReceipt> {
        let result = self.exit().await;
        if let Err(e) = &result {
            report_failure("Unable to process exiting vehicle", e);
        }
        result
    }

    /// Reads a vehicle type and previews the spot an entry would get.
    ///
    /// Nothing is written; the returned spot is still available.
    pub async fn get_next_parking_number_if_available(&self) -> CoreResult<ParkingSpot> {
        let result = self.preview().await;
        if let Err(e) = &result {
            report_failure("Error fetching next available parking slot", e);
        }
        result
    }

    // -------------------------------------------------------------------------
    // Entry
    // -------------------------------------------------------------------------

    async fn enter(&self) -> CoreResult<EntryReceipt> {
        let vehicle_type = read_vehicle_type(self.console.as_ref())?;

        let spot = match self.spots.claim_next_available(vehicle_type).await? {
            Some(spot) if spot.number() > 0 => spot,
            Some(spot) => {
                // Number 0 means "none" but the directory has already marked it taken.
                self.release_claimed_spot(spot.number()).await;
                return Err(CoreError::NoAvailableSpot { vehicle_type });
            }
            None => return Err(CoreError::NoAvailableSpot { vehicle_type }),
        };

        debug!(spot = spot.number(), %vehicle_type, "Spot claimed");

        let spot_number = spot.number();
        match self.issue_ticket(spot).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                if self.options.release_spot_on_failure {
                    self.release_claimed_spot(spot_number).await;
                }
                Err(e)
            }
        }
    }

    async fn issue_ticket(&self, spot: ParkingSpot) -> CoreResult<EntryReceipt> {
        let vehicle_reg_number = read_registration_number(self.console.as_ref())?;

        let now = self.clock.now();
        let in_time = now
            .checked_sub_signed(self.options.in_time_offset)
            .ok_or_else(|| {
                CoreError::invalid_stay(format!(
                    "in-time offset {} puts the entry before {} out of range",
                    self.options.in_time_offset, now
                ))
            })?;
        let spot_number = spot.number();
        let vehicle_type = spot.vehicle_type();

        let mut ticket = Ticket::open(spot, vehicle_reg_number.clone(), in_time);
        let ticket_id = self.tickets.save(&ticket).await?;
        ticket.assign_id(ticket_id);

        info!(
            ticket_id,
            spot = spot_number,
            vehicle = %vehicle_reg_number,
            "Ticket issued"
        );

        let recurring = self.check_recurring(&vehicle_reg_number).await;
        if recurring {
            self.console.write_line(&format!(
                "Welcome back! As a recurring user of our parking lot, you'll benefit from a {:.0}% discount.",
                self.schedule.recurring_discount * 100.0
            ));
        }

        self.console.write_line("Generated Ticket and saved in DB");
        self.console.write_line(&format!(
            "Please park your vehicle in spot number: {}",
            spot_number
        ));
        self.console.write_line(&format!(
            "Recorded in-time for vehicle number: {} is: {}",
            vehicle_reg_number, in_time
        ));

        Ok(EntryReceipt {
            ticket_id,
            spot_number,
            vehicle_type,
            vehicle_reg_number,
            in_time,
            recurring,
        })
    }

    /// Recurrence lookup for the entry notice. Failures only cost the notice.
    async fn check_recurring(&self, vehicle_reg_number: &str) -> bool {
        match self.tickets.count_closed_tickets(vehicle_reg_number).await {
            Ok(closed) => self.schedule.is_recurring(closed),
            Err(e) => {
                warn!(vehicle = %vehicle_reg_number, error = %e, "Recurrence check failed");
                false
            }
        }
    }

    async fn release_claimed_spot(&self, spot_number: u32) {
        match self.spots.set_availability(spot_number, true).await {
            Ok(true) => debug!(spot = spot_number, "Claimed spot released after failed entry"),
            Ok(false) => warn!(spot = spot_number, "Claimed spot vanished before release"),
            Err(e) => error!(
                spot = spot_number,
                error = %e,
                "Claimed spot could not be released, it stays unavailable"
            ),
        }
    }

    // -------------------------------------------------------------------------
    // Exit
    // -------------------------------------------------------------------------

    async fn exit(&self) -> CoreResult<ExitReceipt> {
        let vehicle_reg_number = read_registration_number(self.console.as_ref())?;

        let mut ticket = self
            .tickets
            .find_latest_by_registration(&vehicle_reg_number)
            .await?
            .filter(Ticket::is_open)
            .ok_or_else(|| CoreError::TicketNotFound {
                vehicle_reg_number: vehicle_reg_number.clone(),
            })?;

        let ticket_id = ticket.id().ok_or_else(|| CoreError::UpdateFailed {
            ticket_id: "unsaved".to_string(),
        })?;

        let out_time = self.clock.now();

        let closed = self.tickets.count_closed_tickets(&vehicle_reg_number).await?;
        let discount_rate = self.schedule.discount_for(self.schedule.is_recurring(closed));

        let fare = self.schedule.compute(
            ticket.in_time(),
            Some(out_time),
            ticket.spot().vehicle_type(),
            discount_rate,
        )?;
        ticket.close(out_time, fare)?;

        if !self.tickets.update(&ticket).await? {
            self.console
                .write_line("Unable to update ticket information. Error occurred");
            return Err(CoreError::UpdateFailed {
                ticket_id: ticket_id.to_string(),
            });
        }

        let spot_number = ticket.spot().number();
        if !self.spots.set_availability(spot_number, true).await? {
            warn!(spot = spot_number, "Spot missing from directory on release");
        }

        info!(
            ticket_id,
            spot = spot_number,
            vehicle = %vehicle_reg_number,
            fare = fare.amount(),
            discount_rate,
            "Ticket closed"
        );

        self.console
            .write_line(&format!("Please pay the parking fare: {}", fare));
        self.console.write_line(&format!(
            "Recorded out-time for vehicle number: {} is: {}",
            vehicle_reg_number, out_time
        ));

        Ok(ExitReceipt {
            ticket_id,
            spot_number,
            vehicle_reg_number,
            in_time: ticket.in_time(),
            out_time,
            discount_rate,
            fare,
        })
    }

    // -------------------------------------------------------------------------
    // Preview
    // -------------------------------------------------------------------------

    async fn preview(&self) -> CoreResult<ParkingSpot> {
        let vehicle_type = read_vehicle_type(self.console.as_ref())?;

        match self.spots.find_next_available(vehicle_type).await? {
            Some(number) if number > 0 => Ok(ParkingSpot::new(number, vehicle_type, true)),
            _ => Err(CoreError::NoAvailableSpot { vehicle_type }),
        }
    }
}

fn report_failure(context: &str, e: &CoreError) {
    if e.is_expected() {
        warn!(error = %e, "{}", context);
    } else {
        error!(error = %e, "{}", context);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::console::ScriptedConsole;
    use crate::store::memory::{InMemorySpotDirectory, InMemoryTicketLedger};
    use async_trait::async_trait;
    use chrono::TimeZone;

    struct Fixture {
        spots: Arc<InMemorySpotDirectory>,
        tickets: Arc<InMemoryTicketLedger>,
        console: Arc<ScriptedConsole>,
        clock: Arc<FixedClock>,
    }

    impl Fixture {
        fn new(spots: InMemorySpotDirectory) -> Self {
            Fixture {
                spots: Arc::new(spots),
                tickets: Arc::new(InMemoryTicketLedger::new()),
                console: Arc::new(ScriptedConsole::default()),
                clock: Arc::new(FixedClock::new(
                    Utc.with_ymd_and_hms(2024, 6, 3, 8, 30, 0).unwrap(),
                )),
            }
        }

        fn standard() -> Self {
            Self::new(InMemorySpotDirectory::standard_layout())
        }

        fn service(&self) -> ParkingService {
            ParkingService::new(
                self.spots.clone(),
                self.tickets.clone(),
                self.console.clone(),
            )
            .with_clock(self.clock.clone())
        }

        fn input(&self, lines: &[&str]) {
            self.console.push_lines(lines.iter().copied());
        }

        /// Stores a finished visit directly in the ledger.
        async fn past_visit(&self, reg: &str) {
            let in_time = self.clock.now() - Duration::days(3);
            let mut ticket = Ticket::open(ParkingSpot::new(3, VehicleType::Car, false), reg, in_time);
            ticket
                .close(in_time + Duration::hours(2), Price::new(3.0))
                .unwrap();
            self.tickets.save(&ticket).await.unwrap();
        }
    }

    // -------------------------------------------------------------------------
    // Entry
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_entry_takes_the_free_car_spot() {
        let fx = Fixture::new(InMemorySpotDirectory::with_spots([
            ParkingSpot::new(1, VehicleType::Car, false),
            ParkingSpot::new(2, VehicleType::Car, true),
        ]));
        fx.input(&["1", "AB125XY"]);

        let receipt = fx.service().process_incoming_vehicle().await.unwrap();

        assert_eq!(receipt.spot_number, 2);
        assert_eq!(receipt.vehicle_reg_number, "AB125XY");
        assert_eq!(receipt.in_time, fx.clock.now());
        assert!(!receipt.recurring);
        assert!(!fx.spots.spot(2).unwrap().is_available());

        let stored = fx.tickets.tickets();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id(), Some(receipt.ticket_id));
        assert_eq!(stored[0].out_time(), None);
        assert!(stored[0].price().is_zero());
        assert_eq!(stored[0].spot().number(), 2);
        assert!(fx.console.printed("Please park your vehicle in spot number: 2"));
    }

    #[tokio::test]
    async fn test_entry_invalid_selection_has_no_side_effects() {
        let fx = Fixture::standard();
        fx.input(&["3"]);

        let err = fx.service().process_incoming_vehicle().await.unwrap_err();

        assert!(matches!(err, CoreError::InvalidSelection { .. }));
        assert!(fx.tickets.tickets().is_empty());
        assert!(fx.spots.spot(1).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_entry_when_lot_is_full() {
        let fx = Fixture::new(InMemorySpotDirectory::with_spots([
            ParkingSpot::new(4, VehicleType::Bike, false),
            ParkingSpot::new(1, VehicleType::Car, true),
        ]));
        fx.input(&["2", "BIKE01"]);

        let err = fx.service().process_incoming_vehicle().await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::NoAvailableSpot {
                vehicle_type: VehicleType::Bike
            }
        ));
        assert!(fx.tickets.tickets().is_empty());
        assert!(fx.spots.spot(1).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_entry_bad_registration_releases_spot() {
        let fx = Fixture::standard();
        fx.input(&["1", "   "]);

        let err = fx.service().process_incoming_vehicle().await.unwrap_err();

        assert!(matches!(err, CoreError::InvalidRegistration(_)));
        assert!(fx.spots.spot(1).unwrap().is_available());
        assert!(fx.tickets.tickets().is_empty());
    }

    #[tokio::test]
    async fn test_entry_bad_registration_without_compensation() {
        let fx = Fixture::standard();
        fx.input(&["1", "WAYTOOLONG"]);

        let service = fx.service().with_options(ServiceOptions {
            release_spot_on_failure: false,
            ..ServiceOptions::default()
        });
        let err = service.process_incoming_vehicle().await.unwrap_err();

        assert!(matches!(err, CoreError::InvalidRegistration(_)));
        assert!(!fx.spots.spot(1).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_entry_save_failure_releases_spot() {
        let fx = Fixture::standard();
        fx.tickets.set_outage(true);
        fx.input(&["2", "BIKE01"]);

        let err = fx.service().process_incoming_vehicle().await.unwrap_err();

        assert!(matches!(err, CoreError::StoreUnavailable(_)));
        assert!(!err.is_expected());
        assert!(fx.spots.spot(4).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_entry_save_failure_keeps_spot_when_configured() {
        let fx = Fixture::standard();
        fx.tickets.set_outage(true);
        fx.input(&["2", "BIKE01"]);

        let service = fx.service().with_options(ServiceOptions {
            release_spot_on_failure: false,
            ..ServiceOptions::default()
        });
        assert!(service.process_incoming_vehicle().await.is_err());
        assert!(!fx.spots.spot(4).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_entry_welcomes_recurring_user() {
        let fx = Fixture::standard();
        fx.past_visit("ABCDEF").await;
        fx.past_visit("ABCDEF").await;
        fx.input(&["1", "ABCDEF"]);

        let receipt = fx.service().process_incoming_vehicle().await.unwrap();

        assert!(receipt.recurring);
        assert!(fx.console.printed("Welcome back!"));
        assert!(fx.console.printed("5% discount"));
    }

    #[tokio::test]
    async fn test_entry_single_past_visit_is_not_recurring() {
        let fx = Fixture::standard();
        fx.past_visit("ABCDEF").await;
        fx.input(&["1", "ABCDEF"]);

        let receipt = fx.service().process_incoming_vehicle().await.unwrap();

        assert!(!receipt.recurring);
        assert!(!fx.console.printed("Welcome back!"));
    }

    /// Ledger whose recurrence count always fails.
    struct CountlessLedger(InMemoryTicketLedger);

    #[async_trait]
    impl TicketLedger for CountlessLedger {
        async fn save(&self, ticket: &Ticket) -> CoreResult<TicketId> {
            self.0.save(ticket).await
        }

        async fn find_latest_by_registration(&self, reg: &str) -> CoreResult<Option<Ticket>> {
            self.0.find_latest_by_registration(reg).await
        }

        async fn update(&self, ticket: &Ticket) -> CoreResult<bool> {
            self.0.update(ticket).await
        }

        async fn count_closed_tickets(&self, _reg: &str) -> CoreResult<u64> {
            Err(CoreError::store("count query timed out"))
        }
    }

    #[tokio::test]
    async fn test_recurrence_failure_does_not_block_entry() {
        let spots = Arc::new(InMemorySpotDirectory::standard_layout());
        let console = Arc::new(ScriptedConsole::new(["1", "ABCDEF"]));
        let service = ParkingService::new(
            spots.clone(),
            Arc::new(CountlessLedger(InMemoryTicketLedger::new())),
            console.clone(),
        );

        let receipt = service.process_incoming_vehicle().await.unwrap();

        assert_eq!(receipt.spot_number, 1);
        assert!(!receipt.recurring);
        assert!(console.printed("Generated Ticket and saved in DB"));
    }

    #[tokio::test]
    async fn test_entry_applies_in_time_offset() {
        let fx = Fixture::standard();
        fx.input(&["1", "ABCDEF"]);

        let service = fx.service().with_options(ServiceOptions {
            in_time_offset: Duration::seconds(1),
            ..ServiceOptions::default()
        });
        let receipt = service.process_incoming_vehicle().await.unwrap();

        assert_eq!(receipt.in_time, fx.clock.now() - Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_entry_offset_out_of_range_releases_spot() {
        let fx = Fixture::standard();
        fx.input(&["1", "ABCDEF"]);

        let service = fx.service().with_options(ServiceOptions {
            in_time_offset: Duration::seconds(9_000_000_000_000),
            ..ServiceOptions::default()
        });
        let err = service.process_incoming_vehicle().await.unwrap_err();

        assert!(matches!(err, CoreError::InvalidStay { .. }));
        assert!(fx.tickets.tickets().is_empty());
        assert!(fx.spots.spot(1).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_entry_never_hands_out_spot_zero() {
        let fx = Fixture::new(InMemorySpotDirectory::with_spots([ParkingSpot::new(
            0,
            VehicleType::Car,
            true,
        )]));
        fx.input(&["1", "ABCDEF"]);

        let err = fx.service().process_incoming_vehicle().await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::NoAvailableSpot {
                vehicle_type: VehicleType::Car
            }
        ));
        assert!(fx.tickets.tickets().is_empty());
        assert!(fx.spots.spot(0).unwrap().is_available());
    }

    // -------------------------------------------------------------------------
    // Exit
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_exit_car_after_one_hour() {
        let fx = Fixture::standard();
        let service = fx.service();
        fx.input(&["1", "AB125XY"]);
        service.process_incoming_vehicle().await.unwrap();

        fx.clock.advance(Duration::minutes(60));
        fx.input(&["AB125XY"]);
        let receipt = service.process_exiting_vehicle().await.unwrap();

        assert!(receipt.fare.approx_eq(Price::new(1.5)));
        assert_eq!(receipt.discount_rate, 0.0);
        assert_eq!(receipt.out_time, fx.clock.now());
        assert!(fx.spots.spot(1).unwrap().is_available());

        let stored = &fx.tickets.tickets()[0];
        assert_eq!(stored.out_time(), Some(fx.clock.now()));
        assert!(stored.price().approx_eq(Price::new(1.5)));
        assert!(fx.console.printed("Please pay the parking fare: $1.50"));
    }

    #[tokio::test]
    async fn test_exit_bike_after_forty_five_minutes() {
        let fx = Fixture::standard();
        let service = fx.service();
        fx.input(&["2", "BIKE01"]);
        service.process_incoming_vehicle().await.unwrap();

        fx.clock.advance(Duration::minutes(45));
        fx.input(&["BIKE01"]);
        let receipt = service.process_exiting_vehicle().await.unwrap();

        assert_eq!(receipt.spot_number, 4);
        assert!(receipt.fare.approx_eq(Price::new(0.75)));
        assert!(fx.spots.spot(4).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_exit_within_free_tier() {
        let fx = Fixture::standard();
        let service = fx.service();
        fx.input(&["1", "AB125XY"]);
        service.process_incoming_vehicle().await.unwrap();

        fx.clock.advance(Duration::minutes(29));
        fx.input(&["AB125XY"]);
        let receipt = service.process_exiting_vehicle().await.unwrap();

        assert!(receipt.fare.is_zero());
    }

    #[tokio::test]
    async fn test_exit_recurring_user_gets_discount() {
        let fx = Fixture::standard();
        fx.past_visit("ABCDEF").await;
        fx.past_visit("ABCDEF").await;
        let service = fx.service();
        fx.input(&["1", "ABCDEF"]);
        service.process_incoming_vehicle().await.unwrap();

        fx.clock.advance(Duration::minutes(60));
        fx.input(&["ABCDEF"]);
        let receipt = service.process_exiting_vehicle().await.unwrap();

        assert_eq!(receipt.discount_rate, 0.05);
        assert!(receipt.fare.approx_eq(Price::new(1.425)));
    }

    #[tokio::test]
    async fn test_exit_unknown_registration() {
        let fx = Fixture::standard();
        let service = fx.service();
        fx.input(&["1", "AB125XY"]);
        service.process_incoming_vehicle().await.unwrap();
        let before = fx.tickets.tickets();

        fx.input(&["NOPE"]);
        let err = service.process_exiting_vehicle().await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::TicketNotFound { ref vehicle_reg_number } if vehicle_reg_number == "NOPE"
        ));
        assert_eq!(fx.tickets.tickets(), before);
        assert!(!fx.spots.spot(1).unwrap().is_available());
        assert!(fx.spots.spot(2).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_exit_twice_is_ticket_not_found() {
        let fx = Fixture::standard();
        let service = fx.service();
        fx.input(&["1", "AB125XY"]);
        service.process_incoming_vehicle().await.unwrap();

        fx.clock.advance(Duration::hours(2));
        fx.input(&["AB125XY", "AB125XY"]);
        service.process_exiting_vehicle().await.unwrap();

        let err = service.process_exiting_vehicle().await.unwrap_err();
        assert!(matches!(err, CoreError::TicketNotFound { .. }));
    }

    #[tokio::test]
    async fn test_exit_update_failure_keeps_spot_occupied() {
        let fx = Fixture::standard();
        let service = fx.service();
        fx.input(&["1", "AB125XY"]);
        service.process_incoming_vehicle().await.unwrap();

        fx.tickets.set_reject_updates(true);
        fx.clock.advance(Duration::hours(1));
        fx.input(&["AB125XY"]);
        let err = service.process_exiting_vehicle().await.unwrap_err();

        assert!(matches!(err, CoreError::UpdateFailed { .. }));
        assert!(!fx.spots.spot(1).unwrap().is_available());
        assert!(fx.tickets.tickets()[0].is_open());
        assert!(fx.console.printed("Unable to update ticket information"));
    }

    #[tokio::test]
    async fn test_exit_ledger_outage() {
        let fx = Fixture::standard();
        fx.tickets.set_outage(true);
        fx.input(&["AB125XY"]);

        let err = fx.service().process_exiting_vehicle().await.unwrap_err();
        assert!(matches!(err, CoreError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_third_visit_is_discounted() {
        let fx = Fixture::standard();
        let service = fx.service();

        let mut fares = Vec::new();
        for _ in 0..3 {
            fx.input(&["1", "ABCDEF"]);
            service.process_incoming_vehicle().await.unwrap();
            fx.clock.advance(Duration::hours(2));
            fx.input(&["ABCDEF"]);
            fares.push(service.process_exiting_vehicle().await.unwrap());
            fx.clock.advance(Duration::hours(1));
        }

        assert_eq!(fares[0].discount_rate, 0.0);
        assert_eq!(fares[1].discount_rate, 0.0);
        assert_eq!(fares[2].discount_rate, 0.05);
        assert!(fares[2].fare.approx_eq(Price::new(2.0 * 1.5 * 0.95)));
        assert_eq!(fx.tickets.count_closed_tickets("ABCDEF").await.unwrap(), 3);
    }

    // -------------------------------------------------------------------------
    // Preview
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_preview_does_not_claim() {
        let fx = Fixture::standard();
        fx.input(&["2"]);

        let spot = fx
            .service()
            .get_next_parking_number_if_available()
            .await
            .unwrap();

        assert_eq!(spot.number(), 4);
        assert_eq!(spot.vehicle_type(), VehicleType::Bike);
        assert!(spot.is_available());
        assert!(fx.spots.spot(4).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_preview_full_lot() {
        let fx = Fixture::new(InMemorySpotDirectory::with_spots([ParkingSpot::new(
            1,
            VehicleType::Car,
            false,
        )]));
        fx.input(&["1"]);

        let err = fx
            .service()
            .get_next_parking_number_if_available()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoAvailableSpot { .. }));
    }

    #[tokio::test]
    async fn test_exit_release_failure_keeps_ticket_closed() {
        let fx = Fixture::standard();
        let service = fx.service();
        fx.input(&["1", "AB125XY"]);
        service.process_incoming_vehicle().await.unwrap();

        fx.clock.advance(Duration::minutes(60));
        fx.spots.set_outage(true);
        fx.input(&["AB125XY"]);
        let err = service.process_exiting_vehicle().await.unwrap_err();

        assert!(matches!(err, CoreError::StoreUnavailable(_)));
        assert!(!err.is_expected());

        // The fare is already recorded; only the spot stays taken.
        let stored = &fx.tickets.tickets()[0];
        assert!(!stored.is_open());
        assert!(stored.price().approx_eq(Price::new(1.5)));
        fx.spots.set_outage(false);
        assert!(!fx.spots.spot(1).unwrap().is_available());
        assert!(!fx.console.printed("Please pay the parking fare"));

        fx.input(&["AB125XY"]);
        assert!(matches!(
            service.process_exiting_vehicle().await,
            Err(CoreError::TicketNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_exit_spot_missing_from_directory_still_closes() {
        let fx = Fixture::standard();
        let in_time = fx.clock.now();
        let ticket = Ticket::open(ParkingSpot::new(9, VehicleType::Car, false), "AB125XY", in_time);
        fx.tickets.save(&ticket).await.unwrap();

        fx.clock.advance(Duration::minutes(60));
        fx.input(&["AB125XY"]);
        let receipt = fx.service().process_exiting_vehicle().await.unwrap();

        assert_eq!(receipt.spot_number, 9);
        assert!(receipt.fare.approx_eq(Price::new(1.5)));
        assert!(!fx.tickets.tickets()[0].is_open());
        assert!(fx.spots.spot(9).is_none());
        assert!(fx.console.printed("Please pay the parking fare: $1.50"));
    }
}
