//! In-memory store implementations.
//!
//! [`InMemorySpotDirectory`] and [`InMemoryTicketLedger`] back the
//! orchestrator in tests and in throwaway shell sessions.
//!
//! ## Limitations
//!
//! - **No persistence**: All state is lost when the process exits
//! - **Single-process only**: Nothing is shared across process boundaries
//!
//! Both stores have an outage switch that makes every call fail with
//! [`CoreError::StoreUnavailable`], for exercising failure paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{SpotDirectory, TicketLedger};
use crate::error::{CoreError, CoreResult};
use crate::types::{ParkingSpot, Ticket, TicketId, VehicleType};

/// Converts a lock poison error to a store error.
fn poisoned<T>(_: PoisonError<T>) -> CoreError {
    CoreError::store("in-memory store lock poisoned")
}

// =============================================================================
// Spot Directory
// =============================================================================

/// Spot directory held in a `BTreeMap` keyed by spot number.
#[derive(Debug, Default)]
pub struct InMemorySpotDirectory {
    spots: RwLock<BTreeMap<u32, ParkingSpot>>,
    outage: AtomicBool,
}

impl InMemorySpotDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding the given spots.
    pub fn with_spots(spots: impl IntoIterator<Item = ParkingSpot>) -> Self {
        let spots = spots.into_iter().map(|s| (s.number(), s)).collect();
        InMemorySpotDirectory {
            spots: RwLock::new(spots),
            outage: AtomicBool::new(false),
        }
    }

    /// The default lot: spots 1-3 for cars, 4-5 for bikes, all free.
    pub fn standard_layout() -> Self {
        Self::with_spots(
            (1..=3)
                .map(|n| ParkingSpot::new(n, VehicleType::Car, true))
                .chain((4..=5).map(|n| ParkingSpot::new(n, VehicleType::Bike, true))),
        )
    }

    /// Current state of a spot.
    pub fn spot(&self, number: u32) -> Option<ParkingSpot> {
        self.spots
            .read()
            .ok()
            .and_then(|spots| spots.get(&number).cloned())
    }

    /// Makes every call fail while `down` is true.
    pub fn set_outage(&self, down: bool) {
        self.outage.store(down, Ordering::SeqCst);
    }

    fn check_up(&self) -> CoreResult<()> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(CoreError::store("spot directory is down"));
        }
        Ok(())
    }
}

#[async_trait]
impl SpotDirectory for InMemorySpotDirectory {
    async fn find_next_available(&self, vehicle_type: VehicleType) -> CoreResult<Option<u32>> {
        self.check_up()?;
        let spots = self.spots.read().map_err(poisoned)?;

        Ok(spots
            .values()
            .find(|s| s.is_available() && s.vehicle_type() == vehicle_type)
            .map(ParkingSpot::number))
    }

    async fn set_availability(&self, spot_number: u32, available: bool) -> CoreResult<bool> {
        self.check_up()?;
        let mut spots = self.spots.write().map_err(poisoned)?;

        match spots.get_mut(&spot_number) {
            Some(spot) => {
                spot.set_available(available);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn claim_next_available(
        &self,
        vehicle_type: VehicleType,
    ) -> CoreResult<Option<ParkingSpot>> {
        self.check_up()?;
        // Find and mark under one write lock.
        let mut spots = self.spots.write().map_err(poisoned)?;

        let claimed = spots
            .values_mut()
            .find(|s| s.is_available() && s.vehicle_type() == vehicle_type)
            .map(|spot| {
                spot.set_available(false);
                spot.clone()
            });

        Ok(claimed)
    }
}

// =============================================================================
// Ticket Ledger
// =============================================================================

#[derive(Debug, Default)]
struct LedgerState {
    tickets: Vec<Ticket>,
    last_id: TicketId,
}

/// Ticket ledger held in a `Vec`, ids assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct InMemoryTicketLedger {
    state: RwLock<LedgerState>,
    outage: AtomicBool,
    reject_updates: AtomicBool,
}

impl InMemoryTicketLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored ticket, in insertion order.
    pub fn tickets(&self) -> Vec<Ticket> {
        self.state
            .read()
            .map(|state| state.tickets.clone())
            .unwrap_or_default()
    }

    /// Makes every call fail while `down` is true.
    pub fn set_outage(&self, down: bool) {
        self.outage.store(down, Ordering::SeqCst);
    }

    /// Makes `update` match no row while `reject` is true.
    pub fn set_reject_updates(&self, reject: bool) {
        self.reject_updates.store(reject, Ordering::SeqCst);
    }

    fn check_up(&self) -> CoreResult<()> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(CoreError::store("ticket ledger is down"));
        }
        Ok(())
    }
}

#[async_trait]
impl TicketLedger for InMemoryTicketLedger {
    async fn save(&self, ticket: &Ticket) -> CoreResult<TicketId> {
        self.check_up()?;
        let mut state = self.state.write().map_err(poisoned)?;

        state.last_id += 1;
        let id = state.last_id;

        let mut stored = ticket.clone();
        stored.assign_id(id);
        state.tickets.push(stored);

        Ok(id)
    }

    async fn find_latest_by_registration(
        &self,
        vehicle_reg_number: &str,
    ) -> CoreResult<Option<Ticket>> {
        self.check_up()?;
        let state = self.state.read().map_err(poisoned)?;

        Ok(state
            .tickets
            .iter()
            .filter(|t| t.vehicle_reg_number() == vehicle_reg_number)
            .max_by_key(|t| (t.is_open(), t.out_time(), t.id()))
            .cloned())
    }

    async fn update(&self, ticket: &Ticket) -> CoreResult<bool> {
        self.check_up()?;
        if self.reject_updates.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let Some(id) = ticket.id() else {
            return Ok(false);
        };

        let mut state = self.state.write().map_err(poisoned)?;
        match state.tickets.iter_mut().find(|t| t.id() == Some(id)) {
            Some(stored) => {
                *stored = ticket.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_closed_tickets(&self, vehicle_reg_number: &str) -> CoreResult<u64> {
        self.check_up()?;
        let state = self.state.read().map_err(poisoned)?;

        Ok(state
            .tickets
            .iter()
            .filter(|t| t.vehicle_reg_number() == vehicle_reg_number && !t.is_open())
            .count() as u64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Price;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_find_next_available_lowest_number() {
        let spots = InMemorySpotDirectory::standard_layout();
        assert_eq!(spots.find_next_available(VehicleType::Car).await.unwrap(), Some(1));
        assert_eq!(spots.find_next_available(VehicleType::Bike).await.unwrap(), Some(4));

        spots.set_availability(1, false).await.unwrap();
        assert_eq!(spots.find_next_available(VehicleType::Car).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_claim_until_full() {
        let spots = InMemorySpotDirectory::standard_layout();

        let first = spots.claim_next_available(VehicleType::Bike).await.unwrap();
        let second = spots.claim_next_available(VehicleType::Bike).await.unwrap();
        let third = spots.claim_next_available(VehicleType::Bike).await.unwrap();

        assert_eq!(first.map(|s| s.number()), Some(4));
        assert_eq!(second.map(|s| s.number()), Some(5));
        assert!(third.is_none());
        assert!(!spots.spot(4).unwrap().is_available());
    }

    #[tokio::test]
    async fn test_set_availability_unknown_spot() {
        let spots = InMemorySpotDirectory::standard_layout();
        assert!(!spots.set_availability(99, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_outage() {
        let spots = InMemorySpotDirectory::standard_layout();
        spots.set_outage(true);
        assert!(matches!(
            spots.find_next_available(VehicleType::Car).await,
            Err(CoreError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_ledger_latest_prefers_open_ticket() {
        let ledger = InMemoryTicketLedger::new();
        let spot = ParkingSpot::new(1, VehicleType::Car, false);
        let t0 = Utc::now() - Duration::hours(5);

        let mut closed = Ticket::open(spot.clone(), "ABCDEF", t0);
        closed.close(t0 + Duration::hours(1), Price::new(1.5)).unwrap();
        ledger.save(&closed).await.unwrap();

        let open = Ticket::open(spot, "ABCDEF", t0 + Duration::hours(3));
        let open_id = ledger.save(&open).await.unwrap();

        let latest = ledger
            .find_latest_by_registration("ABCDEF")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id(), Some(open_id));
        assert!(latest.is_open());

        assert!(ledger
            .find_latest_by_registration("ZZZ")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_ledger_update_and_count() {
        let ledger = InMemoryTicketLedger::new();
        let in_time = Utc::now() - Duration::hours(2);
        let mut ticket = Ticket::open(ParkingSpot::new(2, VehicleType::Car, false), "ABCDEF", in_time);

        assert!(!ledger.update(&ticket).await.unwrap());

        let id = ledger.save(&ticket).await.unwrap();
        ticket.assign_id(id);
        assert_eq!(ledger.count_closed_tickets("ABCDEF").await.unwrap(), 0);

        ticket.close(in_time + Duration::hours(2), Price::new(3.0)).unwrap();
        assert!(ledger.update(&ticket).await.unwrap());
        assert_eq!(ledger.count_closed_tickets("ABCDEF").await.unwrap(), 1);

        ledger.set_reject_updates(true);
        assert!(!ledger.update(&ticket).await.unwrap());
    }
}
