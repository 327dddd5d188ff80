//! # Spot Repository
//!
//! Database operations for parking spots.
//!
//! ## Claiming a Spot
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  claim_next_available(CAR)                                             │
//! │                                                                         │
//! │  UPDATE parking SET available = 0                                      │
//! │  WHERE parking_number = (SELECT MIN(parking_number) FROM parking       │
//! │                          WHERE available = 1 AND type = 'CAR')         │
//! │  RETURNING ...                                                         │
//! │                                                                         │
//! │  ┌────────┬──────┬───────────┐                                         │
//! │  │ number │ type │ available │                                         │
//! │  ├────────┼──────┼───────────┤                                         │
//! │  │   1    │ CAR  │     0     │                                         │
//! │  │   2    │ CAR  │   1 → 0   │ ← lowest free CAR spot, claimed         │
//! │  │   3    │ CAR  │     1     │                                         │
//! │  │   4    │ BIKE │     1     │                                         │
//! │  └────────┴──────┴───────────┘                                         │
//! │                                                                         │
//! │  One statement: two shells on the same file never get the same spot. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use parkit_core::{CoreResult, ParkingSpot, SpotDirectory, VehicleType};

#[derive(Debug, sqlx::FromRow)]
struct SpotRow {
    parking_number: i64,
    #[sqlx(rename = "type")]
    vehicle_type: String,
    available: bool,
}

impl SpotRow {
    fn into_spot(self) -> DbResult<ParkingSpot> {
        let number = spot_number(self.parking_number)?;
        let vehicle_type: VehicleType = self.vehicle_type.parse()?;
        Ok(ParkingSpot::new(number, vehicle_type, self.available))
    }
}

fn spot_number(raw: i64) -> DbResult<u32> {
    u32::try_from(raw).map_err(|_| DbError::Internal(format!("spot number {} out of range", raw)))
}

/// Repository for parking spot operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = SpotRepository::new(pool);
///
/// let next = repo.find_next_available(VehicleType::Bike).await?;
/// let added = repo.provision(VehicleType::Car, 10).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SpotRepository {
    pool: SqlitePool,
}

impl SpotRepository {
    /// Creates a new SpotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SpotRepository { pool }
    }

    /// Gets a spot by number.
    pub async fn get(&self, number: u32) -> DbResult<Option<ParkingSpot>> {
        let row = sqlx::query_as::<_, SpotRow>(
            "SELECT parking_number, type, available FROM parking WHERE parking_number = ?1",
        )
        .bind(i64::from(number))
        .fetch_optional(&self.pool)
        .await?;

        row.map(SpotRow::into_spot).transpose()
    }

    /// Lists every spot, ordered by number.
    pub async fn list(&self) -> DbResult<Vec<ParkingSpot>> {
        let rows = sqlx::query_as::<_, SpotRow>(
            "SELECT parking_number, type, available FROM parking ORDER BY parking_number",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SpotRow::into_spot).collect()
    }

    /// Counts free spots of a type.
    pub async fn count_available(&self, vehicle_type: VehicleType) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM parking WHERE available = 1 AND type = ?1")
                .bind(vehicle_type)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Inserts one spot with an explicit number.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the number is already taken
    pub async fn insert(&self, spot: &ParkingSpot) -> DbResult<()> {
        debug!(spot = spot.number(), vehicle_type = %spot.vehicle_type(), "Inserting spot");

        sqlx::query("INSERT INTO parking (parking_number, type, available) VALUES (?1, ?2, ?3)")
            .bind(i64::from(spot.number()))
            .bind(spot.vehicle_type())
            .bind(spot.is_available())
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                    field,
                    value: spot.number().to_string(),
                },
                other => other,
            })?;

        Ok(())
    }

    /// Appends `count` free spots of a type, numbered after the current highest.
    ///
    /// ## Returns
    /// The spots created, in number order. Empty when `count` is zero.
    pub async fn provision(
        &self,
        vehicle_type: VehicleType,
        count: u32,
    ) -> DbResult<Vec<ParkingSpot>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let highest: Option<i64> = sqlx::query_scalar("SELECT MAX(parking_number) FROM parking")
            .fetch_one(&mut *tx)
            .await?;
        let highest = spot_number(highest.unwrap_or(0))?;
        let (first, last) = highest
            .checked_add(1)
            .and_then(|first| Some((first, first.checked_add(count - 1)?)))
            .ok_or_else(|| {
                DbError::Internal(format!(
                    "cannot number {} more spots after spot {}",
                    count, highest
                ))
            })?;

        let mut created = Vec::new();
        for number in first..=last {
            sqlx::query("INSERT INTO parking (parking_number, type, available) VALUES (?1, ?2, 1)")
                .bind(i64::from(number))
                .bind(vehicle_type)
                .execute(&mut *tx)
                .await?;
            created.push(ParkingSpot::new(number, vehicle_type, true));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(%vehicle_type, first, count, "Spots provisioned");
        Ok(created)
    }

    async fn next_available(&self, vehicle_type: VehicleType) -> DbResult<Option<u32>> {
        let number: Option<i64> = sqlx::query_scalar(
            "SELECT MIN(parking_number) FROM parking WHERE available = 1 AND type = ?1",
        )
        .bind(vehicle_type)
        .fetch_one(&self.pool)
        .await?;

        number.map(spot_number).transpose()
    }

    async fn mark(&self, number: u32, available: bool) -> DbResult<bool> {
        debug!(spot = number, available, "Updating spot availability");

        let result = sqlx::query("UPDATE parking SET available = ?2 WHERE parking_number = ?1")
            .bind(i64::from(number))
            .bind(available)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn claim(&self, vehicle_type: VehicleType) -> DbResult<Option<ParkingSpot>> {
        let row = sqlx::query_as::<_, SpotRow>(
            r#"
            UPDATE parking SET available = 0
            WHERE parking_number = (
                SELECT MIN(parking_number) FROM parking
                WHERE available = 1 AND type = ?1
            )
            RETURNING parking_number, type, available
            "#,
        )
        .bind(vehicle_type)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SpotRow::into_spot).transpose()
    }
}

#[async_trait]
impl SpotDirectory for SpotRepository {
    async fn find_next_available(&self, vehicle_type: VehicleType) -> CoreResult<Option<u32>> {
        Ok(self.next_available(vehicle_type).await?)
    }

    async fn set_availability(&self, spot_number: u32, available: bool) -> CoreResult<bool> {
        Ok(self.mark(spot_number, available).await?)
    }

    async fn claim_next_available(
        &self,
        vehicle_type: VehicleType,
    ) -> CoreResult<Option<ParkingSpot>> {
        Ok(self.claim(vehicle_type).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use parkit_core::CoreError;

    async fn repo() -> SpotRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().spots()
    }

    #[tokio::test]
    async fn test_find_next_available_is_lowest_free() {
        let repo = repo().await;

        assert_eq!(repo.find_next_available(VehicleType::Car).await.unwrap(), Some(1));
        assert_eq!(repo.find_next_available(VehicleType::Bike).await.unwrap(), Some(4));

        assert!(repo.set_availability(1, false).await.unwrap());
        assert_eq!(repo.find_next_available(VehicleType::Car).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_set_availability_unknown_spot() {
        let repo = repo().await;
        assert!(!repo.set_availability(42, false).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_until_full() {
        let repo = repo().await;

        let first = repo.claim_next_available(VehicleType::Bike).await.unwrap();
        let second = repo.claim_next_available(VehicleType::Bike).await.unwrap();
        let third = repo.claim_next_available(VehicleType::Bike).await.unwrap();

        assert_eq!(first.map(|s| s.number()), Some(4));
        assert_eq!(second.map(|s| s.number()), Some(5));
        assert!(third.is_none());
        assert_eq!(repo.count_available(VehicleType::Bike).await.unwrap(), 0);
        assert_eq!(repo.count_available(VehicleType::Car).await.unwrap(), 3);

        let spot = repo.get(4).await.unwrap().unwrap();
        assert!(!spot.is_available());
        assert_eq!(spot.vehicle_type(), VehicleType::Bike);
    }

    #[tokio::test]
    async fn test_provision_appends_after_highest() {
        let repo = repo().await;

        let added = repo.provision(VehicleType::Car, 2).await.unwrap();
        let numbers: Vec<u32> = added.iter().map(ParkingSpot::number).collect();
        assert_eq!(numbers, vec![6, 7]);

        assert_eq!(repo.count_available(VehicleType::Car).await.unwrap(), 5);
        assert!(repo.provision(VehicleType::Bike, 0).await.unwrap().is_empty());
        assert_eq!(repo.list().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_insert_duplicate_number() {
        let repo = repo().await;

        repo.insert(&ParkingSpot::new(10, VehicleType::Bike, true))
            .await
            .unwrap();
        assert_eq!(repo.find_next_available(VehicleType::Bike).await.unwrap(), Some(4));

        let err = repo
            .insert(&ParkingSpot::new(2, VehicleType::Car, true))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "2"));
    }

    #[tokio::test]
    async fn test_unknown_type_in_storage() {
        let repo = repo().await;
        sqlx::query("INSERT INTO parking (parking_number, type, available) VALUES (9, 'TRUCK', 1)")
            .execute(&repo.pool)
            .await
            .unwrap();

        let err: CoreError = repo.get(9).await.unwrap_err().into();
        assert!(matches!(err, CoreError::UnknownVehicleType(ref code) if code == "TRUCK"));
    }

    #[tokio::test]
    async fn test_provision_past_highest_number_fails_cleanly() {
        let repo = repo().await;
        repo.insert(&ParkingSpot::new(u32::MAX, VehicleType::Car, true))
            .await
            .unwrap();

        let err = repo.provision(VehicleType::Car, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
        assert_eq!(repo.list().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_provision_count_overflow_adds_nothing() {
        let repo = repo().await;

        let err = repo.provision(VehicleType::Bike, u32::MAX).await.unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
        assert_eq!(repo.list().await.unwrap().len(), 5);
        assert_eq!(repo.count_available(VehicleType::Bike).await.unwrap(), 2);
    }
}
