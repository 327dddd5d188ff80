//! # Ticket Repository
//!
//! Database operations for tickets.
//!
//! ## Ticket Row Lifecycle
//! ```text
//! entry:  INSERT  (parking_number, reg, price = 0, in_time, out_time = NULL)
//!            │
//!            ▼
//! exit:   UPDATE  price = fare, out_time = now   WHERE id = ?
//! ```
//!
//! Tickets are read joined with `parking` so the spot snapshot carries its
//! vehicle type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use parkit_core::{CoreResult, ParkingSpot, Price, Ticket, TicketId, TicketLedger, VehicleType};

const SELECT_TICKET: &str = r#"
    SELECT
        t.id,
        t.parking_number,
        p.type AS vehicle_type,
        p.available,
        t.vehicle_reg_number,
        t.price,
        t.in_time,
        t.out_time
    FROM ticket t
    INNER JOIN parking p ON p.parking_number = t.parking_number
"#;

#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: i64,
    parking_number: i64,
    vehicle_type: String,
    available: bool,
    vehicle_reg_number: String,
    price: f64,
    in_time: DateTime<Utc>,
    out_time: Option<DateTime<Utc>>,
}

impl TicketRow {
    fn into_ticket(self) -> DbResult<Ticket> {
        let number = u32::try_from(self.parking_number).map_err(|_| {
            DbError::Internal(format!("spot number {} out of range", self.parking_number))
        })?;
        let vehicle_type: VehicleType = self.vehicle_type.parse()?;

        let ticket = Ticket::restore(
            self.id,
            ParkingSpot::new(number, vehicle_type, self.available),
            self.vehicle_reg_number,
            Price::new(self.price),
            self.in_time,
            self.out_time,
        )?;

        Ok(ticket)
    }
}

/// Repository for ticket operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Creates a new TicketRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TicketRepository { pool }
    }

    /// Gets a ticket by id.
    pub async fn get(&self, id: TicketId) -> DbResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(&format!("{SELECT_TICKET} WHERE t.id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TicketRow::into_ticket).transpose()
    }

    /// Every ticket for a registration number, oldest first.
    pub async fn history(&self, vehicle_reg_number: &str) -> DbResult<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "{SELECT_TICKET} WHERE t.vehicle_reg_number = ?1 ORDER BY t.id"
        ))
        .bind(vehicle_reg_number)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TicketRow::into_ticket).collect()
    }

    /// Inserts a ticket and returns its new id.
    async fn insert(&self, ticket: &Ticket) -> DbResult<TicketId> {
        debug!(
            spot = ticket.spot().number(),
            vehicle = %ticket.vehicle_reg_number(),
            "Inserting ticket"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO ticket (parking_number, vehicle_reg_number, price, in_time, out_time)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(i64::from(ticket.spot().number()))
        .bind(ticket.vehicle_reg_number())
        .bind(ticket.price().amount())
        .bind(ticket.in_time())
        .bind(ticket.out_time())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Open ticket first, then latest out-time, then highest id.
    async fn latest_by_registration(&self, vehicle_reg_number: &str) -> DbResult<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            r#"{SELECT_TICKET}
            WHERE t.vehicle_reg_number = ?1
            ORDER BY (t.out_time IS NULL) DESC, t.out_time DESC, t.id DESC
            LIMIT 1
            "#
        ))
        .bind(vehicle_reg_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TicketRow::into_ticket).transpose()
    }

    /// Writes the exit fields. False when no row matched.
    async fn record_exit(&self, ticket: &Ticket) -> DbResult<bool> {
        let Some(id) = ticket.id() else {
            return Ok(false);
        };

        debug!(id, "Recording ticket exit");

        let result = sqlx::query("UPDATE ticket SET price = ?2, out_time = ?3 WHERE id = ?1")
            .bind(id)
            .bind(ticket.price().amount())
            .bind(ticket.out_time())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_closed(&self, vehicle_reg_number: &str) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM ticket WHERE vehicle_reg_number = ?1 AND out_time IS NOT NULL",
        )
        .bind(vehicle_reg_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl TicketLedger for TicketRepository {
    async fn save(&self, ticket: &Ticket) -> CoreResult<TicketId> {
        Ok(self.insert(ticket).await?)
    }

    async fn find_latest_by_registration(
        &self,
        vehicle_reg_number: &str,
    ) -> CoreResult<Option<Ticket>> {
        Ok(self.latest_by_registration(vehicle_reg_number).await?)
    }

    async fn update(&self, ticket: &Ticket) -> CoreResult<bool> {
        Ok(self.record_exit(ticket).await?)
    }

    async fn count_closed_tickets(&self, vehicle_reg_number: &str) -> CoreResult<u64> {
        Ok(self.count_closed(vehicle_reg_number).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
