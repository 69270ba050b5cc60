//! Bookings repository: Postgres-backed reservation store

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{BookingDetails, BookingStatus, NewBooking, OverlapPolicy, StateFilter},
        item::ItemRef,
        user::UserRef,
    },
    repository::{bounded, ReservationStore},
};

/// Booking with booker and item joined in, one row per booking.
const DETAILS_SELECT: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status,
           u.id AS booker_id, u.name AS booker_name, u.email AS booker_email,
           i.id AS item_id, i.name AS item_name, i.owner_id AS item_owner_id,
           i.available AS item_available
    FROM bookings b
    JOIN users u ON b.booker_id = u.id
    JOIN items i ON b.item_id = i.id
"#;

fn details_from_row(row: &PgRow) -> BookingDetails {
    let status: String = row.get("status");
    BookingDetails {
        id: row.get("id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: BookingStatus::from(status.as_str()),
        booker: UserRef {
            id: row.get("booker_id"),
            name: row.get("booker_name"),
            email: row.get("booker_email"),
        },
        item: ItemRef {
            id: row.get("item_id"),
            name: row.get("item_name"),
            owner_id: row.get("item_owner_id"),
            available: row.get("item_available"),
        },
    }
}

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
    timeout: Duration,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn get_details(&self, booking_id: i64) -> AppResult<Option<BookingDetails>> {
        let row = sqlx::query(&format!("{} WHERE b.id = $1", DETAILS_SELECT))
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(details_from_row))
    }

    async fn get_details_required(&self, booking_id: i64) -> AppResult<BookingDetails> {
        self.get_details(booking_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Booking with id {} not found", booking_id))
        })
    }

    async fn create_inner(
        &self,
        booking: &NewBooking,
        policy: OverlapPolicy,
    ) -> AppResult<BookingDetails> {
        let mut tx = self.pool.begin().await?;

        // Per-item mutual exclusion for the whole check-then-insert unit, so
        // two concurrent creations on the same item cannot both pass the
        // conflict probe.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(booking.item_id)
            .execute(&mut *tx)
            .await?;

        // SQL mirror of OverlapPolicy::conflicts.
        let conflict_sql = match policy {
            OverlapPolicy::Endpoints => {
                "SELECT EXISTS(
                     SELECT 1 FROM bookings
                     WHERE item_id = $1 AND status = 'APPROVED'
                       AND ((start_date BETWEEN $2 AND $3) OR (end_date BETWEEN $2 AND $3))
                 )"
            }
            OverlapPolicy::Full => {
                "SELECT EXISTS(
                     SELECT 1 FROM bookings
                     WHERE item_id = $1 AND status = 'APPROVED'
                       AND start_date < $3 AND end_date > $2
                 )"
            }
        };

        let conflict: bool = sqlx::query_scalar(conflict_sql)
            .bind(booking.item_id)
            .bind(booking.start_date)
            .bind(booking.end_date)
            .fetch_one(&mut *tx)
            .await?;

        if conflict {
            return Err(AppError::Validation(
                "item is already booked for the requested dates".to_string(),
            ));
        }

        let booking_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bookings (item_id, booker_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, 'WAITING')
            RETURNING id
            "#,
        )
        .bind(booking.item_id)
        .bind(booking.booker_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_details_required(booking_id).await
    }

    async fn decide_inner(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> AppResult<BookingDetails> {
        // Guarded update: only a still-waiting booking transitions, so a
        // racing second decision affects zero rows.
        let updated = sqlx::query(
            "UPDATE bookings SET status = $1 WHERE id = $2 AND status = 'WAITING'",
        )
        .bind(status.as_str())
        .bind(booking_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return match self.get_details(booking_id).await? {
                Some(_) => Err(AppError::Validation("booking already decided".to_string())),
                None => Err(AppError::NotFound(format!(
                    "Booking with id {} not found",
                    booking_id
                ))),
            };
        }

        self.get_details_required(booking_id).await
    }

    async fn list_inner(
        &self,
        scope_column: &str,
        scope_id: i64,
        filter: StateFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>> {
        let base = format!("{} WHERE {} = $1", DETAILS_SELECT, scope_column);
        let order = " ORDER BY b.start_date DESC";

        let rows = match filter {
            StateFilter::All => {
                sqlx::query(&format!("{}{}", base, order))
                    .bind(scope_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            StateFilter::Current => {
                sqlx::query(&format!(
                    "{} AND b.start_date <= $2 AND b.end_date >= $2{}",
                    base, order
                ))
                .bind(scope_id)
                .bind(now)
                .fetch_all(&self.pool)
                .await?
            }
            StateFilter::Past => {
                sqlx::query(&format!("{} AND b.end_date < $2{}", base, order))
                    .bind(scope_id)
                    .bind(now)
                    .fetch_all(&self.pool)
                    .await?
            }
            StateFilter::Future => {
                sqlx::query(&format!("{} AND b.start_date > $2{}", base, order))
                    .bind(scope_id)
                    .bind(now)
                    .fetch_all(&self.pool)
                    .await?
            }
            StateFilter::Waiting => {
                sqlx::query(&format!("{} AND b.status = $2{}", base, order))
                    .bind(scope_id)
                    .bind(BookingStatus::Waiting.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            StateFilter::Rejected => {
                sqlx::query(&format!("{} AND b.status = $2{}", base, order))
                    .bind(scope_id)
                    .bind(BookingStatus::Rejected.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.iter().map(details_from_row).collect())
    }
}

#[async_trait]
impl ReservationStore for BookingsRepository {
    async fn create(
        &self,
        booking: &NewBooking,
        policy: OverlapPolicy,
    ) -> AppResult<BookingDetails> {
        bounded(self.timeout, "booking creation", self.create_inner(booking, policy)).await
    }

    async fn find_details(&self, booking_id: i64) -> AppResult<Option<BookingDetails>> {
        bounded(self.timeout, "booking lookup", self.get_details(booking_id)).await
    }

    async fn decide(&self, booking_id: i64, status: BookingStatus) -> AppResult<BookingDetails> {
        bounded(self.timeout, "booking decision", self.decide_inner(booking_id, status)).await
    }

    async fn list_for_booker(
        &self,
        booker_id: i64,
        filter: StateFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>> {
        bounded(
            self.timeout,
            "booker listing",
            self.list_inner("b.booker_id", booker_id, filter, now),
        )
        .await
    }

    async fn list_for_owner(
        &self,
        owner_id: i64,
        filter: StateFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>> {
        bounded(
            self.timeout,
            "owner listing",
            self.list_inner("i.owner_id", owner_id, filter, now),
        )
        .await
    }
}
