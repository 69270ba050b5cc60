//! Persistence layer: store/directory traits and their Postgres implementations
//!
//! The booking engine never talks to the database directly; it holds handles
//! to the two traits below so tests can inject doubles and the engine owns no
//! global state.

pub mod bookings;
pub mod directory;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{BookingDetails, BookingStatus, NewBooking, OverlapPolicy, StateFilter},
        item::ItemSummary,
    },
};

/// Durable collection of bookings.
///
/// `create` must execute its conflict check and the insert as one atomic unit
/// serialized per item; `decide` must be guarded so a booking is decided at
/// most once even under concurrent calls.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Persist a new `Waiting` booking unless an approved booking conflicts
    /// under `policy`.
    async fn create(&self, booking: &NewBooking, policy: OverlapPolicy) -> AppResult<BookingDetails>;

    /// Booking with booker and item joined in, or `None` if it does not exist.
    async fn find_details(&self, booking_id: i64) -> AppResult<Option<BookingDetails>>;

    /// Move a `Waiting` booking to `status` and return the updated details.
    async fn decide(&self, booking_id: i64, status: BookingStatus) -> AppResult<BookingDetails>;

    /// Bookings requested by `booker_id` matching `filter` at instant `now`,
    /// ordered by start date descending.
    async fn list_for_booker(
        &self,
        booker_id: i64,
        filter: StateFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>>;

    /// Bookings on items owned by `owner_id` matching `filter` at instant
    /// `now`, ordered by start date descending.
    async fn list_for_owner(
        &self,
        owner_id: i64,
        filter: StateFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>>;
}

/// Lookup of users and items owned by the account/catalog collaborators.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    async fn user_exists(&self, user_id: i64) -> AppResult<bool>;

    /// Ownership and availability of an item, or `None` if it does not exist.
    async fn find_item(&self, item_id: i64) -> AppResult<Option<ItemSummary>>;
}

/// Run a store operation under a bounded timeout. Elapse is reported as
/// `Unavailable`, distinct from the business failures.
pub(crate) async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Unavailable(format!("{} timed out", what))),
    }
}

/// Main repository struct holding the database-backed implementations
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub bookings: bookings::BookingsRepository,
    pub directory: directory::DirectoryRepository,
}

impl Repository {
    /// Create a new repository with the given database pool. Every statement
    /// issued through it is bounded by `statement_timeout`.
    pub fn new(pool: Pool<Postgres>, statement_timeout: Duration) -> Self {
        Self {
            bookings: bookings::BookingsRepository::new(pool.clone(), statement_timeout),
            directory: directory::DirectoryRepository::new(pool.clone(), statement_timeout),
            pool,
        }
    }
}
