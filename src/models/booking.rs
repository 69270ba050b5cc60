//! Booking model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{item::ItemRef, user::UserRef};

// ---------------------------------------------------------------------------
// BookingStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a booking.
///
/// Every booking is created `Waiting` and is decided exactly once by the item
/// owner into `Approved` or `Rejected`. `Cancelled` is part of the vocabulary
/// (and of the database CHECK) but no operation currently transitions into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    /// Database representation (TEXT column).
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl From<&str> for BookingStatus {
    fn from(v: &str) -> Self {
        match v {
            "APPROVED" => BookingStatus::Approved,
            "REJECTED" => BookingStatus::Rejected,
            "CANCELLED" => BookingStatus::Cancelled,
            _ => BookingStatus::Waiting,
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StateFilter
// ---------------------------------------------------------------------------

/// Selector for the booking listing endpoints.
///
/// `Current`/`Past`/`Future` classify against a single reference instant
/// captured once per call. `Approved` and `Cancelled` are deliberately not
/// selectable here; the query surface only ever exposed these six values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl StateFilter {
    /// Case-insensitive parse; `None` for any value outside the query surface.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Some(StateFilter::All),
            "CURRENT" => Some(StateFilter::Current),
            "PAST" => Some(StateFilter::Past),
            "FUTURE" => Some(StateFilter::Future),
            "WAITING" => Some(StateFilter::Waiting),
            "REJECTED" => Some(StateFilter::Rejected),
            _ => None,
        }
    }

    /// Whether a booking window/status matches this filter at instant `now`.
    pub fn matches(self, booking: &BookingDetails, now: DateTime<Utc>) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Current => booking.start_date <= now && now <= booking.end_date,
            StateFilter::Past => booking.end_date < now,
            StateFilter::Future => booking.start_date > now,
            StateFilter::Waiting => booking.status == BookingStatus::Waiting,
            StateFilter::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// OverlapPolicy
// ---------------------------------------------------------------------------

/// Conflict predicate between a candidate window and an existing approved
/// booking, selected in configuration (`booking.overlap_policy`).
///
/// `Endpoints` reproduces the historical behavior: an existing booking
/// conflicts only if one of its own endpoints lies within the candidate
/// window (inclusive). This misses an existing window that strictly contains
/// the candidate. `Full` is the complete interval-overlap test and is the
/// default. The Postgres store implements the same two predicates in SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    Endpoints,
    Full,
}

impl Default for OverlapPolicy {
    fn default() -> Self {
        OverlapPolicy::Full
    }
}

impl OverlapPolicy {
    /// True if an existing `[existing_start, existing_end]` window conflicts
    /// with a candidate `[start, end]` window under this policy.
    pub fn conflicts(
        self,
        existing_start: DateTime<Utc>,
        existing_end: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool {
        match self {
            OverlapPolicy::Endpoints => {
                (existing_start >= start && existing_start <= end)
                    || (existing_end >= start && existing_end <= end)
            }
            OverlapPolicy::Full => existing_start < end && start < existing_end,
        }
    }
}

// ---------------------------------------------------------------------------
// Booking records
// ---------------------------------------------------------------------------

/// Validated booking candidate handed to the reservation store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Booking with the booker and item joined in, as returned by every engine
/// operation. `item.owner_id` carries the ownership fact the authorization
/// checks need without a second directory round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookingDetails {
    pub id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub booker: UserRef,
    pub item: ItemRef,
}
