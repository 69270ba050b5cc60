//! Booking engine
//!
//! Validates and creates reservations, drives the
//! `Waiting -> Approved | Rejected` state machine, authorizes access and
//! answers time-classified booking queries. Stateless between calls: all
//! durable state lives behind the injected [`ReservationStore`], user and
//! item facts behind the injected [`ResourceDirectory`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::booking::{BookingDetails, BookingStatus, NewBooking, OverlapPolicy, StateFilter},
    repository::{ReservationStore, ResourceDirectory},
};

#[derive(Clone)]
pub struct BookingsService {
    store: Arc<dyn ReservationStore>,
    directory: Arc<dyn ResourceDirectory>,
    overlap_policy: OverlapPolicy,
}

impl BookingsService {
    pub fn new(
        store: Arc<dyn ReservationStore>,
        directory: Arc<dyn ResourceDirectory>,
        overlap_policy: OverlapPolicy,
    ) -> Self {
        Self {
            store,
            directory,
            overlap_policy,
        }
    }

    /// Create a booking in `Waiting` status.
    ///
    /// Preconditions are checked in a fixed order, each with its own failure:
    /// requester exists, item exists, requester is not the owner, item is
    /// available, the window is non-empty, and no approved booking conflicts
    /// under the configured overlap policy. The conflict check and the insert
    /// are one atomic unit inside the store. Creation is not idempotent: a
    /// retrying caller owns deduplication.
    pub async fn create_booking(
        &self,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        requester_id: i64,
    ) -> AppResult<BookingDetails> {
        self.require_user(requester_id).await?;

        let item = self
            .directory
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", item_id)))?;

        if item.owner_id == requester_id {
            return Err(AppError::Validation(
                "owner cannot book own item".to_string(),
            ));
        }

        if !item.available {
            return Err(AppError::Validation(
                "item is not available for booking".to_string(),
            ));
        }

        // Strict: an empty window (start == end) is rejected too.
        if start >= end {
            return Err(AppError::Validation(
                "start must precede end".to_string(),
            ));
        }

        let booking = NewBooking {
            item_id,
            booker_id: requester_id,
            start_date: start,
            end_date: end,
        };

        let details = self.store.create(&booking, self.overlap_policy).await?;
        tracing::debug!(
            booking_id = details.id,
            item_id,
            requester_id,
            "booking created"
        );
        Ok(details)
    }

    /// Approve or reject a waiting booking. Only the item owner may decide,
    /// and only once: the status never changes again afterwards.
    pub async fn decide_booking(
        &self,
        booking_id: i64,
        acting_user_id: i64,
        approve: bool,
    ) -> AppResult<BookingDetails> {
        let details = self.require_booking(booking_id).await?;

        if !Self::caller_is_owner(&details, acting_user_id) {
            return Err(AppError::Forbidden(
                "only the item owner may approve or reject a booking".to_string(),
            ));
        }

        if details.status != BookingStatus::Waiting {
            return Err(AppError::Validation("booking already decided".to_string()));
        }

        let status = if approve {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };

        // The store re-checks `Waiting` under its own guard, so a racing
        // second decision still fails even past the check above.
        self.store.decide(booking_id, status).await
    }

    /// Fetch a booking. Visible to the booker and the item owner only.
    pub async fn get_booking(
        &self,
        booking_id: i64,
        acting_user_id: i64,
    ) -> AppResult<BookingDetails> {
        let details = self.require_booking(booking_id).await?;

        if !Self::caller_is_booker_or_owner(&details, acting_user_id) {
            return Err(AppError::Forbidden("access denied".to_string()));
        }

        Ok(details)
    }

    /// Bookings requested by the caller, classified by `state`.
    pub async fn get_booker_bookings(
        &self,
        booker_id: i64,
        state: &str,
    ) -> AppResult<Vec<BookingDetails>> {
        self.require_user(booker_id).await?;
        let filter = Self::parse_state(state)?;

        // Single snapshot for the whole call: every row is classified against
        // the same instant.
        let now = Utc::now();
        self.store.list_for_booker(booker_id, filter, now).await
    }

    /// Bookings on items the caller owns, classified by `state`.
    pub async fn get_owner_bookings(
        &self,
        owner_id: i64,
        state: &str,
    ) -> AppResult<Vec<BookingDetails>> {
        self.require_user(owner_id).await?;
        let filter = Self::parse_state(state)?;

        let now = Utc::now();
        self.store.list_for_owner(owner_id, filter, now).await
    }

    // ---------------------------------------------------------------------------
    // capability checks
    // ---------------------------------------------------------------------------

    fn caller_is_owner(booking: &BookingDetails, user_id: i64) -> bool {
        booking.item.owner_id == user_id
    }

    fn caller_is_booker_or_owner(booking: &BookingDetails, user_id: i64) -> bool {
        booking.booker.id == user_id || Self::caller_is_owner(booking, user_id)
    }

    // ---------------------------------------------------------------------------
    // shared preconditions
    // ---------------------------------------------------------------------------

    fn parse_state(state: &str) -> AppResult<StateFilter> {
        StateFilter::parse(state)
            .ok_or_else(|| AppError::Validation(format!("unknown state: {}", state)))
    }

    async fn require_user(&self, user_id: i64) -> AppResult<()> {
        if !self.directory.user_exists(user_id).await? {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                user_id
            )));
        }
        Ok(())
    }

    async fn require_booking(&self, booking_id: i64) -> AppResult<BookingDetails> {
        self.store.find_details(booking_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("Booking with id {} not found", booking_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::{ItemRef, ItemSummary};
    use crate::models::user::UserRef;
    use crate::repository::{MockReservationStore, MockResourceDirectory};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    const OWNER: i64 = 1;
    const BOOKER: i64 = 2;
    const STRANGER: i64 = 3;
    const ITEM: i64 = 10;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn days(n: i64) -> Duration {
        Duration::days(n)
    }

    fn hours(n: i64) -> Duration {
        Duration::hours(n)
    }

    /// In-memory reservation store mirroring the Postgres store's contract:
    /// conflict check + insert serialized behind one mutex, guarded decide.
    struct InMemoryStore {
        bookings: Mutex<Vec<BookingDetails>>,
        next_id: AtomicI64,
        users: Vec<UserRef>,
        items: Vec<ItemRef>,
    }

    impl InMemoryStore {
        fn new(users: Vec<UserRef>, items: Vec<ItemRef>) -> Self {
            Self {
                bookings: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
                users,
                items,
            }
        }

        fn user(&self, id: i64) -> UserRef {
            self.users.iter().find(|u| u.id == id).cloned().unwrap()
        }

        fn item(&self, id: i64) -> ItemRef {
            self.items.iter().find(|i| i.id == id).cloned().unwrap()
        }

        fn status_of(&self, booking_id: i64) -> BookingStatus {
            self.bookings
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id == booking_id)
                .map(|b| b.status)
                .unwrap()
        }
    }

    #[async_trait]
    impl ReservationStore for InMemoryStore {
        async fn create(
            &self,
            booking: &NewBooking,
            policy: OverlapPolicy,
        ) -> AppResult<BookingDetails> {
            let mut bookings = self.bookings.lock().unwrap();

            let conflict = bookings.iter().any(|b| {
                b.item.id == booking.item_id
                    && b.status == BookingStatus::Approved
                    && policy.conflicts(
                        b.start_date,
                        b.end_date,
                        booking.start_date,
                        booking.end_date,
                    )
            });
            if conflict {
                return Err(AppError::Validation(
                    "item is already booked for the requested dates".to_string(),
                ));
            }

            let details = BookingDetails {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                start_date: booking.start_date,
                end_date: booking.end_date,
                status: BookingStatus::Waiting,
                booker: self.user(booking.booker_id),
                item: self.item(booking.item_id),
            };
            bookings.push(details.clone());
            Ok(details)
        }

        async fn find_details(&self, booking_id: i64) -> AppResult<Option<BookingDetails>> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id == booking_id)
                .cloned())
        }

        async fn decide(
            &self,
            booking_id: i64,
            status: BookingStatus,
        ) -> AppResult<BookingDetails> {
            let mut bookings = self.bookings.lock().unwrap();
            match bookings.iter_mut().find(|b| b.id == booking_id) {
                Some(b) if b.status == BookingStatus::Waiting => {
                    b.status = status;
                    Ok(b.clone())
                }
                Some(_) => Err(AppError::Validation("booking already decided".to_string())),
                None => Err(AppError::NotFound(format!(
                    "Booking with id {} not found",
                    booking_id
                ))),
            }
        }

        async fn list_for_booker(
            &self,
            booker_id: i64,
            filter: StateFilter,
            now: DateTime<Utc>,
        ) -> AppResult<Vec<BookingDetails>> {
            let mut out: Vec<BookingDetails> = self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.booker.id == booker_id && filter.matches(b, now))
                .cloned()
                .collect();
            out.sort_by(|a, b| b.start_date.cmp(&a.start_date));
            Ok(out)
        }

        async fn list_for_owner(
            &self,
            owner_id: i64,
            filter: StateFilter,
            now: DateTime<Utc>,
        ) -> AppResult<Vec<BookingDetails>> {
            let mut out: Vec<BookingDetails> = self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.item.owner_id == owner_id && filter.matches(b, now))
                .cloned()
                .collect();
            out.sort_by(|a, b| b.start_date.cmp(&a.start_date));
            Ok(out)
        }
    }

    fn fixture_users() -> Vec<UserRef> {
        vec![
            UserRef {
                id: OWNER,
                name: "Olive Owner".into(),
                email: "olive@example.org".into(),
            },
            UserRef {
                id: BOOKER,
                name: "Boris Booker".into(),
                email: "boris@example.org".into(),
            },
            UserRef {
                id: STRANGER,
                name: "Sacha Stranger".into(),
                email: "sacha@example.org".into(),
            },
        ]
    }

    fn fixture_items() -> Vec<ItemRef> {
        vec![ItemRef {
            id: ITEM,
            name: "Cordless drill".into(),
            owner_id: OWNER,
            available: true,
        }]
    }

    /// Directory double over the same fixtures. `available` overrides the
    /// item's availability flag.
    fn fixture_directory(available: bool) -> MockResourceDirectory {
        let mut directory = MockResourceDirectory::new();
        directory
            .expect_user_exists()
            .returning(|id| Ok((1..=3).contains(&id)));
        directory.expect_find_item().returning(move |id| {
            Ok((id == ITEM).then_some(ItemSummary {
                id: ITEM,
                owner_id: OWNER,
                available,
            }))
        });
        directory
    }

    fn service_with(policy: OverlapPolicy, available: bool) -> (BookingsService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new(fixture_users(), fixture_items()));
        let service = BookingsService::new(
            store.clone(),
            Arc::new(fixture_directory(available)),
            policy,
        );
        (service, store)
    }

    fn service(policy: OverlapPolicy) -> (BookingsService, Arc<InMemoryStore>) {
        service_with(policy, true)
    }

    async fn approved_booking(
        service: &BookingsService,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BookingDetails {
        let booking = service
            .create_booking(ITEM, start, end, BOOKER)
            .await
            .unwrap();
        service
            .decide_booking(booking.id, OWNER, true)
            .await
            .unwrap()
    }

    // ---------------------------------------------------------------------------
    // creation
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn created_booking_is_waiting() {
        let (service, _) = service(OverlapPolicy::Full);
        let booking = service
            .create_booking(ITEM, t0() + days(1), t0() + days(2), BOOKER)
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Waiting);
        assert!(booking.start_date < booking.end_date);
        assert_eq!(booking.booker.id, BOOKER);
        assert_eq!(booking.item.id, ITEM);
    }

    #[tokio::test]
    async fn unknown_requester_is_not_found() {
        let (service, _) = service(OverlapPolicy::Full);
        let err = service
            .create_booking(ITEM, t0(), t0() + days(1), 99)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let (service, _) = service(OverlapPolicy::Full);
        let err = service
            .create_booking(999, t0(), t0() + days(1), BOOKER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn owner_cannot_book_own_item() {
        let (service, _) = service(OverlapPolicy::Full);
        let err = service
            .create_booking(ITEM, t0(), t0() + days(1), OWNER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("owner")));
    }

    #[tokio::test]
    async fn self_booking_check_precedes_availability() {
        // Owner booking an unavailable item still gets the ownership failure.
        let (service, _) = service_with(OverlapPolicy::Full, false);
        let err = service
            .create_booking(ITEM, t0(), t0() + days(1), OWNER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("owner")));
    }

    #[tokio::test]
    async fn unavailable_item_is_rejected() {
        let (service, _) = service_with(OverlapPolicy::Full, false);
        let err = service
            .create_booking(ITEM, t0(), t0() + days(1), BOOKER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("not available")));
    }

    #[tokio::test]
    async fn empty_and_inverted_windows_are_rejected() {
        let (service, _) = service(OverlapPolicy::Full);

        let err = service
            .create_booking(ITEM, t0(), t0(), BOOKER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("precede")));

        let err = service
            .create_booking(ITEM, t0() + days(1), t0(), BOOKER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("precede")));
    }

    // ---------------------------------------------------------------------------
    // conflicts
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn overlapping_approved_booking_blocks_creation() {
        let (service, _) = service(OverlapPolicy::Full);
        approved_booking(&service, t0() + days(1), t0() + days(3)).await;

        let err = service
            .create_booking(ITEM, t0() + days(2), t0() + days(4), STRANGER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("already booked")));
    }

    #[tokio::test]
    async fn waiting_booking_does_not_block_creation() {
        let (service, _) = service(OverlapPolicy::Full);
        service
            .create_booking(ITEM, t0() + days(1), t0() + days(3), BOOKER)
            .await
            .unwrap();

        // Same window, but the first booking was never approved.
        service
            .create_booking(ITEM, t0() + days(1), t0() + days(3), STRANGER)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn nested_window_slips_through_endpoints_policy() {
        let (service, _) = service(OverlapPolicy::Endpoints);
        approved_booking(&service, t0() + days(1), t0() + days(2)).await;

        // Nested inside the approved window: the historical predicate sees no
        // endpoint inside the candidate and lets it through.
        service
            .create_booking(
                ITEM,
                t0() + days(1) + hours(12),
                t0() + days(1) + hours(18),
                STRANGER,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn nested_window_is_rejected_by_full_policy() {
        let (service, _) = service(OverlapPolicy::Full);
        approved_booking(&service, t0() + days(1), t0() + days(2)).await;

        let err = service
            .create_booking(
                ITEM,
                t0() + days(1) + hours(12),
                t0() + days(1) + hours(18),
                STRANGER,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("already booked")));
    }

    #[tokio::test]
    async fn disjoint_window_is_accepted() {
        let (service, _) = service(OverlapPolicy::Full);
        approved_booking(&service, t0() + days(1), t0() + days(2)).await;

        service
            .create_booking(ITEM, t0() + days(3), t0() + days(4), STRANGER)
            .await
            .unwrap();
    }

    // ---------------------------------------------------------------------------
    // decision state machine
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn owner_approves_waiting_booking() {
        let (service, _) = service(OverlapPolicy::Full);
        let booking = service
            .create_booking(ITEM, t0() + days(1), t0() + days(2), BOOKER)
            .await
            .unwrap();

        let decided = service.decide_booking(booking.id, OWNER, true).await.unwrap();
        assert_eq!(decided.status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn owner_rejects_waiting_booking() {
        let (service, _) = service(OverlapPolicy::Full);
        let booking = service
            .create_booking(ITEM, t0() + days(1), t0() + days(2), BOOKER)
            .await
            .unwrap();

        let decided = service
            .decide_booking(booking.id, OWNER, false)
            .await
            .unwrap();
        assert_eq!(decided.status, BookingStatus::Rejected);
    }

    #[tokio::test]
    async fn second_decision_fails_whatever_it_is() {
        let (service, _) = service(OverlapPolicy::Full);
        let booking = service
            .create_booking(ITEM, t0() + days(1), t0() + days(2), BOOKER)
            .await
            .unwrap();
        service.decide_booking(booking.id, OWNER, true).await.unwrap();

        for approve in [true, false] {
            let err = service
                .decide_booking(booking.id, OWNER, approve)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(msg) if msg.contains("already decided")));
        }
    }

    #[tokio::test]
    async fn non_owner_cannot_decide_and_status_is_unchanged() {
        let (service, store) = service(OverlapPolicy::Full);
        let booking = service
            .create_booking(ITEM, t0() + days(1), t0() + days(2), BOOKER)
            .await
            .unwrap();

        for user in [BOOKER, STRANGER] {
            let err = service
                .decide_booking(booking.id, user, true)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }
        assert_eq!(store.status_of(booking.id), BookingStatus::Waiting);
    }

    #[tokio::test]
    async fn deciding_missing_booking_is_not_found() {
        let (service, _) = service(OverlapPolicy::Full);
        let err = service.decide_booking(404, OWNER, true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    // ---------------------------------------------------------------------------
    // retrieval access control
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn booker_and_owner_can_fetch_booking() {
        let (service, _) = service(OverlapPolicy::Full);
        let booking = service
            .create_booking(ITEM, t0() + days(1), t0() + days(2), BOOKER)
            .await
            .unwrap();

        assert_eq!(
            service.get_booking(booking.id, BOOKER).await.unwrap().id,
            booking.id
        );
        assert_eq!(
            service.get_booking(booking.id, OWNER).await.unwrap().id,
            booking.id
        );
    }

    #[tokio::test]
    async fn stranger_is_forbidden_from_fetching() {
        let (service, _) = service(OverlapPolicy::Full);
        let booking = service
            .create_booking(ITEM, t0() + days(1), t0() + days(2), BOOKER)
            .await
            .unwrap();

        let err = service.get_booking(booking.id, STRANGER).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn fetching_missing_booking_is_not_found() {
        let (service, _) = service(OverlapPolicy::Full);
        let err = service.get_booking(404, BOOKER).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    // ---------------------------------------------------------------------------
    // temporal queries
    // ---------------------------------------------------------------------------

    /// One past, one current, one future booking for BOOKER on ITEM.
    async fn seeded_timeline(service: &BookingsService) {
        let now = Utc::now();
        for (start, end) in [
            (now - days(10), now - days(8)),
            (now - days(1), now + days(1)),
            (now + days(5), now + days(7)),
        ] {
            service
                .create_booking(ITEM, start, end, BOOKER)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn temporal_classes_are_disjoint_and_complete() {
        let (service, _) = service(OverlapPolicy::Full);
        seeded_timeline(&service).await;

        let now = Utc::now();
        let past = service.get_booker_bookings(BOOKER, "PAST").await.unwrap();
        let current = service.get_booker_bookings(BOOKER, "CURRENT").await.unwrap();
        let future = service.get_booker_bookings(BOOKER, "FUTURE").await.unwrap();
        let all = service.get_booker_bookings(BOOKER, "ALL").await.unwrap();

        assert_eq!(past.len(), 1);
        assert_eq!(current.len(), 1);
        assert_eq!(future.len(), 1);
        assert_eq!(all.len(), 3);

        assert!(past.iter().all(|b| b.end_date < now));
        assert!(future.iter().all(|b| b.start_date > now));
        assert!(current
            .iter()
            .all(|b| b.start_date <= now && now <= b.end_date));

        let ids = |v: &[BookingDetails]| v.iter().map(|b| b.id).collect::<Vec<_>>();
        assert!(ids(&past).iter().all(|id| !ids(&future).contains(id)));
        assert!(ids(&past).iter().all(|id| !ids(&current).contains(id)));
        assert!(ids(&future).iter().all(|id| !ids(&current).contains(id)));
    }

    #[tokio::test]
    async fn listings_are_ordered_by_start_descending() {
        let (service, _) = service(OverlapPolicy::Full);
        seeded_timeline(&service).await;

        let all = service.get_booker_bookings(BOOKER, "ALL").await.unwrap();
        assert!(all.windows(2).all(|w| w[0].start_date >= w[1].start_date));
    }

    #[tokio::test]
    async fn status_filters_select_waiting_and_rejected() {
        let (service, _) = service(OverlapPolicy::Full);
        let kept = service
            .create_booking(ITEM, t0() + days(1), t0() + days(2), BOOKER)
            .await
            .unwrap();
        let refused = service
            .create_booking(ITEM, t0() + days(3), t0() + days(4), BOOKER)
            .await
            .unwrap();
        service
            .decide_booking(refused.id, OWNER, false)
            .await
            .unwrap();

        let waiting = service.get_booker_bookings(BOOKER, "WAITING").await.unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, kept.id);

        let rejected = service
            .get_booker_bookings(BOOKER, "REJECTED")
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].id, refused.id);
    }

    #[tokio::test]
    async fn state_is_parsed_case_insensitively() {
        let (service, _) = service(OverlapPolicy::Full);
        seeded_timeline(&service).await;

        let lower = service.get_booker_bookings(BOOKER, "all").await.unwrap();
        assert_eq!(lower.len(), 3);
    }

    #[tokio::test]
    async fn unknown_state_is_a_validation_error() {
        let (service, _) = service(OverlapPolicy::Full);
        for state in ["APPROVED", "CANCELLED", "SOON"] {
            let err = service
                .get_booker_bookings(BOOKER, state)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(msg) if msg.contains("unknown state")));
        }
    }

    #[tokio::test]
    async fn listing_for_unknown_user_is_not_found() {
        let (service, _) = service(OverlapPolicy::Full);
        let err = service.get_booker_bookings(99, "ALL").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = service.get_owner_bookings(99, "ALL").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn owner_listing_sees_bookings_on_owned_items() {
        let (service, _) = service(OverlapPolicy::Full);
        seeded_timeline(&service).await;

        let all = service.get_owner_bookings(OWNER, "ALL").await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|b| b.item.owner_id == OWNER));

        // The booker owns no items.
        let none = service.get_owner_bookings(BOOKER, "ALL").await.unwrap();
        assert!(none.is_empty());
    }

    // ---------------------------------------------------------------------------
    // failure propagation
    // ---------------------------------------------------------------------------

    #[tokio::test]
    async fn store_unavailability_surfaces_as_unavailable() {
        let mut store = MockReservationStore::new();
        store
            .expect_list_for_booker()
            .returning(|_, _, _| Err(AppError::Unavailable("booker listing timed out".into())));

        let service = BookingsService::new(
            Arc::new(store),
            Arc::new(fixture_directory(true)),
            OverlapPolicy::Full,
        );

        let err = service.get_booker_bookings(BOOKER, "ALL").await.unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[tokio::test]
    async fn directory_unavailability_surfaces_as_unavailable() {
        let mut directory = MockResourceDirectory::new();
        directory
            .expect_user_exists()
            .returning(|_| Err(AppError::Unavailable("user lookup timed out".into())));

        let service = BookingsService::new(
            Arc::new(InMemoryStore::new(fixture_users(), fixture_items())),
            Arc::new(directory),
            OverlapPolicy::Full,
        );

        let err = service
            .create_booking(ITEM, t0(), t0() + days(1), BOOKER)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable(_)));
    }
}
