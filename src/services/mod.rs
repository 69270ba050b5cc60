//! Business logic services

pub mod bookings;

use std::sync::Arc;

use crate::{config::BookingConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub bookings: bookings::BookingsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, booking_config: &BookingConfig) -> Self {
        Self {
            bookings: bookings::BookingsService::new(
                Arc::new(repository.bookings.clone()),
                Arc::new(repository.directory.clone()),
                booking_config.overlap_policy,
            ),
        }
    }
}
