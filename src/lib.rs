//! Lendique Peer-to-Peer Lending Marketplace
//!
//! A Rust implementation of the Lendique marketplace server: users list
//! items, other users reserve them for a time window, owners approve or
//! reject reservations. The booking engine enforces temporal non-overlap of
//! approved reservations per item.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
