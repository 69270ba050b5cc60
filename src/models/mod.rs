//! Domain models

pub mod booking;
pub mod item;
pub mod user;
