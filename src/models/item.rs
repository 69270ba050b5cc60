//! Item read-model slice embedded in booking details

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Minimal item projection: ownership and availability drive the booking
/// rules, the name is carried for response shaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemRef {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub available: bool,
}

/// Ownership and availability of an item as reported by the resource
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSummary {
    pub id: i64,
    pub owner_id: i64,
    pub available: bool,
}
