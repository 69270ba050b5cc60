//! User read-model slice embedded in booking details

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Minimal user projection. Account storage and validation live in the user
/// service; the booking engine only ever needs the id for authorization and
/// the name/email for response shaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
    pub email: String,
}
