//! User registration DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserId};

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NewUserRequest {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
}

/// A registered user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            registered_at: user.registered_at,
        }
    }
}
