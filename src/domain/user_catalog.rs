//! Existence-only user directory.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::UserId;
use crate::error::GatewayError;

/// A registered user. Admission only cares that the id exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl User {
    /// Validates and builds a new user record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on a blank name or an email
    /// without `@`.
    pub fn new(name: &str, email: &str, now: DateTime<Utc>) -> Result<Self, GatewayError> {
        if name.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("name must not be blank".to_string()));
        }
        if !email.contains('@') {
            return Err(GatewayError::InvalidRequest(format!("invalid email: {email}")));
        }
        Ok(Self {
            id: UserId::new(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            registered_at: now,
        })
    }
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct UserCatalog {
    users: RwLock<HashMap<UserId, User>>,
}

impl UserCatalog {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an already validated user, replacing any record with the
    /// same id.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Whether the user exists.
    pub async fn exists(&self, id: UserId) -> bool {
        self.users.read().await.contains_key(&id)
    }

    /// Fails unless the user exists.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for unknown ids.
    pub async fn ensure_exists(&self, id: UserId) -> Result<(), GatewayError> {
        if self.exists(id).await {
            Ok(())
        } else {
            Err(GatewayError::UserNotFound(*id.as_uuid()))
        }
    }
}
