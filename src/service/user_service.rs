//! User registration.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{User, UserCatalog};
use crate::error::GatewayError;
use crate::persistence::PostgresPersistence;

/// Registers users so that they can own events and send requests.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<UserCatalog>,
    journal: Option<PostgresPersistence>,
}

impl UserService {
    /// Creates a new `UserService`.
    #[must_use]
    pub fn new(users: Arc<UserCatalog>, journal: Option<PostgresPersistence>) -> Self {
        Self { users, journal }
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] on invalid input or a
    /// persistence error if the journal write fails.
    pub async fn register(&self, name: &str, email: &str) -> Result<User, GatewayError> {
        let user = User::new(name, email, Utc::now())?;
        if let Some(journal) = &self.journal {
            journal.save_user(&user).await?;
        }
        self.users.insert(user.clone()).await;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    #[tokio::test]
    async fn registered_users_are_visible_in_the_catalog() {
        let users = Arc::new(UserCatalog::new());
        let service = UserService::new(Arc::clone(&users), None);

        let Ok(user) = service.register("Grace", "grace@example.com").await else {
            panic!("registration failed");
        };
        assert!(users.exists(user.id).await);
    }

    #[tokio::test]
    async fn invalid_users_are_not_stored() {
        let users = Arc::new(UserCatalog::new());
        let service = UserService::new(Arc::clone(&users), None);

        assert_err!(service.register("", "grace@example.com").await);
    }
}
