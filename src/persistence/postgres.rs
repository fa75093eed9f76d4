//! PostgreSQL write-through journal.
//!
//! The in-memory catalogs and ledgers remain the admission authority; this
//! journal makes every accepted mutation durable and lets the service
//! restore its state on startup. Request batches are written in one
//! SERIALIZABLE transaction. Serialization failures and deadlocks are
//! retried up to `max_retries` times before surfacing
//! [`GatewayError::Transient`].

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{
    EventRow, RequestRow, UserRow, event_from_row, request_from_row, user_from_row,
};
use crate::config::GatewayConfig;
use crate::domain::{Event, ParticipationRequest, User};
use crate::error::GatewayError;

/// SQLSTATE `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
    max_retries: u32,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool, max_retries: u32) -> Self {
        Self {
            pool,
            max_retries: max_retries.max(1),
        }
    }

    /// Opens a connection pool from the gateway configuration and applies
    /// pending migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(Self::new(pool, config.persistence_max_retries))
    }

    /// Inserts or updates a user.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_user(&self, user: &User) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, registered_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email",
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.registered_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or updates an event.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_event(&self, event: &Event) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO events (id, initiator_id, title, annotation, description, state, \
             participant_limit, request_moderation, created_on, published_at, event_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, \
             annotation = EXCLUDED.annotation, description = EXCLUDED.description, \
             state = EXCLUDED.state, participant_limit = EXCLUDED.participant_limit, \
             request_moderation = EXCLUDED.request_moderation, \
             published_at = EXCLUDED.published_at, event_date = EXCLUDED.event_date",
        )
        .bind(event.id.as_uuid())
        .bind(event.initiator_id.as_uuid())
        .bind(&event.title)
        .bind(&event.annotation)
        .bind(&event.description)
        .bind(event.state.to_string())
        .bind(i64::from(event.participant_limit))
        .bind(event.request_moderation)
        .bind(event.created_on)
        .bind(event.published_at)
        .bind(event.event_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts or updates a batch of requests atomically.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transient`] if the transaction kept failing
    /// with serialization conflicts, or [`GatewayError::PersistenceError`]
    /// on any other database failure.
    pub async fn save_requests(&self, requests: &[ParticipationRequest]) -> Result<(), GatewayError> {
        if requests.is_empty() {
            return Ok(());
        }
        retry_write_conflicts("save_requests", self.max_retries, || {
            self.upsert_requests(requests)
        })
        .await
    }

    /// Loads all users.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_users(&self) -> Result<Vec<User>, GatewayError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, registered_at FROM users",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(user_from_row).collect())
    }

    /// Loads all events.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// an undecodable row.
    pub async fn load_events(&self) -> Result<Vec<Event>, GatewayError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, initiator_id, title, annotation, description, state, participant_limit, \
             request_moderation, created_on, published_at, event_date FROM events",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(event_from_row).collect()
    }

    /// Loads all participation requests, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure or
    /// an undecodable row.
    pub async fn load_requests(&self) -> Result<Vec<ParticipationRequest>, GatewayError> {
        let rows = sqlx::query_as::<_, RequestRow>(
            "SELECT id, event_id, requester_id, status, created_at \
             FROM participation_requests ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(request_from_row).collect()
    }

    async fn upsert_requests(&self, requests: &[ParticipationRequest]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;
        for request in requests {
            sqlx::query(
                "INSERT INTO participation_requests (id, event_id, requester_id, status, created_at) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status",
            )
            .bind(request.id.as_uuid())
            .bind(request.event_id.as_uuid())
            .bind(request.requester_id.as_uuid())
            .bind(request.status.to_string())
            .bind(request.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }
}

/// Runs `attempt_once` until it succeeds, fails with something other than a
/// write conflict, or has hit a write conflict `max_retries` times.
async fn retry_write_conflicts<T, F, Fut>(
    operation: &str,
    max_retries: u32,
    mut attempt_once: F,
) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match attempt_once().await {
            Ok(value) => return Ok(value),
            Err(err) if is_write_conflict(&err) && attempt < max_retries => {
                tracing::debug!(operation, attempt, error = %err, "write conflict, retrying");
                tokio::time::sleep(backoff(attempt)).await;
            }
            Err(err) if is_write_conflict(&err) => {
                tracing::warn!(operation, attempts = attempt, "write conflict retries exhausted");
                return Err(GatewayError::Transient { attempts: attempt });
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Whether the error is an optimistic-concurrency collision worth retrying.
fn is_write_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}

/// Linear backoff: 10 ms, 20 ms, 30 ms, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(10 * u64::from(attempt))
}
