//! Persistence layer: PostgreSQL write-through journal and startup restore.
//!
//! The concrete implementation uses `sqlx::PgPool` for async PostgreSQL
//! access. Persistence is optional; with `PERSISTENCE_ENABLED=false` the
//! service runs purely in memory.

pub mod models;
pub mod postgres;

pub use postgres::PostgresPersistence;

use crate::domain::{EventCatalog, RequestStore, UserCatalog};
use crate::error::GatewayError;

/// Counts of records loaded by [`restore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Users loaded.
    pub users: usize,
    /// Events loaded.
    pub events: usize,
    /// Participation requests loaded.
    pub requests: usize,
}

/// Rebuilds the in-memory catalogs and ledgers from the journal.
///
/// Every event gets a ledger, even without requests, and each ledger's
/// confirmed count is recomputed from the restored statuses.
///
/// # Errors
///
/// Returns a [`GatewayError`] if loading fails or the stored data violates
/// store invariants (duplicate ids).
pub async fn restore(
    journal: &PostgresPersistence,
    users: &UserCatalog,
    events: &EventCatalog,
    requests: &RequestStore,
) -> Result<RestoreSummary, GatewayError> {
    let mut summary = RestoreSummary::default();

    for user in journal.load_users().await? {
        users.insert(user).await;
        summary.users += 1;
    }

    for event in journal.load_events().await? {
        let event_id = events.insert(event).await?;
        requests.open(event_id).await;
        summary.events += 1;
    }

    summary.requests = requests.restore(journal.load_requests().await?).await?;

    tracing::info!(
        users = summary.users,
        events = summary.events,
        requests = summary.requests,
        "state restored from journal"
    );
    Ok(summary)
}
