//! The job runner's singleton coordination: a session-scoped PostgreSQL
//! advisory lock plus a `LISTEN jobs_insert` subscription, both held on one
//! dedicated, non-pooled connection for the runner's entire lifetime.
//!
//! A pooled connection can't be used here: `pg_advisory_lock` and `LISTEN`
//! are both tied to the backend session that issued them, and a pool may
//! hand that physical connection to an unrelated query at any time.

use sqlx::postgres::{PgListener, PgNotification};
use sqlx::Executor;

use crate::error::{DbError, Result};

/// Arbitrary 63-bit tag identifying this application's runner lock in the
/// shared `pg_advisory_lock` keyspace.
pub const RUNNER_LOCK_NUM: i64 = 0x0003_6663_6F6E_7472;

/// Holds the runner's advisory lock and its job-insert notification
/// subscription for as long as it stays alive. Dropping it releases the
/// lock (the underlying connection closes).
pub struct RunnerLock {
    listener: PgListener,
}

impl RunnerLock {
    /// Connect, try to take the advisory lock, and subscribe to
    /// `jobs_insert`. Returns [`DbError::DatabaseLocked`] if another runner
    /// already holds the lock, rather than blocking — there should only
    /// ever be one runner, and a second one starting is almost always an
    /// operator mistake worth failing loudly on.
    pub async fn acquire(database_url: &str) -> Result<Self> {
        let mut listener = PgListener::connect(database_url).await?;

        let (acquired,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
            .bind(RUNNER_LOCK_NUM)
            .fetch_one(&mut listener)
            .await?;
        if !acquired {
            return Err(DbError::DatabaseLocked);
        }

        listener.listen("jobs_insert").await?;
        Ok(Self { listener })
    }

    /// Wait for the next `NOTIFY jobs_insert`. Never returns `Ok` with a
    /// spurious empty payload; the caller still needs its own periodic
    /// fallback poll since a `NOTIFY` issued between this runner noticing
    /// `queued` rows and subscribing can otherwise be missed.
    pub async fn recv(&mut self) -> Result<PgNotification> {
        Ok(self.listener.recv().await?)
    }

    /// Run an arbitrary statement on the lock-holding connection (used to
    /// re-fetch a job row without spending a pool connection).
    pub async fn execute(&mut self, query: &str) -> Result<()> {
        self.listener.execute(query).await?;
        Ok(())
    }
}
