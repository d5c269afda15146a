//! PostgreSQL connectivity for the SRCF job control plane.
//!
//! Two distinct connection shapes are needed here, mirroring how the job
//! runner talks to Postgres versus how everything else does:
//!
//! - [`pool`] — an ordinary pooled `PgPool` for job/job-log CRUD and the
//!   task layer's own queries.
//! - [`advisory_lock`] — a single, long-lived, *non-pooled* connection that
//!   holds the session-scoped advisory lock enforcing at-most-one-runner and
//!   subscribes to `LISTEN jobs_insert` for low-latency dispatch wake-ups.
//!
//! [`identifier`] is shared by `srcf_sql`'s MySQL/PostgreSQL dialects to
//! validate identifiers that must be interpolated (quoted, never escaped)
//! rather than bound as parameters.

pub mod advisory_lock;
pub mod error;
pub mod identifier;
pub mod pool;

pub use advisory_lock::{RunnerLock, RUNNER_LOCK_NUM};
pub use error::{DbError, Result};
pub use identifier::{validate_identifier, IdentifierError};
pub use pool::{create_mysql_pool, create_pool, DbConfig, DbPool, MySqlDbPool};
