//! Persisted job-queue rows. Mirrors `controllib.jobs.Job`'s underlying
//! table, with `args` stored as JSONB rather than hstore since that's what
//! `sqlx`'s Postgres driver supports without an extra feature, and the
//! distilled spec only requires a string-to-string mapping, not hstore's
//! wire format specifically.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use srcf_jobs::{ArgsMap, JobKind};
use srcf_protocol::{JobState, JobId};

use crate::error::{Result, RunnerError};

/// A row from the `jobs` table, with `args` already decoded from JSONB.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub owner: Option<String>,
    pub job_type: String,
    pub args: ArgsMap,
    pub state: JobState,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Decode this row's `job_type`/`args` back into a typed [`JobKind`].
    pub fn kind(&self) -> Result<JobKind> {
        Ok(JobKind::from_args(&self.job_type, &self.args)?)
    }
}

fn row_to_job(row: &PgRow) -> std::result::Result<Job, sqlx::Error> {
    let state: String = row.try_get("state")?;
    let args_json: serde_json::Value = row.try_get("args")?;
    let args: ArgsMap = serde_json::from_value(args_json).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(Job {
        id: JobId::new(row.try_get("id")?),
        owner: row.try_get("owner")?,
        job_type: row.try_get("job_type")?,
        args,
        state: JobState::from_str(&state).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        message: row.try_get("message")?,
        created_at: row.try_get("created_at")?,
    })
}

const SELECT_COLUMNS: &str = "id, owner, job_type, args, state, message, created_at";

/// Look up a job by id.
pub async fn get_job(pool: &PgPool, id: JobId) -> Result<Option<Job>> {
    let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE id = $1"))
        .bind(id.as_i64())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_job).transpose().map_err(Into::into)
}

fn require(job: Option<Job>, id: JobId) -> Result<Job> {
    job.ok_or(RunnerError::NotFound(id.as_i64()))
}

/// Insert a freshly submitted job. `state` is decided by the caller (see
/// [`crate::approval::build_approval_context`] plus `srcf_jobs::requires_approval`)
/// since it depends on DB state this module doesn't otherwise need to know.
pub async fn submit(pool: &PgPool, owner: Option<&str>, kind: &JobKind, state: JobState) -> Result<Job> {
    let args_json = serde_json::to_value(kind.to_args())?;
    let row = sqlx::query(&format!(
        "INSERT INTO jobs (owner, job_type, args, state) VALUES ($1, $2, $3, $4) RETURNING {SELECT_COLUMNS}"
    ))
    .bind(owner)
    .bind(kind.job_type())
    .bind(args_json)
    .bind(state.as_db_str())
    .fetch_one(pool)
    .await?;
    row_to_job(&row).map_err(Into::into)
}

/// Every `queued` job id, oldest first. Drained on startup and after every
/// notification wake-up; re-checked for state before running since ids may
/// be yielded more than once.
pub async fn list_queued_backlog(pool: &PgPool) -> Result<Vec<JobId>> {
    let rows = sqlx::query("SELECT id FROM jobs WHERE state = 'queued' ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| JobId::new(r.get::<i64, _>(0))).collect())
}

/// Atomically claim a queued job for execution: flips it to `running` only
/// if it's still `queued`. Returns `None` if another dispatch pass already
/// claimed it (or it was withdrawn/cancelled in the meantime) rather than
/// erroring — the backlog/notification stream may yield the same id twice.
pub async fn claim_job(pool: &PgPool, id: JobId) -> Result<Option<Job>> {
    let row = sqlx::query(&format!(
        "UPDATE jobs SET state = 'running' WHERE id = $1 AND state = 'queued' RETURNING {SELECT_COLUMNS}"
    ))
    .bind(id.as_i64())
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(row_to_job).transpose().map_err(Into::into)
}

/// Move a job to a terminal state (`done`/`failed`) with its closing
/// message, unconditionally — the dispatch loop is the only writer of
/// `running` rows, so no state check is needed here.
pub async fn finish_job(pool: &PgPool, id: JobId, state: JobState, message: Option<&str>) -> Result<()> {
    sqlx::query("UPDATE jobs SET state = $2, message = $3 WHERE id = $1")
        .bind(id.as_i64())
        .bind(state.as_db_str())
        .bind(message)
        .execute(pool)
        .await?;
    Ok(())
}

/// Apply an operator-issued transition (`approve`/`reject`/`cancel`/
/// `abort`/`retry`/`repeat`), validating it against the job's current
/// state via [`srcf_jobs::transition`].
pub async fn apply_action(pool: &PgPool, id: JobId, action: srcf_jobs::JobAction, message: Option<String>) -> Result<Job> {
    let job = require(get_job(pool, id).await?, id)?;
    let (new_state, new_message) = srcf_jobs::transition(job.state, action, message)?;
    sqlx::query("UPDATE jobs SET state = $2, message = $3 WHERE id = $1")
        .bind(id.as_i64())
        .bind(new_state.as_db_str())
        .bind(&new_message)
        .execute(pool)
        .await?;
    require(get_job(pool, id).await?, id)
}

/// Scrub the sensitive fields of every job a now-deleted member submitted.
pub async fn redact_member_jobs(pool: &PgPool, crsid: &str) -> Result<u64> {
    redact_where(pool, "owner = $1", crsid).await
}

/// Scrub the sensitive fields of every job naming a now-deleted society.
pub async fn redact_society_jobs(pool: &PgPool, society: &str) -> Result<u64> {
    redact_where(pool, "args ->> 'society' = $1", society).await
}

async fn redact_where(pool: &PgPool, predicate: &str, value: &str) -> Result<u64> {
    let rows = sqlx::query(&format!("SELECT id, args FROM jobs WHERE {predicate}"))
        .bind(value)
        .fetch_all(pool)
        .await?;
    let mut scrubbed = 0;
    for row in rows {
        let id: i64 = row.try_get("id")?;
        let args_json: serde_json::Value = row.try_get("args")?;
        let mut args: ArgsMap = serde_json::from_value(args_json)?;
        srcf_jobs::redact_args(&mut args);
        let updated = serde_json::to_value(&args)?;
        sqlx::query("UPDATE jobs SET args = $2 WHERE id = $1")
            .bind(id)
            .bind(updated)
            .execute(pool)
            .await?;
        scrubbed += 1;
    }
    Ok(scrubbed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_kind_round_trips_through_args() {
        let kind = JobKind::Test { sleep_time: 3 };
        let args = kind.to_args();
        let decoded = JobKind::from_args("test", &args).unwrap();
        assert_eq!(kind, decoded);
    }
}
