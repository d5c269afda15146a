//! The job runner's dispatch loop. Mirrors `job_runner.py`'s `JobRunner.run`:
//! acquire the advisory lock, drain the backlog, then alternate between
//! draining again and blocking on `LISTEN jobs_insert` with a 600-second
//! wake-up ceiling so a missed notification can't stall the queue forever.
//!
//! Concurrency is strictly one job at a time: `dispatch_loop` never spawns
//! a handler before the previous one has returned.

use std::time::Duration;

use sqlx::postgres::PgPool;

use srcf_db::RunnerLock;
use srcf_jobs::JobKind;
use srcf_protocol::{JobId, JobState};
use srcf_tasks::{TaskContext, TasksError};

use crate::error::Result;
use crate::{job, log, notify};

/// How long [`RunnerLock::recv`] is allowed to block before the dispatch
/// loop re-polls the backlog on its own, per §4.I step 4.
const NOTIFICATION_WAKEUP: Duration = Duration::from_secs(600);

/// Everything the dispatch loop needs for the lifetime of the process.
pub struct Runner {
    lock: RunnerLock,
    pool: PgPool,
    ctx: TaskContext,
    sysadmin_email: String,
}

impl Runner {
    /// Acquire the session lock and subscribe to `jobs_insert`. Returns
    /// [`srcf_db::DbError::DatabaseLocked`] (wrapped) if another runner is
    /// already holding it — the caller should treat that as a clean exit,
    /// not a crash.
    pub async fn start(database_url: &str, pool: PgPool, ctx: TaskContext) -> Result<Self> {
        let lock = RunnerLock::acquire(database_url).await?;
        let sysadmin_email = ctx.sysadmin_email.clone();
        Ok(Self {
            lock,
            pool,
            ctx,
            sysadmin_email,
        })
    }

    /// Run forever: drain the backlog, then block for a notification (or
    /// the wake-up ceiling) and drain again. Never returns under normal
    /// operation; returns `Ok(())` only if `shutdown` resolves, for tests
    /// and graceful-shutdown callers.
    pub async fn run_until(&mut self, mut shutdown: tokio::sync::oneshot::Receiver<()>) -> Result<()> {
        loop {
            self.drain_backlog().await?;

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("runner shutting down");
                    return Ok(());
                }
                result = tokio::time::timeout(NOTIFICATION_WAKEUP, self.lock.recv()) => {
                    match result {
                        Ok(Ok(notification)) => {
                            tracing::debug!(payload = notification.payload(), "received jobs_insert notification");
                        }
                        Ok(Err(err)) => return Err(err.into()),
                        Err(_elapsed) => {
                            tracing::debug!("notification wake-up ceiling reached, re-polling backlog");
                        }
                    }
                }
            }
        }
    }

    /// Drain every currently `queued` row, oldest id first, dispatching
    /// each in turn. A row already claimed or withdrawn by the time its
    /// turn comes is silently skipped (`claim_job` returns `None`).
    async fn drain_backlog(&mut self) -> Result<()> {
        for id in job::list_queued_backlog(&self.pool).await? {
            self.dispatch_one(id).await?;
        }
        Ok(())
    }

    /// Claim, run, and finish exactly one job. A no-op if the row is no
    /// longer `queued` by the time this runs (backlog/notification ids may
    /// be yielded more than once).
    async fn dispatch_one(&mut self, id: JobId) -> Result<()> {
        let Some(row) = job::claim_job(&self.pool, id).await? else {
            return Ok(());
        };

        log::log_started(&self.pool, id).await?;
        tracing::info!(job_id = %id, job_type = %row.job_type, "job started");

        let kind = match row.kind() {
            Ok(kind) => kind,
            Err(err) => {
                self.fail_unexpected(&row, &err.to_string(), None).await?;
                return Ok(());
            }
        };

        let owner_crsid = row.owner.clone().unwrap_or_default();
        match srcf_tasks::dispatch(&self.ctx, &kind, &owner_crsid).await {
            Ok(result) => {
                log::log_result_tree(&self.pool, id, &result).await?;
                let message = format!("{}: {}", result.name(), result.state());
                job::finish_job(&self.pool, id, JobState::Done, Some(&message)).await?;
                log::log_done(&self.pool, id, &message).await?;
                tracing::info!(job_id = %id, "job done");
                self.scrub_on_delete(&kind, &owner_crsid).await?;
            }
            Err(TasksError::JobFailed(failed)) => {
                job::finish_job(&self.pool, id, JobState::Failed, Some(&failed.message)).await?;
                log::log_job_failed(&self.pool, id, &failed.message, failed.raw.as_deref()).await?;
                tracing::warn!(job_id = %id, message = %failed.message, "job failed");
                notify::notify_job_failed(
                    &self.ctx.email,
                    &self.sysadmin_email,
                    id,
                    &row.job_type,
                    row.owner.as_deref(),
                    &failed.message,
                    failed.raw.as_deref(),
                )
                .await;
            }
            Err(other) => {
                self.fail_unexpected(&row, &other.to_string(), None).await?;
            }
        }

        Ok(())
    }

    /// Any exception besides a clean [`TasksError::JobFailed`]: the row may
    /// be left dirty by the in-flight step, so this re-reads rather than
    /// trusting `row`. Logged at ERROR with the full chain, summarised for
    /// the submitter.
    async fn fail_unexpected(&mut self, row: &job::Job, summary: &str, chain: Option<&str>) -> Result<()> {
        let id = row.id;
        log::log_unexpected_error(&self.pool, id, summary, chain.unwrap_or(summary)).await?;
        job::finish_job(&self.pool, id, JobState::Failed, Some(summary)).await?;
        tracing::error!(job_id = %id, error = summary, "job failed unexpectedly");
        notify::notify_job_failed(
            &self.ctx.email,
            &self.sysadmin_email,
            id,
            &row.job_type,
            row.owner.as_deref(),
            summary,
            chain,
        )
        .await;
        Ok(())
    }

    /// `DeleteMember`/`DeleteSociety` scrub sensitive arguments out of the
    /// entity's job history once the deletion itself has succeeded.
    async fn scrub_on_delete(&mut self, kind: &JobKind, owner_crsid: &str) -> Result<()> {
        match kind {
            JobKind::DeleteMember => {
                job::redact_member_jobs(&self.pool, owner_crsid).await?;
            }
            JobKind::DeleteSociety { society } => {
                job::redact_society_jobs(&self.pool, society).await?;
            }
            _ => {}
        }
        Ok(())
    }
}
