//! Appending rows to the `job_log` table: the per-step, user-facing record
//! of a job's execution, distinct from this binary's own `tracing` output
//! (see `srcf_logging`). A completed task's [`srcf_task::TaskResult`] tree
//! is flattened into one row per node after the job finishes; `started`/
//! `done`/`failed` markers bracket it.

use sqlx::postgres::PgPool;

use std::fmt;

use srcf_protocol::{JobId, LogLevel, LogType};
use srcf_task::{Node, TaskResult};

use crate::error::Result;

/// Append a single job-log row.
pub async fn append(
    pool: &PgPool,
    job_id: JobId,
    level: LogLevel,
    log_type: LogType,
    message: &str,
    raw: Option<&str>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO job_log (job_id, level, log_type, message, raw) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(job_id.as_i64())
    .bind(level.as_str())
    .bind(log_type.as_str())
    .bind(message)
    .bind(raw)
    .execute(pool)
    .await?;
    Ok(())
}

/// Log the `started` marker the dispatch loop emits right before flipping a
/// job to `running`.
pub async fn log_started(pool: &PgPool, job_id: JobId) -> Result<()> {
    append(pool, job_id, LogLevel::Info, LogType::Started, "Job started", None).await
}

/// Flatten a completed workflow's result tree into `progress` rows, one per
/// node, indented the same way [`Node`]'s `Display` impl renders a tree —
/// so a human reading `job_log` end to end sees the same shape the runner's
/// own logs would.
pub async fn log_result_tree<T: fmt::Debug>(pool: &PgPool, job_id: JobId, result: &TaskResult<T>) -> Result<()> {
    log_node(pool, job_id, 0, &result.to_node()).await
}

fn log_node<'a>(
    pool: &'a PgPool,
    job_id: JobId,
    depth: usize,
    node: &'a Node,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + 'a>> {
    Box::pin(async move {
        let message = format!("{}{}: {}", "  ".repeat(depth), node.name, node.state);
        append(pool, job_id, LogLevel::Debug, LogType::Progress, &message, node.detail.as_deref()).await?;
        for child in &node.children {
            log_node(pool, job_id, depth + 1, child).await?;
        }
        Ok(())
    })
}

/// Log the terminal `done` marker.
pub async fn log_done(pool: &PgPool, job_id: JobId, message: &str) -> Result<()> {
    append(pool, job_id, LogLevel::Info, LogType::Done, message, None).await
}

/// Log a clean [`srcf_protocol::JobFailed`] failure at `warning`.
pub async fn log_job_failed(pool: &PgPool, job_id: JobId, message: &str, raw: Option<&str>) -> Result<()> {
    append(pool, job_id, LogLevel::Warning, LogType::Failed, message, raw).await
}

/// Log an unexpected error at `error`, with its full chain as `raw`.
pub async fn log_unexpected_error(pool: &PgPool, job_id: JobId, summary: &str, chain: &str) -> Result<()> {
    append(pool, job_id, LogLevel::Error, LogType::Failed, summary, Some(chain)).await
}
