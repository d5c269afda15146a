//! Operator CLI and daemon entrypoint for the SRCF job control plane.
//!
//! `srcf run` starts the singleton runner daemon; the other subcommands
//! are one-shot operator actions against the job queue (submit a job
//! directly, or transition an existing one). Mirrors the `clap::Parser`
//! usage already established by this workspace's daemon binaries.

mod mysql_cnf;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use srcf_db::{create_mysql_pool, create_pool, DbConfig};
use srcf_jobs::{ArgsMap, JobAction, JobKind};
use srcf_protocol::JobId;
use srcf_runner::{job, Runner};
use srcf_tasks::TaskContext;

#[derive(Parser, Debug)]
#[command(name = "srcf", about = "SRCF job control plane: daemon and operator CLI")]
struct Cli {
    /// PostgreSQL connection string for the control-plane store.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Path to a `my.cnf`-style option file providing MySQL credentials.
    #[arg(long, default_value_os_t = default_mysql_cnf())]
    mysql_cnf: PathBuf,

    /// Explicit MySQL URL, overriding `--mysql-cnf` entirely.
    #[arg(long, env = "MYSQL_URL")]
    mysql_url: Option<String>,

    /// SMTP relay host for operator/user notifications.
    #[arg(long, default_value = "localhost")]
    smtp_host: String,

    /// Envelope sender for outgoing notification emails.
    #[arg(long, default_value = "srcf-admin@srcf.net")]
    mail_from: String,

    /// Sysadmin mailing address job failures are reported to.
    #[arg(long, default_value = "sysadmins@srcf.net")]
    sysadmin_email: String,

    /// Log intended emails instead of sending them (dry runs, scripted
    /// operator sessions).
    #[arg(long)]
    suppress_email: bool,

    /// Enable debug-level logging on stderr regardless of `RUST_LOG`.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the job runner daemon: acquire the advisory lock, drain the
    /// backlog, then dispatch jobs as they're queued.
    Run,

    /// Submit a new job directly (bypassing the web front-end).
    Submit {
        /// The job's type tag, e.g. `create_society`, `reset_user_password`.
        #[arg(long = "type")]
        job_type: String,

        /// Owning member's crsid (omit for ownerless jobs like `signup`).
        #[arg(long)]
        owner: Option<String>,

        /// A `key=value` argument pair; may be repeated.
        #[arg(long = "arg", value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },

    /// Approve an `unapproved` job, moving it to `queued`.
    Approve { job_id: i64 },

    /// Reject an `unapproved` job, moving it to `withdrawn`.
    Reject {
        job_id: i64,
        #[arg(long)]
        message: Option<String>,
    },

    /// Cancel a `queued` job before it runs, moving it to `failed`.
    Cancel {
        job_id: i64,
        #[arg(long)]
        message: Option<String>,
    },

    /// Abort a `running` job after operator inspection, moving it to
    /// `failed`. Never auto-applied by the runner itself — see §4.I.
    Abort {
        job_id: i64,
        #[arg(long)]
        message: Option<String>,
    },

    /// Re-queue a `failed` job for another attempt.
    Retry { job_id: i64 },

    /// Re-queue a `done` job to run again from scratch.
    Repeat { job_id: i64 },
}

fn default_mysql_cnf() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".my.cnf")
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {s:?}"))?;
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    srcf_logging::init_logging(srcf_logging::LogConfig {
        app_name: "srcf",
        verbose: cli.verbose,
    })?;

    let pg_pool = create_pool(&DbConfig::from_url(&cli.database_url))
        .await
        .context("failed to connect to the control-plane database")?;

    let mysql_url = cli
        .mysql_url
        .clone()
        .or_else(|| mysql_cnf::load_mysql_url(&cli.mysql_cnf))
        .context("no MySQL URL: pass --mysql-url or point --mysql-cnf at a readable my.cnf")?;
    let mysql_pool = create_mysql_pool(&DbConfig::from_url(&mysql_url))
        .await
        .context("failed to connect to MySQL")?;

    let email = if cli.suppress_email {
        srcf_email::EmailWrapper::suppressed()
    } else {
        srcf_email::EmailWrapper::smtp(&cli.smtp_host, &cli.mail_from)
            .context("failed to configure SMTP transport")?
    };

    match cli.command {
        Command::Run => {
            let ctx = TaskContext::new(pg_pool.clone(), mysql_pool, email).with_sysadmin_email(cli.sysadmin_email);
            let mut runner = Runner::start(&cli.database_url, pg_pool, ctx)
                .await
                .context("failed to start the job runner")?;
            let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
            install_shutdown_handler(shutdown_tx);
            runner.run_until(shutdown_rx).await.context("runner loop failed")?;
        }

        Command::Submit { job_type, owner, args } => {
            let mut map = ArgsMap::new();
            for (key, value) in args {
                map.insert(key, value);
            }
            let kind = JobKind::from_args(&job_type, &map).context("invalid job arguments")?;

            let approval_ctx = srcf_runner::approval::build_approval_context(
                &pg_pool,
                &kind,
                owner.as_deref().unwrap_or(""),
            )
            .await
            .context("failed to look up approval context")?;
            let state = if srcf_jobs::requires_approval(&kind, &approval_ctx) {
                srcf_protocol::JobState::Unapproved
            } else {
                srcf_protocol::JobState::Queued
            };

            let row = job::submit(&pg_pool, owner.as_deref(), &kind, state)
                .await
                .context("failed to submit job")?;
            println!("submitted job #{} ({}) as {}", row.id, row.job_type, row.state);
        }

        Command::Approve { job_id } => apply(&pg_pool, job_id, JobAction::Approve, None).await?,
        Command::Reject { job_id, message } => apply(&pg_pool, job_id, JobAction::Reject, message).await?,
        Command::Cancel { job_id, message } => apply(&pg_pool, job_id, JobAction::Cancel, message).await?,
        Command::Abort { job_id, message } => apply(&pg_pool, job_id, JobAction::Abort, message).await?,
        Command::Retry { job_id } => apply(&pg_pool, job_id, JobAction::Retry, None).await?,
        Command::Repeat { job_id } => apply(&pg_pool, job_id, JobAction::Repeat, None).await?,
    }

    Ok(())
}

async fn apply(pool: &sqlx::PgPool, job_id: i64, action: JobAction, message: Option<String>) -> Result<()> {
    let row = job::apply_action(pool, JobId::new(job_id), action, message)
        .await
        .with_context(|| format!("failed to {} job #{job_id}", action.name()))?;
    println!("job #{} now {}", row.id, row.state);
    Ok(())
}

#[cfg(unix)]
fn install_shutdown_handler(shutdown_tx: tokio::sync::oneshot::Sender<()>) {
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
        let _ = shutdown_tx.send(());
    });
}

#[cfg(not(unix))]
fn install_shutdown_handler(shutdown_tx: tokio::sync::oneshot::Sender<()>) {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(());
    });
}
