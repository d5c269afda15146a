//! Operator notification on job failure. Mirrors `job_runner.py`'s
//! `notify_sysadmins`: every terminal failure, clean or unexpected, mails
//! the sysadmins list with the job id/type/owner and whatever detail is
//! available.

use srcf_email::{EmailWrapper, JobFailed, Recipient};
use srcf_protocol::JobId;

use crate::error::Result;

/// Email the sysadmins that a job has failed. Errors from the send itself
/// are swallowed to a log line rather than propagated — a failed
/// notification must never turn a handled job failure into an unhandled
/// one, or mask the job's own terminal state.
pub async fn notify_job_failed(
    email: &EmailWrapper,
    sysadmin_address: &str,
    job_id: JobId,
    job_type: &str,
    owner: Option<&str>,
    message: &str,
    raw: Option<&str>,
) {
    let template = JobFailed {
        job_id: job_id.as_i64(),
        job_type: job_type.to_string(),
        owner: owner.unwrap_or("(no owner)").to_string(),
        message: match raw {
            Some(raw) => format!("{message}\n\n{raw}"),
            None => message.to_string(),
        },
    };
    let recipient = Recipient::Bare(sysadmin_address.to_string());
    if let Err(err) = email.send(recipient, &template).await {
        tracing::error!(%job_id, error = %err, "failed to notify sysadmins of job failure");
    }
}
