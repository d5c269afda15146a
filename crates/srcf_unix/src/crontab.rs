//! Per-user crontab management: clearing a cancelled member's crontab so
//! nothing keeps running under a disabled account.

use srcf_task::{hosts, require_host, State, TaskResult};

use crate::error::{Result, UnixError};
use crate::process::run;

/// Delete `name`'s crontab, if one exists. `crontab -r` exits non-zero with
/// no crontab to remove; that case is folded into `Unchanged` rather than
/// propagated as an error.
pub async fn clear_crontab(name: &str) -> Result<TaskResult<()>> {
    require_host("clear_crontab", &[hosts::USER], &srcf_task::current_hostname())?;
    match run("crontab", &["-u", name, "-r"]).await {
        Ok(_) => Ok(TaskResult::new("clear_crontab", State::Success, ())),
        Err(UnixError::CommandFailed { ref stderr, .. }) if stderr.contains("no crontab for") => {
            Ok(TaskResult::new("clear_crontab", State::Unchanged, ()))
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_crontab_message_is_recognised() {
        let err = UnixError::CommandFailed {
            program: "crontab".into(),
            status: "exit status: 1".into(),
            stderr: "no crontab for spqr2\n".into(),
        };
        assert!(matches!(err, UnixError::CommandFailed { ref stderr, .. } if stderr.contains("no crontab for")));
    }
}
