//! The operator-facing state transitions: `reject`/`approve`/`cancel`/
//! `abort`/`repeat`/`retry`. Mirrors `controllib.jobs.JobAction`, an enum
//! whose members carry their own `(past_label, old_state, new_state)`.

use srcf_protocol::JobState;

use crate::error::{JobsError, Result};

/// One of the six operator actions a job can be transitioned by. Each
/// variant is only valid from one specific [`JobState`] and lands in one
/// specific other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobAction {
    Reject,
    Approve,
    Cancel,
    Abort,
    Repeat,
    Retry,
}

impl JobAction {
    pub fn name(&self) -> &'static str {
        match self {
            JobAction::Reject => "reject",
            JobAction::Approve => "approve",
            JobAction::Cancel => "cancel",
            JobAction::Abort => "abort",
            JobAction::Repeat => "repeat",
            JobAction::Retry => "retry",
        }
    }

    /// The label used in the auto-generated state message, e.g. "rejected".
    pub fn past_label(&self) -> &'static str {
        match self {
            JobAction::Reject => "rejected",
            JobAction::Approve => "approved",
            JobAction::Cancel => "cancelled",
            JobAction::Abort => "aborted",
            JobAction::Repeat => "repeated",
            JobAction::Retry => "retried",
        }
    }

    pub fn old_state(&self) -> JobState {
        match self {
            JobAction::Reject => JobState::Unapproved,
            JobAction::Approve => JobState::Unapproved,
            JobAction::Cancel => JobState::Queued,
            JobAction::Abort => JobState::Running,
            JobAction::Repeat => JobState::Done,
            JobAction::Retry => JobState::Failed,
        }
    }

    pub fn new_state(&self) -> JobState {
        match self {
            JobAction::Reject => JobState::Withdrawn,
            JobAction::Approve => JobState::Queued,
            JobAction::Cancel => JobState::Failed,
            JobAction::Abort => JobState::Failed,
            JobAction::Repeat => JobState::Queued,
            JobAction::Retry => JobState::Queued,
        }
    }
}

/// Apply `action` to a job currently in `current`, yielding its new state
/// and state message. Fails with [`JobsError::ActionInvalid`] if `current`
/// isn't the action's required starting state. When landing in `failed` or
/// `withdrawn` with no explicit `message`, a default "Job {past_label} by
/// sysadmins" message is generated, matching `Job.transition`.
pub fn transition(
    current: JobState,
    action: JobAction,
    message: Option<String>,
) -> Result<(JobState, Option<String>)> {
    if current != action.old_state() {
        return Err(JobsError::ActionInvalid {
            action: action.name(),
            required: action.old_state(),
            current,
        });
    }
    let new_state = action.new_state();
    let message = match message {
        Some(m) => Some(m),
        None if matches!(new_state, JobState::Failed | JobState::Withdrawn) => {
            Some(format!("Job {} by sysadmins", action.past_label()))
        }
        None => None,
    };
    Ok((new_state, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_moves_unapproved_to_queued() {
        let (state, message) = transition(JobState::Unapproved, JobAction::Approve, None).unwrap();
        assert_eq!(state, JobState::Queued);
        assert_eq!(message, None);
    }

    #[test]
    fn reject_generates_default_message() {
        let (state, message) = transition(JobState::Unapproved, JobAction::Reject, None).unwrap();
        assert_eq!(state, JobState::Withdrawn);
        assert_eq!(message.as_deref(), Some("Job rejected by sysadmins"));
    }

    #[test]
    fn explicit_message_is_preserved() {
        let (_, message) = transition(
            JobState::Running,
            JobAction::Abort,
            Some("operator intervention".to_string()),
        )
        .unwrap();
        assert_eq!(message.as_deref(), Some("operator intervention"));
    }

    #[test]
    fn wrong_starting_state_is_rejected() {
        let err = transition(JobState::Queued, JobAction::Approve, None).unwrap_err();
        assert!(matches!(err, JobsError::ActionInvalid { .. }));
    }
}
