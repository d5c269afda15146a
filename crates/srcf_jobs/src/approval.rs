//! Approval policy: whether a freshly submitted job lands in `unapproved`
//! (needs an operator's sign-off) or goes straight to `queued`. Mirrors each
//! job class's `new()` classmethod's `require_approval` computation in
//! `controllib/jobs.py`, plus this system's resolved approval-policy open
//! question (vhost/domain adds always require approval; last-admin removal
//! requires approval only when the society has a role email; any operation
//! touching a `danger=true` entity requires approval).

use crate::kind::JobKind;

/// The danger/last-admin facts a caller already knows about the entities a
/// job names, needed to decide whether it requires approval. Irrelevant
/// fields for a given job kind are simply left at their `Default`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApprovalContext {
    /// `danger` flag of the member submitting the job (or being acted on,
    /// for member-scoped jobs where requester and subject are the same).
    pub requester_danger: bool,
    /// `danger` flag of the society a society-scoped job names.
    pub society_danger: bool,
    /// `danger` flag of a third-party target member (only meaningful for
    /// [`JobKind::ChangeSocietyAdmin`]).
    pub target_member_danger: bool,
    /// Whether this `ChangeSocietyAdmin { action: Remove, .. }` would
    /// remove the society's last remaining admin.
    pub is_last_admin_removal: bool,
    /// Whether the society already has a role email configured.
    pub society_has_role_email: bool,
}

/// Whether a job of this kind, given `ctx`, must be created in the
/// `unapproved` state rather than `queued`.
pub fn requires_approval(kind: &JobKind, ctx: &ApprovalContext) -> bool {
    match kind {
        // Public signup never waits on approval, regardless of danger: the
        // whole point is unattended self-service account creation.
        JobKind::Signup { .. } => false,

        // Reactivation always requires approval: a dormant account is
        // re-enabled with a freshly issued password, worth a human glance.
        JobKind::Reactivate { .. } => true,

        JobKind::ResetUserPassword
        | JobKind::UpdateName { .. }
        | JobKind::UpdateEmailAddress { .. }
        | JobKind::UpdateMailHandler { .. }
        | JobKind::CreateUserMailingList { .. }
        | JobKind::ResetUserMailingListPassword { .. }
        | JobKind::ChangeUserVhostDocroot { .. }
        | JobKind::RemoveUserVhost { .. }
        | JobKind::CreateMySQLUserDatabase
        | JobKind::ResetMySQLUserPassword
        | JobKind::CreatePostgresUserDatabase
        | JobKind::ResetPostgresUserPassword => ctx.requester_danger,

        // Adding a custom domain always requires approval: subdomain/
        // wildcard overlap with another owner's domain isn't validated
        // anywhere upstream of approval.
        JobKind::AddUserVhost { .. } | JobKind::AddSocietyVhost { .. } => true,

        // Creating a society always requires approval.
        JobKind::CreateSociety { .. } => true,

        JobKind::UpdateSocietyDescription { .. } => ctx.requester_danger || ctx.society_danger,

        JobKind::UpdateSocietyRoleEmail { email, .. } => {
            ctx.requester_danger || ctx.society_danger || !email.is_empty()
        }

        JobKind::ChangeSocietyAdmin { action, .. } => {
            ctx.society_danger
                || ctx.target_member_danger
                || ctx.requester_danger
                || (*action == crate::kind::AdminAction::Remove
                    && ctx.is_last_admin_removal
                    && ctx.society_has_role_email)
        }

        JobKind::CreateSocietyMailingList { .. }
        | JobKind::ResetSocietyMailingListPassword { .. }
        | JobKind::ChangeSocietyVhostDocroot { .. }
        | JobKind::RemoveSocietyVhost { .. }
        | JobKind::CreateMySQLSocietyDatabase { .. }
        | JobKind::ResetMySQLSocietyPassword { .. }
        | JobKind::CreatePostgresSocietyDatabase { .. }
        | JobKind::ResetPostgresSocietyPassword { .. } => ctx.requester_danger || ctx.society_danger,

        // Exercises concurrency only; never gated.
        JobKind::Test { .. } => false,

        // Cancelling or deleting an account is destructive and not
        // reversible by the runner itself; always worth an operator's
        // sign-off regardless of any danger flag.
        JobKind::CancelMember { .. } | JobKind::DeleteMember | JobKind::DeleteSociety { .. } => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::AdminAction;

    #[test]
    fn signup_never_requires_approval() {
        let kind = JobKind::Signup {
            crsid: "ab123".into(),
            preferred_name: "Alice".into(),
            surname: "Baker".into(),
            email: "ab123@cam.ac.uk".into(),
            mail_handler: srcf_protocol::MailHandler::Forward,
            social: false,
        };
        let mut ctx = ApprovalContext::default();
        ctx.requester_danger = true;
        assert!(!requires_approval(&kind, &ctx));
    }

    #[test]
    fn danger_flag_gates_reset_password() {
        let kind = JobKind::ResetUserPassword;
        assert!(!requires_approval(&kind, &ApprovalContext::default()));
        let ctx = ApprovalContext { requester_danger: true, ..Default::default() };
        assert!(requires_approval(&kind, &ctx));
    }

    #[test]
    fn vhost_add_always_requires_approval() {
        let kind = JobKind::AddUserVhost { domain: "example.com".into(), root: None };
        assert!(requires_approval(&kind, &ApprovalContext::default()));
    }

    #[test]
    fn last_admin_removal_needs_approval_only_with_role_email() {
        let kind = JobKind::ChangeSocietyAdmin {
            society: "spqr".into(),
            target_member: "ab123".into(),
            action: AdminAction::Remove,
        };
        let without_role_email = ApprovalContext { is_last_admin_removal: true, ..Default::default() };
        assert!(!requires_approval(&kind, &without_role_email));

        let with_role_email = ApprovalContext {
            is_last_admin_removal: true,
            society_has_role_email: true,
            ..Default::default()
        };
        assert!(requires_approval(&kind, &with_role_email));
    }

    #[test]
    fn setting_a_role_email_requires_approval_even_without_danger() {
        let kind = JobKind::UpdateSocietyRoleEmail {
            society: "spqr".into(),
            email: "committee@spqr.soc.srcf.net".into(),
        };
        assert!(requires_approval(&kind, &ApprovalContext::default()));
    }

    #[test]
    fn cancellation_and_deletion_always_require_approval() {
        assert!(requires_approval(&JobKind::CancelMember { keep_groups: false }, &ApprovalContext::default()));
        assert!(requires_approval(&JobKind::DeleteMember, &ApprovalContext::default()));
        assert!(requires_approval(
            &JobKind::DeleteSociety { society: "spqr".into() },
            &ApprovalContext::default()
        ));
    }

    #[test]
    fn clearing_a_role_email_does_not_by_itself_require_approval() {
        let kind = JobKind::UpdateSocietyRoleEmail { society: "spqr".into(), email: "".into() };
        assert!(!requires_approval(&kind, &ApprovalContext::default()));
    }
}
