//! Building an [`srcf_jobs::ApprovalContext`] from the current state of the
//! membership database, so [`crate::job::submit`]'s caller can decide
//! whether a freshly created job lands in `unapproved` or `queued`.
//!
//! Mirrors each job class's `new()` classmethod inspecting `Member.danger`/
//! `Society.danger`/`Society.role_email`/the current admin set in
//! `controllib/jobs.py`, except gathered up front here rather than read
//! lazily off an ORM instance.

use sqlx::postgres::PgPool;

use srcf_jobs::{ApprovalContext, JobKind};

use crate::error::Result;

/// Look up whatever danger flags/role-email/last-admin facts `kind` needs
/// to decide approval, given the crsid of the member who submitted it.
pub async fn build_approval_context(pool: &PgPool, kind: &JobKind, owner_crsid: &str) -> Result<ApprovalContext> {
    let mut ctx = ApprovalContext::default();

    if let Some(owner) = srcf_bespoke::get_member(pool, owner_crsid).await? {
        ctx.requester_danger = owner.danger;
    }

    if let Some(society_name) = kind.society() {
        if let Some(society) = srcf_bespoke::get_society(pool, society_name).await? {
            ctx.society_danger = society.danger;
            ctx.society_has_role_email = society.role_email.is_some();

            if let JobKind::ChangeSocietyAdmin {
                target_member,
                action: srcf_jobs::AdminAction::Remove,
                ..
            } = kind
            {
                ctx.is_last_admin_removal =
                    society.admin_crsids == [target_member.clone()];
            }
        }
    }

    if let JobKind::ChangeSocietyAdmin { target_member, .. } = kind {
        if let Some(target) = srcf_bespoke::get_member(pool, target_member).await? {
            ctx.target_member_danger = target.danger;
        }
    }

    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_requires_no_approval_for_signup() {
        let kind = JobKind::Signup {
            crsid: "ab123".into(),
            preferred_name: "Alice".into(),
            surname: "Baker".into(),
            email: "ab123@cam.ac.uk".into(),
            mail_handler: srcf_protocol::MailHandler::Forward,
            social: false,
        };
        assert!(!srcf_jobs::requires_approval(&kind, &ApprovalContext::default()));
    }
}
