//! Maps every [`JobKind`] onto the workflow function that runs it.
//! Grounded on `controllib.jobs`' `all_jobs` registry, which does the same
//! dispatch by class rather than by match arm.
//!
//! `JobKind` carries a society name for society-scoped variants but, unlike
//! the original's `row.owner`, no crsid for member-scoped ones — those
//! come from `owner_crsid`, the member who submitted the job.

use srcf_jobs::JobKind;
use srcf_task::TaskResult;

use crate::context::TaskContext;
use crate::error::Result;

pub async fn dispatch(ctx: &TaskContext, kind: &JobKind, owner_crsid: &str) -> Result<TaskResult<()>> {
    match kind {
        JobKind::Test { sleep_time } => crate::test_task::run(*sleep_time).await,

        JobKind::Signup {
            crsid,
            preferred_name,
            surname,
            email,
            mail_handler,
            social,
        } => Ok(crate::signup::run(ctx, crsid, preferred_name, surname, email, *mail_handler, *social)
            .await?
            .map(|_| ())),

        JobKind::Reactivate { email } => crate::reactivate::run(ctx, owner_crsid, email).await,
        JobKind::ResetUserPassword => crate::password_reset::reset_user_password(ctx, owner_crsid).await,
        JobKind::UpdateName { preferred_name, surname } => {
            crate::update::update_name(ctx, owner_crsid, preferred_name, surname).await
        }
        JobKind::UpdateEmailAddress { email } => crate::update::update_email_address(ctx, owner_crsid, email).await,
        JobKind::UpdateMailHandler { mail_handler } => {
            crate::update::update_mail_handler(ctx, owner_crsid, *mail_handler).await
        }
        JobKind::CreateUserMailingList { listname } => {
            crate::mailing_list::create_user_mailing_list(ctx, owner_crsid, listname).await
        }
        JobKind::ResetUserMailingListPassword { listname } => {
            crate::password_reset::reset_user_mailing_list_password(ctx, owner_crsid, listname).await
        }
        JobKind::AddUserVhost { domain, root } => {
            crate::vhost::add_user_vhost(ctx, owner_crsid, domain, root.as_deref()).await
        }
        JobKind::ChangeUserVhostDocroot { domain, root } => {
            crate::vhost::change_user_vhost_docroot(ctx, owner_crsid, domain, root.as_deref()).await
        }
        JobKind::RemoveUserVhost { domain } => crate::vhost::remove_user_vhost(ctx, owner_crsid, domain).await,

        JobKind::CreateSociety {
            society,
            description,
            admins,
        } => Ok(crate::society::run(ctx, society, description, admins).await?.map(|_| ())),

        JobKind::UpdateSocietyDescription { society, description } => {
            crate::update::update_society_description(ctx, society, description).await
        }
        JobKind::UpdateSocietyRoleEmail { society, email } => {
            crate::update::update_society_role_email(ctx, society, email).await
        }
        JobKind::ChangeSocietyAdmin {
            society,
            target_member,
            action,
        } => crate::admin::run(ctx, society, target_member, *action).await,
        JobKind::CreateSocietyMailingList { society, listname } => {
            crate::mailing_list::create_society_mailing_list(ctx, society, listname).await
        }
        JobKind::ResetSocietyMailingListPassword { society, listname } => {
            crate::password_reset::reset_society_mailing_list_password(ctx, society, listname).await
        }

        JobKind::CreateMySQLUserDatabase => crate::sql_db::create_mysql_database(ctx, owner_crsid).await,
        JobKind::ResetMySQLUserPassword => crate::password_reset::reset_mysql_user_password(ctx, owner_crsid).await,
        JobKind::CreateMySQLSocietyDatabase { society } => crate::sql_db::create_mysql_database(ctx, society).await,
        JobKind::ResetMySQLSocietyPassword { society } => {
            crate::password_reset::reset_mysql_society_password(ctx, society).await
        }
        JobKind::CreatePostgresUserDatabase => crate::sql_db::create_postgres_database(ctx, owner_crsid).await,
        JobKind::ResetPostgresUserPassword => {
            crate::password_reset::reset_postgres_user_password(ctx, owner_crsid).await
        }
        JobKind::CreatePostgresSocietyDatabase { society } => {
            crate::sql_db::create_postgres_database(ctx, society).await
        }
        JobKind::ResetPostgresSocietyPassword { society } => {
            crate::password_reset::reset_postgres_society_password(ctx, society).await
        }

        JobKind::AddSocietyVhost { society, domain, root } => {
            crate::vhost::add_society_vhost(ctx, society, domain, root.as_deref()).await
        }
        JobKind::ChangeSocietyVhostDocroot { society, domain, root } => {
            crate::vhost::change_society_vhost_docroot(ctx, society, domain, root.as_deref()).await
        }
        JobKind::RemoveSocietyVhost { society, domain } => {
            crate::vhost::remove_society_vhost(ctx, society, domain).await
        }

        JobKind::CancelMember { keep_groups } => crate::cancel::run(ctx, owner_crsid, *keep_groups).await,
        JobKind::DeleteMember => crate::delete::delete_member(ctx, owner_crsid).await,
        JobKind::DeleteSociety { society } => crate::delete::delete_society(ctx, society).await,
    }
}
