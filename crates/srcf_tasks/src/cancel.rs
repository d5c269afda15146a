//! The `cancel_member` job: wind a member's account down without erasing
//! it. Grounded on `srcflib.tasks.members.cancel_member`, which runs the
//! same sequence — disable login, drop the crontab, kill running
//! processes, archive nothing (members, unlike societies, have no archive
//! step of their own), drop SQL logins, and leave every group unless
//! `keep_groups` is false.

use srcf_email::Recipient;
use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

pub async fn run(ctx: &TaskContext, crsid: &str, keep_groups: bool) -> Result<TaskResult<()>> {
    let member = srcf_bespoke::get_member(&ctx.pg_pool, crsid)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such member {crsid}")))?;

    let mut builder = ResultBuilder::new();

    builder.step(
        "disable_login",
        srcf_unix::ensure_user(
            crsid,
            srcf_unix::EnsureUser {
                uid: member.uid.map(|v| v as u32),
                gid: member.gid.map(|v| v as u32),
                system: false,
                active: Some(false),
                home_dir: None,
                real_name: None,
            },
        )
        .await?,
    );
    builder.step("clear_crontab", srcf_unix::clear_crontab(crsid).await?);
    builder.step("slay", srcf_bespoke::slay(crsid).await?);

    builder.step(
        "upsert_member",
        srcf_bespoke::upsert_member(
            &ctx.pg_pool,
            crsid,
            &member.preferred_name,
            &member.surname,
            &member.email,
            member.mail_handler,
            member.member,
            false,
        )
        .await?
        .map(|_| ()),
    );

    builder.step("drop_mysql_user", srcf_sql::mysql::drop_user(&ctx.mysql_pool, crsid).await?);
    builder.step("disable_postgres_role", srcf_sql::pgsql::disable_role(&ctx.pg_pool, crsid).await?);

    if !keep_groups {
        for society in &srcf_bespoke::get_societies_for_admin(&ctx.pg_pool, crsid).await? {
            builder.step(
                format!("leave_society:{society}"),
                srcf_bespoke::remove_from_society(&ctx.pg_pool, crsid, society).await?.map(|_| ()),
            );
            builder.step(
                format!("sync_side_effects:{society}"),
                crate::society::sync_admin_side_effects(ctx, society, crsid, false).await?,
            );
            builder.step(
                format!("sync_mysql_role:{society}"),
                crate::role_sync::sync_mysql_admin(&ctx.mysql_pool, society, crsid, false).await?,
            );
            builder.step(
                format!("sync_postgres_role:{society}"),
                crate::role_sync::sync_postgres_admin(&ctx.pg_pool, society, crsid, false).await?,
            );
        }
    }

    builder.step("update_nis", srcf_bespoke::update_nis(false).await?);
    builder.step("export_members", srcf_bespoke::export_members().await?);

    builder.step(
        "notify",
        ctx.email
            .send(
                Recipient::Named {
                    name: "SRCF sysadmins".into(),
                    email: ctx.sysadmin_email.clone(),
                },
                &srcf_email::MemberCancelled { crsid: crsid.to_string() },
            )
            .await?,
    );

    Ok(builder.finish("cancel_member", ()))
}
