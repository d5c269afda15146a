//! The `delete_member`/`delete_society` jobs: the irreversible end state
//! after cancellation, scrubbing personal data and dropping whatever
//! resources [`crate::cancel`] left behind. Grounded on
//! `srcflib.tasks.members.delete_member`/`srcflib.tasks.societies.delete_society`.
//!
//! Redacting historical job-queue rows that carried this entity's personal
//! data is the runner's job, not this crate's — it owns the job table.

use srcf_email::Recipient;
use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

pub async fn delete_member(ctx: &TaskContext, crsid: &str) -> Result<TaskResult<()>> {
    let member = srcf_bespoke::get_member(&ctx.pg_pool, crsid)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such member {crsid}")))?;
    let uid = member.uid.ok_or_else(|| TasksError::Other(format!("{crsid} has no uid assigned")))?;

    let mut builder = ResultBuilder::new();

    let scrubbed_name = format!("exmbr{uid}");
    builder.step(
        "rename_user",
        srcf_unix::rename_user(crsid, &scrubbed_name).await?,
    );
    builder.step(
        "upsert_member",
        srcf_bespoke::upsert_member(
            &ctx.pg_pool,
            crsid,
            "Former",
            "Member",
            &format!("{crsid}@srcf.net"),
            srcf_protocol::MailHandler::Pip,
            false,
            false,
        )
        .await?
        .map(|_| ()),
    );

    builder.step("drop_mysql_user", srcf_sql::mysql::drop_user(&ctx.mysql_pool, crsid).await?);
    builder.step("drop_postgres_user", srcf_sql::pgsql::drop_user(&ctx.pg_pool, crsid).await?);
    builder.step("empty_legacy_mailbox", srcf_bespoke::empty_legacy_mailbox(crsid).await?);

    for domain in &srcf_bespoke::get_domains_for_owner(&ctx.pg_pool, crsid).await? {
        builder.step(
            format!("delete_domain:{}", domain.domain),
            srcf_bespoke::delete_domain(&ctx.pg_pool, &domain.domain).await?,
        );
    }

    builder.step("export_members", srcf_bespoke::export_members().await?);

    builder.step(
        "notify",
        ctx.email
            .send(
                Recipient::Named {
                    name: "SRCF sysadmins".into(),
                    email: ctx.sysadmin_email.clone(),
                },
                &srcf_email::EntityDeleted {
                    kind: "member".to_string(),
                    name: crsid.to_string(),
                },
            )
            .await?,
    );

    Ok(builder.finish("delete_member", ()))
}

pub async fn delete_society(ctx: &TaskContext, society: &str) -> Result<TaskResult<()>> {
    let record = srcf_bespoke::get_society(&ctx.pg_pool, society)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such society {society}")))?;
    let uid = record.uid.ok_or_else(|| TasksError::Other(format!("{society} has no uid assigned")))?;

    let mut builder = ResultBuilder::new();

    for crsid in &record.admin_crsids {
        builder.step(
            format!("remove_admin:{crsid}"),
            srcf_bespoke::remove_from_society(&ctx.pg_pool, crsid, society).await?.map(|_| ()),
        );
        builder.step(
            format!("sync_side_effects:{crsid}"),
            crate::society::sync_admin_side_effects(ctx, society, crsid, false).await?,
        );
        builder.step(
            format!("sync_mysql_role:{crsid}"),
            crate::role_sync::sync_mysql_admin(&ctx.mysql_pool, society, crsid, false).await?,
        );
        builder.step(
            format!("sync_postgres_role:{crsid}"),
            crate::role_sync::sync_postgres_admin(&ctx.pg_pool, society, crsid, false).await?,
        );
    }

    let scrubbed_name = format!("exsoc{uid}");
    builder.step(
        "rename_user",
        srcf_unix::rename_user(society, &scrubbed_name).await?,
    );

    for db in srcf_sql::mysql::get_matched_databases(&ctx.mysql_pool, society)
        .await?
        .into_iter()
        .chain(srcf_sql::mysql::get_matched_databases(&ctx.mysql_pool, &format!("{society}/%")).await?)
    {
        builder.step(format!("drop_mysql_database:{db}"), srcf_sql::mysql::drop_database(&ctx.mysql_pool, &db).await?);
    }
    builder.step("drop_mysql_user", srcf_sql::mysql::drop_user(&ctx.mysql_pool, society).await?);

    for db in srcf_sql::pgsql::get_matched_databases(&ctx.pg_pool, society)
        .await?
        .into_iter()
        .chain(srcf_sql::pgsql::get_matched_databases(&ctx.pg_pool, &format!("{society}/%")).await?)
    {
        builder.step(format!("drop_postgres_database:{db}"), srcf_sql::pgsql::drop_database(&ctx.pg_pool, &db).await?);
    }
    builder.step("drop_postgres_user", srcf_sql::pgsql::drop_user(&ctx.pg_pool, society).await?);

    for domain in &srcf_bespoke::get_domains_for_owner(&ctx.pg_pool, society).await? {
        builder.step(
            format!("delete_domain:{}", domain.domain),
            srcf_bespoke::delete_domain(&ctx.pg_pool, &domain.domain).await?,
        );
    }

    let source_dir = format!("{}/{society}", ctx.paths.society_home_root);
    builder.step(
        "archive_society",
        srcf_bespoke::archive_society(society, &source_dir, &ctx.paths.archive_root).await?.map(|_| ()),
    );

    builder.step("export_members", srcf_bespoke::export_members().await?);

    builder.step(
        "notify",
        ctx.email
            .send(
                Recipient::Named {
                    name: "SRCF sysadmins".into(),
                    email: ctx.sysadmin_email.clone(),
                },
                &srcf_email::EntityDeleted {
                    kind: "society".to_string(),
                    name: society.to_string(),
                },
            )
            .await?,
    );

    Ok(builder.finish("delete_society", ()))
}
