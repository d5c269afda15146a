//! The password-reset family of jobs: UNIX login, each SQL dialect's
//! account, and a mailing list's admin password. Grounded on
//! `srcflib.tasks.members.reset_password`/`srcflib.tasks.mysql`/
//! `srcflib.tasks.pgsql`/`srcflib.tasks.mailman`.

use srcf_protocol::Owner;
use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

async fn notify_member(ctx: &TaskContext, crsid: &str, system: &str, password: &str) -> Result<TaskResult<()>> {
    let member = srcf_bespoke::get_member(&ctx.pg_pool, crsid)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such member {crsid}")))?;
    Ok(ctx
        .email
        .send(
            Owner::Member(&member).into(),
            &srcf_email::PasswordReset {
                target_desc: srcf_email::target_desc(Owner::Member(&member)),
                system: system.to_string(),
                password: password.to_string(),
            },
        )
        .await?)
}

async fn notify_society(ctx: &TaskContext, society: &str, system: &str, password: &str) -> Result<TaskResult<()>> {
    let record = srcf_bespoke::get_society(&ctx.pg_pool, society)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such society {society}")))?;
    Ok(ctx
        .email
        .send(
            Owner::Society(&record).into(),
            &srcf_email::PasswordReset {
                target_desc: srcf_email::target_desc(Owner::Society(&record)),
                system: system.to_string(),
                password: password.to_string(),
            },
        )
        .await?)
}

pub async fn reset_user_password(ctx: &TaskContext, crsid: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    let password = builder
        .push("reset_password", srcf_unix::reset_password(crsid).await?)
        .expect("reset_password always returns a value");
    builder.step(
        "notify",
        notify_member(ctx, crsid, "your SRCF UNIX account", password.reveal()).await?,
    );
    Ok(builder.finish("reset_user_password", ()))
}

pub async fn reset_mysql_user_password(ctx: &TaskContext, crsid: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    let password = builder
        .push("reset_password", srcf_sql::mysql::reset_password(&ctx.mysql_pool, crsid).await?)
        .expect("reset_password always returns a value");
    builder.step(
        "notify",
        notify_member(ctx, crsid, "your SRCF MySQL account", password.reveal()).await?,
    );
    Ok(builder.finish("reset_mysql_user_password", ()))
}

pub async fn reset_postgres_user_password(ctx: &TaskContext, crsid: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    let password = builder
        .push("reset_password", srcf_sql::pgsql::reset_password(&ctx.pg_pool, crsid).await?)
        .expect("reset_password always returns a value");
    builder.step(
        "notify",
        notify_member(ctx, crsid, "your SRCF PostgreSQL account", password.reveal()).await?,
    );
    Ok(builder.finish("reset_postgres_user_password", ()))
}

pub async fn reset_user_mailing_list_password(ctx: &TaskContext, crsid: &str, listname: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    let password = builder
        .push("reset_password", srcf_mailman::reset_password(listname).await?)
        .expect("reset_password always returns a value");
    builder.step(
        "notify",
        notify_member(ctx, crsid, &format!("the {listname} mailing list"), password.reveal()).await?,
    );
    Ok(builder.finish("reset_user_mailing_list_password", ()))
}

pub async fn reset_society_mailing_list_password(ctx: &TaskContext, society: &str, listname: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    let password = builder
        .push("reset_password", srcf_mailman::reset_password(listname).await?)
        .expect("reset_password always returns a value");
    builder.step(
        "notify",
        notify_society(ctx, society, &format!("the {listname} mailing list"), password.reveal()).await?,
    );
    Ok(builder.finish("reset_society_mailing_list_password", ()))
}

pub async fn reset_mysql_society_password(ctx: &TaskContext, society: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    let password = builder
        .push("reset_password", srcf_sql::mysql::reset_password(&ctx.mysql_pool, society).await?)
        .expect("reset_password always returns a value");
    builder.step(
        "notify",
        notify_society(ctx, society, "your SRCF MySQL account", password.reveal()).await?,
    );
    Ok(builder.finish("reset_mysql_society_password", ()))
}

pub async fn reset_postgres_society_password(ctx: &TaskContext, society: &str) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    let password = builder
        .push("reset_password", srcf_sql::pgsql::reset_password(&ctx.pg_pool, society).await?)
        .expect("reset_password always returns a value");
    builder.step(
        "notify",
        notify_society(ctx, society, "your SRCF PostgreSQL account", password.reveal()).await?,
    );
    Ok(builder.finish("reset_postgres_society_password", ()))
}
