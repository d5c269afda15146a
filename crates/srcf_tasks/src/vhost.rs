//! Custom vhost registration jobs for members and societies. Grounded on
//! `srcflib.tasks.members.add_vhost`/`srcflib.tasks.societies.add_vhost` —
//! both thin wrappers around [`srcf_bespoke::domain`] here, since a vhost
//! row doesn't care whether its owner is a member or a society; what
//! differs per owner kind is only how the notification email is addressed.

use srcf_protocol::{Member, Owner, Society};
use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

async fn get_member(ctx: &TaskContext, crsid: &str) -> Result<Member> {
    srcf_bespoke::get_member(&ctx.pg_pool, crsid)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such member {crsid}")))
}

async fn get_society(ctx: &TaskContext, society: &str) -> Result<Society> {
    srcf_bespoke::get_society(&ctx.pg_pool, society)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such society {society}")))
}

pub async fn add_user_vhost(ctx: &TaskContext, crsid: &str, domain: &str, root: Option<&str>) -> Result<TaskResult<()>> {
    let member = get_member(ctx, crsid).await?;
    let mut builder = ResultBuilder::new();
    builder.step("insert_domain", srcf_bespoke::insert_domain(&ctx.pg_pool, domain, crsid, root).await?.map(|_| ()));
    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Member(&member).into(),
                &srcf_email::VhostAdded {
                    target_desc: srcf_email::target_desc(Owner::Member(&member)),
                    domain: domain.to_string(),
                    root: root.unwrap_or_default().to_string(),
                },
            )
            .await?,
    );
    Ok(builder.finish("add_user_vhost", ()))
}

pub async fn change_user_vhost_docroot(ctx: &TaskContext, crsid: &str, domain: &str, root: Option<&str>) -> Result<TaskResult<()>> {
    let member = get_member(ctx, crsid).await?;
    let existing = srcf_bespoke::get_domain(&ctx.pg_pool, domain)
        .await?
        .ok_or_else(|| TasksError::Other(format!("domain {domain} is not registered")))?;
    let old_root = existing.root.clone().unwrap_or_default();

    let mut builder = ResultBuilder::new();
    builder.step("set_domain_root", srcf_bespoke::set_domain_root(&ctx.pg_pool, domain, root).await?.map(|_| ()));
    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Member(&member).into(),
                &srcf_email::VhostDocrootChanged {
                    target_desc: srcf_email::target_desc(Owner::Member(&member)),
                    domain: domain.to_string(),
                    old_root,
                    new_root: root.unwrap_or_default().to_string(),
                },
            )
            .await?,
    );
    Ok(builder.finish("change_user_vhost_docroot", ()))
}

pub async fn remove_user_vhost(ctx: &TaskContext, crsid: &str, domain: &str) -> Result<TaskResult<()>> {
    let member = get_member(ctx, crsid).await?;
    let mut builder = ResultBuilder::new();
    builder.step("delete_domain", srcf_bespoke::delete_domain(&ctx.pg_pool, domain).await?);
    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Member(&member).into(),
                &srcf_email::VhostRemoved {
                    target_desc: srcf_email::target_desc(Owner::Member(&member)),
                    domain: domain.to_string(),
                },
            )
            .await?,
    );
    Ok(builder.finish("remove_user_vhost", ()))
}

pub async fn add_society_vhost(ctx: &TaskContext, society: &str, domain: &str, root: Option<&str>) -> Result<TaskResult<()>> {
    let record = get_society(ctx, society).await?;
    let mut builder = ResultBuilder::new();
    builder.step("insert_domain", srcf_bespoke::insert_domain(&ctx.pg_pool, domain, society, root).await?.map(|_| ()));
    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Society(&record).into(),
                &srcf_email::VhostAdded {
                    target_desc: srcf_email::target_desc(Owner::Society(&record)),
                    domain: domain.to_string(),
                    root: root.unwrap_or_default().to_string(),
                },
            )
            .await?,
    );
    Ok(builder.finish("add_society_vhost", ()))
}

pub async fn change_society_vhost_docroot(ctx: &TaskContext, society: &str, domain: &str, root: Option<&str>) -> Result<TaskResult<()>> {
    let record = get_society(ctx, society).await?;
    let existing = srcf_bespoke::get_domain(&ctx.pg_pool, domain)
        .await?
        .ok_or_else(|| TasksError::Other(format!("domain {domain} is not registered")))?;
    let old_root = existing.root.clone().unwrap_or_default();

    let mut builder = ResultBuilder::new();
    builder.step("set_domain_root", srcf_bespoke::set_domain_root(&ctx.pg_pool, domain, root).await?.map(|_| ()));
    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Society(&record).into(),
                &srcf_email::VhostDocrootChanged {
                    target_desc: srcf_email::target_desc(Owner::Society(&record)),
                    domain: domain.to_string(),
                    old_root,
                    new_root: root.unwrap_or_default().to_string(),
                },
            )
            .await?,
    );
    Ok(builder.finish("change_society_vhost_docroot", ()))
}

pub async fn remove_society_vhost(ctx: &TaskContext, society: &str, domain: &str) -> Result<TaskResult<()>> {
    let record = get_society(ctx, society).await?;
    let mut builder = ResultBuilder::new();
    builder.step("delete_domain", srcf_bespoke::delete_domain(&ctx.pg_pool, domain).await?);
    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Society(&record).into(),
                &srcf_email::VhostRemoved {
                    target_desc: srcf_email::target_desc(Owner::Society(&record)),
                    domain: domain.to_string(),
                },
            )
            .await?,
    );
    Ok(builder.finish("remove_society_vhost", ()))
}
