//! Plain field-update jobs: member name, member email, member mail
//! handler, society description, society role email. Grounded on
//! `srcflib.tasks.members.update_member`/`srcflib.tasks.societies.update_society`.
//!
//! `update_name` and `update_mail_handler` send no notification — neither
//! has a corresponding template, matching the sibling Python jobs which
//! only ever mail out on email-address and role-email changes.

use srcf_protocol::{MailHandler, Owner};
use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

pub async fn update_name(ctx: &TaskContext, crsid: &str, preferred_name: &str, surname: &str) -> Result<TaskResult<()>> {
    let member = srcf_bespoke::get_member(&ctx.pg_pool, crsid)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such member {crsid}")))?;

    let mut builder = ResultBuilder::new();
    builder.step(
        "upsert_member",
        srcf_bespoke::upsert_member(
            &ctx.pg_pool,
            crsid,
            preferred_name,
            surname,
            &member.email,
            member.mail_handler,
            member.member,
            member.user,
        )
        .await?,
    );
    let real_name = format!("{preferred_name} {surname}");
    builder.step("set_real_name", srcf_unix::set_real_name(crsid, &real_name).await?);
    builder.step("export_members", srcf_bespoke::export_members().await?);

    Ok(builder.finish("update_name", ()))
}

pub async fn update_email_address(ctx: &TaskContext, crsid: &str, new_email: &str) -> Result<TaskResult<()>> {
    let member = srcf_bespoke::get_member(&ctx.pg_pool, crsid)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such member {crsid}")))?;
    let old_email = member.email.clone();

    let mut builder = ResultBuilder::new();
    let updated = builder
        .push(
            "upsert_member",
            srcf_bespoke::upsert_member(
                &ctx.pg_pool,
                crsid,
                &member.preferred_name,
                &member.surname,
                new_email,
                member.mail_handler,
                member.member,
                member.user,
            )
            .await?,
        )
        .expect("upsert_member always returns a value");

    if member.mail_handler == MailHandler::Forward {
        let home = format!("{}/{crsid}", ctx.paths.member_home_root);
        let uid = updated.uid.unwrap_or(0) as u32;
        builder.step(
            "create_forwarding_file",
            srcf_bespoke::create_forwarding_file(&home, new_email, uid, uid).await?,
        );
    }
    builder.step("export_members", srcf_bespoke::export_members().await?);

    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Member(&updated).into(),
                &srcf_email::EmailUpdated {
                    target_desc: srcf_email::target_desc(Owner::Member(&updated)),
                    old_email,
                    new_email: new_email.to_string(),
                },
            )
            .await?,
    );

    Ok(builder.finish("update_email_address", ()))
}

pub async fn update_mail_handler(ctx: &TaskContext, crsid: &str, mail_handler: MailHandler) -> Result<TaskResult<()>> {
    let member = srcf_bespoke::get_member(&ctx.pg_pool, crsid)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such member {crsid}")))?;

    let mut builder = ResultBuilder::new();
    let updated = builder
        .push(
            "upsert_member",
            srcf_bespoke::upsert_member(
                &ctx.pg_pool,
                crsid,
                &member.preferred_name,
                &member.surname,
                &member.email,
                mail_handler,
                member.member,
                member.user,
            )
            .await?,
        )
        .expect("upsert_member always returns a value");

    if mail_handler == MailHandler::Forward {
        let home = format!("{}/{crsid}", ctx.paths.member_home_root);
        let uid = updated.uid.unwrap_or(0) as u32;
        builder.step(
            "create_forwarding_file",
            srcf_bespoke::create_forwarding_file(&home, &updated.email, uid, uid).await?,
        );
    }

    Ok(builder.finish("update_mail_handler", ()))
}

pub async fn update_society_description(ctx: &TaskContext, society: &str, description: &str) -> Result<TaskResult<()>> {
    let record = srcf_bespoke::get_society(&ctx.pg_pool, society)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such society {society}")))?;

    let mut builder = ResultBuilder::new();
    builder.step(
        "upsert_society",
        srcf_bespoke::upsert_society(
            &ctx.pg_pool,
            society,
            description,
            &record.admin_crsids,
            record.role_email.as_deref(),
        )
        .await?,
    );
    builder.step("set_real_name", srcf_unix::set_real_name(society, description).await?);
    builder.step("export_members", srcf_bespoke::export_members().await?);

    Ok(builder.finish("update_society_description", ()))
}

pub async fn update_society_role_email(ctx: &TaskContext, society: &str, role_email: &str) -> Result<TaskResult<()>> {
    let record = srcf_bespoke::get_society(&ctx.pg_pool, society)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such society {society}")))?;
    let old_email = record.role_email.clone().unwrap_or_default();

    let mut builder = ResultBuilder::new();
    let updated = builder
        .push(
            "upsert_society",
            srcf_bespoke::upsert_society(
                &ctx.pg_pool,
                society,
                &record.description,
                &record.admin_crsids,
                Some(role_email),
            )
            .await?,
        )
        .expect("upsert_society always returns a value");

    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Society(&updated).into(),
                &srcf_email::RoleEmailUpdated {
                    target_desc: srcf_email::target_desc(Owner::Society(&updated)),
                    old_email,
                    new_email: role_email.to_string(),
                },
            )
            .await?,
    );

    Ok(builder.finish("update_society_role_email", ()))
}
