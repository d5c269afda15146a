//! Mailing list creation jobs for members and societies. Grounded on
//! `srcflib.tasks.mailman.create_list`.

use srcf_protocol::Owner;
use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

pub async fn create_user_mailing_list(ctx: &TaskContext, crsid: &str, list_name: &str) -> Result<TaskResult<()>> {
    let member = srcf_bespoke::get_member(&ctx.pg_pool, crsid)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such member {crsid}")))?;

    let mut builder = ResultBuilder::new();
    let password = builder.push("ensure_list", srcf_mailman::ensure_list(list_name, &member.email).await?);
    builder.step("configure_mailing_list", srcf_bespoke::configure_mailing_list(list_name).await?);
    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Member(&member).into(),
                &srcf_email::MailingListCreated {
                    target_desc: srcf_email::target_desc(Owner::Member(&member)),
                    list_name: list_name.to_string(),
                    password: password.flatten().map(|p| p.reveal().to_string()).unwrap_or_default(),
                },
            )
            .await?,
    );

    Ok(builder.finish("create_user_mailing_list", ()))
}

pub async fn create_society_mailing_list(ctx: &TaskContext, society: &str, list_name: &str) -> Result<TaskResult<()>> {
    let record = srcf_bespoke::get_society(&ctx.pg_pool, society)
        .await?
        .ok_or_else(|| TasksError::Other(format!("no such society {society}")))?;
    let owner_email = record.role_email.clone().unwrap_or_else(|| record.admins_alias());

    let mut builder = ResultBuilder::new();
    let password = builder.push("ensure_list", srcf_mailman::ensure_list(list_name, &owner_email).await?);
    builder.step("configure_mailing_list", srcf_bespoke::configure_mailing_list(list_name).await?);
    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Society(&record).into(),
                &srcf_email::MailingListCreated {
                    target_desc: srcf_email::target_desc(Owner::Society(&record)),
                    list_name: list_name.to_string(),
                    password: password.flatten().map(|p| p.reveal().to_string()).unwrap_or_default(),
                },
            )
            .await?,
    );

    Ok(builder.finish("create_society_mailing_list", ()))
}
