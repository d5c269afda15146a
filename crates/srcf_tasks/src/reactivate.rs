//! The `reactivate` job: bring a cancelled member's account back to life
//! with a fresh email address and password. Grounded on
//! `srcflib.tasks.members.reactivate`.

use srcf_protocol::Owner;
use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

pub async fn run(ctx: &TaskContext, crsid: &str, email: &str) -> Result<TaskResult<()>> {
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
                email,
                member.mail_handler,
                true,
                true,
            )
            .await?,
        )
        .expect("upsert_member always returns a value");

    builder.step(
        "ensure_user",
        srcf_unix::ensure_user(
            crsid,
            srcf_unix::EnsureUser {
                uid: updated.uid.map(|v| v as u32),
                gid: updated.gid.map(|v| v as u32),
                system: false,
                active: Some(true),
                home_dir: None,
                real_name: None,
            },
        )
        .await?,
    );

    let password = builder
        .push("reset_password", srcf_unix::reset_password(crsid).await?)
        .expect("reset_password always returns a value");

    builder.step("update_nis", srcf_bespoke::update_nis(false).await?);
    builder.step("export_members", srcf_bespoke::export_members().await?);

    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Member(&updated).into(),
                &srcf_email::Reactivated {
                    target_desc: srcf_email::target_desc(Owner::Member(&updated)),
                    new_email: email.to_string(),
                    password: password.reveal().to_string(),
                },
            )
            .await?,
    );

    Ok(builder.finish("reactivate", ()))
}
