//! The `change_society_admin` job: add or remove a society admin and
//! reconcile every side effect of admin membership. Grounded on
//! `srcflib.tasks.societies.add_society_admin`/`remove_society_admin`.

use srcf_jobs::AdminAction;
use srcf_protocol::Owner;
use srcf_task::{ResultBuilder, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

pub async fn run(
    ctx: &TaskContext,
    society: &str,
    target_member: &str,
    action: AdminAction,
) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();
    let add = action == AdminAction::Add;

    if add {
        builder.step(
            "add_to_society",
            srcf_bespoke::add_to_society(&ctx.pg_pool, target_member, society).await?,
        );
    } else {
        let existing = srcf_bespoke::get_society(&ctx.pg_pool, society)
            .await?
            .ok_or_else(|| TasksError::Other(format!("no such society {society}")))?;
        if existing.admin_crsids.len() == 1 && existing.admin_crsids[0] == target_member {
            return Err(TasksError::Other(format!(
                "refusing to remove {target_member} as the last admin of {society}"
            )));
        }
        builder.step(
            "remove_from_society",
            srcf_bespoke::remove_from_society(&ctx.pg_pool, target_member, society).await?,
        );
    }

    builder.step(
        "sync_admin_side_effects",
        crate::society::sync_admin_side_effects(ctx, society, target_member, add).await?,
    );
    builder.step(
        "sync_mysql_role",
        crate::role_sync::sync_mysql_admin(&ctx.mysql_pool, society, target_member, add).await?,
    );
    builder.step(
        "sync_postgres_role",
        crate::role_sync::sync_postgres_admin(&ctx.pg_pool, society, target_member, add).await?,
    );

    let record = srcf_bespoke::get_society(&ctx.pg_pool, society)
        .await?
        .ok_or_else(|| TasksError::Other(format!("society {society} vanished during admin change")))?;

    let notify = if add {
        ctx.email
            .send(
                Owner::Society(&record).into(),
                &srcf_email::AdminAdded {
                    target_desc: srcf_email::target_desc(Owner::Society(&record)),
                    target_member: target_member.to_string(),
                    society: society.to_string(),
                },
            )
            .await?
    } else {
        ctx.email
            .send(
                Owner::Society(&record).into(),
                &srcf_email::AdminRemoved {
                    target_desc: srcf_email::target_desc(Owner::Society(&record)),
                    target_member: target_member.to_string(),
                    society: society.to_string(),
                },
            )
            .await?
    };
    builder.step("notify", notify);

    Ok(builder.finish("change_society_admin", ()))
}
