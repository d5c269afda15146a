//! The `create_society` job and the shared admin-set reconciliation it and
//! [`crate::admin`] both need. Grounded on
//! `srcflib.tasks.societies.create_society`.

use srcf_protocol::{Owner, Society};
use srcf_task::{ResultBuilder, State, TaskResult};

use crate::context::TaskContext;
use crate::error::{Result, TasksError};

/// Add or remove `crsid`'s admin-side effects on `society`: UNIX group
/// membership and the `~/<society>` symlink into its home directory. Does
/// not touch the `society_admins` row itself — callers add/remove that
/// first and pass the resulting membership state in `is_admin`.
pub async fn sync_admin_side_effects(
    ctx: &TaskContext,
    society: &str,
    crsid: &str,
    is_admin: bool,
) -> Result<TaskResult<()>> {
    let mut builder = ResultBuilder::new();

    if is_admin {
        builder.step("add_to_group", srcf_unix::add_to_group(crsid, society).await?);
    } else {
        builder.step("remove_from_group", srcf_unix::remove_from_group(crsid, society).await?);
    }

    let member_home = format!("{}/{crsid}", ctx.paths.member_home_root);
    let link_result = srcf_bespoke::link_soc_home_dir(&member_home, society, is_admin).await?;
    builder.step("link_soc_home_dir", link_result);

    Ok(builder.finish("sync_admin_side_effects", ()))
}

pub async fn run(
    ctx: &TaskContext,
    society: &str,
    description: &str,
    admins: &[String],
) -> Result<TaskResult<Society>> {
    let mut builder = ResultBuilder::new();

    let record = builder
        .push(
            "upsert_society",
            srcf_bespoke::upsert_society(&ctx.pg_pool, society, description, admins, None).await?,
        )
        .expect("upsert_society always returns a value");

    let uid = match record.uid {
        Some(uid) => uid,
        None => {
            let uid = srcf_bespoke::allocate_society_id(&ctx.pg_pool).await?;
            builder.step(
                "set_society_ids",
                srcf_bespoke::set_society_ids(&ctx.pg_pool, society, uid, uid).await?,
            );
            uid
        }
    };
    let gid = uid;

    builder.step("ensure_group", srcf_unix::ensure_group(society, Some(gid as u32), false).await?);

    let home = format!("{}/{society}", ctx.paths.society_home_root);
    let ensure_user_result = srcf_unix::ensure_user(
        society,
        srcf_unix::EnsureUser {
            uid: Some(uid as u32),
            gid: Some(gid as u32),
            system: false,
            active: Some(false),
            home_dir: Some(&home),
            real_name: Some(description),
        },
    )
    .await?;
    let newly_created = ensure_user_result.state() == State::Created;
    builder.step("ensure_user", ensure_user_result);

    builder.step("update_nis", srcf_bespoke::update_nis(newly_created).await?);

    builder.step(
        "create_private_home",
        srcf_unix::create_home(&home, uid as u32, gid as u32, false).await?,
    );
    let public_home = format!("{}/{society}", ctx.paths.society_public_root);
    builder.step(
        "create_public_home",
        srcf_unix::create_home(&public_home, uid as u32, gid as u32, true).await?,
    );

    for crsid in admins {
        builder.step(
            format!("sync_admin:{crsid}"),
            sync_admin_side_effects(ctx, society, crsid, true).await?,
        );
    }

    if builder.state() > State::Unchanged {
        builder.step("set_quota", srcf_bespoke::set_quota(society).await?);
    }

    builder.step(
        "apache_status",
        srcf_bespoke::apache_status(society, true, "public").await?,
    );
    builder.step("generate_sudoers", srcf_bespoke::generate_sudoers().await?);
    builder.step("export_members", srcf_bespoke::export_members().await?);

    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Society(&record).into(),
                &srcf_email::SocietyCreated {
                    target_desc: srcf_email::target_desc(Owner::Society(&record)),
                    society: society.to_string(),
                    admins: admins.join(", "),
                },
            )
            .await?,
    );

    let record = srcf_bespoke::get_society(&ctx.pg_pool, society)
        .await?
        .ok_or_else(|| TasksError::Other(format!("society {society} vanished after creation")))?;

    Ok(builder.finish("create_society", record))
}
