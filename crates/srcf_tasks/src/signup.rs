//! The `signup` job: register a new member and provision their account.
//! Grounded on `srcflib.tasks.members.create_member`, composed here out of
//! the `srcf_bespoke`/`srcf_unix`/`srcf_mailman` primitives this workspace
//! already builds, rather than one monolithic function.

use srcf_protocol::{MailHandler, Member, Owner};
use srcf_task::{ResultBuilder, State, TaskResult};

use crate::context::TaskContext;
use crate::error::Result;

const MAINTENANCE_LIST: &str = "maintenance";
const SOCIAL_LIST: &str = "social";

pub async fn run(
    ctx: &TaskContext,
    crsid: &str,
    preferred_name: &str,
    surname: &str,
    email: &str,
    mail_handler: MailHandler,
    social: bool,
) -> Result<TaskResult<Member>> {
    let mut builder = ResultBuilder::new();

    let member = builder
        .push(
            "upsert_member",
            srcf_bespoke::upsert_member(
                &ctx.pg_pool,
                crsid,
                preferred_name,
                surname,
                email,
                mail_handler,
                true,
                true,
            )
            .await?,
        )
        .expect("upsert_member always returns a value");

    let uid = match member.uid {
        Some(uid) => uid,
        None => {
            let uid = srcf_bespoke::allocate_member_id(&ctx.pg_pool).await?;
            builder.step(
                "set_member_ids",
                srcf_bespoke::set_member_ids(&ctx.pg_pool, crsid, uid, uid).await?,
            );
            uid
        }
    };
    let gid = uid;

    builder.step("ensure_group", srcf_unix::ensure_group(crsid, Some(gid as u32), false).await?);

    let home = format!("{}/{crsid}", ctx.paths.member_home_root);
    let real_name = format!("{preferred_name} {surname}");
    let ensure_user_result = srcf_unix::ensure_user(
        crsid,
        srcf_unix::EnsureUser {
            uid: Some(uid as u32),
            gid: Some(gid as u32),
            system: false,
            active: Some(true),
            home_dir: Some(&home),
            real_name: Some(&real_name),
        },
    )
    .await?;
    let newly_created = ensure_user_result.state() == State::Created;
    builder.step("ensure_user", ensure_user_result);

    let mut generated_password = None;
    if newly_created {
        generated_password = builder.push("reset_password", srcf_unix::reset_password(crsid).await?);
    }

    builder.step("update_nis", srcf_bespoke::update_nis(newly_created).await?);

    builder.step(
        "create_private_home",
        srcf_unix::create_home(&home, uid as u32, gid as u32, false).await?,
    );
    let public_home = format!("{}/{crsid}", ctx.paths.public_home_root);
    builder.step(
        "create_public_home",
        srcf_unix::create_home(&public_home, uid as u32, gid as u32, true).await?,
    );
    builder.step("nfs_exim_acl", srcf_bespoke::nfs_exim_acl(&home).await?);
    builder.step(
        "populate_skel",
        srcf_unix::copytree_chown_chmod(&ctx.paths.skel_dir, &home, uid as u32, gid as u32).await?,
    );
    let public_html = format!("{home}/public_html");
    builder.step("create_public_html", srcf_unix::mkdir(&public_html).await?);

    if builder.state() > State::Unchanged {
        builder.step("set_quota", srcf_bespoke::set_quota(crsid).await?);
    }

    if mail_handler == MailHandler::Forward {
        builder.step(
            "create_forwarding_file",
            srcf_bespoke::create_forwarding_file(&home, email, uid as u32, gid as u32).await?,
        );
    }

    builder.step(
        "create_legacy_mailbox",
        srcf_bespoke::create_legacy_mailbox(crsid, uid as u32, gid as u32).await?,
    );

    let mut lists = vec![MAINTENANCE_LIST];
    if social {
        lists.push(SOCIAL_LIST);
    }
    builder.step(
        "queue_list_subscription",
        srcf_bespoke::queue_list_subscription(&real_name, email, &lists).await?,
    );

    builder.step("export_members", srcf_bespoke::export_members().await?);

    builder.step(
        "notify",
        ctx.email
            .send(
                Owner::Member(&member).into(),
                &srcf_email::SignupWelcome {
                    target_desc: srcf_email::target_desc(Owner::Member(&member)),
                    crsid: crsid.to_string(),
                    password: generated_password
                        .as_ref()
                        .map(|p| p.reveal().to_string())
                        .unwrap_or_default(),
                },
            )
            .await?,
    );

    Ok(builder.finish("signup", member))
}
