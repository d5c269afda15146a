//! Thin wrappers around the SRCF site helper scripts: no decision logic of
//! their own, just a typed, host-guarded way to invoke them and fold their
//! outcome into a [`TaskResult`]. Grounded on the trailing half of
//! `srcflib/plumbing/bespoke.py` (most of these are marked `TODO: Port to
//! SRCFLib` there too — they stay thin wrappers here for the same reason).

use srcf_task::{hosts, require_host, State, TaskResult};

use crate::error::Result;
use crate::process::run;

/// Synchronise the Apache `srcfmembers`/`srcfusers` groups file.
pub async fn generate_apache_groups() -> Result<TaskResult<()>> {
    run("/usr/local/sbin/srcf-updateapachegroups", &[]).await?;
    Ok(TaskResult::new("generate_apache_groups", State::Success, ()))
}

/// Update sudo permissions granting society admins access to their
/// society's account.
pub async fn generate_sudoers() -> Result<TaskResult<()>> {
    run("/usr/local/sbin/srcf-generate-society-sudoers", &[]).await?;
    Ok(TaskResult::new("generate_sudoers", State::Success, ()))
}

/// Regenerate the legacy flat-file membership export.
pub async fn export_members() -> Result<TaskResult<()>> {
    run("/usr/local/sbin/srcf-memberdb-export", &[]).await?;
    Ok(TaskResult::new("export_members", State::Success, ()))
}

/// Subscribe a member to one or more of the facility's maintenance/social
/// mailing lists. A no-op if `lists` is empty.
pub async fn queue_list_subscription(name: &str, email: &str, lists: &[&str]) -> Result<TaskResult<()>> {
    if lists.is_empty() {
        return Ok(TaskResult::new("queue_list_subscription", State::Unchanged, ()));
    }
    let entry = format!("\"{name}\" <{email}>");
    let subs: Vec<String> = lists.iter().map(|l| format!("soc-srcf-{l}:{entry}")).collect();
    let mut args = vec!["/usr/local/sbin/srcf-enqueue-mlsub".to_string()];
    args.extend(subs);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    run(arg_refs[0], &arg_refs[1..]).await?;
    Ok(TaskResult::new("queue_list_subscription", State::Success, ()))
}

/// Apply the facility's default Mailman options and mail aliases to a
/// freshly created list.
pub async fn configure_mailing_list(name: &str) -> Result<TaskResult<()>> {
    run(
        "/usr/sbin/config_list",
        &["--inputfile", "/root/mailman-newlist-defaults", name],
    )
    .await?;
    run("/usr/local/sbin/gen_alias", &[name]).await?;
    Ok(TaskResult::new("configure_mailing_list", State::Success, ()))
}

/// Synchronise UNIX users and passwords over NIS. Host-guarded: only
/// meaningful run on the host owning the authoritative user database.
pub async fn make_yp() -> Result<TaskResult<()>> {
    require_host("make_yp", &[hosts::USER], &srcf_task::current_hostname())?;
    run("/usr/bin/make", &["-C", "/var/yp"]).await?;
    Ok(TaskResult::new("make_yp", State::Success, ()))
}

/// `make_yp`, optionally followed by a 16-second pause for the NetApp
/// filer's NIS cache to pick up the change before any dependent operation
/// (e.g. an NFS chown relying on the new uid/gid mapping) proceeds.
pub async fn update_nis(wait_netapp: bool) -> Result<TaskResult<()>> {
    let result = make_yp().await?;
    if wait_netapp {
        tokio::time::sleep(std::time::Duration::from_secs(16)).await;
    }
    Ok(result)
}

/// Kill all processes currently running under `owner_name`'s UNIX account.
/// Empty output means nothing was running (`Unchanged`); otherwise a
/// process was found and killed (`Success`).
pub async fn slay(owner_name: &str) -> Result<TaskResult<()>> {
    let output = run("/usr/local/sbin/slay", &[owner_name]).await?;
    let state = if output.trim().is_empty() { State::Unchanged } else { State::Success };
    Ok(TaskResult::new("slay", state, ()))
}
