//! Home directory and mail-delivery plumbing: the per-admin society symlink,
//! the Exim NFSv4 ACL grant, `.forward` file, disk quota, and the Apache
//! webstatus flat file. Grounded on `srcflib/plumbing/bespoke.py`.

use std::os::unix::fs::PermissionsExt;

use nix::unistd::{chown, Gid, Uid};
use srcf_task::{State, TaskResult};

use crate::error::Result;
use crate::process::run;

/// Grant `Debian-exim` execute access to a home directory via NFSv4 ACL, so
/// the mail daemon can traverse it to read `.forward`. Reuses
/// `srcf_unix`'s NFSv4 ACL primitive rather than reimplementing ACL
/// twiddling here.
pub async fn nfs_exim_acl(home: &str) -> Result<TaskResult<()>> {
    Ok(srcf_unix::set_nfs_acl(home, "Debian-exim@localdomain", "X").await?)
}

/// Write a `.forward` file pointing at `email`, owned by `uid:gid`.
/// Unconditionally overwrites: this always reflects the member's current
/// external address.
pub async fn create_forwarding_file(home: &str, email: &str, uid: u32, gid: u32) -> Result<TaskResult<()>> {
    let path = format!("{home}/.forward");
    let existed = tokio::fs::metadata(&path).await.is_ok();
    tokio::fs::write(&path, format!("{email}\n")).await?;
    chown(path.as_str(), Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)))
        .map_err(|e| crate::error::BespokeError::Other(format!("chown {path}: {e}")))?;
    let state = if existed { State::Success } else { State::Created };
    Ok(TaskResult::new("create_forwarding_file", state, ()))
}

/// Add or remove the admin's `~/<society>` symlink into the society's home
/// directory, based on current admin membership. Never overwrites a file
/// that isn't the expected symlink target.
pub async fn link_soc_home_dir(member_home: &str, society: &str, is_admin: bool) -> Result<TaskResult<bool>> {
    let link = format!("{member_home}/{society}");
    let target = format!("/societies/{society}");

    let current = tokio::fs::read_link(&link).await.ok();
    let valid = current.as_deref().map(std::path::Path::new) == Some(std::path::Path::new(&target));

    if valid == is_admin {
        return Ok(TaskResult::new("link_soc_home_dir", State::Unchanged, false));
    }

    if is_admin {
        match tokio::fs::symlink(&target, &link).await {
            Ok(()) => Ok(TaskResult::new("link_soc_home_dir", State::Created, true)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::warn!(link, "not overwriting existing file");
                Ok(TaskResult::new("link_soc_home_dir", State::Unchanged, false))
            }
            Err(e) => Err(e.into()),
        }
    } else {
        match tokio::fs::remove_file(&link).await {
            Ok(()) => Ok(TaskResult::new("link_soc_home_dir", State::Success, true)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(TaskResult::new("link_soc_home_dir", State::Unchanged, false))
            }
            Err(e) => Err(e.into()),
        }
    }
}

const MAILBOX_ROOT: &str = "/var/mail";

/// Create `crsid`'s legacy `/var/mail` spool file if absent, owned by
/// `uid:gid` mode 0660 (mail group readable/writable, nothing else). A
/// no-op if the mailbox already exists.
pub async fn create_legacy_mailbox(crsid: &str, uid: u32, gid: u32) -> Result<TaskResult<()>> {
    let path = format!("{MAILBOX_ROOT}/{crsid}");
    if tokio::fs::metadata(&path).await.is_ok() {
        return Ok(TaskResult::new("create_legacy_mailbox", State::Unchanged, ()));
    }
    tokio::fs::File::create(&path).await?;
    tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o660)).await?;
    chown(path.as_str(), Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)))
        .map_err(|e| crate::error::BespokeError::Other(format!("chown {path}: {e}")))?;
    Ok(TaskResult::new("create_legacy_mailbox", State::Created, ()))
}

/// Truncate `crsid`'s legacy mailbox to empty, if it exists. A no-op if
/// there's no mailbox file to empty.
pub async fn empty_legacy_mailbox(crsid: &str) -> Result<TaskResult<()>> {
    let path = format!("{MAILBOX_ROOT}/{crsid}");
    if tokio::fs::metadata(&path).await.is_err() {
        return Ok(TaskResult::new("empty_legacy_mailbox", State::Unchanged, ()));
    }
    tokio::fs::write(&path, b"").await?;
    Ok(TaskResult::new("empty_legacy_mailbox", State::Success, ()))
}

/// Apply the default disk quota to the owner's UNIX account.
pub async fn set_quota(owner_name: &str) -> Result<TaskResult<()>> {
    run("/usr/local/sbin/set_quota", &[owner_name]).await?;
    Ok(TaskResult::new("set_quota", State::Success, ()))
}

const WEBSTATUS_ROOT: &str = "/societies/srcf-admin";

/// Add or update `owner_name`'s entry in the member/society webstatus flat
/// file the Apache config generator reads. A no-op if already set to
/// `status`.
pub async fn apache_status(owner_name: &str, is_society: bool, status: &str) -> Result<TaskResult<()>> {
    apache_status_under(WEBSTATUS_ROOT, owner_name, is_society, status).await
}

async fn apache_status_under(
    root: &str,
    owner_name: &str,
    is_society: bool,
    status: &str,
) -> Result<TaskResult<()>> {
    let key = if is_society { "soc" } else { "member" };
    let path = format!("{root}/{key}webstatus");

    let contents = tokio::fs::read_to_string(&path).await.unwrap_or_default();
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
    let mut found = false;
    let mut changed = false;

    for line in lines.iter_mut() {
        if let Some((name, current)) = line.split_once(':') {
            if name == owner_name {
                found = true;
                if current != status {
                    *line = format!("{owner_name}:{status}");
                    changed = true;
                }
                break;
            }
        }
    }
    if !found {
        lines.push(format!("{owner_name}:{status}"));
        changed = true;
    }

    if !changed {
        return Ok(TaskResult::new("apache_status", State::Unchanged, ()));
    }

    let mut joined = lines.join("\n");
    joined.push('\n');
    let tmp_path = format!("{path}.tmp");
    tokio::fs::write(&tmp_path, &joined).await?;
    tokio::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o644)).await?;
    tokio::fs::rename(&tmp_path, &path).await?;

    let state = if found { State::Success } else { State::Created };
    Ok(TaskResult::new("apache_status", state, ()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_new_entry() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("memberwebstatus"), "other:static\n").await.unwrap();

        let root = dir.path().to_string_lossy().into_owned();
        let result = apache_status_under(&root, "spqr2", false, "public").await.unwrap();
        assert_eq!(result.state(), State::Created);

        let contents = tokio::fs::read_to_string(dir.path().join("memberwebstatus")).await.unwrap();
        assert_eq!(contents, "other:static\nspqr2:public\n");
    }

    #[tokio::test]
    async fn updates_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("socwebstatus"), "spqr:public\n").await.unwrap();

        let root = dir.path().to_string_lossy().into_owned();
        let result = apache_status_under(&root, "spqr", true, "static").await.unwrap();
        assert_eq!(result.state(), State::Success);

        let contents = tokio::fs::read_to_string(dir.path().join("socwebstatus")).await.unwrap();
        assert_eq!(contents, "spqr:static\n");
    }

    #[tokio::test]
    async fn repeat_call_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("memberwebstatus"), "spqr2:public\n").await.unwrap();

        let root = dir.path().to_string_lossy().into_owned();
        let result = apache_status_under(&root, "spqr2", false, "public").await.unwrap();
        assert_eq!(result.state(), State::Unchanged);
    }
}
