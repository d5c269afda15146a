//! Idempotent filesystem primitives: home directory creation, bare mkdir,
//! symlinking, and the skeleton-copy used to populate a new home directory.

use std::future::Future;
use std::os::unix::fs::PermissionsExt;
use std::pin::Pin;

use nix::unistd::{chown, Gid, Uid};
use srcf_task::{State, TaskResult};

use crate::error::Result;

/// `mode 2770` — private home directories: setgid, owner+group rwx, no
/// world access.
pub const MODE_PRIVATE_HOME: u32 = 0o2770;
/// `mode 2775` — public-facing home directories: setgid, world-readable.
pub const MODE_PUBLIC_HOME: u32 = 0o2775;

/// Create `path` as a directory owned by `uid:gid`, mode
/// [`MODE_PRIVATE_HOME`] or [`MODE_PUBLIC_HOME`] depending on `world_read`.
/// A no-op if the directory already exists.
pub async fn create_home(path: &str, uid: u32, gid: u32, world_read: bool) -> Result<TaskResult<()>> {
    let mode = if world_read { MODE_PUBLIC_HOME } else { MODE_PRIVATE_HOME };
    if tokio::fs::metadata(path).await.is_ok() {
        return Ok(TaskResult::new("create_home", State::Unchanged, ()));
    }
    tokio::fs::create_dir_all(path).await?;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    chown(
        path,
        Some(Uid::from_raw(uid)),
        Some(Gid::from_raw(gid)),
    )
    .map_err(|e| crate::error::UnixError::Other(format!("chown {path}: {e}")))?;
    Ok(TaskResult::new("create_home", State::Created, ()))
}

/// Create a bare directory, mode inherited from the umask. A no-op if it
/// already exists.
pub async fn mkdir(path: &str) -> Result<TaskResult<()>> {
    if tokio::fs::metadata(path).await.is_ok() {
        return Ok(TaskResult::new("mkdir", State::Unchanged, ()));
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(TaskResult::new("mkdir", State::Created, ()))
}

/// Create a symlink at `link_path` pointing at `target`. Idempotent: does
/// nothing — does not overwrite, does not validate the existing target —
/// if *anything* already sits at `link_path`.
pub async fn symlink(target: &str, link_path: &str) -> Result<TaskResult<()>> {
    if tokio::fs::symlink_metadata(link_path).await.is_ok() {
        return Ok(TaskResult::new("symlink", State::Unchanged, ()));
    }
    tokio::fs::symlink(target, link_path).await?;
    Ok(TaskResult::new("symlink", State::Created, ()))
}

/// Recursively copy `src` to `dst`, overriding ownership to `uid:gid` and
/// copying each file's user-mode bits into its group-mode bits (so a
/// skeleton laid out `rwx------` ends up group-accessible too), preserving
/// modification and access times. Used to populate a freshly created home
/// directory from `/etc/skel`.
pub fn copytree_chown_chmod<'a>(
    src: &'a str,
    dst: &'a str,
    uid: u32,
    gid: u32,
) -> Pin<Box<dyn Future<Output = Result<TaskResult<()>>> + Send + 'a>> {
    Box::pin(async move {
        let copied = copy_recursive(src, dst, uid, gid).await?;
        let state = if copied { State::Created } else { State::Unchanged };
        Ok(TaskResult::new("copytree_chown_chmod", state, ()))
    })
}

fn copy_recursive<'a>(
    src: &'a str,
    dst: &'a str,
    uid: u32,
    gid: u32,
) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
    Box::pin(async move {
        let src_meta = tokio::fs::metadata(src).await?;

        if src_meta.is_dir() {
            let already_existed = tokio::fs::metadata(dst).await.is_ok();
            tokio::fs::create_dir_all(dst).await?;
            apply_owner_and_mode(dst, uid, gid, src_meta.permissions().mode()).await?;

            let mut any_copied = !already_existed;
            let mut entries = tokio::fs::read_dir(src).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let child_src = format!("{src}/{}", name.to_string_lossy());
                let child_dst = format!("{dst}/{}", name.to_string_lossy());
                if copy_recursive(&child_src, &child_dst, uid, gid).await? {
                    any_copied = true;
                }
            }
            Ok(any_copied)
        } else {
            if tokio::fs::metadata(dst).await.is_ok() {
                return Ok(false);
            }
            tokio::fs::copy(src, dst).await?;
            apply_owner_and_mode(dst, uid, gid, src_meta.permissions().mode()).await?;
            copy_times(src, dst)?;
            Ok(true)
        }
    })
}

async fn apply_owner_and_mode(path: &str, uid: u32, gid: u32, user_bits_from: u32) -> Result<()> {
    chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)))
        .map_err(|e| crate::error::UnixError::Other(format!("chown {path}: {e}")))?;

    let user_bits = (user_bits_from >> 6) & 0o7;
    let mode = (user_bits_from & 0o7700) | (user_bits << 3) | (user_bits_from & 0o7);
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

fn copy_times(src: &str, dst: &str) -> Result<()> {
    let src_meta = std::fs::metadata(src)?;
    let times = std::fs::FileTimes::new()
        .set_accessed(src_meta.accessed()?)
        .set_modified(src_meta.modified()?);
    let dst_file = std::fs::OpenOptions::new().write(true).open(dst)?;
    dst_file.set_times(times)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn symlink_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link").to_string_lossy().into_owned();
        let first = symlink("/societies/test", &link).await.unwrap();
        assert_eq!(first.state(), State::Created);
        let second = symlink("/societies/test", &link).await.unwrap();
        assert_eq!(second.state(), State::Unchanged);
    }

    #[tokio::test]
    async fn symlink_does_not_overwrite_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link").to_string_lossy().into_owned();
        std::fs::write(&link, b"not a symlink").unwrap();
        let result = symlink("/societies/test", &link).await.unwrap();
        assert_eq!(result.state(), State::Unchanged);
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "not a symlink");
    }

    #[tokio::test]
    async fn mkdir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c").to_string_lossy().into_owned();
        let first = mkdir(&nested).await.unwrap();
        assert_eq!(first.state(), State::Created);
        let second = mkdir(&nested).await.unwrap();
        assert_eq!(second.state(), State::Unchanged);
    }
}
