//! Idempotent UNIX user primitives: `ensure_user`, its GECOS/shell/home/gid
//! reconciliation, group membership, renaming, and password reset.

use srcf_task::{hosts, require_host, Password, State, TaskResult};

use crate::error::{Result, UnixError};
use crate::process::{run, run_with_stdin};

/// Shells that mean "this account cannot log in", per the distilled spec's
/// disabled-account definition.
pub const NOLOGIN_SHELLS: &[&str] = &["/bin/false", "/usr/sbin/nologin"];
const ACTIVE_SHELL: &str = "/bin/bash";
const DISABLED_SHELL: &str = "/usr/sbin/nologin";

/// A parsed `/etc/passwd` row, as returned by `getent passwd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub home: String,
    pub shell: String,
}

impl PasswdEntry {
    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.trim_end().splitn(7, ':');
        let name = fields.next()?.to_string();
        let _passwd = fields.next()?;
        let uid = fields.next()?.parse().ok()?;
        let gid = fields.next()?.parse().ok()?;
        let gecos = fields.next()?.to_string();
        let home = fields.next()?.to_string();
        let shell = fields.next().unwrap_or_default().to_string();
        Some(Self {
            name,
            uid,
            gid,
            gecos,
            home,
            shell,
        })
    }

    pub fn active(&self) -> bool {
        !NOLOGIN_SHELLS.contains(&self.shell.as_str())
    }
}

/// `getent passwd <name>`; `Ok(None)` when the name doesn't resolve.
pub async fn getent_passwd(name: &str) -> Result<Option<PasswdEntry>> {
    match run("getent", &["passwd", name]).await {
        Ok(output) => Ok(output.lines().next().and_then(PasswdEntry::parse)),
        Err(UnixError::CommandFailed { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Parameters accepted by [`ensure_user`]; all but `name` are optional so
/// callers can reconcile only the fields a task actually cares about.
#[derive(Debug, Clone, Default)]
pub struct EnsureUser<'a> {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub system: bool,
    pub active: Option<bool>,
    pub home_dir: Option<&'a str>,
    pub real_name: Option<&'a str>,
}

/// Create the account if absent (via `adduser`), otherwise reconcile shell,
/// primary group, home directory and GECOS with the requested values.
///
/// Must run on [`hosts::USER`], the host owning the authoritative user
/// database; NIS propagation and NFS visibility both depend on that.
pub async fn ensure_user(name: &str, opts: EnsureUser<'_>) -> Result<TaskResult<()>> {
    require_host("ensure_user", &[hosts::USER], &srcf_task::current_hostname())?;

    match getent_passwd(name).await? {
        None => {
            let mut args: Vec<String> = vec!["--disabled-password".into()];
            if opts.system {
                args.push("--system".into());
            }
            if let Some(uid) = opts.uid {
                args.push("--uid".into());
                args.push(uid.to_string());
            }
            if let Some(gid) = opts.gid {
                args.push("--gid".into());
                args.push(gid.to_string());
            }
            if let Some(home) = opts.home_dir {
                args.push("--home".into());
                args.push(home.to_string());
            }
            args.push("--gecos".into());
            args.push(opts.real_name.unwrap_or("").to_string());
            args.push(name.to_string());

            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            run("adduser", &arg_refs).await?;

            if opts.active == Some(false) {
                run("usermod", &["--shell", DISABLED_SHELL, name]).await?;
            }
            Ok(TaskResult::new("ensure_user", State::Created, ()))
        }
        Some(entry) => {
            if let Some(uid) = opts.uid {
                if uid != entry.uid {
                    return Err(UnixError::Other(format!(
                        "user {name} exists with uid {}, expected {uid}",
                        entry.uid
                    )));
                }
            }

            let mut changed = false;

            if let Some(active) = opts.active {
                let want_shell = if active { ACTIVE_SHELL } else { DISABLED_SHELL };
                if entry.active() != active {
                    run("usermod", &["--shell", want_shell, name]).await?;
                    changed = true;
                }
            }

            if let Some(gid) = opts.gid {
                if gid != entry.gid {
                    run("usermod", &["--gid", &gid.to_string(), name]).await?;
                    changed = true;
                }
            }

            if let Some(home) = opts.home_dir {
                if home != entry.home {
                    run("usermod", &["--home", home, name]).await?;
                    changed = true;
                }
            }

            if let Some(real_name) = opts.real_name {
                if real_name != entry.gecos {
                    run("chfn", &["-f", real_name, name]).await?;
                    changed = true;
                }
            }

            let state = if changed { State::Success } else { State::Unchanged };
            Ok(TaskResult::new("ensure_user", state, ()))
        }
    }
}

/// Overwrite `name`'s GECOS field unconditionally.
pub async fn set_real_name(name: &str, real_name: &str) -> Result<TaskResult<()>> {
    require_host("set_real_name", &[hosts::USER], &srcf_task::current_hostname())?;
    let current = getent_passwd(name).await?;
    if current.as_ref().map(|e| e.gecos.as_str()) == Some(real_name) {
        return Ok(TaskResult::new("set_real_name", State::Unchanged, ()));
    }
    run("chfn", &["-f", real_name, name]).await?;
    Ok(TaskResult::new("set_real_name", State::Success, ()))
}

/// Overwrite `name`'s home directory field. Does not move files; callers
/// that need the directory itself moved handle that via `srcf_bespoke`.
pub async fn set_home_dir(name: &str, home: &str) -> Result<TaskResult<()>> {
    require_host("set_home_dir", &[hosts::USER], &srcf_task::current_hostname())?;
    let current = getent_passwd(name).await?;
    if current.as_ref().map(|e| e.home.as_str()) == Some(home) {
        return Ok(TaskResult::new("set_home_dir", State::Unchanged, ()));
    }
    run("usermod", &["--home", home, name]).await?;
    Ok(TaskResult::new("set_home_dir", State::Success, ()))
}

/// Overwrite `name`'s primary group.
pub async fn set_default_group(name: &str, group: &str) -> Result<TaskResult<()>> {
    require_host("set_default_group", &[hosts::USER], &srcf_task::current_hostname())?;
    run("usermod", &["--gid", group, name]).await?;
    Ok(TaskResult::new("set_default_group", State::Success, ()))
}

/// Rename a UNIX user (login name only; UID is unchanged).
pub async fn rename_user(old_name: &str, new_name: &str) -> Result<TaskResult<()>> {
    require_host("rename_user", &[hosts::USER], &srcf_task::current_hostname())?;
    run("usermod", &["--login", new_name, old_name]).await?;
    Ok(TaskResult::new("rename_user", State::Success, ()))
}

/// Add `name` to the supplementary group `group`, if not already a member.
pub async fn add_to_group(name: &str, group: &str) -> Result<TaskResult<()>> {
    require_host("add_to_group", &[hosts::USER], &srcf_task::current_hostname())?;
    let groups = current_supplementary_groups(name).await?;
    if groups.iter().any(|g| g == group) {
        return Ok(TaskResult::new("add_to_group", State::Unchanged, ()));
    }
    run("usermod", &["--append", "--groups", group, name]).await?;
    Ok(TaskResult::new("add_to_group", State::Created, ()))
}

/// Remove `name` from the supplementary group `group`, if currently a member.
pub async fn remove_from_group(name: &str, group: &str) -> Result<TaskResult<()>> {
    require_host("remove_from_group", &[hosts::USER], &srcf_task::current_hostname())?;
    let groups = current_supplementary_groups(name).await?;
    if !groups.iter().any(|g| g == group) {
        return Ok(TaskResult::new("remove_from_group", State::Unchanged, ()));
    }
    let remaining: Vec<&str> = groups.iter().map(String::as_str).filter(|g| *g != group).collect();
    run("usermod", &["--groups", &remaining.join(","), name]).await?;
    Ok(TaskResult::new("remove_from_group", State::Success, ()))
}

async fn current_supplementary_groups(name: &str) -> Result<Vec<String>> {
    let output = run("id", &["-nG", name]).await?;
    Ok(output.split_whitespace().map(str::to_string).collect())
}

/// Reset `name`'s password to a freshly generated secret via `chpasswd`
/// over stdin. Unlike every other idempotent primitive here, this always
/// reports `success` — there is no meaningful "unchanged" password reset.
pub async fn reset_password(name: &str) -> Result<TaskResult<Password>> {
    require_host("reset_password", &[hosts::USER], &srcf_task::current_hostname())?;
    let password = Password::new();
    let stdin = format!("{name}:{}\n", password.reveal());
    run_with_stdin("chpasswd", &[], &stdin).await?;
    Ok(TaskResult::new("reset_password", State::Success, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_passwd_line() {
        let entry = PasswdEntry::parse("spqr2:x:10023:10023:A B:/home/spqr2:/bin/bash").unwrap();
        assert_eq!(entry.name, "spqr2");
        assert_eq!(entry.uid, 10023);
        assert_eq!(entry.gid, 10023);
        assert_eq!(entry.gecos, "A B");
        assert_eq!(entry.home, "/home/spqr2");
        assert!(entry.active());
    }

    #[test]
    fn nologin_shell_is_inactive() {
        let entry = PasswdEntry::parse("exuser10023:x:10023:10023::/home/exuser10023:/usr/sbin/nologin").unwrap();
        assert!(!entry.active());
    }

    #[test]
    fn malformed_line_is_rejected() {
        assert!(PasswdEntry::parse("not-enough-fields").is_none());
    }
}
