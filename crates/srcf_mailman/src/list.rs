//! Idempotent mailing-list primitives backed by a single-host Mailman
//! install: name validation, existence check, create/configure/reset/delete.

use srcf_task::{hosts, require_host, Password, State, TaskResult};

use crate::error::{MailmanError, Result};
use crate::process::{run, run_with_stdin};

const LISTS_ROOT: &str = "/var/lib/mailman/lists";

/// Hyphen-segment suffixes a list name may not end with: Mailman reserves
/// these for its own generated addresses (`<list>-owner@`, `<list>-join@`...).
pub const RESERVED_SUFFIXES: &[&str] = &[
    "admin",
    "bounces",
    "confirm",
    "join",
    "leave",
    "owner",
    "request",
    "subscribe",
    "unsubscribe",
];

/// `^[A-Za-z0-9-]+$`, with the final hyphen-segment outside the reserved set.
pub fn validate_list_name(name: &str) -> Result<()> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(MailmanError::InvalidName(name.to_string()));
    }
    if let Some(suffix) = name.rsplit('-').next() {
        if RESERVED_SUFFIXES.contains(&suffix) {
            return Err(MailmanError::ReservedSuffix(name.to_string(), suffix.to_string()));
        }
    }
    Ok(())
}

/// Whether a list of this name has already been created.
pub async fn get_list(name: &str) -> Result<bool> {
    let path = format!("{LISTS_ROOT}/{name}");
    Ok(tokio::fs::metadata(&path).await.is_ok())
}

/// Create a new list owned by `owner_email`, with a freshly generated admin
/// password. Fails if the name is invalid/reserved or the list already
/// exists.
pub async fn new_list(name: &str, owner_email: &str) -> Result<TaskResult<Password>> {
    require_host("new_list", &[hosts::LIST], &srcf_task::current_hostname())?;
    validate_list_name(name)?;
    if get_list(name).await? {
        return Err(MailmanError::AlreadyExists(name.to_string()));
    }
    let password = Password::new();
    let stdin = format!("{}\n", password.reveal());
    run_with_stdin("/usr/sbin/newlist", &[name, owner_email], &stdin).await?;
    Ok(TaskResult::new("new_list", State::Created, password))
}

/// Overwrite a list's owner set via the configuration-injection helper.
pub async fn set_owner(name: &str, owners: &[&str]) -> Result<TaskResult<()>> {
    require_host("set_owner", &[hosts::LIST], &srcf_task::current_hostname())?;
    let data = format!(
        "owner = [{}]",
        owners.iter().map(|o| format!("{o:?}")).collect::<Vec<_>>().join(", ")
    );
    run_with_stdin("/usr/sbin/config_list", &["--inputfile", "/dev/stdin", name], &data).await?;
    Ok(TaskResult::new("set_owner", State::Success, ()))
}

/// Create the list if it doesn't exist yet, otherwise ensure its owner set
/// matches. Mirrors `srcflib.plumbing.mailman.create_list`.
pub async fn ensure_list(name: &str, owner_email: &str) -> Result<TaskResult<Option<Password>>> {
    if get_list(name).await? {
        let result = set_owner(name, &[owner_email]).await?;
        Ok(result.map(|_| None))
    } else {
        let result = new_list(name, owner_email).await?;
        Ok(result.map(Some))
    }
}

/// Ask Mailman to generate a fresh admin password and parse it back out of
/// `change_pw`'s stdout (`New <list> password: ...`).
pub async fn reset_password(name: &str) -> Result<TaskResult<Password>> {
    require_host("reset_password", &[hosts::LIST], &srcf_task::current_hostname())?;
    let output = run("/usr/lib/mailman/bin/change_pw", &["--listname", name]).await?;
    let prefix = format!("New {name} password: ");
    let secret = output
        .lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .ok_or_else(|| MailmanError::UnrecognisedPasswordOutput(output.clone()))?;
    Ok(TaskResult::new(
        "reset_password",
        State::Success,
        Password::from_secret(secret.trim()),
    ))
}

/// Delete a list, optionally deleting its public archives too.
pub async fn remove_list(name: &str, remove_archive: bool) -> Result<TaskResult<()>> {
    require_host("remove_list", &[hosts::LIST], &srcf_task::current_hostname())?;
    if !get_list(name).await? {
        return Ok(TaskResult::new("remove_list", State::Unchanged, ()));
    }
    let mut args = vec![];
    if remove_archive {
        args.push("--archives");
    }
    args.push(name);
    run("/usr/lib/mailman/bin/rmlist", &args).await?;
    Ok(TaskResult::new("remove_list", State::Success, ()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_name() {
        assert!(validate_list_name("mylist").is_ok());
        assert!(validate_list_name("my-list").is_ok());
    }

    #[test]
    fn rejects_reserved_suffix() {
        let err = validate_list_name("mylist-admin").unwrap_err();
        assert!(matches!(err, MailmanError::ReservedSuffix(_, _)));
    }

    #[test]
    fn rejects_non_alphanumeric_hyphen() {
        assert!(validate_list_name("my list").is_err());
        assert!(validate_list_name("my_list").is_err());
        assert!(validate_list_name("").is_err());
    }

    #[test]
    fn allows_admins_as_non_terminal_segment() {
        // only the *final* segment is checked against the reserved set
        assert!(validate_list_name("admin-list").is_ok());
    }
}
