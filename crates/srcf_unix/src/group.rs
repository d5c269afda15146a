//! Idempotent UNIX group primitives.

use srcf_task::{hosts, require_host, State, TaskResult};

use crate::error::{Result, UnixError};
use crate::process::run;

/// A parsed `/etc/group` row, as returned by `getent group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub name: String,
    pub gid: u32,
    pub members: Vec<String>,
}

impl GroupEntry {
    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.trim_end().splitn(4, ':');
        let name = fields.next()?.to_string();
        let _passwd = fields.next()?;
        let gid = fields.next()?.parse().ok()?;
        let members = fields
            .next()
            .unwrap_or_default()
            .split(',')
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        Some(Self { name, gid, members })
    }
}

/// `getent group <name>`; `Ok(None)` when the name doesn't resolve.
pub async fn getent_group(name: &str) -> Result<Option<GroupEntry>> {
    match run("getent", &["group", name]).await {
        Ok(output) => Ok(output.lines().next().and_then(GroupEntry::parse)),
        Err(crate::error::UnixError::CommandFailed { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Create the group if absent (via `addgroup`); if present, validate the
/// requested gid matches.
pub async fn ensure_group(name: &str, gid: Option<u32>, system: bool) -> Result<TaskResult<()>> {
    require_host("ensure_group", &[hosts::USER], &srcf_task::current_hostname())?;

    match getent_group(name).await? {
        None => {
            let mut args: Vec<String> = Vec::new();
            if system {
                args.push("--system".into());
            }
            if let Some(gid) = gid {
                args.push("--gid".into());
                args.push(gid.to_string());
            }
            args.push(name.to_string());
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            run("addgroup", &arg_refs).await?;
            Ok(TaskResult::new("ensure_group", State::Created, ()))
        }
        Some(entry) => {
            if let Some(gid) = gid {
                if gid != entry.gid {
                    return Err(UnixError::Other(format!(
                        "group {name} exists with gid {}, expected {gid}",
                        entry.gid
                    )));
                }
            }
            Ok(TaskResult::new("ensure_group", State::Unchanged, ()))
        }
    }
}

/// Rename a UNIX group.
pub async fn rename_group(old_name: &str, new_name: &str) -> Result<TaskResult<()>> {
    require_host("rename_group", &[hosts::USER], &srcf_task::current_hostname())?;
    run("groupmod", &["--new-name", new_name, old_name]).await?;
    Ok(TaskResult::new("rename_group", State::Success, ()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_group_line_with_members() {
        let entry = GroupEntry::parse("test:x:20045:spqr2,abc1").unwrap();
        assert_eq!(entry.name, "test");
        assert_eq!(entry.gid, 20045);
        assert_eq!(entry.members, vec!["spqr2", "abc1"]);
    }

    #[test]
    fn parses_group_line_with_no_members() {
        let entry = GroupEntry::parse("spqr2:x:10023:").unwrap();
        assert!(entry.members.is_empty());
    }
}
