//! `/etc/netgroup` membership edits: adding/removing a `(,user,)` triple
//! under a given group's line.

use srcf_task::{State, TaskResult};

use crate::atomic_file::atomic_rewrite;
use crate::error::Result;

fn member_entry(user: &str) -> String {
    format!("(,{user},)")
}

fn rewrite_line(line: &str, group: &str, user: &str, add: bool) -> Option<String> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    if name != group {
        return None;
    }
    let entry = member_entry(user);
    let mut members: Vec<&str> = parts.collect();
    let present = members.contains(&entry.as_str());

    if add {
        if present {
            return None;
        }
        members.push(&entry);
    } else {
        if !present {
            return None;
        }
        members.retain(|m| *m != entry);
    }

    Some(format!("{name} {}", members.join(" ")))
}

async fn edit_member(netgroup_file: &str, group: &str, user: &str, add: bool) -> Result<TaskResult<()>> {
    let mut touched = false;
    let mut found_group = false;
    let new_line = member_entry(user);

    let rewrote = atomic_rewrite(netgroup_file, |contents| {
        let mut out_lines: Vec<String> = Vec::new();
        for line in contents.lines() {
            if let Some(rewritten) = rewrite_line(line, group, user, add) {
                touched = true;
                found_group = true;
                out_lines.push(rewritten);
            } else {
                if line.split_whitespace().next() == Some(group) {
                    found_group = true;
                }
                out_lines.push(line.to_string());
            }
        }
        if add && !found_group {
            touched = true;
            out_lines.push(format!("{group} {new_line}"));
        }
        let mut joined = out_lines.join("\n");
        if !joined.is_empty() {
            joined.push('\n');
        }
        joined
    })
    .await?;

    let state = if rewrote && touched {
        if add {
            State::Created
        } else {
            State::Success
        }
    } else {
        State::Unchanged
    };
    Ok(TaskResult::new(
        if add { "add_netgroup_member" } else { "remove_netgroup_member" },
        state,
        (),
    ))
}

/// Add `(,user,)` under `group`'s line, creating the line if the group
/// doesn't appear at all yet. A no-op if already present.
pub async fn add_netgroup_member(netgroup_file: &str, group: &str, user: &str) -> Result<TaskResult<()>> {
    edit_member(netgroup_file, group, user, true).await
}

/// Remove `(,user,)` from `group`'s line. A no-op if absent.
pub async fn remove_netgroup_member(netgroup_file: &str, group: &str, user: &str) -> Result<TaskResult<()>> {
    edit_member(netgroup_file, group, user, false).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn adds_member_to_existing_group_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netgroup").to_string_lossy().into_owned();
        tokio::fs::write(&path, "maintenance (,abc1,)\n").await.unwrap();

        let result = add_netgroup_member(&path, "maintenance", "spqr2").await.unwrap();
        assert_eq!(result.state(), State::Created);

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "maintenance (,abc1,) (,spqr2,)\n");
    }

    #[tokio::test]
    async fn adding_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netgroup").to_string_lossy().into_owned();
        tokio::fs::write(&path, "maintenance (,spqr2,)\n").await.unwrap();

        let result = add_netgroup_member(&path, "maintenance", "spqr2").await.unwrap();
        assert_eq!(result.state(), State::Unchanged);
    }

    #[tokio::test]
    async fn creates_group_line_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netgroup").to_string_lossy().into_owned();
        tokio::fs::write(&path, "other (,zzz,)\n").await.unwrap();

        let result = add_netgroup_member(&path, "maintenance", "spqr2").await.unwrap();
        assert_eq!(result.state(), State::Created);
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "other (,zzz,)\nmaintenance (,spqr2,)\n");
    }

    #[tokio::test]
    async fn removes_member_and_leaves_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netgroup").to_string_lossy().into_owned();
        tokio::fs::write(&path, "maintenance (,abc1,) (,spqr2,)\n").await.unwrap();

        let result = remove_netgroup_member(&path, "maintenance", "spqr2").await.unwrap();
        assert_eq!(result.state(), State::Success);
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "maintenance (,abc1,)\n");
    }

    #[tokio::test]
    async fn removing_absent_member_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netgroup").to_string_lossy().into_owned();
        tokio::fs::write(&path, "maintenance (,abc1,)\n").await.unwrap();

        let result = remove_netgroup_member(&path, "maintenance", "spqr2").await.unwrap();
        assert_eq!(result.state(), State::Unchanged);
    }
}
