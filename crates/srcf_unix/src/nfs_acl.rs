//! NFSv4 ACL primitives, wrapping `nfs4_getfacl`/`nfs4_setfacl`.
//!
//! Permission strings accept the three coarse aliases `R`/`W`/`X` alongside
//! raw NFSv4 permission characters; [`expand_aliases`] desugars them before
//! any comparison or `nfs4_setfacl` invocation.

use std::collections::BTreeSet;

use srcf_task::{State, TaskResult};

use crate::process::run;

/// Expand the coarse `R`/`W`/`X` aliases into their constituent NFSv4
/// permission characters; any other character passes through unchanged.
pub fn expand_aliases(perms: &str) -> String {
    perms
        .chars()
        .map(|c| match c {
            'R' => "rntcy",
            'W' => "watTNcCyD",
            'X' => "xtcy",
            other => return_char(other),
        })
        .collect()
}

fn return_char(c: char) -> &'static str {
    // Leak-free single-char lookup: only called for the handful of raw
    // NFSv4 permission letters, all ASCII.
    const SINGLES: &str = "rwaxdDtTnNcCoy";
    if let Some(idx) = SINGLES.find(c) {
        &SINGLES[idx..idx + 1]
    } else {
        ""
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Ace {
    allow: bool,
    principal: String,
    perms: String,
}

fn parse_acl(output: &str) -> Vec<Ace> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let mut fields = line.splitn(4, ':');
            let kind = fields.next()?;
            let _flags = fields.next()?;
            let principal = fields.next()?;
            let perms = fields.next()?;
            let allow = match kind {
                "A" => true,
                "D" => false,
                _ => return None,
            };
            Some(Ace {
                allow,
                principal: principal.to_string(),
                perms: perms.to_string(),
            })
        })
        .collect()
}

/// The effective permission set for `principal` on `path`: every character
/// granted by an allow ACE, minus every character revoked by a deny ACE.
pub async fn get_nfs_acl(path: &str, principal: &str) -> crate::error::Result<String> {
    let output = run("nfs4_getfacl", &[path]).await?;
    Ok(effective_perms(&output, principal))
}

fn effective_perms(acl_text: &str, principal: &str) -> String {
    let aces = parse_acl(acl_text);
    let mut allowed: BTreeSet<char> = BTreeSet::new();
    let mut denied: BTreeSet<char> = BTreeSet::new();
    for ace in aces.iter().filter(|a| a.principal == principal) {
        let set = if ace.allow { &mut allowed } else { &mut denied };
        set.extend(ace.perms.chars());
    }
    allowed.difference(&denied).collect()
}

/// Grant `principal` the requested permissions on `path`, expanding
/// `R`/`W`/`X` aliases first. Adds a new allow ACE only for whatever
/// characters aren't already effectively granted.
pub async fn set_nfs_acl(path: &str, principal: &str, perms: &str) -> crate::error::Result<TaskResult<()>> {
    let wanted: BTreeSet<char> = expand_aliases(perms).chars().collect();
    let current = get_nfs_acl(path, principal).await?;
    let have: BTreeSet<char> = current.chars().collect();

    let missing: String = wanted.difference(&have).collect();
    if missing.is_empty() {
        return Ok(TaskResult::new("set_nfs_acl", State::Unchanged, ()));
    }

    let ace = format!("A::{principal}:{missing}");
    run("nfs4_setfacl", &["-a", &ace, path]).await?;
    Ok(TaskResult::new("set_nfs_acl", State::Created, ()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_read_write_execute_aliases() {
        assert_eq!(expand_aliases("R"), "rntcy");
        assert_eq!(expand_aliases("W"), "watTNcCyD");
        assert_eq!(expand_aliases("X"), "xtcy");
    }

    #[test]
    fn passes_through_raw_characters_and_drops_unknown() {
        assert_eq!(expand_aliases("rwx"), "rwx");
        assert_eq!(expand_aliases("Z"), "");
    }

    #[test]
    fn effective_perms_is_allow_minus_deny() {
        let acl = "A::mailman@srcf.net:rxtcy\nD::mailman@srcf.net:x\nA::spqr2@srcf.net:rwa";
        assert_eq!(effective_perms(acl, "mailman@srcf.net"), "cr ty".replace(' ', ""));
    }

    #[test]
    fn effective_perms_ignores_other_principals() {
        let acl = "A::spqr2@srcf.net:rwa";
        assert_eq!(effective_perms(acl, "mailman@srcf.net"), "");
    }
}
