//! Helpers for reading/writing the `jobs.args` string-map column. The
//! column is keyed and valued as plain strings (an hstore in the original
//! schema); [`crate::kind::JobKind`] is the typed view over it.

use std::collections::BTreeMap;

use crate::error::{JobsError, Result};

pub type ArgsMap = BTreeMap<String, String>;

pub(crate) fn require<'a>(args: &'a ArgsMap, job_type: &'static str, key: &'static str) -> Result<&'a str> {
    args.get(key)
        .map(String::as_str)
        .ok_or(JobsError::MissingArg { job_type, key })
}

/// `root` is stored as an empty string when absent, matching the original's
/// `None` (no explicit document root override).
pub(crate) fn optional_nonempty(args: &ArgsMap, key: &str) -> Option<String> {
    args.get(key).filter(|v| !v.is_empty()).cloned()
}

pub(crate) fn set_optional(map: &mut ArgsMap, key: &str, value: Option<&str>) {
    map.insert(key.to_string(), value.unwrap_or("").to_string());
}

pub(crate) fn parse_yn(args: &ArgsMap, job_type: &'static str, key: &'static str) -> Result<bool> {
    match require(args, job_type, key)? {
        "y" => Ok(true),
        "n" => Ok(false),
        other => Err(JobsError::InvalidArg {
            job_type,
            key,
            value: other.to_string(),
        }),
    }
}

pub(crate) fn format_yn(value: bool) -> &'static str {
    if value {
        "y"
    } else {
        "n"
    }
}

/// The original stores a society's admin crsids as a comma-joined string
/// (`",".join(admins)`); order is not meaningful, so this sorts on parse to
/// keep round-tripping deterministic.
pub(crate) fn parse_admins(args: &ArgsMap, job_type: &'static str) -> Result<Vec<String>> {
    let raw = require(args, job_type, "admins")?;
    let mut admins: Vec<String> = raw.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect();
    admins.sort();
    Ok(admins)
}

pub(crate) fn format_admins(admins: &[String]) -> String {
    admins.join(",")
}
