//! Scrubbing personal data out of a deleted member/society's job history.
//! The original keys its per-class `SENSITIVE_ARGS` tuples by job class;
//! this system instead uses one flat set of sensitive key *names*, since
//! the same name (`email`, `domain`, ...) always carries the same kind of
//! personal data regardless of which job it appears on.

use crate::args::ArgsMap;

/// Argument keys overwritten with `<redacted>` when a member or society is
/// deleted, across every job row that names them.
pub const SENSITIVE_KEYS: &[&str] = &[
    "email",
    "preferred_name",
    "surname",
    "description",
    "domain",
    "listname",
    "role_email",
];

const REDACTED: &str = "<redacted>";

/// Overwrite every sensitive key present in `args` in place. Keys absent
/// from `args` are left untouched; this is a no-op on an already-redacted
/// map.
pub fn redact_args(args: &mut ArgsMap) {
    for key in SENSITIVE_KEYS {
        if let Some(value) = args.get_mut(*key) {
            *value = REDACTED.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_known_keys_only() {
        let mut args = ArgsMap::new();
        args.insert("email".into(), "ab123@cam.ac.uk".into());
        args.insert("sleep_time".into(), "5".into());
        redact_args(&mut args);
        assert_eq!(args.get("email").map(String::as_str), Some(REDACTED));
        assert_eq!(args.get("sleep_time").map(String::as_str), Some("5"));
    }

    #[test]
    fn missing_keys_are_left_absent() {
        let mut args = ArgsMap::new();
        redact_args(&mut args);
        assert!(args.is_empty());
    }
}
