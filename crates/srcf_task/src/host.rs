//! Precondition guard restricting a plumbing primitive to specific hosts.
//!
//! Mirrors the original `@require_host(name…)` decorator: some primitives
//! (NIS map rebuilds, Mailman list administration) only make sense run on
//! the one host that owns that resource, and running them elsewhere would
//! silently do nothing useful or corrupt local state. This fails loudly
//! instead.

use thiserror::Error;

/// Well-known host roles referenced by `require_host` call sites.
pub mod hosts {
    /// Server providing the authoritative user database (adduser/NIS).
    pub const USER: &str = "pip";
    /// Server running Mailman, with its utilities installed.
    pub const LIST: &str = "pip";
    /// Server running Apache, for scripts altering its configuration.
    pub const WEB: &str = "sinkhole";
}

#[derive(Debug, Error)]
#[error("{function} is restricted to {allowed:?}, but this host is {actual:?}")]
pub struct HostGuardError {
    pub function: String,
    pub allowed: Vec<String>,
    pub actual: String,
}

/// Fail unless the current host is one of `allowed`.
pub fn require_host(function: &str, allowed: &[&str], current_host: &str) -> Result<(), HostGuardError> {
    if allowed.iter().any(|h| *h == current_host) {
        return Ok(());
    }
    Err(HostGuardError {
        function: function.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
        actual: current_host.to_string(),
    })
}

/// The local hostname, read the same way a shell prompt would get it.
/// Doesn't shell out: reads `/proc/sys/kernel/hostname` on Linux, falling
/// back to the `HOSTNAME` environment variable.
pub fn current_hostname() -> String {
    if let Ok(contents) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
        let trimmed = contents.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_matching_host() {
        assert!(require_host("make_yp", &[hosts::USER], hosts::USER).is_ok());
    }

    #[test]
    fn rejects_other_hosts() {
        let err = require_host("make_yp", &[hosts::USER], "some-other-box").unwrap_err();
        assert_eq!(err.function, "make_yp");
        assert_eq!(err.actual, "some-other-box");
    }
}
