//! Whitelist validation for bare SQL identifiers that must be interpolated
//! (quoted, never bound as a parameter) into a query string — database
//! names, user names, role names.
//!
//! Values are always bound as parameters; only identifiers go through here.
//! The accepted character set is deliberately narrow: `[A-Za-z0-9_]`, with
//! the identifier-quote character itself forbidden outright rather than
//! escaped, so there's no escaping logic to get wrong.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierError {
    message: String,
}

impl IdentifierError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdentifierError {}

/// Reject anything but `[A-Za-z0-9_]`, non-empty.
pub fn validate_identifier(name: &str) -> Result<(), IdentifierError> {
    if name.is_empty() {
        return Err(IdentifierError::new("identifier must not be empty"));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(IdentifierError::new(format!(
            "identifier {name:?} contains disallowed character {bad:?}"
        )));
    }
    Ok(())
}

/// Translate a user-facing name with hyphens (society short names) into a
/// SQL-safe identifier by mapping `-` to `_`. Reverse with
/// [`unmangle_identifier`].
pub fn mangle_identifier(name: &str) -> String {
    name.replace('-', "_")
}

/// Reverse of [`mangle_identifier`].
pub fn unmangle_identifier(name: &str) -> String {
    name.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_and_underscore() {
        assert!(validate_identifier("spqr2_test").is_ok());
        assert!(validate_identifier("Member123").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn rejects_quote_and_other_punctuation() {
        assert!(validate_identifier("spqr\"; DROP TABLE x; --").is_err());
        assert!(validate_identifier("spqr-test").is_err());
        assert!(validate_identifier("spqr test").is_err());
    }

    #[test]
    fn mangle_roundtrips_hyphenated_names() {
        let mangled = mangle_identifier("spqr-test");
        assert_eq!(mangled, "spqr_test");
        assert_eq!(unmangle_identifier(&mangled), "spqr-test");
    }
}
