//! Name mapping shared by both dialects: society short names containing
//! hyphens are mangled to underscores for use as SQL identifiers, and
//! unmangled on the way back out to the user-facing name.

use srcf_db::{mangle_identifier, unmangle_identifier, validate_identifier};

use crate::error::{Result, SqlError};

/// Validate and mangle an owner name (crsid or society short name) into a
/// SQL-safe identifier.
pub fn sql_owner_name(owner: &str) -> Result<String> {
    let mangled = mangle_identifier(owner);
    validate_identifier(&mangled)?;
    Ok(mangled)
}

/// Reverse [`sql_owner_name`] for values read back out of the database.
pub fn display_owner_name(sql_name: &str) -> String {
    unmangle_identifier(sql_name)
}

/// MySQL's `owner/suffix` database naming convention. The owner segment is
/// mangled/validated like any other identifier; `/` is accepted as the
/// literal segment separator and is the only punctuation allowed alongside
/// `[A-Za-z0-9_]`.
pub fn mysql_database_name(owner: &str, suffix: &str) -> Result<String> {
    let owner = sql_owner_name(owner)?;
    if suffix.is_empty() {
        validate_identifier(&owner)?;
        return Ok(owner);
    }
    validate_identifier(suffix).map_err(|_| {
        SqlError::Other(format!("invalid database suffix {suffix:?}"))
    })?;
    Ok(format!("{owner}/{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangles_hyphenated_society_names() {
        assert_eq!(sql_owner_name("test-soc").unwrap(), "test_soc");
    }

    #[test]
    fn rejects_sql_injection_attempts() {
        assert!(sql_owner_name("spqr\"; DROP TABLE x; --").is_err());
    }

    #[test]
    fn database_name_joins_owner_and_suffix() {
        assert_eq!(mysql_database_name("spqr2", "test").unwrap(), "spqr2/test");
    }

    #[test]
    fn database_name_without_suffix_is_bare_owner() {
        assert_eq!(mysql_database_name("spqr2", "").unwrap(), "spqr2");
    }

    #[test]
    fn display_name_restores_hyphens() {
        assert_eq!(display_owner_name("test_soc"), "test-soc");
    }
}
