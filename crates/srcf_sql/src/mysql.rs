//! MySQL plumbing: idempotent user/database/grant management at wildcard
//! host `%`, with the `owner/suffix` database naming convention.

use sqlx::mysql::MySqlPool;
use sqlx::Row;
use srcf_task::{Password, State, TaskResult};

use crate::error::Result;
use crate::naming::sql_owner_name;

/// MySQL's numeric error code for "database already exists" on `CREATE
/// DATABASE`.
const ER_DB_CREATE_EXISTS: &str = "1007";
/// MySQL's numeric error code for "database doesn't exist" on `DROP
/// DATABASE`.
const ER_DB_DROP_EXISTS: &str = "1008";
/// MySQL's numeric error code covering both "user already exists" (on
/// `CREATE USER`) and "user doesn't exist" (on `DROP USER`).
const ER_CANNOT_USER: &str = "1396";

fn mysql_error_code(err: &sqlx::Error) -> Option<String> {
    err.as_database_error().and_then(|e| e.code()).map(|c| c.into_owned())
}

fn quote_ident(ident: &str) -> String {
    format!("`{ident}`")
}

/// Create `name` at host `%` with a fresh random password if it doesn't
/// already exist. Returns `Some(password)` only when a user was actually
/// created — a pre-existing user's password is left untouched.
pub async fn ensure_user(pool: &MySqlPool, name: &str) -> Result<TaskResult<Option<Password>>> {
    let sql_name = sql_owner_name(name)?;
    let password = Password::new();
    let stmt = format!("CREATE USER '{sql_name}'@'%' IDENTIFIED BY ?");
    match sqlx::query(&stmt).bind(password.reveal()).execute(pool).await {
        Ok(_) => Ok(TaskResult::new("ensure_user", State::Created, Some(password))),
        Err(e) if mysql_error_code(&e).as_deref() == Some(ER_CANNOT_USER) => {
            Ok(TaskResult::new("ensure_user", State::Unchanged, None))
        }
        Err(e) => Err(e.into()),
    }
}

/// Unconditionally reset `name`'s password.
pub async fn reset_password(pool: &MySqlPool, name: &str) -> Result<TaskResult<Password>> {
    let sql_name = sql_owner_name(name)?;
    let password = Password::new();
    let stmt = format!("ALTER USER '{sql_name}'@'%' IDENTIFIED BY ?");
    sqlx::query(&stmt).bind(password.reveal()).execute(pool).await?;
    Ok(TaskResult::new("reset_password", State::Success, password))
}

/// Drop `name`, treating "doesn't exist" as a no-op.
pub async fn drop_user(pool: &MySqlPool, name: &str) -> Result<TaskResult<()>> {
    let sql_name = sql_owner_name(name)?;
    let stmt = format!("DROP USER '{sql_name}'@'%'");
    match sqlx::query(&stmt).execute(pool).await {
        Ok(_) => Ok(TaskResult::new("drop_user", State::Success, ())),
        Err(e) if mysql_error_code(&e).as_deref() == Some(ER_CANNOT_USER) => {
            Ok(TaskResult::new("drop_user", State::Unchanged, ()))
        }
        Err(e) => Err(e.into()),
    }
}

/// `CREATE DATABASE`, optionally granting all privileges on it to `owner`
/// immediately. Treats "already exists" as a no-op.
pub async fn create_database(pool: &MySqlPool, name: &str, owner: Option<&str>) -> Result<TaskResult<()>> {
    srcf_db::validate_identifier(&name.replace('/', "")).map_err(|_| {
        crate::error::SqlError::Other(format!("invalid database name {name:?}"))
    })?;
    let stmt = format!("CREATE DATABASE {}", quote_ident(name));
    let created = match sqlx::query(&stmt).execute(pool).await {
        Ok(_) => true,
        Err(e) if mysql_error_code(&e).as_deref() == Some(ER_DB_CREATE_EXISTS) => false,
        Err(e) => return Err(e.into()),
    };

    if created {
        if let Some(owner) = owner {
            grant_database(pool, owner, name).await?;
        }
        Ok(TaskResult::new("create_database", State::Created, ()))
    } else {
        Ok(TaskResult::new("create_database", State::Unchanged, ()))
    }
}

/// `DROP DATABASE`, treating "doesn't exist" as a no-op.
pub async fn drop_database(pool: &MySqlPool, name: &str) -> Result<TaskResult<()>> {
    let stmt = format!("DROP DATABASE {}", quote_ident(name));
    match sqlx::query(&stmt).execute(pool).await {
        Ok(_) => Ok(TaskResult::new("drop_database", State::Success, ())),
        Err(e) if mysql_error_code(&e).as_deref() == Some(ER_DB_DROP_EXISTS) => {
            Ok(TaskResult::new("drop_database", State::Unchanged, ()))
        }
        Err(e) => Err(e.into()),
    }
}

/// `GRANT ALL PRIVILEGES ON <db>.* TO user@%`, plus the matching
/// `<db>/%` grant the SRCF naming convention uses for per-owner table
/// namespacing.
pub async fn grant_database(pool: &MySqlPool, user: &str, db: &str) -> Result<TaskResult<()>> {
    let sql_user = sql_owner_name(user)?;
    let stmt = format!(
        "GRANT ALL PRIVILEGES ON {}.* TO '{sql_user}'@'%'",
        quote_ident(db)
    );
    sqlx::query(&stmt).execute(pool).await?;
    let wildcard_stmt = format!(
        "GRANT ALL PRIVILEGES ON {}.* TO '{sql_user}'@'%'",
        quote_ident(&format!("{db}/%"))
    );
    sqlx::query(&wildcard_stmt).execute(pool).await?;
    Ok(TaskResult::new("grant_database", State::Success, ()))
}

/// `REVOKE ALL PRIVILEGES ON <db>.* FROM user@%`.
pub async fn revoke_database(pool: &MySqlPool, user: &str, db: &str) -> Result<TaskResult<()>> {
    let sql_user = sql_owner_name(user)?;
    let stmt = format!(
        "REVOKE ALL PRIVILEGES ON {}.* FROM '{sql_user}'@'%'",
        quote_ident(db)
    );
    sqlx::query(&stmt).execute(pool).await?;
    Ok(TaskResult::new("revoke_database", State::Success, ()))
}

/// Which of `names` currently exist as MySQL users.
pub async fn get_users(pool: &MySqlPool, names: &[&str]) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT User FROM mysql.user WHERE Host = '%'")
        .fetch_all(pool)
        .await?;
    let existing: std::collections::HashSet<String> =
        rows.into_iter().map(|r| r.get::<String, _>("User")).collect();
    Ok(names
        .iter()
        .filter(|n| existing.contains(&sql_owner_name(n).unwrap_or_default()))
        .map(|n| n.to_string())
        .collect())
}

/// Raw `SHOW GRANTS FOR` lines for `user`.
pub async fn get_user_grants(pool: &MySqlPool, user: &str) -> Result<Vec<String>> {
    let sql_user = sql_owner_name(user)?;
    let stmt = format!("SHOW GRANTS FOR '{sql_user}'@'%'");
    let rows = sqlx::query(&stmt).fetch_all(pool).await?;
    Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
}

/// Database names `user` holds any grant on, parsed out of `SHOW GRANTS`.
pub async fn get_user_databases(pool: &MySqlPool, user: &str) -> Result<Vec<String>> {
    let grants = get_user_grants(pool, user).await?;
    Ok(grants.iter().filter_map(|g| parse_grant_database(g)).collect())
}

fn parse_grant_database(grant: &str) -> Option<String> {
    let on = grant.split(" ON ").nth(1)?;
    let db_part = on.split('.').next()?;
    let unquoted = db_part.trim_matches('`');
    if unquoted == "*" {
        None
    } else {
        Some(unquoted.to_string())
    }
}

/// Users currently holding any grant on `db`, found by escaping `%` as
/// `\_` in the `LIKE` pattern per the dialect's own escaping convention.
pub async fn get_database_users(pool: &MySqlPool, db: &str) -> Result<Vec<String>> {
    let escaped = db.replace('%', "\\%").replace('_', "\\_");
    let stmt = "SELECT grantee FROM information_schema.SCHEMA_PRIVILEGES \
                WHERE table_schema LIKE ? ESCAPE '\\\\' GROUP BY grantee";
    let rows = sqlx::query(stmt).bind(format!("{escaped}%")).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|r| {
            let grantee: String = r.get(0);
            grantee.trim_matches('\'').split('@').next().unwrap_or_default().to_string()
        })
        .collect())
}

/// Database names matching a `LIKE`-style `pattern`.
pub async fn get_matched_databases(pool: &MySqlPool, pattern: &str) -> Result<Vec<String>> {
    let rows = sqlx::query("SHOW DATABASES LIKE ?").bind(pattern).fetch_all(pool).await?;
    Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_database_name_with_backticks() {
        assert_eq!(quote_ident("spqr2/test"), "`spqr2/test`");
    }

    #[test]
    fn parses_database_out_of_grant_line() {
        let grant = "GRANT ALL PRIVILEGES ON `spqr2/test`.* TO `spqr2`@`%`";
        assert_eq!(parse_grant_database(grant), Some("spqr2/test".to_string()));
    }

    #[test]
    fn global_grant_has_no_database() {
        let grant = "GRANT USAGE ON *.* TO `spqr2`@`%`";
        assert_eq!(parse_grant_database(grant), None);
    }
}
