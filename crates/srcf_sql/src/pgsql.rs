//! PostgreSQL plumbing: idempotent role/database/grant management.
//!
//! A role doubles as both "database user" and "login account"; `can_login`
//! distinguishes the two, and [`enable_role`]/[`disable_role`] flip it
//! without dropping the role (used when cancelling, then later reinstating,
//! a member's database access).
//!
//! [`create_database`]/[`drop_database`] must run on a connection with
//! autocommit on — `CREATE DATABASE`/`DROP DATABASE` cannot run inside a
//! transaction block. Callers are expected to hand in a dedicated
//! autocommit pool or connection for exactly those two calls.

use sqlx::postgres::PgPool;
use sqlx::Row;
use srcf_task::{Password, State, TaskResult};

use crate::error::Result;
use crate::naming::sql_owner_name;

/// `duplicate_object` — role/database/etc already exists.
const DUPLICATE_OBJECT: &str = "42710";
/// `duplicate_database`.
const DUPLICATE_DATABASE: &str = "42P04";
/// `undefined_object` — role doesn't exist.
const UNDEFINED_OBJECT: &str = "42704";
/// `invalid_catalog_name` — database doesn't exist.
const INVALID_CATALOG_NAME: &str = "3D000";

fn pg_error_code(err: &sqlx::Error) -> Option<String> {
    err.as_database_error().and_then(|e| e.code()).map(|c| c.into_owned())
}

fn quote_ident(ident: &str) -> String {
    format!("\"{ident}\"")
}

/// A PostgreSQL role as this system cares about it: its name and whether
/// it currently has `LOGIN` rights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub can_login: bool,
}

/// Create `name` as a `LOGIN` role with a fresh random password if it
/// doesn't already exist. `None` if the role pre-existed.
pub async fn ensure_user(pool: &PgPool, name: &str) -> Result<TaskResult<Option<Password>>> {
    let sql_name = sql_owner_name(name)?;
    let password = Password::new();
    let stmt = format!("CREATE ROLE {} LOGIN PASSWORD $1", quote_ident(&sql_name));
    match sqlx::query(&stmt).bind(password.reveal()).execute(pool).await {
        Ok(_) => Ok(TaskResult::new("ensure_user", State::Created, Some(password))),
        Err(e) if pg_error_code(&e).as_deref() == Some(DUPLICATE_OBJECT) => {
            Ok(TaskResult::new("ensure_user", State::Unchanged, None))
        }
        Err(e) => Err(e.into()),
    }
}

/// Unconditionally reset `name`'s password.
pub async fn reset_password(pool: &PgPool, name: &str) -> Result<TaskResult<Password>> {
    let sql_name = sql_owner_name(name)?;
    let password = Password::new();
    let stmt = format!("ALTER ROLE {} PASSWORD $1", quote_ident(&sql_name));
    sqlx::query(&stmt).bind(password.reveal()).execute(pool).await?;
    Ok(TaskResult::new("reset_password", State::Success, password))
}

/// Drop `name`, treating "doesn't exist" as a no-op.
pub async fn drop_user(pool: &PgPool, name: &str) -> Result<TaskResult<()>> {
    let sql_name = sql_owner_name(name)?;
    let stmt = format!("DROP ROLE {}", quote_ident(&sql_name));
    match sqlx::query(&stmt).execute(pool).await {
        Ok(_) => Ok(TaskResult::new("drop_user", State::Success, ())),
        Err(e) if pg_error_code(&e).as_deref() == Some(UNDEFINED_OBJECT) => {
            Ok(TaskResult::new("drop_user", State::Unchanged, ()))
        }
        Err(e) => Err(e.into()),
    }
}

/// `CREATE DATABASE`, optionally with `OWNER`. Must run outside a
/// transaction block — see the module docs.
pub async fn create_database(pool: &PgPool, name: &str, owner: Option<&str>) -> Result<TaskResult<()>> {
    srcf_db::validate_identifier(name)?;
    let mut stmt = format!("CREATE DATABASE {}", quote_ident(name));
    if let Some(owner) = owner {
        let sql_owner = sql_owner_name(owner)?;
        stmt.push_str(&format!(" OWNER {}", quote_ident(&sql_owner)));
    }
    match sqlx::query(&stmt).execute(pool).await {
        Ok(_) => Ok(TaskResult::new("create_database", State::Created, ())),
        Err(e) if pg_error_code(&e).as_deref() == Some(DUPLICATE_DATABASE) => {
            Ok(TaskResult::new("create_database", State::Unchanged, ()))
        }
        Err(e) => Err(e.into()),
    }
}

/// `DROP DATABASE`. Must run outside a transaction block.
pub async fn drop_database(pool: &PgPool, name: &str) -> Result<TaskResult<()>> {
    srcf_db::validate_identifier(name)?;
    let stmt = format!("DROP DATABASE {}", quote_ident(name));
    match sqlx::query(&stmt).execute(pool).await {
        Ok(_) => Ok(TaskResult::new("drop_database", State::Success, ())),
        Err(e) if pg_error_code(&e).as_deref() == Some(INVALID_CATALOG_NAME) => {
            Ok(TaskResult::new("drop_database", State::Unchanged, ()))
        }
        Err(e) => Err(e.into()),
    }
}

/// `GRANT ALL PRIVILEGES ON DATABASE <db> TO <user>`.
pub async fn grant_database(pool: &PgPool, user: &str, db: &str) -> Result<TaskResult<()>> {
    let sql_user = sql_owner_name(user)?;
    let stmt = format!(
        "GRANT ALL PRIVILEGES ON DATABASE {} TO {}",
        quote_ident(db),
        quote_ident(&sql_user)
    );
    sqlx::query(&stmt).execute(pool).await?;
    Ok(TaskResult::new("grant_database", State::Success, ()))
}

/// `REVOKE ALL PRIVILEGES ON DATABASE <db> FROM <user>`.
pub async fn revoke_database(pool: &PgPool, user: &str, db: &str) -> Result<TaskResult<()>> {
    let sql_user = sql_owner_name(user)?;
    let stmt = format!(
        "REVOKE ALL PRIVILEGES ON DATABASE {} FROM {}",
        quote_ident(db),
        quote_ident(&sql_user)
    );
    sqlx::query(&stmt).execute(pool).await?;
    Ok(TaskResult::new("revoke_database", State::Success, ()))
}

/// Look up a role's current `LOGIN` state. `None` if it doesn't exist.
pub async fn get_role(pool: &PgPool, name: &str) -> Result<Option<Role>> {
    let sql_name = sql_owner_name(name)?;
    let row = sqlx::query("SELECT rolname, rolcanlogin FROM pg_roles WHERE rolname = $1")
        .bind(&sql_name)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| Role {
        name: r.get::<String, _>("rolname"),
        can_login: r.get::<bool, _>("rolcanlogin"),
    }))
}

/// Grant `LOGIN` to an existing role. A no-op if already granted.
pub async fn enable_role(pool: &PgPool, name: &str) -> Result<TaskResult<()>> {
    let sql_name = sql_owner_name(name)?;
    if matches!(get_role(pool, name).await?, Some(Role { can_login: true, .. })) {
        return Ok(TaskResult::new("enable_role", State::Unchanged, ()));
    }
    let stmt = format!("ALTER ROLE {} LOGIN", quote_ident(&sql_name));
    sqlx::query(&stmt).execute(pool).await?;
    Ok(TaskResult::new("enable_role", State::Success, ()))
}

/// Revoke `LOGIN` from an existing role. A no-op if already revoked.
pub async fn disable_role(pool: &PgPool, name: &str) -> Result<TaskResult<()>> {
    let sql_name = sql_owner_name(name)?;
    if matches!(get_role(pool, name).await?, Some(Role { can_login: false, .. })) {
        return Ok(TaskResult::new("disable_role", State::Unchanged, ()));
    }
    let stmt = format!("ALTER ROLE {} NOLOGIN", quote_ident(&sql_name));
    sqlx::query(&stmt).execute(pool).await?;
    Ok(TaskResult::new("disable_role", State::Success, ()))
}

/// Whether `member` currently holds membership in `group_role`.
pub async fn is_role_member(pool: &PgPool, member: &str, group_role: &str) -> Result<bool> {
    let sql_member = sql_owner_name(member)?;
    let sql_group = sql_owner_name(group_role)?;
    let row = sqlx::query(
        "SELECT EXISTS (\
            SELECT 1 FROM pg_auth_members m \
            JOIN pg_roles r ON r.oid = m.roleid \
            JOIN pg_roles u ON u.oid = m.member \
            WHERE r.rolname = $1 AND u.rolname = $2\
        )",
    )
    .bind(&sql_group)
    .bind(&sql_member)
    .fetch_one(pool)
    .await?;
    Ok(row.get::<bool, _>(0))
}

/// `GRANT <group_role> TO <member>`, used by society role synchronisation.
/// A no-op if `member` is already a member of `group_role`.
pub async fn grant_role_membership(pool: &PgPool, member: &str, group_role: &str) -> Result<TaskResult<()>> {
    if is_role_member(pool, member, group_role).await? {
        return Ok(TaskResult::new("grant_role_membership", State::Unchanged, ()));
    }
    let sql_member = sql_owner_name(member)?;
    let sql_group = sql_owner_name(group_role)?;
    let stmt = format!(
        "GRANT {} TO {}",
        quote_ident(&sql_group),
        quote_ident(&sql_member)
    );
    sqlx::query(&stmt).execute(pool).await?;
    Ok(TaskResult::new("grant_role_membership", State::Created, ()))
}

/// `REVOKE <group_role> FROM <member>`. A no-op if not currently a member.
pub async fn revoke_role_membership(pool: &PgPool, member: &str, group_role: &str) -> Result<TaskResult<()>> {
    if !is_role_member(pool, member, group_role).await? {
        return Ok(TaskResult::new("revoke_role_membership", State::Unchanged, ()));
    }
    let sql_member = sql_owner_name(member)?;
    let sql_group = sql_owner_name(group_role)?;
    let stmt = format!(
        "REVOKE {} FROM {}",
        quote_ident(&sql_group),
        quote_ident(&sql_member)
    );
    sqlx::query(&stmt).execute(pool).await?;
    Ok(TaskResult::new("revoke_role_membership", State::Success, ()))
}

/// Which of `names` currently exist as roles.
pub async fn get_users(pool: &PgPool, names: &[&str]) -> Result<Vec<String>> {
    let mangled: Vec<String> = names.iter().map(|n| sql_owner_name(n)).collect::<Result<_>>()?;
    let rows = sqlx::query("SELECT rolname FROM pg_roles WHERE rolname = ANY($1)")
        .bind(&mangled)
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| crate::naming::display_owner_name(&r.get::<String, _>("rolname")))
        .collect())
}

/// Raw grant descriptions (`GRANT <priv> ON DATABASE <db>`) this role holds.
pub async fn get_user_grants(pool: &PgPool, user: &str) -> Result<Vec<String>> {
    let sql_user = sql_owner_name(user)?;
    let rows = sqlx::query(
        "SELECT datname FROM pg_database WHERE has_database_privilege($1, datname, 'CONNECT')",
    )
    .bind(&sql_user)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| format!("GRANT CONNECT ON DATABASE {} TO {}", r.get::<String, _>(0), sql_user))
        .collect())
}

/// Database names `user` can currently connect to.
pub async fn get_user_databases(pool: &PgPool, user: &str) -> Result<Vec<String>> {
    let sql_user = sql_owner_name(user)?;
    let rows = sqlx::query(
        "SELECT datname FROM pg_database WHERE has_database_privilege($1, datname, 'CONNECT')",
    )
    .bind(&sql_user)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
}

/// Roles that can currently connect to `db`.
pub async fn get_database_users(pool: &PgPool, db: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT rolname FROM pg_roles WHERE rolcanlogin \
         AND has_database_privilege(rolname, $1, 'CONNECT')",
    )
    .bind(db)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| crate::naming::display_owner_name(&r.get::<String, _>("rolname")))
        .collect())
}

/// Database names matching a `LIKE`-style `pattern`.
pub async fn get_matched_databases(pool: &PgPool, pattern: &str) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT datname FROM pg_database WHERE datname LIKE $1")
        .bind(pattern)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_identifiers_with_double_quotes() {
        assert_eq!(quote_ident("spqr_test"), "\"spqr_test\"");
    }
}
