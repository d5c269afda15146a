//! The `domains` table: custom vhosts mapped onto a member's or society's
//! home directory. No direct `srcflib` counterpart (vhost rows are read
//! through the ORM there); grounded on the same upsert/lookup shape as
//! [`crate::membership`].

use sqlx::postgres::PgPool;
use sqlx::Row;

use srcf_protocol::Domain;
use srcf_task::{State, TaskResult};

use crate::error::{BespokeError, Result};

fn row_to_domain(row: &sqlx::postgres::PgRow) -> std::result::Result<Domain, sqlx::Error> {
    Ok(Domain {
        id: row.try_get("id")?,
        domain: row.try_get("domain")?,
        owner_name: row.try_get("owner_name")?,
        root: row.try_get("root")?,
        wild: row.try_get("wild")?,
        danger: row.try_get("danger")?,
        last_good: row.try_get("last_good")?,
    })
}

/// Look up a domain by its DNS name.
pub async fn get_domain(pool: &PgPool, domain: &str) -> Result<Option<Domain>> {
    let row = sqlx::query(
        "SELECT id, domain, owner_name, root, wild, danger, last_good FROM domains WHERE domain = $1",
    )
    .bind(domain)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(row_to_domain).transpose().map_err(Into::into)
}

/// Every domain currently mapped onto `owner_name`.
pub async fn get_domains_for_owner(pool: &PgPool, owner_name: &str) -> Result<Vec<Domain>> {
    let rows = sqlx::query(
        "SELECT id, domain, owner_name, root, wild, danger, last_good \
         FROM domains WHERE owner_name = $1 ORDER BY domain",
    )
    .bind(owner_name)
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_domain).collect::<std::result::Result<_, _>>().map_err(Into::into)
}

/// Register a new vhost. Fails if the domain is already registered to
/// anyone — unlike the idempotent plumbing primitives, a vhost add is never
/// a safe no-op across owners.
pub async fn insert_domain(pool: &PgPool, domain: &str, owner_name: &str, root: Option<&str>) -> Result<TaskResult<Domain>> {
    if get_domain(pool, domain).await?.is_some() {
        return Err(BespokeError::Other(format!("domain {domain:?} is already registered")));
    }
    sqlx::query("INSERT INTO domains (domain, owner_name, root, wild, danger) VALUES ($1, $2, $3, false, false)")
        .bind(domain)
        .bind(owner_name)
        .bind(root)
        .execute(pool)
        .await?;
    let row = get_domain(pool, domain).await?.ok_or_else(|| BespokeError::Other(format!("domain {domain:?} vanished after insert")))?;
    Ok(TaskResult::new("insert_domain", State::Created, row))
}

/// Overwrite a vhost's document root override. A no-op if already set to
/// `root`.
pub async fn set_domain_root(pool: &PgPool, domain: &str, root: Option<&str>) -> Result<TaskResult<Domain>> {
    let existing = get_domain(pool, domain)
        .await?
        .ok_or_else(|| BespokeError::Other(format!("domain {domain:?} is not registered")))?;
    if existing.root.as_deref() == root {
        return Ok(TaskResult::new("set_domain_root", State::Unchanged, existing));
    }
    sqlx::query("UPDATE domains SET root = $2 WHERE domain = $1")
        .bind(domain)
        .bind(root)
        .execute(pool)
        .await?;
    let row = get_domain(pool, domain).await?.ok_or_else(|| BespokeError::Other(format!("domain {domain:?} vanished after update")))?;
    Ok(TaskResult::new("set_domain_root", State::Success, row))
}

/// Deregister a vhost. A no-op if it isn't currently registered.
pub async fn delete_domain(pool: &PgPool, domain: &str) -> Result<TaskResult<()>> {
    let result = sqlx::query("DELETE FROM domains WHERE domain = $1")
        .bind(domain)
        .execute(pool)
        .await?;
    let state = if result.rows_affected() > 0 { State::Success } else { State::Unchanged };
    Ok(TaskResult::new("delete_domain", state, ()))
}
