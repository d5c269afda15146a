//! Per-society SQL access reconciliation: keeping database grants (MySQL)
//! and role membership (PostgreSQL) in step with the `society_admins`
//! table whenever an admin is added or removed. No direct `srcflib`
//! counterpart — role membership there is resynced ad hoc by whichever
//! task touches it; here it is its own pair of primitives so
//! [`crate::admin`] and [`crate::cancel`] can both call it.

use sqlx::mysql::MySqlPool;
use sqlx::postgres::PgPool;

use srcf_task::TaskResult;

use crate::error::Result;

/// Grant or revoke `crsid`'s access to every MySQL database the society
/// owns (its bare database and every `<society>/<suffix>` database under
/// it), by issuing the minimum `GRANT`/`REVOKE` needed.
pub async fn sync_mysql_admin(
    pool: &MySqlPool,
    society: &str,
    crsid: &str,
    should_have_access: bool,
) -> Result<TaskResult<()>> {
    let mut databases = srcf_sql::mysql::get_matched_databases(pool, society).await?;
    databases.retain(|d| d == society);
    databases.extend(srcf_sql::mysql::get_matched_databases(pool, &format!("{society}/%")).await?);

    let mut changed = false;
    for db in &databases {
        let result = if should_have_access {
            srcf_sql::mysql::grant_database(pool, crsid, db).await?
        } else {
            srcf_sql::mysql::revoke_database(pool, crsid, db).await?
        };
        if result.changed() {
            changed = true;
        }
    }

    let state = if changed {
        srcf_task::State::Success
    } else {
        srcf_task::State::Unchanged
    };
    Ok(TaskResult::new("sync_mysql_admin", state, ()))
}

/// Grant or revoke `crsid`'s membership of the society's own PostgreSQL
/// role, which every society database is owned by/granted to — membership
/// in it is what gives an admin `CONNECT`/table access.
pub async fn sync_postgres_admin(
    pool: &PgPool,
    society: &str,
    crsid: &str,
    should_have_access: bool,
) -> Result<TaskResult<()>> {
    if should_have_access {
        Ok(srcf_sql::pgsql::grant_role_membership(pool, crsid, society).await?)
    } else {
        Ok(srcf_sql::pgsql::revoke_role_membership(pool, crsid, society).await?)
    }
}
