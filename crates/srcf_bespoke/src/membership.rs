//! The membership database: registering/updating members and societies and
//! their admin relationships. Grounded on `srcflib.plumbing.bespoke`'s
//! `create_member`/`create_society`/`add_to_society`/`remove_from_society`,
//! which operate on SQLAlchemy model instances within a session; here each
//! primitive is its own statement (or short transaction) against the pool.

use sqlx::postgres::PgPool;
use sqlx::Row;
use std::str::FromStr;

use srcf_protocol::{MailHandler, Member, Society};
use srcf_task::{State, TaskResult};

use crate::error::{BespokeError, Result};

/// First UID/GID handed out to a member account.
pub const MEMBER_ID_BASE: i32 = 10000;
/// First UID/GID handed out to a society account.
pub const SOCIETY_ID_BASE: i32 = 20000;

/// Next free UID (shared with GID; accounts are always created with
/// matching UID/GID) at or above `base`, one past whichever of `members`
/// or `societies` holds the highest assigned id in that range.
async fn next_id(pool: &PgPool, base: i32) -> Result<i32> {
    let row = sqlx::query(
        "SELECT GREATEST( \
            (SELECT COALESCE(MAX(uid), $1 - 1) FROM members WHERE uid >= $1), \
            (SELECT COALESCE(MAX(uid), $1 - 1) FROM societies WHERE uid >= $1) \
         ) + 1 AS next_id",
    )
    .bind(base)
    .fetch_one(pool)
    .await?;
    Ok(row.try_get("next_id")?)
}

/// Allocate the next free member UID/GID, starting from [`MEMBER_ID_BASE`].
pub async fn allocate_member_id(pool: &PgPool) -> Result<i32> {
    next_id(pool, MEMBER_ID_BASE).await
}

/// Allocate the next free society UID/GID, starting from [`SOCIETY_ID_BASE`].
pub async fn allocate_society_id(pool: &PgPool) -> Result<i32> {
    next_id(pool, SOCIETY_ID_BASE).await
}

fn row_to_member(row: &sqlx::postgres::PgRow) -> std::result::Result<Member, sqlx::Error> {
    let mail_handler: String = row.try_get("mail_handler")?;
    Ok(Member {
        crsid: row.try_get("crsid")?,
        preferred_name: row.try_get("preferred_name")?,
        surname: row.try_get("surname")?,
        email: row.try_get("email")?,
        mail_handler: MailHandler::from_str(&mail_handler)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        member: row.try_get("member")?,
        user: row.try_get("user")?,
        danger: row.try_get("danger")?,
        notes: row.try_get("notes")?,
        uid: row.try_get("uid")?,
        gid: row.try_get("gid")?,
        joined: row.try_get("joined")?,
    })
}

/// Look up a member by crsid.
pub async fn get_member(pool: &PgPool, crsid: &str) -> Result<Option<Member>> {
    let row = sqlx::query(
        "SELECT crsid, preferred_name, surname, email, mail_handler, member, \"user\", \
         danger, notes, uid, gid, joined FROM members WHERE crsid = $1",
    )
    .bind(crsid)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(row_to_member).transpose().map_err(Into::into)
}

/// Register a new member, or update one that already exists in place.
/// Mirrors `create_member`: an upsert keyed on `crsid`.
pub async fn upsert_member(
    pool: &PgPool,
    crsid: &str,
    preferred_name: &str,
    surname: &str,
    email: &str,
    mail_handler: MailHandler,
    is_member: bool,
    is_user: bool,
) -> Result<TaskResult<Member>> {
    let existed = get_member(pool, crsid).await?.is_some();
    sqlx::query(
        "INSERT INTO members (crsid, preferred_name, surname, email, mail_handler, member, \"user\") \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (crsid) DO UPDATE SET \
           preferred_name = EXCLUDED.preferred_name, \
           surname = EXCLUDED.surname, \
           email = EXCLUDED.email, \
           mail_handler = EXCLUDED.mail_handler, \
           member = EXCLUDED.member, \
           \"user\" = EXCLUDED.user",
    )
    .bind(crsid)
    .bind(preferred_name)
    .bind(surname)
    .bind(email)
    .bind(mail_handler.as_str())
    .bind(is_member)
    .bind(is_user)
    .execute(pool)
    .await?;

    let member = get_member(pool, crsid)
        .await?
        .ok_or_else(|| BespokeError::Other(format!("member {crsid} vanished after upsert")))?;
    let state = if existed { State::Success } else { State::Created };
    Ok(TaskResult::new("upsert_member", state, member))
}

/// Assign a member's UID/GID. A no-op if already set to the requested
/// values; rejects overwriting a *different* already-assigned id, since
/// UID/GID are permanent once allocated.
pub async fn set_member_ids(pool: &PgPool, crsid: &str, uid: i32, gid: i32) -> Result<TaskResult<()>> {
    let member = get_member(pool, crsid)
        .await?
        .ok_or_else(|| BespokeError::Other(format!("no such member {crsid}")))?;
    match (member.uid, member.gid) {
        (Some(u), Some(g)) if u == uid && g == gid => return Ok(TaskResult::new("set_member_ids", State::Unchanged, ())),
        (Some(u), Some(g)) => {
            return Err(BespokeError::Other(format!(
                "member {crsid} already has uid/gid {u}/{g}, cannot reassign to {uid}/{gid}"
            )))
        }
        _ => {}
    }
    sqlx::query("UPDATE members SET uid = $2, gid = $3 WHERE crsid = $1")
        .bind(crsid)
        .bind(uid)
        .bind(gid)
        .execute(pool)
        .await?;
    Ok(TaskResult::new("set_member_ids", State::Created, ()))
}

/// Assign a society's UID/GID, with the same once-only semantics as
/// [`set_member_ids`].
pub async fn set_society_ids(pool: &PgPool, society: &str, uid: i32, gid: i32) -> Result<TaskResult<()>> {
    let existing = get_society(pool, society)
        .await?
        .ok_or_else(|| BespokeError::Other(format!("no such society {society}")))?;
    match (existing.uid, existing.gid) {
        (Some(u), Some(g)) if u == uid && g == gid => return Ok(TaskResult::new("set_society_ids", State::Unchanged, ())),
        (Some(u), Some(g)) => {
            return Err(BespokeError::Other(format!(
                "society {society} already has uid/gid {u}/{g}, cannot reassign to {uid}/{gid}"
            )))
        }
        _ => {}
    }
    sqlx::query("UPDATE societies SET uid = $2, gid = $3 WHERE society = $1")
        .bind(society)
        .bind(uid)
        .bind(gid)
        .execute(pool)
        .await?;
    Ok(TaskResult::new("set_society_ids", State::Created, ()))
}

async fn admin_crsids(pool: &PgPool, society: &str) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT crsid FROM society_admins WHERE society = $1 ORDER BY crsid")
        .bind(society)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
}

async fn row_to_society(pool: &PgPool, row: &sqlx::postgres::PgRow) -> Result<Society> {
    let name: String = row.try_get("society")?;
    let admin_crsids = admin_crsids(pool, &name).await?;
    Ok(Society {
        society: name,
        description: row.try_get("description")?,
        role_email: row.try_get("role_email")?,
        danger: row.try_get("danger")?,
        notes: row.try_get("notes")?,
        uid: row.try_get("uid")?,
        gid: row.try_get("gid")?,
        joined: row.try_get("joined")?,
        admin_crsids,
    })
}

/// Look up a society by its short name.
pub async fn get_society(pool: &PgPool, name: &str) -> Result<Option<Society>> {
    let row = sqlx::query(
        "SELECT society, description, role_email, danger, notes, uid, gid, joined \
         FROM societies WHERE society = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    match row {
        Some(row) => Ok(Some(row_to_society(pool, &row).await?)),
        None => Ok(None),
    }
}

/// Every society `crsid` currently administers.
pub async fn get_societies_for_admin(pool: &PgPool, crsid: &str) -> Result<Vec<String>> {
    let rows = sqlx::query("SELECT society FROM society_admins WHERE crsid = $1 ORDER BY society")
        .bind(crsid)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
}

/// Register a new society with its initial admin set, or update an
/// existing one's description/role email. Mirrors `create_society`: on
/// update, the admin set must already match `admins` (admin membership is
/// changed only via [`add_to_society`]/[`remove_from_society`]).
pub async fn upsert_society(
    pool: &PgPool,
    name: &str,
    description: &str,
    admins: &[String],
    role_email: Option<&str>,
) -> Result<TaskResult<Society>> {
    match get_society(pool, name).await? {
        Some(existing) => {
            let mut have: Vec<String> = existing.admin_crsids.clone();
            let mut want: Vec<String> = admins.to_vec();
            have.sort();
            want.sort();
            if have != want {
                return Err(BespokeError::Other(format!(
                    "admins for {name:?} are {have:?}, expecting {want:?}"
                )));
            }
            sqlx::query("UPDATE societies SET description = $2, role_email = $3 WHERE society = $1")
                .bind(name)
                .bind(description)
                .bind(role_email)
                .execute(pool)
                .await?;
            let society = get_society(pool, name).await?.expect("just updated");
            Ok(TaskResult::new("upsert_society", State::Success, society))
        }
        None => {
            let mut tx = pool.begin().await?;
            sqlx::query("INSERT INTO societies (society, description, role_email) VALUES ($1, $2, $3)")
                .bind(name)
                .bind(description)
                .bind(role_email)
                .execute(&mut *tx)
                .await?;
            for crsid in admins {
                sqlx::query("INSERT INTO society_admins (society, crsid) VALUES ($1, $2)")
                    .bind(name)
                    .bind(crsid)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            let society = get_society(pool, name).await?.expect("just inserted");
            Ok(TaskResult::new("upsert_society", State::Created, society))
        }
    }
}

/// Add `crsid` as an admin of `society`. A no-op if already one.
pub async fn add_to_society(pool: &PgPool, crsid: &str, society: &str) -> Result<TaskResult<bool>> {
    let result = sqlx::query(
        "INSERT INTO society_admins (society, crsid) VALUES ($1, $2) \
         ON CONFLICT (society, crsid) DO NOTHING",
    )
    .bind(society)
    .bind(crsid)
    .execute(pool)
    .await?;
    let added = result.rows_affected() > 0;
    let state = if added { State::Created } else { State::Unchanged };
    Ok(TaskResult::new("add_to_society", state, added))
}

/// Remove `crsid` as an admin of `society`. A no-op if not currently one.
pub async fn remove_from_society(pool: &PgPool, crsid: &str, society: &str) -> Result<TaskResult<bool>> {
    let result = sqlx::query("DELETE FROM society_admins WHERE society = $1 AND crsid = $2")
        .bind(society)
        .bind(crsid)
        .execute(pool)
        .await?;
    let removed = result.rows_affected() > 0;
    let state = if removed { State::Success } else { State::Unchanged };
    Ok(TaskResult::new("remove_from_society", state, removed))
}
