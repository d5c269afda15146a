//! Shared handles every workflow needs: the database pools and the
//! notification sender. Mirrors the single `db.session`/`mailer` pair
//! `controllib.jobs`' handlers close over, made explicit since there is no
//! ambient session-local state here.

use sqlx::mysql::MySqlPool;
use sqlx::postgres::PgPool;

use srcf_email::EmailWrapper;

/// Home directory roots, configurable so tests can point them at a tempdir.
#[derive(Debug, Clone)]
pub struct Paths {
    pub member_home_root: String,
    pub public_home_root: String,
    pub society_home_root: String,
    pub society_public_root: String,
    pub skel_dir: String,
    pub archive_root: String,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            member_home_root: "/home".into(),
            public_home_root: "/public/home".into(),
            society_home_root: "/societies".into(),
            society_public_root: "/public/societies".into(),
            skel_dir: "/etc/skel".into(),
            archive_root: "/archive/societies".into(),
        }
    }
}

/// The dependencies every task handler runs with. Constructed once at
/// runner start-up and passed by reference into each workflow.
pub struct TaskContext {
    pub pg_pool: PgPool,
    pub mysql_pool: MySqlPool,
    pub email: EmailWrapper,
    pub paths: Paths,
    /// Mailbox that cancellation/deletion audit notices go to, since those
    /// two jobs address sysadmins rather than the member or society itself.
    pub sysadmin_email: String,
}

impl TaskContext {
    pub fn new(pg_pool: PgPool, mysql_pool: MySqlPool, email: EmailWrapper) -> Self {
        Self {
            pg_pool,
            mysql_pool,
            email,
            paths: Paths::default(),
            sysadmin_email: "sysadmins@srcf.net".into(),
        }
    }

    pub fn with_paths(mut self, paths: Paths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_sysadmin_email(mut self, sysadmin_email: impl Into<String>) -> Self {
        self.sysadmin_email = sysadmin_email.into();
        self
    }
}
