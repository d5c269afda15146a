//! The task layer: one module per job family, each composing
//! `srcf_unix`/`srcf_sql`/`srcf_mailman`/`srcf_bespoke` primitives into a
//! complete handler. [`dispatch::dispatch`] is the single entry point the
//! runner calls; everything else is exported for direct use in tests.
//!
//! Mirrors `controllib.jobs`' per-class `run()` methods, grounded module
//! by module on the originals they replace.

mod admin;
mod cancel;
mod context;
mod delete;
mod dispatch;
mod error;
mod mailing_list;
mod password_reset;
mod reactivate;
mod role_sync;
mod signup;
mod society;
mod sql_db;
mod test_task;
mod update;
mod vhost;

pub use context::{Paths, TaskContext};
pub use dispatch::dispatch;
pub use error::{Result, TasksError};

pub use admin::run as change_society_admin;
pub use cancel::run as cancel_member;
pub use delete::{delete_member, delete_society};
pub use mailing_list::{create_society_mailing_list, create_user_mailing_list};
pub use password_reset::{
    reset_mysql_society_password, reset_mysql_user_password, reset_postgres_society_password,
    reset_postgres_user_password, reset_society_mailing_list_password, reset_user_mailing_list_password,
    reset_user_password,
};
pub use reactivate::run as reactivate;
pub use role_sync::{sync_mysql_admin, sync_postgres_admin};
pub use signup::run as signup;
pub use society::{run as create_society, sync_admin_side_effects};
pub use sql_db::{create_mysql_database, create_postgres_database};
pub use update::{
    update_email_address, update_mail_handler, update_name, update_society_description,
    update_society_role_email,
};
pub use vhost::{
    add_society_vhost, add_user_vhost, change_society_vhost_docroot, change_user_vhost_docroot,
    remove_society_vhost, remove_user_vhost,
};
