//! UNIX account, group, home-directory, NFSv4 ACL and netgroup plumbing.
//!
//! Every primitive here is idempotent and returns a [`srcf_task::TaskResult`]
//! describing whether it created, modified, or found-already-satisfied
//! whatever it was asked to ensure. Primitives tagged as host-restricted
//! (those touching the authoritative user database) call
//! [`srcf_task::require_host`] before doing anything.

mod atomic_file;
mod crontab;
pub mod error;
mod fs;
mod group;
mod nfs_acl;
mod nfs_chown;
mod netgroup;
mod process;
mod user;

pub use crontab::clear_crontab;
pub use error::{Result, UnixError};
pub use fs::{copytree_chown_chmod, create_home, mkdir, symlink, MODE_PRIVATE_HOME, MODE_PUBLIC_HOME};
pub use group::{ensure_group, getent_group, rename_group, GroupEntry};
pub use netgroup::{add_netgroup_member, remove_netgroup_member};
pub use nfs_acl::{expand_aliases, get_nfs_acl, set_nfs_acl};
pub use nfs_chown::nfs_aware_chown;
pub use user::{
    add_to_group, ensure_user, getent_passwd, remove_from_group, rename_user, reset_password,
    set_default_group, set_home_dir, set_real_name, EnsureUser, PasswdEntry, NOLOGIN_SHELLS,
};
