//! Idempotent SQL plumbing for the two dialects jobs provision accounts
//! and databases against: MySQL and PostgreSQL. The conceptual surface is
//! the same in both (`ensure_user`, `reset_password`, `create_database`,
//! `grant_database`, the introspection queries); the two dialects live in
//! separate modules rather than behind a shared trait, since `sqlx`'s
//! pool/connection types for each are genuinely different types and the
//! call sites always know statically which dialect they're talking to.

pub mod error;
pub mod mysql;
pub mod naming;
pub mod pgsql;

pub use error::{Result, SqlError};
pub use naming::{display_owner_name, mysql_database_name, sql_owner_name};
pub use pgsql::Role;
