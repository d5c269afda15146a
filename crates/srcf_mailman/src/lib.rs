//! Mailing-list plumbing: idempotent operations against the list host's
//! Mailman install. Every write here is host-guarded to `hosts::LIST`
//! and mirrors `srcflib.plumbing.mailman`.

mod error;
mod list;
mod process;

pub use error::{MailmanError, Result};
pub use list::{
    ensure_list, get_list, new_list, remove_list, reset_password, set_owner, validate_list_name,
    RESERVED_SUFFIXES,
};
