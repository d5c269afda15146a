//! SRCF-specific plumbing that doesn't belong to any one external system:
//! the membership database rows, home-directory/mail provisioning, society
//! archival, and the thin wrappers around the facility's site helper
//! scripts. Grounded on `srcflib/plumbing/bespoke.py`.

mod archive;
mod domain;
mod error;
mod helpers;
mod home;
mod membership;
mod process;

pub use archive::archive_society;
pub use domain::{delete_domain, get_domain, get_domains_for_owner, insert_domain, set_domain_root};
pub use error::{BespokeError, Result};
pub use helpers::{
    configure_mailing_list, export_members, generate_apache_groups, generate_sudoers, make_yp,
    queue_list_subscription, slay, update_nis,
};
pub use home::{
    apache_status, create_forwarding_file, create_legacy_mailbox, empty_legacy_mailbox,
    link_soc_home_dir, nfs_exim_acl, set_quota,
};
pub use membership::{
    add_to_society, allocate_member_id, allocate_society_id, get_member, get_societies_for_admin,
    get_society, remove_from_society, set_member_ids, set_society_ids, upsert_member,
    upsert_society, MEMBER_ID_BASE, SOCIETY_ID_BASE,
};
