//! The job-kind enumeration: one variant per handler `srcf_tasks` knows how
//! to run, each carrying its own typed argument record in place of the
//! original's per-class string-keyed `row.args` dict. Grounded on
//! `controllib/jobs.py`'s `all_jobs` registry (the `@add_job`-decorated
//! classes): `job_type()` returns the exact `JOB_TYPE` string each class
//! declared, so the on-disk `jobs.type` column is unchanged.

use std::fmt;
use std::str::FromStr;

use srcf_protocol::MailHandler;

use crate::args::{self, ArgsMap};
use crate::error::{JobsError, Result};

/// `ChangeSocietyAdmin`'s `action` argument: add or remove `target_member`
/// from the society's admin set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Add,
    Remove,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Add => "add",
            AdminAction::Remove => "remove",
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminAction {
    type Err = JobsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(AdminAction::Add),
            "remove" => Ok(AdminAction::Remove),
            other => Err(JobsError::InvalidArg {
                job_type: "change_society_admin",
                key: "action",
                value: other.to_string(),
            }),
        }
    }
}

/// A fully typed job: which handler runs it, and the arguments it runs
/// with. `society`-scoped variants carry their society's short name
/// directly (the original's `SocietyJob.society_society` property reading
/// `row.args["society"]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    /// Sleeps for `sleep_time` seconds (capped at 40), to exercise runner
    /// concurrency without touching any real subsystem.
    Test { sleep_time: u32 },
    Signup {
        crsid: String,
        preferred_name: String,
        surname: String,
        email: String,
        mail_handler: MailHandler,
        social: bool,
    },
    Reactivate { email: String },
    ResetUserPassword,
    UpdateName { preferred_name: String, surname: String },
    UpdateEmailAddress { email: String },
    UpdateMailHandler { mail_handler: MailHandler },
    CreateUserMailingList { listname: String },
    ResetUserMailingListPassword { listname: String },
    AddUserVhost { domain: String, root: Option<String> },
    ChangeUserVhostDocroot { domain: String, root: Option<String> },
    RemoveUserVhost { domain: String },
    CreateSociety {
        society: String,
        description: String,
        admins: Vec<String>,
    },
    UpdateSocietyDescription { society: String, description: String },
    UpdateSocietyRoleEmail { society: String, email: String },
    ChangeSocietyAdmin {
        society: String,
        target_member: String,
        action: AdminAction,
    },
    CreateSocietyMailingList { society: String, listname: String },
    ResetSocietyMailingListPassword { society: String, listname: String },
    CreateMySQLUserDatabase,
    ResetMySQLUserPassword,
    CreateMySQLSocietyDatabase { society: String },
    ResetMySQLSocietyPassword { society: String },
    CreatePostgresUserDatabase,
    ResetPostgresUserPassword,
    CreatePostgresSocietyDatabase { society: String },
    ResetPostgresSocietyPassword { society: String },
    AddSocietyVhost { society: String, domain: String, root: Option<String> },
    ChangeSocietyVhostDocroot { society: String, domain: String, root: Option<String> },
    RemoveSocietyVhost { society: String, domain: String },
    /// Disables the submitting member's account: shell, crontab, SQL
    /// access, and (unless `keep_groups`) their society admin memberships.
    CancelMember { keep_groups: bool },
    /// Scrubs a previously cancelled member's name and personal data and
    /// drops their remaining SQL/mailing-list/domain resources.
    DeleteMember,
    /// Scrubs a society's name and personal data and drops its remaining
    /// SQL/mailing-list/domain resources, after its members have been
    /// removed from its admin set.
    DeleteSociety { society: String },
}

impl JobKind {
    /// The literal string stored in the `jobs.type` column.
    pub fn job_type(&self) -> &'static str {
        match self {
            JobKind::Test { .. } => "test",
            JobKind::Signup { .. } => "signup",
            JobKind::Reactivate { .. } => "reactivate",
            JobKind::ResetUserPassword => "reset_user_password",
            JobKind::UpdateName { .. } => "update_name",
            JobKind::UpdateEmailAddress { .. } => "update_email_address",
            JobKind::UpdateMailHandler { .. } => "update_mail_handler",
            JobKind::CreateUserMailingList { .. } => "create_user_mailing_list",
            JobKind::ResetUserMailingListPassword { .. } => "reset_user_mailing_list_password",
            JobKind::AddUserVhost { .. } => "add_user_vhost",
            JobKind::ChangeUserVhostDocroot { .. } => "change_user_vhost_docroot",
            JobKind::RemoveUserVhost { .. } => "remove_user_vhost",
            JobKind::CreateSociety { .. } => "create_society",
            JobKind::UpdateSocietyDescription { .. } => "update_society_description",
            JobKind::UpdateSocietyRoleEmail { .. } => "update_society_role_email",
            JobKind::ChangeSocietyAdmin { .. } => "change_society_admin",
            JobKind::CreateSocietyMailingList { .. } => "create_society_mailing_list",
            JobKind::ResetSocietyMailingListPassword { .. } => "reset_society_mailing_list_password",
            JobKind::CreateMySQLUserDatabase => "create_mysql_user_database",
            JobKind::ResetMySQLUserPassword => "reset_mysql_user_password",
            JobKind::CreateMySQLSocietyDatabase { .. } => "create_mysql_society_database",
            JobKind::ResetMySQLSocietyPassword { .. } => "reset_mysql_society_password",
            JobKind::CreatePostgresUserDatabase => "create_postgres_user_database",
            JobKind::ResetPostgresUserPassword => "reset_postgres_user_password",
            JobKind::CreatePostgresSocietyDatabase { .. } => "create_postgres_society_database",
            JobKind::ResetPostgresSocietyPassword { .. } => "reset_postgres_society_password",
            JobKind::AddSocietyVhost { .. } => "add_society_vhost",
            JobKind::ChangeSocietyVhostDocroot { .. } => "change_society_vhost_docroot",
            JobKind::RemoveSocietyVhost { .. } => "remove_society_vhost",
            JobKind::CancelMember { .. } => "cancel_member",
            JobKind::DeleteMember => "delete_member",
            JobKind::DeleteSociety { .. } => "delete_society",
        }
    }

    /// The society short name this job is scoped to, for the variants
    /// mirroring the original's `SocietyJob` subclass (used to find jobs by
    /// society and to resolve admin-change approval policy).
    pub fn society(&self) -> Option<&str> {
        match self {
            JobKind::CreateSociety { society, .. }
            | JobKind::UpdateSocietyDescription { society, .. }
            | JobKind::UpdateSocietyRoleEmail { society, .. }
            | JobKind::ChangeSocietyAdmin { society, .. }
            | JobKind::CreateSocietyMailingList { society, .. }
            | JobKind::ResetSocietyMailingListPassword { society, .. }
            | JobKind::CreateMySQLSocietyDatabase { society }
            | JobKind::ResetMySQLSocietyPassword { society }
            | JobKind::CreatePostgresSocietyDatabase { society }
            | JobKind::ResetPostgresSocietyPassword { society }
            | JobKind::AddSocietyVhost { society, .. }
            | JobKind::ChangeSocietyVhostDocroot { society, .. }
            | JobKind::RemoveSocietyVhost { society, .. }
            | JobKind::DeleteSociety { society } => Some(society),
            _ => None,
        }
    }

    /// Serialise into the `jobs.args` string map.
    pub fn to_args(&self) -> ArgsMap {
        let mut map = ArgsMap::new();
        match self {
            JobKind::Test { sleep_time } => {
                map.insert("sleep_time".into(), sleep_time.to_string());
            }
            JobKind::Signup { crsid, preferred_name, surname, email, mail_handler, social } => {
                map.insert("crsid".into(), crsid.clone());
                map.insert("preferred_name".into(), preferred_name.clone());
                map.insert("surname".into(), surname.clone());
                map.insert("email".into(), email.clone());
                map.insert("mail_handler".into(), mail_handler.as_str().to_string());
                map.insert("social".into(), args::format_yn(*social).to_string());
            }
            JobKind::Reactivate { email } => {
                map.insert("email".into(), email.clone());
            }
            JobKind::ResetUserPassword => {}
            JobKind::UpdateName { preferred_name, surname } => {
                map.insert("preferred_name".into(), preferred_name.clone());
                map.insert("surname".into(), surname.clone());
            }
            JobKind::UpdateEmailAddress { email } => {
                map.insert("email".into(), email.clone());
            }
            JobKind::UpdateMailHandler { mail_handler } => {
                map.insert("mail_handler".into(), mail_handler.as_str().to_string());
            }
            JobKind::CreateUserMailingList { listname } | JobKind::ResetUserMailingListPassword { listname } => {
                map.insert("listname".into(), listname.clone());
            }
            JobKind::AddUserVhost { domain, root } | JobKind::ChangeUserVhostDocroot { domain, root } => {
                map.insert("domain".into(), domain.clone());
                args::set_optional(&mut map, "root", root.as_deref());
            }
            JobKind::RemoveUserVhost { domain } => {
                map.insert("domain".into(), domain.clone());
            }
            JobKind::CreateSociety { society, description, admins } => {
                map.insert("society".into(), society.clone());
                map.insert("description".into(), description.clone());
                map.insert("admins".into(), args::format_admins(admins));
            }
            JobKind::UpdateSocietyDescription { society, description } => {
                map.insert("society".into(), society.clone());
                map.insert("description".into(), description.clone());
            }
            JobKind::UpdateSocietyRoleEmail { society, email } => {
                map.insert("society".into(), society.clone());
                map.insert("email".into(), email.clone());
            }
            JobKind::ChangeSocietyAdmin { society, target_member, action } => {
                map.insert("society".into(), society.clone());
                map.insert("target_member".into(), target_member.clone());
                map.insert("action".into(), action.as_str().to_string());
            }
            JobKind::CreateSocietyMailingList { society, listname }
            | JobKind::ResetSocietyMailingListPassword { society, listname } => {
                map.insert("society".into(), society.clone());
                map.insert("listname".into(), listname.clone());
            }
            JobKind::CreateMySQLUserDatabase
            | JobKind::ResetMySQLUserPassword
            | JobKind::CreatePostgresUserDatabase
            | JobKind::ResetPostgresUserPassword => {}
            JobKind::CreateMySQLSocietyDatabase { society }
            | JobKind::ResetMySQLSocietyPassword { society }
            | JobKind::CreatePostgresSocietyDatabase { society }
            | JobKind::ResetPostgresSocietyPassword { society } => {
                map.insert("society".into(), society.clone());
            }
            JobKind::AddSocietyVhost { society, domain, root }
            | JobKind::ChangeSocietyVhostDocroot { society, domain, root } => {
                map.insert("society".into(), society.clone());
                map.insert("domain".into(), domain.clone());
                args::set_optional(&mut map, "root", root.as_deref());
            }
            JobKind::RemoveSocietyVhost { society, domain } => {
                map.insert("society".into(), society.clone());
                map.insert("domain".into(), domain.clone());
            }
            JobKind::CancelMember { keep_groups } => {
                map.insert("keep_groups".into(), args::format_yn(*keep_groups).to_string());
            }
            JobKind::DeleteMember => {}
            JobKind::DeleteSociety { society } => {
                map.insert("society".into(), society.clone());
            }
        }
        map
    }

    /// Parse a `(job_type, args)` pair back into a typed [`JobKind`].
    pub fn from_args(job_type: &str, map: &ArgsMap) -> Result<Self> {
        Ok(match job_type {
            "test" => JobKind::Test {
                sleep_time: args::require(map, "test", "sleep_time")?
                    .parse()
                    .map_err(|_| JobsError::InvalidArg {
                        job_type: "test",
                        key: "sleep_time",
                        value: map.get("sleep_time").cloned().unwrap_or_default(),
                    })?,
            },
            "signup" => JobKind::Signup {
                crsid: args::require(map, "signup", "crsid")?.to_string(),
                preferred_name: args::require(map, "signup", "preferred_name")?.to_string(),
                surname: args::require(map, "signup", "surname")?.to_string(),
                email: args::require(map, "signup", "email")?.to_string(),
                mail_handler: parse_mail_handler(map, "signup")?,
                social: args::parse_yn(map, "signup", "social")?,
            },
            "reactivate" => JobKind::Reactivate {
                email: args::require(map, "reactivate", "email")?.to_string(),
            },
            "reset_user_password" => JobKind::ResetUserPassword,
            "update_name" => JobKind::UpdateName {
                preferred_name: args::require(map, "update_name", "preferred_name")?.to_string(),
                surname: args::require(map, "update_name", "surname")?.to_string(),
            },
            "update_email_address" => JobKind::UpdateEmailAddress {
                email: args::require(map, "update_email_address", "email")?.to_string(),
            },
            "update_mail_handler" => JobKind::UpdateMailHandler {
                mail_handler: parse_mail_handler(map, "update_mail_handler")?,
            },
            "create_user_mailing_list" => JobKind::CreateUserMailingList {
                listname: args::require(map, "create_user_mailing_list", "listname")?.to_string(),
            },
            "reset_user_mailing_list_password" => JobKind::ResetUserMailingListPassword {
                listname: args::require(map, "reset_user_mailing_list_password", "listname")?.to_string(),
            },
            "add_user_vhost" => JobKind::AddUserVhost {
                domain: args::require(map, "add_user_vhost", "domain")?.to_string(),
                root: args::optional_nonempty(map, "root"),
            },
            "change_user_vhost_docroot" => JobKind::ChangeUserVhostDocroot {
                domain: args::require(map, "change_user_vhost_docroot", "domain")?.to_string(),
                root: args::optional_nonempty(map, "root"),
            },
            "remove_user_vhost" => JobKind::RemoveUserVhost {
                domain: args::require(map, "remove_user_vhost", "domain")?.to_string(),
            },
            "create_society" => JobKind::CreateSociety {
                society: args::require(map, "create_society", "society")?.to_string(),
                description: args::require(map, "create_society", "description")?.to_string(),
                admins: args::parse_admins(map, "create_society")?,
            },
            "update_society_description" => JobKind::UpdateSocietyDescription {
                society: args::require(map, "update_society_description", "society")?.to_string(),
                description: args::require(map, "update_society_description", "description")?.to_string(),
            },
            "update_society_role_email" => JobKind::UpdateSocietyRoleEmail {
                society: args::require(map, "update_society_role_email", "society")?.to_string(),
                email: args::require(map, "update_society_role_email", "email")?.to_string(),
            },
            "change_society_admin" => JobKind::ChangeSocietyAdmin {
                society: args::require(map, "change_society_admin", "society")?.to_string(),
                target_member: args::require(map, "change_society_admin", "target_member")?.to_string(),
                action: AdminAction::from_str(args::require(map, "change_society_admin", "action")?)?,
            },
            "create_society_mailing_list" => JobKind::CreateSocietyMailingList {
                society: args::require(map, "create_society_mailing_list", "society")?.to_string(),
                listname: args::require(map, "create_society_mailing_list", "listname")?.to_string(),
            },
            "reset_society_mailing_list_password" => JobKind::ResetSocietyMailingListPassword {
                society: args::require(map, "reset_society_mailing_list_password", "society")?.to_string(),
                listname: args::require(map, "reset_society_mailing_list_password", "listname")?.to_string(),
            },
            "create_mysql_user_database" => JobKind::CreateMySQLUserDatabase,
            "reset_mysql_user_password" => JobKind::ResetMySQLUserPassword,
            "create_mysql_society_database" => JobKind::CreateMySQLSocietyDatabase {
                society: args::require(map, "create_mysql_society_database", "society")?.to_string(),
            },
            "reset_mysql_society_password" => JobKind::ResetMySQLSocietyPassword {
                society: args::require(map, "reset_mysql_society_password", "society")?.to_string(),
            },
            "create_postgres_user_database" => JobKind::CreatePostgresUserDatabase,
            "reset_postgres_user_password" => JobKind::ResetPostgresUserPassword,
            "create_postgres_society_database" => JobKind::CreatePostgresSocietyDatabase {
                society: args::require(map, "create_postgres_society_database", "society")?.to_string(),
            },
            "reset_postgres_society_password" => JobKind::ResetPostgresSocietyPassword {
                society: args::require(map, "reset_postgres_society_password", "society")?.to_string(),
            },
            "add_society_vhost" => JobKind::AddSocietyVhost {
                society: args::require(map, "add_society_vhost", "society")?.to_string(),
                domain: args::require(map, "add_society_vhost", "domain")?.to_string(),
                root: args::optional_nonempty(map, "root"),
            },
            "change_society_vhost_docroot" => JobKind::ChangeSocietyVhostDocroot {
                society: args::require(map, "change_society_vhost_docroot", "society")?.to_string(),
                domain: args::require(map, "change_society_vhost_docroot", "domain")?.to_string(),
                root: args::optional_nonempty(map, "root"),
            },
            "remove_society_vhost" => JobKind::RemoveSocietyVhost {
                society: args::require(map, "remove_society_vhost", "society")?.to_string(),
                domain: args::require(map, "remove_society_vhost", "domain")?.to_string(),
            },
            "cancel_member" => JobKind::CancelMember {
                keep_groups: args::parse_yn(map, "cancel_member", "keep_groups")?,
            },
            "delete_member" => JobKind::DeleteMember,
            "delete_society" => JobKind::DeleteSociety {
                society: args::require(map, "delete_society", "society")?.to_string(),
            },
            other => return Err(JobsError::UnknownJobKind(other.to_string())),
        })
    }
}

fn parse_mail_handler(map: &ArgsMap, job_type: &'static str) -> Result<MailHandler> {
    let raw = args::require(map, job_type, "mail_handler")?;
    MailHandler::from_str(raw).map_err(|_| JobsError::InvalidArg {
        job_type,
        key: "mail_handler",
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_round_trips_through_args() {
        let kind = JobKind::Signup {
            crsid: "ab123".into(),
            preferred_name: "Alice".into(),
            surname: "Baker".into(),
            email: "ab123@cam.ac.uk".into(),
            mail_handler: MailHandler::Forward,
            social: true,
        };
        let map = kind.to_args();
        assert_eq!(map.get("social").map(String::as_str), Some("y"));
        let parsed = JobKind::from_args("signup", &map).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn vhost_root_omitted_round_trips_to_none() {
        let kind = JobKind::AddUserVhost { domain: "example.com".into(), root: None };
        let map = kind.to_args();
        let parsed = JobKind::from_args("add_user_vhost", &map).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn create_society_admins_are_sorted_on_parse() {
        let mut map = ArgsMap::new();
        map.insert("society".into(), "spqr".into());
        map.insert("description".into(), "Quoits".into());
        map.insert("admins".into(), "zz99,ab123".into());
        let parsed = JobKind::from_args("create_society", &map).unwrap();
        assert_eq!(
            parsed,
            JobKind::CreateSociety {
                society: "spqr".into(),
                description: "Quoits".into(),
                admins: vec!["ab123".into(), "zz99".into()],
            }
        );
    }

    #[test]
    fn unknown_job_type_is_rejected() {
        let err = JobKind::from_args("not_a_real_job", &ArgsMap::new()).unwrap_err();
        assert!(matches!(err, JobsError::UnknownJobKind(_)));
    }

    #[test]
    fn missing_required_arg_is_rejected() {
        let err = JobKind::from_args("reactivate", &ArgsMap::new()).unwrap_err();
        assert!(matches!(err, JobsError::MissingArg { .. }));
    }

    #[test]
    fn cancel_member_round_trips_through_args() {
        let kind = JobKind::CancelMember { keep_groups: true };
        let map = kind.to_args();
        let parsed = JobKind::from_args("cancel_member", &map).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn delete_society_round_trips_through_args() {
        let kind = JobKind::DeleteSociety { society: "spqr".into() };
        let map = kind.to_args();
        let parsed = JobKind::from_args("delete_society", &map).unwrap();
        assert_eq!(parsed, kind);
    }

    #[test]
    fn society_scoped_variant_reports_its_society() {
        let kind = JobKind::CreateMySQLSocietyDatabase { society: "spqr".into() };
        assert_eq!(kind.society(), Some("spqr"));
        assert_eq!(JobKind::ResetUserPassword.society(), None);
    }
}
