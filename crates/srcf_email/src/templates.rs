//! Compile-time-checked notification templates. Each extends `layout.txt`
//! and overrides its `subject`/`body` blocks, mirroring the Jinja2
//! `layout`/block-inheritance scheme of `srcflib/email/__init__.py`, but
//! checked against its fields at compile time instead of at render time.

use askama::Template;

use crate::error::{EmailError, Result};

const BODY_SEPARATOR: &str = "@@SRCF-EMAIL-BODY@@";

/// Split a rendered `layout.txt` instantiation into its subject line and
/// body text.
pub(crate) fn split_rendered(rendered: &str) -> Result<(String, String)> {
    let (subject, body) = rendered
        .split_once(BODY_SEPARATOR)
        .ok_or_else(|| EmailError::MalformedTemplate(rendered.to_string()))?;
    Ok((subject.trim().to_string(), body.trim().to_string()))
}

#[derive(Template)]
#[template(path = "reactivated.txt")]
pub struct Reactivated {
    pub target_desc: String,
    pub new_email: String,
    pub password: String,
}

#[derive(Template)]
#[template(path = "email_updated.txt")]
pub struct EmailUpdated {
    pub target_desc: String,
    pub old_email: String,
    pub new_email: String,
}

#[derive(Template)]
#[template(path = "role_email_updated.txt")]
pub struct RoleEmailUpdated {
    pub target_desc: String,
    pub old_email: String,
    pub new_email: String,
}

#[derive(Template)]
#[template(path = "vhost_added.txt")]
pub struct VhostAdded {
    pub target_desc: String,
    pub domain: String,
    pub root: String,
}

#[derive(Template)]
#[template(path = "vhost_docroot_changed.txt")]
pub struct VhostDocrootChanged {
    pub target_desc: String,
    pub domain: String,
    pub old_root: String,
    pub new_root: String,
}

#[derive(Template)]
#[template(path = "vhost_removed.txt")]
pub struct VhostRemoved {
    pub target_desc: String,
    pub domain: String,
}

#[derive(Template)]
#[template(path = "mailing_list_created.txt")]
pub struct MailingListCreated {
    pub target_desc: String,
    pub list_name: String,
    pub password: String,
}

#[derive(Template)]
#[template(path = "password_reset.txt")]
pub struct PasswordReset {
    pub target_desc: String,
    pub system: String,
    pub password: String,
}

#[derive(Template)]
#[template(path = "signup_welcome.txt")]
pub struct SignupWelcome {
    pub target_desc: String,
    pub crsid: String,
    pub password: String,
}

#[derive(Template)]
#[template(path = "society_created.txt")]
pub struct SocietyCreated {
    pub target_desc: String,
    pub society: String,
    pub admins: String,
}

#[derive(Template)]
#[template(path = "admin_added.txt")]
pub struct AdminAdded {
    pub target_desc: String,
    pub target_member: String,
    pub society: String,
}

#[derive(Template)]
#[template(path = "admin_removed.txt")]
pub struct AdminRemoved {
    pub target_desc: String,
    pub target_member: String,
    pub society: String,
}

#[derive(Template)]
#[template(path = "member_cancelled.txt")]
pub struct MemberCancelled {
    pub crsid: String,
}

#[derive(Template)]
#[template(path = "entity_deleted.txt")]
pub struct EntityDeleted {
    pub kind: String,
    pub name: String,
}

#[derive(Template)]
#[template(path = "job_failed.txt")]
pub struct JobFailed {
    pub job_id: i64,
    pub job_type: String,
    pub owner: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_subject_from_body() {
        let rendered = "Hello\n@@SRCF-EMAIL-BODY@@\nworld\n";
        let (subject, body) = split_rendered(rendered).unwrap();
        assert_eq!(subject, "Hello");
        assert_eq!(body, "world");
    }

    #[test]
    fn rejects_template_missing_separator() {
        assert!(split_rendered("no separator here").is_err());
    }

    #[test]
    fn reactivated_template_renders_subject_and_body() {
        let template = Reactivated {
            target_desc: "Alice Baker".into(),
            new_email: "alice@example.com".into(),
            password: "hunter22xyz9".into(),
        };
        let rendered = template.render().unwrap();
        let (subject, body) = split_rendered(&rendered).unwrap();
        assert_eq!(subject, "Account reactivated");
        assert!(body.contains("alice@example.com"));
        assert!(body.contains("hunter22xyz9"));
    }
}
