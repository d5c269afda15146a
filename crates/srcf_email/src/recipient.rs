//! Resolving a notification's target into a display name and an address.
//! Grounded on `srcflib/email/__init__.py`'s `Recipient` union and
//! `_make_recipient`.

use srcf_protocol::Owner;

/// Target of a notification email: a `Member`/`Society`, an explicit
/// `(name, email)` pair, or a bare address.
pub enum Recipient<'a> {
    Owner(Owner<'a>),
    Named { name: String, email: String },
    Bare(String),
}

impl<'a> From<Owner<'a>> for Recipient<'a> {
    fn from(owner: Owner<'a>) -> Self {
        Recipient::Owner(owner)
    }
}

/// `(display name, address)`; no display name for a bare address.
pub fn make_recipient(target: &Recipient<'_>) -> (Option<String>, String) {
    match target {
        Recipient::Owner(Owner::Member(m)) => (Some(m.name()), m.email.clone()),
        Recipient::Owner(Owner::Society(s)) => (
            Some(format!("{} admins", s.description)),
            s.role_email.clone().unwrap_or_else(|| s.admins_alias()),
        ),
        Recipient::Named { name, email } => (Some(name.clone()), email.clone()),
        Recipient::Bare(email) => (None, email.clone()),
    }
}

/// The display name rendered into a template's `target_desc` field:
/// `"Firstname Surname"` for a member, the bare description for a society
/// (no `" admins"` suffix — that's specific to the envelope recipient, not
/// the in-body greeting).
pub fn target_desc(owner: Owner<'_>) -> String {
    srcf_protocol::owner_desc(owner, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use srcf_protocol::{MailHandler, Member, Society};

    fn member() -> Member {
        Member {
            crsid: "ab123".into(),
            preferred_name: "Alice".into(),
            surname: "Baker".into(),
            email: "ab123@cam.ac.uk".into(),
            mail_handler: MailHandler::Forward,
            member: true,
            user: true,
            danger: false,
            notes: None,
            uid: Some(10001),
            gid: Some(10001),
            joined: None,
        }
    }

    fn society() -> Society {
        Society {
            society: "spqr".into(),
            description: "Quoits Society".into(),
            role_email: None,
            danger: false,
            notes: None,
            uid: Some(20001),
            gid: Some(20001),
            joined: None,
            admin_crsids: vec!["ab123".into()],
        }
    }

    #[test]
    fn member_recipient_uses_their_own_email() {
        let m = member();
        let (name, email) = make_recipient(&Recipient::Owner(Owner::Member(&m)));
        assert_eq!(name.as_deref(), Some("Alice Baker"));
        assert_eq!(email, "ab123@cam.ac.uk");
    }

    #[test]
    fn society_recipient_falls_back_to_admins_alias_without_role_email() {
        let s = society();
        let (name, email) = make_recipient(&Recipient::Owner(Owner::Society(&s)));
        assert_eq!(name.as_deref(), Some("Quoits Society admins"));
        assert_eq!(email, "spqr-admins@srcf.net");
    }

    #[test]
    fn society_recipient_prefers_role_email() {
        let mut s = society();
        s.role_email = Some("committee@spqr.soc.srcf.net".into());
        let (_, email) = make_recipient(&Recipient::Owner(Owner::Society(&s)));
        assert_eq!(email, "committee@spqr.soc.srcf.net");
    }

    #[test]
    fn bare_recipient_has_no_display_name() {
        let (name, email) = make_recipient(&Recipient::Bare("someone@example.com".into()));
        assert_eq!(name, None);
        assert_eq!(email, "someone@example.com");
    }
}
