//! Identity helpers shared by every task that needs to describe an owner
//! (a `Member` or a `Society`) without branching on which it is at every
//! call site.

use crate::types::{Member, Society};

/// Either a Member or a Society, borrowed, for the identity helpers below.
///
/// Distinct from [`crate::types::Owner`] (which owns its data and is used
/// for serialisation); this one is the ergonomic borrow-only view used by
/// plumbing and task code that already holds a `&Member`/`&Society`.
#[derive(Debug, Clone, Copy)]
pub enum Owner<'a> {
    Member(&'a Member),
    Society(&'a Society),
}

impl<'a> From<&'a Member> for Owner<'a> {
    fn from(m: &'a Member) -> Self {
        Owner::Member(m)
    }
}

impl<'a> From<&'a Society> for Owner<'a> {
    fn from(s: &'a Society) -> Self {
        Owner::Society(s)
    }
}

/// The crsid for a Member, or the short name for a Society.
pub fn owner_name(owner: Owner<'_>) -> &str {
    match owner {
        Owner::Member(m) => &m.crsid,
        Owner::Society(s) => &s.society,
    }
}

/// `"Firstname Surname"` for a Member, or the society description
/// (optionally suffixed `" admins"`) for a Society.
pub fn owner_desc(owner: Owner<'_>, admins: bool) -> String {
    match owner {
        Owner::Member(m) => m.name(),
        Owner::Society(s) => {
            if admins {
                format!("{} admins", s.description)
            } else {
                s.description.clone()
            }
        }
    }
}

/// The owner's public website URL.
pub fn owner_website(owner: Owner<'_>) -> String {
    match owner {
        Owner::Member(m) => format!("https://{}.user.srcf.net", m.crsid),
        Owner::Society(s) => format!("https://{}.soc.srcf.net", s.society),
    }
}

/// The owner's home directory, rooted under `/public/` when `public` is set.
pub fn owner_home(owner: Owner<'_>, public: bool) -> String {
    let root = if public { "/public" } else { "" };
    match owner {
        Owner::Member(m) => format!("{root}/home/{}", m.crsid),
        Owner::Society(s) => format!("{root}/societies/{}", s.society),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MailHandler;

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
            description: "Student Pictish Quoits Reenactment".into(),
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
    fn member_identity_helpers() {
        let m = member();
        let o = Owner::from(&m);
        assert_eq!(owner_name(o), "ab123");
        assert_eq!(owner_desc(o, false), "Alice Baker");
        assert_eq!(owner_website(o), "https://ab123.user.srcf.net");
        assert_eq!(owner_home(o, false), "/home/ab123");
        assert_eq!(owner_home(o, true), "/public/home/ab123");
    }

    #[test]
    fn society_identity_helpers() {
        let s = society();
        let o = Owner::from(&s);
        assert_eq!(owner_name(o), "spqr");
        assert_eq!(
            owner_desc(o, true),
            "Student Pictish Quoits Reenactment admins"
        );
        assert_eq!(owner_website(o), "https://spqr.soc.srcf.net");
        assert_eq!(owner_home(o, true), "/public/societies/spqr");
    }
}
