//! Notification email machinery: compile-time-checked templates extending
//! a shared layout, an SMTP sender, and a suppressible sender for tests.
//! Grounded on `srcflib/email/__init__.py`.

mod error;
mod recipient;
mod templates;
mod wrapper;

pub use error::{EmailError, Result};
pub use recipient::{make_recipient, target_desc, Recipient};
pub use templates::{
    AdminAdded, AdminRemoved, EmailUpdated, EntityDeleted, JobFailed, MailingListCreated,
    MemberCancelled, PasswordReset, Reactivated, RoleEmailUpdated, SignupWelcome, SocietyCreated,
    VhostAdded, VhostDocrootChanged, VhostRemoved,
};
pub use wrapper::EmailWrapper;
