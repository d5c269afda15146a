//! The email sender itself: renders a template against a recipient and
//! either hands it to SMTP or, for tests, just logs and returns
//! `Unchanged`. Grounded on `srcflib/email/__init__.py`'s `EmailWrapper`/
//! `SuppressEmails`, minus the Python version's `__enter__`/`__exit__`
//! global-current-wrapper trick — callers here just hold the `EmailWrapper`
//! they want to use (an explicit dependency, not an implicit context).

use askama::Template;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use srcf_task::{State, TaskResult};

use crate::error::{EmailError, Result};
use crate::recipient::{make_recipient, Recipient};
use crate::templates::split_rendered;

enum Sender {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    Suppress,
}

/// Renders and dispatches notification emails, prefixing subjects and
/// appending a footer the same way for every message sent through it.
pub struct EmailWrapper {
    prefix: Option<String>,
    footer: Option<String>,
    sender: Sender,
}

impl EmailWrapper {
    /// Deliver via a local SMTP relay (the SRCF's plain local mail
    /// gateway — no auth, no TLS), sending as `from`.
    pub fn smtp(host: &str, from: &str) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).build();
        let from = from.parse().map_err(|e| EmailError::InvalidAddress(from.to_string(), format!("{e}")))?;
        Ok(Self {
            prefix: Some("[SRCF]".to_string()),
            footer: None,
            sender: Sender::Smtp { transport, from },
        })
    }

    /// A wrapper that never actually sends: every `send` call logs its
    /// intent and returns `Unchanged`. Used by tests and dry runs so task
    /// code doesn't need a separate code path to avoid emailing real users.
    pub fn suppressed() -> Self {
        Self {
            prefix: Some("[SRCF]".to_string()),
            footer: None,
            sender: Sender::Suppress,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Render `template` and send it to `target`.
    pub async fn send<T: Template>(&self, target: Recipient<'_>, template: &T) -> Result<TaskResult<()>> {
        let (name, email) = make_recipient(&target);
        let rendered = template.render()?;
        let (subject, body) = split_rendered(&rendered)?;

        let subject = match &self.prefix {
            Some(prefix) => format!("{prefix} {subject}"),
            None => subject,
        };
        let body = match &self.footer {
            Some(footer) => format!("{body}\n\n{footer}"),
            None => body,
        };

        match &self.sender {
            Sender::Suppress => {
                tracing::debug!(email, subject, "suppressing email");
                Ok(TaskResult::new("send_email", State::Unchanged, ()))
            }
            Sender::Smtp { transport, from } => {
                tracing::debug!(email, subject, "sending email");
                let address = email
                    .parse()
                    .map_err(|e| EmailError::InvalidAddress(email.clone(), format!("{e}")))?;
                let to = Mailbox::new(name, address);
                let message = Message::builder()
                    .from(from.clone())
                    .to(to)
                    .subject(subject)
                    .body(body)
                    .map_err(|e| EmailError::Smtp(e.to_string()))?;

                transport
                    .send(message)
                    .await
                    .map_err(|e| EmailError::Smtp(e.to_string()))?;
                Ok(TaskResult::new("send_email", State::Success, ()))
            }
        }
    }
}
