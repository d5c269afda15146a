//! A generated secret that redacts itself everywhere except `Display`.

use std::fmt;

use rand::Rng;

const PASSWORD_LEN: usize = 12;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Wraps a generated secret with an optional rendering template.
///
/// `Display` substitutes the secret in; `Debug` always redacts to `***`, so
/// an accidental `{:?}` in a log line (or this value ending up nested
/// inside a [`crate::result::Node`] detail string) never leaks it.
#[derive(Clone)]
pub struct Password {
    secret: String,
    template: Option<String>,
}

impl Password {
    /// A fresh 12-character alphanumeric secret — ASCII-safe to embed
    /// unescaped in a `chpasswd`-style `user:pass` line and in a
    /// single-quoted SQL string literal.
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let secret: String = (0..PASSWORD_LEN)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect();
        Self {
            secret,
            template: None,
        }
    }

    /// Wrap a known secret (tests, or values handed back by an external
    /// helper) rather than generating a fresh one.
    pub fn from_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            template: None,
        }
    }

    /// Derive a new `Password` embedding this secret inside a larger
    /// string, e.g. `wrap("user:{secret}")`. The secret stays redacted in
    /// `Debug`.
    pub fn wrap(&self, template: impl Into<String>) -> Password {
        Password {
            secret: self.secret.clone(),
            template: Some(template.into()),
        }
    }

    /// The raw secret, for callers that must hand it to another primitive
    /// (binding it as a SQL parameter, feeding it to stdin) rather than
    /// rendering it.
    pub fn reveal(&self) -> &str {
        &self.secret
    }
}

impl Default for Password {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.template {
            Some(template) => write!(f, "{}", template.replace("{secret}", &self.secret)),
            None => write!(f, "{}", self.secret),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_password_is_long_enough_and_shell_sql_safe() {
        let password = Password::new();
        assert_eq!(password.reveal().len(), PASSWORD_LEN);
        assert!(password.reveal().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn debug_never_leaks_secret() {
        let password = Password::from_secret("hunter2");
        let repr = format!("{password:?}");
        assert!(!repr.contains("hunter2"));
        assert_eq!(repr, "Password(***)");
    }

    #[test]
    fn wrap_embeds_secret_but_keeps_debug_redacted() {
        let password = Password::from_secret("hunter2").wrap("user:{secret}");
        assert_eq!(password.to_string(), "user:hunter2");
        assert!(!format!("{password:?}").contains("hunter2"));
    }
}
