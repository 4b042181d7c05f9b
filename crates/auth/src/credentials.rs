//! Static credential registry and submitted login credentials.

use std::collections::HashMap;
use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::Identity;

/// Credentials as submitted by a client.
///
/// The username is matched exactly as typed; the secret is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    secret: Zeroizing<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: Zeroizing::new(secret.into()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Read-only `username → secret` mapping loaded once at process start.
#[derive(Default)]
pub struct CredentialRegistry {
    secrets: HashMap<String, Zeroizing<String>>,
}

impl CredentialRegistry {
    pub fn new<I, U, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (U, S)>,
        U: Into<String>,
        S: Into<String>,
    {
        let secrets = entries
            .into_iter()
            .map(|(u, s)| (u.into(), Zeroizing::new(s.into())))
            .collect();
        Self { secrets }
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether `username` is a registered key.
    pub fn contains(&self, username: &str) -> bool {
        self.secrets.contains_key(username)
    }

    /// Verify submitted credentials, returning the identity on a match.
    ///
    /// The secret comparison is constant-time with respect to its contents.
    pub fn verify(&self, credentials: &Credentials) -> Option<Identity> {
        let expected = self.secrets.get(credentials.username())?;
        let matches: bool = expected
            .as_bytes()
            .ct_eq(credentials.secret().as_bytes())
            .into();
        matches.then(|| Identity::new(credentials.username().to_string()))
    }

    /// Registered usernames, sorted (for startup logging).
    pub fn usernames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.secrets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CredentialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRegistry")
            .field("usernames", &self.usernames())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CredentialRegistry {
        CredentialRegistry::new([("admin", "s3cret"), ("assistant", "hunter2")])
    }

    #[test]
    fn matching_secret_yields_identity() {
        let id = registry().verify(&Credentials::new("admin", "s3cret"));
        assert_eq!(id, Some(Identity::new("admin")));
    }

    #[test]
    fn wrong_secret_or_unknown_user_is_rejected() {
        let reg = registry();
        assert_eq!(reg.verify(&Credentials::new("admin", "hunter2")), None);
        assert_eq!(reg.verify(&Credentials::new("root", "s3cret")), None);
        assert_eq!(reg.verify(&Credentials::new("admin", "s3cre")), None);
    }

    #[test]
    fn username_is_not_trimmed() {
        assert_eq!(registry().verify(&Credentials::new(" admin", "s3cret")), None);
    }

    #[test]
    fn debug_output_never_contains_secrets() {
        let dbg = format!("{:?} {:?}", registry(), Credentials::new("admin", "s3cret"));
        assert!(!dbg.contains("s3cret"));
        assert!(!dbg.contains("hunter2"));
    }
}
